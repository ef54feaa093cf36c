//! [`Offering`]-related definitions.

use common::{DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// Personal-training package published by a trainer.
#[derive(Clone, Debug, From)]
pub struct Offering {
    /// ID of this [`Offering`].
    pub id: Id,

    /// [`domain::Offering`] representing this [`Offering`].
    offering: OnceCell<domain::Offering>,
}

impl From<domain::Offering> for Offering {
    fn from(offering: domain::Offering) -> Self {
        Self {
            id: offering.id.into(),
            offering: OnceCell::new_with(Some(offering)),
        }
    }
}

impl Offering {
    /// Creates a new [`Offering`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Offering`] with the provided ID exists,
    /// otherwise accessing this [`Offering`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            offering: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Offering`] representing this [`Offering`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Offering`] doesn't exist.
    async fn offering(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Offering, Error> {
        let id = self.id.into();
        self.offering
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::offering::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|o| {
                        future::ready(o.ok_or_else(|| {
                            api::query::OfferingError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Personal-training package published by a trainer, granting a fixed number
/// of sessions for a fixed price.
#[graphql_object(context = Context)]
impl Offering {
    /// Unique identifier of this `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Trainer who published this `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.trainer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn trainer(&self, ctx: &Context) -> Result<api::User, Error> {
        let trainer_id = self.offering(ctx).await?.trainer_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Offering` guarantees its trainer existence"
        )]
        Ok(unsafe { api::User::new_unchecked(trainer_id) })
    }

    /// Title of this `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.title",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn title(&self, ctx: &Context) -> Result<Title, Error> {
        Ok(self.offering(ctx).await?.title.clone().into())
    }

    /// Description of this `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.description",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn description(
        &self,
        ctx: &Context,
    ) -> Result<Option<Description>, Error> {
        Ok(self.offering(ctx).await?.description.clone().map(Into::into))
    }

    /// Price of this `Offering`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.price",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn price(&self, ctx: &Context) -> Result<Money, Error> {
        Ok(self.offering(ctx).await?.price.into())
    }

    /// Number of sessions this `Offering` grants.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.totalSessions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_sessions(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.offering(ctx).await?.total_sessions.into())
    }

    /// `DateTime` when this `Offering` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.offering(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Offering` was deactivated.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Offering.deactivatedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn deactivated_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.offering(ctx).await?.deactivated_at.map(DateTimeOf::coerce))
    }
}

/// Unique identifier of an `Offering`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::offering::Id)]
#[into(domain::offering::Id)]
#[graphql(name = "OfferingId", transparent)]
pub struct Id(Uuid);

/// Title of an `Offering`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "OfferingTitle",
    with = scalar::Via::<domain::offering::Title>,
)]
pub struct Title(domain::offering::Title);

/// Description of an `Offering`.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "OfferingDescription",
    with = scalar::Via::<domain::offering::Description>,
)]
pub struct Description(domain::offering::Description);
