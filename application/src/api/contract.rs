//! [`Contract`]-related definitions.

use common::{DateTime, DateTimeOf};
use derive_more::{Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// Session package sold to a member.
#[derive(Clone, Debug, From)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// [`domain::Contract`] representing this [`Contract`].
    contract: OnceCell<domain::Contract>,
}

impl From<domain::Contract> for Contract {
    fn from(contract: domain::Contract) -> Self {
        Self {
            id: contract.id.into(),
            contract: OnceCell::new_with(Some(contract)),
        }
    }
}

impl Contract {
    /// Creates a new [`Contract`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Contract`] with the provided ID exists,
    /// otherwise accessing this [`Contract`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            contract: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Contract`] representing this [`Contract`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Contract`] doesn't exist.
    async fn contract(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Contract, Error> {
        let id = self.id.into();
        self.contract
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::contract::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|c| {
                        future::ready(c.ok_or_else(|| {
                            api::query::ContractError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Session package sold to a member, tracking the balance of sessions still
/// deliverable under it.
#[graphql_object(context = Context)]
impl Contract {
    /// Unique identifier of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Member this `Contract` is sold to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.member",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn member(&self, ctx: &Context) -> Result<api::User, Error> {
        let member_id = self.contract(ctx).await?.member_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Contract` guarantees its member existence"
        )]
        Ok(unsafe { api::User::new_unchecked(member_id) })
    }

    /// Trainer delivering this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.trainer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn trainer(&self, ctx: &Context) -> Result<api::User, Error> {
        let trainer_id = self.contract(ctx).await?.trainer_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Contract` guarantees its trainer existence"
        )]
        Ok(unsafe { api::User::new_unchecked(trainer_id) })
    }

    /// `Offering` this `Contract` was opened from.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.offering",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn offering(&self, ctx: &Context) -> Result<api::Offering, Error> {
        let offering_id = self.contract(ctx).await?.offering_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Contract` guarantees its `Offering` existence"
        )]
        Ok(unsafe { api::Offering::new_unchecked(offering_id) })
    }

    /// Total number of sessions granted by this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.totalSessions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_sessions(&self, ctx: &Context) -> Result<i32, Error> {
        Ok(self.contract(ctx).await?.total_sessions.into())
    }

    /// Number of sessions still deliverable under this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.remainingSessions",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn remaining_sessions(
        &self,
        ctx: &Context,
    ) -> Result<i32, Error> {
        Ok(self.contract(ctx).await?.remaining_sessions.into())
    }

    /// Current status of this `Contract`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.contract(ctx).await?.status().into())
    }

    /// `DateTime` when this `Contract` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.contract(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Contract` was completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.completedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn completed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.contract(ctx).await?.completed_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when this `Contract` was cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Contract.cancelledAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancelled_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.contract(ctx).await?.cancelled_at.map(DateTimeOf::coerce))
    }
}

/// Unique identifier of a `Contract`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::contract::Id)]
#[into(domain::contract::Id)]
#[graphql(name = "ContractId", transparent)]
pub struct Id(Uuid);

/// Status of a `Contract`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ContractStatus")]
pub enum Status {
    /// Sessions may be scheduled and delivered.
    Active,

    /// All granted sessions were delivered.
    Completed,

    /// Cancelled by one of the parties.
    Cancelled,
}

impl From<domain::contract::Status> for Status {
    fn from(status: domain::contract::Status) -> Self {
        use domain::contract::Status as S;
        match status {
            S::Active => Self::Active,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
        }
    }
}
