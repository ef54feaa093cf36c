//! [`Appointment`]-related definitions.

use common::{DateTime, DateTimeOf};
use derive_more::{Display, From, Into};
use futures::{future, TryFutureExt as _};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{api, AsError, Context, Error};

/// Scheduled training session under a `Contract`.
#[derive(Clone, Debug, From)]
pub struct Appointment {
    /// ID of this [`Appointment`].
    pub id: Id,

    /// [`domain::Appointment`] representing this [`Appointment`].
    appointment: OnceCell<domain::Appointment>,
}

impl From<domain::Appointment> for Appointment {
    fn from(appointment: domain::Appointment) -> Self {
        Self {
            id: appointment.id.into(),
            appointment: OnceCell::new_with(Some(appointment)),
        }
    }
}

impl Appointment {
    /// Creates a new [`Appointment`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Appointment`] with the provided ID exists,
    /// otherwise accessing this [`Appointment`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            appointment: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Appointment`] representing this [`Appointment`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Appointment`] doesn't exist.
    async fn appointment(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Appointment, Error> {
        let id = self.id.into();
        self.appointment
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::appointment::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|a| {
                        future::ready(a.ok_or_else(|| {
                            api::query::AppointmentError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Scheduled calendar slot under a `Contract`.
#[graphql_object(context = Context)]
impl Appointment {
    /// Unique identifier of this `Appointment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// `Contract` this `Appointment` is booked under.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.contract",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn contract(&self, ctx: &Context) -> Result<api::Contract, Error> {
        let contract_id = self.appointment(ctx).await?.contract_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Appointment` guarantees its `Contract` existence"
        )]
        Ok(unsafe { api::Contract::new_unchecked(contract_id) })
    }

    /// Trainer delivering this `Appointment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.trainer",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn trainer(&self, ctx: &Context) -> Result<api::User, Error> {
        let trainer_id = self.appointment(ctx).await?.trainer_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Appointment` guarantees its trainer existence"
        )]
        Ok(unsafe { api::User::new_unchecked(trainer_id) })
    }

    /// Member attending this `Appointment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.member",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn member(&self, ctx: &Context) -> Result<api::User, Error> {
        let member_id = self.appointment(ctx).await?.member_id;

        #[expect(
            unsafe_code,
            reason = "loaded `Appointment` guarantees its member existence"
        )]
        Ok(unsafe { api::User::new_unchecked(member_id) })
    }

    /// `DateTime` when this `Appointment` starts.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.startsAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn starts_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.appointment(ctx).await?.slot.starts_at())
    }

    /// `DateTime` when this `Appointment` ends (exclusive).
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.endsAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn ends_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.appointment(ctx).await?.slot.ends_at())
    }

    /// Current status of this `Appointment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.appointment(ctx).await?.status().into())
    }

    /// `DateTime` when this `Appointment` was booked.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.bookedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn booked_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.appointment(ctx).await?.booked_at.coerce())
    }

    /// `DateTime` when this `Appointment` was completed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.completedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn completed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.appointment(ctx).await?.completed_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when this `Appointment` was cancelled.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.cancelledAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn cancelled_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.appointment(ctx).await?.cancelled_at.map(DateTimeOf::coerce))
    }

    /// `DateTime` when this `Appointment` was marked as a no-show.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Appointment.noShowAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn no_show_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self.appointment(ctx).await?.no_show_at.map(DateTimeOf::coerce))
    }
}

/// Unique identifier of an `Appointment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::appointment::Id)]
#[into(domain::appointment::Id)]
#[graphql(name = "AppointmentId", transparent)]
pub struct Id(Uuid);

/// Status of an `Appointment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AppointmentStatus")]
pub enum Status {
    /// Occupies its time slot and awaits delivery.
    Scheduled,

    /// Delivered and recorded as a `Session`.
    Completed,

    /// Cancelled before delivery.
    Cancelled,

    /// Member didn't show up.
    NoShow,
}

impl From<domain::appointment::Status> for Status {
    fn from(status: domain::appointment::Status) -> Self {
        use domain::appointment::Status as S;
        match status {
            S::Scheduled => Self::Scheduled,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
            S::NoShow => Self::NoShow,
        }
    }
}
