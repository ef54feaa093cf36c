//! [`Application`]-related definitions.

use common::{DateTime, DateTimeOf};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Member's request to purchase an `Offering`.
#[derive(Clone, Debug, From)]
pub struct Application(domain::Application);

/// Member's request to purchase an `Offering`, awaiting the trainer's
/// decision.
#[graphql_object(context = Context)]
impl Application {
    /// Unique identifier of this `Application`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Member who submitted this `Application`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.member",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn member(&self) -> api::User {
        #[expect(
            unsafe_code,
            reason = "loaded `Application` guarantees its member existence"
        )]
        unsafe {
            api::User::new_unchecked(self.0.member_id)
        }
    }

    /// `Offering` this `Application` is for.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.offering",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn offering(&self) -> api::Offering {
        #[expect(
            unsafe_code,
            reason = "loaded `Application` guarantees its `Offering` existence"
        )]
        unsafe {
            api::Offering::new_unchecked(self.0.offering_id)
        }
    }

    /// Current status of this `Application`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status().into()
    }

    /// `DateTime` when this `Application` was submitted.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.appliedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn applied_at(&self) -> DateTime {
        self.0.applied_at.coerce()
    }

    /// `DateTime` when this `Application` was approved.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.approvedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn approved_at(&self) -> Option<DateTime> {
        self.0.approved_at.map(DateTimeOf::coerce)
    }

    /// `DateTime` when this `Application` was rejected.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Application.rejectedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn rejected_at(&self) -> Option<DateTime> {
        self.0.rejected_at.map(DateTimeOf::coerce)
    }
}

/// Unique identifier of an `Application`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::application::Id)]
#[into(domain::application::Id)]
#[graphql(name = "ApplicationId", transparent)]
pub struct Id(Uuid);

/// Status of an `Application`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "ApplicationStatus")]
pub enum Status {
    /// Awaiting the trainer's decision.
    Pending,

    /// Approved by the trainer.
    Approved,

    /// Rejected by the trainer.
    Rejected,
}

impl From<domain::application::Status> for Status {
    fn from(status: domain::application::Status) -> Self {
        use domain::application::Status as S;
        match status {
            S::Pending => Self::Pending,
            S::Approved => Self::Approved,
            S::Rejected => Self::Rejected,
        }
    }
}
