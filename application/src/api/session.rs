//! [`Session`]-related definitions.

use common::DateTime;
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Record of a delivered training session.
#[derive(Clone, Debug, From)]
pub struct Session(domain::Session);

/// Immutable record of a delivered training session, linking the completed
/// `Appointment` to its workout log.
#[graphql_object(context = Context)]
impl Session {
    /// Unique identifier of this `Session`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Session.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Completed `Appointment` this `Session` records.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Session.appointment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn appointment(&self) -> api::Appointment {
        #[expect(
            unsafe_code,
            reason = "loaded `Session` guarantees its `Appointment` existence"
        )]
        unsafe {
            api::Appointment::new_unchecked(self.0.appointment_id)
        }
    }

    /// Identifier of the workout log capturing what was performed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Session.workoutLogId",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn workout_log_id(&self) -> WorkoutLogId {
        self.0.workout_log_id.into()
    }

    /// `DateTime` when this `Session` was recorded.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Session.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn created_at(&self) -> DateTime {
        self.0.created_at.coerce()
    }
}

/// Unique identifier of a `Session`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::session::Id)]
#[into(domain::session::Id)]
#[graphql(name = "SessionId", transparent)]
pub struct Id(Uuid);

/// Identifier of an externally managed workout log.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::session::WorkoutLogId)]
#[into(domain::session::WorkoutLogId)]
#[graphql(name = "WorkoutLogId", transparent)]
pub struct WorkoutLogId(Uuid);
