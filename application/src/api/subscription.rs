//! GraphQL [`Subscription`]s definitions.

use futures::stream::{self, BoxStream, StreamExt as _};
use juniper::{graphql_subscription, GraphQLEnum, GraphQLObject};
use service::event;
use tokio::sync::broadcast::error::RecvError;

use crate::{api, Context};

/// Root of all GraphQL subscription.
#[derive(Clone, Copy, Debug)]
pub struct Subscription;

#[graphql_subscription(context = Context)]
impl Subscription {
    /// Subscription to all the `Event`s happening in the system.
    ///
    /// Only `Event`s published after the subscription is established are
    /// delivered.
    pub async fn events(
        &self,
        ctx: &Context,
    ) -> BoxStream<'static, Event> {
        let rx = ctx.service().subscribe();
        stream::unfold(rx, |mut rx| async move {
            loop {
                return match rx.recv().await {
                    Ok(event) => Some((event.into(), rx)),
                    // Slow subscriber skips the overwritten `Event`s.
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => None,
                };
            }
        })
        .boxed()
    }
}

/// Notification about a state change happened in the system.
#[derive(Clone, Copy, Debug, GraphQLObject)]
#[graphql(context = Context)]
pub struct Event {
    /// Kind of this `Event`.
    pub kind: EventKind,

    /// `Application` this `Event` relates to, if any.
    pub application_id: Option<api::application::Id>,

    /// `Appointment` this `Event` relates to, if any.
    pub appointment_id: Option<api::appointment::Id>,

    /// `Contract` this `Event` relates to, if any.
    pub contract_id: Option<api::contract::Id>,

    /// `Offering` this `Event` relates to, if any.
    pub offering_id: Option<api::offering::Id>,

    /// `Session` this `Event` relates to, if any.
    pub session_id: Option<api::session::Id>,
}

impl Event {
    /// Returns a new [`Event`] of the provided [`EventKind`] with no related
    /// entities.
    fn of(kind: EventKind) -> Self {
        Self {
            kind,
            application_id: None,
            appointment_id: None,
            contract_id: None,
            offering_id: None,
            session_id: None,
        }
    }
}

impl From<event::Event> for Event {
    fn from(event: event::Event) -> Self {
        use event::Event as E;

        match event {
            E::ApplicationApproved { application_id } => Self {
                application_id: Some(application_id.into()),
                ..Self::of(EventKind::ApplicationApproved)
            },
            E::ApplicationRejected { application_id } => Self {
                application_id: Some(application_id.into()),
                ..Self::of(EventKind::ApplicationRejected)
            },
            E::ApplicationSubmitted {
                application_id,
                offering_id,
            } => Self {
                application_id: Some(application_id.into()),
                offering_id: Some(offering_id.into()),
                ..Self::of(EventKind::ApplicationSubmitted)
            },
            E::AppointmentBooked {
                appointment_id,
                contract_id,
            } => Self {
                appointment_id: Some(appointment_id.into()),
                contract_id: Some(contract_id.into()),
                ..Self::of(EventKind::AppointmentBooked)
            },
            E::AppointmentCancelled { appointment_id } => Self {
                appointment_id: Some(appointment_id.into()),
                ..Self::of(EventKind::AppointmentCancelled)
            },
            E::AppointmentNoShow { appointment_id } => Self {
                appointment_id: Some(appointment_id.into()),
                ..Self::of(EventKind::AppointmentNoShow)
            },
            E::AppointmentRescheduled { appointment_id } => Self {
                appointment_id: Some(appointment_id.into()),
                ..Self::of(EventKind::AppointmentRescheduled)
            },
            E::ContractCancelled { contract_id } => Self {
                contract_id: Some(contract_id.into()),
                ..Self::of(EventKind::ContractCancelled)
            },
            E::ContractCompleted { contract_id } => Self {
                contract_id: Some(contract_id.into()),
                ..Self::of(EventKind::ContractCompleted)
            },
            E::ContractCreated { contract_id } => Self {
                contract_id: Some(contract_id.into()),
                ..Self::of(EventKind::ContractCreated)
            },
            E::OfferingCreated { offering_id } => Self {
                offering_id: Some(offering_id.into()),
                ..Self::of(EventKind::OfferingCreated)
            },
            E::OfferingDeactivated { offering_id } => Self {
                offering_id: Some(offering_id.into()),
                ..Self::of(EventKind::OfferingDeactivated)
            },
            E::SessionRecorded {
                session_id,
                appointment_id,
                contract_id,
            } => Self {
                appointment_id: Some(appointment_id.into()),
                contract_id: Some(contract_id.into()),
                session_id: Some(session_id.into()),
                ..Self::of(EventKind::SessionRecorded)
            },
        }
    }
}

/// Kind of an [`Event`].
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum EventKind {
    /// `Application` has been approved, producing a `Contract`.
    ApplicationApproved,

    /// `Application` has been rejected.
    ApplicationRejected,

    /// New `Application` has been submitted to an `Offering`.
    ApplicationSubmitted,

    /// `Appointment` has been booked.
    AppointmentBooked,

    /// `Appointment` has been cancelled.
    AppointmentCancelled,

    /// `Appointment` has been marked as a no-show.
    AppointmentNoShow,

    /// `Appointment` has been moved to another time slot.
    AppointmentRescheduled,

    /// `Contract` has been cancelled.
    ContractCancelled,

    /// `Contract` has run out of sessions and completed.
    ContractCompleted,

    /// New `Contract` has been concluded.
    ContractCreated,

    /// New `Offering` has been published.
    OfferingCreated,

    /// `Offering` has been deactivated.
    OfferingDeactivated,

    /// `Session` has been recorded for a completed `Appointment`.
    SessionRecorded,
}
