//! Domain [`Event`]s definitions.

use tokio::sync::broadcast;

use crate::domain::{application, appointment, contract, offering, session};
#[cfg(doc)]
use crate::{
    domain::{Application, Appointment, Contract, Offering, Session},
    Service,
};

/// Event happened in a [`Service`].
///
/// [`Event`]s are published after the respective database transaction
/// commits, so observers never see effects of a rolled back one.
#[derive(Clone, Copy, Debug)]
pub enum Event {
    /// [`Application`] has been approved, producing a [`Contract`].
    ApplicationApproved {
        /// ID of the approved [`Application`].
        application_id: application::Id,
    },

    /// [`Application`] has been rejected.
    ApplicationRejected {
        /// ID of the rejected [`Application`].
        application_id: application::Id,
    },

    /// New [`Application`] has been submitted to an [`Offering`].
    ApplicationSubmitted {
        /// ID of the submitted [`Application`].
        application_id: application::Id,

        /// ID of the [`Offering`] being applied to.
        offering_id: offering::Id,
    },

    /// [`Appointment`] has been booked.
    AppointmentBooked {
        /// ID of the booked [`Appointment`].
        appointment_id: appointment::Id,

        /// ID of the [`Contract`] the [`Appointment`] belongs to.
        contract_id: contract::Id,
    },

    /// [`Appointment`] has been cancelled.
    AppointmentCancelled {
        /// ID of the cancelled [`Appointment`].
        appointment_id: appointment::Id,
    },

    /// [`Appointment`] has been marked as a no-show.
    AppointmentNoShow {
        /// ID of the no-show [`Appointment`].
        appointment_id: appointment::Id,
    },

    /// [`Appointment`] has been moved to another time slot.
    AppointmentRescheduled {
        /// ID of the rescheduled [`Appointment`].
        appointment_id: appointment::Id,
    },

    /// [`Contract`] has been cancelled.
    ContractCancelled {
        /// ID of the cancelled [`Contract`].
        contract_id: contract::Id,
    },

    /// [`Contract`] has run out of sessions and completed.
    ContractCompleted {
        /// ID of the completed [`Contract`].
        contract_id: contract::Id,
    },

    /// New [`Contract`] has been concluded.
    ContractCreated {
        /// ID of the created [`Contract`].
        contract_id: contract::Id,
    },

    /// New [`Offering`] has been published.
    OfferingCreated {
        /// ID of the created [`Offering`].
        offering_id: offering::Id,
    },

    /// [`Offering`] has been deactivated.
    OfferingDeactivated {
        /// ID of the deactivated [`Offering`].
        offering_id: offering::Id,
    },

    /// [`Session`] has been recorded for a completed [`Appointment`].
    SessionRecorded {
        /// ID of the recorded [`Session`].
        session_id: session::Id,

        /// ID of the completed [`Appointment`].
        appointment_id: appointment::Id,

        /// ID of the [`Contract`] the [`Session`] was consumed from.
        contract_id: contract::Id,
    },
}

/// Broadcaster of [`Event`]s to all the interested subscribers.
#[derive(Clone, Debug)]
pub struct Bus(broadcast::Sender<Event>);

impl Bus {
    /// Number of not-yet-received [`Event`]s a subscriber may fall behind
    /// before starting to lag.
    const CAPACITY: usize = 256;

    /// Creates a new [`Bus`] with no subscribers.
    #[must_use]
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(Self::CAPACITY);
        Self(tx)
    }

    /// Publishes the provided [`Event`] to all the current subscribers.
    ///
    /// [`Event`]s published while there are no subscribers are dropped.
    pub(crate) fn publish(&self, event: Event) {
        // `Err` here means there are no subscribers at the moment.
        drop(self.0.send(event));
    }

    /// Subscribes to all the [`Event`]s published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.0.subscribe()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
