//! [`Appointment`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, TimeSlot};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Session;
use crate::domain::{contract, user};

/// Scheduled training session under a [`contract::Contract`].
///
/// Only [`Status::Scheduled`] [`Appointment`]s occupy the calendars of their
/// parties; terminal ones never conflict with new bookings.
#[derive(Clone, Debug, From)]
pub struct Appointment {
    /// ID of this [`Appointment`].
    pub id: Id,

    /// ID of the [`contract::Contract`] this [`Appointment`] is booked under.
    pub contract_id: contract::Id,

    /// ID of the trainer [`user`] delivering this [`Appointment`].
    pub trainer_id: user::Id,

    /// ID of the member [`user`] attending this [`Appointment`].
    pub member_id: user::Id,

    /// [`TimeSlot`] this [`Appointment`] occupies.
    pub slot: TimeSlot,

    /// [`DateTime`] when this [`Appointment`] was booked.
    pub booked_at: CreationDateTime,

    /// [`DateTime`] when this [`Appointment`] was completed.
    pub completed_at: Option<CompletionDateTime>,

    /// [`DateTime`] when this [`Appointment`] was cancelled.
    pub cancelled_at: Option<CancellationDateTime>,

    /// [`DateTime`] when this [`Appointment`] was marked as a no-show.
    pub no_show_at: Option<NoShowDateTime>,
}

impl Appointment {
    /// Returns the current [`Status`] of this [`Appointment`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.no_show_at.is_some() {
            Status::NoShow
        } else if self.cancelled_at.is_some() {
            Status::Cancelled
        } else if self.completed_at.is_some() {
            Status::Completed
        } else {
            Status::Scheduled
        }
    }

    /// Checks whether this [`Appointment`] is [`Status::Scheduled`].
    #[must_use]
    pub fn is_scheduled(&self) -> bool {
        self.status() == Status::Scheduled
    }

    /// Checks whether the [`user`] with the provided ID is a party of this
    /// [`Appointment`].
    #[must_use]
    pub fn is_party(&self, user_id: user::Id) -> bool {
        self.member_id == user_id || self.trainer_id == user_id
    }
}

/// Status of an [`Appointment`], derived from its terminal timestamps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Occupies its [`TimeSlot`] and awaits delivery.
    Scheduled,

    /// Delivered and recorded as a [`Session`].
    Completed,

    /// Cancelled before delivery.
    Cancelled,

    /// Member didn't show up.
    NoShow,
}

/// ID of an [`Appointment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Marker type describing an [`Appointment`] no-show.
#[derive(Clone, Copy, Debug)]
pub struct NoShow;

/// [`DateTime`] of an [`Appointment`] booking.
pub type CreationDateTime = DateTimeOf<(Appointment, unit::Creation)>;

/// [`DateTime`] of an [`Appointment`] completion.
pub type CompletionDateTime = DateTimeOf<(Appointment, unit::Completion)>;

/// [`DateTime`] of an [`Appointment`] cancellation.
pub type CancellationDateTime = DateTimeOf<(Appointment, unit::Cancellation)>;

/// [`DateTime`] of an [`Appointment`] no-show mark.
pub type NoShowDateTime = DateTimeOf<(Appointment, NoShow)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{DateTime, TimeSlot};

    use super::{
        Appointment, CancellationDateTime, CompletionDateTime,
        CreationDateTime, Id, NoShowDateTime, Status,
    };
    use crate::domain::{contract, user};

    fn scheduled() -> Appointment {
        let starts_at = DateTime::UNIX_EPOCH + Duration::from_secs(3600);
        Appointment {
            id: Id::new(),
            contract_id: contract::Id::new(),
            trainer_id: user::Id::new(),
            member_id: user::Id::new(),
            slot: TimeSlot::new(
                starts_at,
                starts_at + Duration::from_secs(3600),
            )
            .unwrap(),
            booked_at: CreationDateTime::now(),
            completed_at: None,
            cancelled_at: None,
            no_show_at: None,
        }
    }

    #[test]
    fn status_is_derived_from_timestamps() {
        let mut appointment = scheduled();
        assert_eq!(appointment.status(), Status::Scheduled);
        assert!(appointment.is_scheduled());

        appointment.completed_at = Some(CompletionDateTime::now());
        assert_eq!(appointment.status(), Status::Completed);

        let mut appointment = scheduled();
        appointment.cancelled_at = Some(CancellationDateTime::now());
        assert_eq!(appointment.status(), Status::Cancelled);

        let mut appointment = scheduled();
        appointment.no_show_at = Some(NoShowDateTime::now());
        assert_eq!(appointment.status(), Status::NoShow);
        assert!(!appointment.is_scheduled());
    }
}
