//! [`Appointment`]-related read definitions.

use common::TimeSlot;
use derive_more::{Deref, From, Into};

use crate::domain::{appointment, user};
#[cfg(doc)]
use crate::domain::{Appointment, Contract, User};

/// Schedule of a single [`User`], as a lockable unit.
///
/// Admissions touching a [`User`]'s schedule lock their [`Calendar`] first,
/// so concurrent bookings of the same [`User`] are serialized.
#[derive(Clone, Copy, Debug)]
pub struct Calendar;

/// Number of [`Appointment`]s of a [`Contract`] being scheduled still.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct ScheduledCount(i32);

/// Selector of scheduled [`Appointment`]s of a [`User`] overlapping a
/// [`TimeSlot`].
#[derive(Clone, Copy, Debug)]
pub struct Overlapping {
    /// ID of the [`User`] whose [`Calendar`] is probed.
    pub user_id: user::Id,

    /// [`TimeSlot`] to probe against.
    pub slot: TimeSlot,

    /// ID of an [`Appointment`] to exclude from probing.
    ///
    /// Rescheduling excludes the [`Appointment`] being moved, so it never
    /// conflicts with itself.
    pub except: Option<appointment::Id>,
}

/// Indicator whether a [`TimeSlot`] conflicts with an existing scheduled
/// [`Appointment`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasConflict(pub bool);

impl PartialEq<bool> for HasConflict {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}
