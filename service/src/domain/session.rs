//! [`Session`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::appointment;

/// Record of a delivered training session.
///
/// A [`Session`] is immutable once recorded, and references exactly one
/// [`appointment::Appointment`] and exactly one external workout log.
#[derive(Clone, Debug, From)]
pub struct Session {
    /// ID of this [`Session`].
    pub id: Id,

    /// ID of the completed [`appointment::Appointment`].
    pub appointment_id: appointment::Id,

    /// ID of the workout log capturing what was performed.
    pub workout_log_id: WorkoutLogId,

    /// [`DateTime`] when this [`Session`] was recorded.
    pub created_at: CreationDateTime,
}

/// ID of a [`Session`].
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

/// ID of an externally managed workout log linked to a [`Session`].
#[derive(
    Clone,
    Copy,
    Debug,
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
pub struct WorkoutLogId(Uuid);

/// [`DateTime`] of a [`Session`] recording.
pub type CreationDateTime = DateTimeOf<(Session, unit::Creation)>;
