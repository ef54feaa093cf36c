//! [`Query`] collection related to a single [`Session`].

use common::operations::By;

use crate::domain::{appointment, Session};
#[cfg(doc)]
use crate::{domain::Appointment, Query};

use super::DatabaseQuery;

/// Queries the [`Session`] recorded for the specified [`Appointment`].
pub type ByAppointment = DatabaseQuery<By<Option<Session>, appointment::Id>>;
