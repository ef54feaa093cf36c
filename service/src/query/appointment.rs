//! [`Query`] collection related to a single [`Appointment`].

use common::operations::By;

use crate::domain::{appointment, Appointment};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Appointment`] by its [`appointment::Id`].
pub type ById = DatabaseQuery<By<Option<Appointment>, appointment::Id>>;
