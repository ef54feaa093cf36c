//! [`Query`] collection related to the multiple [`Appointment`]s.

use common::operations::By;

use crate::domain::{user, Appointment};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries [`Appointment`]s the specified [`User`] is a party of.
pub type ByUser = DatabaseQuery<By<Vec<Appointment>, user::Id>>;
