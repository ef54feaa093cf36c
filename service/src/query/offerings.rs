//! [`Query`] collection related to the multiple [`Offering`]s.

use common::operations::By;

use crate::domain::{user, Offering};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries [`Offering`]s of the specified trainer [`User`].
pub type ByTrainer = DatabaseQuery<By<Vec<Offering>, user::Id>>;
