//! [`Query`] collection related to the multiple [`Contract`]s.

use common::operations::By;

use crate::domain::{user, Contract};
#[cfg(doc)]
use crate::{domain::User, Query};

use super::DatabaseQuery;

/// Queries [`Contract`]s the specified [`User`] is a party of.
pub type ByUser = DatabaseQuery<By<Vec<Contract>, user::Id>>;
