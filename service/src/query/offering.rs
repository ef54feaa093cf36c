//! [`Query`] collection related to a single [`Offering`].

use common::operations::By;

use crate::domain::{offering, Offering};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Offering`] by its [`offering::Id`].
pub type ById = DatabaseQuery<By<Option<Offering>, offering::Id>>;
