//! [`Query`] collection related to the multiple [`Application`]s.

use common::operations::By;

use crate::domain::{offering, Application};
#[cfg(doc)]
use crate::{domain::Offering, Query};

use super::DatabaseQuery;

/// Queries [`Application`]s submitted to the specified [`Offering`].
pub type ByOffering = DatabaseQuery<By<Vec<Application>, offering::Id>>;
