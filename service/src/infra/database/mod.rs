//! [`Database`]-related implementations.

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "memory")]
pub use self::memory::Memory;
#[cfg(feature = "postgres")]
pub use self::postgres::Postgres;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "memory")]
    /// [`Memory`] error.
    Memory(memory::Error),

    #[cfg(feature = "postgres")]
    /// [`Postgres`] error.
    Postgres(postgres::Error),
}

impl Error {
    /// Checks if the error is transient, so the failed operation may be
    /// retried.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(..) => false,
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_transient(),
            #[cfg(not(any(feature = "memory", feature = "postgres")))]
            _ => false,
        }
    }

    /// Checks if the error is a unique violation of the specified constraint.
    #[cfg_attr(
        not(any(feature = "memory", feature = "postgres")),
        expect(unused_variables, reason = "no backends are enabled")
    )]
    #[must_use]
    pub fn is_unique_violation(&self, constraint: Option<&str>) -> bool {
        match self {
            #[cfg(feature = "memory")]
            Self::Memory(e) => e.is_unique_violation(constraint),
            #[cfg(feature = "postgres")]
            Self::Postgres(e) => e.is_unique_violation(constraint),
            #[cfg(not(any(feature = "memory", feature = "postgres")))]
            _ => false,
        }
    }
}
