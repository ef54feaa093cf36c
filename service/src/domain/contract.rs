//! [`Contract`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Appointment;
use crate::domain::{offering, user};

/// Session package sold to a member.
///
/// A [`Contract`] tracks the [`SessionBalance`] of sessions still deliverable
/// under it. The balance only ever decreases, and the [`Contract`] completes
/// itself as the balance hits zero.
#[derive(Clone, Debug, From)]
pub struct Contract {
    /// ID of this [`Contract`].
    pub id: Id,

    /// ID of the member [`user`] this [`Contract`] is sold to.
    pub member_id: user::Id,

    /// ID of the trainer [`user`] delivering this [`Contract`].
    pub trainer_id: user::Id,

    /// ID of the [`offering::Offering`] this [`Contract`] was opened from.
    pub offering_id: offering::Id,

    /// Total number of sessions granted by this [`Contract`].
    pub total_sessions: offering::SessionCount,

    /// [`SessionBalance`] of sessions still deliverable.
    pub remaining_sessions: SessionBalance,

    /// [`DateTime`] when this [`Contract`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Contract`] was completed.
    pub completed_at: Option<CompletionDateTime>,

    /// [`DateTime`] when this [`Contract`] was cancelled.
    pub cancelled_at: Option<CancellationDateTime>,
}

impl Contract {
    /// Returns the current [`Status`] of this [`Contract`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.cancelled_at.is_some() {
            Status::Cancelled
        } else if self.completed_at.is_some() {
            Status::Completed
        } else {
            Status::Active
        }
    }

    /// Checks whether this [`Contract`] is [`Status::Active`].
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status() == Status::Active
    }

    /// Checks whether the [`user`] with the provided ID is a party of this
    /// [`Contract`].
    #[must_use]
    pub fn is_party(&self, user_id: user::Id) -> bool {
        self.member_id == user_id || self.trainer_id == user_id
    }

    /// Consumes one session from the [`SessionBalance`] of this [`Contract`].
    ///
    /// Completes this [`Contract`] once the last session is consumed.
    ///
    /// # Errors
    ///
    /// If this [`Contract`] is not [`Status::Active`], or its
    /// [`SessionBalance`] is exhausted already.
    pub fn consume_session(&mut self) -> Result<(), ConsumeSessionError> {
        use ConsumeSessionError as E;

        if !self.is_active() {
            return Err(E::NotActive);
        }

        self.remaining_sessions =
            self.remaining_sessions.decremented().ok_or(E::Exhausted)?;
        if self.remaining_sessions.is_exhausted() {
            self.completed_at = Some(CompletionDateTime::now());
        }

        Ok(())
    }
}

/// Error of [`Contract::consume_session`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ConsumeSessionError {
    /// [`Contract`] is not [`Status::Active`].
    #[display("`Contract` is not active")]
    NotActive,

    /// [`SessionBalance`] of the [`Contract`] is exhausted.
    #[display("`Contract` has no remaining sessions")]
    Exhausted,
}

/// Status of a [`Contract`], derived from its terminal timestamps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Sessions may be scheduled and delivered.
    Active,

    /// All granted sessions were delivered.
    Completed,

    /// Cancelled by one of the parties.
    Cancelled,
}

/// ID of a [`Contract`].
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

/// Number of sessions still deliverable under a [`Contract`].
///
/// Guaranteed to be non-negative, and only ever decreases.
#[derive(Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct SessionBalance(i32);

impl SessionBalance {
    /// Creates a new [`SessionBalance`] granting the provided total.
    #[must_use]
    pub fn new(total: offering::SessionCount) -> Self {
        Self(total.into())
    }

    /// Returns this [`SessionBalance`] decremented by one session.
    ///
    /// [`None`] is returned if the balance is exhausted already.
    #[must_use]
    pub fn decremented(self) -> Option<Self> {
        self.0.checked_sub(1).filter(|b| *b >= 0).map(Self)
    }

    /// Checks whether this [`SessionBalance`] is exhausted.
    #[must_use]
    pub fn is_exhausted(self) -> bool {
        self.0 == 0
    }
}

/// [`DateTime`] of a [`Contract`] creation.
pub type CreationDateTime = DateTimeOf<(Contract, unit::Creation)>;

/// [`DateTime`] of a [`Contract`] completion.
pub type CompletionDateTime = DateTimeOf<(Contract, unit::Completion)>;

/// [`DateTime`] of a [`Contract`] cancellation.
pub type CancellationDateTime = DateTimeOf<(Contract, unit::Cancellation)>;

#[cfg(test)]
mod spec {
    use super::{
        CancellationDateTime, ConsumeSessionError, Contract, CreationDateTime,
        Id, SessionBalance, Status,
    };
    use crate::domain::{offering, user};

    fn active(total: i32) -> Contract {
        let total = offering::SessionCount::new(total).unwrap();
        Contract {
            id: Id::new(),
            member_id: user::Id::new(),
            trainer_id: user::Id::new(),
            offering_id: offering::Id::new(),
            total_sessions: total,
            remaining_sessions: SessionBalance::new(total),
            created_at: CreationDateTime::now(),
            completed_at: None,
            cancelled_at: None,
        }
    }

    #[test]
    fn consuming_decrements_balance() {
        let mut contract = active(3);

        contract.consume_session().unwrap();

        assert_eq!(i32::from(contract.remaining_sessions), 2);
        assert_eq!(contract.status(), Status::Active);
    }

    #[test]
    fn consuming_last_session_completes() {
        let mut contract = active(1);

        contract.consume_session().unwrap();

        assert_eq!(i32::from(contract.remaining_sessions), 0);
        assert_eq!(contract.status(), Status::Completed);
        assert!(contract.completed_at.is_some());
    }

    #[test]
    fn consuming_requires_active_status() {
        let mut contract = active(2);
        contract.cancelled_at = Some(CancellationDateTime::now());

        assert!(matches!(
            contract.consume_session(),
            Err(ConsumeSessionError::NotActive),
        ));
        assert_eq!(i32::from(contract.remaining_sessions), 2);
    }

    #[test]
    fn completed_contract_rejects_consuming() {
        let mut contract = active(1);
        contract.consume_session().unwrap();

        assert!(matches!(
            contract.consume_session(),
            Err(ConsumeSessionError::NotActive),
        ));
    }

    #[test]
    fn recognizes_parties() {
        let contract = active(1);

        assert!(contract.is_party(contract.member_id));
        assert!(contract.is_party(contract.trainer_id));
        assert!(!contract.is_party(user::Id::new()));
    }
}
