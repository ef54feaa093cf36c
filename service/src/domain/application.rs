//! [`Application`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Contract;
use crate::domain::{offering, user};

/// Member's request to purchase an [`offering::Offering`].
///
/// Approving a pending [`Application`] opens a [`Contract`]; rejecting it
/// closes the request without any further effect. Either decision is final.
#[derive(Clone, Debug, From)]
pub struct Application {
    /// ID of this [`Application`].
    pub id: Id,

    /// ID of the member [`user`] who submitted this [`Application`].
    pub member_id: user::Id,

    /// ID of the [`offering::Offering`] this [`Application`] is for.
    pub offering_id: offering::Id,

    /// [`DateTime`] when this [`Application`] was submitted.
    pub applied_at: CreationDateTime,

    /// [`DateTime`] when this [`Application`] was approved.
    pub approved_at: Option<ApprovalDateTime>,

    /// [`DateTime`] when this [`Application`] was rejected.
    pub rejected_at: Option<RejectionDateTime>,
}

impl Application {
    /// Returns the current [`Status`] of this [`Application`].
    #[must_use]
    pub fn status(&self) -> Status {
        if self.approved_at.is_some() {
            Status::Approved
        } else if self.rejected_at.is_some() {
            Status::Rejected
        } else {
            Status::Pending
        }
    }

    /// Checks whether this [`Application`] is still awaiting a decision.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status() == Status::Pending
    }
}

/// Status of an [`Application`], derived from its decision timestamps.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Status {
    /// Awaiting the trainer's decision.
    Pending,

    /// Approved by the trainer.
    Approved,

    /// Rejected by the trainer.
    Rejected,
}

/// ID of an [`Application`].
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

/// Marker type describing an [`Application`] approval.
#[derive(Clone, Copy, Debug)]
pub struct Approval;

/// Marker type describing an [`Application`] rejection.
#[derive(Clone, Copy, Debug)]
pub struct Rejection;

/// [`DateTime`] of an [`Application`] submission.
pub type CreationDateTime = DateTimeOf<(Application, unit::Creation)>;

/// [`DateTime`] of an [`Application`] approval.
pub type ApprovalDateTime = DateTimeOf<(Application, Approval)>;

/// [`DateTime`] of an [`Application`] rejection.
pub type RejectionDateTime = DateTimeOf<(Application, Rejection)>;

#[cfg(test)]
mod spec {
    use super::{
        Application, ApprovalDateTime, CreationDateTime, Id, RejectionDateTime,
        Status,
    };
    use crate::domain::{offering, user};

    fn pending() -> Application {
        Application {
            id: Id::new(),
            member_id: user::Id::new(),
            offering_id: offering::Id::new(),
            applied_at: CreationDateTime::now(),
            approved_at: None,
            rejected_at: None,
        }
    }

    #[test]
    fn status_is_derived_from_timestamps() {
        let mut application = pending();
        assert_eq!(application.status(), Status::Pending);
        assert!(application.is_pending());

        application.approved_at = Some(ApprovalDateTime::now());
        assert_eq!(application.status(), Status::Approved);
        assert!(!application.is_pending());

        let mut application = pending();
        application.rejected_at = Some(RejectionDateTime::now());
        assert_eq!(application.status(), Status::Rejected);
        assert!(!application.is_pending());
    }
}
