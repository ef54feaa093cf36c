//! [`Offering`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Application;
use crate::domain::user;

/// Personal-training package published by a trainer.
///
/// An [`Offering`] is the unit of sale: approving an [`Application`] for it
/// opens a contract granting [`Offering::total_sessions`] sessions.
#[derive(Clone, Debug, From)]
pub struct Offering {
    /// ID of this [`Offering`].
    pub id: Id,

    /// ID of the trainer [`user`] who published this [`Offering`].
    pub trainer_id: user::Id,

    /// [`Title`] of this [`Offering`].
    pub title: Title,

    /// [`Description`] of this [`Offering`].
    pub description: Option<Description>,

    /// [`Price`] of this [`Offering`].
    pub price: Price,

    /// Number of sessions this [`Offering`] grants.
    pub total_sessions: SessionCount,

    /// [`DateTime`] when this [`Offering`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Offering`] was deactivated.
    pub deactivated_at: Option<DeactivationDateTime>,
}

impl Offering {
    /// Checks whether this [`Offering`] accepts new [`Application`]s.
    #[must_use]
    pub fn is_sellable(&self) -> bool {
        self.deactivated_at.is_none()
    }
}

/// ID of an [`Offering`].
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

/// Title of an [`Offering`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("incorrect `offering::Title` format")
    }
}

/// Description of an [`Offering`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Description(String);

impl Description {
    /// Creates a new [`Description`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `description` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(description: impl Into<String>) -> Self {
        Self(description.into())
    }

    /// Creates a new [`Description`] if the given `description` is valid.
    #[must_use]
    pub fn new(description: impl Into<String>) -> Option<Self> {
        let description = description.into();
        Self::check(&description).then_some(Self(description))
    }

    /// Checks whether the given `description` is a valid [`Description`].
    fn check(description: impl AsRef<str>) -> bool {
        let description = description.as_ref();
        !description.is_empty() && description.len() <= 2048
    }
}

impl FromStr for Description {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("incorrect `offering::Description` format")
    }
}

/// Price of an [`Offering`].
///
/// Guaranteed to be non-negative.
#[derive(AsRef, Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Price(Money);

impl Price {
    /// Creates a new [`Price`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `money` amount is non-negative.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(money: Money) -> Self {
        Self(money)
    }

    /// Creates a new [`Price`] if the given `money` amount is non-negative.
    #[must_use]
    pub fn new(money: Money) -> Option<Self> {
        (!money.amount.is_sign_negative()).then_some(Self(money))
    }
}

impl FromStr for Price {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let money = s.parse().map_err(|_| "incorrect `Money` format")?;
        Self::new(money).ok_or("negative `offering::Price`")
    }
}

/// Number of sessions granted by an [`Offering`].
///
/// Guaranteed to be positive.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Into, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct SessionCount(i32);

impl SessionCount {
    /// Creates a new [`SessionCount`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `count` is positive.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(count: i32) -> Self {
        Self(count)
    }

    /// Creates a new [`SessionCount`] if the given `count` is positive.
    #[must_use]
    pub fn new(count: i32) -> Option<Self> {
        (count > 0).then_some(Self(count))
    }
}

/// Marker type describing an [`Offering`] deactivation.
#[derive(Clone, Copy, Debug)]
pub struct Deactivation;

/// [`DateTime`] of an [`Offering`] creation.
pub type CreationDateTime = DateTimeOf<(Offering, unit::Creation)>;

/// [`DateTime`] of an [`Offering`] deactivation.
pub type DeactivationDateTime = DateTimeOf<(Offering, Deactivation)>;

#[cfg(test)]
mod spec {
    use common::Money;

    use super::{Price, SessionCount};

    #[test]
    fn price_refuses_negative_amount() {
        assert!(Price::new(Money {
            amount: "-0.01".parse().unwrap(),
            currency: common::money::Currency::Usd,
        })
        .is_none());

        assert!(Price::new(Money {
            amount: "0".parse().unwrap(),
            currency: common::money::Currency::Usd,
        })
        .is_some());
    }

    #[test]
    fn session_count_requires_positive() {
        assert!(SessionCount::new(0).is_none());
        assert!(SessionCount::new(-3).is_none());
        assert_eq!(SessionCount::new(10).map(i32::from), Some(10));
    }
}
