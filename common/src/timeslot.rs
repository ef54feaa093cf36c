//! [`TimeSlot`]-related definitions.

use std::time::Duration;

use crate::DateTime;

/// Half-open interval of time `[starts_at, ends_at)`.
///
/// Two [`TimeSlot`]s sharing only a boundary point don't overlap, so
/// back-to-back slots are always allowed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeSlot {
    /// [`DateTime`] this [`TimeSlot`] starts at (inclusive).
    starts_at: DateTime,

    /// [`DateTime`] this [`TimeSlot`] ends at (exclusive).
    ends_at: DateTime,
}

impl TimeSlot {
    /// Creates a new [`TimeSlot`] if `starts_at` is strictly before `ends_at`.
    #[must_use]
    pub fn new(starts_at: DateTime, ends_at: DateTime) -> Option<Self> {
        (starts_at < ends_at).then_some(Self { starts_at, ends_at })
    }

    /// Creates a new [`TimeSlot`] without checking its bounds.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `starts_at` is strictly before `ends_at`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(starts_at: DateTime, ends_at: DateTime) -> Self {
        Self { starts_at, ends_at }
    }

    /// Returns the [`DateTime`] this [`TimeSlot`] starts at.
    #[must_use]
    pub fn starts_at(&self) -> DateTime {
        self.starts_at
    }

    /// Returns the [`DateTime`] this [`TimeSlot`] ends at.
    #[must_use]
    pub fn ends_at(&self) -> DateTime {
        self.ends_at
    }

    /// Returns the [`Duration`] of this [`TimeSlot`].
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.ends_at - self.starts_at
    }

    /// Checks whether this [`TimeSlot`] overlaps with the `other` one.
    ///
    /// Intervals are half-open, meaning that a [`TimeSlot`] ending exactly
    /// when the `other` one starts doesn't overlap with it.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.starts_at < other.ends_at && other.starts_at < self.ends_at
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use crate::DateTime;

    use super::TimeSlot;

    fn at(secs: u64) -> DateTime {
        DateTime::UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn slot(starts_at: u64, ends_at: u64) -> TimeSlot {
        TimeSlot::new(at(starts_at), at(ends_at)).unwrap()
    }

    #[test]
    fn requires_positive_length() {
        assert!(TimeSlot::new(at(100), at(200)).is_some());
        assert!(TimeSlot::new(at(100), at(100)).is_none());
        assert!(TimeSlot::new(at(200), at(100)).is_none());
    }

    #[test]
    fn measures_duration() {
        assert_eq!(slot(100, 160).duration(), Duration::from_secs(60));
    }

    #[test]
    fn overlaps_itself() {
        let s = slot(100, 200);

        assert!(s.overlaps(&s));
    }

    #[test]
    fn overlaps_when_intersecting() {
        assert!(slot(100, 200).overlaps(&slot(150, 250)));
        assert!(slot(150, 250).overlaps(&slot(100, 200)));
        assert!(slot(100, 200).overlaps(&slot(199, 300)));
    }

    #[test]
    fn overlaps_when_contained() {
        assert!(slot(100, 400).overlaps(&slot(200, 300)));
        assert!(slot(200, 300).overlaps(&slot(100, 400)));
    }

    #[test]
    fn ignores_disjoint() {
        assert!(!slot(100, 200).overlaps(&slot(300, 400)));
        assert!(!slot(300, 400).overlaps(&slot(100, 200)));
    }

    #[test]
    fn ignores_back_to_back() {
        assert!(!slot(100, 200).overlaps(&slot(200, 300)));
        assert!(!slot(200, 300).overlaps(&slot(100, 200)));
    }
}
