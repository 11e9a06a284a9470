//! Shared fold logic for segment- and track-level statistics.
//!
//! Every aggregate is a [`Merge`] value: `empty()` is the identity and `merge` is associative,
//! so a segment folds its points and a track folds its segments with the same rules.

use std::fmt;

pub trait Merge: Sized {
    fn empty() -> Self;
    fn merge(self, other: Self) -> Self;
}

/// Left-to-right fold starting from the identity.
pub fn fold<M, I>(items: I) -> M
where
    M: Merge,
    I: IntoIterator<Item = M>,
{
    items.into_iter().fold(M::empty(), M::merge)
}

/// Smallest value seen so far and where it occurred. On ties the left operand wins,
/// which makes a left-to-right fold keep the first occurrence.
pub struct Min<'a, P> {
    pub value: f64,
    pub at: Option<&'a P>,
}

/// Largest value seen so far and where it occurred. Ties keep the left operand.
pub struct Max<'a, P> {
    pub value: f64,
    pub at: Option<&'a P>,
}

impl<'a, P> Min<'a, P> {
    /// Singleton for one observation. NaN is not comparable and yields the identity.
    pub fn of(value: f64, at: &'a P) -> Self {
        if value.is_nan() {
            return Self::empty();
        }
        Min {
            value,
            at: Some(at),
        }
    }
}

impl<'a, P> Max<'a, P> {
    /// Singleton for one observation. NaN is not comparable and yields the identity.
    pub fn of(value: f64, at: &'a P) -> Self {
        if value.is_nan() {
            return Self::empty();
        }
        Max {
            value,
            at: Some(at),
        }
    }
}

impl<P> Merge for Min<'_, P> {
    fn empty() -> Self {
        Min {
            value: f64::INFINITY,
            at: None,
        }
    }

    fn merge(self, other: Self) -> Self {
        if other.value < self.value { other } else { self }
    }
}

impl<P> Merge for Max<'_, P> {
    fn empty() -> Self {
        Max {
            value: f64::NEG_INFINITY,
            at: None,
        }
    }

    fn merge(self, other: Self) -> Self {
        if other.value > self.value { other } else { self }
    }
}

// Manual impls: derives would require `P: Clone` even though only a reference is held.
impl<P> Clone for Min<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Min<'_, P> {}

impl<P> Clone for Max<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for Max<'_, P> {}

impl<P: PartialEq> PartialEq for Min<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.at == other.at
    }
}

impl<P: PartialEq> PartialEq for Max<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && self.at == other.at
    }
}

impl<P: fmt::Debug> fmt::Debug for Min<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Min")
            .field("value", &self.value)
            .field("at", &self.at)
            .finish()
    }
}

impl<P: fmt::Debug> fmt::Debug for Max<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Max")
            .field("value", &self.value)
            .field("at", &self.at)
            .finish()
    }
}
