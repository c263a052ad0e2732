//! A two-level boolean rule structure shared by every rule kind.
//!
//! An [`AndGroup`] is satisfied when every one of its [`OrGroup`]s is
//! satisfied; an `OrGroup` is satisfied when any of its values matches,
//! inverted when the group is negated.
//!
//! An `AndGroup` with no groups imposes no constraint. It is distinct from an
//! `AndGroup` holding an `OrGroup` with no values, which can never be
//! satisfied (unless negated).

use crate::matcher::Matches;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrGroup<T> {
    values: Vec<T>,
    negate: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AndGroup<T> {
    groups: Vec<OrGroup<T>>,
}

// === impl OrGroup ===

impl<T> OrGroup<T> {
    /// Builds a group from the alternatives of a single clause. The negation
    /// applies to the clause as a whole.
    pub fn new(values: Vec<T>, negate: bool) -> Self {
        Self { values, negate }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn is_negated(&self) -> bool {
        self.negate
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn matches<C>(&self, ctx: &C) -> bool
    where
        C: ?Sized,
        T: Matches<C>,
    {
        self.negate ^ self.values.iter().any(|v| v.matches(ctx))
    }
}

// === impl AndGroup ===

impl<T> Default for AndGroup<T> {
    fn default() -> Self {
        Self { groups: Vec::new() }
    }
}

impl<T> AndGroup<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: OrGroup<T>) {
        self.groups.push(group);
    }

    /// Returns true if no group was ever added.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[OrGroup<T>] {
        &self.groups
    }

    pub fn matches<C>(&self, ctx: &C) -> bool
    where
        C: ?Sized,
        T: Matches<C>,
    {
        self.groups.iter().all(|g| g.matches(ctx))
    }
}

impl<T> FromIterator<OrGroup<T>> for AndGroup<T> {
    fn from_iter<I: IntoIterator<Item = OrGroup<T>>>(iter: I) -> Self {
        Self {
            groups: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<OrGroup<T>> for AndGroup<T> {
    fn extend<I: IntoIterator<Item = OrGroup<T>>>(&mut self, iter: I) {
        self.groups.extend(iter);
    }
}
