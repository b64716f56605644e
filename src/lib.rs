//! entryset - An ordered, deduplicated set of signed 64-bit entry identifiers.
//!
//! An [`EntrySet`] holds the identifiers of records selected by some query or
//! filter, kept strictly increasing with no duplicates. It is built
//! incrementally - one entry at a time, in or out of order - and then combined
//! with other sets through union, intersection and difference to produce
//! filtered views. Each set carries an opaque selection label describing the
//! condition that produced it; labels are combined through a strategy you
//! inject (see [`expr`]), never parsed here.
//!
//! Sets may optionally be attached to a [`registry::Registry`] for
//! lookup-by-name. The set itself never touches any ambient global state.

#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate smallvec;

/// Perform an AndNot (set difference) operation. As this is not a native rust
/// operator, this is provided as a trait rather than `std::ops`.
pub trait AndNot<RHS = Self> {
    /// The type of the result set.
    type Output;
    /// Remove all elements of `rhs` from `self`, yielding the result.
    fn andnot(self, rhs: RHS) -> Self::Output;
}

pub mod expr;
pub mod registry;
pub mod set;

pub use crate::set::EntrySet;
