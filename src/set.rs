//! The ordered entry set. An [`EntrySet`] is a growable buffer of signed
//! 64-bit entry identifiers kept strictly increasing, so uniqueness is
//! automatic. Producers populate it one entry at a time through
//! [`EntrySet::enter`] (in or out of order), and whole sets are combined
//! through [`EntrySet::add`], [`EntrySet::subtract`] and
//! [`EntrySet::intersect`], which also fold the sets' selection labels
//! through an injected [`CombineExpr`].

use crate::expr::{BoolOp, CombineExpr, CutExpr};
use crate::AndNot;
use smallvec::SmallVec;
use std::cmp;
use std::cmp::Ordering;
use std::iter::FromIterator;
use std::ops::{BitAnd, BitOr};
use std::{fmt, slice};

/// Number of entries kept in stack before we spill into heap. Many
/// selections contain a single entry (think equality filters), so a small
/// inline buffer keeps those allocation free without bloating the struct.
const DEFAULT_INLINE: usize = 2;

/// Floor applied to initial-capacity and growth hints. Smaller hints are
/// silently raised to this, so pathological growth increments cannot turn
/// append into quadratic behaviour.
const CAPACITY_FLOOR: usize = 100;

fn default_grow_by() -> usize {
    CAPACITY_FLOOR
}

/// An ordered, deduplicated set of `i64` entry identifiers.
///
/// The buffer is always strictly increasing. Set operations assume both
/// operands satisfy that invariant; a set filled from an unsorted source
/// (for example a legacy serialised payload) must be normalised with
/// [`EntrySet::sort`] before any set algebra on it can be trusted.
///
/// Each set carries an opaque selection label naming the condition that
/// produced it. The label is combined - never parsed - whenever two sets
/// are combined.
///
/// # Examples
/// ```
/// use entryset::EntrySet;
/// use std::iter::FromIterator;
///
/// let set_a = EntrySet::from_iter(vec![1, 3, 5, 7]);
/// let set_b = EntrySet::from_iter(vec![3, 4, 5]);
///
/// // Union of the two selections.
/// let set_result = &set_a | &set_b;
///
/// let set_expect = EntrySet::from_iter(vec![1, 3, 4, 5, 7]);
/// assert_eq!(set_result, set_expect);
/// ```
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename = "ES")]
pub struct EntrySet {
    #[serde(rename = "e")]
    entries: SmallVec<[i64; DEFAULT_INLINE]>,
    #[serde(rename = "l", default)]
    label: String,
    #[serde(rename = "d", default = "default_grow_by")]
    grow_by: usize,
}

impl Default for EntrySet {
    /// Construct a new, empty set. No buffer is allocated until the first
    /// entry arrives.
    fn default() -> Self {
        EntrySet {
            entries: SmallVec::new(),
            label: String::new(),
            grow_by: CAPACITY_FLOOR,
        }
    }
}

impl EntrySet {
    /// Construct a new, empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct an empty set with an explicit initial capacity and growth
    /// increment. Both hints are silently clamped to a floor of 100.
    pub fn with_capacity(initial: usize, grow_by: usize) -> Self {
        EntrySet {
            entries: SmallVec::with_capacity(cmp::max(initial, CAPACITY_FLOOR)),
            label: String::new(),
            grow_by: cmp::max(grow_by, CAPACITY_FLOOR),
        }
    }

    /// Construct a set containing a single initial entry. Single entry
    /// selections are common enough (equality filters) to deserve a
    /// shortcut that stays inline, off the heap.
    pub fn from_entry(entry: i64) -> Self {
        EntrySet {
            entries: smallvec![entry],
            label: String::new(),
            grow_by: CAPACITY_FLOOR,
        }
    }

    /// Returns the number of entries in the set.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Show if this set contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current buffer capacity. Never smaller than `len()`.
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// The growth increment applied when the buffer is exhausted and no
    /// larger request is made.
    pub fn grow_by(&self) -> usize {
        self.grow_by
    }

    /// The opaque selection label describing the condition that produced
    /// this set.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Replace the selection label.
    pub fn set_label(&mut self, label: &str) {
        self.label = label.to_string();
    }

    /// Expose the raw entry sequence. This is the boundary used by
    /// external codecs to persist the set; only `len()` entries exist,
    /// spare capacity is never visible.
    pub fn as_slice(&self) -> &[i64] {
        self.entries.as_slice()
    }

    /// Iterate the entries in ascending order.
    pub fn iter(&self) -> EntrySetIter<'_> {
        EntrySetIter {
            inner: self.entries.iter(),
        }
    }

    fn is_ordered(&self) -> bool {
        self.entries.windows(2).all(|w| w[0] < w[1])
    }

    /// Returns `true` if `entry` exists within the set.
    pub fn contains(&self, entry: i64) -> bool {
        self.get_index(entry).is_some()
    }

    /// Returns `true` if the set holds at least one entry in the inclusive
    /// range `[low, high]`. An empty set contains no range.
    pub fn contains_range(&self, low: i64, high: i64) -> bool {
        // Index just past the largest entry <= high. Zero means every
        // entry is above the range (or the set is empty).
        let idx = self.entries.partition_point(|&e| e <= high);
        if idx == 0 {
            return false;
        }
        self.entries[idx - 1] >= low
    }

    /// Return the position of `entry`, or `None` if it is absent. O(log n).
    pub fn get_index(&self, entry: i64) -> Option<usize> {
        self.entries.binary_search(&entry).ok()
    }

    /// Return the entry at `index`, or `None` if `index` is out of range.
    pub fn get_entry(&self, index: usize) -> Option<i64> {
        self.entries.get(index).copied()
    }

    /// Insert `entry`, preserving sort order and uniqueness. Entries
    /// already present are silently skipped.
    ///
    /// Appending in increasing order is amortised O(1); an out-of-order
    /// entry costs a binary search plus a shift of the tail.
    pub fn enter(&mut self, entry: i64) {
        if let Some(&last) = self.entries.last() {
            // Producers scanning overlapping records re-emit the tail
            // entry constantly, so this exact case is checked first.
            if entry == last {
                return;
            }
            if self.entries.len() == self.entries.capacity() {
                let cap = self.entries.capacity();
                let newsize = cmp::max(2 * cap, self.entries.len() + self.grow_by);
                self.resize(newsize - cap);
            }
            if entry > last {
                self.entries.push(entry);
            } else if let Err(idx) = self.entries.binary_search(&entry) {
                self.entries.insert(idx, entry);
            }
        } else {
            self.entries.push(entry);
        }
    }

    /// Merge `other` into this set (sorted union, duplicates removed).
    /// Both operands must be sorted; `other` is not modified. The label
    /// becomes the OR of the two inputs' labels.
    pub fn add<E: CombineExpr + ?Sized>(&mut self, other: &EntrySet, expr: &E) {
        debug_assert!(self.is_ordered());
        debug_assert!(other.is_ordered());
        if other.is_empty() {
            return;
        }
        if self.entries.is_empty() {
            self.entries.extend_from_slice(other.as_slice());
        } else {
            let mut nlist = SmallVec::with_capacity(self.entries.len() + other.entries.len());

            let mut liter = self.entries.iter();
            let mut riter = other.entries.iter();

            let mut lnext = liter.next();
            let mut rnext = riter.next();

            while lnext.is_some() && rnext.is_some() {
                let l = lnext.unwrap();
                let r = rnext.unwrap();

                let n = match l.cmp(r) {
                    Ordering::Equal => {
                        lnext = liter.next();
                        rnext = riter.next();
                        l
                    }
                    Ordering::Less => {
                        lnext = liter.next();
                        l
                    }
                    Ordering::Greater => {
                        rnext = riter.next();
                        r
                    }
                };
                nlist.push(*n);
            }

            while let Some(l) = lnext {
                nlist.push(*l);
                lnext = liter.next();
            }

            while let Some(r) = rnext {
                nlist.push(*r);
                rnext = riter.next();
            }

            self.entries = nlist;
        }
        self.label = expr.combine(&self.label, &other.label, BoolOp::Or);
    }

    /// Remove from this set every entry present in `other` (difference).
    /// Both operands must be sorted; `other` is not modified. The label
    /// becomes the AND-NOT of the two inputs' labels.
    pub fn subtract<E: CombineExpr + ?Sized>(&mut self, other: &EntrySet, expr: &E) {
        debug_assert!(self.is_ordered());
        debug_assert!(other.is_ordered());
        if self.entries.is_empty() {
            return;
        }
        if !other.entries.is_empty() {
            let mut nlist = SmallVec::with_capacity(self.entries.len());

            let mut liter = self.entries.iter();
            let mut riter = other.entries.iter();

            let mut lnext = liter.next();
            let mut rnext = riter.next();

            while lnext.is_some() && rnext.is_some() {
                let l = lnext.unwrap();
                let r = rnext.unwrap();

                match l.cmp(r) {
                    Ordering::Equal => {
                        // Present in other, exclude it.
                        lnext = liter.next();
                        rnext = riter.next();
                    }
                    Ordering::Less => {
                        nlist.push(*l);
                        lnext = liter.next();
                    }
                    Ordering::Greater => {
                        rnext = riter.next();
                    }
                }
            }

            while let Some(l) = lnext {
                nlist.push(*l);
                lnext = liter.next();
            }

            self.entries = nlist;
        }
        self.label = expr.combine(&self.label, &other.label, BoolOp::AndNot);
    }

    /// Keep only the entries of this set that are also present in `other`
    /// (intersection). Both operands must be sorted; `other` is not
    /// modified. The label becomes the AND of the two inputs' labels.
    pub fn intersect<E: CombineExpr + ?Sized>(&mut self, other: &EntrySet, expr: &E) {
        debug_assert!(self.is_ordered());
        debug_assert!(other.is_ordered());
        if self.entries.is_empty() {
            return;
        }
        let mut nlist = SmallVec::with_capacity(cmp::min(self.entries.len(), other.entries.len()));

        let mut liter = self.entries.iter();
        let mut riter = other.entries.iter();

        let mut lnext = liter.next();
        let mut rnext = riter.next();

        while lnext.is_some() && rnext.is_some() {
            let l = lnext.unwrap();
            let r = rnext.unwrap();

            match l.cmp(r) {
                Ordering::Equal => {
                    nlist.push(*l);
                    lnext = liter.next();
                    rnext = riter.next();
                }
                Ordering::Less => {
                    lnext = liter.next();
                }
                Ordering::Greater => {
                    rnext = riter.next();
                }
            }
        }

        self.entries = nlist;
        self.label = expr.combine(&self.label, &other.label, BoolOp::And);
    }

    /// Fold [`EntrySet::add`] over a collection of sets, in sequence
    /// order. Returns the total number of entries the operands offered
    /// (duplicates counted), not the final set size.
    pub fn merge<'a, I, E>(&mut self, sets: I, expr: &E) -> usize
    where
        I: IntoIterator<Item = &'a EntrySet>,
        E: CombineExpr + ?Sized,
    {
        let mut entered = 0;
        for set in sets {
            entered += set.len();
            self.add(set, expr);
        }
        entered
    }

    /// Forget all entries. The buffer and its capacity are retained so a
    /// reused set amortises future insertions. The label is kept.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Grow the buffer capacity by `delta` entries, or by the growth
    /// increment when `delta` is zero. Never shrinks.
    pub fn resize(&mut self, delta: usize) {
        let delta = if delta == 0 { self.grow_by } else { delta };
        let target = self.entries.capacity() + delta;
        self.entries.reserve_exact(target - self.entries.len());
    }

    /// Re-establish the order invariant from an arbitrary buffer state,
    /// for example after deserialising a payload written unsorted by an
    /// older producer: stable ascending sort, then duplicate removal.
    pub fn sort(&mut self) {
        self.entries.sort();
        self.entries.dedup();
    }
}

impl FromIterator<i64> for EntrySet {
    /// Build an EntrySet from an iterator. Sorted input takes the fast
    /// append path inside [`EntrySet::enter`]; unsorted input falls back
    /// to binary-search insertion. Duplicates are dropped either way.
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let (lower_bound, _) = iter.size_hint();

        let mut new = EntrySet {
            entries: SmallVec::with_capacity(lower_bound),
            ..Default::default()
        };

        iter.for_each(|i| new.enter(i));

        new.entries.shrink_to_fit();
        new
    }
}

impl PartialEq for EntrySet {
    /// Two sets are equal when they hold the same entries. Labels record
    /// provenance, not identity, and are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for EntrySet {}

impl fmt::Display for EntrySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "EntrySet (entries) {} (label) {:?}",
            self.entries.len(),
            self.label
        )
    }
}

impl fmt::Debug for EntrySet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "EntrySet (entries) {} (label) {:?} [ ",
            self.entries.len(),
            self.label
        )?;
        for id in self {
            write!(f, "{}, ", id)?;
        }
        write!(f, "]")
    }
}

/// An iterator over the contents of an EntrySet.
#[derive(Debug)]
pub struct EntrySetIter<'a> {
    inner: slice::Iter<'a, i64>,
}

impl<'a> Iterator for EntrySetIter<'a> {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        self.inner.next().copied()
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = i64;
    type IntoIter = EntrySetIter<'a>;

    fn into_iter(self) -> EntrySetIter<'a> {
        self.iter()
    }
}

impl BitOr for &EntrySet {
    type Output = EntrySet;

    /// Perform an Or (union) operation between two sets. This returns a
    /// new set containing the results, with the labels combined through
    /// the default [`CutExpr`].
    ///
    /// # Examples
    /// ```
    /// # use entryset::EntrySet;
    /// # use std::iter::FromIterator;
    /// let set_a = EntrySet::from_iter(vec![1, 2, 3]);
    /// let set_b = EntrySet::from_iter(vec![2]);
    ///
    /// let set_result = &set_a | &set_b;
    ///
    /// let set_expect = EntrySet::from_iter(vec![1, 2, 3]);
    /// assert_eq!(set_result, set_expect);
    /// ```
    fn bitor(self, rhs: &EntrySet) -> EntrySet {
        let mut result = self.clone();
        result.add(rhs, &CutExpr);
        result
    }
}

impl BitOr for EntrySet {
    type Output = EntrySet;

    /// Perform an Or (union) operation between two sets. This returns a
    /// new set containing the results, with the labels combined through
    /// the default [`CutExpr`].
    fn bitor(self, rhs: Self) -> EntrySet {
        let mut result = self;
        result.add(&rhs, &CutExpr);
        result
    }
}

impl BitAnd for &EntrySet {
    type Output = EntrySet;

    /// Perform an And (intersection) operation between two sets. This
    /// returns a new set containing the results, with the labels combined
    /// through the default [`CutExpr`].
    ///
    /// # Examples
    /// ```
    /// # use entryset::EntrySet;
    /// # use std::iter::FromIterator;
    /// let set_a = EntrySet::from_iter(vec![1, 2, 3]);
    /// let set_b = EntrySet::from_iter(vec![2]);
    ///
    /// let set_result = &set_a & &set_b;
    ///
    /// let set_expect = EntrySet::from_iter(vec![2]);
    /// assert_eq!(set_result, set_expect);
    /// ```
    fn bitand(self, rhs: &EntrySet) -> EntrySet {
        let mut result = self.clone();
        result.intersect(rhs, &CutExpr);
        result
    }
}

impl BitAnd for EntrySet {
    type Output = EntrySet;

    /// Perform an And (intersection) operation between two sets. This
    /// returns a new set containing the results, with the labels combined
    /// through the default [`CutExpr`].
    fn bitand(self, rhs: Self) -> EntrySet {
        let mut result = self;
        result.intersect(&rhs, &CutExpr);
        result
    }
}

impl AndNot for &EntrySet {
    type Output = EntrySet;

    /// Perform an AndNot (difference) operation between two sets. The set
    /// on the right is excluded from the set on the left; labels are
    /// combined through the default [`CutExpr`].
    ///
    /// # Examples
    /// ```
    /// // Note the import of the AndNot trait.
    /// use entryset::{AndNot, EntrySet};
    /// # use std::iter::FromIterator;
    ///
    /// let set_a = EntrySet::from_iter(vec![1, 2, 3]);
    /// let set_b = EntrySet::from_iter(vec![2]);
    ///
    /// let set_result = (&set_a).andnot(&set_b);
    ///
    /// let set_expect = EntrySet::from_iter(vec![1, 3]);
    /// assert_eq!(set_result, set_expect);
    /// ```
    fn andnot(self, rhs: &EntrySet) -> EntrySet {
        let mut result = self.clone();
        result.subtract(rhs, &CutExpr);
        result
    }
}

impl AndNot for EntrySet {
    type Output = EntrySet;

    /// Perform an AndNot (difference) operation between two sets. The set
    /// on the right is excluded from the set on the left; labels are
    /// combined through the default [`CutExpr`].
    fn andnot(self, rhs: Self) -> EntrySet {
        let mut result = self;
        result.subtract(&rhs, &CutExpr);
        result
    }
}
