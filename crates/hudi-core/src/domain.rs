//! # Predicate Domains
//!
//! A query predicate that has been decomposed per column is represented as a
//! [`TupleDomain`]: a conjunction of per-column [`Domain`]s. Each `Domain` is the
//! complete description of which values (and whether null) one column may take.
//!
//! ## Representation
//!
//! - [`Range`]: an interval over [`ScalarValue`]s with `std::ops::Bound` endpoints.
//! - [`SortedRangeSet`]: a union of ranges kept sorted, non-overlapping and
//!   non-adjacent, so that membership is a binary search and equality is structural.
//! - [`Domain`]: a range set plus a null-allowed flag.
//! - [`TupleDomain`]: either "none" (no row can match) or a map from column to
//!   domain. Columns absent from the map are unconstrained.
//!
//! ## Normalization
//!
//! `TupleDomain` construction drops "all" domains and collapses to "none" as soon
//! as any column's domain is empty. Two tuple domains describing the same predicate
//! therefore compare equal.
//!
//! ## Typing
//!
//! Every range set is bound to a single [`Type`]. Values are checked against that
//! type when ranges are built and when membership is tested; a mismatch is a caller
//! bug and surfaces as [`HudiError::TypeMismatch`].

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::ops::Bound;

use crate::error::{HudiError, Result};
use crate::types::Type;
use crate::value::ScalarValue;

// Values within one range set share a type, so they are always comparable.
fn cmp_values(a: &ScalarValue, b: &ScalarValue) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

fn cmp_low(a: &Bound<ScalarValue>, b: &Bound<ScalarValue>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Less,
        (_, Bound::Unbounded) => Ordering::Greater,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            cmp_values(x, y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => cmp_values(x, y).then(Ordering::Less),
        (Bound::Excluded(x), Bound::Included(y)) => cmp_values(x, y).then(Ordering::Greater),
    }
}

fn cmp_high(a: &Bound<ScalarValue>, b: &Bound<ScalarValue>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Greater,
        (_, Bound::Unbounded) => Ordering::Less,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            cmp_values(x, y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => cmp_values(x, y).then(Ordering::Greater),
        (Bound::Excluded(x), Bound::Included(y)) => cmp_values(x, y).then(Ordering::Less),
    }
}

fn bound_value(bound: &Bound<ScalarValue>) -> Option<&ScalarValue> {
    match bound {
        Bound::Included(v) | Bound::Excluded(v) => Some(v),
        Bound::Unbounded => None,
    }
}

fn check_value(ty: &Type, value: &ScalarValue) -> Result<()> {
    if value.matches_type(ty) {
        Ok(())
    } else {
        Err(HudiError::type_mismatch(ty, format!("{} value {}", value.kind(), value)))
    }
}

/// Interval of values between two bounds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    low: Bound<ScalarValue>,
    high: Bound<ScalarValue>,
}

impl Range {
    pub fn new(low: Bound<ScalarValue>, high: Bound<ScalarValue>) -> Self {
        Self { low, high }
    }

    /// Every non-null value.
    pub fn all() -> Self {
        Self::new(Bound::Unbounded, Bound::Unbounded)
    }

    pub fn equal(value: ScalarValue) -> Self {
        Self::new(Bound::Included(value.clone()), Bound::Included(value))
    }

    pub fn greater_than(value: ScalarValue) -> Self {
        Self::new(Bound::Excluded(value), Bound::Unbounded)
    }

    pub fn greater_than_or_equal(value: ScalarValue) -> Self {
        Self::new(Bound::Included(value), Bound::Unbounded)
    }

    pub fn less_than(value: ScalarValue) -> Self {
        Self::new(Bound::Unbounded, Bound::Excluded(value))
    }

    pub fn less_than_or_equal(value: ScalarValue) -> Self {
        Self::new(Bound::Unbounded, Bound::Included(value))
    }

    pub fn low(&self) -> &Bound<ScalarValue> {
        &self.low
    }

    pub fn high(&self) -> &Bound<ScalarValue> {
        &self.high
    }

    /// True when no value lies between the bounds (e.g. `(5, 5]` or `[7, 3]`).
    pub fn is_empty(&self) -> bool {
        match (&self.low, &self.high) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => false,
            (Bound::Included(a), Bound::Included(b)) => cmp_values(a, b) == Ordering::Greater,
            (Bound::Included(a), Bound::Excluded(b))
            | (Bound::Excluded(a), Bound::Included(b))
            | (Bound::Excluded(a), Bound::Excluded(b)) => cmp_values(a, b) != Ordering::Less,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!((&self.low, &self.high), (Bound::Unbounded, Bound::Unbounded))
    }

    pub fn is_single_value(&self) -> bool {
        match (&self.low, &self.high) {
            (Bound::Included(a), Bound::Included(b)) => a == b,
            _ => false,
        }
    }

    pub fn includes(&self, value: &ScalarValue) -> bool {
        let above_low = match &self.low {
            Bound::Unbounded => true,
            Bound::Included(low) => cmp_values(low, value) != Ordering::Greater,
            Bound::Excluded(low) => cmp_values(low, value) == Ordering::Less,
        };
        let below_high = match &self.high {
            Bound::Unbounded => true,
            Bound::Included(high) => cmp_values(value, high) != Ordering::Greater,
            Bound::Excluded(high) => cmp_values(value, high) == Ordering::Less,
        };
        above_low && below_high
    }

    /// Overlap of two ranges, `None` when they are disjoint.
    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let low = if cmp_low(&self.low, &other.low) == Ordering::Less {
            other.low.clone()
        } else {
            self.low.clone()
        };
        let high = if cmp_high(&self.high, &other.high) == Ordering::Greater {
            other.high.clone()
        } else {
            self.high.clone()
        };
        let range = Range::new(low, high);
        (!range.is_empty()).then_some(range)
    }

    /// Whether `next`, which starts no earlier than `self`, overlaps or touches it.
    fn connects(&self, next: &Range) -> bool {
        match (&self.high, &next.low) {
            (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
            (Bound::Excluded(high), Bound::Excluded(low)) => cmp_values(low, high) == Ordering::Less,
            (Bound::Included(high), Bound::Included(low))
            | (Bound::Included(high), Bound::Excluded(low))
            | (Bound::Excluded(high), Bound::Included(low)) => {
                cmp_values(low, high) != Ordering::Greater
            }
        }
    }

    fn values(&self) -> impl Iterator<Item = &ScalarValue> {
        bound_value(&self.low).into_iter().chain(bound_value(&self.high))
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_value() {
            if let Bound::Included(v) = &self.low {
                return write!(f, "[{}]", v);
            }
        }
        match &self.low {
            Bound::Unbounded => write!(f, "(<min>")?,
            Bound::Included(v) => write!(f, "[{}", v)?,
            Bound::Excluded(v) => write!(f, "({}", v)?,
        }
        match &self.high {
            Bound::Unbounded => write!(f, ", <max>)"),
            Bound::Included(v) => write!(f, ", {}]", v),
            Bound::Excluded(v) => write!(f, ", {})", v),
        }
    }
}

/// Sorted union of disjoint, non-adjacent ranges over one type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortedRangeSet {
    ty: Type,
    ranges: Vec<Range>,
}

impl SortedRangeSet {
    pub fn none(ty: Type) -> Self {
        Self {
            ty,
            ranges: Vec::new(),
        }
    }

    pub fn all(ty: Type) -> Self {
        Self {
            ty,
            ranges: vec![Range::all()],
        }
    }

    /// Build a normalized set from arbitrary ranges. Empty ranges are discarded;
    /// overlapping and adjacent ranges are merged.
    pub fn of_ranges(ty: Type, ranges: impl IntoIterator<Item = Range>) -> Result<Self> {
        let mut input = Vec::new();
        for range in ranges {
            for value in range.values() {
                check_value(&ty, value)?;
            }
            if !range.is_empty() {
                input.push(range);
            }
        }
        input.sort_by(|a, b| cmp_low(&a.low, &b.low));

        let mut merged: Vec<Range> = Vec::with_capacity(input.len());
        for range in input {
            match merged.last_mut() {
                Some(last) if last.connects(&range) => {
                    if cmp_high(&range.high, &last.high) == Ordering::Greater {
                        last.high = range.high;
                    }
                }
                _ => merged.push(range),
            }
        }
        Ok(Self { ty, ranges: merged })
    }

    pub fn of_values(ty: Type, values: impl IntoIterator<Item = ScalarValue>) -> Result<Self> {
        Self::of_ranges(ty, values.into_iter().map(Range::equal))
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    pub fn is_none(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn is_all(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].is_all()
    }

    pub fn is_single_value(&self) -> bool {
        self.ranges.len() == 1 && self.ranges[0].is_single_value()
    }

    pub fn single_value(&self) -> Option<&ScalarValue> {
        match self.ranges.as_slice() {
            [range] if range.is_single_value() => bound_value(&range.low),
            _ => None,
        }
    }

    pub fn includes(&self, value: &ScalarValue) -> Result<bool> {
        check_value(&self.ty, value)?;
        // Ranges are sorted by low bound: find the last one starting at or before `value`.
        let idx = self.ranges.partition_point(|r| match &r.low {
            Bound::Unbounded => true,
            Bound::Included(low) => cmp_values(low, value) != Ordering::Greater,
            Bound::Excluded(low) => cmp_values(low, value) == Ordering::Less,
        });
        Ok(idx > 0 && self.ranges[idx - 1].includes(value))
    }

    pub fn intersect(&self, other: &SortedRangeSet) -> Result<Self> {
        self.check_compatible(other)?;
        let mut ranges = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.ranges.len() && j < other.ranges.len() {
            let (a, b) = (&self.ranges[i], &other.ranges[j]);
            if let Some(range) = a.intersect(b) {
                ranges.push(range);
            }
            if cmp_high(&a.high, &b.high) == Ordering::Less {
                i += 1;
            } else {
                j += 1;
            }
        }
        Ok(Self {
            ty: self.ty,
            ranges,
        })
    }

    pub fn union(&self, other: &SortedRangeSet) -> Result<Self> {
        self.check_compatible(other)?;
        Self::of_ranges(
            self.ty,
            self.ranges.iter().chain(other.ranges.iter()).cloned(),
        )
    }

    fn check_compatible(&self, other: &SortedRangeSet) -> Result<()> {
        if self.ty == other.ty {
            Ok(())
        } else {
            Err(HudiError::type_mismatch(self.ty, other.ty))
        }
    }
}

impl fmt::Display for SortedRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ranges: Vec<String> = self.ranges.iter().map(|r| r.to_string()).collect();
        write!(f, "{{{}}}", ranges.join(", "))
    }
}

/// Allowed values of a single column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Domain {
    values: SortedRangeSet,
    null_allowed: bool,
}

impl Domain {
    pub fn create(values: SortedRangeSet, null_allowed: bool) -> Self {
        Self {
            values,
            null_allowed,
        }
    }

    /// Every value, including null.
    pub fn all(ty: Type) -> Self {
        Self::create(SortedRangeSet::all(ty), true)
    }

    /// No value, not even null.
    pub fn none(ty: Type) -> Self {
        Self::create(SortedRangeSet::none(ty), false)
    }

    pub fn only_null(ty: Type) -> Self {
        Self::create(SortedRangeSet::none(ty), true)
    }

    /// Every value except null.
    pub fn not_null(ty: Type) -> Self {
        Self::create(SortedRangeSet::all(ty), false)
    }

    pub fn single_value(ty: Type, value: ScalarValue) -> Result<Self> {
        Ok(Self::create(SortedRangeSet::of_values(ty, [value])?, false))
    }

    pub fn multiple_values(ty: Type, values: Vec<ScalarValue>) -> Result<Self> {
        if values.is_empty() {
            return Err(HudiError::InvalidDomain(
                "multiple_values requires at least one value".to_string(),
            ));
        }
        Ok(Self::create(SortedRangeSet::of_values(ty, values)?, false))
    }

    pub fn ty(&self) -> &Type {
        self.values.ty()
    }

    pub fn values(&self) -> &SortedRangeSet {
        &self.values
    }

    pub fn is_null_allowed(&self) -> bool {
        self.null_allowed
    }

    pub fn is_none(&self) -> bool {
        self.values.is_none() && !self.null_allowed
    }

    pub fn is_all(&self) -> bool {
        self.values.is_all() && self.null_allowed
    }

    pub fn is_only_null(&self) -> bool {
        self.values.is_none() && self.null_allowed
    }

    pub fn is_single_value(&self) -> bool {
        !self.null_allowed && self.values.is_single_value()
    }

    /// The only value this domain admits, when it admits exactly one non-null value.
    pub fn get_single_value(&self) -> Option<&ScalarValue> {
        if self.null_allowed {
            None
        } else {
            self.values.single_value()
        }
    }

    /// Whether a possibly-null value satisfies this domain.
    pub fn includes_nullable_value(&self, value: Option<&ScalarValue>) -> Result<bool> {
        match value {
            None => Ok(self.null_allowed),
            Some(v) => self.values.includes(v),
        }
    }

    pub fn intersect(&self, other: &Domain) -> Result<Domain> {
        Ok(Self::create(
            self.values.intersect(&other.values)?,
            self.null_allowed && other.null_allowed,
        ))
    }

    pub fn union(&self, other: &Domain) -> Result<Domain> {
        Ok(Self::create(
            self.values.union(&other.values)?,
            self.null_allowed || other.null_allowed,
        ))
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() {
            return write!(f, "ALL");
        }
        if self.is_none() {
            return write!(f, "NONE");
        }
        if self.is_only_null() {
            return write!(f, "NULL");
        }
        write!(f, "{}", self.values)?;
        if self.null_allowed {
            write!(f, " OR NULL")?;
        }
        Ok(())
    }
}

/// Conjunction of per-column domains.
///
/// `None` in the inner option is the "no rows" predicate. An empty map is the
/// "all rows" predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleDomain<C: Eq + Hash> {
    domains: Option<HashMap<C, Domain>>,
}

impl<C: Eq + Hash + Clone> TupleDomain<C> {
    pub fn all() -> Self {
        Self {
            domains: Some(HashMap::new()),
        }
    }

    pub fn none() -> Self {
        Self { domains: None }
    }

    /// Normalize per-column domains into a tuple domain.
    pub fn with_column_domains(domains: impl IntoIterator<Item = (C, Domain)>) -> Self {
        let mut normalized = HashMap::new();
        for (column, domain) in domains {
            if domain.is_none() {
                return Self::none();
            }
            if !domain.is_all() {
                normalized.insert(column, domain);
            }
        }
        Self {
            domains: Some(normalized),
        }
    }

    pub fn is_none(&self) -> bool {
        self.domains.is_none()
    }

    pub fn is_all(&self) -> bool {
        matches!(&self.domains, Some(d) if d.is_empty())
    }

    /// The per-column domains, or `None` for the "no rows" predicate.
    pub fn domains(&self) -> Option<&HashMap<C, Domain>> {
        self.domains.as_ref()
    }

    /// The domain constraining `column`, if any. Callers must handle
    /// [`TupleDomain::is_none`] first: a "no rows" predicate has no per-column domains.
    pub fn domain(&self, column: &C) -> Option<&Domain> {
        self.domains.as_ref().and_then(|d| d.get(column))
    }

    pub fn intersect(&self, other: &TupleDomain<C>) -> Result<Self> {
        let (Some(left), Some(right)) = (&self.domains, &other.domains) else {
            return Ok(Self::none());
        };
        let mut merged = left.clone();
        for (column, domain) in right {
            let combined = match merged.get(column) {
                Some(existing) => existing.intersect(domain)?,
                None => domain.clone(),
            };
            merged.insert(column.clone(), combined);
        }
        Ok(Self::with_column_domains(merged))
    }
}
