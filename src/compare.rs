//! Comparator compiler.
//!
//! A [`SortSpec`] is compiled into a [`SpecComparator`] that walks the criteria in precedence order and
//! returns the first non-equal per-field comparison, reversed for descending criteria. Values are
//! compared according to their [`FieldValue`] kind:
//!
//! * integers numerically,
//! * text and enumeration labels with a locale-aware collator (case and accents are secondary
//!   differences, so `"apple" < "Banana" < "banana"`),
//! * timestamps by their parsed chronological value.
//!
//! Every field value is turned into a [`SortKey`] once per sort pass, so timestamps are parsed once per
//! record rather than once per comparison. Keys form a total order even for bad input: unparseable
//! timestamps rank after every valid one (ordered among themselves by their text), missing values rank
//! last, and values of different kinds are ordered by kind.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed, CollatorPreferences};
use icu_locale_core::Locale;

use crate::record::{FieldValue, SortField, SortableRecord};
use crate::sort::BuildError;
use crate::spec::{SortCriterion, SortSpec};

/// Locale used when none is configured.
pub const DEFAULT_LOCALE: &str = "en";

/// Locale-aware string comparison.
pub struct Collation {
    locale: Locale,
    collator: CollatorBorrowed<'static>,
}

impl Collation {
    /// Creates a collation for a BCP-47 locale identifier.
    pub fn new(locale: &str) -> Result<Self, BuildError> {
        let locale: Locale = locale.parse().map_err(BuildError::InvalidLocale)?;
        let collator = Collator::try_new(CollatorPreferences::from(locale.clone()), CollatorOptions::default())
            .map_err(|err| BuildError::Collator(Box::new(err)))?;

        log::debug!("using {} collation", locale);

        return Ok(Collation { locale, collator });
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        self.collator.compare(a, b)
    }
}

impl fmt::Debug for Collation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collation").field("locale", &self.locale.to_string()).finish()
    }
}

/// Parses an ISO-8601 timestamp into its UTC date-time.
///
/// Accepted forms: RFC 3339 (`2023-01-15T10:00:00Z`, `2023-01-15T10:00:00.5+02:00`), a date-time without
/// offset (taken as UTC) and a plain date (taken as UTC midnight).
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.naive_utc());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M") {
        return Some(datetime);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Field value prepared for comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey<'a> {
    Integer(i64),
    /// Free text or enumeration label.
    Text(&'a str),
    Timestamp(NaiveDateTime),
    /// Timestamp that can't be parsed, kept as text.
    InvalidTimestamp(&'a str),
    Missing,
}

impl<'a> SortKey<'a> {
    pub fn from_value(value: FieldValue<'a>) -> Self {
        match value {
            FieldValue::Integer(value) => SortKey::Integer(value),
            FieldValue::Text(value) | FieldValue::Label(value) => SortKey::Text(value),
            FieldValue::Timestamp(raw) => match parse_timestamp(raw) {
                Some(datetime) => SortKey::Timestamp(datetime),
                None => SortKey::InvalidTimestamp(raw),
            },
            FieldValue::Missing => SortKey::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Integer(_) => 0,
            SortKey::Text(_) => 1,
            SortKey::Timestamp(_) => 2,
            SortKey::InvalidTimestamp(_) => 3,
            SortKey::Missing => 4,
        }
    }
}

/// Compares two sort keys in ascending order.
pub fn compare_keys(collation: &Collation, a: &SortKey<'_>, b: &SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Integer(a), SortKey::Integer(b)) => a.cmp(b),
        (SortKey::Text(a), SortKey::Text(b)) => collation.compare(a, b),
        (SortKey::Timestamp(a), SortKey::Timestamp(b)) => a.cmp(b),
        (SortKey::InvalidTimestamp(a), SortKey::InvalidTimestamp(b)) => collation.compare(a, b),
        _ => a.rank().cmp(&b.rank()),
    }
}

/// Compares two field values in ascending order.
pub fn compare_values(collation: &Collation, a: FieldValue<'_>, b: FieldValue<'_>) -> Ordering {
    compare_keys(collation, &SortKey::from_value(a), &SortKey::from_value(b))
}

/// Total order over records compiled from a sort specification.
#[derive(Debug, Clone, Copy)]
pub struct SpecComparator<'a, F> {
    criteria: &'a [SortCriterion<F>],
    collation: &'a Collation,
}

impl<'a, F: SortField> SpecComparator<'a, F> {
    /// Compiles a comparator.
    ///
    /// # Arguments
    /// * `spec` - Specification to be applied
    /// * `collation` - Collation used for text fields
    pub fn new(spec: &'a SortSpec<F>, collation: &'a Collation) -> Self {
        SpecComparator {
            criteria: spec.criteria(),
            collation,
        }
    }

    /// Extracts the sort keys of a record, one per criterion.
    pub fn keys<'r, R>(&self, record: &'r R) -> Vec<SortKey<'r>>
    where
        R: SortableRecord<Field = F>,
    {
        Vec::from_iter(
            self.criteria
                .iter()
                .map(|criterion| SortKey::from_value(record.value(criterion.field))),
        )
    }

    /// Compares the keys of two records as extracted by [`SpecComparator::keys`].
    pub fn compare_keys(&self, a: &[SortKey<'_>], b: &[SortKey<'_>]) -> Ordering {
        for ((criterion, a), b) in self.criteria.iter().zip(a).zip(b) {
            let ordering = compare_keys(self.collation, a, b);
            if ordering != Ordering::Equal {
                return criterion.direction.apply(ordering);
            }
        }

        Ordering::Equal
    }

    /// Compares two records.
    pub fn compare<R>(&self, a: &R, b: &R) -> Ordering
    where
        R: SortableRecord<Field = F>,
    {
        self.compare_keys(&self.keys(a), &self.keys(b))
    }
}
