//! Multi-key sort specification.

use std::cmp::Ordering;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::record::SortField;

/// Maximum number of criteria a specification may hold unless configured otherwise.
pub const DEFAULT_MAX_CRITERIA: usize = 5;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, oldest first).
    Asc,
    /// Descending order (Z-A, newest first).
    Desc,
}

impl Direction {
    /// Applies the direction to an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> Direction {
        match self {
            Direction::Asc => Direction::Desc,
            Direction::Desc => Direction::Asc,
        }
    }

    /// Returns the persisted token of the direction.
    pub fn token(self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }
}

/// Newly added criteria sort descending.
impl Default for Direction {
    fn default() -> Self {
        Direction::Desc
    }
}

/// A single (field, direction) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortCriterion<F> {
    pub field: F,
    pub direction: Direction,
}

impl<F> SortCriterion<F> {
    pub fn new(field: F, direction: Direction) -> Self {
        SortCriterion { field, direction }
    }

    pub fn asc(field: F) -> Self {
        SortCriterion::new(field, Direction::Asc)
    }

    pub fn desc(field: F) -> Self {
        SortCriterion::new(field, Direction::Desc)
    }
}

/// Specification invariant violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// The field occurs more than once.
    DuplicateField(&'static str),
    /// The specification is longer than allowed.
    TooManyCriteria { len: usize, max: usize },
}

impl Error for SpecError {}

impl Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SpecError::DuplicateField(name) => write!(f, "field {} is used more than once", name),
            SpecError::TooManyCriteria { len, max } => {
                write!(f, "{} criteria given while at most {} are allowed", len, max)
            }
        }
    }
}

/// Immutable snapshot of an ordered, duplicate-free list of sort criteria.
///
/// Position 0 is the primary key, every following criterion only breaks ties of the ones before it.
/// An empty specification keeps the original record order.
///
/// Snapshots are never changed in place: the transition methods (`with_added`, `without`, ...) build
/// a new snapshot and return [`None`] when the request is invalid or would not change anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortSpec<F> {
    criteria: Vec<SortCriterion<F>>,
}

impl<F: SortField> SortSpec<F> {
    /// Creates an empty specification.
    pub fn empty() -> Self {
        SortSpec { criteria: Vec::new() }
    }

    /// Creates a specification checking field uniqueness and the length limit.
    ///
    /// # Arguments
    /// * `criteria` - Criteria in precedence order
    /// * `max_criteria` - Maximum allowed number of criteria
    pub fn try_new(criteria: Vec<SortCriterion<F>>, max_criteria: usize) -> Result<Self, SpecError> {
        if criteria.len() > max_criteria {
            return Err(SpecError::TooManyCriteria {
                len: criteria.len(),
                max: max_criteria,
            });
        }

        for (idx, criterion) in criteria.iter().enumerate() {
            if criteria[..idx].iter().any(|c| c.field == criterion.field) {
                return Err(SpecError::DuplicateField(criterion.field.name()));
            }
        }

        return Ok(SortSpec { criteria });
    }

    pub fn criteria(&self) -> &[SortCriterion<F>] {
        &self.criteria
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SortCriterion<F>> {
        self.criteria.iter()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    /// Returns the primary criterion, if any.
    pub fn primary(&self) -> Option<&SortCriterion<F>> {
        self.criteria.first()
    }

    pub fn contains(&self, field: F) -> bool {
        self.position(field).is_some()
    }

    /// Returns the precedence position of a field.
    pub fn position(&self, field: F) -> Option<usize> {
        self.criteria.iter().position(|c| c.field == field)
    }

    pub fn direction_of(&self, field: F) -> Option<Direction> {
        self.criteria.iter().find(|c| c.field == field).map(|c| c.direction)
    }

    /// Returns every sortable field not used by the specification, in canonical order.
    pub fn available_fields(&self) -> Vec<F> {
        F::all().iter().copied().filter(|field| !self.contains(*field)).collect()
    }

    /// Appends `field` with the default (descending) direction.
    /// Rejected if the field is already used or the specification is full.
    pub fn with_added(&self, field: F, max_criteria: usize) -> Option<Self> {
        if self.contains(field) || self.criteria.len() >= max_criteria {
            return None;
        }

        let mut criteria = self.criteria.clone();
        criteria.push(SortCriterion::new(field, Direction::default()));

        return Some(SortSpec { criteria });
    }

    /// Removes `field`, shifting the following criteria up.
    pub fn without(&self, field: F) -> Option<Self> {
        let idx = self.position(field)?;

        let mut criteria = self.criteria.clone();
        criteria.remove(idx);

        return Some(SortSpec { criteria });
    }

    /// Replaces the direction of `field` keeping its position.
    pub fn with_direction(&self, field: F, direction: Direction) -> Option<Self> {
        let idx = self.position(field)?;
        if self.criteria[idx].direction == direction {
            return None;
        }

        let mut criteria = self.criteria.clone();
        criteria[idx].direction = direction;

        return Some(SortSpec { criteria });
    }

    /// Moves the criterion at `from` to `to`, shifting the ones in between.
    /// Out of range indices are rejected, not clamped.
    pub fn moved(&self, from: usize, to: usize) -> Option<Self> {
        let len = self.criteria.len();
        if from >= len || to >= len || from == to {
            return None;
        }

        let mut criteria = self.criteria.clone();
        let criterion = criteria.remove(from);
        criteria.insert(to, criterion);

        return Some(SortSpec { criteria });
    }

    /// Removes every criterion.
    pub fn cleared(&self) -> Option<Self> {
        if self.criteria.is_empty() {
            None
        } else {
            Some(SortSpec::empty())
        }
    }
}

impl<F: SortField> Default for SortSpec<F> {
    fn default() -> Self {
        SortSpec::empty()
    }
}

impl<'a, F> IntoIterator for &'a SortSpec<F> {
    type Item = &'a SortCriterion<F>;
    type IntoIter = std::slice::Iter<'a, SortCriterion<F>>;

    fn into_iter(self) -> Self::IntoIter {
        self.criteria.iter()
    }
}

impl<F: SortField> Display for SortSpec<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.criteria.is_empty() {
            return write!(f, "(unsorted)");
        }
        for (idx, criterion) in self.criteria.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", criterion.field.name(), criterion.direction.token())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use rand::Rng;
    use rstest::*;

    use super::{Direction, SortCriterion, SortSpec, SpecError, DEFAULT_MAX_CRITERIA};
    use crate::record::{ClientField, SortField};

    use ClientField::*;

    fn spec(criteria: Vec<SortCriterion<ClientField>>) -> SortSpec<ClientField> {
        SortSpec::try_new(criteria, DEFAULT_MAX_CRITERIA).unwrap()
    }

    fn fields(spec: &SortSpec<ClientField>) -> Vec<ClientField> {
        spec.iter().map(|c| c.field).collect()
    }

    #[test]
    fn test_try_new_rejects_duplicates() {
        let result = SortSpec::try_new(
            vec![SortCriterion::asc(ClientName), SortCriterion::desc(ClientName)],
            DEFAULT_MAX_CRITERIA,
        );
        assert_eq!(result, Err(SpecError::DuplicateField("clientName")));
    }

    #[test]
    fn test_try_new_rejects_too_long() {
        let result = SortSpec::try_new(vec![SortCriterion::asc(Id), SortCriterion::asc(Email)], 1);
        assert_eq!(result, Err(SpecError::TooManyCriteria { len: 2, max: 1 }));
    }

    #[test]
    fn test_with_added_defaults_to_descending() {
        let added = SortSpec::empty().with_added(Email, DEFAULT_MAX_CRITERIA).unwrap();
        assert_eq!(added.criteria(), &[SortCriterion::desc(Email)]);
    }

    #[test]
    fn test_with_added_rejects_present_field() {
        let current = spec(vec![SortCriterion::asc(Email)]);
        assert_eq!(current.with_added(Email, DEFAULT_MAX_CRITERIA), None);
    }

    #[test]
    fn test_with_added_rejects_when_full() {
        let current = spec(vec![
            SortCriterion::desc(CreatedAt),
            SortCriterion::asc(Status),
            SortCriterion::asc(Id),
            SortCriterion::asc(Email),
            SortCriterion::asc(ClientType),
        ]);
        assert_eq!(current.with_added(ClientName, DEFAULT_MAX_CRITERIA), None);
        assert_eq!(current.len(), 5);
    }

    #[test]
    fn test_without_shifts_following_criteria() {
        let current = spec(vec![
            SortCriterion::desc(CreatedAt),
            SortCriterion::asc(Status),
            SortCriterion::asc(Id),
        ]);
        let removed = current.without(CreatedAt).unwrap();
        assert_eq!(removed.criteria(), &[SortCriterion::asc(Status), SortCriterion::asc(Id)]);

        let removed = current.without(Status).unwrap();
        assert_eq!(removed.criteria(), &[SortCriterion::desc(CreatedAt), SortCriterion::asc(Id)]);

        assert_eq!(current.without(Email), None);
    }

    #[test]
    fn test_with_direction_keeps_position() {
        let current = spec(vec![SortCriterion::desc(CreatedAt), SortCriterion::desc(Status)]);

        let changed = current.with_direction(CreatedAt, Direction::Asc).unwrap();
        assert_eq!(changed.criteria(), &[SortCriterion::asc(CreatedAt), SortCriterion::desc(Status)]);

        assert_eq!(current.with_direction(CreatedAt, Direction::Desc), None);
        assert_eq!(current.with_direction(Email, Direction::Asc), None);
    }

    #[rstest]
    #[case(0, 2, vec![Status, Id, CreatedAt])]
    #[case(2, 0, vec![Id, CreatedAt, Status])]
    #[case(1, 2, vec![CreatedAt, Id, Status])]
    #[case(1, 0, vec![Status, CreatedAt, Id])]
    fn test_moved(#[case] from: usize, #[case] to: usize, #[case] expected: Vec<ClientField>) {
        let current = spec(vec![
            SortCriterion::desc(CreatedAt),
            SortCriterion::asc(Status),
            SortCriterion::asc(Id),
        ]);
        assert_eq!(fields(&current.moved(from, to).unwrap()), expected);
    }

    #[rstest]
    #[case(0, 0)]
    #[case(3, 0)]
    #[case(0, 3)]
    #[case(usize::MAX, 1)]
    fn test_moved_rejects(#[case] from: usize, #[case] to: usize) {
        let current = spec(vec![
            SortCriterion::desc(CreatedAt),
            SortCriterion::asc(Status),
            SortCriterion::asc(Id),
        ]);
        assert_eq!(current.moved(from, to), None);
    }

    #[test]
    fn test_cleared() {
        let current = spec(vec![SortCriterion::desc(CreatedAt)]);
        assert_eq!(current.cleared(), Some(SortSpec::empty()));
        assert_eq!(SortSpec::<ClientField>::empty().cleared(), None);
    }

    #[test]
    fn test_available_fields_in_canonical_order() {
        let current = spec(vec![SortCriterion::asc(Id), SortCriterion::desc(ClientName)]);
        assert_eq!(
            current.available_fields(),
            vec![CreatedAt, UpdatedAt, Email, Status, ClientType]
        );
        assert_eq!(SortSpec::<ClientField>::empty().available_fields(), ClientField::all().to_vec());
    }

    #[test]
    fn test_random_edits_keep_invariants() {
        let mut rng = rand::thread_rng();
        let all = ClientField::all();
        let mut current = SortSpec::<ClientField>::empty();

        for _ in 0..2000 {
            let field = all[rng.gen_range(0..all.len())];
            let next = match rng.gen_range(0..5) {
                0 | 1 => current.with_added(field, DEFAULT_MAX_CRITERIA),
                2 => current.without(field),
                3 => current.with_direction(field, if rng.gen() { Direction::Asc } else { Direction::Desc }),
                _ => current.moved(rng.gen_range(0..7), rng.gen_range(0..7)),
            };
            if let Some(next) = next {
                current = next;
            }

            assert!(current.len() <= DEFAULT_MAX_CRITERIA);
            assert!(SortSpec::try_new(current.criteria().to_vec(), DEFAULT_MAX_CRITERIA).is_ok());
        }
    }

    #[test]
    fn test_display() {
        let current = spec(vec![SortCriterion::desc(CreatedAt), SortCriterion::asc(ClientName)]);
        assert_eq!(current.to_string(), "createdAt desc, clientName asc");
        assert_eq!(SortSpec::<ClientField>::empty().to_string(), "(unsorted)");
    }
}
