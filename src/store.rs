//! Sort specification store.

use std::sync::Arc;

use log;

use crate::persist::{NoPersistence, SpecPersistence};
use crate::record::SortField;
use crate::spec::{Direction, SortSpec};

/// Owner of the current sort specification.
///
/// Every mutation either replaces the current snapshot with a new one and hands it to the persistence,
/// or is rejected and leaves both untouched. Rejections (unknown field, full specification, out of range
/// index, ...) are not errors: the mutation methods return `false` and log the request.
/// Snapshots returned by [`SortStore::spec`] are never modified.
#[derive(Debug)]
pub struct SortStore<F: SortField, P: SpecPersistence<F> = NoPersistence> {
    current: Arc<SortSpec<F>>,
    max_criteria: usize,
    persistence: P,
}

impl<F: SortField, P: SpecPersistence<F>> SortStore<F, P> {
    /// Creates a store restoring the persisted specification or falling back to `default_spec`.
    ///
    /// # Arguments
    /// * `default_spec` - Specification used when nothing valid is persisted
    /// * `max_criteria` - Maximum specification length
    /// * `persistence` - Persistence the specification is loaded from and saved to
    pub fn new(default_spec: SortSpec<F>, max_criteria: usize, persistence: P) -> Self {
        let restored = persistence
            .load(max_criteria)
            .and_then(|spec| match SortSpec::try_new(spec.criteria().to_vec(), max_criteria) {
                Ok(spec) => Some(spec),
                Err(err) => {
                    log::warn!("restored sort specification is rejected: {}", err);
                    None
                }
            });

        let current = match restored {
            Some(spec) => {
                log::info!("restored sort specification: {}", spec);
                spec
            }
            None => match SortSpec::try_new(default_spec.criteria().to_vec(), max_criteria) {
                Ok(spec) => {
                    log::info!("using default sort specification: {}", spec);
                    spec
                }
                Err(err) => {
                    log::warn!("default sort specification is rejected, starting unsorted: {}", err);
                    SortSpec::empty()
                }
            },
        };

        return SortStore {
            current: Arc::new(current),
            max_criteria,
            persistence,
        };
    }

    /// Returns the current snapshot.
    pub fn spec(&self) -> Arc<SortSpec<F>> {
        Arc::clone(&self.current)
    }

    pub fn max_criteria(&self) -> usize {
        self.max_criteria
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Checks whether another criterion can be added.
    pub fn can_add_criterion(&self) -> bool {
        self.current.len() < self.max_criteria && self.current.len() < F::all().len()
    }

    /// Returns the fields that can still be added, in canonical order.
    pub fn available_fields(&self) -> Vec<F> {
        self.current.available_fields()
    }

    /// Appends `field` sorted descending.
    pub fn add_criterion(&mut self, field: F) -> bool {
        let next = self.current.with_added(field, self.max_criteria);
        self.apply("add", field, next)
    }

    /// Removes `field`.
    pub fn remove_criterion(&mut self, field: F) -> bool {
        let next = self.current.without(field);
        self.apply("remove", field, next)
    }

    /// Changes the direction of `field` in place.
    pub fn set_direction(&mut self, field: F, direction: Direction) -> bool {
        let next = self.current.with_direction(field, direction);
        self.apply("set direction of", field, next)
    }

    /// Flips the direction of `field`.
    pub fn toggle_direction(&mut self, field: F) -> bool {
        match self.current.direction_of(field) {
            Some(direction) => self.set_direction(field, direction.reversed()),
            None => self.apply("toggle direction of", field, None),
        }
    }

    /// Moves the criterion at `from` to `to`. Out of range indices are rejected.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        match self.current.moved(from, to) {
            Some(next) => {
                log::debug!("sort criterion moved from {} to {}", from, to);
                self.replace(next);
                true
            }
            None => {
                log::debug!("sort criterion move from {} to {} rejected", from, to);
                false
            }
        }
    }

    /// Moves the criterion of `active` to the position currently held by `over`.
    /// This is what dropping a dragged criterion onto another one does.
    pub fn move_criterion(&mut self, active: F, over: F) -> bool {
        match (self.current.position(active), self.current.position(over)) {
            (Some(from), Some(to)) => self.reorder(from, to),
            _ => self.apply("move", active, None),
        }
    }

    /// Removes every criterion.
    pub fn clear_all(&mut self) -> bool {
        match self.current.cleared() {
            Some(next) => {
                log::debug!("sort specification cleared");
                self.replace(next);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, action: &str, field: F, next: Option<SortSpec<F>>) -> bool {
        match next {
            Some(next) => {
                log::debug!("{} sort criterion {}", action, field.name());
                self.replace(next);
                true
            }
            None => {
                log::debug!("{} sort criterion {} rejected", action, field.name());
                false
            }
        }
    }

    fn replace(&mut self, next: SortSpec<F>) {
        self.current = Arc::new(next);
        self.persistence.save(&self.current);
    }
}
