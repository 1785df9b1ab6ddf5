//! Sortable table.
//!
//! [`SortTable`] is the surface a presentation layer talks to: it owns the record set, the sort
//! specification store and the sorter, and keeps the current record order up to date after every
//! successful specification change or record set replacement.

use std::marker::PhantomData;
use std::sync::Arc;

use log;

use crate::persist::{NoPersistence, SpecPersistence};
use crate::record::{SortField, SortableRecord};
use crate::sort::{BuildError, TableSorter, TableSorterBuilder};
use crate::spec::{Direction, SortCriterion, SortSpec, DEFAULT_MAX_CRITERIA};
use crate::store::SortStore;

/// Sortable table builder. Provides methods for [`SortTable`] initialization.
pub struct SortTableBuilder<F, P = NoPersistence>
where
    F: SortField,
    P: SpecPersistence<F>,
{
    /// Maximum number of sort criteria.
    max_criteria: usize,
    /// Specification used when nothing is persisted.
    default_spec: Option<Vec<SortCriterion<F>>>,
    /// Specification persistence.
    persistence: P,
    /// Record sorter configuration.
    sorter_builder: TableSorterBuilder,

    /// Sort field type.
    field_type: PhantomData<F>,
}

impl<F: SortField> SortTableBuilder<F, NoPersistence> {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        SortTableBuilder::default()
    }
}

impl<F: SortField> Default for SortTableBuilder<F, NoPersistence> {
    fn default() -> Self {
        SortTableBuilder {
            max_criteria: DEFAULT_MAX_CRITERIA,
            default_spec: None,
            persistence: NoPersistence,
            sorter_builder: TableSorterBuilder::default(),
            field_type: PhantomData,
        }
    }
}

impl<F, P> SortTableBuilder<F, P>
where
    F: SortField,
    P: SpecPersistence<F>,
{
    /// Builds a [`SortTable`] over `records` using provided configuration.
    pub fn build<R>(self, records: Vec<R>) -> Result<SortTable<R, P>, BuildError>
    where
        R: SortableRecord<Field = F> + Sync,
    {
        let default_spec = self.default_spec.unwrap_or_else(F::default_spec);
        let default_spec =
            SortSpec::try_new(default_spec, self.max_criteria).map_err(BuildError::InvalidDefaultSpec)?;

        let sorter = self.sorter_builder.build()?;
        let store = SortStore::new(default_spec, self.max_criteria, self.persistence);

        return Ok(SortTable::new(records, store, sorter));
    }

    /// Sets maximum number of sort criteria.
    pub fn with_max_criteria(mut self, max_criteria: usize) -> SortTableBuilder<F, P> {
        self.max_criteria = max_criteria;
        return self;
    }

    /// Sets specification used when nothing is persisted.
    pub fn with_default_spec(mut self, criteria: Vec<SortCriterion<F>>) -> SortTableBuilder<F, P> {
        self.default_spec = Some(criteria);
        return self;
    }

    /// Sets specification persistence.
    pub fn with_persistence<Q: SpecPersistence<F>>(self, persistence: Q) -> SortTableBuilder<F, Q> {
        return SortTableBuilder {
            max_criteria: self.max_criteria,
            default_spec: self.default_spec,
            persistence,
            sorter_builder: self.sorter_builder,
            field_type: PhantomData,
        };
    }

    /// Sets locale used to compare text fields.
    pub fn with_locale(mut self, locale: &str) -> SortTableBuilder<F, P> {
        self.sorter_builder = self.sorter_builder.with_locale(locale);
        return self;
    }

    /// Sets number of threads to be used to sort large record sets in parallel.
    pub fn with_threads_number(mut self, threads_number: usize) -> SortTableBuilder<F, P> {
        self.sorter_builder = self.sorter_builder.with_threads_number(threads_number);
        return self;
    }

    /// Sets record count from which sorting is done in parallel.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> SortTableBuilder<F, P> {
        self.sorter_builder = self.sorter_builder.with_parallel_threshold(parallel_threshold);
        return self;
    }
}

/// Record set ordered by a user-editable sort specification.
pub struct SortTable<R, P = NoPersistence>
where
    R: SortableRecord + Sync,
    P: SpecPersistence<R::Field>,
{
    records: Vec<R>,
    store: SortStore<R::Field, P>,
    sorter: TableSorter,
    /// Indices of `records` in current order.
    order: Vec<usize>,
}

impl<R, P> SortTable<R, P>
where
    R: SortableRecord + Sync,
    P: SpecPersistence<R::Field>,
{
    /// Creates a table and sorts `records` by the store's current specification.
    pub fn new(records: Vec<R>, store: SortStore<R::Field, P>, sorter: TableSorter) -> Self {
        let mut table = SortTable {
            records,
            store,
            sorter,
            order: Vec::new(),
        };
        table.resort();

        return table;
    }

    /// Returns the records in current order.
    pub fn current_order(&self) -> Vec<&R> {
        self.order.iter().map(|idx| &self.records[*idx]).collect()
    }

    /// Returns the records in input order.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    /// Replaces the record set.
    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
        self.resort();
    }

    /// Returns the current specification snapshot.
    pub fn spec(&self) -> Arc<SortSpec<R::Field>> {
        self.store.spec()
    }

    pub fn store(&self) -> &SortStore<R::Field, P> {
        &self.store
    }

    pub fn sorter(&self) -> &TableSorter {
        &self.sorter
    }

    /// Returns the fields that can still be added, in canonical order.
    pub fn available_fields(&self) -> Vec<R::Field> {
        self.store.available_fields()
    }

    pub fn can_add_criterion(&self) -> bool {
        self.store.can_add_criterion()
    }

    pub fn add_criterion(&mut self, field: R::Field) -> bool {
        let changed = self.store.add_criterion(field);
        self.resort_if(changed)
    }

    pub fn remove_criterion(&mut self, field: R::Field) -> bool {
        let changed = self.store.remove_criterion(field);
        self.resort_if(changed)
    }

    pub fn set_direction(&mut self, field: R::Field, direction: Direction) -> bool {
        let changed = self.store.set_direction(field, direction);
        self.resort_if(changed)
    }

    pub fn toggle_direction(&mut self, field: R::Field) -> bool {
        let changed = self.store.toggle_direction(field);
        self.resort_if(changed)
    }

    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        let changed = self.store.reorder(from, to);
        self.resort_if(changed)
    }

    pub fn move_criterion(&mut self, active: R::Field, over: R::Field) -> bool {
        let changed = self.store.move_criterion(active, over);
        self.resort_if(changed)
    }

    pub fn clear_all(&mut self) -> bool {
        let changed = self.store.clear_all();
        self.resort_if(changed)
    }

    fn resort_if(&mut self, changed: bool) -> bool {
        if changed {
            self.resort();
        }
        changed
    }

    fn resort(&mut self) {
        let spec = self.store.spec();
        self.order = self.sorter.sort_indices(&self.records, &spec);
        log::debug!("table of {} records ordered by {}", self.records.len(), spec);
    }
}
