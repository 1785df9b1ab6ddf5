//! Record sorter.

use log;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

use rayon::slice::ParallelSliceMut;

use crate::compare::{Collation, SpecComparator, DEFAULT_LOCALE};
use crate::record::{SortField, SortableRecord};
use crate::spec::{SortSpec, SpecError};

/// Record count from which sorting is done on the thread pool (if one is configured).
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Initialization error.
#[derive(Debug)]
pub enum BuildError {
    /// Locale identifier can't be parsed.
    InvalidLocale(icu_locale_core::ParseError),
    /// Collation data for the locale can't be loaded.
    Collator(Box<dyn Error>),
    /// Workers thread pool initialization error.
    ThreadPoolBuildError(rayon::ThreadPoolBuildError),
    /// Default sort specification violates the specification invariants.
    InvalidDefaultSpec(SpecError),
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            BuildError::InvalidLocale(err) => err,
            BuildError::Collator(err) => err.as_ref(),
            BuildError::ThreadPoolBuildError(err) => err,
            BuildError::InvalidDefaultSpec(err) => err,
        })
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            BuildError::InvalidLocale(err) => write!(f, "invalid locale: {}", err),
            BuildError::Collator(err) => write!(f, "collator initialization failed: {}", err),
            BuildError::ThreadPoolBuildError(err) => write!(f, "thread pool initialization failed: {}", err),
            BuildError::InvalidDefaultSpec(err) => write!(f, "invalid default sort specification: {}", err),
        }
    }
}

/// Table sorter builder. Provides methods for [`TableSorter`] initialization.
#[derive(Debug, Clone)]
pub struct TableSorterBuilder {
    /// Number of threads to be used to sort large record sets in parallel.
    threads_number: Option<usize>,
    /// Record count from which the thread pool is used.
    parallel_threshold: usize,
    /// Locale used to compare text fields.
    locale: Option<String>,
}

impl TableSorterBuilder {
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        TableSorterBuilder::default()
    }

    /// Builds a [`TableSorter`] instance using provided configuration.
    pub fn build(self) -> Result<TableSorter, BuildError> {
        TableSorter::new(
            self.locale.as_deref().unwrap_or(DEFAULT_LOCALE),
            self.threads_number,
            self.parallel_threshold,
        )
    }

    /// Sets number of threads to be used to sort large record sets in parallel.
    pub fn with_threads_number(mut self, threads_number: usize) -> TableSorterBuilder {
        self.threads_number = Some(threads_number);
        return self;
    }

    /// Sets record count from which sorting is done in parallel.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> TableSorterBuilder {
        self.parallel_threshold = parallel_threshold;
        return self;
    }

    /// Sets locale used to compare text fields (BCP-47 identifier, e.g. `en`, `de`, `sv`).
    pub fn with_locale(mut self, locale: &str) -> TableSorterBuilder {
        self.locale = Some(locale.to_owned());
        return self;
    }
}

impl Default for TableSorterBuilder {
    fn default() -> Self {
        TableSorterBuilder {
            threads_number: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            locale: None,
        }
    }
}

/// Table sorter. Orders record references by a sort specification.
///
/// Sorting is always stable: records the specification can't tell apart keep their input order,
/// so an empty specification returns the input order unchanged.
pub struct TableSorter {
    /// Text fields collation.
    collation: Collation,
    /// Sorting thread pool.
    thread_pool: Option<rayon::ThreadPool>,
    /// Record count from which the thread pool is used.
    parallel_threshold: usize,
}

impl TableSorter {
    /// Creates a new table sorter instance.
    ///
    /// # Arguments
    /// * `locale` - Locale used to compare text fields.
    /// * `threads_number` - Number of threads to be used to sort large record sets in parallel. If the parameter
    ///   is [`None`] records are always sorted on the calling thread.
    /// * `parallel_threshold` - Record count from which the thread pool is used.
    pub fn new(
        locale: &str,
        threads_number: Option<usize>,
        parallel_threshold: usize,
    ) -> Result<Self, BuildError> {
        return Ok(TableSorter {
            collation: Collation::new(locale)?,
            thread_pool: Self::init_thread_pool(threads_number)?,
            parallel_threshold,
        });
    }

    fn init_thread_pool(threads_number: Option<usize>) -> Result<Option<rayon::ThreadPool>, BuildError> {
        let threads_number = match threads_number {
            Some(threads_number) => threads_number,
            None => return Ok(None),
        };

        log::info!("initializing thread-pool (threads: {})", threads_number);
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads_number)
            .build()
            .map_err(|err| BuildError::ThreadPoolBuildError(err))?;

        return Ok(Some(thread_pool));
    }

    pub fn collation(&self) -> &Collation {
        &self.collation
    }

    /// Compiles a comparator for the specification.
    pub fn comparator<'a, F>(&'a self, spec: &'a SortSpec<F>) -> SpecComparator<'a, F>
    where
        F: SortField,
    {
        SpecComparator::new(spec, &self.collation)
    }

    /// Sorts records.
    /// Returns the indices of `records` in sorted order.
    ///
    /// # Arguments
    /// * `records` - Records to be ordered
    /// * `spec` - Sort specification
    pub fn sort_indices<R>(&self, records: &[R], spec: &SortSpec<R::Field>) -> Vec<usize>
    where
        R: SortableRecord + Sync,
    {
        let mut order = Vec::from_iter(0..records.len());
        if spec.is_empty() {
            return order;
        }

        let comparator = self.comparator(spec);
        let keys = Vec::from_iter(records.iter().map(|record| comparator.keys(record)));
        let compare = |a: &usize, b: &usize| comparator.compare_keys(&keys[*a], &keys[*b]);

        match &self.thread_pool {
            Some(thread_pool) if records.len() >= self.parallel_threshold => {
                log::debug!("sorting {} records in parallel by {}", records.len(), spec);
                thread_pool.install(|| order.par_sort_by(compare));
            }
            _ => {
                log::debug!("sorting {} records by {}", records.len(), spec);
                order.sort_by(compare);
            }
        }

        return order;
    }

    /// Sorts records.
    /// Returns references to `records` in sorted order.
    pub fn sort<'r, R>(&self, records: &'r [R], spec: &SortSpec<R::Field>) -> Vec<&'r R>
    where
        R: SortableRecord + Sync,
    {
        self.sort_indices(records, spec)
            .into_iter()
            .map(|idx| &records[idx])
            .collect()
    }
}

impl fmt::Debug for TableSorter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSorter")
            .field("collation", &self.collation)
            .field(
                "threads",
                &self.thread_pool.as_ref().map(|pool| pool.current_num_threads()),
            )
            .field("parallel_threshold", &self.parallel_threshold)
            .finish()
    }
}
