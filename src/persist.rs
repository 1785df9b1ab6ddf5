//! Sort specification persistence.
//!
//! Persistence is best-effort: [`SpecPersistence::load`] reports every failure (missing entry, storage
//! error, malformed or invalid data) as "nothing persisted" and [`SpecPersistence::save`] only logs
//! write failures. The in-memory specification stays authoritative for the session.

use log;

use crate::codec::{JsonCodec, SpecCodec};
use crate::record::SortField;
use crate::spec::SortSpec;
use crate::storage::KeyValueStore;

/// Storage key the specification is saved under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "clientSortCriteria";

/// Persistence port of the sort specification store.
pub trait SpecPersistence<F: SortField> {
    /// Returns the persisted specification if it's present and satisfies the invariants.
    ///
    /// # Arguments
    /// * `max_criteria` - Maximum allowed specification length
    fn load(&self, max_criteria: usize) -> Option<SortSpec<F>>;

    /// Persists the specification overwriting the previous one.
    fn save(&mut self, spec: &SortSpec<F>);
}

/// Persistence that keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPersistence;

impl<F: SortField> SpecPersistence<F> for NoPersistence {
    fn load(&self, _max_criteria: usize) -> Option<SortSpec<F>> {
        None
    }

    fn save(&mut self, _spec: &SortSpec<F>) {}
}

/// Persistence storing the encoded specification in a key-value storage under a fixed key.
#[derive(Debug, Clone)]
pub struct StoragePersistence<S, C = JsonCodec> {
    storage: S,
    codec: C,
    key: String,
}

impl<S: KeyValueStore> StoragePersistence<S, JsonCodec> {
    /// Creates a JSON persistence using the default key.
    pub fn new(storage: S) -> Self {
        StoragePersistence::with_codec(storage, JsonCodec, DEFAULT_STORAGE_KEY)
    }
}

impl<S: KeyValueStore, C: SpecCodec> StoragePersistence<S, C> {
    /// Creates a persistence.
    ///
    /// # Arguments
    /// * `storage` - Storage the specification is kept in
    /// * `codec` - Serialization format
    /// * `key` - Storage key
    pub fn with_codec(storage: S, codec: C, key: &str) -> Self {
        StoragePersistence {
            storage,
            codec,
            key: key.to_owned(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

impl<F, S, C> SpecPersistence<F> for StoragePersistence<S, C>
where
    F: SortField,
    S: KeyValueStore,
    C: SpecCodec,
{
    fn load(&self, max_criteria: usize) -> Option<SortSpec<F>> {
        let bytes = match self.storage.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                log::debug!("no sort specification stored under {}", self.key);
                return None;
            }
            Err(err) => {
                log::warn!("sort specification loading failed: {}", err);
                return None;
            }
        };

        let criteria = match self.codec.decode(&bytes) {
            Ok(criteria) => criteria,
            Err(err) => {
                log::warn!("stored sort specification is malformed: {}", err);
                return None;
            }
        };

        match SortSpec::try_new(criteria, max_criteria) {
            Ok(spec) => Some(spec),
            Err(err) => {
                log::warn!("stored sort specification is invalid: {}", err);
                None
            }
        }
    }

    fn save(&mut self, spec: &SortSpec<F>) {
        let bytes = match self.codec.encode(spec.criteria()) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("sort specification encoding failed: {}", err);
                return;
            }
        };

        if let Err(err) = self.storage.set(&self.key, &bytes) {
            log::warn!("sort specification saving failed: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use rstest::*;

    use super::{SpecPersistence, StoragePersistence, DEFAULT_STORAGE_KEY};
    use crate::codec::RmpCodec;
    use crate::record::{ClientField, SortField};
    use crate::spec::{Direction, SortCriterion, SortSpec, DEFAULT_MAX_CRITERIA};
    use crate::storage::{DisabledStore, FileStore, KeyValueStore, MemoryStore};

    fn spec_of_len(len: usize) -> SortSpec<ClientField> {
        let criteria = ClientField::all()
            .iter()
            .rev()
            .take(len)
            .enumerate()
            .map(|(idx, field)| {
                SortCriterion::new(*field, if idx % 2 == 0 { Direction::Asc } else { Direction::Desc })
            })
            .collect();
        SortSpec::try_new(criteria, DEFAULT_MAX_CRITERIA).unwrap()
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn test_round_trip(#[case] len: usize) {
        let spec = spec_of_len(len);

        let mut json = StoragePersistence::new(MemoryStore::new());
        json.save(&spec);
        assert_eq!(json.load(DEFAULT_MAX_CRITERIA), Some(spec.clone()));

        let mut rmp = StoragePersistence::with_codec(MemoryStore::new(), RmpCodec, "sort");
        rmp.save(&spec);
        assert_eq!(rmp.load(DEFAULT_MAX_CRITERIA), Some(spec));
    }

    #[test]
    fn test_save_overwrites() {
        let mut persistence = StoragePersistence::new(MemoryStore::new());
        persistence.save(&spec_of_len(3));
        persistence.save(&spec_of_len(1));

        assert_eq!(persistence.load(DEFAULT_MAX_CRITERIA), Some(spec_of_len(1)));
        assert_eq!(
            persistence.storage().get(DEFAULT_STORAGE_KEY).unwrap(),
            Some(br#"[{"key":"clientType","direction":"asc"}]"#.to_vec())
        );
    }

    #[test]
    fn test_missing_entry() {
        let persistence = StoragePersistence::new(MemoryStore::new());
        assert_eq!(SpecPersistence::<ClientField>::load(&persistence, DEFAULT_MAX_CRITERIA), None);
    }

    #[rstest]
    #[case(&b"not json"[..])]
    #[case(&b"null"[..])]
    #[case(&br#"[{"key":"phone","direction":"asc"}]"#[..])]
    #[case(&br#"[{"key":"email","direction":"asc"},{"key":"email","direction":"desc"}]"#[..])]
    #[case(&br#"[{"key":"id","direction":"asc"},{"key":"email","direction":"asc"},{"key":"status","direction":"asc"},{"key":"clientName","direction":"asc"},{"key":"createdAt","direction":"asc"},{"key":"updatedAt","direction":"asc"}]"#[..])]
    fn test_invalid_entry_is_absent(#[case] stored: &[u8]) {
        let mut storage = MemoryStore::new();
        storage.set(DEFAULT_STORAGE_KEY, stored).unwrap();

        let persistence = StoragePersistence::new(storage);
        assert_eq!(SpecPersistence::<ClientField>::load(&persistence, DEFAULT_MAX_CRITERIA), None);
    }

    #[test]
    fn test_disabled_storage_is_ignored() {
        let mut persistence = StoragePersistence::new(DisabledStore);
        persistence.save(&spec_of_len(2));
        assert_eq!(SpecPersistence::<ClientField>::load(&persistence, DEFAULT_MAX_CRITERIA), None);
    }

    #[test]
    fn test_file_round_trip() {
        let tmp_dir = tempfile::tempdir_in("./").unwrap();

        let mut persistence = StoragePersistence::new(FileStore::open(tmp_dir.path()).unwrap());
        persistence.save(&spec_of_len(4));

        let reopened = StoragePersistence::new(FileStore::open(tmp_dir.path()).unwrap());
        assert_eq!(reopened.load(DEFAULT_MAX_CRITERIA), Some(spec_of_len(4)));
    }
}
