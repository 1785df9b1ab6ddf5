//! `table-sort` is a multi-key sort engine for client-side data tables.
//!
//! A table is ordered by a user-editable *sort specification*: an ordered, duplicate-free list of
//! (field, direction) criteria. The first criterion is the primary sort key, every following one only
//! breaks ties of the ones before it, and records that still tie keep their input order. The
//! specification is persisted after every change and restored on the next start.
//!
//! # Overview
//!
//! `table-sort` supports the following features:
//!
//! * **Typed fields:**
//!   sortable fields are a closed enumeration ([`SortField`]) and records expose typed values through
//!   [`SortableRecord`], so comparisons never inspect types at run time.
//! * **Human-facing ordering:**
//!   text is compared with a locale-aware collator, timestamps by their chronological value.
//! * **Invariant-keeping store:**
//!   [`SortStore`] caps the specification length, keeps fields unique and treats invalid requests as no-ops.
//! * **Best-effort persistence:**
//!   the specification is stored through a pluggable [`KeyValueStore`] in JSON (default) or `MessagePack`;
//!   missing or malformed state silently falls back to the default specification.
//! * **Multithreading support:**
//!   large record sets can be sorted on a thread pool, producing exactly the sequential order.
//!
//! # Example
//!
//! ```no_run
//! use table_sort::{Client, ClientField, FileStore, SortTableBuilder, StoragePersistence};
//!
//! fn main() {
//!     let clients: Vec<Client> = serde_json::from_str(&std::fs::read_to_string("clients.json").unwrap()).unwrap();
//!
//!     let mut table = SortTableBuilder::new()
//!         .with_persistence(StoragePersistence::new(FileStore::open("./state").unwrap()))
//!         .build(clients)
//!         .unwrap();
//!
//!     table.add_criterion(ClientField::ClientName);
//!     table.reorder(1, 0);
//!
//!     for client in table.current_order() {
//!         println!("{} {}", client.id, client.client_name);
//!     }
//! }
//! ```

pub mod codec;
pub mod compare;
pub mod persist;
pub mod record;
pub mod sort;
pub mod spec;
pub mod storage;
pub mod store;
pub mod table;

pub use codec::{JsonCodec, RmpCodec, SpecCodec};
pub use compare::{Collation, SortKey, SpecComparator};
pub use persist::{NoPersistence, SpecPersistence, StoragePersistence};
pub use record::{Client, ClientField, ClientStatus, ClientType, FieldValue, SortField, SortableRecord};
pub use sort::{BuildError, TableSorter, TableSorterBuilder};
pub use spec::{Direction, SortCriterion, SortSpec, SpecError};
pub use storage::{DisabledStore, FileStore, KeyValueStore, MemoryStore, StorageError};
pub use store::SortStore;
pub use table::{SortTable, SortTableBuilder};
