//! Sort specification serialization.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::SortField;
use crate::spec::{Direction, SortCriterion};

/// Serialization format interface. Encodes a criteria list into bytes and back.
///
/// Decoding only checks that every field name is known, specification invariants are
/// checked by the caller.
pub trait SpecCodec {
    /// Encodes criteria in precedence order.
    fn encode<F: SortField>(&self, criteria: &[SortCriterion<F>]) -> Result<Vec<u8>, Box<dyn Error>>;

    /// Decodes criteria in precedence order.
    fn decode<F: SortField>(&self, bytes: &[u8]) -> Result<Vec<SortCriterion<F>>, Box<dyn Error>>;
}

/// Persisted criterion shape: `{"key": "createdAt", "direction": "desc"}`.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCriterion {
    #[serde(alias = "field")]
    key: String,
    direction: Direction,
}

/// Persisted field name is not a sortable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField(pub String);

impl Error for UnknownField {}

impl fmt::Display for UnknownField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort field: {:?}", self.0)
    }
}

fn to_stored<F: SortField>(criteria: &[SortCriterion<F>]) -> Vec<StoredCriterion> {
    Vec::from_iter(criteria.iter().map(|criterion| StoredCriterion {
        key: criterion.field.name().to_owned(),
        direction: criterion.direction,
    }))
}

fn from_stored<F: SortField>(stored: Vec<StoredCriterion>) -> Result<Vec<SortCriterion<F>>, Box<dyn Error>> {
    let mut criteria = Vec::with_capacity(stored.len());
    for item in stored.into_iter() {
        let field = F::from_name(&item.key).ok_or_else(|| UnknownField(item.key))?;
        criteria.push(SortCriterion::new(field, item.direction));
    }

    return Ok(criteria);
}

/// JSON codec.
/// Stores the specification as a JSON array of `{"key", "direction"}` objects.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl SpecCodec for JsonCodec {
    fn encode<F: SortField>(&self, criteria: &[SortCriterion<F>]) -> Result<Vec<u8>, Box<dyn Error>> {
        Ok(serde_json::to_vec(&to_stored(criteria))?)
    }

    fn decode<F: SortField>(&self, bytes: &[u8]) -> Result<Vec<SortCriterion<F>>, Box<dyn Error>> {
        from_stored(serde_json::from_slice(bytes)?)
    }
}

/// RMP (Rust MessagePack) codec.
/// It uses MessagePack as a data serialization format.
/// For more information see https://msgpack.org/.
#[derive(Debug, Clone, Copy, Default)]
pub struct RmpCodec;

impl SpecCodec for RmpCodec {
    fn encode<F: SortField>(&self, criteria: &[SortCriterion<F>]) -> Result<Vec<u8>, Box<dyn Error>> {
        Ok(rmp_serde::encode::to_vec_named(&to_stored(criteria))?)
    }

    fn decode<F: SortField>(&self, bytes: &[u8]) -> Result<Vec<SortCriterion<F>>, Box<dyn Error>> {
        from_stored(rmp_serde::decode::from_read(bytes)?)
    }
}
