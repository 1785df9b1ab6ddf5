//! Sortable record model.

use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::spec::{Direction, SortCriterion};

/// Closed enumeration of the fields a record can be sorted by.
pub trait SortField: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Returns every sortable field in canonical order.
    fn all() -> &'static [Self];

    /// Returns the canonical (persisted) name of the field.
    fn name(&self) -> &'static str;

    /// Returns the human readable name of the field.
    fn label(&self) -> &'static str;

    /// Returns the human readable description of a direction for this field ("A-Z", "Oldest to Newest", ...).
    fn direction_label(&self, direction: Direction) -> &'static str {
        match direction {
            Direction::Asc => "A-Z",
            Direction::Desc => "Z-A",
        }
    }

    /// Returns the specification used when nothing was persisted.
    fn default_spec() -> Vec<SortCriterion<Self>> {
        Vec::new()
    }

    /// Looks a field up by its canonical name.
    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|field| field.name() == name)
    }
}

/// Typed value of a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue<'a> {
    Integer(i64),
    /// Free text, compared with the locale collation.
    Text(&'a str),
    /// Label of an enumerated value, compared with the locale collation.
    Label(&'a str),
    /// ISO-8601 timestamp, compared chronologically.
    Timestamp(&'a str),
    /// Field has no value.
    Missing,
}

/// A record exposing typed values for its sortable fields.
pub trait SortableRecord {
    type Field: SortField;

    /// Returns the value of `field`.
    fn value(&self, field: Self::Field) -> FieldValue<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientType {
    Individual,
    Company,
}

impl ClientType {
    pub fn label(&self) -> &'static str {
        match self {
            ClientType::Individual => "Individual",
            ClientType::Company => "Company",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClientStatus {
    Active,
    Pending,
}

impl ClientStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ClientStatus::Active => "Active",
            ClientStatus::Pending => "Pending",
        }
    }
}

/// Client table row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: u32,
    pub client_name: String,
    pub client_type: ClientType,
    pub email: String,
    pub status: ClientStatus,
    /// ISO-8601 timestamp, e.g. `2023-10-26T10:00:00Z`.
    pub created_at: String,
    /// ISO-8601 timestamp.
    pub updated_at: String,
}

/// Sortable client fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientField {
    ClientName,
    CreatedAt,
    UpdatedAt,
    Id,
    Email,
    Status,
    ClientType,
}

impl SortField for ClientField {
    fn all() -> &'static [Self] {
        &[
            ClientField::ClientName,
            ClientField::CreatedAt,
            ClientField::UpdatedAt,
            ClientField::Id,
            ClientField::Email,
            ClientField::Status,
            ClientField::ClientType,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            ClientField::ClientName => "clientName",
            ClientField::CreatedAt => "createdAt",
            ClientField::UpdatedAt => "updatedAt",
            ClientField::Id => "id",
            ClientField::Email => "email",
            ClientField::Status => "status",
            ClientField::ClientType => "clientType",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ClientField::ClientName => "Client Name",
            ClientField::CreatedAt => "Created At",
            ClientField::UpdatedAt => "Updated At",
            ClientField::Id => "Client ID",
            ClientField::Email => "Email",
            ClientField::Status => "Status",
            ClientField::ClientType => "Client Type",
        }
    }

    fn direction_label(&self, direction: Direction) -> &'static str {
        match (self, direction) {
            (ClientField::CreatedAt | ClientField::UpdatedAt, Direction::Asc) => "Oldest to Newest",
            (ClientField::CreatedAt | ClientField::UpdatedAt, Direction::Desc) => "Newest to Oldest",
            (_, Direction::Asc) => "A-Z",
            (_, Direction::Desc) => "Z-A",
        }
    }

    fn default_spec() -> Vec<SortCriterion<Self>> {
        vec![SortCriterion::desc(ClientField::CreatedAt)]
    }
}

impl SortableRecord for Client {
    type Field = ClientField;

    fn value(&self, field: ClientField) -> FieldValue<'_> {
        match field {
            ClientField::ClientName => FieldValue::Text(&self.client_name),
            ClientField::CreatedAt => FieldValue::Timestamp(&self.created_at),
            ClientField::UpdatedAt => FieldValue::Timestamp(&self.updated_at),
            ClientField::Id => FieldValue::Integer(i64::from(self.id)),
            ClientField::Email => FieldValue::Text(&self.email),
            ClientField::Status => FieldValue::Label(self.status.label()),
            ClientField::ClientType => FieldValue::Label(self.client_type.label()),
        }
    }
}
