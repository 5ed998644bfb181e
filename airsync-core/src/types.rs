//! Domain types shared by the loaders, the reconciler, and the report.
//!
//! Identifiers are normalized on construction (trimmed, lowercased) so that
//! both sources agree on matching without any caller-side convention.

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RecordError;
use crate::timestamp;

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A normalized record key (an email address).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Normalize `raw` into an identifier: surrounding whitespace is trimmed
    /// and the value lowercased. Blank input is rejected.
    pub fn parse(raw: &str) -> Result<Self, RecordError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecordError::EmptyIdentifier);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = RecordError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The action a reconciliation row calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operation {
    Create,
    Update,
    None,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::None => write!(f, "NONE"),
        }
    }
}

/// The side an action must be applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Target {
    /// The remote Airtable table.
    Airtable,
    /// The local CSV file.
    Csv,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Airtable => write!(f, "AIRTABLE"),
            Target::Csv => write!(f, "CSV"),
        }
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One record from either source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    pub identifier: Identifier,
    /// Last-modified instant, UTC, truncated to whole seconds.
    pub updated_at: DateTime<Utc>,
    /// Passthrough attributes (e.g. name fields); never compared.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Record {
    pub fn new(identifier: Identifier, updated_at: DateTime<Utc>) -> Self {
        Self {
            identifier,
            updated_at: timestamp::normalize(updated_at),
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }
}

/// Keyed collection of records loaded from one source.
///
/// Keys are unique by construction: [`RecordSet::insert`] rejects a second
/// record with an identifier already present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: BTreeMap<Identifier, Record>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from records, failing on the first duplicate identifier.
    pub fn try_from_records(
        records: impl IntoIterator<Item = Record>,
    ) -> Result<Self, RecordError> {
        let mut set = Self::new();
        for record in records {
            set.insert(record)?;
        }
        Ok(set)
    }

    pub fn insert(&mut self, record: Record) -> Result<(), RecordError> {
        if self.records.contains_key(&record.identifier) {
            return Err(RecordError::DuplicateIdentifier {
                identifier: record.identifier,
            });
        }
        self.records.insert(record.identifier.clone(), record);
        Ok(())
    }

    pub fn get(&self, identifier: &str) -> Option<&Record> {
        self.records.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.records.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Identifiers in ascending order.
    pub fn identifiers(&self) -> impl Iterator<Item = &Identifier> {
        self.records.keys()
    }

    /// Records in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

/// One output line: the action needed for one identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationRow {
    pub operation: Operation,
    /// Absent for [`Operation::None`].
    pub target: Option<Target>,
    pub identifier: Identifier,
}

impl ReconciliationRow {
    pub fn create(target: Target, identifier: Identifier) -> Self {
        Self {
            operation: Operation::Create,
            target: Some(target),
            identifier,
        }
    }

    pub fn update(target: Target, identifier: Identifier) -> Self {
        Self {
            operation: Operation::Update,
            target: Some(target),
            identifier,
        }
    }

    pub fn unchanged(identifier: Identifier) -> Self {
        Self {
            operation: Operation::None,
            target: None,
            identifier,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
