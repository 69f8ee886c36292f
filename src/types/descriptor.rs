//! Ordered, typed record schemas.
//!
//! A [`FieldDescriptor`] fixes the shape of a [`GenericRecord`]: which fields
//! exist, their types, and the storage slot of each field within its type
//! group. Descriptors are immutable after construction and shared via `Arc`.
//!
//! [`GenericRecord`]: super::record::GenericRecord

use std::collections::HashMap;

use crate::error::{DimensionError, DimensionResult};
use crate::types::value::FieldKind;

/// An immutable, ordered set of (name, kind) pairs describing a record shape.
///
/// Fields are grouped by kind for storage purposes: each field has a dense
/// slot index within its kind group, assigned in declaration order. Two
/// descriptors are compatible for a projection when every field of the
/// narrower one exists in the wider one with the same kind.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// (name, kind) pairs in declaration order
    fields: Vec<(String, FieldKind)>,
    /// name -> (kind, slot index within the kind group)
    slots: HashMap<String, (FieldKind, usize)>,
    /// kind -> field names of that kind, in declaration order
    groups: HashMap<FieldKind, Vec<String>>,
}

impl FieldDescriptor {
    /// Create a descriptor from (name, kind) pairs.
    ///
    /// Fails with a schema error if two fields share a name.
    pub fn new(fields: Vec<(String, FieldKind)>) -> DimensionResult<Self> {
        let mut slots = HashMap::with_capacity(fields.len());
        let mut groups: HashMap<FieldKind, Vec<String>> = HashMap::new();

        for (name, kind) in &fields {
            let group = groups.entry(*kind).or_default();
            if slots.insert(name.clone(), (*kind, group.len())).is_some() {
                return Err(DimensionError::schema_error(
                    "duplicate field name",
                    Some(name.clone()),
                ));
            }
            group.push(name.clone());
        }

        Ok(Self {
            fields,
            slots,
            groups,
        })
    }

    /// All fields in declaration order
    pub fn fields(&self) -> &[(String, FieldKind)] {
        &self.fields
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the descriptor declares no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The declared kind of a field, if the field exists
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        self.slots.get(name).map(|(kind, _)| *kind)
    }

    /// The storage slot of a field: its kind and its index within that
    /// kind's group
    pub fn slot_of(&self, name: &str) -> Option<(FieldKind, usize)> {
        self.slots.get(name).copied()
    }

    /// Names of all fields of the given kind, in declaration order
    pub fn fields_of_kind(&self, kind: FieldKind) -> &[String] {
        self.groups.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of fields of the given kind
    pub fn kind_len(&self, kind: FieldKind) -> usize {
        self.groups.get(&kind).map_or(0, Vec::len)
    }

    /// Check whether every field of this descriptor exists in `wider` with
    /// the same kind, i.e. records of `wider`'s shape can be projected into
    /// records of this shape.
    pub fn is_projection_of(&self, wider: &FieldDescriptor) -> bool {
        self.fields
            .iter()
            .all(|(name, kind)| wider.kind_of(name) == Some(*kind))
    }
}

impl PartialEq for FieldDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for FieldDescriptor {}
