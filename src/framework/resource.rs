//! # Resource Contract
//!
//! Every record the admin manages (pets, tutors) implements [`Resource`]. The
//! stores are written once against this trait and reused for each resource
//! type, the same way the list, detail and form behaviour is shared between
//! the pets and tutors screens.
//!
//! The associated types keep the stores type-safe: a `FormStore<Pet>` only
//! accepts `PetField` edits and only submits a `PetDraft`.

use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Display};
use std::hash::Hash;

/// The editable field set of a resource, held as text exactly as typed.
pub trait FormDraft: Clone + Debug + Default + PartialEq + Send + Sync + 'static {
    /// Names the individual fields of the draft.
    type Field: Copy + Debug + PartialEq + Send + Sync + 'static;

    /// Replaces one field, applying only the normalization that field needs.
    fn set_field(&mut self, field: Self::Field, value: &str);
}

/// A record served by the remote API.
pub trait Resource: Clone + Debug + PartialEq + Send + Sync + 'static {
    /// Server-assigned identifier.
    type Id: Copy + Eq + Hash + Ord + Debug + Display + Send + Sync + 'static;

    /// Editable fields submitted on create and update.
    type Draft: FormDraft;

    /// Human readable kind, used in log fields and messages.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    fn name(&self) -> &str;

    /// Copies the editable fields out of a loaded record.
    fn to_draft(&self) -> Self::Draft;
}

/// A resource that references records of another resource type.
pub trait Related<R: Resource>: Resource {
    /// Identifiers of the linked records, in the order the server returned them.
    fn related_ids(&self) -> Vec<R::Id>;
}

/// Shorthand for the field enum of a resource's draft.
pub type FieldOf<T> = <<T as Resource>::Draft as FormDraft>::Field;

/// Page request sent to the remote list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub name: Option<String>,
}

impl ListQuery {
    /// Builds a query, trimming the name filter and dropping it when blank.
    pub fn new(page: u32, size: u32, name: &str) -> Self {
        let trimmed = name.trim();
        Self {
            page,
            size,
            name: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }
}

/// A window over a filtered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub page_count: u32,
    pub content: Vec<T>,
}

impl<T> Page<T> {
    pub fn empty(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            total: 0,
            page_count: 0,
            content: Vec::new(),
        }
    }
}

/// `ceil(total / size)`, or `0` for a zero page size.
pub fn page_count(total: u64, size: u32) -> u32 {
    if size == 0 {
        return 0;
    }
    total.div_ceil(u64::from(size)) as u32
}
