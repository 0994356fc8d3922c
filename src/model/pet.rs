//! Represents a pet record as served by the remote API.
//!
//! # Resources
//! This struct implements the [`Resource`] trait, so the generic list, detail
//! and form stores can manage it. Its editable fields travel as a
//! [`PetDraft`], and its linked tutors are exposed through
//! [`Related<Tutor>`].

use serde::{Deserialize, Serialize};

use std::fmt::Display;

use crate::framework::{FormDraft, Related, Resource};
use crate::model::{digits_only, Photo, Tutor, TutorId, TutorSummary};

/// Type-safe identifier for Pets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PetId(pub u32);

impl From<u32> for PetId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for PetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especie", default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,
    #[serde(rename = "raca")]
    pub breed: String,
    /// Whole years.
    #[serde(rename = "idade", default)]
    pub age: Option<u32>,
    #[serde(rename = "foto", default)]
    pub photo: Option<Photo>,
    #[serde(rename = "tutores", default)]
    pub tutors: Vec<TutorSummary>,
}

impl Pet {
    pub fn new(id: PetId, name: impl Into<String>, breed: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            species: None,
            breed: breed.into(),
            age: None,
            photo: None,
            tutors: Vec::new(),
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_tutors(mut self, tutors: impl IntoIterator<Item = TutorId>) -> Self {
        self.tutors = tutors.into_iter().map(TutorSummary::bare).collect();
        self
    }

    pub fn summary(&self) -> PetSummary {
        PetSummary {
            id: self.id,
            name: self.name.clone(),
            breed: self.breed.clone(),
            age: self.age,
        }
    }
}

/// The slice of a pet embedded in a tutor record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSummary {
    pub id: PetId,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(rename = "raca", default)]
    pub breed: String,
    #[serde(rename = "idade", default)]
    pub age: Option<u32>,
}

impl PetSummary {
    /// A summary carrying only the id.
    pub fn bare(id: PetId) -> Self {
        Self {
            id,
            name: String::new(),
            breed: String::new(),
            age: None,
        }
    }
}

/// Editable pet fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "especie")]
    pub species: String,
    #[serde(rename = "raca")]
    pub breed: String,
    #[serde(rename = "idade")]
    pub age: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetField {
    Name,
    Species,
    Breed,
    Age,
}

impl FormDraft for PetDraft {
    type Field = PetField;

    fn set_field(&mut self, field: PetField, value: &str) {
        match field {
            PetField::Name => self.name = value.to_string(),
            PetField::Species => self.species = value.to_string(),
            PetField::Breed => self.breed = value.to_string(),
            PetField::Age => self.age = digits_only(value, 2),
        }
    }
}

impl Resource for Pet {
    type Id = PetId;
    type Draft = PetDraft;

    const KIND: &'static str = "pet";

    fn id(&self) -> PetId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_draft(&self) -> PetDraft {
        PetDraft {
            name: self.name.clone(),
            species: self.species.clone().unwrap_or_default(),
            breed: self.breed.clone(),
            age: self.age.map(|age| age.to_string()).unwrap_or_default(),
        }
    }
}

impl Related<Tutor> for Pet {
    fn related_ids(&self) -> Vec<TutorId> {
        self.tutors.iter().map(|tutor| tutor.id).collect()
    }
}
