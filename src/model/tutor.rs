//! Represents a tutor (pet guardian) record as served by the remote API.
//!
//! Mirrors [`Pet`]: implements [`Resource`] for the generic stores and
//! [`Related<Pet>`] for the tutor detail screen, where pets are linked and
//! unlinked.

use serde::{Deserialize, Serialize};

use std::fmt::Display;

use crate::framework::{FormDraft, Related, Resource};
use crate::model::{digits_only, Pet, PetId, PetSummary, Photo};

/// Type-safe identifier for Tutors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TutorId(pub u32);

impl From<u32> for TutorId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for TutorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: TutorId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
    #[serde(rename = "endereco", default)]
    pub address: String,
    #[serde(rename = "cpf", default)]
    pub document: String,
    #[serde(rename = "foto", default)]
    pub photo: Option<Photo>,
    #[serde(default)]
    pub pets: Vec<PetSummary>,
}

impl Tutor {
    pub fn new(id: TutorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            document: String::new(),
            photo: None,
            pets: Vec::new(),
        }
    }

    pub fn with_pets(mut self, pets: impl IntoIterator<Item = PetId>) -> Self {
        self.pets = pets.into_iter().map(PetSummary::bare).collect();
        self
    }

    pub fn summary(&self) -> TutorSummary {
        TutorSummary {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// The slice of a tutor embedded in a pet record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TutorSummary {
    pub id: TutorId,
    #[serde(rename = "nome", default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefone", default)]
    pub phone: String,
}

impl TutorSummary {
    /// A summary carrying only the id.
    pub fn bare(id: TutorId) -> Self {
        Self {
            id,
            name: String::new(),
            email: String::new(),
            phone: String::new(),
        }
    }
}

/// Editable tutor fields, as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TutorDraft {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "endereco")]
    pub address: String,
    #[serde(rename = "cpf")]
    pub document: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TutorField {
    Name,
    Email,
    Phone,
    Address,
    Document,
}

impl FormDraft for TutorDraft {
    type Field = TutorField;

    fn set_field(&mut self, field: TutorField, value: &str) {
        match field {
            TutorField::Name => self.name = value.to_string(),
            TutorField::Email => self.email = value.to_string(),
            TutorField::Phone => self.phone = digits_only(value, 11),
            TutorField::Address => self.address = value.to_string(),
            TutorField::Document => self.document = digits_only(value, 11),
        }
    }
}

impl Resource for Tutor {
    type Id = TutorId;
    type Draft = TutorDraft;

    const KIND: &'static str = "tutor";

    fn id(&self) -> TutorId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn to_draft(&self) -> TutorDraft {
        TutorDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            document: self.document.clone(),
        }
    }
}

impl Related<Pet> for Tutor {
    fn related_ids(&self) -> Vec<PetId> {
        self.pets.iter().map(|pet| pet.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_and_document_keep_eleven_digits() {
        let mut draft = TutorDraft::default();
        draft.set_field(TutorField::Phone, "(65) 99999-1234");
        draft.set_field(TutorField::Document, "123.456.789-0123");
        assert_eq!(draft.phone, "65999991234");
        assert_eq!(draft.document, "12345678901");
    }

    #[test]
    fn email_and_address_are_kept_as_typed() {
        let mut draft = TutorDraft::default();
        draft.set_field(TutorField::Email, "Ana@Example.com ");
        draft.set_field(TutorField::Address, "Rua A, 10");
        assert_eq!(draft.email, "Ana@Example.com ");
        assert_eq!(draft.address, "Rua A, 10");
    }

    #[test]
    fn draft_serializes_wire_names() {
        let draft = TutorDraft {
            name: "Ana".into(),
            phone: "65999991234".into(),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["nome"], "Ana");
        assert_eq!(json["telefone"], "65999991234");
        assert_eq!(json["cpf"], "");
    }

    #[test]
    fn related_ids_come_from_embedded_pets() {
        let tutor = Tutor::new(TutorId(1), "Ana").with_pets([PetId(5), PetId(6)]);
        assert_eq!(tutor.related_ids(), vec![PetId(5), PetId(6)]);
    }
}
