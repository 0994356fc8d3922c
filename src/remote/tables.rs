//! Server-side storage and the per-type rules the registry applies.

use crate::framework::{ApiError, Resource};
use crate::model::{Pet, PetDraft, PetId, Photo, Tutor, TutorDraft, TutorId};
use std::collections::{BTreeMap, BTreeSet};

/// Everything the registry owns. Records are stored without their embedded
/// summaries; those are rebuilt from `links` on every read.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub pets: BTreeMap<PetId, Pet>,
    pub tutors: BTreeMap<TutorId, Tutor>,
    pub links: BTreeSet<(TutorId, PetId)>,
    next_pet: u32,
    next_tutor: u32,
    next_photo: u32,
}

impl Tables {
    pub fn next_photo_id(&mut self) -> u32 {
        self.next_photo += 1;
        self.next_photo
    }
}

/// A resource the registry knows how to store and validate.
pub(crate) trait Stored: Resource {
    fn table(tables: &Tables) -> &BTreeMap<Self::Id, Self>;

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<Self::Id, Self>;

    /// The id the next created record will get. Nothing is reserved until
    /// [`Stored::reserve_id`] is called.
    fn next_id(tables: &Tables) -> Self::Id;

    fn reserve_id(tables: &mut Tables);

    /// Validates a draft and builds the stored record.
    fn build(id: Self::Id, draft: Self::Draft) -> Result<Self, ApiError>;

    fn set_photo(&mut self, photo: Photo);

    /// Fills the embedded summaries of the linked records.
    fn hydrate(&mut self, tables: &Tables);

    /// Drops every link that involves `id`.
    fn unlink_all(tables: &mut Tables, id: Self::Id);

    /// Replaces the editable fields, keeping the id and photo.
    fn apply(&mut self, draft: Self::Draft) -> Result<(), ApiError> {
        let mut next = Self::build(self.id(), draft)?;
        next.set_photo_from(self);
        *self = next;
        Ok(())
    }

    fn set_photo_from(&mut self, previous: &Self);
}

fn required(field: &str, value: &str) -> Result<String, ApiError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ApiError::bad_request(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

impl Stored for Pet {
    fn table(tables: &Tables) -> &BTreeMap<PetId, Pet> {
        &tables.pets
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<PetId, Pet> {
        &mut tables.pets
    }

    fn next_id(tables: &Tables) -> PetId {
        PetId(tables.next_pet + 1)
    }

    fn reserve_id(tables: &mut Tables) {
        tables.next_pet += 1;
    }

    fn build(id: PetId, draft: PetDraft) -> Result<Pet, ApiError> {
        let name = required("name", &draft.name)?;
        let age = match draft.age.trim() {
            "" => None,
            digits => Some(
                digits
                    .parse::<u32>()
                    .map_err(|_| ApiError::bad_request("age must be a whole number"))?,
            ),
        };
        let species = draft.species.trim();
        Ok(Pet {
            id,
            name,
            species: (!species.is_empty()).then(|| species.to_string()),
            breed: draft.breed.trim().to_string(),
            age,
            photo: None,
            tutors: Vec::new(),
        })
    }

    fn set_photo(&mut self, photo: Photo) {
        self.photo = Some(photo);
    }

    fn set_photo_from(&mut self, previous: &Pet) {
        self.photo = previous.photo.clone();
    }

    fn hydrate(&mut self, tables: &Tables) {
        self.tutors = tables
            .links
            .iter()
            .filter(|(_, pet)| *pet == self.id)
            .filter_map(|(tutor, _)| tables.tutors.get(tutor))
            .map(Tutor::summary)
            .collect();
    }

    fn unlink_all(tables: &mut Tables, id: PetId) {
        tables.links.retain(|(_, pet)| *pet != id);
    }
}

impl Stored for Tutor {
    fn table(tables: &Tables) -> &BTreeMap<TutorId, Tutor> {
        &tables.tutors
    }

    fn table_mut(tables: &mut Tables) -> &mut BTreeMap<TutorId, Tutor> {
        &mut tables.tutors
    }

    fn next_id(tables: &Tables) -> TutorId {
        TutorId(tables.next_tutor + 1)
    }

    fn reserve_id(tables: &mut Tables) {
        tables.next_tutor += 1;
    }

    fn build(id: TutorId, draft: TutorDraft) -> Result<Tutor, ApiError> {
        let name = required("name", &draft.name)?;
        let email = draft.email.trim().to_string();
        if !email.is_empty() && !email.contains('@') {
            return Err(ApiError::bad_request("email is not valid"));
        }
        if !draft.document.is_empty() && draft.document.len() != 11 {
            return Err(ApiError::bad_request("CPF must have 11 digits"));
        }
        Ok(Tutor {
            id,
            name,
            email,
            phone: draft.phone,
            address: draft.address.trim().to_string(),
            document: draft.document,
            photo: None,
            pets: Vec::new(),
        })
    }

    fn set_photo(&mut self, photo: Photo) {
        self.photo = Some(photo);
    }

    fn set_photo_from(&mut self, previous: &Tutor) {
        self.photo = previous.photo.clone();
    }

    fn hydrate(&mut self, tables: &Tables) {
        self.pets = tables
            .links
            .iter()
            .filter(|(tutor, _)| *tutor == self.id)
            .filter_map(|(_, pet)| tables.pets.get(pet))
            .map(Pet::summary)
            .collect();
    }

    fn unlink_all(tables: &mut Tables, id: TutorId) {
        tables.links.retain(|(tutor, _)| *tutor != id);
    }
}
