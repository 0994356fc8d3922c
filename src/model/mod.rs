//! Domain records exchanged with the remote API.
//!
//! Field names are English; serde renames map them to the API's wire names.

pub mod auth;
pub mod pet;
pub mod photo;
pub mod tutor;

pub use auth::Tokens;
pub use pet::{Pet, PetDraft, PetField, PetId, PetSummary};
pub use photo::{Photo, PhotoUpload};
pub use tutor::{Tutor, TutorDraft, TutorField, TutorId, TutorSummary};

/// Keeps the ASCII digits of `value`, at most `max` of them.
pub(crate) fn digits_only(value: &str, max: usize) -> String {
    value.chars().filter(char::is_ascii_digit).take(max).collect()
}
