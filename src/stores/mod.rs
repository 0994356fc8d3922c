//! View-facing state stores.
//!
//! Every store owns one snapshot, exposed through `snapshot()` and
//! `subscribe()`, and is the only code allowed to change it. Operations never
//! return errors to the view: each failure ends up as a message in the
//! snapshot field belonging to that operation.

pub mod candidates;
pub mod detail;
pub mod form;
pub mod list;
pub mod session;

pub use candidates::{CandidateList, CandidateState};
pub use detail::{DetailState, DetailStore};
pub use form::{FormState, FormStore, SaveOutcome};
pub use list::{ListState, ListStore};
pub use session::{MemoryTokenStorage, SessionState, SessionStore, TokenStorage};

use crate::model::{Pet, Tutor};

pub type PetListStore = ListStore<Pet>;
pub type TutorListStore = ListStore<Tutor>;
pub type PetDetailStore = DetailStore<Pet, Tutor>;
pub type TutorDetailStore = DetailStore<Tutor, Pet>;
pub type PetFormStore = FormStore<Pet>;
pub type TutorFormStore = FormStore<Tutor>;
/// Pets offered for linking on a tutor detail screen.
pub type PetCandidates = CandidateList<Pet>;
