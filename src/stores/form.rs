//! # Form Store
//!
//! Create and edit screens share one store per resource type. Whether
//! [`FormStore::save`] creates or updates is decided by `editing_id`: empty
//! after [`FormStore::reset_create`], set by [`FormStore::load_for_edit`] and by
//! a successful create.
//!
//! Fields are held as typed text. The only client-side processing is the
//! per-field normalization in [`FormDraft::set_field`]; validation is left to
//! the server.

use crate::framework::{FieldOf, FormDraft, Resource, ResourceFacade, StateStream, Subject};
use crate::model::PhotoUpload;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<T: Resource> {
    pub editing_id: Option<T::Id>,
    pub fields: T::Draft,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<String>,
    pub success: Option<String>,
    pub photo_error: Option<String>,
}

impl<T: Resource> Default for FormState<T> {
    fn default() -> Self {
        Self {
            editing_id: None,
            fields: T::Draft::default(),
            loading: false,
            saving: false,
            error: None,
            success: None,
            photo_error: None,
        }
    }
}

/// Result of a save followed by a photo upload.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome<T> {
    /// The record was not saved; nothing was uploaded.
    Failed,
    /// The record was saved, and the photo too if one was given.
    Saved(T),
    /// The record was saved but the upload failed. The record is kept.
    SavedWithoutPhoto { entity: T, photo_error: String },
}

impl<T> SaveOutcome<T> {
    pub fn entity(&self) -> Option<&T> {
        match self {
            SaveOutcome::Failed => None,
            SaveOutcome::Saved(entity) | SaveOutcome::SavedWithoutPhoto { entity, .. } => {
                Some(entity)
            }
        }
    }

    pub fn into_entity(self) -> Option<T> {
        match self {
            SaveOutcome::Failed => None,
            SaveOutcome::Saved(entity) | SaveOutcome::SavedWithoutPhoto { entity, .. } => {
                Some(entity)
            }
        }
    }
}

pub struct FormStore<T: Resource> {
    facade: Arc<dyn ResourceFacade<T>>,
    subject: Subject<FormState<T>>,
}

impl<T: Resource> FormStore<T> {
    pub fn new(facade: Arc<dyn ResourceFacade<T>>) -> Self {
        Self {
            facade,
            subject: Subject::default(),
        }
    }

    pub fn snapshot(&self) -> FormState<T> {
        self.subject.snapshot()
    }

    pub fn subscribe(&self) -> StateStream<FormState<T>> {
        self.subject.subscribe()
    }

    /// Empties the form for a new record.
    pub fn reset_create(&self) {
        self.subject.replace(FormState::default());
    }

    #[instrument(skip(self), fields(kind = T::KIND))]
    pub async fn load_for_edit(&self, id: T::Id) {
        self.subject.replace(FormState {
            editing_id: Some(id),
            loading: true,
            ..FormState::default()
        });

        match self.facade.get_by_id(id).await {
            Ok(entity) => {
                let fields = entity.to_draft();
                self.subject.update(|state| {
                    state.fields = fields;
                    state.loading = false;
                });
            }
            Err(e) => {
                warn!(%id, error = %e, "Load for edit failed");
                self.subject.update(|state| {
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }

    pub fn set_field(&self, field: FieldOf<T>, value: &str) {
        self.subject
            .update(|state| state.fields.set_field(field, value));
    }

    /// Creates or updates the record from the current fields.
    ///
    /// Returns the record as the server stored it, or `None` with `error` set.
    #[instrument(skip(self), fields(kind = T::KIND))]
    pub async fn save(&self) -> Option<T> {
        let mut pending = (None, T::Draft::default());
        self.subject.update(|state| {
            state.saving = true;
            state.error = None;
            state.success = None;
            state.photo_error = None;
            pending = (state.editing_id, state.fields.clone());
        });
        let (editing_id, draft) = pending;

        let result = match editing_id {
            None => self.facade.create(draft).await,
            Some(id) => self.facade.update(id, draft).await,
        };

        match result {
            Ok(entity) => {
                let verb = if editing_id.is_some() { "updated" } else { "created" };
                let id = entity.id();
                info!(%id, verb, "Saved");
                self.subject.update(|state| {
                    state.saving = false;
                    state.editing_id = Some(id);
                    state.success = Some(format!("{} {verb} successfully", label(T::KIND)));
                });
                Some(entity)
            }
            Err(e) => {
                warn!(error = %e, "Save failed");
                self.subject.update(|state| {
                    state.saving = false;
                    state.error = Some(e.to_string());
                });
                None
            }
        }
    }

    /// Saves, then uploads `photo` for the saved record.
    ///
    /// A failed upload does not undo the save; it is reported in
    /// `photo_error` and as [`SaveOutcome::SavedWithoutPhoto`].
    #[instrument(skip(self, photo), fields(kind = T::KIND))]
    pub async fn save_with_photo(&self, photo: Option<PhotoUpload>) -> SaveOutcome<T> {
        let Some(entity) = self.save().await else {
            return SaveOutcome::Failed;
        };
        let Some(photo) = photo else {
            return SaveOutcome::Saved(entity);
        };

        let id = entity.id();
        match self.facade.upload_photo(id, photo).await {
            Ok(()) => {
                info!(%id, "Photo uploaded");
                SaveOutcome::Saved(entity)
            }
            Err(e) => {
                warn!(%id, error = %e, "Photo upload failed");
                let photo_error = e.to_string();
                self.subject
                    .update(|state| state.photo_error = Some(photo_error.clone()));
                SaveOutcome::SavedWithoutPhoto {
                    entity,
                    photo_error,
                }
            }
        }
    }
}

fn label(kind: &str) -> String {
    let mut chars = kind.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
