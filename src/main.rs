//! Demo flow: signs in, registers a tutor and two pets, links one of them
//! through the tutor detail screen and searches the remaining candidates.

use pet_admin::config::AdminConfig;
use pet_admin::lifecycle::{setup_tracing, AdminSystem};
use pet_admin::model::{PetField, PhotoUpload, TutorField};
use pet_admin::stores::SaveOutcome;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = AdminConfig::from_env().map_err(|e| e.to_string())?;
    setup_tracing(&config.logging.level);

    info!("Starting pet admin demo");
    let system = AdminSystem::new(&config);
    let stores = &system.stores;

    if !stores
        .session
        .login(&config.remote.username, &config.remote.password)
        .await
    {
        let message = stores.session.snapshot().error.unwrap_or_default();
        error!(%message, "Sign in failed");
        system.shutdown().await?;
        return Err(message);
    }

    // Register a tutor
    let span = tracing::info_span!("tutor_registration");
    let tutor = async {
        let form = &stores.tutor_form;
        form.reset_create();
        form.set_field(TutorField::Name, "Ana Souza");
        form.set_field(TutorField::Email, "ana@example.com");
        form.set_field(TutorField::Phone, "(65) 99999-1234");
        form.set_field(TutorField::Document, "123.456.789-01");
        form.save().await
    }
    .instrument(span)
    .await
    .ok_or_else(|| stores.tutor_form.snapshot().error.unwrap_or_default())?;
    info!(tutor_id = %tutor.id, "Tutor registered");

    // Register two pets, the first one with a photo
    let span = tracing::info_span!("pet_registration");
    let pets = async {
        let mut saved = Vec::new();
        for (name, breed, age, photo) in [
            ("Rex", "Labrador", "3", Some(("rex.png", vec![0x89, 0x50, 0x4e, 0x47]))),
            ("Luna", "Siamese", "2", None),
        ] {
            let form = &stores.pet_form;
            form.reset_create();
            form.set_field(PetField::Name, name);
            form.set_field(PetField::Breed, breed);
            form.set_field(PetField::Age, age);

            let upload = match photo {
                Some((filename, bytes)) => {
                    Some(PhotoUpload::new(filename, "image/png", bytes).map_err(|e| e.to_string())?)
                }
                None => None,
            };
            let outcome = form.save_with_photo(upload).await;
            if let SaveOutcome::SavedWithoutPhoto { entity, photo_error } = &outcome {
                error!(pet_id = %entity.id, %photo_error, "Pet saved without photo");
            }
            match outcome.into_entity() {
                Some(pet) => saved.push(pet),
                None => return Err(form.snapshot().error.unwrap_or_default()),
            }
        }
        Ok::<_, String>(saved)
    }
    .instrument(span)
    .await?;

    // Browse the pet list
    stores.pet_list.set_name_filter("");
    stores.pet_list.fetch().await;
    if let Some(page) = stores.pet_list.snapshot().data {
        info!(
            total = page.total,
            pages = page.page_count,
            page_size = stores.pet_list.page_size(),
            "Pet list loaded"
        );
    }

    // Link the first pet from the tutor detail screen
    let span = tracing::info_span!("linking");
    async {
        let detail = &stores.tutor_detail;
        detail.fetch(tutor.id).await;
        if detail.link(tutor.id, pets[0].id).await {
            info!(linked = ?detail.linked_ids(), "Pet linked");
        } else {
            let message = detail.snapshot().link_error.unwrap_or_default();
            error!(%message, "Link failed");
        }

        let candidates = &stores.pet_candidates;
        candidates.set_excluded(detail.linked_ids());
        if let Err(e) = candidates.refresh().await {
            error!(error = %e, "Candidate search task failed");
        }
        let names: Vec<String> = candidates
            .snapshot()
            .data
            .map(|page| page.content.into_iter().map(|pet| pet.name).collect())
            .unwrap_or_default();
        info!(?names, "Pets still available to link");
    }
    .instrument(span)
    .await;

    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
