use pet_admin::config::AdminConfig;
use pet_admin::framework::ResourceFacade;
use pet_admin::lifecycle::{AdminSystem, Facades, Stores};
use pet_admin::model::{PetDraft, PetField, PetId, PhotoUpload, TutorField};
use pet_admin::remote::{Credentials, RemoteRegistry};
use pet_admin::stores::SaveOutcome;

fn config() -> AdminConfig {
    AdminConfig::from_toml_str(
        r#"
        [stores]
        search_debounce_ms = 5

        [remote]
        username = "admin"
        password = "secret"
        "#,
    )
    .expect("valid config")
}

/// Full end-to-end flow through every store against the in-process registry.
#[tokio::test]
async fn test_full_admin_flow() {
    let system = AdminSystem::new(&config());
    let stores = &system.stores;

    // Sign in
    assert!(!stores.session.login("admin", "wrong").await);
    assert!(stores.session.login("admin", "secret").await);
    assert!(stores.session.snapshot().signed_in);

    // Create a tutor
    stores.tutor_form.reset_create();
    stores.tutor_form.set_field(TutorField::Name, "Ana");
    stores.tutor_form.set_field(TutorField::Phone, "(65) 3333-4444");
    let tutor = stores.tutor_form.save().await.expect("tutor saved");
    assert_eq!(tutor.phone, "6533334444");

    // Create three pets, one with a photo
    let mut pet_ids = Vec::new();
    for name in ["Rex", "Luna", "Thor"] {
        stores.pet_form.reset_create();
        stores.pet_form.set_field(PetField::Name, name);
        stores.pet_form.set_field(PetField::Breed, "SRD");
        stores.pet_form.set_field(PetField::Age, "4");
        let photo = (name == "Rex")
            .then(|| PhotoUpload::new("rex.jpg", "image/jpeg", vec![0xff, 0xd8]).unwrap());
        let outcome = stores.pet_form.save_with_photo(photo).await;
        let SaveOutcome::Saved(pet) = outcome else {
            panic!("unexpected outcome: {outcome:?}");
        };
        pet_ids.push(pet.id);
    }

    // Edit the second pet
    stores.pet_form.load_for_edit(pet_ids[1]).await;
    assert_eq!(stores.pet_form.snapshot().fields.name, "Luna");
    stores.pet_form.set_field(PetField::Name, "Luna Maria");
    let updated = stores.pet_form.save().await.expect("pet updated");
    assert_eq!(updated.id, pet_ids[1]);
    assert_eq!(
        stores.pet_form.snapshot().success.as_deref(),
        Some("Pet updated successfully")
    );

    // Filtered list
    stores.pet_list.set_name_filter("lu");
    stores.pet_list.fetch().await;
    let page = stores.pet_list.snapshot().data.expect("page loaded");
    assert_eq!(page.total, 1);
    assert_eq!(page.content[0].name, "Luna Maria");

    // Link two pets from the tutor screen
    stores.tutor_detail.fetch(tutor.id).await;
    assert!(stores.tutor_detail.snapshot().related.is_empty());
    assert!(stores.tutor_detail.link(tutor.id, pet_ids[0]).await);
    assert!(stores.tutor_detail.link(tutor.id, pet_ids[2]).await);
    let detail = stores.tutor_detail.snapshot();
    assert_eq!(detail.error, None);
    assert_eq!(detail.link_error, None);
    assert_eq!(stores.tutor_detail.linked_ids(), vec![pet_ids[0], pet_ids[2]]);
    assert!(detail.related[0].photo.is_some());

    // Linking twice is rejected and reported as a link error
    assert!(!stores.tutor_detail.link(tutor.id, pet_ids[0]).await);
    assert!(stores.tutor_detail.snapshot().link_error.is_some());

    // The pet screen sees the tutor
    stores.pet_detail.fetch(pet_ids[0]).await;
    let pet_detail = stores.pet_detail.snapshot();
    assert_eq!(pet_detail.related.len(), 1);
    assert_eq!(pet_detail.related[0].name, "Ana");

    // Only the unlinked pet remains a candidate
    stores
        .pet_candidates
        .set_excluded(stores.tutor_detail.linked_ids())
        .await
        .unwrap();
    let candidates = stores.pet_candidates.snapshot().data.expect("candidates");
    let ids: Vec<PetId> = candidates.content.iter().map(|pet| pet.id).collect();
    assert_eq!(ids, vec![pet_ids[1]]);

    // Unlink, then delete a pet from the list
    assert!(stores.tutor_detail.unlink(tutor.id, pet_ids[2]).await);
    assert_eq!(stores.tutor_detail.linked_ids(), vec![pet_ids[0]]);

    stores.pet_list.set_name_filter("");
    stores.pet_list.delete(pet_ids[0]).await;
    let list = stores.pet_list.snapshot();
    assert_eq!(list.delete_error, None);
    assert_eq!(list.data.expect("page").total, 2);

    stores.tutor_detail.fetch(tutor.id).await;
    assert!(stores.tutor_detail.snapshot().related.is_empty());

    system.shutdown().await.expect("clean shutdown");
}

/// 25 records with page size 10: three pages, and a page past the end is
/// empty rather than an error.
#[tokio::test]
async fn test_pagination_past_the_end() {
    let system = AdminSystem::new(&config());
    let list = &system.stores.pet_list;

    for n in 0..25 {
        let form = &system.stores.pet_form;
        form.reset_create();
        form.set_field(PetField::Name, &format!("Pet {n:02}"));
        form.save().await.expect("pet saved");
    }

    list.set_page(2);
    list.fetch().await;
    let third = list.snapshot().data.expect("page");
    assert_eq!(third.page_count, 3);
    assert_eq!(third.content.len(), 5);

    list.set_page(5);
    list.fetch().await;
    let state = list.snapshot();
    assert_eq!(state.error, None);
    let beyond = state.data.expect("page");
    assert_eq!(beyond.page, 5);
    assert!(beyond.content.is_empty());

    system.shutdown().await.expect("clean shutdown");
}

/// Server-side validation failures end up in the form's error field.
#[tokio::test]
async fn test_rejected_save_surfaces_server_message() {
    let system = AdminSystem::new(&config());
    let form = &system.stores.tutor_form;

    form.reset_create();
    form.set_field(TutorField::Name, "Bia");
    form.set_field(TutorField::Document, "123");
    assert!(form.save().await.is_none());

    let state = form.snapshot();
    assert_eq!(state.error.as_deref(), Some("CPF must have 11 digits"));
    assert_eq!(state.editing_id, None);

    system.shutdown().await.expect("clean shutdown");
}

/// Stores can be wired by hand around registry clients.
#[tokio::test]
async fn test_stores_from_registry_facades() {
    let (registry, remote) = RemoteRegistry::new(
        4,
        Credentials {
            username: "admin".into(),
            password: "admin".into(),
        },
    );
    let handle = tokio::spawn(registry.run());

    remote
        .pets
        .create(PetDraft {
            name: "Rex".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let stores = Stores::from_facades(Facades::from_remote(remote), &config().stores);
    stores.pet_list.fetch().await;
    assert_eq!(stores.pet_list.snapshot().data.unwrap().total, 1);

    drop(stores);
    handle.await.unwrap();
}
