use std::sync::Arc;

use pet_admin::config::StoreConfig;
use pet_admin::framework::mock::{MockClient, MockRelation, RelationCall};
use pet_admin::framework::{ApiError, ResourceFacade};
use pet_admin::lifecycle::{Facades, Stores};
use pet_admin::model::{Pet, PetDraft, Tutor, TutorDraft};
use pet_admin::remote::{Credentials, RemoteRegistry};
use pet_admin::stores::{DetailStore, MemoryTokenStorage};

/// Real registry for records, mocked relation endpoint.
/// The relation failure must surface as `link_error` while the loaded record
/// and its `error` field stay untouched.
#[tokio::test]
async fn test_link_failure_with_real_records() {
    let (registry, remote) = RemoteRegistry::new(
        8,
        Credentials {
            username: "admin".into(),
            password: "admin".into(),
        },
    );
    let handle = tokio::spawn(registry.run());

    let tutor = remote
        .tutors
        .create(TutorDraft {
            name: "Ana".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let pet = remote
        .pets
        .create(PetDraft {
            name: "Rex".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let relation = Arc::new(MockRelation::<Tutor, Pet>::new());
    relation.return_err(ApiError::Rejected {
        status: 503,
        message: "link service unavailable".into(),
    });

    let detail = DetailStore::new(
        Arc::new(remote.tutors.clone()),
        Arc::new(remote.pets.clone()),
        relation.clone(),
    );
    detail.fetch(tutor.id).await;
    assert!(!detail.link(tutor.id, pet.id).await);

    let state = detail.snapshot();
    assert_eq!(state.link_error.as_deref(), Some("link service unavailable"));
    assert_eq!(state.error, None);
    assert!(!state.linking);
    assert_eq!(state.entity.map(|t| t.id), Some(tutor.id));
    assert_eq!(relation.calls(), vec![RelationCall::Link(tutor.id, pet.id)]);

    // Nothing was linked on the server.
    let stored = remote.tutors.get_by_id(tutor.id).await.unwrap();
    assert!(stored.pets.is_empty());

    drop(detail);
    drop(remote);
    handle.await.unwrap();
}

/// Every store wired to mocks through the same path the system uses.
#[tokio::test]
async fn test_stores_from_mock_facades() {
    let pets = MockClient::<Pet>::new();
    let tutors = MockClient::<Tutor>::new();
    let links = Arc::new(MockRelation::<Tutor, Pet>::new());

    pets.expect_list()
        .return_err(ApiError::Network("connection reset".into()));
    tutors
        .expect_delete(pet_admin::model::TutorId(1))
        .return_err(ApiError::bad_request("tutor has pets"));

    let (_, remote) = RemoteRegistry::new(
        1,
        Credentials {
            username: "admin".into(),
            password: "admin".into(),
        },
    );
    let stores = Stores::from_facades(
        Facades {
            pets: pets.facade(),
            tutors: tutors.facade(),
            tutor_links: links,
            pet_links: Arc::new(MockRelation::<Pet, Tutor>::new()),
            auth: Arc::new(remote.auth),
            tokens: Arc::new(MemoryTokenStorage::default()),
        },
        &StoreConfig::default(),
    );

    stores.pet_list.fetch().await;
    let pet_list = stores.pet_list.snapshot();
    assert_eq!(
        pet_list.error.as_deref(),
        Some("request could not complete: connection reset")
    );
    assert_eq!(pet_list.data, None);

    stores.tutor_list.delete(pet_admin::model::TutorId(1)).await;
    let tutor_list = stores.tutor_list.snapshot();
    assert_eq!(tutor_list.delete_error.as_deref(), Some("tutor has pets"));
    assert_eq!(tutor_list.error, None);

    // The registry was never started, so sign-in fails as a network error.
    assert!(!stores.session.login("admin", "admin").await);
    assert!(stores.session.snapshot().error.is_some());

    pets.verify();
    tutors.verify();
}
