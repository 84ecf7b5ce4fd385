use std::time::Duration;

use subject_catalog::{config, CatalogError, Hints, InMemoryCatalog, RemoteSubjects, Subjects};
use tokio_util::sync::CancellationToken;

use crate::support::{self, Ending, Scripted};

#[tokio::test]
async fn add_creates_once_and_keeps_first_hints() {
    let catalog = InMemoryCatalog::new();
    let subjects = support::remote(&catalog).await;
    let cancel = CancellationToken::new();

    let (subject, created) = subjects.add(&cancel, "svc-a", None).await.unwrap();
    assert!(created);
    assert_eq!(subject.id, "svc-a");
    assert_eq!(subject.hints, None);

    let hints = Hints::trace_time(Duration::from_secs(30));
    let (subject, created) = subjects.add(&cancel, "svc-a", Some(hints)).await.unwrap();
    assert!(!created);
    assert_eq!(subject.id, "svc-a");
    assert_eq!(subject.hints, None);

    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.get("svc-a").unwrap().hints, None);
}

#[tokio::test]
async fn hints_reach_the_service_on_creation() {
    let catalog = InMemoryCatalog::new();
    let subjects = support::remote(&catalog).await;
    let hints = Hints::trace_time(Duration::from_secs(10));

    let (subject, created) = subjects
        .add(&CancellationToken::new(), "traced", Some(hints.clone()))
        .await
        .unwrap();

    assert!(created);
    assert_eq!(subject.hints, Some(hints.clone()));
    assert_eq!(catalog.get("traced").unwrap().hints, Some(hints));
}

#[tokio::test]
async fn invalid_id_is_rejected_before_any_rpc() {
    let scripted = Scripted::new(&[], Ending::Complete);
    let subjects = support::connect(support::start_server(scripted.clone()).await).await;

    for id in ["", "  ", "line\nbreak"] {
        let err = subjects
            .add(&CancellationToken::new(), id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidId(_)), "{:?}", id);
    }
    assert_eq!(scripted.calls(), 0);
}

#[tokio::test]
async fn response_without_subject_is_a_decode_error() {
    let scripted = Scripted::new(&[], Ending::Complete);
    let subjects = support::connect(support::start_server(scripted.clone()).await).await;

    let err = subjects
        .add(&CancellationToken::new(), "svc-a", None)
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Decode(_)));
    assert_eq!(scripted.calls(), 1);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let config = support::config(support::dead_addr().await);
    let subjects = RemoteSubjects::connect_lazy(&config).unwrap();

    let err = subjects
        .add(&CancellationToken::new(), "svc-a", None)
        .await
        .unwrap_err();

    assert!(err.is_transport());
}

#[tokio::test]
async fn racing_adds_create_exactly_once() {
    let catalog = InMemoryCatalog::new();
    let subjects = support::remote(&catalog).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let subjects = subjects.clone();
            tokio::spawn(async move {
                subjects
                    .add(&CancellationToken::new(), "contended", None)
                    .await
                    .map(|(_, created)| created)
            })
        })
        .collect();

    let mut created = 0;
    for task in tasks {
        if task.await.unwrap().unwrap() {
            created += 1;
        }
    }
    assert_eq!(created, 1);
    assert_eq!(catalog.len(), 1);
}

#[tokio::test]
async fn global_configuration_drives_the_default_client() {
    let catalog = InMemoryCatalog::new();
    let addr = support::start_server(catalog.clone()).await;
    config::init(support::config(addr)).unwrap();

    let subjects = RemoteSubjects::from_global().unwrap();
    let (_, created) = subjects
        .add(&CancellationToken::new(), "via-global", None)
        .await
        .unwrap();

    assert!(created);
    assert!(catalog.get("via-global").is_some());
}
