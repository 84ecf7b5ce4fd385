use subject_catalog::{CatalogError, Expression, InMemoryCatalog, Query, RemoteSubjects, Subject, Subjects};
use tokio_util::sync::CancellationToken;

use crate::support::{self, Ending, Scripted};

async fn collect(subjects: &dyn Subjects, query: &Query) -> (Vec<String>, Result<(), CatalogError>) {
    let mut ids = Vec::new();
    let result = subjects
        .search(&CancellationToken::new(), query, &mut |s: Subject| {
            ids.push(s.id);
            Ok(())
        })
        .await;
    (ids, result)
}

#[tokio::test]
async fn prefix_query_streams_matches_in_order() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let (ids, result) = collect(&subjects, &Query::new(Expression::field("id").prefix("app"))).await;

    result.unwrap();
    assert_eq!(ids, vec!["app1", "app2"]);
}

#[tokio::test]
async fn match_all_returns_every_subject() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let (ids, result) = collect(&subjects, &Query::all()).await;

    result.unwrap();
    assert_eq!(ids, vec!["app1", "app2", "other"]);
}

#[tokio::test]
async fn records_carry_information_and_hints() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let mut received = Vec::new();
    subjects
        .search(
            &CancellationToken::new(),
            &Query::new(Expression::field("id").equals("app1")),
            &mut |s: Subject| {
                received.push(s);
                Ok(())
            },
        )
        .await
        .unwrap();

    assert_eq!(received, vec![support::sample_catalog().get("app1").unwrap()]);
}

#[tokio::test]
async fn nested_fields_filter_on_the_server() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let query = Query::new(
        Expression::field("information.package")
            .glob("com.example.*")
            .and(Expression::field("information.version_code").greater_than(1)),
    );
    let (ids, result) = collect(&subjects, &query).await;
    result.unwrap();
    assert_eq!(ids, vec!["app1"]);

    let query = Query::new(Expression::field("hints.trace_time").at_least(10));
    let (ids, result) = collect(&subjects, &query).await;
    result.unwrap();
    assert_eq!(ids, vec!["app1"]);
}

#[tokio::test]
async fn empty_result_never_calls_handler() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let (ids, result) = collect(&subjects, &Query::new(Expression::field("id").equals("missing"))).await;

    result.unwrap();
    assert!(ids.is_empty());
}

#[tokio::test]
async fn local_and_remote_agree() {
    let catalog = support::sample_catalog();
    let subjects = support::remote(&catalog).await;

    let queries = [
        Query::all(),
        Query::new(Expression::field("id").suffix("2")),
        Query::new(!Expression::field("id").prefix("app")),
        Query::new(
            Expression::field("information.name")
                .contains("One")
                .or(Expression::field("id").equals("other")),
        ),
    ];

    for query in &queries {
        let (local, local_result) = collect(&catalog, query).await;
        let (remote, remote_result) = collect(&subjects, query).await;
        local_result.unwrap();
        remote_result.unwrap();
        assert_eq!(local, remote, "{:?}", query);
    }
}

#[tokio::test]
async fn invalid_query_is_rejected_before_any_rpc() {
    let scripted = Scripted::new(&["a"], Ending::Complete);
    let subjects = support::connect(support::start_server(scripted.clone()).await).await;

    let (ids, result) = collect(&subjects, &Query::new(Expression::field("colour").equals("red"))).await;

    assert!(matches!(result, Err(CatalogError::InvalidQuery(_))));
    assert!(ids.is_empty());
    assert_eq!(scripted.calls(), 0);
}

#[tokio::test]
async fn overly_deep_query_is_rejected_before_any_rpc() {
    let scripted = Scripted::new(&["a"], Ending::Complete);
    let subjects = support::connect(support::start_server(scripted.clone()).await).await;

    let mut expr = Expression::field("id").prefix("app");
    for _ in 0..120 {
        expr = !expr;
    }
    let (ids, result) = collect(&subjects, &Query::new(expr)).await;

    assert!(matches!(result, Err(CatalogError::InvalidQuery(_))));
    assert!(ids.is_empty());
    assert_eq!(scripted.calls(), 0);
}

#[tokio::test]
async fn unreachable_service_fails_without_records() {
    let subjects = RemoteSubjects::connect_lazy(&support::config(support::dead_addr().await)).unwrap();

    let (ids, result) = collect(&subjects, &Query::all()).await;

    assert!(result.unwrap_err().is_transport());
    assert!(ids.is_empty());
}

#[tokio::test]
async fn stream_failure_keeps_delivered_prefix() {
    let scripted = Scripted::new(&["a", "b"], Ending::Fail(tonic::Code::Internal));
    let subjects = support::connect(support::start_server(scripted).await).await;

    let (ids, result) = collect(&subjects, &Query::all()).await;

    assert_eq!(ids, vec!["a", "b"]);
    let err = result.unwrap_err();
    assert_eq!(err.status().unwrap().code(), tonic::Code::Internal);
}

#[tokio::test]
async fn handler_error_stops_the_stream() {
    let scripted = Scripted::new(&["a", "b", "c"], Ending::Stall);
    let subjects = support::connect(support::start_server(scripted.clone()).await).await;

    let mut seen = Vec::new();
    let err = subjects
        .search(&CancellationToken::new(), &Query::all(), &mut |s: Subject| {
            seen.push(s.id);
            Err("stop here".into())
        })
        .await
        .unwrap_err();

    assert!(matches!(err, CatalogError::Handler(_)));
    assert_eq!(err.to_string(), "handler error: stop here");
    assert_eq!(seen, vec!["a"]);
    assert!(support::eventually(&scripted.released).await);
}

#[tokio::test]
async fn concurrent_searches_share_one_client() {
    let subjects = support::remote(&support::sample_catalog()).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let subjects = subjects.clone();
            tokio::spawn(async move {
                let (ids, result) = collect(&subjects, &Query::new(Expression::field("id").prefix("app"))).await;
                result.map(|_| ids)
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), vec!["app1", "app2"]);
    }
}

#[tokio::test]
async fn search_sees_subjects_added_remotely() {
    let catalog = InMemoryCatalog::new();
    let subjects = support::remote(&catalog).await;
    let cancel = CancellationToken::new();

    subjects.add(&cancel, "svc-a", None).await.unwrap();
    subjects.add(&cancel, "svc-b", None).await.unwrap();

    let (ids, result) = collect(&subjects, &Query::new(Expression::field("id").prefix("svc"))).await;
    result.unwrap();
    assert_eq!(ids, vec!["svc-a", "svc-b"]);
}
