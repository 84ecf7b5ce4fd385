//! In-memory subject catalog for testing and single-process scenarios.
//!
//! `InMemoryCatalog` implements both sides of the contract:
//! - the gRPC `SubjectService`, so tests can stand up a real server that
//!   `RemoteSubjects` talks to;
//! - the local `Subjects` trait, evaluating queries in-process with the same
//!   [`Query::matches`] the server uses.
//!
//! Subjects are kept in insertion order, which is also search order.
//!
//! ## Example
//!
//! ```
//! use subject_catalog::{InMemoryCatalog, Subject};
//!
//! let catalog = InMemoryCatalog::new()
//!     .with_subject(Subject::new("app1"))
//!     .with_subject(Subject::new("app2"));
//!
//! let (existing, created) = catalog.insert("app1", None).unwrap();
//! assert!(!created);
//! assert_eq!(existing.id, "app1");
//! assert_eq!(catalog.len(), 2);
//! ```

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio_stream::Stream;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Response, Status};

use crate::error::CatalogError;
use crate::feed::{feed, Handler};
use crate::grpc::{self, SubjectService, SubjectServiceServer};
use crate::query::Query;
use crate::subject::{Hints, Subject};
use crate::subjects::{validate_id, Subjects};

/// Thread-safe, clonable in-memory catalog. Clones share the same subjects.
///
/// A poisoned lock is recovered rather than reported: subjects are only
/// pushed whole, so a panicking holder cannot leave a partial write behind.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    subjects: Arc<RwLock<Vec<Subject>>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a subject, including service-side metadata such as
    /// `information`. Ignored if the id is already present.
    pub fn with_subject(self, subject: Subject) -> Self {
        {
            let mut subjects = self.write();
            if !subjects.iter().any(|s| s.id == subject.id) {
                subjects.push(subject);
            }
        }
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Subject>> {
        self.subjects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Subject>> {
        self.subjects.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add `id` unless it exists. First writer wins: an existing subject is
    /// returned untouched and `hints` are dropped.
    pub fn insert(&self, id: &str, hints: Option<Hints>) -> Result<(Subject, bool), CatalogError> {
        validate_id(id)?;
        let mut subjects = self.write();

        if let Some(existing) = subjects.iter().find(|s| s.id == id) {
            return Ok((existing.clone(), false));
        }

        let subject = Subject {
            id: id.to_string(),
            information: None,
            hints,
        };
        subjects.push(subject.clone());
        Ok((subject, true))
    }

    /// Snapshot of the subjects matching `query`, in insertion order.
    pub fn find(&self, query: &Query) -> Vec<Subject> {
        self.read()
            .iter()
            .filter(|s| query.matches(s))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Subject> {
        self.read().iter().find(|s| s.id == id).cloned()
    }

    /// All subjects in insertion order.
    pub fn subjects(&self) -> Vec<Subject> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The gRPC service, for composing with other tonic routes.
    pub fn server(&self) -> SubjectServiceServer<Self> {
        SubjectServiceServer::new(self.clone())
    }

    /// Bind and serve the catalog at `addr`.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), tonic::transport::Error> {
        tracing::info!(%addr, "subject catalog listening");
        tonic::transport::Server::builder()
            .add_service(self.server())
            .serve(addr)
            .await
    }
}

// ---------------------------------------------------------------------------
// gRPC service
// ---------------------------------------------------------------------------

#[tonic::async_trait]
impl SubjectService for InMemoryCatalog {
    type SearchStream =
        Pin<Box<dyn Stream<Item = Result<grpc::Subject, Status>> + Send + 'static>>;

    async fn search(
        &self,
        request: Request<grpc::SearchRequest>,
    ) -> Result<Response<Self::SearchStream>, Status> {
        let query = match request.into_inner().query {
            Some(query) => Query::from_wire(query)?,
            None => Query::all(),
        };
        query.validate()?;

        let matches = self.find(&query);
        tracing::debug!(matches = matches.len(), "serving search");

        let stream = tokio_stream::iter(matches.into_iter().map(|s| Ok(grpc::Subject::from(s))));
        Ok(Response::new(Box::pin(stream)))
    }

    async fn add(
        &self,
        request: Request<grpc::AddRequest>,
    ) -> Result<Response<grpc::AddResponse>, Status> {
        let request = request.into_inner();
        let (subject, created) = self.insert(&request.id, request.hints.map(Into::into))?;

        Ok(Response::new(grpc::AddResponse {
            subject: Some(subject.into()),
            created,
        }))
    }
}

// ---------------------------------------------------------------------------
// Local Subjects
// ---------------------------------------------------------------------------

#[tonic::async_trait]
impl Subjects for InMemoryCatalog {
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &Query,
        handler: &mut Handler<'_, Subject>,
    ) -> Result<(), CatalogError> {
        query.validate()?;
        let matches = self.find(query);
        feed(
            cancel,
            tokio_stream::iter(matches.into_iter().map(Ok::<_, CatalogError>)),
            handler,
        )
        .await
    }

    async fn add(
        &self,
        cancel: &CancellationToken,
        id: &str,
        hints: Option<Hints>,
    ) -> Result<(Subject, bool), CatalogError> {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }
        self.insert(id, hints)
    }
}
