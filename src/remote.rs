//! Remote catalog client. Forwards `Subjects` calls over gRPC.
//!
//! `RemoteSubjects` is the only component that issues RPCs. It wraps a
//! shared tonic `Channel` that it neither owns nor closes; every call clones
//! the generated client (cheap) and opens its own RPC, so one instance can be
//! used from many tasks at once.
//!
//! ## Search lifecycle
//!
//! ```text
//! Idle ──▶ Opening ──▶ Streaming ──▶ Completed
//!             │            ├───────▶ Failed     (transport or handler error)
//!             │            └───────▶ Cancelled
//!             └──────────────────▶ Failed / Cancelled
//! ```
//!
//! The response stream is dropped exactly once on every terminal path, which
//! cancels the RPC if it is still running.
//!
//! ## Example
//!
//! ```ignore
//! use subject_catalog::{ClientConfig, Expression, Query, RemoteSubjects, Subjects};
//! use tokio_util::sync::CancellationToken;
//!
//! let subjects = RemoteSubjects::connect(&ClientConfig::new("http://[::1]:50051")).await?;
//! let cancel = CancellationToken::new();
//!
//! let (subject, created) = subjects.add(&cancel, "svc-a", None).await?;
//!
//! let query = Query::new(Expression::field("id").prefix("svc"));
//! subjects
//!     .search(&cancel, &query, &mut |s| {
//!         println!("{}", s.id);
//!         Ok(())
//!     })
//!     .await?;
//! ```

use std::time::Duration;

use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tonic::transport::Channel;
use tonic::Request;

use crate::config::{self, ClientConfig};
use crate::error::CatalogError;
use crate::feed::{feed, Handler};
use crate::grpc::{self, SubjectServiceClient};
use crate::query::Query;
use crate::subject::{Hints, Subject};
use crate::subjects::{validate_id, Subjects};

/// A `Subjects` implementation backed by a remote catalog service.
#[derive(Debug, Clone)]
pub struct RemoteSubjects {
    client: SubjectServiceClient<Channel>,
    request_timeout: Option<Duration>,
}

impl RemoteSubjects {
    /// Use an already established channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: SubjectServiceClient::new(channel),
            request_timeout: None,
        }
    }

    /// Connect to the endpoint named in `config`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, CatalogError> {
        let channel = config.endpoint()?.connect().await?;
        tracing::debug!(endpoint = %config.endpoint, "connected to catalog");
        Ok(Self::new(channel).with_optional_timeout(config.request_timeout()))
    }

    /// Like [`connect`](Self::connect), but defer connecting until the first
    /// call.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, CatalogError> {
        let channel = config.endpoint()?.connect_lazy();
        Ok(Self::new(channel).with_optional_timeout(config.request_timeout()))
    }

    /// A lazily-connecting client for the process-wide configuration, see
    /// [`config::global`].
    pub fn from_global() -> Result<Self, CatalogError> {
        Self::connect_lazy(config::global())
    }

    /// Attach a deadline to every call made through this client.
    pub fn with_request_timeout(self, timeout: Duration) -> Self {
        self.with_optional_timeout(Some(timeout))
    }

    fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn request<T>(&self, message: T) -> Request<T> {
        let mut request = Request::new(message);
        if let Some(timeout) = self.request_timeout {
            request.set_timeout(timeout);
        }
        request
    }
}

#[tonic::async_trait]
impl Subjects for RemoteSubjects {
    #[tracing::instrument(skip(self, cancel, handler))]
    async fn search(
        &self,
        cancel: &CancellationToken,
        query: &Query,
        handler: &mut Handler<'_, Subject>,
    ) -> Result<(), CatalogError> {
        query.validate()?;

        let request = self.request(grpc::SearchRequest {
            query: Some(query.to_wire()),
        });
        let mut client = self.client.clone();

        let stream = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            response = client.search(request) => response?.into_inner(),
        };
        tracing::debug!("search stream open");

        feed(
            cancel,
            stream.map(|item| item.map(Subject::from)),
            handler,
        )
        .await
    }

    #[tracing::instrument(skip(self, cancel))]
    async fn add(
        &self,
        cancel: &CancellationToken,
        id: &str,
        hints: Option<Hints>,
    ) -> Result<(Subject, bool), CatalogError> {
        validate_id(id)?;

        let request = self.request(grpc::AddRequest {
            id: id.to_string(),
            hints: hints.map(Into::into),
        });
        let mut client = self.client.clone();

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(CatalogError::Cancelled),
            response = client.add(request) => response?.into_inner(),
        };

        let subject = response
            .subject
            .ok_or_else(|| CatalogError::Decode("add response carries no subject".into()))?;
        tracing::debug!(created = response.created, "subject added");

        Ok((subject.into(), response.created))
    }
}
