//! Error types for catalog operations.

use std::error::Error;
use std::fmt;

/// Boxed error returned by per-record search handlers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Error type for every catalog operation.
///
/// Callers pick a retry policy by inspecting the variant: transport failures
/// may be worth retrying, validation failures never are, and `Cancelled`
/// means the caller abandoned the call rather than the call failing.
#[derive(Debug)]
pub enum CatalogError {
    /// RPC-level failure (unreachable, deadline, stream broken mid-flight).
    Transport(tonic::Status),
    /// Subject id rejected before any RPC was attempted.
    InvalidId(String),
    /// Query rejected before any RPC was attempted.
    InvalidQuery(String),
    /// A per-record search handler returned an error.
    Handler(BoxError),
    /// The call was cancelled by the caller.
    Cancelled,
    /// The service sent something that could not be interpreted.
    Decode(String),
    /// Client configuration could not be loaded or applied.
    Config(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Transport(status) => {
                write!(f, "transport error: {}: {}", status.code(), status.message())
            }
            CatalogError::InvalidId(msg) => write!(f, "invalid subject id: {}", msg),
            CatalogError::InvalidQuery(msg) => write!(f, "invalid query: {}", msg),
            CatalogError::Handler(e) => write!(f, "handler error: {}", e),
            CatalogError::Cancelled => write!(f, "operation cancelled"),
            CatalogError::Decode(msg) => write!(f, "decode failed: {}", msg),
            CatalogError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CatalogError::Transport(status) => Some(status),
            CatalogError::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<tonic::Status> for CatalogError {
    fn from(status: tonic::Status) -> Self {
        CatalogError::Transport(status)
    }
}

impl From<tonic::transport::Error> for CatalogError {
    fn from(err: tonic::transport::Error) -> Self {
        CatalogError::Transport(tonic::Status::unavailable(err.to_string()))
    }
}

/// Server-side mapping, used when a catalog is served over gRPC.
impl From<CatalogError> for tonic::Status {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Transport(status) => status,
            CatalogError::InvalidId(msg) | CatalogError::InvalidQuery(msg) => {
                tonic::Status::invalid_argument(msg)
            }
            CatalogError::Cancelled => tonic::Status::cancelled("operation cancelled"),
            other => tonic::Status::internal(other.to_string()),
        }
    }
}

impl CatalogError {
    /// True if the caller abandoned the operation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, CatalogError::Cancelled)
    }

    /// True for connection / RPC failures.
    pub fn is_transport(&self) -> bool {
        matches!(self, CatalogError::Transport(_))
    }

    /// True if the request was rejected locally and never sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            CatalogError::InvalidId(_) | CatalogError::InvalidQuery(_)
        )
    }

    /// The gRPC status behind a transport error.
    pub fn status(&self) -> Option<&tonic::Status> {
        match self {
            CatalogError::Transport(status) => Some(status),
            _ => None,
        }
    }
}
