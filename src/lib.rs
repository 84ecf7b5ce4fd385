mod error;
mod in_memory;
mod remote;
mod subject;
mod subjects;

pub mod config;
pub mod feed;
pub mod grpc;
pub mod query;

pub use config::ClientConfig;
pub use error::{BoxError, CatalogError};
pub use feed::{feed, Handler};
pub use in_memory::InMemoryCatalog;
pub use query::{BinaryOp, Expression, Query};
pub use remote::RemoteSubjects;
pub use subject::{Hints, Information, Subject};
pub use subjects::{validate_id, Subjects};
