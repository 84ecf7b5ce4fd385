//! Wire contract for the subject catalog service.
//!
//! Uses tonic for the client/server stubs and prost for message
//! serialization (standard protobuf wire format, no `.proto` file).
//!
//! ## RPCs
//!
//! - `Search`: server-streaming. Input = `SearchRequest`, output = a stream
//!   of `Subject` messages ended by stream close (no end marker).
//! - `Add`: unary idempotent insert. Input = `AddRequest`, output =
//!   `AddResponse`.
//!
//! These are raw wire shapes. Callers work with the domain types in
//! [`crate::Subject`] and [`crate::query`], which convert to and from them.

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Same field layout as `google.protobuf.Duration`.
#[derive(Clone, Copy, PartialEq, prost::Message)]
pub struct Duration {
    #[prost(int64, tag = "1")]
    pub seconds: i64,
    #[prost(int32, tag = "2")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Hints {
    #[prost(message, optional, tag = "1")]
    pub trace_time: Option<Duration>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Information {
    #[prost(string, tag = "1")]
    pub name: String,
    #[prost(string, tag = "2")]
    pub package: String,
    #[prost(string, tag = "3")]
    pub activity: String,
    #[prost(int32, tag = "4")]
    pub version_code: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Subject {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub information: Option<Information>,
    #[prost(message, optional, tag = "3")]
    pub hints: Option<Hints>,
}

// ---------------------------------------------------------------------------
// Requests / responses
// ---------------------------------------------------------------------------

#[derive(Clone, PartialEq, prost::Message)]
pub struct AddRequest {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(message, optional, tag = "2")]
    pub hints: Option<Hints>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct AddResponse {
    #[prost(message, optional, tag = "1")]
    pub subject: Option<Subject>,
    #[prost(bool, tag = "2")]
    pub created: bool,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct SearchRequest {
    #[prost(message, optional, tag = "1")]
    pub query: Option<Query>,
}

// ---------------------------------------------------------------------------
// Query expressions
// ---------------------------------------------------------------------------

/// A filter over subjects. An absent expression matches everything.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Query {
    #[prost(message, optional, tag = "1")]
    pub expression: Option<Expression>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Expression {
    #[prost(
        oneof = "expression::Kind",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17"
    )]
    pub kind: Option<expression::Kind>,
}

pub mod expression {
    #[derive(Clone, PartialEq, prost::Oneof)]
    pub enum Kind {
        #[prost(bool, tag = "1")]
        Boolean(bool),
        #[prost(int64, tag = "2")]
        Int(i64),
        #[prost(string, tag = "3")]
        String(String),
        #[prost(string, tag = "4")]
        Field(String),
        #[prost(message, tag = "5")]
        Not(Box<super::Expression>),
        #[prost(message, tag = "6")]
        And(super::Binary),
        #[prost(message, tag = "7")]
        Or(super::Binary),
        #[prost(message, tag = "8")]
        Equal(super::Binary),
        #[prost(message, tag = "9")]
        NotEqual(super::Binary),
        #[prost(message, tag = "10")]
        Less(super::Binary),
        #[prost(message, tag = "11")]
        LessEqual(super::Binary),
        #[prost(message, tag = "12")]
        Greater(super::Binary),
        #[prost(message, tag = "13")]
        GreaterEqual(super::Binary),
        #[prost(message, tag = "14")]
        Contains(super::Binary),
        #[prost(message, tag = "15")]
        Prefix(super::Binary),
        #[prost(message, tag = "16")]
        Suffix(super::Binary),
        #[prost(message, tag = "17")]
        Glob(super::Binary),
    }
}

/// Operands of a two-sided expression.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Binary {
    #[prost(message, optional, boxed, tag = "1")]
    pub lhs: Option<Box<Expression>>,
    #[prost(message, optional, boxed, tag = "2")]
    pub rhs: Option<Box<Expression>>,
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(
    env!("OUT_DIR"),
    "/catalog.subject.SubjectService.rs"
));

pub use subject_service_client::SubjectServiceClient;
pub use subject_service_server::{SubjectService, SubjectServiceServer};
