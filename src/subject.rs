//! Catalog records.
//!
//! A `Subject` is a snapshot handed out by the catalog. The client never
//! mutates one in place; updates only arrive as new snapshots.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::grpc;

/// Optional metadata supplied when a subject is first added.
///
/// Only effective on creation. Hints sent with an `add` that finds an
/// existing subject are discarded by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hints {
    /// Trace time override, if non-zero.
    pub trace_time: Option<Duration>,
}

impl Hints {
    /// Hints carrying only a trace time override.
    pub fn trace_time(duration: Duration) -> Self {
        Self {
            trace_time: Some(duration),
        }
    }
}

/// Descriptive metadata the service attaches to a subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Information {
    pub name: String,
    pub package: String,
    pub activity: String,
    pub version_code: i32,
}

/// One catalog entry, identified by a caller-chosen id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub information: Option<Information>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<Hints>,
}

impl Subject {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_hints(mut self, hints: Hints) -> Self {
        self.hints = Some(hints);
        self
    }

    pub fn with_information(mut self, information: Information) -> Self {
        self.information = Some(information);
        self
    }
}

// ---------------------------------------------------------------------------
// Wire conversions
// ---------------------------------------------------------------------------

impl From<Duration> for grpc::Duration {
    fn from(d: Duration) -> Self {
        // Durations past i64::MAX seconds saturate.
        Self {
            seconds: i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            nanos: d.subsec_nanos() as i32,
        }
    }
}

impl From<grpc::Duration> for Duration {
    fn from(d: grpc::Duration) -> Self {
        // Negative durations have no meaning as a trace time; clamp to zero.
        let seconds = u64::try_from(d.seconds).unwrap_or(0);
        let nanos = u32::try_from(d.nanos).unwrap_or(0);
        Duration::new(seconds, nanos)
    }
}

impl From<Hints> for grpc::Hints {
    fn from(hints: Hints) -> Self {
        Self {
            trace_time: hints.trace_time.map(Into::into),
        }
    }
}

impl From<grpc::Hints> for Hints {
    fn from(hints: grpc::Hints) -> Self {
        Self {
            trace_time: hints.trace_time.map(Into::into),
        }
    }
}

impl From<Information> for grpc::Information {
    fn from(info: Information) -> Self {
        Self {
            name: info.name,
            package: info.package,
            activity: info.activity,
            version_code: info.version_code,
        }
    }
}

impl From<grpc::Information> for Information {
    fn from(info: grpc::Information) -> Self {
        Self {
            name: info.name,
            package: info.package,
            activity: info.activity,
            version_code: info.version_code,
        }
    }
}

impl From<Subject> for grpc::Subject {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.id,
            information: subject.information.map(Into::into),
            hints: subject.hints.map(Into::into),
        }
    }
}

impl From<grpc::Subject> for Subject {
    fn from(subject: grpc::Subject) -> Self {
        Self {
            id: subject.id,
            information: subject.information.map(Into::into),
            hints: subject.hints.map(Into::into),
        }
    }
}
