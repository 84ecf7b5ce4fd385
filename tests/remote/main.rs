//! Remote catalog integration tests.
//!
//! Each test starts a tonic server on an ephemeral port and talks to it
//! through `RemoteSubjects`.

mod add;
mod search;
