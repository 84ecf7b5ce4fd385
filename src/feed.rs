//! Event feed: drive a per-record handler from a stream of records.
//!
//! A producer is anything that yields `Result<T, E>` one item at a time, such
//! as a tonic `Streaming<T>` or the bounded [`channel`] below. [`feed`] pulls
//! one item, hands it to the handler, waits for the handler to return, and
//! only then pulls the next one.
//!
//! ```text
//!  producer ──next()──▶ feed ──handler(item)──▶ caller
//!      ▲                 │
//!      └─── one pull ◀───┘  (after the handler returns)
//! ```
//!
//! The producer is owned by `feed` and dropped before it returns, whatever
//! the outcome. For a gRPC stream that drop is what cancels the RPC.

use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use crate::error::{BoxError, CatalogError};

/// A per-record callback, as accepted by [`crate::Subjects::search`].
pub type Handler<'a, T> = dyn FnMut(T) -> Result<(), BoxError> + Send + 'a;

/// Feed every item from `producer` into `handler`, in order.
///
/// Returns `Ok(())` when the producer ends. Stops at the first failure:
/// - the handler's error, as [`CatalogError::Handler`];
/// - the producer's error, converted into a `CatalogError`;
/// - [`CatalogError::Cancelled`] once `cancel` fires. Cancellation is checked
///   before each pull and also interrupts a pull that is still waiting.
///
/// No item is pulled after a failure.
pub async fn feed<T, E, S, H>(
    cancel: &CancellationToken,
    producer: S,
    mut handler: H,
) -> Result<(), CatalogError>
where
    S: Stream<Item = Result<T, E>>,
    E: Into<CatalogError>,
    H: FnMut(T) -> Result<(), BoxError>,
{
    tokio::pin!(producer);
    let mut delivered: usize = 0;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::debug!(delivered, "feed cancelled");
                return Err(CatalogError::Cancelled);
            }
            next = producer.next() => next,
        };

        match next {
            Some(Ok(item)) => {
                if let Err(e) = handler(item) {
                    tracing::debug!(delivered, error = %e, "handler stopped feed");
                    return Err(CatalogError::Handler(e));
                }
                delivered += 1;
            }
            Some(Err(e)) => {
                let err = e.into();
                tracing::debug!(delivered, error = %err, "producer failed");
                return Err(err);
            }
            None => {
                tracing::debug!(delivered, "feed completed");
                return Ok(());
            }
        }
    }
}

/// Bounded handoff for producers running on another task or thread.
///
/// The sender side can be driven from async code (`send`) or from a plain
/// thread (`blocking_send`). With `capacity = 1` at most one item waits while
/// the handler runs.
///
/// # Panics
///
/// Panics if `capacity` is zero.
pub fn channel<T>(
    capacity: usize,
) -> (
    tokio::sync::mpsc::Sender<Result<T, CatalogError>>,
    ReceiverStream<Result<T, CatalogError>>,
) {
    let (tx, rx) = tokio::sync::mpsc::channel(capacity);
    (tx, ReceiverStream::new(rx))
}
