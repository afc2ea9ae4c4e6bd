//! A live notification stream bound to one connection.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::{Context, Poll};

use futures::Stream;
use futures::stream::BoxStream;
use tokio_util::sync::CancellationToken;
use tracing::info;

use moaplay_core::types::UserId;

use crate::delivery::StreamFrame;

/// Decrements the open-stream count and cancels the loop when the
/// connection's stream is dropped.
struct StreamGuard {
    user_id: UserId,
    cancel: CancellationToken,
    open_streams: Arc<AtomicUsize>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.cancel.cancel();
        let remaining = self.open_streams.fetch_sub(1, Ordering::Relaxed) - 1;
        info!(user_id = %self.user_id, open_streams = remaining, "Notification stream closed");
    }
}

/// Frames for one connection. Dropping it closes the stream.
pub struct NotificationStream {
    inner: BoxStream<'static, StreamFrame>,
    _guard: StreamGuard,
}

impl std::fmt::Debug for NotificationStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationStream")
            .field("user_id", &self._guard.user_id)
            .finish_non_exhaustive()
    }
}

impl NotificationStream {
    pub(crate) fn new(
        user_id: UserId,
        inner: BoxStream<'static, StreamFrame>,
        cancel: CancellationToken,
        open_streams: Arc<AtomicUsize>,
    ) -> Self {
        let open = open_streams.fetch_add(1, Ordering::Relaxed) + 1;
        info!(user_id = %user_id, open_streams = open, "Notification stream opened");
        Self {
            inner,
            _guard: StreamGuard {
                user_id,
                cancel,
                open_streams,
            },
        }
    }
}

impl Stream for NotificationStream {
    type Item = StreamFrame;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}
