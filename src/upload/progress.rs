use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, ReadBuf};
use tokio::sync::mpsc;

/// A progress notification for an in-flight transfer.
///
/// Counts are cumulative, so notifications for one transfer are
/// monotonically non-decreasing and any dropped intermediate is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub transferred: u64,
    pub total: u64,
}

/// Wraps the file reader handed to the storage client and reports how many
/// bytes the client has consumed so far.
///
/// Notifications are sent with `try_send`; if the UI lags behind, the
/// oldest pending notification is simply dropped and the next cumulative
/// count supersedes it.
pub struct ProgressReader<R> {
    inner: R,
    transferred: u64,
    total: u64,
    events: mpsc::Sender<Progress>,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, total: u64, events: mpsc::Sender<Progress>) -> Self {
        Self {
            inner,
            transferred: 0,
            total,
            events,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let me = self.get_mut();
        let before = buf.filled().len();

        match Pin::new(&mut me.inner).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let read = buf.filled().len() - before;
                if read > 0 {
                    me.transferred += read as u64;
                    let _ = me.events.try_send(Progress {
                        transferred: me.transferred,
                        total: me.total,
                    });
                }
                Poll::Ready(Ok(()))
            }
            other => other,
        }
    }
}
