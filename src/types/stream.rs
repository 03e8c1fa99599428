//! Byte streams used as the carrier for streaming bodies.
//!
//! # Types
//!
//! - **ByteStream**: a boxed `Stream` of `Result<Bytes>` chunks with an async
//!   `read()` method
//! - **StreamWriter**: the producer half returned by [`ByteStream::channel`]
//!
//! # Examples
//!
//! ```
//! use fetch_model::ByteStream;
//!
//! # tokio_test::block_on(async {
//! let (writer, mut stream) = ByteStream::channel(4);
//! writer.write("hello ").await.unwrap();
//! writer.write("world").await.unwrap();
//! writer.close();
//!
//! assert_eq!(stream.read_to_end().await.unwrap(), "hello world");
//! # });
//! ```

use crate::error::{FetchError, Result};
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

type BoxByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// An asynchronous sequence of byte chunks.
///
/// Implements [`Stream`], so it composes with `StreamExt` combinators, and
/// offers [`read`](Self::read) for pull-style consumption.
pub struct ByteStream {
    inner: BoxByteStream,
}

impl ByteStream {
    /// Create a bounded channel: chunks written to the [`StreamWriter`] are
    /// yielded by the returned stream, which ends when the writer is closed
    /// or dropped.
    pub fn channel(capacity: usize) -> (StreamWriter, ByteStream) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let stream = ByteStream::from_stream(ReceiverStream::new(rx));
        (StreamWriter { tx }, stream)
    }

    /// A stream that yields `bytes` once and then ends.
    pub fn once(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        ByteStream::from_stream(futures::stream::iter(std::iter::once(Ok(bytes))))
    }

    /// A stream that ends immediately.
    pub fn empty() -> Self {
        ByteStream::from_stream(futures::stream::empty())
    }

    /// Wrap any `Send` stream of byte chunks.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        ByteStream {
            inner: Box::pin(stream),
        }
    }

    /// Wait for the next chunk.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(chunk))` - a chunk arrived
    /// - `Ok(None)` - the stream has ended
    /// - `Err(_)` - the producer reported an error
    pub async fn read(&mut self) -> Result<Option<Bytes>> {
        self.inner.next().await.transpose()
    }

    /// Drain the stream and concatenate every chunk.
    pub async fn read_to_end(&mut self) -> Result<Bytes> {
        let mut buffer = BytesMut::new();
        while let Some(chunk) = self.read().await? {
            buffer.extend_from_slice(&chunk);
        }
        Ok(buffer.freeze())
    }

    /// Split into two independent streams that each yield every chunk.
    ///
    /// Chunks pulled by one branch are buffered for the other until it reads
    /// them. Dropping a branch stops buffering for it.
    pub fn tee(self) -> (ByteStream, ByteStream) {
        let shared = Arc::new(Mutex::new(TeeShared {
            source: self,
            buffers: [VecDeque::new(), VecDeque::new()],
            wakers: [None, None],
            alive: [true, true],
            done: false,
        }));

        let left = TeeBranch {
            shared: Arc::clone(&shared),
            index: 0,
        };
        let right = TeeBranch { shared, index: 1 };

        (ByteStream::from_stream(left), ByteStream::from_stream(right))
    }
}

impl Stream for ByteStream {
    type Item = Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ByteStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ByteStream { .. }")
    }
}

/// Producer half of a [`ByteStream::channel`].
#[derive(Debug, Clone)]
pub struct StreamWriter {
    tx: mpsc::Sender<Result<Bytes>>,
}

impl StreamWriter {
    /// Send a chunk, waiting for capacity.
    ///
    /// # Errors
    ///
    /// [`FetchError::StreamClosed`] when the reading side was dropped.
    pub async fn write(&self, chunk: impl Into<Bytes>) -> Result<()> {
        self.tx
            .send(Ok(chunk.into()))
            .await
            .map_err(|_| FetchError::StreamClosed)
    }

    /// Deliver an error to the reader; the stream stays open.
    pub async fn abort(&self, reason: impl Into<String>) -> Result<()> {
        self.tx
            .send(Err(FetchError::Stream(reason.into())))
            .await
            .map_err(|_| FetchError::StreamClosed)
    }

    /// Close this writer. The stream ends once every clone is closed or dropped.
    pub fn close(self) {
        drop(self);
    }
}

type TeeItem = std::result::Result<Bytes, String>;

struct TeeShared {
    source: ByteStream,
    buffers: [VecDeque<TeeItem>; 2],
    wakers: [Option<Waker>; 2],
    alive: [bool; 2],
    done: bool,
}

impl TeeShared {
    fn wake(&mut self, index: usize) {
        if let Some(waker) = self.wakers[index].take() {
            waker.wake();
        }
    }
}

struct TeeBranch {
    shared: Arc<Mutex<TeeShared>>,
    index: usize,
}

impl Stream for TeeBranch {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let index = self.index;
        let other = 1 - index;
        let mut guard = self.shared.lock();
        let state = &mut *guard;

        if let Some(item) = state.buffers[index].pop_front() {
            return Poll::Ready(Some(item.map_err(FetchError::Stream)));
        }
        if state.done {
            return Poll::Ready(None);
        }

        match state.source.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(item)) => {
                let item: TeeItem = item.map_err(|e| e.to_string());
                if state.alive[other] {
                    state.buffers[other].push_back(item.clone());
                    state.wake(other);
                }
                Poll::Ready(Some(item.map_err(FetchError::Stream)))
            }
            Poll::Ready(None) => {
                state.done = true;
                state.wake(other);
                Poll::Ready(None)
            }
            Poll::Pending => {
                state.wakers[index] = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

impl Drop for TeeBranch {
    fn drop(&mut self) {
        let mut state = self.shared.lock();
        state.alive[self.index] = false;
        state.buffers[self.index].clear();
        state.wake(1 - self.index);
    }
}
