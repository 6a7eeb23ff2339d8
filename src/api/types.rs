//! Shared types and streaming infrastructure for the Streamly API bindings.

use bytes::Bytes;
use eyre::Context;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};
use tokio_stream::Stream;

/// An in-memory file destined for a multipart upload.
///
/// The upload endpoints (registration images, video publishing) take their
/// files as multipart parts with a file name and MIME type. Callers load
/// the file into memory first; the binary does this from disk, tests from
/// literal bytes.
#[derive(Debug, Clone)]
pub struct FilePart {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl FilePart {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Number of bytes in the file.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Converts into the multipart part reqwest sends.
    pub(crate) fn into_part(self) -> eyre::Result<reqwest::multipart::Part> {
        reqwest::multipart::Part::stream(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime_type)
            .context("set MIME type on multipart file part")
    }
}

type OneFuturePage<'a, F, T> =
    Pin<Box<dyn Future<Output = eyre::Result<(F, (VecDeque<T>, Option<u32>))>> + 'a + Send>>;

/// A paginated stream that automatically fetches subsequent pages from a
/// page-numbered list endpoint.
///
/// The backend paginates by page number: each response reports the current
/// page and the total page count, and the next page is requested as
/// `?page=N+1`. The fetcher passed to [`PagedStream::new`] receives the page
/// number to load (starting at 1) and returns that page's items together
/// with the number of the next page, or `None` when the final page has been
/// reached.
///
/// The stream yields items one by one, fetching the next page only when the
/// current batch is exhausted. Only forward pagination is supported.
pub struct PagedStream<'a, T, F> {
    /// Current batch of items from the most recent response
    current_items: VecDeque<T>,
    /// Future representing the currently pending page fetch, if any
    pending_request: Option<OneFuturePage<'a, F, T>>,
    /// Whether we've walked past the final page
    is_done: bool,
}

impl<'a, T, F> PagedStream<'a, T, F> {
    /// Create a new PagedStream starting from page 1.
    pub fn new<Fut>(fetcher: F) -> Self
    where
        F: Fn(u32) -> Fut,
        F: Send + 'a,
        Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
    {
        let first_page = async move {
            let results = fetcher(1).await?;
            Ok((fetcher, results))
        };
        Self {
            pending_request: Some(Box::pin(first_page)),
            current_items: VecDeque::new(),
            is_done: false,
        }
    }
}

impl<'a, T: Unpin, F> Unpin for PagedStream<'a, T, F> {}

impl<'a, T: Unpin, F, Fut> Stream for PagedStream<'a, T, F>
where
    F: Fn(u32) -> Fut,
    F: Send + 'a,
    Fut: Future<Output = eyre::Result<(VecDeque<T>, Option<u32>)>> + Send + 'a,
{
    type Item = eyre::Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        loop {
            // If we have items in the current batch, return the next one
            if let Some(item) = self.current_items.pop_front() {
                return Poll::Ready(Some(Ok(item)));
            }

            // If we're done (no more pages), return None
            if self.is_done {
                return Poll::Ready(None);
            }

            // If we have a pending request, poll it
            if let Some(pending) = self.pending_request.as_mut() {
                match pending.as_mut().poll(cx) {
                    Poll::Ready(Ok((fetcher, (items, next_page)))) => {
                        // We got the next page
                        self.current_items.extend(items);

                        if let Some(next_page) = next_page {
                            // Set up the future for the next page
                            // (but don't poll it yet)
                            self.pending_request = Some(Box::pin(async move {
                                let results = fetcher(next_page).await?;
                                Ok((fetcher, results))
                            }));
                        } else {
                            // The final page has been fetched
                            self.is_done = true;
                            self.pending_request = None;
                        }

                        // Continue the loop to try yielding an item
                        continue;
                    }
                    Poll::Ready(Err(e)) => {
                        // Error fetching next page
                        self.pending_request = None;
                        self.is_done = true;
                        return Poll::Ready(Some(Err(e)));
                    }
                    Poll::Pending => {
                        // Still waiting for the response
                        return Poll::Pending;
                    }
                }
            } else {
                // No pending request and no further page means we're done
                self.is_done = true;
                return Poll::Ready(None);
            }
        }
    }
}
