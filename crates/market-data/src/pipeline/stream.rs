use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::errors::MarketDataError;
use crate::models::CoinRecord;

/// How a bulk fetch ended.
///
/// The item type of [`PageStream`] carries no error; a consumer that wants
/// to know why the stream stopped calls [`PageStream::finish`].
#[derive(Debug, Default)]
pub struct FetchOutcome {
    /// Number of batches handed to the consumer
    pub pages: u32,
    /// The page ceiling stopped the fetch
    pub ceiling_reached: bool,
    /// The consumer went away before the producer finished
    pub abandoned: bool,
    /// The fetch error that terminated the stream, if any
    pub error: Option<MarketDataError>,
}

impl FetchOutcome {
    /// True when the fetch stopped because of an error.
    pub fn is_truncated(&self) -> bool {
        self.error.is_some()
    }

    /// True when every available page (or the ceiling) was delivered.
    pub fn is_complete(&self) -> bool {
        self.error.is_none() && !self.abandoned
    }
}

/// Lazy, finite, non-restartable stream of normalized pages.
///
/// Backed by a channel with room for one page, so the producer never runs
/// more than one page ahead of the consumer. Dropping the stream stops the
/// producer before its next request.
pub struct PageStream {
    rx: mpsc::Receiver<Vec<CoinRecord>>,
    task: Option<JoinHandle<FetchOutcome>>,
}

impl PageStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Vec<CoinRecord>>,
        task: JoinHandle<FetchOutcome>,
    ) -> Self {
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Next page, or `None` once the stream has closed.
    pub async fn next_page(&mut self) -> Option<Vec<CoinRecord>> {
        self.rx.recv().await
    }

    /// Stops the stream and waits for the producer to report its outcome.
    ///
    /// Pages still buffered are discarded. Calling this before the stream
    /// ended counts as abandonment.
    pub async fn finish(mut self) -> FetchOutcome {
        self.rx.close();
        let Some(task) = self.task.take() else {
            return FetchOutcome::default();
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(e) => FetchOutcome {
                error: Some(MarketDataError::Internal(format!(
                    "page producer failed: {}",
                    e
                ))),
                ..FetchOutcome::default()
            },
        }
    }

    /// Drains every remaining page into one vector, then finishes.
    pub async fn collect_all(mut self) -> (Vec<Vec<CoinRecord>>, FetchOutcome) {
        let mut pages = Vec::new();
        while let Some(page) = self.next_page().await {
            pages.push(page);
        }
        let outcome = self.finish().await;
        (pages, outcome)
    }
}

impl Stream for PageStream {
    type Item = Vec<CoinRecord>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
