use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    db::SummaryStore,
    error::{AppError, AppResult},
    models::ChatSummary,
};

/// Change signal shared between the summary writer and open feed
/// subscriptions
///
/// A bare version counter over a watch channel: writers bump it after every
/// successful upsert, subscriptions requery on each observed change. Rapid
/// consecutive writes coalesce into one wakeup, which is exactly the
/// snapshot guarantee the feed makes.
#[derive(Clone)]
pub struct FeedNotifier {
    tx: watch::Sender<u64>,
}

impl FeedNotifier {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// Wakes every open subscription
    pub fn notify(&self) {
        self.tx.send_modify(|version| *version += 1);
    }

    fn changes(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    /// Number of live subscription tasks listening on this notifier
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for FeedNotifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered, size-bounded view of which movies have the most recent chat
/// activity
pub struct RecentActivityFeed {
    store: Arc<dyn SummaryStore>,
    notifier: FeedNotifier,
}

impl RecentActivityFeed {
    pub fn new(store: Arc<dyn SummaryStore>, notifier: FeedNotifier) -> Self {
        Self { store, notifier }
    }

    /// Single point-in-time read of the top `top_n` summaries
    ///
    /// Sorted by `last_message_at` descending; an empty store yields an
    /// empty list, not an error.
    pub async fn fetch_once(&self, top_n: usize) -> AppResult<Vec<ChatSummary>> {
        validate_top_n(top_n)?;
        self.store.top_summaries(top_n).await
    }

    /// Opens a live subscription delivering ordered snapshots
    ///
    /// The first snapshot reflects current state; afterwards a snapshot is
    /// delivered whenever a summary write lands (coalesced under load). The
    /// subscription stays open until the returned handle is closed or
    /// dropped. A failed read is delivered as an `Err` item and ends the
    /// stream; retrying means subscribing again.
    pub fn subscribe(&self, top_n: usize) -> AppResult<FeedSubscription> {
        validate_top_n(top_n)?;

        let mut changes = self.notifier.changes();
        let store = self.store.clone();
        let (snapshot_tx, snapshot_rx) = mpsc::channel(8);
        let (close_tx, mut close_rx) = mpsc::channel::<()>(1);

        tokio::spawn(async move {
            loop {
                let snapshot = store.top_summaries(top_n).await;
                let errored = snapshot.is_err();

                // A send failure means the handle is gone; stop quietly.
                if snapshot_tx.send(snapshot).await.is_err() {
                    break;
                }
                if errored {
                    tracing::warn!("Feed snapshot read failed, closing subscription");
                    break;
                }

                tokio::select! {
                    _ = close_rx.recv() => break,
                    changed = changes.changed() => {
                        if changed.is_err() {
                            // Notifier dropped; nothing will ever change again.
                            break;
                        }
                    }
                }
            }
        });

        Ok(FeedSubscription {
            snapshots: snapshot_rx,
            close_tx,
        })
    }
}

fn validate_top_n(top_n: usize) -> AppResult<()> {
    if top_n == 0 {
        return Err(AppError::InvalidInput(
            "feed limit must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Caller-owned handle to an open feed subscription
///
/// Owning the handle is what keeps the subscription alive; close it (or
/// drop it) when the observing view goes away so the backing task is torn
/// down rather than accumulating.
pub struct FeedSubscription {
    snapshots: mpsc::Receiver<AppResult<Vec<ChatSummary>>>,
    close_tx: mpsc::Sender<()>,
}

impl FeedSubscription {
    /// Waits for the next snapshot
    ///
    /// `None` once the subscription has ended.
    pub async fn next_snapshot(&mut self) -> Option<AppResult<Vec<ChatSummary>>> {
        self.snapshots.recv().await
    }

    /// Closes the subscription; no further snapshots are delivered
    ///
    /// Dropping the handle without calling this tears the task down too
    /// (the close channel hangs up), so an abandoned handle never leaks a
    /// subscription.
    pub async fn close(self) {
        let _ = self.close_tx.send(()).await;
        // Dropping the receiver here also unblocks a task mid-send.
    }

    /// Consumes the handle into a stream of snapshots, for SSE responses
    ///
    /// Dropping the stream (client disconnect) tears the subscription down.
    pub fn into_stream(self) -> FeedSnapshotStream {
        FeedSnapshotStream {
            inner: ReceiverStream::new(self.snapshots),
            // Held so the backing task only stops when the stream drops.
            _close_tx: self.close_tx,
        }
    }
}

/// Snapshot stream backing an SSE response
pub struct FeedSnapshotStream {
    inner: ReceiverStream<AppResult<Vec<ChatSummary>>>,
    _close_tx: mpsc::Sender<()>,
}

impl tokio_stream::Stream for FeedSnapshotStream {
    type Item = AppResult<Vec<ChatSummary>>;

    fn poll_next(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        std::pin::Pin::new(&mut self.inner).poll_next(cx)
    }
}
