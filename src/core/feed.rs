//! Change feed - in-process broadcast of record changes, and the watcher that keeps a
//! live balance matrix up to date from it.
//!
//! Writers publish the [`ChangeEvent`]s returned by the write operations. The
//! [`LedgerWatcher`] folds each event into its own [`Snapshot`] and recomputes the whole
//! matrix. When it falls behind the channel it reloads the snapshot from the database
//! instead of guessing which events it missed.

use crate::{
    core::{
        ledger::BalanceMatrix,
        snapshot::{ChangeEvent, Snapshot, load_snapshot},
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    watch,
};
use tracing::{debug, error, info, trace, warn};

/// Default number of events buffered per subscriber.
pub const DEFAULT_FEED_CAPACITY: usize = 256;

/// Cloneable handle for publishing and subscribing to change events.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl ChangeFeed {
    /// Creates a feed buffering up to `capacity` events per subscriber (at least one).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Starts receiving every event published from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    /// Publishes one event, returning how many subscribers will see it.
    pub fn publish(&self, event: ChangeEvent) -> usize {
        let collection = event.collection();
        self.sender.send(event).unwrap_or_else(|_| {
            trace!(collection, "No subscribers for change event");
            0
        })
    }

    /// Publishes events in order, returning how many were published.
    pub fn publish_all<I>(&self, events: I) -> usize
    where
        I: IntoIterator<Item = ChangeEvent>,
    {
        let mut published = 0;
        for event in events {
            self.publish(event);
            published += 1;
        }
        published
    }
}

/// Subscriber that keeps a snapshot and its balance matrix current.
#[derive(Debug)]
pub struct LedgerWatcher {
    snapshot: Snapshot,
    receiver: broadcast::Receiver<ChangeEvent>,
    latest: watch::Sender<BalanceMatrix>,
}

impl LedgerWatcher {
    /// Creates a watcher starting from `snapshot`, listening on `receiver`.
    ///
    /// Subscribe before loading the snapshot so no event falls in between.
    #[must_use]
    pub fn new(snapshot: Snapshot, receiver: broadcast::Receiver<ChangeEvent>) -> Self {
        let (latest, _) = watch::channel(snapshot.balances());
        Self {
            snapshot,
            receiver,
            latest,
        }
    }

    /// Subscribes to the freshest balance matrix.
    #[must_use]
    pub fn balances_receiver(&self) -> watch::Receiver<BalanceMatrix> {
        self.latest.subscribe()
    }

    /// Current balance matrix.
    #[must_use]
    pub fn balances(&self) -> BalanceMatrix {
        self.latest.borrow().clone()
    }

    /// Current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Folds one event and recomputes.
    pub fn handle(&mut self, event: ChangeEvent) {
        trace!(collection = event.collection(), "Applying change event");
        self.snapshot.apply(event);
        self.recompute();
    }

    /// Replaces the snapshot with a fresh copy from the database and recomputes.
    pub async fn reload(&mut self, db: &DatabaseConnection) -> Result<()> {
        self.snapshot = load_snapshot(db).await?;
        self.recompute();
        Ok(())
    }

    fn recompute(&self) {
        let balances = self.snapshot.balances();
        debug!(entries = balances.len(), "Recomputed balances");
        let _previous = self.latest.send_replace(balances);
    }

    /// Waits for the next event and processes it.
    ///
    /// A failed reload after falling behind is logged and the old snapshot kept; later
    /// events still apply and the next lag retries the reload. Returns `Ok(false)` once
    /// every publisher is gone.
    pub async fn next(&mut self, db: &DatabaseConnection) -> Result<bool> {
        match self.receiver.recv().await {
            Ok(event) => {
                self.handle(event);
                Ok(true)
            }
            Err(RecvError::Lagged(missed)) => {
                warn!(missed, "Ledger watcher fell behind, reloading snapshot");
                if let Err(e) = self.reload(db).await {
                    error!("Failed to reload snapshot, keeping the previous one: {}", e);
                }
                Ok(true)
            }
            Err(RecvError::Closed) => Ok(false),
        }
    }

    /// Processes events until the feed closes.
    pub async fn run(mut self, db: DatabaseConnection) -> Result<()> {
        info!("Ledger watcher started");
        while self.next(&db).await? {}
        info!("Change feed closed, ledger watcher stopping");
        Ok(())
    }
}
