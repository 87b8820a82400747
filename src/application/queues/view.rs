//! One admin session's live view over a set of moderation queues.
//!
//! A view owns a single broker subscription plus every connection
//! window the session has open, and pumps deliveries through the
//! reconciler. A degraded subscription forces a full resync of every
//! open connection, since incremental deltas can no longer be trusted.

use std::collections::HashMap;

use crate::application::queues::connection::QueueConnection;
use crate::application::queues::paginator::Paginator;
use crate::application::queues::reconciler;
use crate::domain::comment::errors::MutationError;
use crate::domain::events::EventKind;
use crate::domain::queue::QueueKey;
use crate::infrastructure::broker::{SubscriptionHandle, SubscriptionMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewUpdate {
    /// An event was applied to the open connections.
    Applied(EventKind),
    /// The subscription degraded; all connections were refetched.
    Resynced,
    /// The subscription ended.
    Closed,
}

pub struct QueueView {
    paginator: Paginator,
    subscription: SubscriptionHandle,
    connections: HashMap<QueueKey, QueueConnection>,
    page_limit: Option<i64>,
}

impl QueueView {
    pub fn new(paginator: Paginator, subscription: SubscriptionHandle) -> Self {
        QueueView {
            paginator,
            subscription,
            connections: HashMap::new(),
            page_limit: None,
        }
    }

    pub fn with_page_limit(mut self, limit: i64) -> Self {
        self.page_limit = Some(limit);
        self
    }

    /// Open a connection for `key` and load its first page.
    pub async fn open(&mut self, key: QueueKey) -> Result<usize, MutationError> {
        let mut conn = QueueConnection::new(key.clone());
        self.paginator.load_first(&mut conn, self.page_limit).await?;
        let loaded = conn.len();
        self.connections.insert(key, conn);
        Ok(loaded)
    }

    pub fn connection(&self, key: &QueueKey) -> Option<&QueueConnection> {
        self.connections.get(key)
    }

    pub fn connection_mut(&mut self, key: &QueueKey) -> Option<&mut QueueConnection> {
        self.connections.get_mut(key)
    }

    pub async fn load_more(
        &mut self,
        key: &QueueKey,
    ) -> Result<Option<crate::application::queues::paginator::LoadOutcome>, MutationError> {
        let Some(conn) = self.connections.get_mut(key) else {
            return Ok(None);
        };
        Ok(Some(self.paginator.load_more(conn, self.page_limit).await?))
    }

    /// Wait for the next delivery and merge it into every open window.
    pub async fn pump(&mut self) -> Result<ViewUpdate, MutationError> {
        match self.subscription.next().await {
            None => Ok(ViewUpdate::Closed),
            Some(SubscriptionMessage::Degraded { missed }) => {
                tracing::warn!(missed, "queue view degraded, resyncing all connections");
                self.resync().await?;
                Ok(ViewUpdate::Resynced)
            }
            Some(SubscriptionMessage::Event(event)) => {
                for conn in self.connections.values_mut() {
                    reconciler::apply(conn, &event);
                }
                Ok(ViewUpdate::Applied(event.kind))
            }
        }
    }

    /// Apply everything already buffered without blocking. Returns the
    /// updates performed, resyncing at most once if degraded.
    pub async fn drain(&mut self) -> Result<Vec<ViewUpdate>, MutationError> {
        let mut updates = Vec::new();
        let mut degraded = false;
        while let Some(message) = self.subscription.try_next() {
            match message {
                SubscriptionMessage::Degraded { .. } => degraded = true,
                SubscriptionMessage::Event(event) => {
                    for conn in self.connections.values_mut() {
                        reconciler::apply(conn, &event);
                    }
                    updates.push(ViewUpdate::Applied(event.kind));
                }
            }
        }
        if degraded {
            self.resync().await?;
            updates.push(ViewUpdate::Resynced);
        }
        Ok(updates)
    }

    /// Rebuild every open connection from the authoritative store.
    pub async fn resync(&mut self) -> Result<(), MutationError> {
        for conn in self.connections.values_mut() {
            self.paginator.refetch(conn, self.page_limit).await?;
        }
        Ok(())
    }

    pub fn close(&mut self) {
        self.subscription.close();
    }
}
