//! Update Dispatcher - Per-Chat Sequential Processing
//!
//! The `ScreenManager` routes single events but does not order them. The
//! dispatcher gives each chat its own worker task fed by a bounded channel:
//!
//! ```text
//!   dispatch(event) ──► DashMap<ChatId, ChatWorker>
//!                            │
//!          ┌─────────────────┼─────────────────┐
//!          │                 │                 │
//!      chat 1 worker     chat 2 worker     chat 3 worker
//!      (mpsc queue)      (mpsc queue)      (mpsc queue)
//!          │                 │                 │
//!          └─────────────────┴─────────────────┘
//!                            │
//!                    ScreenManager::handle_event
//! ```
//!
//! Events of one chat are handled strictly in arrival order; different chats
//! run in parallel. A full queue applies backpressure to `dispatch`.
//!
//! # Shutdown
//!
//! `shutdown` closes every queue and waits for the workers to drain what was
//! already accepted. Cancelling the `CancellationToken` stops workers after
//! their current event and drops anything still queued.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::delivery::DeliveryClient;
use crate::error::EngineError;
use crate::events::InboundEvent;
use crate::ids::ChatId;
use crate::manager::ScreenManager;

/// Worker bookkeeping for one chat
struct ChatWorker {
    /// Queue into the worker
    sender: mpsc::Sender<InboundEvent>,
    /// Worker task
    handle: JoinHandle<()>,
    /// When the worker was spawned
    started_at: Instant,
}

/// Snapshot of one chat worker
#[derive(Clone, Copy, Debug)]
pub struct WorkerStats {
    /// Chat served by the worker
    pub chat_id: ChatId,
    /// Events waiting in the queue
    pub queued: usize,
    /// Seconds since the worker was spawned
    pub uptime_secs: u64,
}

/// Serializes events per chat in front of a `ScreenManager`
pub struct UpdateDispatcher<D: DeliveryClient + 'static> {
    /// Shared router
    manager: Arc<ScreenManager<D>>,
    /// Live workers by chat
    workers: DashMap<ChatId, ChatWorker>,
    /// Per-chat queue capacity
    capacity: usize,
    /// Hard-stop signal for every worker
    cancel: CancellationToken,
}

impl<D: DeliveryClient + 'static> UpdateDispatcher<D> {
    /// Create a dispatcher using the manager's configured queue capacity
    pub fn new(manager: Arc<ScreenManager<D>>) -> Self {
        let capacity = manager.config().chat_queue_capacity.max(1);
        Self::with_cancellation(manager, capacity, CancellationToken::new())
    }

    /// Create a dispatcher bound to an external cancellation token
    pub fn with_cancellation(
        manager: Arc<ScreenManager<D>>,
        capacity: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            manager,
            workers: DashMap::new(),
            capacity: capacity.max(1),
            cancel,
        }
    }

    /// The manager events are routed to
    pub fn manager(&self) -> &Arc<ScreenManager<D>> {
        &self.manager
    }

    /// Token that hard-stops every worker when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Queue an event on its chat's worker, spawning the worker on first use
    ///
    /// Waits while the chat's queue is full.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::ShuttingDown);
        }

        let chat_id = event.chat_id();
        let sender = self
            .workers
            .entry(chat_id)
            .or_insert_with(|| self.spawn_worker(chat_id))
            .sender
            .clone();

        if let Err(mpsc::error::SendError(event)) = sender.send(event).await {
            // Worker exited (cancelled or panicked); replace it once
            tracing::warn!(chat_id = %chat_id, "Chat worker gone, respawning");
            if self.cancel.is_cancelled() {
                return Err(EngineError::ShuttingDown);
            }
            let worker = self.spawn_worker(chat_id);
            let sender = worker.sender.clone();
            self.workers.insert(chat_id, worker);
            sender
                .send(event)
                .await
                .map_err(|_| EngineError::ShuttingDown)?;
        }
        Ok(())
    }

    /// Called while the chat's map shard is locked; must not touch `workers`
    fn spawn_worker(&self, chat_id: ChatId) -> ChatWorker {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let handle = tokio::spawn(
            run_chat(Arc::clone(&self.manager), receiver, self.cancel.clone())
                .instrument(tracing::info_span!("chat", %chat_id)),
        );
        tracing::debug!(chat_id = %chat_id, "Chat worker spawned");
        ChatWorker {
            sender,
            handle,
            started_at: Instant::now(),
        }
    }

    /// Close one chat's queue; its worker drains and exits
    ///
    /// Returns false if the chat had no worker.
    pub async fn close_chat(&self, chat_id: ChatId) -> bool {
        let Some((_, worker)) = self.workers.remove(&chat_id) else {
            return false;
        };
        drop(worker.sender);
        if let Err(e) = worker.handle.await {
            tracing::error!(chat_id = %chat_id, error = %e, "Chat worker failed");
        }
        true
    }

    /// Number of live chat workers
    pub fn active_chats(&self) -> usize {
        self.workers.len()
    }

    /// Per-worker statistics
    pub fn worker_stats(&self) -> Vec<WorkerStats> {
        self.workers
            .iter()
            .map(|entry| WorkerStats {
                chat_id: *entry.key(),
                queued: self.capacity - entry.value().sender.capacity(),
                uptime_secs: entry.value().started_at.elapsed().as_secs(),
            })
            .collect()
    }

    /// Close every queue and wait for the workers to drain
    pub async fn shutdown(&self) {
        tracing::info!(active_chats = self.workers.len(), "Dispatcher shutting down");

        let chat_ids: Vec<ChatId> = self.workers.iter().map(|entry| *entry.key()).collect();
        for chat_id in chat_ids {
            self.close_chat(chat_id).await;
        }

        tracing::info!("Dispatcher shutdown complete");
    }
}

/// Worker loop for one chat
async fn run_chat<D: DeliveryClient + 'static>(
    manager: Arc<ScreenManager<D>>,
    mut receiver: mpsc::Receiver<InboundEvent>,
    cancel: CancellationToken,
) {
    tracing::debug!("Chat worker started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(dropped = receiver.len(), "Chat worker cancelled");
                break;
            }
            event = receiver.recv() => match event {
                Some(event) => manager.handle_event(event).await,
                None => break,
            }
        }
    }
    tracing::debug!("Chat worker finished");
}
