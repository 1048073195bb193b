//! The event hub actor.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::attacks::AttackRecord;
use crate::observability::metrics;

/// Capacity of the shared broadcast queue.
pub const BROADCAST_QUEUE: usize = 256;

/// Capacity of each observer's delivery queue.
pub const OBSERVER_QUEUE: usize = 256;

/// A single audit/log frame as delivered to observers.
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// RFC 3339 timestamp.
    pub timestamp: String,
    pub level: EventLevel,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Intercept,
    Attack,
    Forward,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogEvent {
    pub fn new(
        kind: EventKind,
        level: EventLevel,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            kind,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true),
            level,
            message: message.into(),
            data,
        }
    }
}

enum Command {
    Register { id: Uuid, sender: mpsc::Sender<LogEvent> },
    Unregister(Uuid),
}

/// Handle to the dispatch loop. Cheap to clone; every component that
/// emits audit events holds one explicitly (no ambient global).
#[derive(Clone)]
pub struct EventHub {
    commands: mpsc::UnboundedSender<Command>,
    broadcast: mpsc::Sender<LogEvent>,
    observer_count: Arc<AtomicUsize>,
}

impl EventHub {
    /// Spawn the dispatch loop and return a handle to it.
    pub fn spawn() -> Self {
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (broadcast, broadcast_rx) = mpsc::channel(BROADCAST_QUEUE);
        let observer_count = Arc::new(AtomicUsize::new(0));

        tokio::spawn(dispatch_loop(
            command_rx,
            broadcast_rx,
            observer_count.clone(),
        ));

        Self {
            commands,
            broadcast,
            observer_count,
        }
    }

    /// Register an observer; the returned receiver is its delivery queue.
    /// The queue closes when the observer is unregistered or evicted.
    pub fn register(&self) -> (Uuid, mpsc::Receiver<LogEvent>) {
        let (sender, receiver) = mpsc::channel(OBSERVER_QUEUE);
        let id = Uuid::new_v4();
        let _ = self.commands.send(Command::Register { id, sender });
        (id, receiver)
    }

    /// Remove an observer. Safe to call more than once.
    pub fn unregister(&self, id: Uuid) {
        let _ = self.commands.send(Command::Unregister(id));
    }

    /// Fire-and-forget broadcast. Never blocks; drops the event with a
    /// warning when the queue is full.
    pub fn broadcast(&self, event: LogEvent) {
        if self.broadcast.try_send(event).is_err() {
            tracing::warn!("event hub broadcast queue full, dropping event");
        }
    }

    /// Convenience constructor + broadcast.
    pub fn emit(
        &self,
        kind: EventKind,
        level: EventLevel,
        message: impl Into<String>,
        data: Option<Value>,
    ) {
        self.broadcast(LogEvent::new(kind, level, message, data));
    }

    /// Broadcast an applied transformation as an attack frame.
    pub fn emit_attack(&self, record: &AttackRecord) {
        let data = serde_json::to_value(record).ok();
        self.emit(
            EventKind::Attack,
            EventLevel::Warn,
            format!("attack applied: {}", record.attack_type),
            data,
        );
    }

    /// Number of currently connected observers.
    pub fn observer_count(&self) -> usize {
        self.observer_count.load(Ordering::Relaxed)
    }
}

/// The single task that owns the observer set. Registration,
/// unregistration, and delivery all funnel through here, so the set
/// itself needs no lock.
async fn dispatch_loop(
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut broadcast: mpsc::Receiver<LogEvent>,
    observer_count: Arc<AtomicUsize>,
) {
    let mut observers: HashMap<Uuid, mpsc::Sender<LogEvent>> = HashMap::new();

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Register { id, sender }) => {
                    observers.insert(id, sender);
                    observer_count.store(observers.len(), Ordering::Relaxed);
                    metrics::set_observers(observers.len());
                    tracing::debug!(observer = %id, total = observers.len(), "observer connected");
                }
                Some(Command::Unregister(id)) => {
                    if observers.remove(&id).is_some() {
                        observer_count.store(observers.len(), Ordering::Relaxed);
                        metrics::set_observers(observers.len());
                        tracing::debug!(observer = %id, total = observers.len(), "observer disconnected");
                    }
                }
                None => break,
            },
            event = broadcast.recv() => match event {
                Some(event) => {
                    observers.retain(|id, sender| match sender.try_send(event.clone()) {
                        Ok(()) => true,
                        Err(TrySendError::Full(_)) => {
                            tracing::warn!(observer = %id, "observer queue full, evicting");
                            false
                        }
                        Err(TrySendError::Closed(_)) => false,
                    });
                    observer_count.store(observers.len(), Ordering::Relaxed);
                    metrics::set_observers(observers.len());
                }
                None => break,
            },
        }
    }
}
