use crate::keycodes::LogicalKey;
use crate::modifiers::ModifierMask;
use serde::Serialize;
use std::collections::VecDeque;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "lowercase")]
pub enum KeyEventKind {
    Press,
    Repeat,
    Release,
}

impl KeyEventKind {
    pub fn all() -> impl Iterator<Item = KeyEventKind> {
        KeyEventKind::iter()
    }
}

/// One event delivered to the application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyEvent {
    pub kind: KeyEventKind,
    pub key: LogicalKey,
    pub unichar: Option<char>,
    pub modifiers: ModifierMask,
    /// Seconds since the keyboard was created.
    pub timestamp: f64,
    /// False when the event must not reach the application's text input
    /// buffer (composed input, modifier keys).
    pub buffered: bool,
}

/// Destination of emitted key events.
///
/// Called with the keyboard lock held; implementations must not block.
pub trait EventSink: Send {
    /// Whether anyone listens for this kind of event.
    fn wants(&self, _kind: KeyEventKind) -> bool {
        true
    }

    /// Whether a free event slot is available right now.
    fn has_capacity(&self) -> bool;

    fn publish(&mut self, event: KeyEvent);
}

/// Bounded FIFO sink. Events arriving while full are dropped.
#[derive(Debug, Clone)]
pub struct QueueSink {
    capacity: usize,
    events: VecDeque<KeyEvent>,
}

impl QueueSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &KeyEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<KeyEvent> {
        self.events.drain(..).collect()
    }
}

impl Default for QueueSink {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl EventSink for QueueSink {
    fn has_capacity(&self) -> bool {
        self.events.len() < self.capacity
    }

    fn publish(&mut self, event: KeyEvent) {
        if self.has_capacity() {
            self.events.push_back(event);
        }
    }
}
