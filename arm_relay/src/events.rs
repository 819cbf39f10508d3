//! Diagnostic event reporting.
//!
//! The relay never logs directly from its handlers; it reports numbered events
//! through an [`EventSink`]. The production sink forwards to `tracing`, tests
//! record into memory, and [`FilteredEvents`] applies per-event binary filters
//! in front of either.

use core::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

/// Event identifiers reported by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u16)]
pub enum EventId {
    Reserved = 0,
    Startup = 1,
    CommandErr = 2,
    CommandNop = 3,
    CommandMode = 4,
    InvalidMsgId = 5,
    LenErr = 6,
    PipeErr = 7,
}

/// Number of event ids including `Reserved`.
pub const EVENT_ID_COUNT: usize = 8;

impl EventId {
    #[inline]
    pub const fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(Self::Reserved),
            1 => Some(Self::Startup),
            2 => Some(Self::CommandErr),
            3 => Some(Self::CommandNop),
            4 => Some(Self::CommandMode),
            5 => Some(Self::InvalidMsgId),
            6 => Some(Self::LenErr),
            7 => Some(Self::PipeErr),
            _ => None,
        }
    }
}

/// Severity of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventType {
    Debug,
    Information,
    Error,
}

/// Destination for diagnostic events. Fire-and-forget.
pub trait EventSink {
    fn send_event(&mut self, id: EventId, kind: EventType, args: fmt::Arguments<'_>);
}

// ─── Tracing Sink ───────────────────────────────────────────────────

/// Forwards events to `tracing`, tagged with the service name and event id.
#[derive(Debug, Clone)]
pub struct TracingEvents {
    app: String,
}

impl TracingEvents {
    pub fn new(app: impl Into<String>) -> Self {
        Self { app: app.into() }
    }

    /// Service name attached to every event.
    pub fn app(&self) -> &str {
        &self.app
    }
}

impl Default for TracingEvents {
    fn default() -> Self {
        Self::new("arm-relay")
    }
}

impl EventSink for TracingEvents {
    fn send_event(&mut self, id: EventId, kind: EventType, args: fmt::Arguments<'_>) {
        let event_id = id as u16;
        match kind {
            EventType::Debug => debug!(app = %self.app, event_id, "{args}"),
            EventType::Information => info!(app = %self.app, event_id, "{args}"),
            EventType::Error => error!(app = %self.app, event_id, "{args}"),
        }
    }
}

// ─── Recording Sink ─────────────────────────────────────────────────

/// A recorded event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub kind: EventType,
    pub text: String,
}

/// Keeps every event in memory. Used by tests and benchmarks.
#[derive(Debug, Default, Clone)]
pub struct RecordingEvents {
    pub events: Vec<Event>,
}

impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded events with the given id.
    pub fn count(&self, id: EventId) -> usize {
        self.events.iter().filter(|e| e.id == id).count()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingEvents {
    fn send_event(&mut self, id: EventId, kind: EventType, args: fmt::Arguments<'_>) {
        self.events.push(Event {
            id,
            kind,
            text: args.to_string(),
        });
    }
}

// ─── Binary Filters ─────────────────────────────────────────────────

/// Per-event binary filter.
///
/// An event passes when `count & mask == 0`. The count advances on every
/// attempt and stops at `u16::MAX`, after which the filter state is frozen.
/// Mask `0x0000` passes everything, `0xFFFF` passes only the first occurrence,
/// `0x0001` passes every other one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinaryFilter {
    pub mask: u16,
    count: u16,
}

impl BinaryFilter {
    pub const fn new(mask: u16) -> Self {
        Self { mask, count: 0 }
    }

    /// Decide whether the next occurrence passes, and advance the count.
    #[inline]
    pub fn admit(&mut self) -> bool {
        let pass = self.count & self.mask == 0;
        self.count = self.count.saturating_add(1);
        pass
    }

    #[inline]
    pub const fn count(&self) -> u16 {
        self.count
    }
}

/// Applies a [`BinaryFilter`] per event id before delegating to `inner`.
#[derive(Debug, Clone)]
pub struct FilteredEvents<E> {
    inner: E,
    filters: [BinaryFilter; EVENT_ID_COUNT],
}

impl<E: EventSink> FilteredEvents<E> {
    /// Wrap `inner` with all masks at zero.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            filters: [BinaryFilter::default(); EVENT_ID_COUNT],
        }
    }

    /// Install a mask for one event id.
    pub fn with_mask(mut self, id: EventId, mask: u16) -> Self {
        self.filters[id as usize] = BinaryFilter::new(mask);
        self
    }

    pub fn filter(&self, id: EventId) -> &BinaryFilter {
        &self.filters[id as usize]
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: EventSink> EventSink for FilteredEvents<E> {
    fn send_event(&mut self, id: EventId, kind: EventType, args: fmt::Arguments<'_>) {
        if self.filters[id as usize].admit() {
            self.inner.send_event(id, kind, args);
        }
    }
}
