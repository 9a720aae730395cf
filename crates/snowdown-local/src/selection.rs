//! Which event's description is currently on screen.
//!
//! Every selection gets a ticket with a fresh sequence number. A resolution
//! result is written back only if its ticket is still the latest one, so a
//! slow lookup for a previous selection can never overwrite the current one.

use crate::resolve::DescriptionResolver;
use serde::Serialize;
use snowdown_core::Event;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    seq: u64,
    event_id: Option<String>,
}

impl Ticket {
    pub fn event_id(&self) -> Option<&str> {
        self.event_id.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ViewState {
    pub event_id: Option<String>,
    pub description: Option<String>,
    pub loading: bool,
}

#[derive(Debug, Default)]
struct Inner {
    seq: u64,
    state: ViewState,
}

#[derive(Debug, Default)]
pub struct DescriptionView {
    inner: Mutex<Inner>,
}

impl DescriptionView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the view to `event` (or to nothing) and invalidate older tickets.
    pub fn select(&self, event: Option<&Event>) -> Ticket {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.seq += 1;
        let event_id = event.map(|e| e.id.clone());
        g.state = ViewState {
            event_id: event_id.clone(),
            description: None,
            loading: event.is_some(),
        };
        Ticket {
            seq: g.seq,
            event_id,
        }
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        g.seq == ticket.seq
    }

    /// Apply a finished lookup. Returns `false` (and changes nothing) when the
    /// ticket has been superseded.
    pub fn complete(&self, ticket: &Ticket, description: Option<String>) -> bool {
        let mut g = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if g.seq != ticket.seq {
            tracing::debug!(
                stale = ticket.seq,
                current = g.seq,
                "dropping superseded description result"
            );
            return false;
        }
        g.state.description = description;
        g.state.loading = false;
        true
    }

    pub fn snapshot(&self) -> ViewState {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .state
            .clone()
    }

    /// Select `event`, resolve its description, and apply the result if the
    /// selection has not moved on in the meantime.
    pub async fn load(&self, resolver: &DescriptionResolver, event: &Event) -> bool {
        let ticket = self.select(Some(event));
        let desc = resolver.resolve_event(event).await;
        self.complete(&ticket, desc)
    }
}
