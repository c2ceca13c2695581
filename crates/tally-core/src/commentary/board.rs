//! Per-panel commentary state
//!
//! Each panel owns a monotonically increasing sequence number. Starting a
//! request issues a [`Ticket`] with the next number; a response is applied
//! only if its ticket is still the latest issued for that panel. Completion
//! order is not guaranteed to match initiation order, so a slow response for
//! old inputs is dropped instead of overwriting a newer one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::period::Period;

use super::{AIClient, CommentaryBackend, CommentaryRequest, Panel};

/// What a panel currently shows in its commentary slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PanelCommentary {
    /// Never requested
    Idle,
    /// A request is in flight
    Pending,
    Ready { text: String },
    /// The backend failed; the panel's chart is unaffected
    Unavailable { reason: String },
    /// Nothing to comment on for this selection
    NoData,
}

impl PanelCommentary {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ready { text } => Some(text),
            _ => None,
        }
    }
}

/// Handle for one in-flight commentary request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    panel: Panel,
    period: Period,
    seq: u64,
}

impl Ticket {
    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Point-in-time view of one panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub panel: Panel,
    pub seq: u64,
    pub period: Option<Period>,
    pub commentary: PanelCommentary,
}

#[derive(Debug)]
struct Slot {
    latest: u64,
    period: Option<Period>,
    state: PanelCommentary,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            latest: 0,
            period: None,
            state: PanelCommentary::Idle,
        }
    }
}

/// Commentary for every panel, guarded by per-panel sequence numbers
#[derive(Debug, Default)]
pub struct CommentaryBoard {
    slots: Mutex<HashMap<Panel, Slot>>,
}

impl CommentaryBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Panel, Slot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Issue the next ticket for `panel`, superseding any in-flight request
    pub fn begin(&self, panel: Panel, period: Period) -> Ticket {
        let mut slots = self.lock();
        let slot = slots.entry(panel).or_default();
        slot.latest += 1;
        slot.period = Some(period);
        slot.state = PanelCommentary::Pending;
        Ticket {
            panel,
            period,
            seq: slot.latest,
        }
    }

    /// Apply a response if `ticket` is still the latest for its panel
    ///
    /// Returns false when the response was stale and discarded.
    pub fn complete(&self, ticket: Ticket, result: Result<String>) -> bool {
        let mut slots = self.lock();
        let slot = slots.entry(ticket.panel).or_default();

        if ticket.seq != slot.latest {
            debug!(
                panel = %ticket.panel,
                seq = ticket.seq,
                latest = slot.latest,
                "Discarding stale commentary"
            );
            return false;
        }

        slot.state = match result {
            Ok(text) => PanelCommentary::Ready { text },
            Err(e) => {
                warn!(panel = %ticket.panel, period = %ticket.period, error = %e, "Commentary unavailable");
                PanelCommentary::Unavailable {
                    reason: e.to_string(),
                }
            }
        };
        true
    }

    /// Mark a panel as having nothing to comment on
    ///
    /// Counts as a new request, so anything still in flight becomes stale.
    pub fn clear(&self, panel: Panel, period: Period) -> Ticket {
        let mut slots = self.lock();
        let slot = slots.entry(panel).or_default();
        slot.latest += 1;
        slot.period = Some(period);
        slot.state = PanelCommentary::NoData;
        Ticket {
            panel,
            period,
            seq: slot.latest,
        }
    }

    pub fn get(&self, panel: Panel) -> PanelCommentary {
        self.lock()
            .get(&panel)
            .map(|s| s.state.clone())
            .unwrap_or(PanelCommentary::Idle)
    }

    /// Latest sequence number issued for `panel` (0 if never requested)
    pub fn latest_seq(&self, panel: Panel) -> u64 {
        self.lock().get(&panel).map(|s| s.latest).unwrap_or(0)
    }

    /// Every panel in display order
    pub fn snapshot(&self) -> Vec<PanelSnapshot> {
        let slots = self.lock();
        Panel::all()
            .iter()
            .map(|panel| match slots.get(panel) {
                Some(slot) => PanelSnapshot {
                    panel: *panel,
                    seq: slot.latest,
                    period: slot.period,
                    commentary: slot.state.clone(),
                },
                None => PanelSnapshot {
                    panel: *panel,
                    seq: 0,
                    period: None,
                    commentary: PanelCommentary::Idle,
                },
            })
            .collect()
    }

    /// Run one round trip for `request` and return the panel's state afterwards
    ///
    /// If a newer request for the same panel started meanwhile, this response
    /// is dropped and the returned state reflects the newer request.
    pub async fn request<B>(&self, backend: &B, request: &CommentaryRequest) -> PanelCommentary
    where
        B: CommentaryBackend + ?Sized,
    {
        let ticket = self.begin(request.panel, request.period);
        let result = backend.generate(request).await;
        self.complete(ticket, result);
        self.get(request.panel)
    }

    /// Fire commentary requests for every panel of `dashboard` concurrently
    ///
    /// Tickets are issued before any task is spawned, so the sequence order
    /// always matches call order. Panels with nothing to say are marked
    /// [`PanelCommentary::NoData`] immediately.
    pub fn refresh_all(
        self: &Arc<Self>,
        client: &AIClient,
        dashboard: &Dashboard,
    ) -> Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::new();

        for panel in Panel::all() {
            let Some(request) = CommentaryRequest::for_panel(dashboard, *panel)? else {
                self.clear(*panel, dashboard.period);
                continue;
            };

            let ticket = self.begin(request.panel, request.period);
            let board = Arc::clone(self);
            let client = client.clone();
            handles.push(tokio::spawn(async move {
                let result = client.generate(&request).await;
                board.complete(ticket, result);
            }));
        }

        debug!(period = %dashboard.period, spawned = handles.len(), "Commentary refresh started");
        Ok(handles)
    }
}
