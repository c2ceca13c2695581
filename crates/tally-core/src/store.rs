//! Read-only access to a state snapshot
//!
//! The engine never writes application state. A `StateStore` wraps one
//! snapshot together with the derivations every view needs (normalized
//! ledger, income entries) and a fingerprint that changes whenever the
//! snapshot does.

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::Result;
use crate::ledger::{fund_income, Ledger};
use crate::models::{AppState, Budget, IncomeEntry};

/// One snapshot of application state, normalized
#[derive(Debug, Clone)]
pub struct StateStore {
    state: AppState,
    ledger: Ledger,
    income: Vec<IncomeEntry>,
    fingerprint: String,
}

impl StateStore {
    /// Load a snapshot from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let store = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            entries = store.ledger.len(),
            budgets = store.state.budgets.len(),
            "Loaded state snapshot"
        );
        Ok(store)
    }

    /// Parse a snapshot from JSON text
    pub fn from_json(raw: &str) -> Result<Self> {
        let state: AppState = serde_json::from_str(raw)?;
        Self::from_state(state)
    }

    /// Wrap an in-memory snapshot
    pub fn from_state(state: AppState) -> Result<Self> {
        let fingerprint = fingerprint(&state)?;
        let ledger = Ledger::normalize(&state);
        let income = fund_income(&state);
        debug!(%fingerprint, "State snapshot normalized");
        Ok(Self {
            state,
            ledger,
            income,
            fingerprint,
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn income(&self) -> &[IncomeEntry] {
        &self.income
    }

    pub fn budgets(&self) -> &[Budget] {
        &self.state.budgets
    }

    /// Hex SHA-256 of the snapshot; equal snapshots share a fingerprint
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Content fingerprint of a snapshot
pub fn fingerprint(state: &AppState) -> Result<String> {
    let bytes = serde_json::to_vec(state)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
