use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::MortgageResult;

/// Number of calculations retained unless a different limit is requested.
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    Amortization,
    ExtraPayments,
    Purchase,
    PreApproval,
    Refinance,
    RentVsBuy,
    Investment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub calculated_at: DateTime<Utc>,
    pub kind: CalculationKind,
    /// Inputs and headline results, as the caller chose to record them.
    pub summary: serde_json::Value,
}

/// Bounded, newest-first log of recent calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationHistory {
    limit: usize,
    entries: VecDeque<HistoryEntry>,
}

impl Default for CalculationHistory {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl CalculationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A limit of zero is raised to one.
    pub fn with_limit(limit: usize) -> Self {
        let limit = limit.max(1);
        CalculationHistory {
            limit,
            entries: VecDeque::with_capacity(limit),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a calculation made now, evicting the oldest entry when full.
    pub fn record(&mut self, kind: CalculationKind, summary: serde_json::Value) {
        self.push(HistoryEntry {
            calculated_at: Utc::now(),
            kind,
            summary,
        });
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
        tracing::debug!(len = self.entries.len(), "history entry recorded");
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn to_json(&self) -> MortgageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Restore a saved history. Entries beyond the stored limit are dropped.
    pub fn from_json(json: &str) -> MortgageResult<Self> {
        let mut history: CalculationHistory = serde_json::from_str(json)?;
        history.limit = history.limit.max(1);
        history.entries.truncate(history.limit);
        Ok(history)
    }
}
