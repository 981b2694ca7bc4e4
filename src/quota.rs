//! Modification quota tracker.
//!
//! A project's requirement-change policy allows a fixed number of
//! client-requested modifications. Each one is recorded as an event with
//! the days it consumed. Only the event count is capped; days are billing
//! information.
//!
//! The ledger is append-only. Events are never removed or renumbered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};

/// Modification history of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationLedger {
    pub project_id: String,
    /// Maximum number of events.
    pub total_allowed: u32,
    /// Default days per event. Not enforced.
    pub days_per_modification: u32,
    pub events: Vec<ModificationEvent>,
}

/// One consumed modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationEvent {
    /// 1-based sequence number.
    pub number: u32,
    pub days_used: u32,
    pub created_at: DateTime<Utc>,
}

/// Summary for API responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub project_id: String,
    pub total_allowed: u32,
    pub used: u32,
    pub remaining: u32,
    pub can_modify: bool,
    pub total_days_used: u64,
}

impl ModificationLedger {
    /// Creates an empty ledger.
    pub fn new(
        project_id: impl Into<String>,
        total_allowed: u32,
        days_per_modification: u32,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            total_allowed,
            days_per_modification,
            events: Vec::new(),
        }
    }

    /// Creates an empty ledger with the configured default policy.
    pub fn with_defaults(project_id: impl Into<String>, config: &EngineConfig) -> Self {
        Self::new(
            project_id,
            config.default_total_modifications,
            config.default_days_per_modification,
        )
    }

    /// Number of consumed events.
    #[inline]
    pub fn used(&self) -> u32 {
        u32::try_from(self.events.len()).unwrap_or(u32::MAX)
    }

    /// Events still available. Never negative.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.total_allowed.saturating_sub(self.used())
    }

    /// Whether another modification may be recorded.
    #[inline]
    pub fn can_consume(&self) -> bool {
        self.used() < self.total_allowed
    }

    /// Sum of days over all events.
    pub fn total_days_used(&self) -> u64 {
        self.events.iter().map(|e| u64::from(e.days_used)).sum()
    }

    /// Records a modification now. See [`consume_at`](Self::consume_at).
    pub fn consume(&self, days_used: u32) -> Result<Self> {
        self.consume_at(days_used, Utc::now())
    }

    /// Records a modification using the ledger's default day count.
    pub fn consume_default(&self) -> Result<Self> {
        self.consume(self.days_per_modification)
    }

    /// Returns a new ledger with one more event, or
    /// [`EngineError::QuotaExceeded`] when the cap is reached.
    ///
    /// `self` is never modified, so a rejected call leaves no trace.
    pub fn consume_at(&self, days_used: u32, created_at: DateTime<Utc>) -> Result<Self> {
        if !self.can_consume() {
            tracing::warn!(
                project = %self.project_id,
                total_allowed = self.total_allowed,
                "modification quota exhausted"
            );
            return Err(EngineError::QuotaExceeded {
                project_id: self.project_id.clone(),
                total_allowed: self.total_allowed,
                used: self.used(),
            });
        }

        let mut next = self.clone();
        next.events.push(ModificationEvent {
            number: self.used() + 1,
            days_used,
            created_at,
        });
        tracing::info!(
            project = %next.project_id,
            number = next.used(),
            days_used,
            remaining = next.remaining(),
            "modification recorded"
        );
        Ok(next)
    }

    /// Summary of the ledger.
    pub fn status(&self) -> QuotaStatus {
        QuotaStatus {
            project_id: self.project_id.clone(),
            total_allowed: self.total_allowed,
            used: self.used(),
            remaining: self.remaining(),
            can_modify: self.can_consume(),
            total_days_used: self.total_days_used(),
        }
    }
}

/// Free-function form of [`ModificationLedger::can_consume`].
pub fn can_consume(ledger: &ModificationLedger) -> bool {
    ledger.can_consume()
}

/// Free-function form of [`ModificationLedger::consume`].
pub fn consume(ledger: &ModificationLedger, days_used: u32) -> Result<ModificationLedger> {
    ledger.consume(days_used)
}
