//! # Transfer Run State
//!
//! Run identity, phase progression, and the counter set every stage of a
//! transfer reports into.
//!
//! ## Phase Machine
//!
//! ```text
//! Init → AlbumsReconciled → ItemsTransferred → AlbumMembershipLinked → Done
//! ```
//!
//! Phases only move forward, one step at a time. Stages that are disabled
//! by configuration still advance their phase; they just do no work first.

use crate::error::{Result, TransferError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a transfer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random run ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Phase Types
// ============================================================================

/// The current phase of a transfer run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Run created, nothing reconciled yet
    Init,
    /// Source albums mapped to destination albums
    AlbumsReconciled,
    /// Unaffiliated library items transferred
    ItemsTransferred,
    /// Album memberships ensured on the destination
    AlbumMembershipLinked,
    /// Run finished
    Done,
}

impl RunPhase {
    /// The phase that legally follows this one, if any
    pub fn next(&self) -> Option<RunPhase> {
        match self {
            RunPhase::Init => Some(RunPhase::AlbumsReconciled),
            RunPhase::AlbumsReconciled => Some(RunPhase::ItemsTransferred),
            RunPhase::ItemsTransferred => Some(RunPhase::AlbumMembershipLinked),
            RunPhase::AlbumMembershipLinked => Some(RunPhase::Done),
            RunPhase::Done => None,
        }
    }

    /// Check if this phase is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunPhase::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunPhase::Init => "init",
            RunPhase::AlbumsReconciled => "albums_reconciled",
            RunPhase::ItemsTransferred => "items_transferred",
            RunPhase::AlbumMembershipLinked => "album_membership_linked",
            RunPhase::Done => "done",
        }
    }
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Counters
// ============================================================================

/// Counter set accumulated over one transfer run
///
/// `total` counts items seen by the unaffiliated transfer pass. The album
/// pass reports its per-item outcomes into `success`/`failed`/`skipped`
/// without touching `total`; `skipped` counts items the linker found already
/// present on the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferStats {
    /// Items seen by the unaffiliated transfer pass
    pub total: u64,
    /// Items transferred successfully (both passes)
    pub success: u64,
    /// Items that failed to transfer (both passes)
    pub failed: u64,
    /// Items skipped because the destination already had them
    pub skipped: u64,
    /// Source albums seen
    pub albums_total: u64,
    /// Albums reconciled to a destination album
    pub albums_success: u64,
    /// Albums that could not be reconciled
    pub albums_failed: u64,
}

// ============================================================================
// Run Record
// ============================================================================

/// One transfer run: identity, phase, counters, and timing
#[derive(Debug, Clone, Serialize)]
pub struct TransferRun {
    /// Run identifier
    pub id: RunId,
    /// Current phase
    pub phase: RunPhase,
    /// Whether this run simulates without touching the destination
    pub dry_run: bool,
    /// Accumulated counters
    pub stats: TransferStats,
    /// When the run started (UTC)
    pub started_at: DateTime<Utc>,
    /// When the run reached `Done`, if it has
    pub completed_at: Option<DateTime<Utc>>,
}

impl TransferRun {
    /// Create a run in the `Init` phase
    pub fn new(dry_run: bool) -> Self {
        Self {
            id: RunId::new(),
            phase: RunPhase::Init,
            dry_run,
            stats: TransferStats::default(),
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Advance to the next phase
    ///
    /// # Errors
    ///
    /// Returns an error when `to` is not the phase that directly follows the
    /// current one.
    pub fn advance(&mut self, to: RunPhase) -> Result<()> {
        if self.phase.next() != Some(to) {
            return Err(TransferError::InvalidPhaseTransition {
                from: self.phase.to_string(),
                to: to.to_string(),
            });
        }

        self.phase = to;
        if to.is_terminal() {
            self.completed_at = Some(Utc::now());
        }

        Ok(())
    }
}
