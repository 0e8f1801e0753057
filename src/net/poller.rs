//! Server reconciliation poller
//!
//! Asks the backend for resolution status once per poll tick. Transient
//! failures are swallowed and retried on the next tick; a resolved status
//! yields the authoritative verdict exactly once, after which the poller
//! goes quiet.

#![allow(dead_code)]

use tracing::{debug, warn};

use crate::battle::session::ServerVerdict;
use crate::net::api::{ApiError, ArenaApi, BattleStatus, BattleStatusKind};

/// Polls one battle until it resolves.
#[derive(Debug)]
pub struct ResolutionPoller {
    api: ArenaApi,
    battle_id: String,
    done: bool,
}

impl ResolutionPoller {
    pub fn new(api: ArenaApi, battle_id: String) -> Self {
        Self {
            api,
            battle_id,
            done: false,
        }
    }

    /// Whether a verdict has already been delivered.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// One poll round. Returns the verdict on the round that observes
    /// resolution; `None` while pending, after delivery, or on a swallowed
    /// transient failure.
    pub async fn poll_once(&mut self) -> Option<ServerVerdict> {
        if self.done {
            return None;
        }

        match self.api.battle_status(&self.battle_id).await {
            Ok(status) => {
                let verdict = resolved_verdict(status);
                if verdict.is_some() {
                    self.done = true;
                }
                verdict
            }
            Err(err) if err.is_transient() => {
                debug!(battle = %self.battle_id, %err, "poll failed, retrying next tick");
                None
            }
            Err(err @ ApiError::Auth) => {
                // Re-polling cannot fix a credential problem, but the wait
                // countdown still falls through to local combat.
                warn!(battle = %self.battle_id, %err, "poll rejected");
                None
            }
            Err(err) => {
                debug!(battle = %self.battle_id, %err, "poll response unusable, retrying");
                None
            }
        }
    }
}

/// Extract the verdict from a status payload; a resolved status without a
/// result payload counts as still pending.
fn resolved_verdict(status: BattleStatus) -> Option<ServerVerdict> {
    match status.status {
        BattleStatusKind::Resolved => status.result,
        BattleStatusKind::Pending => None,
    }
}
