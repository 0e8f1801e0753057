//! Battle session state machine
//!
//! Sequences one arena visit: bet -> wait -> fight -> resolve. The session
//! owns every timer of its current phase and funnels all resolution
//! triggers (local knockout, match clock, server verdict) through a single
//! idempotent resolve step, so racing triggers complete the session exactly
//! once. A resolved session is terminal; fighting again means a fresh
//! session with a fresh id.

// Allow dead_code for display accessors consumed by UI layers
#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::battle::combat::{CombatEnd, CombatEvent, CombatState, OpponentProfile, SkillError};
use crate::battle::skills::{SkillKey, SkillLoadout};
use crate::battle::timer::{CountdownSet, TimerKey};
use crate::player::PlayerProfile;

/// Session phase. Progression is strictly forward; no phase is revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Choosing a bet; nothing has been submitted to the server
    Betting,
    /// Server battle started, counting down the server-provided wait
    Waiting,
    /// Local combat running while polling continues in the background
    Fighting,
    /// Terminal; an outcome is available
    Resolved,
}

/// Authoritative verdict from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVerdict {
    pub player_wins: bool,
    pub points: u64,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub bet: u32,
}

/// Verdict computed by the local simulator when no server resolution arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalVerdict {
    pub player_wins: bool,
    pub end: CombatEnd,
}

/// Terminal outcome of a session. The server verdict always wins over the
/// local one when both exist.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleOutcome {
    Server(ServerVerdict),
    Local(LocalVerdict),
}

impl BattleOutcome {
    pub fn player_wins(&self) -> bool {
        match self {
            BattleOutcome::Server(verdict) => verdict.player_wins,
            BattleOutcome::Local(verdict) => verdict.player_wins,
        }
    }
}

/// Session operation rejections.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("enter a valid bet amount")]
    InvalidBet,
    #[error("not enough points for this bet")]
    InsufficientBalance,
    #[error("no bet has been placed")]
    NoBet,
    #[error("bet already submitted")]
    AlreadyStarted,
    #[error("battle is not in progress")]
    NotFighting,
    #[error(transparent)]
    Skill(#[from] SkillError),
}

/// Everything the fighting phase needs to build its simulator.
#[derive(Debug, Clone)]
pub struct CombatSetup {
    pub loadout: SkillLoadout,
    pub nft_count: u32,
    pub opponent: OpponentProfile,
}

impl CombatSetup {
    pub fn from_profile(profile: &PlayerProfile, opponent: OpponentProfile) -> Self {
        Self {
            loadout: profile.skills.clone(),
            nft_count: profile.nft_count,
            opponent,
        }
    }
}

/// One arena visit.
pub struct BattleSession {
    id: Uuid,
    phase: Phase,
    /// Point balance at session creation, the bound for bet validation
    balance: u64,
    bet: Option<u32>,
    battle_id: Option<String>,
    wait: CountdownSet,
    setup: CombatSetup,
    combat: Option<CombatState>,
    server_result: Option<ServerVerdict>,
    local_result: Option<LocalVerdict>,
}

impl BattleSession {
    pub fn new(balance: u64, setup: CombatSetup) -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::Betting,
            balance,
            bet: None,
            battle_id: None,
            wait: CountdownSet::new(),
            setup,
            combat: None,
            server_result: None,
            local_result: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bet(&self) -> Option<u32> {
        self.bet
    }

    pub fn battle_id(&self) -> Option<&str> {
        self.battle_id.as_deref()
    }

    /// Live combat state, for HP bars and cooldown display.
    pub fn combat(&self) -> Option<&CombatState> {
        self.combat.as_ref()
    }

    /// Whole seconds left on the wait countdown, for display.
    pub fn wait_remaining(&self) -> Option<u64> {
        self.wait
            .remaining(TimerKey::BetWait)
            .map(|secs| secs.ceil() as u64)
    }

    /// Validate a bet amount against the balance. Invalid input is rejected
    /// without any state change; the phase stays at betting either way until
    /// the server confirms the battle start.
    pub fn place_bet(&mut self, amount: u32) -> Result<(), SessionError> {
        if self.phase != Phase::Betting {
            return Err(SessionError::AlreadyStarted);
        }
        if amount == 0 {
            return Err(SessionError::InvalidBet);
        }
        if u64::from(amount) > self.balance {
            return Err(SessionError::InsufficientBalance);
        }
        self.bet = Some(amount);
        Ok(())
    }

    /// The server accepted the battle start: move to the waiting phase and
    /// arm the server-provided countdown.
    pub fn begin_waiting(
        &mut self,
        battle_id: String,
        wait_seconds: u64,
    ) -> Result<(), SessionError> {
        if self.phase != Phase::Betting {
            return Err(SessionError::AlreadyStarted);
        }
        if self.bet.is_none() {
            return Err(SessionError::NoBet);
        }
        info!(
            session = %self.id,
            battle = %battle_id,
            wait_seconds,
            "battle started, waiting for opponent"
        );
        self.battle_id = Some(battle_id);
        self.wait.start(TimerKey::BetWait, wait_seconds as f32);
        self.phase = Phase::Waiting;
        Ok(())
    }

    /// The battle start failed: discard the submitted bet and stay at the
    /// betting phase so the player can retry.
    pub fn start_failed(&mut self) {
        if self.phase == Phase::Betting {
            self.bet = None;
        }
    }

    /// Advance the session by `dt` seconds. Drives the wait countdown while
    /// waiting and the combat simulator while fighting; a no-op otherwise.
    pub fn tick(&mut self, dt: f32) -> Vec<CombatEvent> {
        match self.phase {
            Phase::Waiting => {
                for key in self.wait.tick(dt) {
                    if key == TimerKey::BetWait {
                        self.enter_fighting();
                    }
                }
                Vec::new()
            }
            Phase::Fighting => {
                let events = match self.combat.as_mut() {
                    Some(combat) => combat.tick(dt),
                    None => Vec::new(),
                };
                self.check_local_conclusion();
                events
            }
            Phase::Betting | Phase::Resolved => Vec::new(),
        }
    }

    /// Activate a skill in the running combat.
    pub fn use_skill(&mut self, key: SkillKey) -> Result<Vec<CombatEvent>, SessionError> {
        if self.phase != Phase::Fighting {
            return Err(SessionError::NotFighting);
        }
        let combat = self.combat.as_mut().ok_or(SessionError::NotFighting)?;
        let events = combat.use_skill(key)?;
        self.check_local_conclusion();
        Ok(events)
    }

    /// A server resolution arrived. Stores the verdict and completes the
    /// session immediately, pre-empting local combat; ignored once resolved.
    pub fn server_resolved(&mut self, verdict: ServerVerdict) {
        match self.phase {
            Phase::Resolved => {
                debug!(session = %self.id, "server verdict after resolution, ignored");
            }
            Phase::Betting => {
                warn!(session = %self.id, "server verdict before battle start, ignored");
            }
            Phase::Waiting | Phase::Fighting => {
                self.server_result = Some(verdict);
                self.resolve();
            }
        }
    }

    /// Terminal outcome, once resolved. Server verdict preferred.
    pub fn outcome(&self) -> Option<BattleOutcome> {
        if self.phase != Phase::Resolved {
            return None;
        }
        self.server_result
            .clone()
            .map(BattleOutcome::Server)
            .or(self.local_result.map(BattleOutcome::Local))
    }

    pub fn server_verdict(&self) -> Option<&ServerVerdict> {
        self.server_result.as_ref()
    }

    fn enter_fighting(&mut self) {
        if self.phase != Phase::Waiting {
            return;
        }
        info!(session = %self.id, "wait expired, local combat begins");
        self.combat = Some(CombatState::new(
            self.setup.loadout.clone(),
            self.setup.nft_count,
            self.setup.opponent.clone(),
        ));
        self.phase = Phase::Fighting;
    }

    fn check_local_conclusion(&mut self) {
        let Some(combat) = self.combat.as_mut() else {
            return;
        };
        if let Some(end) = combat.conclusion() {
            let player_wins = combat.local_player_wins();
            self.local_result = Some(LocalVerdict { player_wins, end });
            self.resolve();
        }
    }

    /// Single resolution funnel. Every trigger lands here; only the first
    /// one does anything. Leaving the phase drops the combat state, which
    /// cancels all of its timers and pending impacts, and clears the wait
    /// countdown.
    fn resolve(&mut self) {
        if self.phase == Phase::Resolved {
            return;
        }
        self.phase = Phase::Resolved;
        self.wait.clear();
        self.combat = None;
        let source = if self.server_result.is_some() {
            "server"
        } else {
            "local"
        };
        info!(
            session = %self.id,
            source,
            player_wins = self.outcome().map(|o| o.player_wins()),
            "battle resolved"
        );
    }
}
