//! Async session driver
//!
//! Owns one battle session end to end and serializes every mutation onto a
//! single task: simulator ticks and poll results are multiplexed with
//! `select!`, so resolution triggers can never interleave.

use std::time::Duration;

use tracing::info;

use crate::battle::combat::OpponentProfile;
use crate::battle::constants::combat;
use crate::battle::session::{
    BattleOutcome, BattleSession, CombatSetup, Phase, SessionError,
};
use crate::battle::skills::SkillKey;
use crate::config::ArenaConfig;
use crate::net::api::{ApiError, ArenaApi};
use crate::net::poller::ResolutionPoller;
use crate::player::PlayerProfile;

/// Session run failure.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("session ended without an outcome")]
    NoOutcome,
}

/// Drives battle sessions against the backend.
pub struct ArenaRunner {
    api: ArenaApi,
    poll_interval: Duration,
    auto_cast: bool,
}

impl ArenaRunner {
    pub fn new(api: ArenaApi, config: &ArenaConfig) -> Self {
        Self {
            api,
            poll_interval: config.poll_interval(),
            auto_cast: config.auto_cast,
        }
    }

    /// Run one full session: bet, wait, fight, resolve. A failed battle
    /// start rolls the session back and surfaces the error so the caller
    /// can offer a retry. On a server-resolved match the profile absorbs
    /// the updated totals.
    pub async fn run_session(
        &self,
        profile: &mut PlayerProfile,
        mint_address: &str,
        bet: u32,
    ) -> Result<BattleOutcome, RunnerError> {
        let opponent = OpponentProfile::generate(&mut rand::thread_rng());
        info!(
            opponent = %opponent.name,
            nft = %opponent.nft_name,
            nft_count = opponent.nft_count,
            "matched against opponent"
        );

        let setup = CombatSetup::from_profile(profile, opponent);
        let mut session = BattleSession::new(profile.points, setup);
        session.place_bet(bet)?;

        let start = match self.api.start_battle(mint_address, bet).await {
            Ok(start) => start,
            Err(err) => {
                session.start_failed();
                return Err(err.into());
            }
        };
        let battle_id = start.battle_id.clone();
        session.begin_waiting(start.battle_id, start.wait_seconds)?;

        let mut poller = ResolutionPoller::new(self.api.clone(), battle_id);
        let mut sim = tokio::time::interval(Duration::from_millis(combat::SIM_TICK_MS));
        let mut poll = tokio::time::interval(self.poll_interval);

        while session.phase() != Phase::Resolved {
            tokio::select! {
                _ = sim.tick() => {
                    session.tick(combat::SIM_DT);
                    if self.auto_cast {
                        auto_cast(&mut session);
                    }
                }
                _ = poll.tick() => {
                    if let Some(verdict) = poller.poll_once().await {
                        session.server_resolved(verdict);
                    }
                }
            }
        }

        if let Some(verdict) = session.server_verdict() {
            profile.apply_verdict(verdict);
        }
        session.outcome().ok_or(RunnerError::NoOutcome)
    }
}

/// Built-in pilot for headless runs: shore up defenses under pressure,
/// otherwise land the heaviest ready hit. At most one cast per tick.
fn auto_cast(session: &mut BattleSession) {
    let Some(combat_state) = session.combat() else {
        return;
    };
    let player_hp = combat_state.player_hp();
    let shielded = combat_state.shield_active();

    let mut picks = Vec::with_capacity(5);
    if player_hp < combat::MAX_HP / 3 {
        picks.push(SkillKey::Healing);
    }
    if player_hp < combat::MAX_HP / 2 && !shielded {
        picks.push(SkillKey::Defense);
    }
    picks.extend([
        SkillKey::MeteorRain,
        SkillKey::EnergyBurst,
        SkillKey::BladeStrike,
    ]);

    for key in picks {
        if session.use_skill(key).is_ok() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::constants::opponent as opponent_consts;
    use crate::battle::skills::SkillLoadout;

    fn quiet_opponent() -> OpponentProfile {
        OpponentProfile {
            name: "StormBringer".to_string(),
            nft_name: "Lava Titan".to_string(),
            nft_count: 1,
            damage_multiplier: opponent_consts::DAMAGE_MULTIPLIER,
            action_delay_min: 999.0,
            action_delay_max: 1000.0,
        }
    }

    fn fighting_session(loadout: SkillLoadout) -> BattleSession {
        let mut session = BattleSession::new(
            1000,
            CombatSetup {
                loadout,
                nft_count: 0,
                opponent: quiet_opponent(),
            },
        );
        session.place_bet(100).unwrap();
        session.begin_waiting("battle-1".to_string(), 1).unwrap();
        session.tick(1.0);
        assert_eq!(session.phase(), Phase::Fighting);
        session
    }

    #[test]
    fn test_auto_cast_lands_a_hit() {
        let mut session = fighting_session(SkillLoadout::default());
        auto_cast(&mut session);

        // Only Blade Strike is unlocked, so it was the pick.
        let combat_state = session.combat().unwrap();
        assert_eq!(combat_state.opp_hp(), 282);
        assert!(combat_state
            .cooldown_remaining(SkillKey::BladeStrike)
            .is_some());
    }

    #[test]
    fn test_auto_cast_prefers_heaviest_ready_skill() {
        let mut session = fighting_session(SkillLoadout::from_levels([1, 1, 1, 1, 1]));
        auto_cast(&mut session);

        let combat_state = session.combat().unwrap();
        assert!(combat_state
            .cooldown_remaining(SkillKey::MeteorRain)
            .is_some());
        assert!(combat_state
            .cooldown_remaining(SkillKey::BladeStrike)
            .is_none());
    }

    #[test]
    fn test_auto_cast_casts_once_per_call() {
        let mut session = fighting_session(SkillLoadout::from_levels([1, 1, 0, 0, 0]));
        auto_cast(&mut session);

        let combat_state = session.combat().unwrap();
        // Energy Burst fired; Blade Strike stayed ready for the next tick.
        assert!(combat_state
            .cooldown_remaining(SkillKey::EnergyBurst)
            .is_some());
        assert!(combat_state
            .cooldown_remaining(SkillKey::BladeStrike)
            .is_none());
    }

    #[test]
    fn test_auto_cast_outside_fighting_is_noop() {
        let mut session = BattleSession::new(
            100,
            CombatSetup {
                loadout: SkillLoadout::default(),
                nft_count: 0,
                opponent: quiet_opponent(),
            },
        );
        auto_cast(&mut session);
        assert_eq!(session.phase(), Phase::Betting);
    }
}
