use serde::{Deserialize, Serialize};

use crate::battle::constants::bonus;
use crate::battle::session::ServerVerdict;
use crate::battle::skills::SkillLoadout;

/// Locally cached player profile.
///
/// The backend owns the authoritative copy; this mirror supplies the point
/// balance for bet validation and absorbs the updated totals after a
/// server-resolved match.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerProfile {
    pub username: String,
    pub points: u64,
    pub wins: u32,
    pub losses: u32,
    pub skills: SkillLoadout,
    /// Owned NFTs, as counted by the wallet scan
    pub nft_count: u32,
}

impl PlayerProfile {
    pub fn new(username: String) -> Self {
        Self {
            username,
            points: 0,
            wins: 0,
            losses: 0,
            skills: SkillLoadout::default(),
            nft_count: 0,
        }
    }

    /// Attack bonus percentage granted by owned NFTs.
    pub fn attack_bonus_percent(&self) -> u32 {
        attack_bonus_percent(self.nft_count)
    }

    /// Sync cached totals from a server verdict. The server already applied
    /// the bet and payout; this only mirrors the result.
    pub fn apply_verdict(&mut self, verdict: &ServerVerdict) {
        self.points = verdict.points;
        self.wins = verdict.wins;
        self.losses = verdict.losses;
    }
}

/// NFT attack bonus schedule. Counts at most three NFTs.
pub fn attack_bonus_percent(nft_count: u32) -> u32 {
    if nft_count >= 3 {
        bonus::THREE_PLUS
    } else if nft_count == 2 {
        bonus::TWO
    } else if nft_count == 1 {
        bonus::ONE
    } else {
        0
    }
}

/// Damage multiplier derived from the bonus schedule, e.g. 1.20 for 20%.
pub fn attack_multiplier(nft_count: u32) -> f32 {
    1.0 + attack_bonus_percent(nft_count) as f32 / 100.0
}
