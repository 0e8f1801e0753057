/// Core combat constants
pub mod combat {
    /// Maximum (and starting) HP for both combatants
    pub const MAX_HP: u32 = 300;
    /// Match duration in seconds
    pub const MATCH_TIME: f32 = 20.0;
    /// Simulation tick length in seconds (cooldown resolution)
    pub const SIM_DT: f32 = 0.1;
    /// Simulation tick length in milliseconds
    pub const SIM_TICK_MS: u64 = 100;
}

/// Shield skill behavior
pub mod shield {
    /// How long the shield stays up after activation, in seconds
    pub const DURATION: f32 = 10.0;
    /// Incoming damage is multiplied by this (then floored) while shielded
    pub const DAMPING: f32 = 0.3;
}

/// Heal-over-time skill behavior
pub mod heal {
    /// Number of heal ticks per activation
    pub const TICKS: u8 = 3;
    /// HP restored per tick
    pub const HP_PER_TICK: u32 = 20;
    /// Seconds between heal ticks
    pub const INTERVAL: f32 = 1.0;
}

/// Skill leveling formulas
pub mod leveling {
    /// Extra damage per level above 1
    pub const DAMAGE_PER_LEVEL: u32 = 2;
    /// Cooldown reduction per level above 1, in seconds
    pub const COOLDOWN_PER_LEVEL: f32 = 0.5;
    /// Cooldowns never drop below this
    pub const MIN_COOLDOWN: f32 = 0.5;
}

/// Opponent behavior tuning
pub mod opponent {
    /// Opponent damage is multiplied by this (then floored).
    /// Deliberately favors the opponent; kept subtle to preserve feel.
    pub const DAMAGE_MULTIPLIER: f32 = 1.12;
    /// Minimum delay between opponent actions, in seconds
    pub const ACTION_DELAY_MIN: f32 = 1.5;
    /// Maximum delay between opponent actions, in seconds
    pub const ACTION_DELAY_MAX: f32 = 4.0;
    /// Opponent NFT count is rolled uniformly in this range (inclusive)
    pub const NFT_COUNT_MIN: u32 = 1;
    pub const NFT_COUNT_MAX: u32 = 5;

    /// Display names rolled for generated opponents
    pub const NAMES: [&str; 5] = [
        "DarkReaper",
        "CrystalFang",
        "VoidWalker",
        "StormBringer",
        "NightShade",
    ];
    /// NFT display names rolled for generated opponents
    pub const NFT_NAMES: [&str; 3] = ["Bone Sentinel", "Frost Wyrm", "Lava Titan"];
}

/// Tie-break advantage formula: base + spread * my_nfts / (my_nfts + opp_nfts)
pub mod advantage {
    pub const BASE: f32 = 0.3;
    pub const SPREAD: f32 = 0.4;
}

/// NFT attack bonus schedule (percent), capped at three counted NFTs
pub mod bonus {
    /// Bonus with exactly one NFT
    pub const ONE: u32 = 10;
    /// Bonus with exactly two NFTs
    pub const TWO: u32 = 15;
    /// Bonus with three or more NFTs
    pub const THREE_PLUS: u32 = 20;
}

/// Backend timing constants
pub mod net {
    /// Seconds between resolution status polls
    pub const POLL_INTERVAL_SECS: u64 = 1;
    /// Wait duration assumed when the server omits one, in seconds
    pub const DEFAULT_WAIT_SECS: u64 = 60;
}
