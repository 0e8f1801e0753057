mod battle;
mod config;
mod net;
mod player;
mod runner;

use tracing::{error, info, Level};

use crate::battle::session::BattleOutcome;
use crate::config::ArenaConfig;
use crate::net::api::ArenaApi;
use crate::player::PlayerProfile;
use crate::runner::{ArenaRunner, RunnerError};

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Worldbinder Arena Client v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ArenaConfig::load_or_default();
    if let Err(e) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", e);
    }
    info!("Configuration loaded: {}", config.api_base_url);

    let mint_address = std::env::var("WB_MINT")
        .map_err(|_| anyhow::anyhow!("WB_MINT must name the NFT mint to fight with"))?;
    let bet: u32 = env_parse("WB_BET", 10);

    let mut profile = PlayerProfile::new(
        std::env::var("WB_USERNAME").unwrap_or_else(|_| "Warrior".to_string()),
    );
    profile.points = env_parse("WB_POINTS", 500);
    profile.nft_count = env_parse("WB_NFT_COUNT", 1);
    info!(
        "Playing as {} ({} points, {} NFTs, +{}% ATK)",
        profile.username,
        profile.points,
        profile.nft_count,
        profile.attack_bonus_percent()
    );

    let api = ArenaApi::new(config.api_base_url.clone(), config.auth_token.clone());
    let runner = ArenaRunner::new(api, &config);

    // Transient battle-start failures get a couple of retries; anything
    // else surfaces immediately.
    let mut attempts = 0;
    let outcome = loop {
        match runner.run_session(&mut profile, &mint_address, bet).await {
            Ok(outcome) => break outcome,
            Err(RunnerError::Api(err)) if err.is_transient() && attempts < 2 => {
                attempts += 1;
                error!("Battle start failed ({}), retrying...", err);
            }
            Err(err) => {
                error!("Battle failed: {}", err);
                return Err(err.into());
            }
        }
    };

    match &outcome {
        BattleOutcome::Server(verdict) => info!(
            "Server verdict: win={}, points={}, record={}-{}",
            verdict.player_wins, verdict.points, verdict.wins, verdict.losses
        ),
        BattleOutcome::Local(verdict) => info!(
            "Local verdict: win={} ({:?})",
            verdict.player_wins, verdict.end
        ),
    }
    if outcome.player_wins() {
        info!("FLAWLESS VICTORY - the arena bows before you");
    } else {
        info!("Defeated - keep training");
    }

    Ok(())
}
