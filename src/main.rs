//! Dicepot demo driver
//!
//! Plays a full automated game through the real engine, printing events
//! as they arrive, or prints a batch simulation report with `--simulate`.

use clap::{Parser, ValueEnum};
use dicepot::game::presentation::{OverlayPresentation, SnackbarPresentation};
use dicepot::game::scheduler::SchedulerMode;
use dicepot::game::simulation;
use dicepot::game::types::{DicePolicy, SettlementKind};
use dicepot::{EngineOptions, GameConfig, GameEvent, TurnEngine};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Standard,
    Sparse,
}

impl From<PolicyArg> for DicePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Standard => DicePolicy::Standard,
            PolicyArg::Sparse => DicePolicy::Sparse,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DisplayArg {
    Overlay,
    Snackbar,
}

#[derive(Parser)]
#[command(name = "dicepot", about = "Match-the-pot party dice game demo")]
struct Cli {
    /// Number of players at the table (clamped to the configured range)
    #[arg(long, default_value_t = 4)]
    players: u32,

    /// Initial pot override; defaults to players * base_pot_per_player
    #[arg(long)]
    pot: Option<i64>,

    /// Dice policy; overrides the config file when given
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// How settlements are surfaced
    #[arg(long, value_enum, default_value = "overlay")]
    display: DisplayArg,

    /// Skip the choreography delays
    #[arg(long)]
    fast: bool,

    /// Seed for replayable games
    #[arg(long)]
    seed: Option<u64>,

    /// Optional TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print roll statistics over N simulated rolls instead of playing
    #[arg(long, value_name = "ROLLS")]
    simulate: Option<u64>,

    /// Turn cap for the automated game
    #[arg(long, default_value_t = 500)]
    max_turns: u32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => GameConfig::from_toml_file(path)?,
        None => GameConfig::for_policy(cli.policy.map(Into::into).unwrap_or(DicePolicy::Standard)),
    };
    if let Some(policy) = cli.policy {
        config.session.dice_policy = policy.into();
    }

    if let Some(rolls) = cli.simulate {
        run_simulation(&config, &cli, rolls);
        return Ok(());
    }
    run_game(config, &cli).await
}

fn run_simulation(config: &GameConfig, cli: &Cli, rolls: u64) {
    let policy = config.session.dice_policy;
    let seed = cli.seed.unwrap_or(0xD1CE);

    println!("🎲 Roll distribution: {} policy, {} rolls", policy, rolls);
    let stats = simulation::roll_stats(policy, rolls, seed);
    println!("  zero-point rate: {:.4}", stats.zero_rate());
    println!("  mean points:     {:.3}", stats.mean_points());
    for die in 0..6 {
        println!("  die {} hit rate:  {:.4}", die + 1, stats.die_hit_rate(die));
    }

    let report = simulation::play_game(config, cli.players, seed, cli.max_turns);
    println!(
        "🎰 Automated game: {} turns ({} takes, {} bounce-backs, {} blanks)",
        report.turns_played, report.takes, report.bounce_backs, report.zero_rolls
    );
    match report.winner {
        Some(id) => println!("  winner: Player {} emptied the pot", id),
        None => println!(
            "  no exact win within {} turns, pot left at ${}",
            cli.max_turns, report.final_pot
        ),
    }
    println!("  money conserved: {}", report.conservation_held);
}

async fn run_game(config: GameConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let options = EngineOptions {
        scheduler_mode: if cli.fast {
            SchedulerMode::Instant
        } else {
            SchedulerMode::Realtime
        },
        rng_seed: cli.seed,
        presentation: match cli.display {
            DisplayArg::Overlay => Box::new(OverlayPresentation),
            DisplayArg::Snackbar => Box::new(SnackbarPresentation::new(
                config.timing.snackbar_linger_ms,
            )),
        },
    };
    let handle = TurnEngine::spawn(config, options);
    let mut events = handle.subscribe();

    let snapshot = handle.configure_session(cli.players, cli.pot).await?;
    println!(
        "🎲 Table open: {} players, pot ${}",
        snapshot.players.len(),
        snapshot.pot_balance
    );

    let mut turns = 0u32;
    handle.submit_trigger()?;
    loop {
        use tokio::sync::broadcast::error::RecvError;
        match events.recv().await {
            Ok(event) => {
                print_event(&event);
                match event {
                    GameEvent::SettlementApplied { .. } => {
                        let _ = handle.acknowledge_settlement();
                    }
                    GameEvent::TurnAdvanced { .. } => {
                        turns += 1;
                        if turns >= cli.max_turns {
                            println!("⏸ turn cap reached with no exact win");
                            break;
                        }
                        handle.submit_trigger()?;
                    }
                    GameEvent::VictoryReached { .. } => break,
                    _ => {}
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "event stream lagged");
            }
            Err(RecvError::Closed) => break,
        }
    }
    handle.shutdown();
    Ok(())
}

fn print_event(event: &GameEvent) {
    match event {
        GameEvent::RollStarted { player_id } => {
            println!("* Player {} shakes the cup...", player_id);
        }
        GameEvent::DiceLanded { faces, .. } => println!("  dice: {:?}", faces),
        GameEvent::PointsRevealed { total } => println!("  {} points!", total),
        GameEvent::SettlementApplied {
            settlement,
            pot_after,
            ..
        } => match settlement.kind {
            SettlementKind::Take => println!(
                "  💰 takes ${}, pot now ${}",
                settlement.player_delta, pot_after
            ),
            SettlementKind::BounceBack => println!(
                "  💸 busts! pays ${} back in, pot now ${}",
                -settlement.player_delta, pot_after
            ),
            SettlementKind::ExactWin => println!("  🧧 EXACT MATCH! The pot is cleared."),
        },
        GameEvent::VictoryReached { ranking } => {
            println!("🏆 Final standings:");
            for entry in ranking {
                println!(
                    "  #{} {} {}: ${}{}",
                    entry.rank,
                    entry.player.avatar,
                    entry.player.display_name,
                    entry.player.balance,
                    if entry.is_winner { "  👑" } else { "" }
                );
            }
        }
        GameEvent::TurnAdvanced { player_id, .. } => println!("  next up: Player {}", player_id),
        GameEvent::ShakeStarted => println!("  (shaking)"),
        GameEvent::ShakeStopped => {}
        GameEvent::SessionReset => println!("  table reset"),
    }
}
