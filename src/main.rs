//! Dropfall — headless cascade slot simulator.

use anyhow::{Context, Result};
use clap::Parser;
use dropfall::config::{DEFAULT_MAX_CASCADES, DEFAULT_PER_TILE_FACTOR};
use dropfall::generator::DEFAULT_NEIGHBOUR_BIAS;
use dropfall::rng::make_rng;
use dropfall::wallet::{DEFAULT_BET, START_CREDITS};
use dropfall::{CascadeMachine, EngineConfig, Palette, Settlement, StepOutcome, Wallet};
use log::{info, warn};
use std::sync::Arc;

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let palette = Palette::load(args.palette.as_deref()).with_context(|| {
        format!(
            "loading palette {}",
            args.palette
                .as_deref()
                .map_or_else(|| "(built-in)".into(), |p| p.display().to_string())
        )
    })?;
    info!("palette: {} colours", palette.len());
    let config = EngineConfig {
        neighbour_bias: args.bias,
        per_tile_factor: args.factor,
        max_cascades: (args.max_cascades > 0).then_some(args.max_cascades),
    };
    let mut machine = CascadeMachine::new(config, Arc::new(palette), make_rng(args.seed))?;
    let mut wallet = Wallet::new(args.credits, args.bet)?;

    for round in 1..=args.spins {
        let wager = match wallet.place_bet() {
            Ok(w) => w,
            Err(e) => {
                warn!("stopping after {} rounds: {e}", round - 1);
                break;
            }
        };
        machine.start_round(wager)?;
        let settlement = if args.show_grid {
            println!("round {round}, bet {wager:.2}");
            play_shown(&mut machine)?
        } else {
            machine.resolve()?
        };
        wallet.credit(&settlement);
        if settlement.capped {
            warn!("round {round} hit the cascade ceiling");
        }
        if args.show_grid {
            println!(
                "  popped {} in {} cascades, win {:.2}, credits {:.2}\n",
                settlement.popped,
                settlement.cascades,
                settlement.payout,
                wallet.credits()
            );
        }
    }

    print_summary(&wallet);
    Ok(())
}

/// Resolve step by step, printing the board after every cascade.
fn play_shown(machine: &mut CascadeMachine) -> Result<Settlement> {
    println!("{}\n", indent(&machine.grid().to_string()));
    loop {
        match machine.step()? {
            StepOutcome::Cascaded(report) => {
                println!(
                    "  cascade: {} clusters, {} popped",
                    report.clusters.len(),
                    report.popped.len()
                );
                println!("{}\n", indent(&report.after_pop.to_string()));
                println!("{}\n", indent(&machine.grid().to_string()));
            }
            StepOutcome::Settled(s) => return Ok(s),
        }
    }
}

fn indent(block: &str) -> String {
    block
        .lines()
        .map(|l| format!("    {l}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_summary(wallet: &Wallet) {
    println!("rounds:       {}", wallet.rounds);
    println!("wagered:      {:.2}", wallet.total_wagered);
    println!("won:          {:.2}", wallet.total_won);
    println!("net:          {:+.2}", wallet.net());
    println!("credits:      {:.2}", wallet.credits());
    println!("rtp:          {:.2}%", wallet.rtp());
    println!("hit rate:     {:.2}%", wallet.hit_rate());
    println!("biggest win:  {:.2}", wallet.biggest_win);
}

/// Cascade match-3 slot simulator.
#[derive(Debug, Parser)]
#[command(
    name = "dropfall",
    version,
    about = "Headless 5x5 cascade slot: clusters of 3+ pop, columns fall, the board refills until nothing pops.",
    long_about = "Dropfall plays rounds of a 5x5 cascade slot without a screen.\n\n\
        Each round debits the bet, deals a fresh board, then pops every same-colour group of \
        three or more touching tiles (no diagonals). Columns fall, new tiles drop in from the \
        top and the board is checked again until nothing pops. Every popped tile pays \
        bet x factor.\n\n\
        Use --seed for reproducible sessions and --palette to load a custom colour set \
        (symbol[name]=\"#RRGGBB\" and weight[name]=\"N\" lines)."
)]
pub struct Args {
    /// Rounds to play (stops early when credits run out).
    #[arg(short = 'n', long, default_value = "100", value_name = "N")]
    pub spins: u32,

    /// Bet per round.
    #[arg(short, long, default_value_t = DEFAULT_BET, value_name = "CREDITS")]
    pub bet: f64,

    /// Starting credits.
    #[arg(short, long, default_value_t = START_CREDITS, value_name = "CREDITS")]
    pub credits: f64,

    /// Seed for the random source. Uses OS entropy if not set.
    #[arg(short, long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Chance that a new tile copies the colour above or to its left.
    #[arg(long, default_value_t = DEFAULT_NEIGHBOUR_BIAS, value_name = "P")]
    pub bias: f64,

    /// Payout per popped tile as a fraction of the bet.
    #[arg(long, default_value_t = DEFAULT_PER_TILE_FACTOR, value_name = "F")]
    pub factor: f64,

    /// Cascades allowed per round before it is force-settled (0 = unlimited).
    #[arg(long, default_value_t = DEFAULT_MAX_CASCADES, value_name = "N")]
    pub max_cascades: u32,

    /// Path to a palette file. Uses the built-in 19-colour palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub palette: Option<std::path::PathBuf>,

    /// Print the board after every cascade.
    #[arg(long)]
    pub show_grid: bool,

    /// Debug logging (per-cascade detail).
    #[arg(short, long)]
    pub verbose: bool,
}
