//! Dropfall — 5x5 cascade match-3 engine.
//!
//! A round deals a grid, pops every 4-connected same-colour cluster of three or
//! more, lets the columns fall, refills from the top and repeats until nothing
//! pops. Popped tiles pay `popped × wager × per_tile_factor`.

pub mod cascade;
pub mod cluster;
pub mod config;
pub mod generator;
pub mod grid;
pub mod pacer;
pub mod palette;
pub mod payout;
pub mod rng;
pub mod round;
pub mod wallet;

pub use cluster::{Cluster, find_clusters};
pub use config::{ConfigError, EngineConfig};
pub use generator::SymbolGenerator;
pub use grid::{COLS, ColorId, Coord, Grid, ROWS, Tile};
pub use pacer::{Pacer, Timing};
pub use palette::{Palette, PaletteError};
pub use payout::payout;
pub use rng::RandomSource;
pub use round::{CascadeMachine, CascadeReport, Phase, RoundError, Settlement, StepOutcome};
pub use wallet::{Wallet, WalletError};
