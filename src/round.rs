//! Round resolver: Idle → Shaking → Resolving → Idle, one cascade per `step()`.

use crate::cascade::{collapse, fill_new_grid, pop, refill};
use crate::cluster::{Cluster, find_clusters};
use crate::config::{ConfigError, EngineConfig};
use crate::generator::SymbolGenerator;
use crate::grid::{Coord, Grid};
use crate::palette::Palette;
use crate::payout::payout;
use crate::rng::RandomSource;
use log::{debug, warn};
use rand::rngs::StdRng;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No round in progress.
    Idle,
    /// Round started, grid dealt; cosmetic pre-roll before resolution.
    Shaking,
    /// Cascading.
    Resolving,
}

#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error("no round is resolving")]
    NotResolving,
    #[error("round not shaking (phase {0:?})")]
    NotShaking(Phase),
    #[error("a round is already in progress (phase {0:?})")]
    RoundActive(Phase),
    #[error("wager must be finite and non-negative, got {0}")]
    InvalidWager(f64),
    #[error("starting grid has {0} empty cells")]
    IncompleteGrid(usize),
}

/// Outcome of a finished round.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub popped: u32,
    pub wager: f64,
    pub payout: f64,
    pub cascades: u32,
    /// Settled by the cascade ceiling rather than by running out of clusters.
    pub capped: bool,
}

/// What one cascade did.
#[derive(Debug, Clone, PartialEq)]
pub struct CascadeReport {
    pub clusters: Vec<Cluster>,
    pub popped: Vec<Coord>,
    /// Grid right after the pop, before collapse and refill.
    pub after_pop: Grid,
    pub refilled: usize,
    /// Popped tiles so far this round, including this cascade.
    pub total_popped: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Cascaded(CascadeReport),
    Settled(Settlement),
}

#[derive(Debug, Clone)]
struct RoundState {
    wager: f64,
    popped: u32,
    cascades: u32,
    /// Clusters on the current grid, popped by the next step.
    pending: Vec<Cluster>,
}

/// Owns one grid and one random source. Independent machines share only the palette.
pub struct CascadeMachine<R = StdRng> {
    config: EngineConfig,
    generator: SymbolGenerator,
    rng: R,
    grid: Grid,
    phase: Phase,
    round: Option<RoundState>,
    settlement: Option<Settlement>,
}

impl<R: RandomSource> CascadeMachine<R> {
    pub fn new(config: EngineConfig, palette: Arc<Palette>, mut rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        let generator = SymbolGenerator::new(palette, config.neighbour_bias)?;
        let grid = fill_new_grid(&generator, &mut rng);
        Ok(Self {
            config,
            generator,
            rng,
            grid,
            phase: Phase::Idle,
            round: None,
            settlement: None,
        })
    }

    /// Deal a fresh grid and enter Shaking.
    pub fn start_round(&mut self, wager: f64) -> Result<(), RoundError> {
        self.check_can_start(wager)?;
        let grid = fill_new_grid(&self.generator, &mut self.rng);
        self.enter_round(wager, grid);
        Ok(())
    }

    /// Start a round on a caller-built grid. The grid must be full.
    pub fn start_round_with(&mut self, wager: f64, grid: Grid) -> Result<(), RoundError> {
        self.check_can_start(wager)?;
        let empties = grid.empty_count();
        if empties > 0 {
            return Err(RoundError::IncompleteGrid(empties));
        }
        self.enter_round(wager, grid);
        Ok(())
    }

    fn check_can_start(&self, wager: f64) -> Result<(), RoundError> {
        if self.phase != Phase::Idle {
            return Err(RoundError::RoundActive(self.phase));
        }
        if !wager.is_finite() || wager < 0.0 {
            return Err(RoundError::InvalidWager(wager));
        }
        Ok(())
    }

    fn enter_round(&mut self, wager: f64, grid: Grid) {
        self.grid = grid;
        self.settlement = None;
        self.round = Some(RoundState {
            wager,
            popped: 0,
            cascades: 0,
            pending: Vec::new(),
        });
        self.phase = Phase::Shaking;
        debug!("round started, wager {wager}");
    }

    /// End the pre-roll. Clusters already on the dealt grid become pending and
    /// score in the first cascade.
    pub fn begin_resolving(&mut self) -> Result<(), RoundError> {
        if self.phase != Phase::Shaking {
            return Err(RoundError::NotShaking(self.phase));
        }
        let clusters = find_clusters(&self.grid);
        if let Some(round) = self.round.as_mut() {
            round.pending = clusters;
        }
        self.phase = Phase::Resolving;
        Ok(())
    }

    /// One detect → pop → collapse → refill cycle, or settlement when nothing pops.
    /// Still Shaking: the pre-roll ends first. Idle: error, nothing changes.
    pub fn step(&mut self) -> Result<StepOutcome, RoundError> {
        match self.phase {
            Phase::Idle => return Err(RoundError::NotResolving),
            Phase::Shaking => self.begin_resolving()?,
            Phase::Resolving => {}
        }
        let Some(round) = self.round.as_mut() else {
            return Err(RoundError::NotResolving);
        };

        if round.pending.is_empty() {
            return Ok(StepOutcome::Settled(self.settle(false)));
        }
        if self.config.max_cascades.is_some_and(|max| round.cascades >= max) {
            warn!(
                "cascade ceiling reached after {} cascades ({} popped); settling",
                round.cascades, round.popped
            );
            return Ok(StepOutcome::Settled(self.settle(true)));
        }

        let clusters = std::mem::take(&mut round.pending);
        let popped = pop(&mut self.grid, &clusters);
        round.popped += popped.len() as u32;
        round.cascades += 1;
        let after_pop = self.grid.clone();
        collapse(&mut self.grid);
        let refilled = refill(&mut self.grid, &self.generator, &mut self.rng);
        round.pending = find_clusters(&self.grid);
        debug!(
            "cascade {}: {} clusters, {} popped, {} pending",
            round.cascades,
            clusters.len(),
            popped.len(),
            round.pending.len()
        );

        Ok(StepOutcome::Cascaded(CascadeReport {
            clusters,
            popped,
            after_pop,
            refilled,
            total_popped: round.popped,
        }))
    }

    /// Step until the round settles.
    pub fn resolve(&mut self) -> Result<Settlement, RoundError> {
        loop {
            if let StepOutcome::Settled(s) = self.step()? {
                return Ok(s);
            }
        }
    }

    /// Start and fully resolve a round.
    pub fn spin(&mut self, wager: f64) -> Result<Settlement, RoundError> {
        self.start_round(wager)?;
        self.resolve()
    }

    fn settle(&mut self, capped: bool) -> Settlement {
        let (wager, popped, cascades) = self
            .round
            .take()
            .map_or((0.0, 0, 0), |r| (r.wager, r.popped, r.cascades));
        let settlement = Settlement {
            popped,
            wager,
            payout: payout(popped, wager, self.config.per_tile_factor),
            cascades,
            capped,
        };
        debug!(
            "round settled: {} popped over {} cascades, payout {:.2}",
            settlement.popped, settlement.cascades, settlement.payout
        );
        self.phase = Phase::Idle;
        self.settlement = Some(settlement.clone());
        settlement
    }
}

impl<R> CascadeMachine<R> {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// True once a round has settled and no new round has started.
    pub fn is_settled(&self) -> bool {
        self.phase == Phase::Idle && self.settlement.is_some()
    }

    pub fn settlement(&self) -> Option<&Settlement> {
        self.settlement.as_ref()
    }

    /// Read-only view for renderers.
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Clusters the next step will pop. Empty outside Resolving.
    pub fn pending_clusters(&self) -> &[Cluster] {
        self.round
            .as_ref()
            .map(|r| r.pending.as_slice())
            .unwrap_or_default()
    }

    pub fn popped_so_far(&self) -> u32 {
        self.round.as_ref().map_or(0, |r| r.popped)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
