//! Pacer: turns elapsed frame time into state machine calls so a renderer can
//! show the shake, the pop flash and the refill at a readable speed.

use crate::rng::RandomSource;
use crate::round::{CascadeMachine, Phase, RoundError, Settlement, StepOutcome};
use std::time::Duration;

/// Pre-roll before resolution starts.
const SHAKE_MS: u64 = 420;
/// How long pending clusters stay highlighted before they pop.
const POP_FLASH_MS: u64 = 400;
/// Pause after a refill before checking for settlement.
const FILL_STAGGER_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub shake: Duration,
    pub pop_flash: Duration,
    pub fill_stagger: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            shake: Duration::from_millis(SHAKE_MS),
            pop_flash: Duration::from_millis(POP_FLASH_MS),
            fill_stagger: Duration::from_millis(FILL_STAGGER_MS),
        }
    }
}

impl Timing {
    /// No delays at all; every `advance` makes progress.
    pub fn instant() -> Self {
        Self {
            shake: Duration::ZERO,
            pop_flash: Duration::ZERO,
            fill_stagger: Duration::ZERO,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pacer {
    timing: Timing,
    /// Time spent in the current wait.
    waited: Duration,
}

impl Pacer {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            waited: Duration::ZERO,
        }
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    /// Feed `dt` of frame time. At most one transition per call; returns the
    /// settlement when this call finished the round.
    pub fn advance<R: RandomSource>(
        &mut self,
        machine: &mut CascadeMachine<R>,
        dt: Duration,
    ) -> Result<Option<Settlement>, RoundError> {
        let wait = match machine.phase() {
            Phase::Idle => {
                self.waited = Duration::ZERO;
                return Ok(None);
            }
            Phase::Shaking => self.timing.shake,
            Phase::Resolving if machine.pending_clusters().is_empty() => self.timing.fill_stagger,
            Phase::Resolving => self.timing.pop_flash,
        };
        self.waited += dt;
        if self.waited < wait {
            return Ok(None);
        }
        self.waited = Duration::ZERO;

        if machine.phase() == Phase::Shaking {
            machine.begin_resolving()?;
            return Ok(None);
        }
        match machine.step()? {
            StepOutcome::Settled(s) => Ok(Some(s)),
            StepOutcome::Cascaded(_) => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::grid::Grid;
    use crate::palette::Palette;
    use crate::rng::make_rng;
    use std::sync::Arc;

    fn machine(seed: u64) -> CascadeMachine {
        CascadeMachine::new(
            EngineConfig::default(),
            Arc::new(Palette::balanced()),
            make_rng(Some(seed)),
        )
        .unwrap()
    }

    fn l_shape_grid() -> Grid {
        "AFGHI\nAJKLM\nAAANO\nPQRST\nUVWXY".parse().unwrap()
    }

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn test_idle_does_nothing() {
        let mut m = machine(1);
        let mut pacer = Pacer::default();
        assert_eq!(pacer.advance(&mut m, FRAME), Ok(None));
        assert_eq!(m.phase(), Phase::Idle);
    }

    #[test]
    fn test_shake_then_flash_before_pop() {
        let mut m = machine(2);
        let mut pacer = Pacer::default();
        m.start_round_with(5.0, l_shape_grid()).unwrap();

        // 26 frames = 416 ms, still shaking
        for _ in 0..26 {
            pacer.advance(&mut m, FRAME).unwrap();
        }
        assert_eq!(m.phase(), Phase::Shaking);
        pacer.advance(&mut m, FRAME).unwrap();
        assert_eq!(m.phase(), Phase::Resolving);
        assert_eq!(m.pending_clusters().len(), 1);

        // the cluster stays on the board for the pop flash
        for _ in 0..24 {
            pacer.advance(&mut m, FRAME).unwrap();
        }
        assert_eq!(m.popped_so_far(), 0);
        pacer.advance(&mut m, FRAME).unwrap();
        assert_eq!(m.popped_so_far(), 5);
    }

    #[test]
    fn test_paced_round_settles() {
        let mut m = machine(3);
        let mut pacer = Pacer::default();
        m.start_round(2.0).unwrap();
        let mut settled = None;
        for _ in 0..10_000 {
            if let Some(s) = pacer.advance(&mut m, FRAME).unwrap() {
                settled = Some(s);
                break;
            }
        }
        let s = settled.expect("round never settled");
        assert!(m.is_settled());
        assert_eq!(m.settlement(), Some(&s));
    }

    #[test]
    fn test_instant_timing_matches_direct_resolution() {
        let mut paced = machine(4);
        let mut direct = machine(4);
        let mut pacer = Pacer::new(Timing::instant());
        paced.start_round(1.0).unwrap();
        let expected = direct.spin(1.0).unwrap();
        let got = loop {
            if let Some(s) = pacer.advance(&mut paced, Duration::ZERO).unwrap() {
                break s;
            }
        };
        assert_eq!(got, expected);
        assert_eq!(paced.grid(), direct.grid());
    }
}
