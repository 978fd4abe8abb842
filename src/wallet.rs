//! Credits and bet bookkeeping around rounds. In memory only.

use crate::round::Settlement;
use thiserror::Error;

pub const START_CREDITS: f64 = 1000.0;
pub const DEFAULT_BET: f64 = 5.0;
pub const MIN_BET: f64 = 1.0;
pub const MAX_BET: f64 = 50.0;
/// Bet change per increase/decrease.
pub const BET_STEP: f64 = 1.0;

#[derive(Debug, Error, PartialEq)]
pub enum WalletError {
    #[error("insufficient credits: have {credits:.2}, bet {bet:.2}")]
    InsufficientCredits { credits: f64, bet: f64 },
    #[error("bet {bet} outside [{min}, {max}]")]
    BetOutOfRange { bet: f64, min: f64, max: f64 },
    #[error("starting credits must be finite and non-negative, got {0}")]
    InvalidCredits(f64),
}

/// Balance, current bet and lifetime counters.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    credits: f64,
    bet: f64,
    min_bet: f64,
    max_bet: f64,
    pub last_win: f64,
    pub rounds: u64,
    pub wins: u64,
    pub total_wagered: f64,
    pub total_won: f64,
    pub biggest_win: f64,
}

impl Default for Wallet {
    fn default() -> Self {
        Self {
            credits: START_CREDITS,
            bet: DEFAULT_BET,
            min_bet: MIN_BET,
            max_bet: MAX_BET,
            last_win: 0.0,
            rounds: 0,
            wins: 0,
            total_wagered: 0.0,
            total_won: 0.0,
            biggest_win: 0.0,
        }
    }
}

impl Wallet {
    pub fn new(credits: f64, bet: f64) -> Result<Self, WalletError> {
        if !credits.is_finite() || credits < 0.0 {
            return Err(WalletError::InvalidCredits(credits));
        }
        let mut wallet = Self {
            credits,
            ..Self::default()
        };
        wallet.set_bet(bet)?;
        Ok(wallet)
    }

    pub fn credits(&self) -> f64 {
        self.credits
    }

    pub fn bet(&self) -> f64 {
        self.bet
    }

    pub fn bet_bounds(&self) -> (f64, f64) {
        (self.min_bet, self.max_bet)
    }

    pub fn set_bet(&mut self, bet: f64) -> Result<(), WalletError> {
        if !(self.min_bet..=self.max_bet).contains(&bet) {
            return Err(WalletError::BetOutOfRange {
                bet,
                min: self.min_bet,
                max: self.max_bet,
            });
        }
        self.bet = bet;
        Ok(())
    }

    pub fn increase_bet(&mut self) {
        self.bet = (self.bet + BET_STEP).min(self.max_bet);
    }

    pub fn decrease_bet(&mut self) {
        self.bet = (self.bet - BET_STEP).max(self.min_bet);
    }

    pub fn max_bet(&mut self) {
        self.bet = self.max_bet;
    }

    pub fn can_afford(&self) -> bool {
        self.credits >= self.bet
    }

    /// Debit the current bet for a new round. Returns the wager.
    pub fn place_bet(&mut self) -> Result<f64, WalletError> {
        if !self.can_afford() {
            return Err(WalletError::InsufficientCredits {
                credits: self.credits,
                bet: self.bet,
            });
        }
        self.credits -= self.bet;
        self.total_wagered += self.bet;
        self.rounds += 1;
        Ok(self.bet)
    }

    /// Credit a settled round's payout.
    pub fn credit(&mut self, settlement: &Settlement) {
        let win = settlement.payout;
        self.credits += win;
        self.last_win = win;
        self.total_won += win;
        if win > 0.0 {
            self.wins += 1;
        }
        self.biggest_win = self.biggest_win.max(win);
    }

    /// Net result across all rounds (positive = player ahead).
    pub fn net(&self) -> f64 {
        self.total_won - self.total_wagered
    }

    /// Return to player, percent.
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0.0 {
            (self.total_won / self.total_wagered) * 100.0
        } else {
            0.0
        }
    }

    /// Rounds with a non-zero payout, percent.
    pub fn hit_rate(&self) -> f64 {
        if self.rounds > 0 {
            (self.wins as f64 / self.rounds as f64) * 100.0
        } else {
            0.0
        }
    }
}
