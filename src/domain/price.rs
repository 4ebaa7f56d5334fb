//! Simulated TRCHY price series

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WINDOW: usize = 24;
pub const BASE_PRICE_USD: f64 = 2.5;
pub const MAX_VARIATION: f64 = 0.2;
pub const USD_TO_EUR: f64 = 0.91;

/// Rolling window of simulated hourly prices.
///
/// Every tick appends `last + variation` with variation uniform in
/// `[-MAX_VARIATION, MAX_VARIATION)` and drops the oldest point.
#[derive(Debug, Clone)]
pub struct PriceFeed {
    rng: StdRng,
    points: VecDeque<f64>,
    change_pct: f64,
}

impl PriceFeed {
    /// Build a feed seeded with `seed`; the same seed yields the same series.
    pub fn new(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = (0..WINDOW)
            .map(|_| BASE_PRICE_USD + rng.gen_range(-MAX_VARIATION..MAX_VARIATION))
            .collect();
        Self {
            rng,
            points,
            change_pct: 0.0,
        }
    }

    /// Advance one step and return the new price.
    pub fn tick(&mut self) -> f64 {
        let last = self.current();
        let next = last + self.rng.gen_range(-MAX_VARIATION..MAX_VARIATION);
        self.change_pct = if last != 0.0 {
            (next - last) / last * 100.0
        } else {
            0.0
        };
        self.points.push_back(next);
        while self.points.len() > WINDOW {
            self.points.pop_front();
        }
        next
    }

    pub fn current(&self) -> f64 {
        self.points.back().copied().unwrap_or(BASE_PRICE_USD)
    }

    /// Percentage change produced by the last tick.
    pub fn change_pct(&self) -> f64 {
        self.change_pct
    }

    pub fn eur(&self) -> f64 {
        self.current() * USD_TO_EUR
    }

    pub fn points(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Series scaled to integer cents for the sparkline widget.
    pub fn sparkline(&self) -> Vec<u64> {
        self.points
            .iter()
            .map(|p| (p.max(0.0) * 100.0).round() as u64)
            .collect()
    }
}
