//! Cosmetic upload progress.
//!
//! Nothing here observes the real request. The simulator only animates
//! perceived progress after the upload attempts have already resolved.

use crate::config;
use rand::Rng;
use std::time::{Duration, Instant};

/// Source of time for the simulator. Tests drive it with a virtual clock.
pub trait Pace {
    /// Monotonic time since an arbitrary origin.
    fn now(&self) -> Duration;
    fn wait(&mut self, d: Duration);
}

pub struct RealPace {
    origin: Instant,
}

impl RealPace {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for RealPace {
    fn default() -> Self {
        Self::new()
    }
}

impl Pace for RealPace {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wait(&mut self, d: Duration) {
        std::thread::sleep(d);
    }
}

#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    pub tick: Duration,
    pub min_step: u8,
    pub max_step: u8,
    pub cap: u8,
    pub ceiling: Duration,
}

impl ProgressSimulator {
    pub fn from_config(cfg: &config::Progress) -> Self {
        let min_step = cfg.min_step.max(1);
        Self {
            tick: Duration::from_millis(cfg.tick_ms),
            min_step,
            max_step: cfg.max_step.max(min_step),
            cap: cfg.cap_percent.min(100),
            ceiling: Duration::from_millis(cfg.ceiling_ms),
        }
    }

    /// Advances from `start` by random steps until the next step would pass the cap
    /// or the wall-clock ceiling is reached. Returns the last reported percentage.
    pub fn run<R, F>(&self, start: u8, rng: &mut R, pace: &mut dyn Pace, mut on_tick: F) -> u8
    where
        R: Rng + ?Sized,
        F: FnMut(u8),
    {
        let started = pace.now();
        let mut percent = start.min(self.cap);

        while pace.now().saturating_sub(started) < self.ceiling {
            pace.wait(self.tick);
            let step = rng.gen_range(self.min_step..=self.max_step);
            if u16::from(percent) + u16::from(step) > u16::from(self.cap) {
                percent = self.cap;
                on_tick(percent);
                break;
            }
            percent += step;
            on_tick(percent);
        }
        percent
    }
}
