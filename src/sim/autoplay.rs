//! Demo player
//!
//! Aims at the top block's center plus a random error and drops when the
//! moving block reaches the aim point. The error scales with the current
//! width so runs eventually end.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{GamePhase, GameSession};

/// Fraction of the top block's width the aim error is drawn from (±)
pub const DEFAULT_AIM_SPREAD: f32 = 0.35;

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    rng: Pcg32,
    spread: f32,
    /// Current aim offset from the top block's center
    aim_offset: f32,
}

impl AutoPlayer {
    pub fn new(seed: u64) -> Self {
        Self::with_spread(seed, DEFAULT_AIM_SPREAD)
    }

    pub fn with_spread(seed: u64, spread: f32) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            spread: spread.max(0.0),
            aim_offset: 0.0,
        }
    }

    /// Decide whether to drop this step. Also asks for the catch-up spawn
    /// after a restart so demo mode keeps running.
    pub fn wants_drop(&mut self, session: &GameSession) -> bool {
        if session.state.phase != GamePhase::Playing {
            return false;
        }
        let Some(moving) = session.moving() else {
            return true;
        };

        // Keep the aim point inside the oscillation range or it is never reached
        let reach = session.tuning.bound - session.tuning.speed;
        let target = (session.top().center_x + self.aim_offset).clamp(-reach, reach);
        // Within half a step of the target: the next tick would pass it
        let hit = (moving.center_x - target).abs() <= session.tuning.speed / 2.0;
        if hit {
            self.reroll(session.top().width);
        }
        hit
    }

    fn reroll(&mut self, width: f32) {
        let reach = width * self.spread;
        self.aim_offset = if reach > 0.0 {
            self.rng.random_range(-reach..=reach)
        } else {
            0.0
        };
    }
}
