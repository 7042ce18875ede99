//! Game tuning
//!
//! Every gameplay constant a session reads comes from here. Defaults match
//! `crate::consts`; overrides arrive as JSON (a `<script id="tuning">` block
//! on web, a file path on native). Nothing is persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Gameplay tuning for one session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Moving block displacement per tick (world units)
    pub speed: f32,
    /// |x| past which the moving block reverses
    pub bound: f32,
    /// |delta| below this is a perfect drop
    pub perfect_tolerance: f32,
    /// Overlap below `previous_width * bad_ratio` is a bad drop
    pub bad_ratio: f32,
    /// Width of the base block and of the first moving block
    pub initial_width: f32,
    pub block_height: f32,
    pub block_depth: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            speed: OSCILLATION_SPEED,
            bound: OSCILLATION_BOUND,
            perfect_tolerance: PERFECT_TOLERANCE,
            bad_ratio: BAD_RATIO,
            initial_width: INITIAL_BLOCK_WIDTH,
            block_height: BLOCK_HEIGHT,
            block_depth: BLOCK_DEPTH,
        }
    }
}

/// Why a tuning override was rejected
#[derive(Error, Debug)]
pub enum TuningError {
    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("tuning field `{field}` must be > 0 (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("tuning field `bad_ratio` must be in (0, 1] (got {0})")]
    BadRatioOutOfRange(f32),
}

impl Tuning {
    /// Parse and validate a JSON override. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse an override, falling back to defaults (with a warning) on any error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                log::info!("Loaded tuning override: {:?}", tuning);
                tuning
            }
            Err(e) => {
                log::warn!("Ignoring tuning override: {}", e);
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("speed", self.speed),
            ("bound", self.bound),
            ("perfect_tolerance", self.perfect_tolerance),
            ("initial_width", self.initial_width),
            ("block_height", self.block_height),
            ("block_depth", self.block_depth),
        ];
        for (field, value) in positive {
            // NaN fails this too
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }
        if !(self.bad_ratio > 0.0 && self.bad_ratio <= 1.0) {
            return Err(TuningError::BadRatioOutOfRange(self.bad_ratio));
        }
        Ok(())
    }

    /// Load the web override from `<script id="tuning" type="application/json">`
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let json = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("tuning"))
            .and_then(|el| el.text_content());

        match json {
            Some(json) if !json.trim().is_empty() => Self::from_json_or_default(&json),
            _ => {
                log::info!("Using default tuning");
                Self::default()
            }
        }
    }
}
