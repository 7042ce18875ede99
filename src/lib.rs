//! Stack Tower - A stack-the-blocks arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (oscillation, overlap, scoring, game state)
//! - `present`: Renderer / presentation traits and the event executor
//! - `renderer`: WebGPU rendering pipeline
//! - `settings`: Data-driven game tuning
//! - `audio`: Web Audio sound effects (wasm only)

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod present;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one oscillation step per frame on a 60 Hz display)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Horizontal distance the moving block travels per tick
    pub const OSCILLATION_SPEED: f32 = 0.075;
    /// World-space x beyond which the moving block turns around
    pub const OSCILLATION_BOUND: f32 = 6.0;

    /// Block defaults
    pub const INITIAL_BLOCK_WIDTH: f32 = 5.0;
    pub const BLOCK_HEIGHT: f32 = 1.0;
    pub const BLOCK_DEPTH: f32 = 5.0;

    /// |delta| below this counts as a perfect drop
    pub const PERFECT_TOLERANCE: f32 = 0.15;
    /// Overlap below this fraction of the previous width counts as a bad drop
    pub const BAD_RATIO: f32 = 0.4;

    /// How long the loading screen stays up before fading (ms)
    pub const LOADING_SCREEN_MS: i32 = 5000;
    /// Loading screen opacity fade duration (ms)
    pub const LOADING_FADE_MS: i32 = 600;

    /// Camera defaults
    pub const CAMERA_START: [f32; 3] = [8.0, 12.0, 14.0];
    pub const CAMERA_FOV_DEG: f32 = 60.0;
    pub const CAMERA_NEAR: f32 = 0.1;
    pub const CAMERA_FAR: f32 = 1000.0;
}

/// Convert an HSL color (h in degrees, s/l in 0..=1) to linear-ish RGB in 0..=1
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let h = h.rem_euclid(360.0) / 60.0;
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - (h % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}
