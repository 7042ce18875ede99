//! Simulation output
//!
//! The simulation never touches the renderer, DOM or audio. Each transition
//! appends `GameEvent`s to a caller-owned buffer; `crate::present` turns them
//! into renderer and presentation calls.

use serde::{Deserialize, Serialize};

/// Quality of a surviving drop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitKind {
    Perfect,
    Good,
    Bad,
}

impl HitKind {
    /// Feedback text shown for this hit at the given combo
    pub fn label(&self, combo: u32) -> String {
        match self {
            HitKind::Perfect if combo > 1 => format!("COMBO x{}", combo),
            HitKind::Perfect => "PERFECT".to_string(),
            HitKind::Good => "GOOD".to_string(),
            HitKind::Bad => "BAD".to_string(),
        }
    }

    /// CSS class for the feedback element
    pub fn css_class(&self, combo: u32) -> &'static str {
        match self {
            HitKind::Perfect if combo > 1 => "feedback-combo",
            HitKind::Perfect => "feedback-perfect",
            HitKind::Good => "feedback-good",
            HitKind::Bad => "feedback-bad",
        }
    }
}

/// One effect for the outside world to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new block entered the scene (base or moving)
    BlockSpawned {
        id: u32,
        layer: u32,
        y: f32,
        center_x: f32,
        width: f32,
    },
    /// Moving block changed position
    BlockMoved { id: u32, center_x: f32 },
    /// Moving block landed; `scale` is `width` relative to its spawn width
    BlockPlaced {
        id: u32,
        center_x: f32,
        width: f32,
        scale: f32,
    },
    /// Moving block missed the tower and was thrown away
    BlockDiscarded { id: u32 },
    /// Block removed on restart
    BlockRemoved { id: u32 },
    CameraRaised { delta_y: f32 },
    CameraReset,
    ScoreChanged { score: u32 },
    Hit { kind: HitKind, combo: u32 },
    GameOver { final_score: u32 },
    Restarted,
}
