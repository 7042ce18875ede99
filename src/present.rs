//! Effect execution
//!
//! The simulation reports what happened as `GameEvent`s. Everything outside
//! it is reached through two collaborators:
//! - `Renderer`: scene objects and camera
//! - `Presentation`: score, hit feedback, game over screen

use crate::sim::{GameEvent, HitKind};

/// Scene side of the game. Blocks are addressed by simulation entity id.
pub trait Renderer {
    fn create_block(&mut self, id: u32, layer_height: f32, width: f32);
    fn dispose(&mut self, id: u32);
    fn set_position(&mut self, id: u32, x: f32);
    /// Horizontal scale relative to the width the block was created with
    fn set_scale(&mut self, id: u32, factor: f32);
    fn raise_camera(&mut self, delta_y: f32);
    fn reset_camera(&mut self);
}

/// HUD / overlay side of the game
pub trait Presentation {
    fn report_score(&mut self, score: u32);
    fn report_feedback(&mut self, kind: HitKind, combo: u32);
    fn report_game_over(&mut self, final_score: u32);
    /// Hide feedback and the game over screen (restart)
    fn clear(&mut self);
}

/// Forward a batch of events to the collaborators, in order
pub fn apply_events<R, P>(events: &[GameEvent], renderer: &mut R, presentation: &mut P)
where
    R: Renderer + ?Sized,
    P: Presentation + ?Sized,
{
    for event in events {
        match *event {
            GameEvent::BlockSpawned {
                id,
                y,
                center_x,
                width,
                ..
            } => {
                renderer.create_block(id, y, width);
                renderer.set_position(id, center_x);
            }
            GameEvent::BlockMoved { id, center_x } => renderer.set_position(id, center_x),
            GameEvent::BlockPlaced {
                id,
                center_x,
                scale,
                ..
            } => {
                renderer.set_scale(id, scale);
                renderer.set_position(id, center_x);
            }
            GameEvent::BlockDiscarded { id } | GameEvent::BlockRemoved { id } => {
                renderer.dispose(id)
            }
            GameEvent::CameraRaised { delta_y } => renderer.raise_camera(delta_y),
            GameEvent::CameraReset => renderer.reset_camera(),
            GameEvent::ScoreChanged { score } => presentation.report_score(score),
            GameEvent::Hit { kind, combo } => presentation.report_feedback(kind, combo),
            GameEvent::GameOver { final_score } => presentation.report_game_over(final_score),
            GameEvent::Restarted => presentation.clear(),
        }
    }
}

/// Presentation that writes to the log (native demo, headless runs)
#[derive(Debug, Default)]
pub struct LogPresentation {
    pub score: u32,
    pub last_feedback: Option<String>,
    pub final_score: Option<u32>,
}

impl Presentation for LogPresentation {
    fn report_score(&mut self, score: u32) {
        self.score = score;
        log::debug!("Score: {}", score);
    }

    fn report_feedback(&mut self, kind: HitKind, combo: u32) {
        let label = kind.label(combo);
        log::info!("{}", label);
        self.last_feedback = Some(label);
    }

    fn report_game_over(&mut self, final_score: u32) {
        log::info!("Your Score: {}", final_score);
        self.final_score = Some(final_score);
    }

    fn clear(&mut self) {
        self.last_feedback = None;
        self.final_score = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::GameSession;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn create_block(&mut self, id: u32, layer_height: f32, width: f32) {
            self.calls.push(format!("create {} {} {}", id, layer_height, width));
        }
        fn dispose(&mut self, id: u32) {
            self.calls.push(format!("dispose {}", id));
        }
        fn set_position(&mut self, id: u32, x: f32) {
            self.calls.push(format!("pos {} {}", id, x));
        }
        fn set_scale(&mut self, id: u32, factor: f32) {
            self.calls.push(format!("scale {} {}", id, factor));
        }
        fn raise_camera(&mut self, delta_y: f32) {
            self.calls.push(format!("raise {}", delta_y));
        }
        fn reset_camera(&mut self) {
            self.calls.push("reset".to_string());
        }
    }

    #[test]
    fn test_session_start_creates_two_blocks() {
        let mut events = Vec::new();
        GameSession::new(Tuning::default(), &mut events);
        let mut r = Recorder::default();
        let mut p = LogPresentation::default();
        apply_events(&events, &mut r, &mut p);
        assert_eq!(
            r.calls,
            vec!["create 1 0 5", "pos 1 0", "create 2 1 5", "pos 2 0"]
        );
    }

    #[test]
    fn test_drop_reaches_both_collaborators() {
        let mut events = Vec::new();
        let mut s = GameSession::new(Tuning::default(), &mut events);
        events.clear();
        s.drop_block(&mut events);

        let mut r = Recorder::default();
        let mut p = LogPresentation::default();
        apply_events(&events, &mut r, &mut p);

        assert_eq!(p.score, 1);
        assert_eq!(p.last_feedback.as_deref(), Some("PERFECT"));
        assert!(r.calls.contains(&"scale 2 1".to_string()));
        assert!(r.calls.contains(&"create 3 2 5".to_string()));
        assert_eq!(r.calls.last().map(String::as_str), Some("raise 1"));
    }

    #[test]
    fn test_game_over_and_restart() {
        let mut events = Vec::new();
        let mut s = GameSession::new(Tuning::default(), &mut events);
        events.clear();
        for _ in 0..80 {
            s.tick(&mut events);
        }
        s.drop_block(&mut events);
        s.restart(&mut events);

        let mut r = Recorder::default();
        let mut p = LogPresentation::default();
        apply_events(&events, &mut r, &mut p);

        assert!(r.calls.contains(&"dispose 2".to_string()));
        assert!(r.calls.contains(&"reset".to_string()));
        // Restart clears the game over screen again
        assert_eq!(p.final_score, None);
        assert_eq!(p.score, 0);
    }
}
