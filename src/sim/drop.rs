//! Drop resolution
//!
//! Lands the moving block on the tower: overlap, hit quality, trim, score,
//! next spawn. A miss ends the run.

use super::events::{GameEvent, HitKind};
use super::state::{GamePhase, GameSession};
use crate::settings::Tuning;

/// Result of a drop request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropOutcome {
    /// Block landed and was trimmed to `width`
    Placed { kind: HitKind, combo: u32, width: f32 },
    /// Block missed; run is over
    GameOver { final_score: u32 },
    /// No moving block existed; one was spawned instead (nothing scored)
    Spawned,
    /// Run already over
    Ignored,
}

/// Classify a surviving drop.
///
/// `previous_width` is the width of the block landed on, before trimming.
/// Rules are checked in order: perfect, bad, good.
pub fn classify_hit(delta: f32, overlap: f32, previous_width: f32, tuning: &Tuning) -> HitKind {
    if delta.abs() < tuning.perfect_tolerance {
        HitKind::Perfect
    } else if overlap < previous_width * tuning.bad_ratio {
        HitKind::Bad
    } else {
        HitKind::Good
    }
}

/// Resolve the player's drop
pub fn drop_block(session: &mut GameSession, events: &mut Vec<GameEvent>) -> DropOutcome {
    if session.state.phase == GamePhase::GameOver {
        return DropOutcome::Ignored;
    }

    let Some(mut block) = session.moving.take() else {
        session.spawn_moving(events);
        return DropOutcome::Spawned;
    };

    let below = session.top().span();
    let previous_width = below.width;
    let delta = below.delta_to(&block.span());

    let Some(landed) = below.intersect(&block.span()) else {
        let final_score = session.state.score;
        session.state.phase = GamePhase::GameOver;
        session.state.combo = 0;
        log::info!(
            "Game over: missed by {:.3} at layer {}, final score {}",
            -below.overlap_at(delta),
            block.layer_index,
            final_score
        );
        events.push(GameEvent::BlockDiscarded { id: block.id });
        events.push(GameEvent::GameOver { final_score });
        return DropOutcome::GameOver { final_score };
    };
    let overlap = landed.width;

    let kind = classify_hit(delta, overlap, previous_width, &session.tuning);
    session.state.combo = match kind {
        HitKind::Perfect => session.state.combo + 1,
        HitKind::Good | HitKind::Bad => 0,
    };
    let combo = session.state.combo;

    let spawn_width = block.width;
    block.width = landed.width;
    block.center_x = landed.center;
    block.layer_index = session.stack.len() as u32;
    session.state.block_width = overlap;

    log::debug!(
        "Drop {:?} (combo {}): delta {:.3}, width {:.3} -> {:.3}",
        kind,
        combo,
        delta,
        previous_width,
        overlap
    );

    events.push(GameEvent::Hit { kind, combo });
    events.push(GameEvent::BlockPlaced {
        id: block.id,
        center_x: block.center_x,
        width: overlap,
        scale: overlap / spawn_width,
    });
    session.stack.push(block);

    session.state.score += 1;
    events.push(GameEvent::ScoreChanged {
        score: session.state.score,
    });

    session.spawn_moving(events);
    events.push(GameEvent::CameraRaised {
        delta_y: session.tuning.block_height,
    });

    DropOutcome::Placed {
        kind,
        combo,
        width: overlap,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_moving_at(x: f32) -> GameSession {
        let mut events = Vec::new();
        let mut s = GameSession::new(Tuning::default(), &mut events);
        s.moving.as_mut().unwrap().center_x = x;
        s
    }

    #[test]
    fn test_perfect_drop_trims_and_recenters() {
        let mut s = session_with_moving_at(0.1);
        let mut events = Vec::new();
        let outcome = s.drop_block(&mut events);

        match outcome {
            DropOutcome::Placed { kind, combo, width } => {
                assert_eq!(kind, HitKind::Perfect);
                assert_eq!(combo, 1);
                assert!((width - 4.9).abs() < 1e-6);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        let placed = s.top();
        assert_eq!(placed.layer_index, 1);
        assert!((placed.width - 4.9).abs() < 1e-6);
        assert!((placed.center_x - 0.05).abs() < 1e-6);
        assert_eq!(s.state.score, 1);
    }

    #[test]
    fn test_bad_drop_resets_combo() {
        let mut s = session_with_moving_at(4.9);
        s.state.combo = 4;
        let mut events = Vec::new();
        let outcome = s.drop_block(&mut events);

        assert!(matches!(
            outcome,
            DropOutcome::Placed {
                kind: HitKind::Bad,
                combo: 0,
                ..
            }
        ));
        assert_eq!(s.state.combo, 0);
        assert!((s.top().width - 0.1).abs() < 1e-5);
        assert!((s.top().center_x - 2.45).abs() < 1e-5);
    }

    #[test]
    fn test_good_drop() {
        let mut s = session_with_moving_at(-1.0);
        s.state.combo = 2;
        let mut events = Vec::new();
        let outcome = s.drop_block(&mut events);
        assert!(matches!(
            outcome,
            DropOutcome::Placed {
                kind: HitKind::Good,
                combo: 0,
                ..
            }
        ));
        assert!((s.top().center_x + 0.5).abs() < 1e-6);
        assert!((s.top().width - 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_miss_ends_game_without_scoring() {
        let mut s = session_with_moving_at(5.1);
        s.state.score = 3;
        s.state.combo = 2;
        let mut events = Vec::new();
        let outcome = s.drop_block(&mut events);

        assert_eq!(outcome, DropOutcome::GameOver { final_score: 3 });
        assert_eq!(s.state.phase, GamePhase::GameOver);
        assert_eq!(s.stack().len(), 1);
        assert_eq!(s.state.score, 3);
        assert_eq!(s.state.combo, 0);
        assert!(s.moving().is_none());
        assert!(events.iter().any(|e| matches!(e, GameEvent::BlockDiscarded { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::ScoreChanged { .. })));
    }

    #[test]
    fn test_exact_edge_is_a_miss() {
        let mut s = session_with_moving_at(-5.0);
        let mut events = Vec::new();
        assert!(matches!(
            s.drop_block(&mut events),
            DropOutcome::GameOver { .. }
        ));
    }

    #[test]
    fn test_drop_after_game_over_is_ignored() {
        let mut s = session_with_moving_at(5.5);
        let mut events = Vec::new();
        s.drop_block(&mut events);
        events.clear();
        assert_eq!(s.drop_block(&mut events), DropOutcome::Ignored);
        assert!(events.is_empty());
    }

    #[test]
    fn test_next_block_inherits_width_at_spawn_point() {
        let mut s = session_with_moving_at(1.0);
        let mut events = Vec::new();
        s.drop_block(&mut events);

        let next = s.moving().unwrap();
        assert_eq!(next.layer_index, 2);
        assert_eq!(next.center_x, 0.0);
        assert!((next.width - 4.0).abs() < 1e-6);
        assert_eq!(next.y(), 2.0);
        assert!(events.contains(&GameEvent::CameraRaised { delta_y: 1.0 }));
    }

    #[test]
    fn test_placed_event_scale_is_relative_to_spawn_width() {
        let mut s = session_with_moving_at(1.0);
        let mut events = Vec::new();
        s.drop_block(&mut events);
        let scale = events.iter().find_map(|e| match e {
            GameEvent::BlockPlaced { scale, .. } => Some(*scale),
            _ => None,
        });
        assert!((scale.unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_drop_without_moving_block_spawns_catch_up() {
        let mut s = session_with_moving_at(0.0);
        let mut events = Vec::new();
        s.restart(&mut events);
        events.clear();

        assert_eq!(s.drop_block(&mut events), DropOutcome::Spawned);
        assert_eq!(s.state.score, 0);
        assert_eq!(s.stack().len(), 1);
        let moving = s.moving().unwrap();
        assert_eq!(moving.layer_index, 1);
        assert_eq!(moving.width, 5.0);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_combo_builds_on_consecutive_perfects() {
        let mut s = session_with_moving_at(0.0);
        let mut events = Vec::new();
        for expected in 1..=3 {
            let outcome = s.drop_block(&mut events);
            assert!(matches!(
                outcome,
                DropOutcome::Placed {
                    kind: HitKind::Perfect,
                    combo,
                    ..
                } if combo == expected
            ));
        }
        assert_eq!(s.state.score, 3);
        assert_eq!(s.top().width, 5.0);
    }

    #[test]
    fn test_classify_uses_previous_width() {
        let t = Tuning::default();
        // 1.9 < 5 * 0.4 = 2.0 -> bad, even though 1.9 >= 1.9 * 0.4
        assert_eq!(classify_hit(3.1, 1.9, 5.0, &t), HitKind::Bad);
        assert_eq!(classify_hit(2.5, 2.5, 5.0, &t), HitKind::Good);
        // Perfect wins over bad
        assert_eq!(classify_hit(0.14, 0.5, 5.0, &t), HitKind::Perfect);
    }
}
