//! Property tests for the session state machine.
//!
//! Sessions are driven only through the public API (ticks and drops), with
//! generated tick counts between drops.

use proptest::prelude::*;
use stack_tower::Tuning;
use stack_tower::sim::{
    Direction, DropOutcome, GameEvent, GamePhase, GameSession, GameState, HitKind,
};

fn new_session() -> GameSession {
    let mut events = Vec::new();
    GameSession::new(Tuning::default(), &mut events)
}

fn assert_stack_invariants(session: &GameSession) {
    let stack = session.stack();
    assert!(!stack.is_empty());
    assert_eq!(stack[0].center_x, 0.0);
    assert_eq!(stack[0].width, session.tuning.initial_width);
    for (i, block) in stack.iter().enumerate() {
        assert_eq!(block.layer_index as usize, i);
        assert!(block.width > 0.0);
    }
    for pair in stack.windows(2) {
        assert!(pair[1].width <= pair[0].width + 1e-6);
    }
}

proptest! {
    #[test]
    fn oscillation_stays_near_bounds(ticks in 0usize..2_000) {
        let mut session = new_session();
        let mut events = Vec::new();
        let speed = session.tuning.speed;
        let bound = session.tuning.bound;

        for _ in 0..ticks {
            let before = session.moving().unwrap().center_x;
            let dir = session.state.direction;
            session.tick(&mut events);
            let after = session.moving().unwrap().center_x;

            prop_assert!((after - before - speed * dir.sign()).abs() < 1e-5);
            prop_assert!(after.abs() <= bound + speed + 1e-4);

            let crossed = after > bound || after < -bound;
            if crossed {
                prop_assert_eq!(session.state.direction, dir.flipped());
            } else {
                prop_assert_eq!(session.state.direction, dir);
            }
            if dir == Direction::Right && before + speed <= bound {
                prop_assert!(after > before);
            }
        }
    }

    #[test]
    fn drops_follow_overlap_rules(gaps in prop::collection::vec(0usize..200, 1..40)) {
        let mut session = new_session();
        let mut events = Vec::new();

        for gap in gaps {
            if session.state.is_over() {
                break;
            }
            for _ in 0..gap {
                session.tick(&mut events);
            }

            let last = session.top().clone();
            let moving = session.moving().unwrap().clone();
            let delta = moving.center_x - last.center_x;
            let overlap = last.width - delta.abs();
            let score = session.state.score;
            let height = session.height();
            let combo = session.state.combo;

            match session.drop_block(&mut events) {
                DropOutcome::GameOver { final_score } => {
                    prop_assert!(overlap <= 0.0);
                    prop_assert_eq!(final_score, score);
                    prop_assert_eq!(session.state.score, score);
                    prop_assert_eq!(session.height(), height);
                    prop_assert_eq!(session.state.phase, GamePhase::GameOver);
                    prop_assert_eq!(session.state.combo, 0);
                    prop_assert!(session.moving().is_none());
                }
                DropOutcome::Placed { kind, combo: new_combo, width } => {
                    prop_assert!(overlap > 0.0);
                    prop_assert_eq!(session.state.score, score + 1);
                    prop_assert_eq!(session.height(), height + 1);
                    prop_assert!((width - overlap).abs() < 1e-5);

                    let placed = session.top();
                    prop_assert!((placed.center_x - (moving.center_x - delta / 2.0)).abs() < 1e-5);
                    prop_assert_eq!(placed.id, moving.id);

                    match kind {
                        HitKind::Perfect => {
                            prop_assert!(delta.abs() < session.tuning.perfect_tolerance);
                            prop_assert_eq!(new_combo, combo + 1);
                        }
                        HitKind::Bad => {
                            prop_assert!(overlap < last.width * session.tuning.bad_ratio);
                            prop_assert_eq!(new_combo, 0);
                        }
                        HitKind::Good => prop_assert_eq!(new_combo, 0),
                    }

                    let next = session.moving().unwrap();
                    prop_assert_eq!(next.center_x, 0.0);
                    prop_assert_eq!(next.layer_index as usize, session.height());
                    prop_assert!((next.width - overlap).abs() < 1e-5);
                }
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }

            assert_stack_invariants(&session);
        }
    }

    #[test]
    fn restart_always_yields_initial_state(gaps in prop::collection::vec(0usize..200, 0..20)) {
        let mut session = new_session();
        let mut events = Vec::new();
        for gap in gaps {
            for _ in 0..gap {
                session.tick(&mut events);
            }
            session.drop_block(&mut events);
        }

        session.restart(&mut events);
        session.restart(&mut events);

        prop_assert_eq!(&session.state, &GameState::new(5.0));
        prop_assert_eq!(session.state.direction, Direction::Right);
        prop_assert_eq!(session.height(), 1);
        prop_assert_eq!(session.top().width, 5.0);
        prop_assert!(session.moving().is_none());
    }
}

#[test]
fn miss_never_emits_score() {
    let mut session = new_session();
    let mut events = Vec::new();
    // 5.1 is past the right edge of the base
    for _ in 0..68 {
        session.tick(&mut events);
    }
    events.clear();
    let outcome = session.drop_block(&mut events);

    assert!(matches!(outcome, DropOutcome::GameOver { final_score: 0 }));
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, GameEvent::ScoreChanged { .. } | GameEvent::Hit { .. }))
    );
}

#[test]
fn full_run_then_restart_and_continue() {
    let mut session = new_session();
    let mut events = Vec::new();

    // Perfect drop at the spawn point
    assert!(matches!(
        session.drop_block(&mut events),
        DropOutcome::Placed {
            kind: HitKind::Perfect,
            combo: 1,
            ..
        }
    ));
    // Miss far to the right
    for _ in 0..75 {
        session.tick(&mut events);
    }
    assert!(matches!(
        session.drop_block(&mut events),
        DropOutcome::GameOver { final_score: 1 }
    ));
    assert_eq!(session.drop_block(&mut events), DropOutcome::Ignored);

    session.restart(&mut events);
    assert_eq!(session.drop_block(&mut events), DropOutcome::Spawned);
    assert!(matches!(
        session.drop_block(&mut events),
        DropOutcome::Placed {
            kind: HitKind::Perfect,
            ..
        }
    ));
    assert_eq!(session.state.score, 1);
}
