//! Fixed timestep simulation tick
//!
//! Advances the moving block and applies queued player input.

use super::autoplay::AutoPlayer;
use super::drop::DropOutcome;
use super::events::GameEvent;
use super::state::{GamePhase, GameSession};

/// Input commands for a single step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Drop the moving block (click/tap/space)
    pub drop: bool,
    /// Restart the run (restart button)
    pub restart: bool,
    /// Let the demo player decide drops (persists across steps)
    pub autoplay: bool,
}

/// Move the moving block by `speed * direction`, reversing past ±bound
pub fn tick(session: &mut GameSession, events: &mut Vec<GameEvent>) {
    if session.state.phase != GamePhase::Playing {
        return;
    }

    let speed = session.tuning.speed;
    let bound = session.tuning.bound;
    let direction = session.state.direction;

    let Some(block) = session.moving.as_mut() else {
        return;
    };

    block.center_x += speed * direction.sign();
    if block.center_x > bound || block.center_x < -bound {
        session.state.direction = direction.flipped();
    }

    events.push(GameEvent::BlockMoved {
        id: block.id,
        center_x: block.center_x,
    });
}

/// Apply one step of input, then advance the moving block.
///
/// Restart is handled before drop so a restart+drop in the same step
/// performs the catch-up spawn. With `autoplay` set, `autoplayer` may add a
/// drop. Returns the drop outcome if a drop was requested.
pub fn step(
    session: &mut GameSession,
    input: &TickInput,
    autoplayer: &mut AutoPlayer,
    events: &mut Vec<GameEvent>,
) -> Option<DropOutcome> {
    if input.restart {
        session.restart(events);
    }

    let drop = input.drop || (input.autoplay && autoplayer.wants_drop(session));
    let outcome = drop.then(|| session.drop_block(events));

    tick(session, events);
    outcome
}
