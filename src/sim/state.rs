//! Game state and core simulation types

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::span::Span;
use crate::settings::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Moving block oscillates, drops are accepted
    Playing,
    /// A drop missed the tower; only Restart leaves this phase
    GameOver,
}

/// Horizontal travel direction of the moving block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// -1.0 or +1.0
    #[inline]
    pub fn sign(&self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flipped(&self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// A block, either placed in the stack or still moving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Entity id, stable for the block's lifetime (renderer handle)
    pub id: u32,
    pub center_x: f32,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    /// Position in the stack; vertical placement is `layer_index * height`
    pub layer_index: u32,
}

impl Block {
    #[inline]
    pub fn span(&self) -> Span {
        Span::new(self.center_x, self.width)
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.layer_index as f32 * self.height
    }

    fn spawned_event(&self) -> GameEvent {
        GameEvent::BlockSpawned {
            id: self.id,
            layer: self.layer_index,
            y: self.y(),
            center_x: self.center_x,
            width: self.width,
        }
    }
}

/// Score, combo and direction for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u32,
    /// Consecutive perfect drops
    pub combo: u32,
    pub direction: Direction,
    pub phase: GamePhase,
    /// Width the next spawned moving block gets
    pub block_width: f32,
}

impl GameState {
    pub fn new(initial_width: f32) -> Self {
        Self {
            score: 0,
            combo: 0,
            direction: Direction::Right,
            phase: GamePhase::Playing,
            block_width: initial_width,
        }
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

/// One game session: the tower, the moving block and the run state.
///
/// Serialize-only: a session is always built by `new` so the stack is never empty.
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    pub tuning: Tuning,
    pub state: GameState,
    /// Placed blocks, bottom to top; `stack[i].layer_index == i`
    pub(crate) stack: Vec<Block>,
    pub(crate) moving: Option<Block>,
    next_id: u32,
}

impl GameSession {
    /// Start a session: base block plus the first moving block one layer up
    pub fn new(tuning: Tuning, events: &mut Vec<GameEvent>) -> Self {
        let mut session = Self {
            state: GameState::new(tuning.initial_width),
            tuning,
            stack: Vec::new(),
            moving: None,
            next_id: 1,
        };
        session.place_base(events);
        session.spawn_moving(events);
        session
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn stack(&self) -> &[Block] {
        &self.stack
    }

    /// Most recently placed block. The stack always holds at least the base.
    pub fn top(&self) -> &Block {
        &self.stack[self.stack.len() - 1]
    }

    pub fn moving(&self) -> Option<&Block> {
        self.moving.as_ref()
    }

    pub fn height(&self) -> usize {
        self.stack.len()
    }

    fn make_block(&mut self, layer_index: u32, width: f32) -> Block {
        Block {
            id: self.next_entity_id(),
            center_x: 0.0,
            width,
            depth: self.tuning.block_depth,
            height: self.tuning.block_height,
            layer_index,
        }
    }

    fn place_base(&mut self, events: &mut Vec<GameEvent>) {
        let base = self.make_block(0, self.tuning.initial_width);
        events.push(base.spawned_event());
        self.stack.push(base);
    }

    /// Spawn the moving block above the current top at the spawn point (x = 0)
    pub(crate) fn spawn_moving(&mut self, events: &mut Vec<GameEvent>) {
        let layer = self.stack.len() as u32;
        let block = self.make_block(layer, self.state.block_width);
        log::trace!("Spawned moving block {} at layer {}", block.id, layer);
        events.push(block.spawned_event());
        self.moving = Some(block);
    }

    /// Reset to a fresh run: base block only, no moving block until the next drop
    pub fn restart(&mut self, events: &mut Vec<GameEvent>) {
        for block in self.stack.drain(..) {
            events.push(GameEvent::BlockRemoved { id: block.id });
        }
        if let Some(block) = self.moving.take() {
            events.push(GameEvent::BlockRemoved { id: block.id });
        }

        self.state = GameState::new(self.tuning.initial_width);
        self.place_base(events);

        events.push(GameEvent::CameraReset);
        events.push(GameEvent::ScoreChanged { score: 0 });
        events.push(GameEvent::Restarted);
        log::info!("Game restarted");
    }

    /// Advance the moving block one step
    pub fn tick(&mut self, events: &mut Vec<GameEvent>) {
        super::tick::tick(self, events);
    }

    /// Player drop action
    pub fn drop_block(&mut self, events: &mut Vec<GameEvent>) -> super::drop::DropOutcome {
        super::drop::drop_block(self, events)
    }
}
