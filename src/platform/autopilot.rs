//! Demo autopilot
//!
//! Produces direction intents for the headless binary: breadth-first search
//! on the wrapped grid toward the bonus (or the fruit), treating body cells
//! and the space around enemies as walls.

use std::collections::{HashSet, VecDeque};

use glam::IVec2;

use crate::consts::{BLOCK, GRID_CELLS};
use crate::sim::{Direction, GameState, IRect};
use crate::wrap_cell;

/// Stateless steering helper
#[derive(Debug, Default, Clone, Copy)]
pub struct Autopilot;

impl Autopilot {
    /// Direction to take on the next step, if any move looks safe
    pub fn steer(&self, state: &GameState) -> Option<Direction> {
        let head = state.snake.head();
        let target = state.bonus.map(|b| b.cell).unwrap_or(state.fruit.cell);
        let blocked = blocked_cells(state);
        let heading = state.snake.direction;

        let first_moves = Direction::ALL
            .into_iter()
            .filter(|&d| d != heading.opposite())
            .map(|d| (d, wrap_cell(head + d.delta())))
            .filter(|(_, cell)| !blocked.contains(cell));

        let mut seen: HashSet<IVec2> = HashSet::from([head]);
        let mut queue: VecDeque<(IVec2, Direction)> = VecDeque::new();
        let mut fallback = None;
        for (dir, cell) in first_moves {
            // Prefer keeping the heading when nothing better turns up
            if fallback.is_none() || dir == heading {
                fallback = Some(dir);
            }
            if seen.insert(cell) {
                queue.push_back((cell, dir));
            }
        }

        while let Some((cell, first)) = queue.pop_front() {
            if cell == target {
                return Some(first);
            }
            for d in Direction::ALL {
                let next = wrap_cell(cell + d.delta());
                if !blocked.contains(&next) && seen.insert(next) {
                    queue.push_back((next, first));
                }
            }
        }
        fallback
    }
}

/// Cells the snake should not enter: the whole body (the step tests the
/// tail before it moves) plus a one-cell margin around enemies and
/// pending telegraphs
fn blocked_cells(state: &GameState) -> HashSet<IVec2> {
    let mut blocked: HashSet<IVec2> = state.snake.body.iter().copied().collect();

    let danger: Vec<IRect> = state
        .enemies
        .iter()
        .map(|e| e.rect())
        .chain(
            state
                .indicators
                .iter()
                .filter_map(|i| i.payload.as_ref().map(|e| e.rect())),
        )
        .map(|r| IRect::new(r.min - IVec2::splat(BLOCK), r.size + IVec2::splat(2 * BLOCK)))
        .collect();
    if danger.is_empty() {
        return blocked;
    }
    for x in 0..GRID_CELLS {
        for y in 0..GRID_CELLS {
            let cell = IVec2::new(x, y);
            let rect = IRect::cell(cell);
            if danger.iter().any(|d| d.overlaps(&rect)) {
                blocked.insert(cell);
            }
        }
    }
    blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::sim::{BonusFruit, RippleEnemy, step};

    #[test]
    fn test_heads_toward_fruit() {
        let mut state = GameState::new(3);
        state.fruit.cell = IVec2::new(10, 2);
        assert_eq!(Autopilot.steer(&state), Some(Direction::Up));

        state.fruit.cell = IVec2::new(14, 5);
        assert_eq!(Autopilot.steer(&state), Some(Direction::Right));
    }

    #[test]
    fn test_prefers_bonus() {
        let mut state = GameState::new(3);
        state.fruit.cell = IVec2::new(14, 5);
        state.bonus = Some(BonusFruit {
            cell: IVec2::new(10, 9),
            timer: 3.0,
        });
        assert_eq!(Autopilot.steer(&state), Some(Direction::Down));
    }

    #[test]
    fn test_never_reverses() {
        let mut state = GameState::new(3);
        // Fruit directly behind the snake
        state.fruit.cell = IVec2::new(5, 5);
        let dir = Autopilot.steer(&state);
        assert!(dir.is_some());
        assert_ne!(dir, Some(Direction::Left));
    }

    #[test]
    fn test_routes_around_enemy() {
        let mut state = GameState::new(3);
        state.fruit.cell = IVec2::new(14, 5);
        state.enemies.push(RippleEnemy {
            pos: crate::cell_center(IVec2::new(12, 5)),
            speed: 0.0,
            size: 12,
            color: Rgb::new(255, 0, 0),
            age: 0.0,
            warmup: 0.55,
        });
        let dir = Autopilot.steer(&state);
        assert!(matches!(dir, Some(Direction::Up) | Some(Direction::Down)));
    }

    #[test]
    fn test_demo_run_survives_a_while() {
        let mut state = GameState::new(11);
        for _ in 0..200 {
            if let Some(dir) = Autopilot.steer(&state) {
                crate::sim::queue_direction(&mut state, dir);
            }
            step(&mut state);
            if !state.is_running() {
                break;
            }
        }
        assert!(state.score > 0);
    }
}
