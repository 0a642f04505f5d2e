use super::*;

use crate::constants::{
    CONTINUATION_BONUS, HISTORY_EXCLUSION_WINDOW, HISTORY_PENALTY_WINDOW, PROGRESS_BONUS,
    REVISIT_PENALTY,
};
use crate::maze::MazeStep;

/// Which way the scored heuristic pulls relative to the reference positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Pursuit {
    /// Maximise distance to the nearest reference position.
    Flee,
    /// Minimise it.
    Chase,
}

fn nearest_distance(maze: &Maze, from: GridPos, others: &[GridPos]) -> f32 {
    others
        .iter()
        .map(|&other| maze.distance(from, other))
        .fold(f32::INFINITY, f32::min)
}

fn score_step(
    maze: &Maze,
    character: &Character,
    dir: Direction,
    step: MazeStep,
    others: &[GridPos],
    pursuit: Pursuit,
) -> f32 {
    let distance = nearest_distance(maze, step.cell, others);
    let current = nearest_distance(maze, character.grid_pos, others);

    let mut score = match pursuit {
        Pursuit::Flee => distance,
        Pursuit::Chase => -distance,
    };
    if character.last_direction == Some(dir) {
        score += CONTINUATION_BONUS;
    }
    if character
        .recent(HISTORY_PENALTY_WINDOW)
        .any(|&pos| pos == step.cell)
    {
        score -= REVISIT_PENALTY;
    }
    let progressed = match pursuit {
        Pursuit::Flee => distance > current,
        Pursuit::Chase => distance < current,
    };
    if progressed {
        score += PROGRESS_BONUS;
    }
    score
}

/// Picks the next step for an AI-driven character resting on its cell.
///
/// Reversal and recently visited cells are filtered out unless nothing else
/// is left. With probability `difficulty` the best scored candidate wins
/// (first in `Direction::ALL` order on ties); otherwise a random candidate is
/// taken, preferring cells outside the two newest history entries. `None`
/// only when no neighbor is walkable.
pub(super) fn choose_move(
    maze: &Maze,
    character: &Character,
    others: &[GridPos],
    pursuit: Pursuit,
    difficulty: f32,
    rng: &mut Rng,
) -> Option<(Direction, MazeStep)> {
    let mut candidates = maze.walkable_steps(character.grid_pos);
    if candidates.is_empty() {
        return None;
    }

    if let Some(last) = character.last_direction {
        let forward: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|&(dir, _)| dir != last.opposite())
            .collect();
        if !forward.is_empty() {
            candidates = forward;
        }
    }

    let fresh: Vec<_> = candidates
        .iter()
        .copied()
        .filter(|&(_, step)| {
            !character
                .recent(HISTORY_EXCLUSION_WINDOW)
                .any(|&pos| pos == step.cell)
        })
        .collect();
    if !fresh.is_empty() {
        candidates = fresh;
    }

    if !others.is_empty() && rng.chance(difficulty) {
        let mut best: Option<((Direction, MazeStep), f32)> = None;
        for &(dir, step) in &candidates {
            let score = score_step(maze, character, dir, step, others, pursuit);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some(((dir, step), score));
            }
        }
        return best.map(|(choice, _)| choice);
    }

    let unvisited: Vec<_> = candidates
        .iter()
        .copied()
        .filter(|&(_, step)| {
            !character
                .recent(HISTORY_PENALTY_WINDOW)
                .any(|&pos| pos == step.cell)
        })
        .collect();
    let pool = if unvisited.is_empty() {
        &candidates
    } else {
        &unvisited
    };
    rng.pick(pool).copied()
}

impl GameEngine {
    /// Fugitives flee every chaser, player-controlled or idle.
    pub(super) fn choose_fugitive_move(&mut self, idx: usize) -> Option<(Direction, MazeStep)> {
        let threats: Vec<GridPos> = self
            .chasers
            .iter()
            .map(|chaser| chaser.character.grid_pos)
            .collect();
        let difficulty = self.effective_ai_difficulty();
        let choice = choose_move(
            &self.maze,
            &self.fugitives[idx].character,
            &threats,
            Pursuit::Flee,
            difficulty,
            &mut self.rng,
        );
        if let Some((_, step)) = choice {
            self.fugitives[idx].character.remember(step.cell);
        }
        choice
    }

    /// Unclaimed chasers hunt the uncaught fugitives when chaser AI is on.
    pub(super) fn choose_chaser_ai_move(&mut self, idx: usize) -> Option<(Direction, MazeStep)> {
        let targets: Vec<GridPos> = self
            .fugitives
            .iter()
            .filter(|fugitive| !fugitive.caught)
            .map(|fugitive| fugitive.character.grid_pos)
            .collect();
        let choice = choose_move(
            &self.maze,
            &self.chasers[idx].character,
            &targets,
            Pursuit::Chase,
            self.config.ai_difficulty,
            &mut self.rng,
        );
        if let Some((_, step)) = choice {
            self.chasers[idx].character.remember(step.cell);
        }
        choice
    }
}
