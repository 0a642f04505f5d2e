use super::*;

use crate::constants::{step_distance, ARRIVAL_EPSILON};
use crate::maze::MazeStep;

/// Moves `character` toward the pixel-center of its target. Returns true when
/// it rests on its grid cell afterwards, either because it was not moving or
/// because it arrived this tick. Landing on a teleport cell relocates it to the
/// paired cell before returning.
fn interpolate(character: &mut Character, maze: &Maze, step: f32) -> bool {
    if !character.is_moving() {
        return true;
    }
    let target = maze.pixel_center(character.target_pos);
    let remaining = character.pixel_pos.distance_to(target);
    if remaining <= step + ARRIVAL_EPSILON {
        character.pixel_pos = target;
        character.grid_pos = character.target_pos;
        if let Some(partner) = maze.teleport_partner(character.grid_pos) {
            character.relocate(partner, maze);
        }
        return true;
    }
    let ratio = step / remaining;
    character.pixel_pos.x += (target.x - character.pixel_pos.x) * ratio;
    character.pixel_pos.y += (target.y - character.pixel_pos.y) * ratio;
    false
}

fn begin_step(character: &mut Character, maze: &Maze, dir: Direction, step: MazeStep) {
    character.last_direction = Some(dir);
    if step.wrapped {
        character.relocate(step.cell, maze);
    } else {
        character.target_pos = step.cell;
    }
}

impl GameEngine {
    pub(super) fn advance_characters(&mut self) {
        let fugitive_step = step_distance(self.config.fugitive_speed);
        let chaser_step = step_distance(self.config.chaser_speed);

        for idx in 0..self.fugitives.len() {
            if self.fugitives[idx].caught {
                continue;
            }
            self.advance_fugitive(idx, fugitive_step);
        }
        for idx in 0..self.chasers.len() {
            self.advance_chaser(idx, chaser_step);
        }
    }

    fn advance_fugitive(&mut self, idx: usize, step: f32) {
        if !interpolate(&mut self.fugitives[idx].character, &self.maze, step) {
            return;
        }
        match self.choose_fugitive_move(idx) {
            Some((dir, maze_step)) => {
                begin_step(&mut self.fugitives[idx].character, &self.maze, dir, maze_step)
            }
            None => {
                self.fugitives[idx].character.history.clear();
            }
        }
    }

    fn advance_chaser(&mut self, idx: usize, step: f32) {
        let controlled = self.chasers[idx].controlling_player_id.is_some();
        if controlled {
            self.apply_reversal(idx);
        }
        if !interpolate(&mut self.chasers[idx].character, &self.maze, step) {
            return;
        }

        let next = if controlled {
            self.next_player_move(idx)
        } else if self.config.chaser_ai {
            self.choose_chaser_ai_move(idx)
        } else {
            None
        };
        if let Some((dir, maze_step)) = next {
            begin_step(&mut self.chasers[idx].character, &self.maze, dir, maze_step);
        }
    }

    /// A buffered direction opposite to the current one turns the chaser
    /// around mid-cell: departing and target cells swap.
    fn apply_reversal(&mut self, idx: usize) {
        let chaser = &mut self.chasers[idx];
        let Some(pending) = chaser.pending_direction else {
            return;
        };
        let character = &mut chaser.character;
        if !character.is_moving() || character.last_direction.map(Direction::opposite) != Some(pending)
        {
            return;
        }
        std::mem::swap(&mut character.grid_pos, &mut character.target_pos);
        character.last_direction = Some(pending);
        chaser.pending_direction = None;
    }

    /// Buffered input first, then straight-line continuation. A blocked
    /// chaser stops and waits for input.
    fn next_player_move(&mut self, idx: usize) -> Option<(Direction, MazeStep)> {
        let chaser = &mut self.chasers[idx];
        let from = chaser.character.grid_pos;
        if let Some(pending) = chaser.pending_direction {
            if let Some(step) = self.maze.step(from, pending) {
                chaser.pending_direction = None;
                return Some((pending, step));
            }
        }
        let last = chaser.character.last_direction?;
        self.maze.step(from, last).map(|step| (last, step))
    }

    /// Grid-cell equality catches. Every chaser on the cell contributes, the
    /// fugitive is caught once.
    pub(super) fn resolve_catches(&mut self) {
        for fugitive_idx in 0..self.fugitives.len() {
            if self.fugitives[fugitive_idx].caught {
                continue;
            }
            let pos = self.fugitives[fugitive_idx].character.grid_pos;
            let chaser_indices: Vec<usize> = self
                .chasers
                .iter()
                .enumerate()
                .filter(|(_, chaser)| chaser.character.grid_pos == pos)
                .map(|(idx, _)| idx)
                .collect();
            if chaser_indices.is_empty() {
                continue;
            }

            self.fugitives[fugitive_idx].caught = true;
            self.team_score += 1;
            self.catch_count += 1;
            tracing::info!(
                fugitive = fugitive_idx,
                chasers = ?chaser_indices,
                team_score = self.team_score,
                "fugitive caught"
            );
            self.events.push(EngineEvent::FugitiveCaught {
                fugitive_index: fugitive_idx,
                chaser_indices,
                team_score: self.team_score,
            });
        }
    }
}
