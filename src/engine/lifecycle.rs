use super::*;

use crate::error::LifecycleError;
use crate::types::GameEndSummary;

impl GameEngine {
    /// Idle -> Running. `now_ms` is the wall-clock start reported to clients;
    /// the game clock itself only advances through `step`.
    pub fn start(&mut self, now_ms: u64) -> Result<(), LifecycleError> {
        if self.phase != GamePhase::Idle {
            return Err(LifecycleError::InvalidTransition {
                action: "start",
                phase: self.phase,
            });
        }
        self.phase = GamePhase::Running;
        self.start_timestamp = Some(now_ms);
        self.elapsed_ms = 0;
        self.ended_at_tick = None;
        for chaser in &mut self.chasers {
            chaser.pending_direction = None;
        }
        tracing::info!(
            duration_seconds = self.config.duration_seconds,
            ai_difficulty = self.config.ai_difficulty,
            "game started"
        );
        Ok(())
    }

    /// Forced end of a running game.
    pub fn end_game(&mut self) -> Result<GameEndSummary, LifecycleError> {
        if self.phase != GamePhase::Running {
            return Err(LifecycleError::InvalidTransition {
                action: "end",
                phase: self.phase,
            });
        }
        Ok(self.finish())
    }

    /// Running or Ended -> Idle with every character back on its spawn.
    pub fn reset(&mut self) -> Result<(), LifecycleError> {
        if self.phase == GamePhase::Idle {
            return Err(LifecycleError::InvalidTransition {
                action: "reset",
                phase: self.phase,
            });
        }
        self.reset_to_spawns();
        self.phase = GamePhase::Idle;
        self.start_timestamp = None;
        self.ended_at_tick = None;
        self.events.clear();
        tracing::info!("game reset");
        Ok(())
    }

    pub(super) fn check_game_end(&mut self) {
        if self.phase != GamePhase::Running {
            return;
        }
        let all_caught = self.uncaught_count() == 0;
        let timed_out = self.elapsed_ms >= self.duration_ms();
        if all_caught || timed_out {
            self.finish();
        }
    }

    fn finish(&mut self) -> GameEndSummary {
        self.phase = GamePhase::Ended;
        self.ended_at_tick = Some(self.tick_counter);
        let summary = self.build_summary();
        tracing::info!(
            score = summary.score,
            fugitives_caught = summary.fugitives_caught,
            game_time = summary.game_time,
            all_caught = summary.all_caught,
            "game ended"
        );
        self.events.push(EngineEvent::GameEnded(summary.clone()));
        summary
    }

    pub fn build_summary(&self) -> GameEndSummary {
        let fugitives_caught = self.fugitives.iter().filter(|f| f.caught).count() as u32;
        GameEndSummary {
            score: self.team_score,
            game_time: self.elapsed_ms as f64 / 1000.0,
            fugitives_caught,
            total_fugitives: self.fugitives.len(),
            all_caught: fugitives_caught as usize == self.fugitives.len(),
        }
    }

    fn duration_ms(&self) -> u64 {
        u64::from(self.config.duration_seconds) * 1000
    }

    pub fn time_left_ms(&self) -> u64 {
        self.duration_ms().saturating_sub(self.elapsed_ms)
    }

    /// Ticks elapsed since the game ended, `None` unless the phase is Ended.
    pub fn ticks_since_end(&self) -> Option<u64> {
        if self.phase != GamePhase::Ended {
            return None;
        }
        self.ended_at_tick
            .map(|ended| self.tick_counter.saturating_sub(ended))
    }
}
