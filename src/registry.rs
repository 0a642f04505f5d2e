use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::JoinError;
use crate::server_utils::{
    normalize_game_code, player_order_key, sanitize_player_name, GameCodePolicy,
};
use crate::types::CharacterType;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub catches: u32,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: String,
    pub assigned_color_index: Option<usize>,
    pub player_name: Option<String>,
    pub stats: PlayerStats,
}

/// Soft reservation of a chaser slot taken while a player fills in the join
/// form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChaserSelection {
    #[serde(rename = "playerName")]
    pub player_name: String,
    #[serde(rename = "playerId")]
    pub player_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinRequest {
    /// `None` when the client sent no or an unknown character type.
    pub character_type: Option<CharacterType>,
    pub color_index: i64,
    pub player_name: String,
    pub game_code: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinOutcome {
    pub color_index: usize,
    pub player_name: String,
    /// Slot the player controlled before this join, if it was a different one.
    pub released: Option<usize>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub id: String,
    /// Always true; disconnected players leave the roster.
    pub connected: bool,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "colorIndex")]
    pub color_index: Option<usize>,
    #[serde(rename = "playerName")]
    pub player_name: Option<String>,
    pub stats: PlayerStats,
}

/// Connected players, their chaser assignments and pending selections.
///
/// Every assignment goes through slot validation, so a chaser slot is held by
/// at most one player at any time.
#[derive(Clone, Debug)]
pub struct ConnectionRegistry {
    players: HashMap<String, Player>,
    selections: BTreeMap<usize, ChaserSelection>,
    slot_count: usize,
    policy: GameCodePolicy,
}

impl ConnectionRegistry {
    pub fn new(slot_count: usize, policy: GameCodePolicy) -> Self {
        Self {
            players: HashMap::new(),
            selections: BTreeMap::new(),
            slot_count,
            policy,
        }
    }

    pub fn register(&mut self, player_id: &str) -> &Player {
        self.players
            .entry(player_id.to_string())
            .or_insert_with(|| Player {
                id: player_id.to_string(),
                assigned_color_index: None,
                player_name: None,
                stats: PlayerStats::default(),
            })
    }

    /// Drops the player together with its assignment and selection.
    pub fn remove(&mut self, player_id: &str) -> Option<Player> {
        self.selections
            .retain(|_, selection| selection.player_id != player_id);
        self.players.remove(player_id)
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    pub fn contains(&self, player_id: &str) -> bool {
        self.players.contains_key(player_id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn assigned_color(&self, player_id: &str) -> Option<usize> {
        self.players
            .get(player_id)
            .and_then(|player| player.assigned_color_index)
    }

    pub fn controller_of(&self, color_index: usize) -> Option<&str> {
        self.players
            .values()
            .find(|player| player.assigned_color_index == Some(color_index))
            .map(|player| player.id.as_str())
    }

    pub fn selections(&self) -> &BTreeMap<usize, ChaserSelection> {
        &self.selections
    }

    fn validate_slot(&self, player_id: &str, color_index: i64) -> Result<usize, JoinError> {
        let slot = usize::try_from(color_index)
            .ok()
            .filter(|&slot| slot < self.slot_count)
            .ok_or(JoinError::SlotOutOfRange(color_index))?;
        if self
            .controller_of(slot)
            .is_some_and(|controller| controller != player_id)
        {
            return Err(JoinError::SlotTaken(slot));
        }
        if self
            .selections
            .get(&slot)
            .is_some_and(|selection| selection.player_id != player_id)
        {
            return Err(JoinError::SlotReserved(slot));
        }
        Ok(slot)
    }

    /// Reserves a free slot for `player_id`, moving any reservation it held.
    pub fn request_selection(
        &mut self,
        player_id: &str,
        color_index: i64,
        player_name: &str,
    ) -> Result<usize, JoinError> {
        if !self.players.contains_key(player_id) {
            return Err(JoinError::UnknownPlayer);
        }
        let slot = self.validate_slot(player_id, color_index)?;
        self.selections
            .retain(|_, selection| selection.player_id != player_id);
        self.selections.insert(
            slot,
            ChaserSelection {
                player_name: sanitize_player_name(player_name),
                player_id: player_id.to_string(),
            },
        );
        Ok(slot)
    }

    pub fn cancel_selection(&mut self, player_id: &str) -> Option<usize> {
        let slot = self
            .selections
            .iter()
            .find(|(_, selection)| selection.player_id == player_id)
            .map(|(&slot, _)| slot)?;
        self.selections.remove(&slot);
        Some(slot)
    }

    /// Validates and completes a join. Nothing is mutated on failure.
    pub fn join(
        &mut self,
        player_id: &str,
        request: &JoinRequest,
        session_code: &str,
    ) -> Result<JoinOutcome, JoinError> {
        if !self.players.contains_key(player_id) {
            return Err(JoinError::UnknownPlayer);
        }
        if request.character_type != Some(CharacterType::Chaser) {
            return Err(JoinError::NotJoinable);
        }
        let slot = self.validate_slot(player_id, request.color_index)?;
        let code = normalize_game_code(&request.game_code).ok_or(JoinError::InvalidGameCode)?;
        if self.policy == GameCodePolicy::Strict && code != session_code {
            return Err(JoinError::GameCodeMismatch);
        }

        let player_name = sanitize_player_name(&request.player_name);
        let Some(player) = self.players.get_mut(player_id) else {
            return Err(JoinError::UnknownPlayer);
        };
        let released = player
            .assigned_color_index
            .replace(slot)
            .filter(|&previous| previous != slot);
        player.player_name = Some(player_name.clone());
        self.selections
            .retain(|&selected, selection| selected != slot && selection.player_id != player_id);

        Ok(JoinOutcome {
            color_index: slot,
            player_name,
            released,
        })
    }

    /// Clears every chaser assignment, selection and per-game stat. Players
    /// stay connected.
    pub fn release_all_assignments(&mut self) {
        for player in self.players.values_mut() {
            player.assigned_color_index = None;
            player.stats = PlayerStats::default();
        }
        self.selections.clear();
    }

    /// Slots neither controlled nor reserved.
    pub fn available_chasers(&self) -> Vec<usize> {
        (0..self.slot_count)
            .filter(|&slot| self.controller_of(slot).is_none() && !self.selections.contains_key(&slot))
            .collect()
    }

    /// Credits one catch to the player controlling `color_index`.
    pub fn credit_catch(&mut self, color_index: usize) -> Option<String> {
        let player = self
            .players
            .values_mut()
            .find(|player| player.assigned_color_index == Some(color_index))?;
        player.stats.catches += 1;
        Some(player.id.clone())
    }

    pub fn roster(&self) -> Vec<PlayerView> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|player| (player_order_key(&player.id), player.id.clone()));
        players
            .into_iter()
            .map(|player| PlayerView {
                id: player.id.clone(),
                connected: true,
                kind: if player.assigned_color_index.is_some() {
                    "chaser"
                } else {
                    "spectator"
                },
                color_index: player.assigned_color_index,
                player_name: player.player_name.clone(),
                stats: player.stats.clone(),
            })
            .collect()
    }
}
