use rand::Rng;

use crate::constants::{GAME_CODE_LEN, PLAYER_NAME_MAX_LEN};

/// How the two-digit game code sent with `join` is treated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum GameCodePolicy {
    /// Format-checked only; any two digits are accepted.
    #[default]
    Label,
    /// Must equal the session's code.
    Strict,
}

/// Upper-case alphanumeric initials, at most three characters.
pub fn sanitize_player_name(value: &str) -> String {
    let name: String = value
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|ch| ch.to_ascii_uppercase())
        .take(PLAYER_NAME_MAX_LEN)
        .collect();
    if name.is_empty() {
        return "???".to_string();
    }
    name
}

/// Left-pads a numeric code to two digits. `None` for anything that is not
/// one or two ASCII digits.
pub fn normalize_game_code(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.len() > GAME_CODE_LEN
        || !trimmed.chars().all(|ch| ch.is_ascii_digit())
    {
        return None;
    }
    Some(format!("{trimmed:0>width$}", width = GAME_CODE_LEN))
}

pub fn make_game_code() -> String {
    let code: u8 = rand::rng().random_range(0..100);
    format!("{code:02}")
}

pub fn player_order_key(player_id: &str) -> u64 {
    player_id
        .rsplit('_')
        .next()
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(u64::MAX)
}

pub fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_order_key_uses_numeric_suffix() {
        assert!(player_order_key("player_2") < player_order_key("player_10"));
        assert_eq!(player_order_key("anonymous"), u64::MAX);
    }

    #[test]
    fn sanitize_player_name_keeps_three_initials() {
        assert_eq!(sanitize_player_name("abc"), "ABC");
        assert_eq!(sanitize_player_name(" a-b c d "), "ABC");
        assert_eq!(sanitize_player_name("x9"), "X9");
        assert_eq!(sanitize_player_name(""), "???");
        assert_eq!(sanitize_player_name("!!!"), "???");
    }

    #[test]
    fn game_code_normalizes_to_two_digits() {
        assert_eq!(normalize_game_code("7").as_deref(), Some("07"));
        assert_eq!(normalize_game_code(" 42 ").as_deref(), Some("42"));
        assert_eq!(normalize_game_code("00").as_deref(), Some("00"));
        assert_eq!(normalize_game_code(""), None);
        assert_eq!(normalize_game_code("123"), None);
        assert_eq!(normalize_game_code("4a"), None);
        assert_eq!(normalize_game_code("-1"), None);
    }

    #[test]
    fn generated_game_codes_are_valid() {
        for _ in 0..50 {
            let code = make_game_code();
            assert_eq!(normalize_game_code(&code), Some(code));
        }
    }
}
