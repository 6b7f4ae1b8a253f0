//! Validation helpers for DTOs.

use validator::ValidationError;

use crate::state::game::Gender;

/// Stable code of every player-name failure.
pub const INVALID_NAME: &str = "invalid_name";
/// Stable code of a same-gender pairing.
pub const DUPLICATE_GENDER: &str = "duplicate_gender";

const MIN_NAME_LEN: usize = 2;
const MAX_NAME_LEN: usize = 20;

/// Validates a player name after trimming: 2 to 20 characters of `[A-Za-z0-9 \-']`.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Alex")      // Ok
/// validate_player_name(" A ")       // Err - too short once trimmed
/// validate_player_name("Zoë")       // Err - outside the charset
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(invalid_name("Name cannot be empty"));
    }

    let len = trimmed.chars().count();
    if len < MIN_NAME_LEN {
        return Err(invalid_name("Name must be at least 2 characters"));
    }
    if len > MAX_NAME_LEN {
        return Err(invalid_name("Name must be less than 20 characters"));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '-' | '\''))
    {
        return Err(invalid_name("Name contains invalid characters"));
    }

    Ok(())
}

/// Validates that the two players have different genders.
pub fn validate_gender_pair(first: Gender, second: Gender) -> Result<(), ValidationError> {
    if first == second {
        let mut err = ValidationError::new(DUPLICATE_GENDER);
        err.message = Some("Players must be of opposite genders".into());
        return Err(err);
    }
    Ok(())
}

fn invalid_name(message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(INVALID_NAME);
    err.message = Some(message.into());
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name_valid() {
        assert!(validate_player_name("Alex").is_ok());
        assert!(validate_player_name("Mary-Jane O'Neil").is_ok());
        assert!(validate_player_name("  Sam  ").is_ok());
        assert!(validate_player_name("R2").is_ok());
        assert!(validate_player_name(&"a".repeat(20)).is_ok());
    }

    #[test]
    fn test_validate_player_name_invalid_length() {
        let empty = validate_player_name("   ").unwrap_err();
        assert_eq!(empty.code, INVALID_NAME);
        assert_eq!(empty.message.as_deref(), Some("Name cannot be empty"));

        let short = validate_player_name(" A ").unwrap_err();
        assert_eq!(
            short.message.as_deref(),
            Some("Name must be at least 2 characters")
        );

        assert!(validate_player_name(&"a".repeat(21)).is_err());
    }

    #[test]
    fn test_validate_player_name_invalid_chars() {
        for name in ["Zoë", "Alex!", "Sam_1", "<b>"] {
            let err = validate_player_name(name).unwrap_err();
            assert_eq!(
                err.message.as_deref(),
                Some("Name contains invalid characters"),
                "{name}"
            );
        }
    }

    #[test]
    fn test_validate_gender_pair() {
        assert!(validate_gender_pair(Gender::Male, Gender::Female).is_ok());
        assert!(validate_gender_pair(Gender::Female, Gender::Male).is_ok());
        let err = validate_gender_pair(Gender::Female, Gender::Female).unwrap_err();
        assert_eq!(err.code, DUPLICATE_GENDER);
    }
}
