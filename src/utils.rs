//! Utility functions for the game service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique session ID
pub fn generate_session_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Display identifier used on the leaderboard for a participant
///
/// Prefers the username (without a leading `@`), then the first name, then a
/// synthetic `User_<id>` label.
pub fn display_identifier(
    participant_id: i64,
    username: Option<&str>,
    first_name: Option<&str>,
) -> String {
    if let Some(username) = username.filter(|u| !u.is_empty()) {
        return username.trim_start_matches('@').to_string();
    }
    if let Some(first_name) = first_name.filter(|n| !n.is_empty()) {
        return first_name.to_string();
    }
    format!("User_{}", participant_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_unique_ids() {
        let id1 = generate_session_id();
        let id2 = generate_session_id();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_display_identifier_preference() {
        assert_eq!(display_identifier(1, Some("@alice"), Some("Alice")), "alice");
        assert_eq!(display_identifier(2, None, Some("Bob")), "Bob");
        assert_eq!(display_identifier(3, Some(""), None), "User_3");
        assert_eq!(display_identifier(4, None, None), "User_4");
    }
}
