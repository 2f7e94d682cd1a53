//! Per-run artifact naming token.

use std::fmt;

use chrono::Local;
use uuid::Uuid;

/// Token mixed into every file name a run produces.
///
/// Combines a wall-clock `HHMMSS` stamp, which keeps output listings roughly
/// chronological, with a random hex salt so two runs started within the same
/// second cannot overwrite each other's files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunToken(String);

impl RunToken {
    pub fn new() -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        Self(format!("{}-{}", Local::now().format("%H%M%S"), &salt[..8]))
    }
}

impl Default for RunToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_carries_stamp_and_salt() {
        let token = RunToken::new().to_string();
        let (stamp, salt) = token.split_once('-').expect("separator");
        assert_eq!(stamp.len(), 6);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()), "bad stamp in {token}");
        assert_eq!(salt.len(), 8);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()), "bad salt in {token}");
    }

    #[test]
    fn consecutive_tokens_differ() {
        assert_ne!(RunToken::new(), RunToken::new());
    }
}
