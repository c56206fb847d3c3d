use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies this install to the API. The server ties device trust to it,
/// so the token from the first successful login is stored and reused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceToken(String);

impl DeviceToken {
    /// 16 random bytes as hyphenated hex: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::random();
        let mut id = String::with_capacity(36);
        for (i, byte) in bytes.iter().enumerate() {
            id.push_str(&format!("{:02x}", byte));
            if matches!(i, 3 | 5 | 7 | 9) {
                id.push('-');
            }
        }
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check the 8-4-4-4-12 hex layout.
    pub fn is_well_formed(s: &str) -> bool {
        if s.len() != 36 {
            return false;
        }
        s.chars().enumerate().all(|(i, c)| {
            if i == 8 || i == 13 || i == 18 || i == 23 {
                c == '-'
            } else {
                c.is_ascii_hexdigit()
            }
        })
    }
}

impl From<String> for DeviceToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DeviceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_format() {
        let token = DeviceToken::generate();
        assert!(DeviceToken::is_well_formed(token.as_str()), "{}", token);
    }

    #[test]
    fn test_tokens_differ_per_call() {
        assert_ne!(DeviceToken::generate(), DeviceToken::generate());
    }

    #[test]
    fn test_is_well_formed() {
        assert!(DeviceToken::is_well_formed("0e65066c-ab20-4da0-b3bf-79dfd0668049"));
        assert!(DeviceToken::is_well_formed("00000000-0000-0000-0000-000000000000"));

        assert!(!DeviceToken::is_well_formed(""));
        assert!(!DeviceToken::is_well_formed("0e65066cab204da0b3bf79dfd0668049"));
        assert!(!DeviceToken::is_well_formed("0e65066c-ab20-4da0-b3bf-79dfd066804"));
        assert!(!DeviceToken::is_well_formed("zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"));
    }
}
