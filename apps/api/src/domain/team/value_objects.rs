use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const SIGNUP_CODE_LEN: usize = 8;
const SIGNUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Code players use to join a team without an invitation
///
/// # Invariants
/// - Exactly 8 characters
/// - Only uppercase ASCII letters and digits
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignupCode(String);

impl SignupCode {
    /// Parses a code, accepting lowercase input
    ///
    /// # Example
    /// ```
    /// use league_signup_api::domain::team::value_objects::SignupCode;
    ///
    /// let code = SignupCode::parse("ab12cd34").expect("valid code");
    /// assert_eq!(code.as_str(), "AB12CD34");
    /// assert!(SignupCode::parse("short").is_err());
    /// ```
    pub fn parse(code: &str) -> Result<Self, String> {
        let code = code.trim().to_ascii_uppercase();
        let valid = code.len() == SIGNUP_CODE_LEN
            && code.bytes().all(|b| SIGNUP_CODE_ALPHABET.contains(&b));
        if valid {
            Ok(Self(code))
        } else {
            Err(format!("Invalid signup code: {}", code))
        }
    }

    /// Draws a random code; uniqueness is checked by the caller
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let code = (0..SIGNUP_CODE_LEN)
            .map(|_| SIGNUP_CODE_ALPHABET[rng.gen_range(0..SIGNUP_CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignupCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SignupCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SignupCode::parse(&value)
    }
}

impl From<SignupCode> for String {
    fn from(code: SignupCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_codes_are_well_formed() {
        for _ in 0..200 {
            let code = SignupCode::random();
            assert!(SignupCode::parse(code.as_str()).is_ok(), "bad code {}", code);
        }
    }

    #[test]
    fn random_codes_differ() {
        assert_ne!(SignupCode::random(), SignupCode::random());
    }

    #[test]
    fn parse_rejects_wrong_length_and_symbols() {
        assert!(SignupCode::parse("ABC").is_err());
        assert!(SignupCode::parse("ABCDEFGHI").is_err());
        assert!(SignupCode::parse("ABCD-123").is_err());
    }

    #[test]
    fn parse_uppercases() {
        assert_eq!(SignupCode::parse("zz99yy88").unwrap().as_str(), "ZZ99YY88");
    }
}
