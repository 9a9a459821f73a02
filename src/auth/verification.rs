//! Email verification token issuance.
//!
//! Tokens are short, fixed-length, case-sensitive alphanumeric codes drawn
//! from the OS CSPRNG. The issuer does not track uniqueness; the users table
//! enforces it with a unique constraint and the registration flow regenerates
//! on an insert collision.

use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};

/// Length of an emailed verification token.
pub const VERIFICATION_TOKEN_LENGTH: usize = 6;

/// Issue a fresh single-use verification token.
pub fn issue_token() -> String {
    OsRng.sample_iter(&Alphanumeric).take(VERIFICATION_TOKEN_LENGTH).map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_have_fixed_length() {
        assert_eq!(issue_token().len(), VERIFICATION_TOKEN_LENGTH);
    }

    #[test]
    fn tokens_are_alphanumeric() {
        let token = issue_token();
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn tokens_vary_between_calls() {
        // Six alphanumeric characters: a repeat across 32 draws is
        // overwhelmingly unlikely.
        let tokens: std::collections::HashSet<String> = (0..32).map(|_| issue_token()).collect();
        assert_eq!(tokens.len(), 32);
    }
}
