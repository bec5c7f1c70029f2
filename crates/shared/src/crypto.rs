//! Random token and invite-code generation.

use rand::Rng;

/// Alphabet for magic-link tokens: mixed-case alphanumeric.
const TOKEN_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Alphabet for invite codes: lowercase alphanumeric (typed by humans).
const INVITE_CODE_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Length of magic-link tokens. The token doubles as the verification code
/// accepted by the identity layer, so it must be unguessable on its own.
pub const MAGIC_LINK_TOKEN_LEN: usize = 32;

/// Length of invite codes.
pub const INVITE_CODE_LEN: usize = 8;

fn random_string(len: usize, alphabet: &[u8]) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| {
            let idx = rng.gen_range(0..alphabet.len());
            alphabet[idx] as char
        })
        .collect()
}

/// Generates a 32-character alphanumeric magic-link token.
pub fn generate_magic_link_token() -> String {
    random_string(MAGIC_LINK_TOKEN_LEN, TOKEN_CHARS)
}

/// Generates an 8-character lowercase alphanumeric invite code.
pub fn generate_invite_code() -> String {
    random_string(INVITE_CODE_LEN, INVITE_CODE_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_link_token_length_and_charset() {
        let token = generate_magic_link_token();
        assert_eq!(token.len(), MAGIC_LINK_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_invite_code_length_and_charset() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let tokens: Vec<String> = (0..100).map(|_| generate_magic_link_token()).collect();
        let unique: std::collections::HashSet<_> = tokens.iter().collect();
        assert_eq!(unique.len(), tokens.len());
    }

    #[test]
    fn test_invite_codes_mostly_unique() {
        let codes: Vec<String> = (0..100).map(|_| generate_invite_code()).collect();
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        // 36^8 space, collisions in 100 draws should not happen
        assert_eq!(unique.len(), codes.len());
    }
}
