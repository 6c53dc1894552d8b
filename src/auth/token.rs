use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

const REFRESH_TOKEN_BYTES: usize = 48;

/// Opaque refresh token: 384 bits of OS randomness, base64url-encoded. A pure
/// capability string; it carries no claims and the bearer is identified only
/// by the user row it is stored on.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    Base64UrlUnpadded::encode_string(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_expected_length() {
        // 48 bytes -> 64 base64url chars, no padding
        assert_eq!(generate_refresh_token().len(), 64);
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
    }

    #[test]
    fn token_is_url_safe() {
        let token = generate_refresh_token();
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
