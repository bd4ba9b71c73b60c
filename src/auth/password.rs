use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Salt length in bytes before hex encoding.
const SALT_BYTES: usize = 16;

/// Separates salt and digest in a stored credential. Never produced by hex.
const DELIMITER: char = ':';

/// Hex SHA-256 digest of `password ‖ salt`.
pub fn hash(password: &str, salt: &str) -> String {
    let mut h = Sha256::new();
    h.update(password.as_bytes());
    h.update(salt.as_bytes());
    hex::encode(h.finalize())
}

/// Fresh random salt from the OS CSPRNG, hex encoded.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Build the `salt:hash` credential stored for a new password.
pub fn make_credential(password: &str) -> String {
    let salt = generate_salt();
    let digest = hash(password, &salt);
    format!("{salt}{DELIMITER}{digest}")
}

/// Check `password` against a stored `salt:hash` credential.
///
/// A malformed credential verifies as `false`.
pub fn verify(password: &str, stored: &str) -> bool {
    let Some((salt, expected)) = stored.split_once(DELIMITER) else {
        return false;
    };
    if salt.is_empty() || expected.is_empty() {
        return false;
    }
    let attempt = hash(password, salt);
    constant_time_eq(attempt.as_bytes(), expected.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let credential = make_credential("Secur3P@ssw0rd!");
        assert!(verify("Secur3P@ssw0rd!", &credential));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let credential = make_credential("correct-horse-battery-staple");
        assert!(!verify("wrong-password", &credential));
    }

    #[test]
    fn different_salts_perturb_digest() {
        let s1 = generate_salt();
        let s2 = generate_salt();
        assert_ne!(s1, s2);
        assert_ne!(hash("same", &s1), hash("same", &s2));
    }

    #[test]
    fn hash_is_deterministic_for_fixed_salt() {
        assert_eq!(hash("pw", "abcd"), hash("pw", "abcd"));
        assert_eq!(hash("pw", "abcd").len(), 64);
    }

    #[test]
    fn credential_layout_is_hex_salt_and_digest() {
        let credential = make_credential("pw");
        let (salt, digest) = credential.split_once(':').unwrap();
        assert_eq!(salt.len(), SALT_BYTES * 2);
        assert!(salt.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, hash("pw", salt));
    }

    #[test]
    fn malformed_credentials_fail_closed() {
        assert!(!verify("pw", "no-delimiter-here"));
        assert!(!verify("pw", ":"));
        assert!(!verify("pw", "abcd:"));
        assert!(!verify("pw", ""));
    }

    #[test]
    fn digest_comparison_needs_every_byte() {
        let digest = hash("secret1", "00ff");
        assert!(constant_time_eq(digest.as_bytes(), hash("secret1", "00ff").as_bytes()));

        let mut last_flipped = digest.clone().into_bytes();
        let last = last_flipped.len() - 1;
        last_flipped[last] = if last_flipped[last] == b'0' { b'1' } else { b'0' };
        assert!(!constant_time_eq(digest.as_bytes(), &last_flipped));

        assert!(!constant_time_eq(digest.as_bytes(), &digest.as_bytes()[..63]));
    }
}
