//! Salted PIN hashing. PINs never leave the server boundary and are never
//! stored or logged in the clear.

use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SALT_LEN: usize = 16;

/// Hashes a PIN under a fresh random salt.
/// Returns `(salt_hex, hash_hex)` for storage.
pub fn hash_pin(pin: &str) -> (String, String) {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let hash = derive(&salt, pin);
    (hex::encode(salt), hex::encode(hash))
}

/// Verifies a PIN against the stored salt and hash.
/// Comparison is constant-time to prevent timing attacks.
pub fn verify_pin(pin: &str, salt_hex: &str, hash_hex: &str) -> bool {
    let (Ok(salt), Ok(expected)) = (hex::decode(salt_hex), hex::decode(hash_hex)) else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(&salt) else {
        return false;
    };
    mac.update(pin.as_bytes());

    mac.verify_slice(&expected).is_ok()
}

fn derive(salt: &[u8], pin: &str) -> Vec<u8> {
    // new_from_slice accepts any key length for HMAC
    let mut mac = HmacSha256::new_from_slice(salt).expect("HMAC accepts any key length");
    mac.update(pin.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let (salt, hash) = hash_pin("1234");
        assert!(verify_pin("1234", &salt, &hash));
        assert!(!verify_pin("4321", &salt, &hash));
    }

    #[test]
    fn same_pin_gets_distinct_salts() {
        let (salt_a, hash_a) = hash_pin("1234");
        let (salt_b, hash_b) = hash_pin("1234");

        assert_ne!(salt_a, salt_b);
        assert_ne!(hash_a, hash_b);
    }

    #[test]
    fn corrupt_stored_material_never_verifies() {
        let (salt, hash) = hash_pin("1234");
        assert!(!verify_pin("1234", "not-hex", &hash));
        assert!(!verify_pin("1234", &salt, "not-hex"));
        assert!(!verify_pin("1234", &salt, ""));
    }
}
