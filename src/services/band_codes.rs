//! Band code generation: a fixed prefix plus a random 7-character
//! suffix from A-Z and 0-9, e.g. `NKM-4QX91Z7`.

use rand::Rng;

pub const SUFFIX_LEN: usize = 7;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub fn generate_band_code(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();

    format!("{}-{}", prefix, suffix)
}

/// Shape check for generated codes (used by tests and diagnostics only;
/// lookups accept any string and simply miss).
pub fn matches_format(code: &str, prefix: &str) -> bool {
    let Some(suffix) = code.strip_prefix(prefix).and_then(|s| s.strip_prefix('-')) else {
        return false;
    };

    suffix.len() == SUFFIX_LEN
        && suffix
            .chars()
            .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_match_format() {
        for _ in 0..100 {
            let code = generate_band_code("NKM");
            assert!(matches_format(&code, "NKM"), "bad code: {}", code);
        }
    }

    #[test]
    fn generated_codes_vary() {
        let a = generate_band_code("NKM");
        let b = generate_band_code("NKM");
        // 36^7 possibilities; a collision here means the RNG is broken
        assert_ne!(a, b);
    }

    #[test]
    fn format_check_rejects_wrong_shapes() {
        assert!(matches_format("NKM-A1B2C3D", "NKM"));
        assert!(!matches_format("NKM-a1b2c3d", "NKM"));
        assert!(!matches_format("NKM-A1B2C3", "NKM"));
        assert!(!matches_format("XYZ-A1B2C3D", "NKM"));
        assert!(!matches_format("NKMA1B2C3D", "NKM"));
    }
}
