use rand::Rng;

const CODE_MIN: u32 = 100_000;
const CODE_MAX: u32 = 999_999;

/// Random six digit code, uniform over 100000..=999999.
pub fn generate() -> String {
    rand::thread_rng().gen_range(CODE_MIN..=CODE_MAX).to_string()
}

/// Exact comparison. No expiry, no attempt counting.
pub fn verify(input: &str, expected: &str) -> bool {
    input == expected
}
