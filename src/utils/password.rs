use subtle::ConstantTimeEq;

/// Compares a submitted secret with the configured one without short-circuiting
/// on the first differing byte.
pub fn secrets_match(submitted: &str, expected: &str) -> bool {
    submitted.as_bytes().ct_eq(expected.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match("Password123", "Password123"));
        assert!(!secrets_match("password123", "Password123"));
        assert!(!secrets_match("Password12", "Password123")); // length differs
        assert!(!secrets_match("", "Password123"));
    }
}
