use std::collections::HashSet;
use tracing::info;

/// Shared-secret check against a fixed set of accepted codes.
#[derive(Debug, Clone)]
pub struct AuthGate {
    valid_codes: HashSet<String>,
}

impl AuthGate {
    pub fn new(valid_codes: HashSet<String>) -> Self {
        Self { valid_codes }
    }

    /// Returns `true` iff `code` is one of the accepted codes.
    ///
    /// A missing or empty code is a negative result, not an error.
    pub fn check_auth_code(&self, code: Option<&str>) -> bool {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            info!("No auth code provided");
            return false;
        };

        let result = self.valid_codes.contains(code);
        info!(result, "Auth code check completed");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gate() -> AuthGate {
        AuthGate::new(["123456", "654321"].into_iter().map(String::from).collect())
    }

    #[test]
    fn accepts_configured_codes() {
        let gate = gate();
        assert!(gate.check_auth_code(Some("123456")));
        assert!(gate.check_auth_code(Some("654321")));
    }

    #[test]
    fn empty_or_missing_code_is_rejected() {
        let gate = gate();
        assert!(!gate.check_auth_code(Some("")));
        assert!(!gate.check_auth_code(None));
    }

    #[test]
    fn near_misses_are_rejected() {
        let gate = gate();
        assert!(!gate.check_auth_code(Some(" 123456")));
        assert!(!gate.check_auth_code(Some("1234567")));
        assert!(!gate.check_auth_code(Some("12345")));
    }

    proptest! {
        #[test]
        fn result_is_set_membership(code in "[0-9]{0,8}") {
            let expected = code == "123456" || code == "654321";
            prop_assert_eq!(gate().check_auth_code(Some(&code)), expected);
        }
    }
}
