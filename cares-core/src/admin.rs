//! Password gate in front of the add-event form.
//!
//! A single shared password from configuration. It keeps casual visitors
//! out of the form and nothing more.

use crate::error::{CaresError, CaresResult};

#[derive(Clone)]
pub struct AdminGate {
    password: String,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        AdminGate {
            password: password.into(),
        }
    }

    pub fn check(&self, candidate: &str) -> CaresResult<()> {
        if !candidate.is_empty() && candidate == self.password {
            Ok(())
        } else {
            Err(CaresError::Auth)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check() {
        let gate = AdminGate::new("admin123");
        assert!(gate.check("admin123").is_ok());
        assert!(matches!(gate.check("admin"), Err(CaresError::Auth)));
        assert!(matches!(gate.check(""), Err(CaresError::Auth)));
    }

    #[test]
    fn test_empty_configured_password_never_matches() {
        let gate = AdminGate::new("");
        assert!(gate.check("").is_err());
    }
}
