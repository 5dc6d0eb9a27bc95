use std::sync::Arc;

use thiserror::Error;

use super::SessionIdentity;

/// Raised by [`SuperadminGate::require_privileged`] when the caller is not allowlisted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unauthorized: Superadmin access required")]
pub struct AuthorizationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No identity could be resolved for the request.
    Unauthenticated,
    /// An identity was resolved but its email is absent or not allowlisted.
    Forbidden,
}

/// Outcome of the superadmin check for one request. Never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

/// Static superadmin allowlist. Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct SuperadminGate {
    allowlist: Arc<[String]>,
}

impl SuperadminGate {
    pub fn new<I, S>(allowlist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowlist: allowlist.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allowlist(&self) -> &[String] {
        &self.allowlist
    }

    pub fn is_privileged(&self, email: Option<&str>) -> bool {
        match email {
            Some(email) => self.allowlist.iter().any(|allowed| allowed == email),
            None => false,
        }
    }

    pub fn require_privileged(&self, email: Option<&str>) -> Result<(), AuthorizationError> {
        if self.is_privileged(email) {
            Ok(())
        } else {
            Err(AuthorizationError)
        }
    }

    pub fn authorize(&self, identity: Option<&SessionIdentity>) -> Decision {
        let Some(identity) = identity else {
            return Decision::Denied(DenyReason::Unauthenticated);
        };

        match self.require_privileged(identity.email.as_deref()) {
            Ok(()) => Decision::Allowed,
            Err(AuthorizationError) => Decision::Denied(DenyReason::Forbidden),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> SuperadminGate {
        SuperadminGate::new(["joe@upupdndn.ai"])
    }

    fn identity(email: Option<&str>) -> SessionIdentity {
        SessionIdentity {
            user_id: "user-1".to_string(),
            email: email.map(str::to_string),
            role: None,
        }
    }

    #[test]
    fn allowlisted_email_is_privileged() {
        assert!(gate().is_privileged(Some("joe@upupdndn.ai")));
        assert_eq!(gate().require_privileged(Some("joe@upupdndn.ai")), Ok(()));
    }

    #[test]
    fn absent_email_is_denied() {
        assert!(!gate().is_privileged(None));
        assert_eq!(gate().require_privileged(None), Err(AuthorizationError));
    }

    #[test]
    fn match_is_exact_and_case_sensitive() {
        let gate = gate();
        for email in ["Joe@UpUpDnDn.AI", "joe@upupdndn.ai ", " joe@upupdndn.ai", "joe@upupdndn", ""] {
            assert!(!gate.is_privileged(Some(email)), "{email:?} should not be privileged");
            assert!(gate.require_privileged(Some(email)).is_err());
        }
    }

    #[test]
    fn error_message_is_fixed() {
        assert_eq!(AuthorizationError.to_string(), "Unauthorized: Superadmin access required");
    }

    #[test]
    fn injected_allowlist_is_used() {
        let gate = SuperadminGate::new(vec!["a@example.com".to_string(), "b@example.com".to_string()]);
        assert!(gate.is_privileged(Some("b@example.com")));
        assert!(!gate.is_privileged(Some("joe@upupdndn.ai")));

        let empty = SuperadminGate::new(Vec::<String>::new());
        assert!(!empty.is_privileged(Some("a@example.com")));
    }

    #[test]
    fn authorize_decisions() {
        let gate = gate();
        assert_eq!(gate.authorize(None), Decision::Denied(DenyReason::Unauthenticated));
        assert_eq!(gate.authorize(Some(&identity(None))), Decision::Denied(DenyReason::Forbidden));
        assert_eq!(
            gate.authorize(Some(&identity(Some("someone@example.com")))),
            Decision::Denied(DenyReason::Forbidden)
        );
        assert_eq!(gate.authorize(Some(&identity(Some("joe@upupdndn.ai")))), Decision::Allowed);
    }
}
