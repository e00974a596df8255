use serde::{Deserialize, Serialize};

use super::role::WorkspaceRole;

/// Lifecycle of a workspace invitation.
///
/// `Pending` is the only non-terminal state. Revocation is not a status: a
/// revoked invitation is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, InvitationStatus::Pending)
    }

    pub fn can_transition_to(&self, next: InvitationStatus) -> bool {
        matches!(
            (self, next),
            (InvitationStatus::Pending, InvitationStatus::Accepted)
                | (InvitationStatus::Pending, InvitationStatus::Declined)
        )
    }
}

impl std::fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invitation {
    pub id: String,
    pub workspace_id: String,
    pub email: String,
    pub role: WorkspaceRole,
    pub status: InvitationStatus,
    pub invited_by: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateInvitation {
    pub email: String,
    pub role: WorkspaceRole,
}

/// Fully resolved invitation ready to be written by a store.
#[derive(Debug, Clone)]
pub struct NewInvitation {
    pub workspace_id: String,
    pub email: String,
    pub role: WorkspaceRole,
    pub invited_by: String,
}

/// Trim and lower-case an email address so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Minimal shape check: one `@`, non-empty local part, a dot in the domain.
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() || email.len() > 254 {
        return Err("email must be between 1 and 254 characters");
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err("email must contain '@'");
    };
    if local.is_empty() || domain.contains('@') {
        return Err("email is malformed");
    }
    if email.chars().any(char::is_whitespace) {
        return Err("email must not contain whitespace");
    }
    match domain.split_once('.') {
        Some((host, tld)) if !host.is_empty() && !tld.is_empty() && !domain.ends_with('.') => {
            Ok(())
        }
        _ => Err("email domain is malformed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_has_outgoing_transitions() {
        use InvitationStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Declined));
        assert!(!Pending.can_transition_to(Pending));
        for terminal in [Accepted, Declined] {
            assert!(terminal.is_terminal());
            for next in [Pending, Accepted, Declined] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@x.com").is_err());
        assert!(validate_email("a@b@x.com").is_err());
        assert!(validate_email("a@localhost").is_err());
        assert!(validate_email("a@x.").is_err());
        assert!(validate_email("a b@x.com").is_err());
    }
}
