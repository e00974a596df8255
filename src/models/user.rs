use serde::{Deserialize, Serialize};

use crate::models::invitation::{normalize_email, validate_email};

pub const MAX_DISPLAY_NAME_LEN: usize = 64;
pub const MAX_AVATAR_LEN: usize = 2048;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: Option<String>,
}

/// Body of `PATCH /users/@me`. Absent fields are left alone; an empty
/// `display_name` or `avatar` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    /// Required for email and password changes on accounts that have one.
    pub current_password: Option<String>,
}

impl UpdateUser {
    pub fn normalized(self) -> Result<Self, String> {
        let display_name = self.display_name.map(|name| name.trim().to_string());
        if display_name
            .as_ref()
            .is_some_and(|name| name.chars().count() > MAX_DISPLAY_NAME_LEN)
        {
            return Err(format!(
                "display_name must be at most {MAX_DISPLAY_NAME_LEN} characters"
            ));
        }

        let avatar = self.avatar.map(|url| url.trim().to_string());
        if avatar
            .as_ref()
            .is_some_and(|url| url.chars().count() > MAX_AVATAR_LEN)
        {
            return Err(format!("avatar must be at most {MAX_AVATAR_LEN} characters"));
        }

        let email = match self.email {
            Some(email) => {
                let email = normalize_email(&email);
                validate_email(&email)?;
                Some(email)
            }
            None => None,
        };

        if let Some(ref password) = self.password {
            validate_password(password)?;
        }

        Ok(Self {
            display_name,
            avatar,
            email,
            password: self.password,
            current_password: self.current_password,
        })
    }

    pub fn changes_credentials(&self) -> bool {
        self.email.is_some() || self.password.is_some()
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err("password must be between 8 and 128 characters".to_string());
    }
    Ok(())
}
