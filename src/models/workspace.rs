use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWorkspace {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWorkspace {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl UpdateWorkspace {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn normalized(mut self) -> Result<Self, String> {
        if let Some(name) = self.name.take() {
            self.name = Some(normalize_name(&name)?);
        }
        if let Some(ref description) = self.description {
            check_description(description)?;
        }
        Ok(self)
    }
}

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

impl CreateWorkspace {
    /// Trimmed name and a concrete (possibly empty) description.
    pub fn normalized(&self) -> Result<(String, String), String> {
        let name = normalize_name(&self.name)?;
        let description = self.description.clone().unwrap_or_default();
        check_description(&description)?;
        Ok((name, description))
    }
}

fn normalize_name(name: &str) -> Result<String, String> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_LEN {
        return Err(format!(
            "workspace name must be between 1 and {MAX_NAME_LEN} characters"
        ));
    }
    Ok(name.to_string())
}

fn check_description(description: &str) -> Result<(), String> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_trims_name_and_defaults_description() {
        let input = CreateWorkspace {
            name: "  Growth team ".to_string(),
            description: None,
        };
        assert_eq!(
            input.normalized().unwrap(),
            ("Growth team".to_string(), String::new())
        );
    }

    #[test]
    fn test_rejects_blank_and_oversized_fields() {
        let blank = CreateWorkspace {
            name: "   ".to_string(),
            description: None,
        };
        assert!(blank.normalized().is_err());

        let update = UpdateWorkspace {
            name: None,
            description: Some("x".repeat(MAX_DESCRIPTION_LEN + 1)),
        };
        assert!(update.normalized().is_err());
    }
}
