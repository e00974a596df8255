use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSection {
    pub title: String,
    #[serde(default)]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub age: String,
    pub occupation: String,
    pub goals: Vec<String>,
    pub pain_points: Vec<String>,
    pub custom_sections: Vec<CustomSection>,
    pub avatar: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for both create (POST) and full replace (PUT).
#[derive(Debug, Clone, Deserialize)]
pub struct PersonaInput {
    pub name: String,
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub custom_sections: Vec<CustomSection>,
    #[serde(default)]
    pub avatar: String,
}

impl PersonaInput {
    /// Trims the name and drops blank list entries left over from the form.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() || self.name.chars().count() > 100 {
            return Err("persona name must be between 1 and 100 characters".to_string());
        }
        self.goals.retain(|g| !g.trim().is_empty());
        self.pain_points.retain(|p| !p.trim().is_empty());
        for section in &mut self.custom_sections {
            section.title = section.title.trim().to_string();
            section.items.retain(|i| !i.trim().is_empty());
        }
        self.custom_sections.retain(|s| !s.title.is_empty());
        Ok(self)
    }
}

impl Persona {
    /// Builds the input that recreates this persona as a " (Copy)".
    pub fn duplicate_input(&self) -> PersonaInput {
        PersonaInput {
            name: format!("{} (Copy)", self.name),
            age: self.age.clone(),
            occupation: self.occupation.clone(),
            goals: self.goals.clone(),
            pain_points: self.pain_points.clone(),
            custom_sections: self.custom_sections.clone(),
            avatar: self.avatar.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> PersonaInput {
        PersonaInput {
            name: name.to_string(),
            age: "34".to_string(),
            occupation: "Designer".to_string(),
            goals: vec!["ship faster".to_string(), "  ".to_string()],
            pain_points: vec![String::new(), "slow reviews".to_string()],
            custom_sections: vec![
                CustomSection {
                    title: " Tools ".to_string(),
                    items: vec!["Figma".to_string(), "".to_string()],
                },
                CustomSection {
                    title: "".to_string(),
                    items: vec!["orphan".to_string()],
                },
            ],
            avatar: String::new(),
        }
    }

    #[test]
    fn test_normalized_strips_blank_entries() {
        let normalized = input("  Dana  ").normalized().unwrap();
        assert_eq!(normalized.name, "Dana");
        assert_eq!(normalized.goals, vec!["ship faster"]);
        assert_eq!(normalized.pain_points, vec!["slow reviews"]);
        assert_eq!(normalized.custom_sections.len(), 1);
        assert_eq!(normalized.custom_sections[0].title, "Tools");
        assert_eq!(normalized.custom_sections[0].items, vec!["Figma"]);
    }

    #[test]
    fn test_blank_name_is_rejected() {
        assert!(input("   ").normalized().is_err());
        assert!(input(&"x".repeat(101)).normalized().is_err());
    }
}
