use serde::de::IntoDeserializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JourneyStatus {
    #[default]
    Draft,
    Active,
    Completed,
}

/// Whether the map describes the experience as it is today or as planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum JourneyState {
    Draft,
    Current,
    Future,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub left: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Insights {
    #[serde(default)]
    pub needs: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub satisfaction: f64,
    pub effort: f64,
    pub completion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    #[serde(default)]
    pub id: String,
    pub content: String,
    pub sentiment: Emotion,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Touchpoint {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub emotion: Emotion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_job: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insights: Option<Insights>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Metrics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<Vec<Feedback>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub touchpoints: Vec<Touchpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub persona_ids: Vec<String>,
    pub state: Option<JourneyState>,
    pub status: JourneyStatus,
    pub stages: Vec<Stage>,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body for both create (POST) and full replace (PUT).
#[derive(Debug, Clone, Deserialize)]
pub struct JourneyInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub persona_ids: Vec<String>,
    #[serde(default)]
    pub state: Option<JourneyState>,
    #[serde(default)]
    pub status: JourneyStatus,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

/// List ordering. `date` is most recently updated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JourneySort {
    Name,
    #[default]
    Date,
    Status,
}

impl JourneySort {
    pub fn order_by(&self) -> &'static str {
        match self {
            JourneySort::Name => "name COLLATE NOCASE ASC, id ASC",
            JourneySort::Date => "updated_at DESC, id ASC",
            JourneySort::Status => "status ASC, updated_at DESC, id ASC",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct JourneyFilter {
    /// `all` is accepted and means no status filter.
    #[serde(default, deserialize_with = "all_or_status")]
    pub status: Option<JourneyStatus>,
    pub search: Option<String>,
    #[serde(default)]
    pub sort: JourneySort,
}

fn all_or_status<'de, D>(deserializer: D) -> Result<Option<JourneyStatus>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref() {
        None | Some("all") => Ok(None),
        Some(other) => {
            let de: serde::de::value::StrDeserializer<D::Error> = other.into_deserializer();
            JourneyStatus::deserialize(de).map(Some)
        }
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn check_metric(name: &str, value: f64) -> Result<(), String> {
    if !(0.0..=100.0).contains(&value) {
        return Err(format!("{name} must be between 0 and 100"));
    }
    Ok(())
}

impl JourneyInput {
    /// Validates the document and assigns ids to stages, touchpoints and
    /// feedback entries that arrive without one. Stages come back sorted by
    /// `order`.
    pub fn normalized(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() || self.name.chars().count() > 100 {
            return Err("journey name must be between 1 and 100 characters".to_string());
        }
        if self.cover_image.as_deref().is_some_and(|c| c.trim().is_empty()) {
            self.cover_image = None;
        }
        let mut seen = std::collections::HashSet::new();
        self.persona_ids.retain(|id| seen.insert(id.clone()));

        for stage in &mut self.stages {
            stage.name = stage.name.trim().to_string();
            if stage.name.is_empty() {
                return Err("stage name must not be empty".to_string());
            }
            if stage.id.is_empty() {
                stage.id = new_id();
            }
            for touchpoint in &mut stage.touchpoints {
                touchpoint.name = touchpoint.name.trim().to_string();
                if touchpoint.name.is_empty() {
                    return Err("touchpoint name must not be empty".to_string());
                }
                if touchpoint.id.is_empty() {
                    touchpoint.id = new_id();
                }
                if let Some(ref metrics) = touchpoint.metrics {
                    check_metric("satisfaction", metrics.satisfaction)?;
                    check_metric("effort", metrics.effort)?;
                    check_metric("completion", metrics.completion)?;
                }
                for entry in touchpoint.feedback.iter_mut().flatten() {
                    if entry.id.is_empty() {
                        entry.id = new_id();
                    }
                }
            }
        }
        self.stages.sort_by_key(|s| s.order);
        Ok(self)
    }
}

impl Journey {
    /// Builds the input for a " (Copy)" of this journey: status back to
    /// draft, stage and touchpoint ids cleared so fresh ones get assigned.
    pub fn duplicate_input(&self) -> JourneyInput {
        let stages = self
            .stages
            .iter()
            .map(|stage| Stage {
                id: String::new(),
                touchpoints: stage
                    .touchpoints
                    .iter()
                    .map(|tp| Touchpoint {
                        id: String::new(),
                        ..tp.clone()
                    })
                    .collect(),
                ..stage.clone()
            })
            .collect();

        JourneyInput {
            name: format!("{} (Copy)", self.name),
            description: self.description.clone(),
            cover_image: self.cover_image.clone(),
            persona_ids: self.persona_ids.clone(),
            state: self.state,
            status: JourneyStatus::Draft,
            stages,
        }
    }

    /// Case-insensitive match on name or description.
    pub fn matches(&self, filter: &JourneyFilter) -> bool {
        if let Some(status) = filter.status {
            if self.status != status {
                return false;
            }
        }
        match filter.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                self.name.to_lowercase().contains(&term)
                    || self.description.to_lowercase().contains(&term)
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touchpoint(name: &str) -> Touchpoint {
        Touchpoint {
            id: String::new(),
            name: name.to_string(),
            description: String::new(),
            emotion: Emotion::Neutral,
            customer_action: None,
            customer_job: None,
            image: None,
            insights: None,
            metrics: None,
            feedback: None,
        }
    }

    fn stage(name: &str, order: i64, touchpoints: Vec<Touchpoint>) -> Stage {
        Stage {
            id: String::new(),
            name: name.to_string(),
            order,
            touchpoints,
            position: None,
        }
    }

    fn input(stages: Vec<Stage>) -> JourneyInput {
        JourneyInput {
            name: "Onboarding".to_string(),
            description: "First week".to_string(),
            cover_image: None,
            persona_ids: vec![],
            state: Some(JourneyState::Current),
            status: JourneyStatus::Active,
            stages,
        }
    }

    #[test]
    fn test_normalized_assigns_ids_and_sorts_stages() {
        let normalized = input(vec![
            stage("Use", 2, vec![touchpoint("Dashboard")]),
            stage("Discover", 1, vec![touchpoint("Ad"), touchpoint("Landing page")]),
        ])
        .normalized()
        .unwrap();

        assert_eq!(normalized.stages[0].name, "Discover");
        assert_eq!(normalized.stages[1].name, "Use");
        for stage in &normalized.stages {
            assert!(!stage.id.is_empty());
            for tp in &stage.touchpoints {
                assert!(!tp.id.is_empty());
            }
        }
    }

    #[test]
    fn test_normalized_keeps_existing_ids() {
        let mut s = stage("Discover", 0, vec![]);
        s.id = "stage-1".to_string();
        let normalized = input(vec![s]).normalized().unwrap();
        assert_eq!(normalized.stages[0].id, "stage-1");
    }

    #[test]
    fn test_metrics_out_of_range_rejected() {
        let mut tp = touchpoint("Checkout");
        tp.metrics = Some(Metrics {
            satisfaction: 120.0,
            effort: 10.0,
            completion: 50.0,
        });
        let err = input(vec![stage("Buy", 0, vec![tp])]).normalized().unwrap_err();
        assert!(err.contains("satisfaction"));
    }

    #[test]
    fn test_blank_stage_name_rejected() {
        assert!(input(vec![stage("  ", 0, vec![])]).normalized().is_err());
    }

    #[test]
    fn test_touchpoint_json_uses_snake_case() {
        let json = serde_json::json!({
            "name": "Support call",
            "emotion": "negative",
            "customer_action": "Calls the hotline",
            "insights": { "needs": ["quick answer"], "pain_points": ["hold music"] }
        });
        let tp: Touchpoint = serde_json::from_value(json).unwrap();
        assert_eq!(tp.emotion, Emotion::Negative);
        assert_eq!(tp.customer_action.as_deref(), Some("Calls the hotline"));
        assert_eq!(tp.insights.unwrap().pain_points, vec!["hold music"]);
    }

    #[test]
    fn test_filter_matches_case_insensitively() {
        let journey = Journey {
            id: "j".into(),
            workspace_id: "w".into(),
            name: "Checkout Flow".into(),
            description: "Mobile purchase".into(),
            cover_image: None,
            persona_ids: vec![],
            state: None,
            status: JourneyStatus::Draft,
            stages: vec![],
            created_by: "u".into(),
            created_at: String::new(),
            updated_at: String::new(),
        };
        let by_search = JourneyFilter {
            search: Some("MOBILE".into()),
            ..Default::default()
        };
        assert!(journey.matches(&by_search));
        let by_status = JourneyFilter {
            status: Some(JourneyStatus::Active),
            ..Default::default()
        };
        assert!(!journey.matches(&by_status));
        assert!(journey.matches(&JourneyFilter::default()));
    }

    #[test]
    fn test_filter_accepts_all_and_sort_keys() {
        let filter: JourneyFilter =
            serde_json::from_value(serde_json::json!({ "status": "all", "sort": "name" })).unwrap();
        assert_eq!(filter.status, None);
        assert_eq!(filter.sort, JourneySort::Name);

        let filter: JourneyFilter =
            serde_json::from_value(serde_json::json!({ "status": "active" })).unwrap();
        assert_eq!(filter.status, Some(JourneyStatus::Active));
        assert_eq!(filter.sort, JourneySort::Date);

        assert!(serde_json::from_value::<JourneyFilter>(serde_json::json!({ "status": "archived" })).is_err());
        assert!(serde_json::from_value::<JourneyFilter>(serde_json::json!({ "sort": "size" })).is_err());
    }
}
