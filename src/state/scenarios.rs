//! Wizard scenarios implementation
//!
//! A scenario is a fixed graph of steps; each step declares the fields it
//! collects and how they are validated. The only scenario shipped today is
//! the club creation wizard.

use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use crate::models::CLUB_CATEGORIES;
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers;
use super::context::WizardContext;

pub const CLUB_CREATION: &str = "club_creation";

/// Represents a wizard scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub initial_step: String,
    pub steps: HashMap<String, ScenarioStep>,
    /// Maximum lifetime of an unfinished run, in seconds
    pub max_duration: u64,
}

/// Represents a step within a scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Allowed next steps; empty for the final step
    pub next_steps: Vec<String>,
    pub fields: Vec<StepField>,
    /// Whether the step can be skipped without input
    pub skippable: bool,
}

impl ScenarioStep {
    pub fn is_final(&self) -> bool {
        self.next_steps.is_empty()
    }
}

/// One input collected by a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepField {
    pub key: String,
    pub label: String,
    pub required: bool,
    pub validation: StepValidation,
}

/// Validation rules for a field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepValidation {
    pub input_type: InputType,
    /// Minimum length in characters (text inputs)
    pub min_length: Option<usize>,
    /// Maximum length in characters, or items for lists
    pub max_length: Option<usize>,
    pub error_message: Option<String>,
}

/// Types of input expected by a field
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "options", rename_all = "snake_case")]
pub enum InputType {
    Text,
    Number,
    Email,
    Url,
    Choice(Vec<String>),
    /// List of short strings; `max_length` limits the item count
    List { max_item_length: usize },
}

/// Scenario registry
#[derive(Debug, Clone)]
pub struct ScenarioManager {
    scenarios: HashMap<String, Scenario>,
}

impl Default for ScenarioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ScenarioManager {
    pub fn new() -> Self {
        let mut manager = Self {
            scenarios: HashMap::new(),
        };
        manager.register_scenario(create_club_creation_scenario());
        manager
    }

    pub fn register_scenario(&mut self, scenario: Scenario) {
        self.scenarios.insert(scenario.id.clone(), scenario);
    }

    pub fn get_scenario(&self, id: &str) -> Result<&Scenario> {
        self.scenarios
            .get(id)
            .ok_or_else(|| ClubHubError::InvalidInput(format!("Unknown scenario: {}", id)))
    }

    /// Start (or restart) a scenario; expiry is the scenario's max duration
    pub fn start_scenario(&self, context: &mut WizardContext, scenario_id: &str) -> Result<()> {
        let scenario = self.get_scenario(scenario_id)?;
        context.start_scenario(
            scenario_id,
            &scenario.initial_step,
            chrono::Duration::seconds(scenario.max_duration as i64),
        );
        Ok(())
    }

    /// Move to an allowed next step
    pub fn next_step(&self, context: &mut WizardContext, next_step: &str) -> Result<()> {
        let current = self.get_current_step(context)?;

        if !current.next_steps.iter().any(|s| s == next_step) {
            return Err(ClubHubError::InvalidStateTransition {
                from: current.id.clone(),
                to: next_step.to_string(),
            });
        }

        context.next_step(next_step)
    }

    /// Move to the single default successor of the current step
    pub fn advance(&self, context: &mut WizardContext) -> Result<String> {
        let current = self.get_current_step(context)?;
        let next = current
            .next_steps
            .first()
            .cloned()
            .ok_or_else(|| ClubHubError::InvalidStateTransition {
                from: current.id.clone(),
                to: "next".to_string(),
            })?;
        self.next_step(context, &next)?;
        Ok(next)
    }

    pub fn get_current_step(&self, context: &WizardContext) -> Result<&ScenarioStep> {
        let scenario_id = context
            .scenario
            .as_deref()
            .ok_or_else(|| ClubHubError::InvalidInput("No active scenario".to_string()))?;
        let step_id = context
            .step
            .as_deref()
            .ok_or_else(|| ClubHubError::InvalidInput("No active step".to_string()))?;

        self.get_scenario(scenario_id)?
            .steps
            .get(step_id)
            .ok_or_else(|| ClubHubError::InvalidInput(format!("Unknown step: {}", step_id)))
    }

    /// Validate input for the current step and return the normalized values.
    /// Every field of the step appears in the result; absent optional fields
    /// are `null`. Keys the step does not declare are ignored.
    pub fn validate_input(&self, context: &WizardContext, input: &Map<String, Value>) -> Result<Map<String, Value>> {
        let step = self.get_current_step(context)?;
        let mut values = Map::new();

        for field in &step.fields {
            let value = match input.get(&field.key) {
                None | Some(Value::Null) => Value::Null,
                Some(Value::String(s)) if s.trim().is_empty() => Value::Null,
                Some(v) => validate_field(field, v)?,
            };

            if value.is_null() && field.required {
                return Err(ClubHubError::InvalidInput(format!("{} is required", field.label)));
            }
            values.insert(field.key.clone(), value);
        }

        Ok(values)
    }
}

fn field_error(field: &StepField, fallback: String) -> ClubHubError {
    ClubHubError::InvalidInput(field.validation.error_message.clone().unwrap_or(fallback))
}

/// Validate one non-empty value against its field rules
fn validate_field(field: &StepField, value: &Value) -> Result<Value> {
    let rules = &field.validation;

    match &rules.input_type {
        InputType::Number => {
            let number = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            match number {
                Some(n) if n > 0 => Ok(Value::from(n)),
                _ => Err(field_error(field, format!("{} must be a positive whole number", field.label))),
            }
        }
        InputType::List { max_item_length } => {
            let items = value
                .as_array()
                .ok_or_else(|| field_error(field, format!("{} must be a list", field.label)))?;
            if let Some(max) = rules.max_length {
                if items.len() > max {
                    return Err(field_error(field, format!("{} may have at most {} entries", field.label, max)));
                }
            }
            let mut cleaned = Vec::with_capacity(items.len());
            for item in items {
                let text = item
                    .as_str()
                    .ok_or_else(|| field_error(field, format!("{} entries must be text", field.label)))?
                    .trim();
                if text.is_empty() {
                    continue;
                }
                if text.chars().count() > *max_item_length {
                    return Err(field_error(
                        field,
                        format!("{} entries must be at most {} characters", field.label, max_item_length),
                    ));
                }
                cleaned.push(Value::from(text));
            }
            Ok(Value::Array(cleaned))
        }
        input_type => {
            let raw = value
                .as_str()
                .ok_or_else(|| field_error(field, format!("{} must be text", field.label)))?;
            let text = helpers::require_text(
                &field.label,
                raw,
                rules.min_length.unwrap_or(0),
                rules.max_length.unwrap_or(usize::MAX),
            )
            .map_err(|e| match &rules.error_message {
                Some(message) => ClubHubError::InvalidInput(message.clone()),
                None => e,
            })?;

            match input_type {
                InputType::Email if !helpers::is_valid_email(&text) => {
                    Err(field_error(field, format!("{} must be a valid email address", field.label)))
                }
                InputType::Url if !helpers::is_valid_url(&text) => {
                    Err(field_error(field, format!("{} must be a valid URL", field.label)))
                }
                InputType::Choice(choices) => choices
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(&text))
                    .map(|c| Value::from(c.as_str()))
                    .ok_or_else(|| {
                        field_error(field, format!("Invalid choice. Available options: {}", choices.join(", ")))
                    }),
                _ => Ok(Value::from(text)),
            }
        }
    }
}

fn text_field(key: &str, label: &str, required: bool, min: Option<usize>, max: usize) -> StepField {
    StepField {
        key: key.to_string(),
        label: label.to_string(),
        required,
        validation: StepValidation {
            input_type: InputType::Text,
            min_length: min,
            max_length: Some(max),
            error_message: None,
        },
    }
}

fn typed_field(key: &str, label: &str, input_type: InputType, max_length: Option<usize>) -> StepField {
    StepField {
        key: key.to_string(),
        label: label.to_string(),
        required: false,
        validation: StepValidation {
            input_type,
            min_length: None,
            max_length,
            error_message: None,
        },
    }
}

/// Club creation: basic_info -> details -> contact -> review
fn create_club_creation_scenario() -> Scenario {
    let mut steps = HashMap::new();

    let mut category = typed_field(
        "category",
        "Category",
        InputType::Choice(CLUB_CATEGORIES.iter().map(|c| c.to_string()).collect()),
        None,
    );
    category.required = true;

    steps.insert("basic_info".to_string(), ScenarioStep {
        id: "basic_info".to_string(),
        name: "Basic Information".to_string(),
        description: "Club name, category and university".to_string(),
        next_steps: vec!["details".to_string()],
        fields: vec![
            text_field("name", "Club name", true, Some(3), 100),
            category,
            typed_field("university_id", "University", InputType::Number, None),
        ],
        skippable: false,
    });

    steps.insert("details".to_string(), ScenarioStep {
        id: "details".to_string(),
        name: "Details".to_string(),
        description: "What the club does and when it meets".to_string(),
        next_steps: vec!["contact".to_string()],
        fields: vec![
            text_field("description", "Description", true, Some(10), 2000),
            text_field("meeting_schedule", "Meeting schedule", false, None, 200),
            typed_field("tags", "Tags", InputType::List { max_item_length: 30 }, Some(10)),
        ],
        skippable: false,
    });

    steps.insert("contact".to_string(), ScenarioStep {
        id: "contact".to_string(),
        name: "Contact".to_string(),
        description: "How students can reach the club".to_string(),
        next_steps: vec!["review".to_string()],
        fields: vec![
            typed_field("contact_email", "Contact email", InputType::Email, Some(254)),
            typed_field("logo_url", "Logo URL", InputType::Url, Some(2048)),
        ],
        skippable: true,
    });

    steps.insert("review".to_string(), ScenarioStep {
        id: "review".to_string(),
        name: "Review".to_string(),
        description: "Confirm and submit the club".to_string(),
        next_steps: vec![],
        fields: vec![],
        skippable: false,
    });

    Scenario {
        id: CLUB_CREATION.to_string(),
        name: "Club Creation".to_string(),
        initial_step: "basic_info".to_string(),
        steps,
        max_duration: 3600,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn started() -> (ScenarioManager, WizardContext) {
        let manager = ScenarioManager::new();
        let mut context = WizardContext::new(1);
        manager.start_scenario(&mut context, CLUB_CREATION).unwrap();
        (manager, context)
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_scenario_creation() {
        let manager = ScenarioManager::new();
        let scenario = manager.get_scenario(CLUB_CREATION).unwrap();
        assert_eq!(scenario.initial_step, "basic_info");
        assert_eq!(scenario.steps.len(), 4);
        assert!(scenario.steps["contact"].skippable);
        assert!(scenario.steps["review"].is_final());
        assert!(manager.get_scenario("onboarding").is_err());
    }

    #[test]
    fn test_scenario_flow() {
        let (manager, mut context) = started();
        assert!(context.is_in_scenario(CLUB_CREATION) && context.is_at_step("basic_info"));
        assert!(context.remaining_seconds().unwrap() > 3500);

        assert_eq!(manager.advance(&mut context).unwrap(), "details");
        assert_eq!(manager.advance(&mut context).unwrap(), "contact");
        assert_eq!(manager.advance(&mut context).unwrap(), "review");
        assert_matches!(
            manager.advance(&mut context),
            Err(ClubHubError::InvalidStateTransition { .. })
        );
    }

    #[test]
    fn test_invalid_transitions() {
        let (manager, mut context) = started();
        assert_matches!(
            manager.next_step(&mut context, "review"),
            Err(ClubHubError::InvalidStateTransition { from, to }) if from == "basic_info" && to == "review"
        );
    }

    #[test]
    fn test_basic_info_validation() {
        let (manager, context) = started();

        let values = manager
            .validate_input(&context, &object(json!({
                "name": "  Chess Club ",
                "category": "academic",
                "university_id": "3",
                "unexpected": true
            })))
            .unwrap();
        assert_eq!(values["name"], "Chess Club");
        assert_eq!(values["category"], "Academic");
        assert_eq!(values["university_id"], 3);
        assert!(!values.contains_key("unexpected"));

        let err = manager
            .validate_input(&context, &object(json!({ "name": "Chess Club" })))
            .unwrap_err();
        assert_matches!(err, ClubHubError::InvalidInput(msg) if msg == "Category is required");

        assert!(manager
            .validate_input(&context, &object(json!({ "name": "ab", "category": "Academic" })))
            .is_err());
        assert!(manager
            .validate_input(&context, &object(json!({ "name": "Chess", "category": "Knitting Circle" })))
            .is_err());
        assert!(manager
            .validate_input(&context, &object(json!({ "name": "Chess", "category": "Academic", "university_id": -1 })))
            .is_err());
    }

    #[test]
    fn test_details_and_contact_validation() {
        let (manager, mut context) = started();
        manager.advance(&mut context).unwrap();

        let values = manager
            .validate_input(&context, &object(json!({
                "description": "We play chess every week.",
                "tags": ["strategy", " ", "games"]
            })))
            .unwrap();
        assert_eq!(values["meeting_schedule"], Value::Null);
        assert_eq!(values["tags"], json!(["strategy", "games"]));

        let too_many: Vec<String> = (0..11).map(|i| format!("tag{}", i)).collect();
        assert!(manager
            .validate_input(&context, &object(json!({ "description": "We play chess every week.", "tags": too_many })))
            .is_err());
        assert!(manager
            .validate_input(&context, &object(json!({ "description": "short" })))
            .is_err());

        manager.advance(&mut context).unwrap();
        let values = manager.validate_input(&context, &Map::new()).unwrap();
        assert_eq!(values["contact_email"], Value::Null);
        assert!(manager
            .validate_input(&context, &object(json!({ "contact_email": "not-an-email" })))
            .is_err());
        assert!(manager
            .validate_input(&context, &object(json!({ "logo_url": "ftp://example.com/logo.png" })))
            .is_err());
    }
}
