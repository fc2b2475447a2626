//! Club creation wizard service
//!
//! Drives the `club_creation` scenario for a user: each step is validated and
//! stored in Redis, and `finish` hands the collected data to the club service.

use std::collections::HashMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;
use crate::models::{Club, CreateClubRequest};
use crate::services::auth::AuthService;
use crate::services::club::ClubService;
use crate::state::{WizardContext, ScenarioManager, StateStorage, StepField, CLUB_CREATION};
use crate::utils::errors::{ClubHubError, Result};
use crate::utils::logging::log_user_action;

const REQUIRED_KEYS: [&str; 3] = ["name", "category", "description"];

/// Input for one wizard step
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WizardStepInput {
    /// Step the client believes it is on
    pub step: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// What the client renders for the current step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardState {
    pub scenario: String,
    pub step: String,
    pub step_name: String,
    pub description: String,
    pub fields: Vec<StepField>,
    pub skippable: bool,
    pub can_go_back: bool,
    pub is_final: bool,
    pub data: HashMap<String, Value>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct WizardService {
    storage: StateStorage,
    scenarios: ScenarioManager,
    clubs: ClubService,
    auth: AuthService,
}

impl WizardService {
    pub fn new(storage: StateStorage, clubs: ClubService, auth: AuthService) -> Self {
        Self {
            storage,
            scenarios: ScenarioManager::new(),
            clubs,
            auth,
        }
    }

    fn state(&self, context: &WizardContext) -> Result<WizardState> {
        let step = self.scenarios.get_current_step(context)?;
        Ok(WizardState {
            scenario: context.scenario.clone().unwrap_or_default(),
            step: step.id.clone(),
            step_name: step.name.clone(),
            description: step.description.clone(),
            fields: step.fields.clone(),
            skippable: step.skippable,
            can_go_back: !context.history.is_empty(),
            is_final: step.is_final(),
            data: context.data.clone(),
            expires_at: context.expires_at,
        })
    }

    async fn active_context(&self, user_id: i64) -> Result<WizardContext> {
        self.storage
            .load_context(user_id)
            .await?
            .filter(|c| c.is_in_scenario(CLUB_CREATION))
            .ok_or_else(|| ClubHubError::not_found("wizard", user_id))
    }

    /// Begin a new run; an unfinished one is discarded
    pub async fn start(&self, user_id: i64) -> Result<WizardState> {
        self.auth.active_user(user_id).await?;

        let mut context = WizardContext::new(user_id);
        self.scenarios.start_scenario(&mut context, CLUB_CREATION)?;
        self.storage.save_context(&context).await?;

        log_user_action(user_id, "wizard_started", Some(CLUB_CREATION));
        self.state(&context)
    }

    pub async fn current(&self, user_id: i64) -> Result<WizardState> {
        let context = self.active_context(user_id).await?;
        self.state(&context)
    }

    /// Validate and store the current step's input, then advance
    pub async fn submit_step(&self, user_id: i64, input: WizardStepInput) -> Result<WizardState> {
        let mut context = self.active_context(user_id).await?;
        let step = self.scenarios.get_current_step(&context)?.clone();

        if step.id != input.step {
            return Err(ClubHubError::InvalidStateTransition {
                from: step.id,
                to: input.step,
            });
        }
        if step.is_final() {
            return Err(ClubHubError::InvalidInput(
                "The review step is completed by finishing the wizard".to_string(),
            ));
        }

        if input.skip {
            if !step.skippable {
                return Err(ClubHubError::InvalidInput(format!("Step '{}' cannot be skipped", step.id)));
            }
            for field in &step.fields {
                context.set_data(&field.key, Value::Null)?;
            }
        } else {
            let values = self.scenarios.validate_input(&context, &input.data)?;
            for (key, value) in values {
                context.set_data(&key, value)?;
            }
        }

        let next = self.scenarios.advance(&mut context)?;
        self.storage.save_context(&context).await?;

        info!(user_id = user_id, from = %step.id, to = %next, skipped = input.skip, "Wizard step completed");
        self.state(&context)
    }

    /// Go back one step; values already entered are kept
    pub async fn back(&self, user_id: i64) -> Result<WizardState> {
        let mut context = self.active_context(user_id).await?;
        context.previous_step()?;
        self.storage.save_context(&context).await?;
        self.state(&context)
    }

    pub async fn cancel(&self, user_id: i64) -> Result<()> {
        self.active_context(user_id).await?;
        self.storage.delete_context(user_id).await?;
        log_user_action(user_id, "wizard_cancelled", Some(CLUB_CREATION));
        Ok(())
    }

    /// Create the club from the collected data (only from the review step)
    pub async fn finish(&self, user_id: i64) -> Result<Club> {
        let context = self.active_context(user_id).await?;
        let step = self.scenarios.get_current_step(&context)?;
        if !step.is_final() {
            return Err(ClubHubError::InvalidStateTransition {
                from: step.id.clone(),
                to: "submitted".to_string(),
            });
        }

        let club = self.clubs.create(user_id, club_request(&context)?).await?;
        self.storage.delete_context(user_id).await?;

        log_user_action(user_id, "wizard_submitted", Some(&club.id.to_string()));
        Ok(club)
    }
}

/// Build the club request from wizard data
pub fn club_request(context: &WizardContext) -> Result<CreateClubRequest> {
    context.validate_data(&REQUIRED_KEYS)?;

    Ok(CreateClubRequest {
        name: context.get_string("name").unwrap_or_default(),
        description: context.get_string("description").unwrap_or_default(),
        category: context.get_string("category").unwrap_or_default(),
        university_id: context.get_i64("university_id"),
        logo_url: context.get_string("logo_url"),
        contact_email: context.get_string("contact_email"),
        meeting_schedule: context.get_string("meeting_schedule"),
        social_links: None,
        tags: context.get_data::<Vec<String>>("tags")?,
    })
}
