//! Wizard context
//!
//! Where a user is inside a multi-step wizard: the scenario, the current
//! step, the steps behind it (for going back) and the answers collected.

use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::utils::errors::{ClubHubError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardContext {
    pub user_id: i64,
    pub scenario: Option<String>,
    pub step: Option<String>,
    /// Visited steps, oldest first
    #[serde(default)]
    pub history: Vec<String>,
    /// Answers keyed by field name
    pub data: HashMap<String, serde_json::Value>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl WizardContext {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            scenario: None,
            step: None,
            history: Vec::new(),
            data: HashMap::new(),
            expires_at: None,
            updated_at: Utc::now(),
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Begin `scenario` at `first_step`, dropping whatever was there before
    pub fn start_scenario(&mut self, scenario: &str, first_step: &str, ttl: Duration) {
        self.complete_scenario();
        self.scenario = Some(scenario.to_owned());
        self.step = Some(first_step.to_owned());
        self.expires_at = Some(self.updated_at + ttl);
    }

    pub fn next_step(&mut self, step: &str) -> Result<()> {
        if self.scenario.is_none() {
            return Err(ClubHubError::InvalidStateTransition {
                from: "idle".to_owned(),
                to: step.to_owned(),
            });
        }

        self.history.extend(self.step.replace(step.to_owned()));
        self.touch();
        Ok(())
    }

    /// Step back one page. Answers already given stay in `data`.
    pub fn previous_step(&mut self) -> Result<&str> {
        let Some(previous) = self.history.pop() else {
            return Err(ClubHubError::InvalidStateTransition {
                from: self.step.clone().unwrap_or_else(|| "idle".to_owned()),
                to: "previous".to_owned(),
            });
        };

        self.touch();
        Ok(self.step.insert(previous).as_str())
    }

    pub fn complete_scenario(&mut self) {
        self.scenario = None;
        self.step = None;
        self.expires_at = None;
        self.history.clear();
        self.data.clear();
        self.touch();
    }

    pub fn set_data<T: Serialize>(&mut self, key: &str, value: T) -> Result<()> {
        self.data.insert(key.to_owned(), serde_json::to_value(value)?);
        self.touch();
        Ok(())
    }

    /// Typed answer; JSON null counts as absent
    pub fn get_data<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.data.get(key) {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(T::deserialize(value)?)),
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get_data(key).ok().flatten()
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get_data(key).ok().flatten()
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.expires_at, Some(at) if at < Utc::now())
    }

    pub fn set_expiry(&mut self, expires_at: DateTime<Utc>) {
        self.expires_at = Some(expires_at);
        self.touch();
    }

    pub fn is_in_scenario(&self, scenario: &str) -> bool {
        self.scenario.as_deref() == Some(scenario)
    }

    pub fn is_at_step(&self, step: &str) -> bool {
        self.step.as_deref() == Some(step)
    }

    /// Every key must hold a non-null answer
    pub fn validate_data(&self, required: &[&str]) -> Result<()> {
        match required.iter().find(|key| self.data.get(**key).map_or(true, |v| v.is_null())) {
            Some(key) => Err(ClubHubError::InvalidInput(format!("Missing required wizard data: {}", key))),
            None => Ok(()),
        }
    }

    pub fn remaining_seconds(&self) -> Option<i64> {
        self.expires_at.map(|at| (at - Utc::now()).num_seconds().max(0))
    }
}
