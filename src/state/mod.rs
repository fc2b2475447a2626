//! Wizard state module
//!
//! Multi-step flows (currently club creation) and their per-user state

pub mod context;
pub mod scenarios;
pub mod storage;

pub use context::WizardContext;
pub use scenarios::{InputType, Scenario, ScenarioManager, ScenarioStep, StepField, StepValidation, CLUB_CREATION};
pub use storage::StateStorage;
