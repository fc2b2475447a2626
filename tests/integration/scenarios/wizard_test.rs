//! Club creation wizard scenarios
//!
//! Need both a database and `TEST_REDIS_URL`, since wizard state lives in Redis.

use assert_matches::assert_matches;
use serde_json::{json, Map, Value};
use serial_test::serial;
use ClubHub::models::ClubStatus;
use ClubHub::services::WizardStepInput;
use ClubHub::ClubHubError;

use crate::helpers::{register, TestContext};
use crate::integration::setup_integration_test;
use crate::require_db;

fn step(step: &str, data: Value) -> WizardStepInput {
    let data: Map<String, Value> = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    WizardStepInput {
        step: step.to_string(),
        skip: false,
        data,
    }
}

#[tokio::test]
#[serial]
async fn test_wizard_creates_club() {
    if !TestContext::redis_configured() {
        return;
    }
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let wizard = &ctx.services.wizard;
    let user_id = founder.user.id;

    assert_matches!(wizard.current(user_id).await, Err(ClubHubError::NotFound { .. }));

    let state = wizard.start(user_id).await.unwrap();
    assert_eq!(state.step, "basic_info");
    assert!(!state.can_go_back);

    // Finishing early is a state error
    assert_matches!(wizard.finish(user_id).await, Err(ClubHubError::InvalidStateTransition { .. }));

    assert_matches!(
        wizard.submit_step(user_id, step("basic_info", json!({ "name": "Jazz Ensemble" }))).await,
        Err(ClubHubError::InvalidInput(_))
    );
    assert_matches!(
        wizard.submit_step(user_id, step("details", json!({}))).await,
        Err(ClubHubError::InvalidStateTransition { .. })
    );

    let state = wizard
        .submit_step(user_id, step("basic_info", json!({ "name": "Jazz Ensemble", "category": "arts" })))
        .await
        .unwrap();
    assert_eq!(state.step, "details");
    assert_eq!(state.data.get("category"), Some(&json!("Arts")));

    let state = wizard
        .submit_step(
            user_id,
            step(
                "details",
                json!({
                    "description": "Weekly jam sessions for every instrument.",
                    "tags": ["jazz", " music ", ""],
                }),
            ),
        )
        .await
        .unwrap();
    assert_eq!(state.step, "contact");
    assert!(state.skippable);

    let state = wizard.back(user_id).await.unwrap();
    assert_eq!(state.step, "details");
    assert_eq!(state.data.get("description"), Some(&json!("Weekly jam sessions for every instrument.")));
    let state = wizard
        .submit_step(user_id, step("details", json!({ "description": "Weekly jam sessions for every instrument." })))
        .await
        .unwrap();
    assert_eq!(state.step, "contact");

    let state = wizard
        .submit_step(
            user_id,
            WizardStepInput {
                step: "contact".to_string(),
                skip: true,
                data: Map::new(),
            },
        )
        .await
        .unwrap();
    assert_eq!(state.step, "review");
    assert!(state.is_final);

    let club = wizard.finish(user_id).await.unwrap();
    assert_eq!(club.name, "Jazz Ensemble");
    assert_eq!(club.category, "Arts");
    assert_eq!(club.status, ClubStatus::Pending);
    assert_eq!(club.contact_email, None);

    assert_matches!(wizard.current(user_id).await, Err(ClubHubError::NotFound { .. }));
}

#[tokio::test]
#[serial]
async fn test_wizard_cancel_discards_state() {
    if !TestContext::redis_configured() {
        return;
    }
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let wizard = &ctx.services.wizard;

    wizard.start(founder.user.id).await.unwrap();
    assert_matches!(
        wizard
            .submit_step(
                founder.user.id,
                WizardStepInput {
                    step: "basic_info".to_string(),
                    skip: true,
                    data: Map::new(),
                },
            )
            .await,
        Err(ClubHubError::InvalidInput(_))
    );

    wizard.cancel(founder.user.id).await.unwrap();
    assert_matches!(wizard.cancel(founder.user.id).await, Err(ClubHubError::NotFound { .. }));
    assert_eq!(ctx.database.count_records("clubs").await.unwrap(), 0);
}
