use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use signup_form::{SignupComponent, SignupOptions, SubmitOutcome, signup::EMAIL_PATH};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut signup = SignupComponent::new(SignupOptions::default());

    let start = Instant::now();
    signup.input_at("firstName", json!("Ro"), start)?;
    signup.input_at("lastName", json!("Manuel"), start)?;
    for (offset, typed) in [(0, "roberto"), (200, "roberto@"), (400, "roberto@gmail")] {
        signup.input_at(EMAIL_PATH, json!(typed), start + Duration::from_millis(offset))?;
    }
    signup.touch(EMAIL_PATH)?;
    signup.tick_at(start + Duration::from_millis(1400));
    info!(message = signup.email_message(), "email feedback");

    signup.input_at("notification", json!("text"), start)?;
    signup.add_address()?;

    if let SubmitOutcome::Saved { valid, .. } = signup.save()? {
        info!(valid, "first submit");
    }

    let mut fresh = SignupComponent::default();
    fresh.populate_test_data()?;
    if let SubmitOutcome::Saved { valid, .. } = fresh.save()? {
        info!(valid, customer = ?fresh.customer(), "test data submit");
    }
    fresh.destroy();
    signup.destroy();
    Ok(())
}
