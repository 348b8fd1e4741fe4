use std::sync::{Arc, Mutex};
use std::time::Duration;

use agrilink_forms::form::{FieldValue, FormId, SubmitOutcome};
use agrilink_forms::prelude::*;
use futures::executor::block_on;
use futures_timer::Delay;

const EMAIL_REQUIRED: &str = "Please enter your email address";
const EMAIL_INVALID: &str = "Please enter a valid email address";

fn reset_rules() -> Rules {
    Rules::new()
        .required("email", EMAIL_REQUIRED)
        .email("email", EMAIL_INVALID)
}

/// Stands in for the password-reset endpoint: records requested addresses
/// and fails for a blocked domain.
#[derive(Clone, Default)]
struct ResetService {
    requested: Arc<Mutex<Vec<String>>>,
}

impl ResetService {
    fn handler(&self) -> impl agrilink_forms::form::SubmitHandler {
        let requested = self.requested.clone();
        move |values: FormValues| {
            let requested = requested.clone();
            async move {
                Delay::new(Duration::from_millis(5)).await;
                let email = values
                    .get("email")
                    .and_then(FieldValue::as_text)
                    .unwrap_or_default()
                    .to_owned();
                if email.ends_with("@blocked.example") {
                    anyhow::bail!("reset request rejected for {email}");
                }
                requested.lock().expect("requested lock").push(email);
                Ok(())
            }
        }
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().expect("requested lock").clone()
    }
}

fn reset_form(service: &ResetService) -> FormController {
    let controller = FormController::new(
        form_values([("email", "")]),
        FormOptions::default(),
        service.handler(),
    );
    controller
        .register_validator(reset_rules())
        .expect("register rules");
    controller
}

#[test]
fn user_corrects_a_typo_and_requests_a_reset() {
    let service = ResetService::default();
    let form = reset_form(&service);

    form.handle_input(&InputEvent::text("email", "farmer@agrilink"))
        .expect("type email");
    assert_eq!(form.field_error_for_display("email").expect("error"), None);

    form.on_field_blur("email").expect("leave email");
    assert_eq!(
        form.field_error_for_display("email").expect("error"),
        Some(EMAIL_INVALID.to_owned())
    );

    form.handle_input(&InputEvent::text("email", "farmer@agrilink.io"))
        .expect("fix email");
    assert_eq!(form.field_error_for_display("email").expect("error"), None);

    let outcome = block_on(form.submit()).expect("submit");
    assert_eq!(outcome, SubmitOutcome::Submitted);
    assert_eq!(service.requested(), vec!["farmer@agrilink.io".to_owned()]);
    assert!(!form.is_submitting().expect("submitting"));
}

#[test]
fn empty_submit_shows_required_message_without_calling_the_service() {
    let service = ResetService::default();
    let form = reset_form(&service);

    let outcome = block_on(form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Invalid);
    assert!(service.requested().is_empty());
    let props = form.field_props("email").expect("props");
    assert_eq!(props.error, Some(EMAIL_REQUIRED.to_owned()));
    assert!(!props.touched);
}

#[test]
fn service_failure_is_logged_and_form_stays_editable() {
    let service = ResetService::default();
    let form = reset_form(&service);
    let failures = Arc::new(Mutex::new(Vec::new()));
    {
        let failures = failures.clone();
        form.register_diagnostic_sink(move |form_id: FormId, error: &anyhow::Error| {
            failures
                .lock()
                .expect("failures lock")
                .push((form_id, error.to_string()));
        })
        .expect("register sink");
    }

    form.on_field_change("email", "farmer@blocked.example")
        .expect("type email");
    let outcome = block_on(form.submit()).expect("submit");

    assert_eq!(outcome, SubmitOutcome::Failed);
    assert!(form.is_valid().expect("valid"));
    assert!(!form.is_submitting().expect("submitting"));
    assert_eq!(
        failures.lock().expect("failures lock").clone(),
        vec![(
            form.form_id().expect("form id"),
            "reset request rejected for farmer@blocked.example".to_owned()
        )]
    );

    form.on_field_change("email", "farmer@agrilink.io")
        .expect("retype email");
    assert_eq!(
        block_on(form.submit()).expect("retry"),
        SubmitOutcome::Submitted
    );
    assert_eq!(service.requested(), vec!["farmer@agrilink.io".to_owned()]);
}

#[test]
fn reset_clears_the_form_after_a_successful_request() {
    let service = ResetService::default();
    let form = reset_form(&service);

    form.on_field_change("email", "farmer@agrilink.io")
        .expect("type email");
    form.on_field_blur("email").expect("leave email");
    block_on(form.submit()).expect("submit");
    form.reset().expect("reset");

    let snapshot = form.snapshot().expect("snapshot");
    assert_eq!(snapshot.values, form_values([("email", "")]));
    assert!(snapshot.errors.is_empty());
    assert!(snapshot.touched.is_empty());
    assert_eq!(snapshot.last_outcome, None);
}

#[test]
fn options_can_come_from_config() {
    let options = FormOptions::from_toml_str(
        r#"
        validate_mode = "on_submit"
        submit_policy = "allow_overlap"
        "#,
    )
    .expect("parse options");
    assert_eq!(options.validate_mode, ValidationMode::OnSubmit);
    assert_eq!(options.submit_policy, SubmitPolicy::AllowOverlap);

    let service = ResetService::default();
    let form: FormController = FormController::new(
        form_values([("email", "")]),
        options,
        service.handler(),
    );
    form.register_validator(reset_rules())
        .expect("register rules");
    form.on_field_blur("email").expect("leave email");
    assert!(form.is_valid().expect("valid"));
    assert_eq!(form.options(), options);
}
