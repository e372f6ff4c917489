use std::{cell::RefCell, collections::VecDeque, rc::Rc, time::Instant};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::{
    form::{
        Control, ControlPath, FormCommand, FormError, FormState, ListControl, ValidationErrors,
        apply_command,
        builder::{field, group, list},
        validators::{email, email_matcher, max_length, min_length, rating_range, required},
    },
    io::{DocumentFormat, parse_document_str, render_value},
    reactive::QuietPeriod,
};

use super::{customer::Customer, options::SignupOptions};

pub const EMAIL_PATH: &str = "emailGroup.email";
pub const PHONE_PATH: &str = "phone";
pub const NOTIFICATION_PATH: &str = "notification";
pub const ADDRESSES_PATH: &str = "addresses";

/// The customer signup form tree with its default values and validators.
pub fn build_form() -> Control {
    group(
        [
            ("firstName", field(json!(""), vec![required(), min_length(3)])),
            ("lastName", field(json!(""), vec![required(), max_length(50)])),
            (
                "emailGroup",
                group(
                    [
                        ("email", field(json!(""), vec![required(), email()])),
                        ("confirmEmail", field(json!(""), vec![required()])),
                    ],
                    vec![email_matcher()],
                ),
            ),
            ("phone", field(json!(""), Vec::new())),
            ("rating", field(Value::Null, vec![rating_range(1.0, 5.0)])),
            ("notification", field(json!("email"), Vec::new())),
            ("sendCatalog", field(json!(true), Vec::new())),
            ("addresses", list(vec![build_address()])),
        ],
        Vec::new(),
    )
}

pub fn build_address() -> Control {
    group(
        [
            ("addressType", field(json!("home"), Vec::new())),
            ("street1", field(json!(""), Vec::new())),
            ("street2", field(json!(""), Vec::new())),
            ("city", field(json!(""), Vec::new())),
            ("state", field(json!(""), Vec::new())),
            ("zip", field(json!(""), Vec::new())),
        ],
        Vec::new(),
    )
}

/// Complete record for the strict populate operation, sized for a single address.
pub fn test_data() -> Value {
    json!({
        "firstName": "Robert",
        "lastName": "Manuel",
        "emailGroup": {
            "email": "roberto@gmail.com",
            "confirmEmail": "roberto@gmail.com"
        },
        "phone": "",
        "rating": null,
        "notification": "email",
        "sendCatalog": true,
        "addresses": [{
            "addressType": "home",
            "street1": "",
            "street2": "",
            "city": "",
            "state": "",
            "zip": ""
        }]
    })
}

/// The short customer record; only usable through the merge operation.
pub fn partial_test_data() -> Value {
    json!({
        "firstName": "Robert",
        "lastName": "Manuel",
        "email": "roberto@gmail.com",
        "sendCatalog": true
    })
}

type EmailQueue = Rc<RefCell<VecDeque<(Value, Instant)>>>;

/// Inbound triggers of the signup screen.
#[derive(Debug, Clone, PartialEq)]
pub enum SignupCommand {
    Form(FormCommand),
    AddAddress,
    RemoveAddress(usize),
    PopulateTestData,
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The form value was logged; `line` is the `Saved: ...` entry.
    Saved { line: String, valid: bool },
    /// Submission blocked because the form is invalid.
    Rejected {
        errors: IndexMap<String, ValidationErrors>,
    },
}

/// The signup screen: owns the form, its reactions and the email feedback message.
pub struct SignupComponent {
    form: FormState,
    options: SignupOptions,
    customer: Customer,
    email_message: String,
    email_changes: EmailQueue,
    email_feedback: QuietPeriod<Value>,
    destroyed: bool,
}

impl SignupComponent {
    pub fn new(options: SignupOptions) -> Self {
        let mut form = FormState::new(build_form());

        form.subscribe(NOTIFICATION_PATH, |change, root| {
            apply_notification(root, change.value.as_str().unwrap_or_default());
        });

        let email_changes = EmailQueue::default();
        let queue = Rc::clone(&email_changes);
        form.subscribe(EMAIL_PATH, move |change, _| {
            queue
                .borrow_mut()
                .push_back((change.value.clone(), change.at));
        });

        Self {
            form,
            email_feedback: QuietPeriod::new(options.email_debounce),
            options,
            customer: Customer::default(),
            email_message: String::new(),
            email_changes,
            destroyed: false,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn options(&self) -> &SignupOptions {
        &self.options
    }

    pub fn email_message(&self) -> &str {
        &self.email_message
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The customer record as captured by the last successful submit.
    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn addresses(&self) -> Option<&ListControl> {
        self.form.get(ADDRESSES_PATH).and_then(Control::as_list)
    }

    pub fn input(&mut self, path: impl Into<ControlPath>, value: Value) -> Result<(), FormError> {
        self.input_at(path, value, Instant::now())
    }

    pub fn input_at(
        &mut self,
        path: impl Into<ControlPath>,
        value: Value,
        at: Instant,
    ) -> Result<(), FormError> {
        self.tick_at(at);
        self.form.input(path, value, at)
    }

    pub fn touch(&mut self, path: impl Into<ControlPath>) -> Result<(), FormError> {
        self.tick_at(Instant::now());
        self.form.touch(path)
    }

    pub fn tick(&mut self) -> bool {
        self.tick_at(Instant::now())
    }

    /// Advances the email feedback stage. Returns true when the message was recomputed.
    ///
    /// Every mutation runs this first, so a settled value is judged against the form
    /// as it stood when the value settled.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        if self.destroyed {
            return false;
        }
        let mut refreshed = self.drain_email_changes();
        if self.email_feedback.poll(now).is_some() {
            self.refresh_email_message();
            refreshed = true;
        }
        refreshed
    }

    /// Whether an email change is still waiting for its quiet period to end.
    pub fn feedback_pending(&self) -> bool {
        !self.email_changes.borrow().is_empty() || self.email_feedback.is_pending()
    }

    /// `"text"` makes the phone number required, anything else drops its validators.
    pub fn set_notification(&mut self, notify_via: &str) {
        apply_notification(self.form.root_mut(), notify_via);
    }

    /// Recomputes the user-facing message for the control at `path`.
    pub fn set_message(&self, path: impl Into<ControlPath>) -> String {
        let Some(control) = self.form.get(path) else {
            return String::new();
        };
        match control.errors() {
            Some(errors) if control.touched() || control.dirty() => self
                .options
                .messages
                .render(errors, self.options.fallback_message.as_deref()),
            _ => String::new(),
        }
    }

    pub fn add_address(&mut self) -> Result<usize, FormError> {
        self.add_address_at(Instant::now())
    }

    pub fn add_address_at(&mut self, at: Instant) -> Result<usize, FormError> {
        let index = self.form.push_control(ADDRESSES_PATH, build_address(), at)?;
        debug!(index, "address appended");
        Ok(index)
    }

    pub fn remove_address(&mut self, index: usize) -> Result<(), FormError> {
        self.remove_address_at(index, Instant::now())
    }

    pub fn remove_address_at(&mut self, index: usize, at: Instant) -> Result<(), FormError> {
        self.form.remove_control(ADDRESSES_PATH, index, at)?;
        debug!(index, "address removed");
        Ok(())
    }

    /// Logs the live form state and the serialized value.
    pub fn save(&mut self) -> Result<SubmitOutcome> {
        let valid = self.form.valid();
        let errors = self.form.collect_errors();
        if self.options.require_valid_submit && !valid {
            warn!(issues = errors.len(), "submit rejected: form is invalid");
            return Ok(SubmitOutcome::Rejected { errors });
        }

        info!(
            status = ?self.form.status(),
            dirty = self.form.is_dirty(),
            errors = ?errors,
            "customer form state"
        );
        let value = self.form.value();
        let payload = render_value(&value, self.options.submit_format, self.options.pretty)
            .context("failed to serialize the signup form")?;
        let line = format!("Saved: {payload}");
        info!("{line}");
        self.customer = Customer::from_form_value(&value);
        Ok(SubmitOutcome::Saved { line, valid })
    }

    /// Overwrites every field with [`test_data`]. Fails without changes when the
    /// form holds more addresses than the record.
    pub fn populate_test_data(&mut self) -> Result<(), FormError> {
        self.populate_with(&test_data(), Instant::now())
    }

    /// Merges [`partial_test_data`]; keys without a control are ignored.
    pub fn populate_partial_test_data(&mut self) -> usize {
        let now = Instant::now();
        self.tick_at(now);
        self.form.patch_value(&partial_test_data(), now)
    }

    /// Strictly populates from a fixture document.
    pub fn populate_from_str(&mut self, contents: &str, format: DocumentFormat) -> Result<()> {
        let value = parse_document_str(contents, format)?;
        self.populate_with(&value, Instant::now())
            .with_context(|| format!("fixture does not fit the signup form ({format})"))
    }

    pub fn dispatch(&mut self, command: SignupCommand) -> Result<Option<SubmitOutcome>> {
        self.dispatch_at(command, Instant::now())
    }

    pub fn dispatch_at(
        &mut self,
        command: SignupCommand,
        at: Instant,
    ) -> Result<Option<SubmitOutcome>> {
        self.tick_at(at);
        match command {
            SignupCommand::Form(command) => apply_command(&mut self.form, command, at)?,
            SignupCommand::AddAddress => {
                self.add_address_at(at)?;
            }
            SignupCommand::RemoveAddress(index) => self.remove_address_at(index, at)?,
            SignupCommand::PopulateTestData => self.populate_with(&test_data(), at)?,
            SignupCommand::Submit => return self.save().map(Some),
        }
        Ok(None)
    }

    /// Releases listeners and pending feedback; later ticks do nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.form.clear_listeners();
        self.email_feedback.cancel();
        self.email_changes.borrow_mut().clear();
        self.destroyed = true;
        debug!("signup component destroyed");
    }

    fn populate_with(&mut self, value: &Value, at: Instant) -> Result<(), FormError> {
        self.tick_at(at);
        self.form.set_value(value, at).inspect_err(|err| {
            warn!(error = %err, "populating the signup form failed");
        })
    }

    // Values are replayed with their original timestamps so a quiet period that ended
    // between two changes still fires.
    fn drain_email_changes(&mut self) -> bool {
        let mut refreshed = false;
        while let Some((value, at)) = self.next_email_change() {
            if self.email_feedback.poll(at).is_some() {
                self.refresh_email_message();
                refreshed = true;
            }
            self.email_feedback.push(value, at);
        }
        refreshed
    }

    fn next_email_change(&self) -> Option<(Value, Instant)> {
        self.email_changes.borrow_mut().pop_front()
    }

    fn refresh_email_message(&mut self) {
        self.email_message = self.set_message(EMAIL_PATH);
        debug!(message = %self.email_message, "email feedback refreshed");
    }
}

impl Default for SignupComponent {
    fn default() -> Self {
        Self::new(SignupOptions::default())
    }
}

fn apply_notification(root: &mut Control, notify_via: &str) {
    let Some(phone) = root.get_mut(PHONE_PATH) else {
        return;
    };
    if notify_via == "text" {
        phone.set_validators(vec![required()]);
    } else {
        phone.clear_validators();
    }
    debug!(notify_via, "phone validators updated");
    root.refresh_along(ControlPath::parse(PHONE_PATH).segments());
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn component() -> SignupComponent {
        SignupComponent::default()
    }

    #[test]
    fn default_form_matches_field_table() {
        let form = component();
        assert_eq!(
            form.form().value(),
            json!({
                "firstName": "",
                "lastName": "",
                "emailGroup": {"email": "", "confirmEmail": ""},
                "phone": "",
                "rating": null,
                "notification": "email",
                "sendCatalog": true,
                "addresses": [{
                    "addressType": "home",
                    "street1": "",
                    "street2": "",
                    "city": "",
                    "state": "",
                    "zip": ""
                }]
            })
        );
        let state = form.form();
        assert!(state.has_error("firstName", "required"));
        assert!(state.has_error("lastName", "required"));
        assert!(state.has_error("emailGroup.email", "required"));
        assert!(state.has_error("emailGroup.confirmEmail", "required"));
        assert!(state.errors("emailGroup").is_none());
        assert!(state.errors("phone").is_none());
        assert!(state.errors("rating").is_none());
        assert!(!state.valid());
    }

    #[test]
    fn notification_toggles_phone_requirement() {
        let mut form = component();
        form.input(NOTIFICATION_PATH, json!("text")).unwrap();
        assert!(form.form().has_error(PHONE_PATH, "required"));

        form.input(NOTIFICATION_PATH, json!("email")).unwrap();
        assert!(form.form().errors(PHONE_PATH).is_none());
        assert!(form.form().get(PHONE_PATH).unwrap().validators().is_empty());

        form.set_notification("text");
        assert!(form.form().has_error(PHONE_PATH, "required"));
        form.input(PHONE_PATH, json!("555-0100")).unwrap();
        assert!(form.form().errors(PHONE_PATH).is_none());
    }

    #[test]
    fn set_message_requires_interaction() {
        let mut form = component();
        assert_eq!(form.set_message(EMAIL_PATH), "");
        form.touch(EMAIL_PATH).unwrap();
        assert_eq!(form.set_message(EMAIL_PATH), "Please enter your email address.");
        form.input(EMAIL_PATH, json!("nope")).unwrap();
        assert_eq!(
            form.set_message(EMAIL_PATH),
            "Please enter a valid email address."
        );
        form.input(EMAIL_PATH, json!("a@b.com")).unwrap();
        assert_eq!(form.set_message(EMAIL_PATH), "");
        assert_eq!(form.set_message("missing.path"), "");
    }

    #[test]
    fn fallback_message_covers_unmapped_keys() {
        let mut form = SignupComponent::new(
            SignupOptions::default().with_fallback_message("Check this field."),
        );
        form.input("firstName", json!("Al")).unwrap();
        assert_eq!(form.set_message("firstName"), "Check this field.");
    }

    #[test]
    fn email_feedback_waits_for_quiet_period() {
        let mut form = component();
        let start = Instant::now();
        form.input_at(EMAIL_PATH, json!("a"), start).unwrap();
        form.input_at(EMAIL_PATH, json!("a@"), start + Duration::from_millis(300))
            .unwrap();
        assert!(!form.tick_at(start + Duration::from_millis(1000)));
        assert_eq!(form.email_message(), "");
        assert!(form.feedback_pending());

        assert!(form.tick_at(start + Duration::from_millis(1300)));
        assert_eq!(form.email_message(), "Please enter a valid email address.");
        assert!(!form.feedback_pending());
    }

    #[test]
    fn settled_value_is_judged_before_the_next_edit() {
        let mut form = component();
        let start = Instant::now();
        form.touch(EMAIL_PATH).unwrap();
        form.input_at(EMAIL_PATH, json!("x"), start).unwrap();
        form.input_at(EMAIL_PATH, json!("x@y.com"), start + Duration::from_millis(1500))
            .unwrap();
        assert_eq!(form.email_message(), "Please enter a valid email address.");
        assert!(form.feedback_pending());

        assert!(!form.tick_at(start + Duration::from_millis(1500)));
        assert_eq!(form.email_message(), "Please enter a valid email address.");

        assert!(form.tick_at(start + Duration::from_millis(2500)));
        assert_eq!(form.email_message(), "");
        assert!(!form.feedback_pending());
    }

    #[test]
    fn addresses_append_and_remove() {
        let mut form = component();
        assert_eq!(form.add_address().unwrap(), 1);
        assert_eq!(form.add_address().unwrap(), 2);
        let addresses = form.addresses().unwrap();
        assert_eq!(addresses.len(), 3);
        let first = addresses.controls()[0].value();
        assert!(addresses.controls().iter().all(|entry| entry.value() == first));

        form.remove_address(1).unwrap();
        assert_eq!(form.addresses().unwrap().len(), 2);
        form.dispatch(SignupCommand::RemoveAddress(0)).unwrap();
        form.dispatch(SignupCommand::AddAddress).unwrap();
        assert_eq!(form.addresses().unwrap().len(), 2);
        assert!(matches!(
            form.remove_address(7),
            Err(FormError::IndexOutOfRange { len: 2, .. })
        ));
    }

    #[test]
    fn populate_is_strict_about_addresses() {
        let mut form = component();
        form.populate_test_data().unwrap();
        assert_eq!(form.form().value(), test_data());
        assert!(form.form().valid());

        form.add_address().unwrap();
        let err = form.populate_test_data().unwrap_err();
        assert_eq!(
            err,
            FormError::MissingValue {
                path: "addresses.1".into()
            }
        );
    }

    #[test]
    fn partial_payload_needs_merge() {
        let mut form = component();
        let err = form
            .dispatch(SignupCommand::Form(FormCommand::SetValue(partial_test_data())))
            .unwrap_err();
        assert!(err.downcast_ref::<FormError>().is_some());

        assert_eq!(form.populate_partial_test_data(), 3);
        let value = form.form().value();
        assert_eq!(value["firstName"], json!("Robert"));
        assert_eq!(value["emailGroup"]["email"], json!(""));
    }

    #[test]
    fn destroy_releases_reactions() {
        let mut form = component();
        let start = Instant::now();
        form.touch(EMAIL_PATH).unwrap();
        form.input_at(EMAIL_PATH, json!("x"), start).unwrap();
        form.destroy();
        assert!(form.is_destroyed());
        assert_eq!(form.form().listener_count(), 0);
        assert!(!form.tick_at(start + Duration::from_secs(5)));
        assert_eq!(form.email_message(), "");

        form.input(NOTIFICATION_PATH, json!("text")).unwrap();
        assert!(form.form().errors(PHONE_PATH).is_none());
    }
}
