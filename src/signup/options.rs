use std::time::Duration;

use crate::io::DocumentFormat;

use super::messages::ValidationMessages;

#[derive(Debug, Clone)]
pub struct SignupOptions {
    pub email_debounce: Duration,
    pub messages: ValidationMessages,
    pub fallback_message: Option<String>,
    pub require_valid_submit: bool,
    pub submit_format: DocumentFormat,
    pub pretty: bool,
}

impl Default for SignupOptions {
    fn default() -> Self {
        Self {
            email_debounce: Duration::from_millis(1000),
            messages: ValidationMessages::default(),
            fallback_message: None,
            require_valid_submit: false,
            submit_format: DocumentFormat::Json,
            pretty: false,
        }
    }
}

impl SignupOptions {
    pub fn with_email_debounce(mut self, delay: Duration) -> Self {
        self.email_debounce = delay;
        self
    }

    pub fn with_messages(mut self, messages: ValidationMessages) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_message(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.messages = self.messages.with(key, text);
        self
    }

    pub fn with_fallback_message(mut self, text: impl Into<String>) -> Self {
        self.fallback_message = Some(text.into());
        self
    }

    pub fn with_require_valid_submit(mut self, enabled: bool) -> Self {
        self.require_valid_submit = enabled;
        self
    }

    pub fn with_submit_format(mut self, format: DocumentFormat) -> Self {
        self.submit_format = format;
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}
