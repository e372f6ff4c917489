use serde_json::Value;

use super::path::ControlPath;

/// Inbound events a rendering layer can send to a form.
#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Input { path: ControlPath, value: Value },
    Touch { path: ControlPath },
    TouchAll,
    SetValue(Value),
    PatchValue(Value),
    Reset,
}

impl FormCommand {
    pub fn input(path: impl Into<ControlPath>, value: impl Into<Value>) -> Self {
        FormCommand::Input {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn touch(path: impl Into<ControlPath>) -> Self {
        FormCommand::Touch { path: path.into() }
    }
}
