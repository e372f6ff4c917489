use std::time::Instant;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::reactive::{ChangeHub, Subscription, ValueChange};

use super::{
    control::{Control, ControlStatus, ListControl},
    error::{FormError, ValidationErrors},
    path::ControlPath,
    validators::Validator,
};

/// The root of a form tree together with the listeners attached to it.
///
/// Every mutation revalidates synchronously before listeners are notified.
#[derive(Debug)]
pub struct FormState {
    root: Control,
    hub: ChangeHub,
}

impl FormState {
    pub fn new(mut root: Control) -> Self {
        root.refresh_subtree();
        Self {
            root,
            hub: ChangeHub::new(),
        }
    }

    pub fn root(&self) -> &Control {
        &self.root
    }

    pub fn get(&self, path: impl Into<ControlPath>) -> Option<&Control> {
        self.root.get(path)
    }

    /// Direct tree access for reactions that must not re-notify listeners.
    pub(crate) fn root_mut(&mut self) -> &mut Control {
        &mut self.root
    }

    pub fn value(&self) -> Value {
        self.root.value()
    }

    pub fn valid(&self) -> bool {
        self.root.valid()
    }

    pub fn status(&self) -> ControlStatus {
        self.root.status()
    }

    pub fn errors(&self, path: impl Into<ControlPath>) -> Option<&ValidationErrors> {
        self.root.get(path).and_then(Control::errors)
    }

    pub fn has_error(&self, path: impl Into<ControlPath>, key: &str) -> bool {
        self.root
            .get(path)
            .is_some_and(|control| control.has_error(key))
    }

    pub fn collect_errors(&self) -> IndexMap<String, ValidationErrors> {
        self.root.collect_errors()
    }

    pub fn is_dirty(&self) -> bool {
        self.root.dirty()
    }

    pub fn subscribe(
        &mut self,
        path: impl Into<ControlPath>,
        listener: impl FnMut(&ValueChange, &mut Control) + 'static,
    ) -> Subscription {
        self.hub.subscribe(path.into(), listener)
    }

    pub fn unsubscribe(&mut self, id: Subscription) -> bool {
        self.hub.unsubscribe(id)
    }

    pub fn clear_listeners(&mut self) {
        self.hub.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.hub.len()
    }

    /// A user edit: assigns the value, marks the field dirty and notifies listeners.
    pub fn input(
        &mut self,
        path: impl Into<ControlPath>,
        value: Value,
        at: Instant,
    ) -> Result<(), FormError> {
        let path = path.into();
        let control = self.control_mut(&path)?;
        if !control.set_field_value(value) {
            return Err(FormError::ShapeMismatch {
                path: path.to_string(),
                expected: "a field",
            });
        }
        control.mark_as_dirty();
        self.root.refresh_along(path.segments());
        self.hub.dispatch(&path, at, &mut self.root);
        Ok(())
    }

    /// Marks a control as having lost focus. Validity is unaffected.
    pub fn touch(&mut self, path: impl Into<ControlPath>) -> Result<(), FormError> {
        let path = path.into();
        self.control_mut(&path)?.mark_as_touched();
        Ok(())
    }

    pub fn mark_all_as_touched(&mut self) {
        self.root.mark_all_as_touched();
    }

    pub fn mark_as_pristine(&mut self) {
        self.root.mark_as_pristine();
    }

    /// Programmatic assignment of a subtree; interaction flags stay untouched.
    ///
    /// Unlike [`FormState::set_value`] the payload may be partial.
    pub fn set_control_value(
        &mut self,
        path: impl Into<ControlPath>,
        value: &Value,
        at: Instant,
    ) -> Result<(), FormError> {
        let path = path.into();
        let mut assigned = Vec::new();
        self.control_mut(&path)?.assign(&path, value, &mut assigned);
        self.root.refresh_along(path.segments());
        self.notify_all(&assigned, at);
        Ok(())
    }

    /// Replaces the whole form value. The payload must name every control and nothing
    /// else; on error the form is left unchanged.
    pub fn set_value(&mut self, value: &Value, at: Instant) -> Result<(), FormError> {
        self.root.check_complete(&ControlPath::root(), value)?;
        let mut assigned = Vec::new();
        self.root.assign(&ControlPath::root(), value, &mut assigned);
        self.root.refresh_subtree();
        self.notify_all(&assigned, at);
        Ok(())
    }

    /// Merges a partial payload: controls it names are assigned, unknown keys are ignored.
    /// Returns the number of fields assigned.
    pub fn patch_value(&mut self, value: &Value, at: Instant) -> usize {
        let mut assigned = Vec::new();
        self.root.assign(&ControlPath::root(), value, &mut assigned);
        self.root.refresh_subtree();
        self.notify_all(&assigned, at);
        assigned.len()
    }

    /// Restores defaults and clears flags. Listeners stay registered.
    pub fn reset(&mut self, at: Instant) {
        self.root.reset();
        let leaves = self.root.leaf_paths();
        self.notify_all(&leaves, at);
    }

    pub fn set_validators(
        &mut self,
        path: impl Into<ControlPath>,
        validators: Vec<Validator>,
    ) -> Result<(), FormError> {
        let path = path.into();
        debug!(path = %path, count = validators.len(), "replacing validators");
        self.control_mut(&path)?.set_validators(validators);
        Ok(())
    }

    pub fn add_validator(
        &mut self,
        path: impl Into<ControlPath>,
        validator: Validator,
    ) -> Result<(), FormError> {
        let path = path.into();
        self.control_mut(&path)?.add_validator(validator);
        Ok(())
    }

    pub fn clear_validators(&mut self, path: impl Into<ControlPath>) -> Result<(), FormError> {
        let path = path.into();
        debug!(path = %path, "clearing validators");
        self.control_mut(&path)?.clear_validators();
        Ok(())
    }

    /// Revalidates the control at `path`, its descendants and its ancestors.
    pub fn update_value_and_validity(
        &mut self,
        path: impl Into<ControlPath>,
    ) -> Result<(), FormError> {
        let path = path.into();
        self.control_mut(&path)?;
        self.root.refresh_along(path.segments());
        Ok(())
    }

    /// Appends `control` to the list at `path` and returns its index.
    pub fn push_control(
        &mut self,
        path: impl Into<ControlPath>,
        control: Control,
        at: Instant,
    ) -> Result<usize, FormError> {
        let path = path.into();
        let list = self.list_mut(&path)?;
        list.push(control);
        let index = list.len() - 1;
        self.root.refresh_along(path.segments());
        self.hub.dispatch(&path, at, &mut self.root);
        Ok(index)
    }

    pub fn remove_control(
        &mut self,
        path: impl Into<ControlPath>,
        index: usize,
        at: Instant,
    ) -> Result<Control, FormError> {
        let path = path.into();
        let list = self.list_mut(&path)?;
        let len = list.len();
        let removed = list.remove(index).ok_or_else(|| FormError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len,
        })?;
        self.root.refresh_along(path.segments());
        self.hub.dispatch(&path, at, &mut self.root);
        Ok(removed)
    }

    fn notify_all(&mut self, paths: &[ControlPath], at: Instant) {
        for path in paths {
            self.hub.dispatch(path, at, &mut self.root);
        }
    }

    fn control_mut(&mut self, path: &ControlPath) -> Result<&mut Control, FormError> {
        self.root.get_mut(path).ok_or_else(|| FormError::NoControl {
            path: path.to_string(),
        })
    }

    fn list_mut(&mut self, path: &ControlPath) -> Result<&mut ListControl, FormError> {
        self.control_mut(path)?
            .as_list_mut()
            .ok_or_else(|| FormError::ShapeMismatch {
                path: path.to_string(),
                expected: "a list",
            })
    }
}
