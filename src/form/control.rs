use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use super::{
    error::{FormError, ValidationErrors},
    path::ControlPath,
    validators::Validator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ControlStatus {
    Valid,
    Invalid,
}

/// Interaction flags. `dirty` means the user changed the value, `touched` that the
/// control lost focus at least once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlFlags {
    pub dirty: bool,
    pub touched: bool,
}

#[derive(Debug, Clone)]
pub struct FieldControl {
    value: Value,
    default: Value,
    validators: Vec<Validator>,
    errors: Option<ValidationErrors>,
    flags: ControlFlags,
}

#[derive(Debug, Clone)]
pub struct GroupControl {
    controls: IndexMap<String, Control>,
    validators: Vec<Validator>,
    errors: Option<ValidationErrors>,
    flags: ControlFlags,
}

#[derive(Debug, Clone)]
pub struct ListControl {
    controls: Vec<Control>,
    validators: Vec<Validator>,
    errors: Option<ValidationErrors>,
    flags: ControlFlags,
}

/// A node of the form tree.
#[derive(Debug, Clone)]
pub enum Control {
    Field(FieldControl),
    Group(GroupControl),
    List(ListControl),
}

impl FieldControl {
    pub fn new(value: Value, validators: Vec<Validator>) -> Self {
        Self {
            default: value.clone(),
            value,
            validators,
            errors: None,
            flags: ControlFlags::default(),
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl GroupControl {
    pub fn new(controls: IndexMap<String, Control>, validators: Vec<Validator>) -> Self {
        Self {
            controls,
            validators,
            errors: None,
            flags: ControlFlags::default(),
        }
    }

    pub fn controls(&self) -> impl Iterator<Item = (&str, &Control)> {
        self.controls.iter().map(|(name, control)| (name.as_str(), control))
    }
}

impl ListControl {
    pub fn new(controls: Vec<Control>, validators: Vec<Validator>) -> Self {
        Self {
            controls,
            validators,
            errors: None,
            flags: ControlFlags::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    pub fn push(&mut self, mut control: Control) {
        control.refresh_subtree();
        self.controls.push(control);
    }

    pub fn remove(&mut self, index: usize) -> Option<Control> {
        (index < self.controls.len()).then(|| self.controls.remove(index))
    }
}

impl Control {
    /// Current value; groups serialize to objects in declaration order, lists to arrays.
    pub fn value(&self) -> Value {
        match self {
            Control::Field(field) => field.value.clone(),
            Control::Group(group) => Value::Object(
                group
                    .controls
                    .iter()
                    .map(|(name, control)| (name.clone(), control.value()))
                    .collect::<Map<_, _>>(),
            ),
            Control::List(list) => Value::Array(list.controls.iter().map(Control::value).collect()),
        }
    }

    /// Failures reported by this control's own validators.
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            Control::Field(field) => field.errors.as_ref(),
            Control::Group(group) => group.errors.as_ref(),
            Control::List(list) => list.errors.as_ref(),
        }
    }

    pub fn has_error(&self, key: &str) -> bool {
        self.errors().is_some_and(|errors| errors.contains(key))
    }

    /// Valid when this control and every descendant report no failures.
    pub fn valid(&self) -> bool {
        self.errors().is_none() && self.children().all(|(_, child)| child.valid())
    }

    pub fn status(&self) -> ControlStatus {
        if self.valid() {
            ControlStatus::Valid
        } else {
            ControlStatus::Invalid
        }
    }

    pub fn dirty(&self) -> bool {
        self.flags().dirty || self.children().any(|(_, child)| child.dirty())
    }

    pub fn pristine(&self) -> bool {
        !self.dirty()
    }

    pub fn touched(&self) -> bool {
        self.flags().touched || self.children().any(|(_, child)| child.touched())
    }

    pub fn validators(&self) -> &[Validator] {
        match self {
            Control::Field(field) => &field.validators,
            Control::Group(group) => &group.validators,
            Control::List(list) => &list.validators,
        }
    }

    /// Replaces the validator set. Call [`Control::update_value_and_validity`] afterwards.
    pub fn set_validators(&mut self, validators: Vec<Validator>) {
        *self.validators_mut() = validators;
    }

    pub fn add_validator(&mut self, validator: Validator) {
        self.validators_mut().push(validator);
    }

    pub fn clear_validators(&mut self) {
        self.validators_mut().clear();
    }

    /// Re-runs validators of this control and everything beneath it.
    pub fn update_value_and_validity(&mut self) {
        self.refresh_subtree();
    }

    pub fn mark_as_dirty(&mut self) {
        self.flags_mut().dirty = true;
    }

    pub fn mark_as_touched(&mut self) {
        self.flags_mut().touched = true;
    }

    pub fn mark_all_as_touched(&mut self) {
        self.flags_mut().touched = true;
        for child in self.children_mut() {
            child.mark_all_as_touched();
        }
    }

    pub fn mark_as_pristine(&mut self) {
        self.flags_mut().dirty = false;
        for child in self.children_mut() {
            child.mark_as_pristine();
        }
    }

    pub fn as_list(&self) -> Option<&ListControl> {
        match self {
            Control::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut ListControl> {
        match self {
            Control::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupControl> {
        match self {
            Control::Group(group) => Some(group),
            _ => None,
        }
    }

    /// Looks up a descendant by dotted path (`emailGroup.email`, `addresses.0.city`).
    pub fn get(&self, path: impl Into<ControlPath>) -> Option<&Control> {
        let path = path.into();
        let mut current = self;
        for segment in path.segments() {
            current = current.child(segment)?;
        }
        Some(current)
    }

    pub fn get_mut(&mut self, path: impl Into<ControlPath>) -> Option<&mut Control> {
        let path = path.into();
        let mut current = self;
        for segment in path.segments() {
            current = current.child_mut(segment)?;
        }
        Some(current)
    }

    /// Every control with failures, keyed by dotted path, parents before children.
    pub fn collect_errors(&self) -> IndexMap<String, ValidationErrors> {
        let mut acc = IndexMap::new();
        self.collect_errors_into(&ControlPath::root(), &mut acc);
        acc
    }

    /// Leaf paths in declaration order.
    pub fn leaf_paths(&self) -> Vec<ControlPath> {
        let mut acc = Vec::new();
        self.leaf_paths_into(&ControlPath::root(), &mut acc);
        acc
    }

    /// Restores default values and clears interaction flags.
    pub fn reset(&mut self) {
        match self {
            Control::Field(field) => {
                field.value = field.default.clone();
                field.flags = ControlFlags::default();
            }
            Control::Group(group) => {
                group.flags = ControlFlags::default();
                for child in group.controls.values_mut() {
                    child.reset();
                }
            }
            Control::List(list) => {
                list.flags = ControlFlags::default();
                for child in &mut list.controls {
                    child.reset();
                }
            }
        }
        self.refresh_subtree();
    }

    /// Verifies that `value` supplies every control beneath `path` and names no unknown ones.
    pub(crate) fn check_complete(
        &self,
        path: &ControlPath,
        value: &Value,
    ) -> Result<(), FormError> {
        match self {
            Control::Field(_) => Ok(()),
            Control::Group(group) => {
                let Value::Object(map) = value else {
                    return Err(FormError::ShapeMismatch {
                        path: path.to_string(),
                        expected: "an object",
                    });
                };
                for key in map.keys() {
                    if !group.controls.contains_key(key) {
                        return Err(FormError::UnknownControl {
                            path: path.child(key.as_str()).to_string(),
                        });
                    }
                }
                for (name, child) in &group.controls {
                    let child_path = path.child(name.as_str());
                    let Some(child_value) = map.get(name) else {
                        return Err(FormError::MissingValue {
                            path: child_path.to_string(),
                        });
                    };
                    child.check_complete(&child_path, child_value)?;
                }
                Ok(())
            }
            Control::List(list) => {
                let Value::Array(items) = value else {
                    return Err(FormError::ShapeMismatch {
                        path: path.to_string(),
                        expected: "an array",
                    });
                };
                if items.len() > list.controls.len() {
                    return Err(FormError::UnknownControl {
                        path: path.child(list.controls.len().to_string()).to_string(),
                    });
                }
                for (index, child) in list.controls.iter().enumerate() {
                    let child_path = path.child(index.to_string());
                    let Some(child_value) = items.get(index) else {
                        return Err(FormError::MissingValue {
                            path: child_path.to_string(),
                        });
                    };
                    child.check_complete(&child_path, child_value)?;
                }
                Ok(())
            }
        }
    }

    /// Assigns `value` to every matching control, recording assigned leaf paths.
    /// Keys and indices without a control are ignored; validity is not refreshed here.
    pub(crate) fn assign(
        &mut self,
        path: &ControlPath,
        value: &Value,
        assigned: &mut Vec<ControlPath>,
    ) {
        match self {
            Control::Field(field) => {
                field.value = value.clone();
                assigned.push(path.clone());
            }
            Control::Group(group) => {
                let Value::Object(map) = value else {
                    return;
                };
                for (name, child) in group.controls.iter_mut() {
                    if let Some(child_value) = map.get(name) {
                        child.assign(&path.child(name.as_str()), child_value, assigned);
                    }
                }
            }
            Control::List(list) => {
                let Value::Array(items) = value else {
                    return;
                };
                for (index, (child, child_value)) in
                    list.controls.iter_mut().zip(items.iter()).enumerate()
                {
                    child.assign(&path.child(index.to_string()), child_value, assigned);
                }
            }
        }
    }

    /// Sets a leaf value without touching its interaction flags.
    pub(crate) fn set_field_value(&mut self, value: Value) -> bool {
        match self {
            Control::Field(field) => {
                field.value = value;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn refresh_subtree(&mut self) {
        for child in self.children_mut() {
            child.refresh_subtree();
        }
        self.run_validators();
    }

    /// Refreshes the control at `segments` and then every ancestor on the way back up.
    pub(crate) fn refresh_along(&mut self, segments: &[String]) {
        if let Some((head, rest)) = segments.split_first() {
            if let Some(child) = self.child_mut(head) {
                child.refresh_along(rest);
            }
            self.run_validators();
        } else {
            self.refresh_subtree();
        }
    }

    fn run_validators(&mut self) {
        let mut merged: Option<ValidationErrors> = None;
        for validator in self.validators() {
            if let Some(errors) = validator.validate(self) {
                merged.get_or_insert_with(ValidationErrors::new).merge(errors);
            }
        }
        *self.errors_slot() = merged;
    }

    fn child(&self, segment: &str) -> Option<&Control> {
        match self {
            Control::Field(_) => None,
            Control::Group(group) => group.controls.get(segment),
            Control::List(list) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| list.controls.get(index)),
        }
    }

    fn child_mut(&mut self, segment: &str) -> Option<&mut Control> {
        match self {
            Control::Field(_) => None,
            Control::Group(group) => group.controls.get_mut(segment),
            Control::List(list) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| list.controls.get_mut(index)),
        }
    }

    fn children(&self) -> Box<dyn Iterator<Item = (String, &Control)> + '_> {
        match self {
            Control::Field(_) => Box::new(std::iter::empty::<(String, &Control)>()),
            Control::Group(group) => Box::new(
                group
                    .controls
                    .iter()
                    .map(|(name, control)| (name.clone(), control)),
            ),
            Control::List(list) => Box::new(
                list.controls
                    .iter()
                    .enumerate()
                    .map(|(index, control)| (index.to_string(), control)),
            ),
        }
    }

    fn children_mut(&mut self) -> Box<dyn Iterator<Item = &mut Control> + '_> {
        match self {
            Control::Field(_) => Box::new(std::iter::empty::<&mut Control>()),
            Control::Group(group) => Box::new(group.controls.values_mut()),
            Control::List(list) => Box::new(list.controls.iter_mut()),
        }
    }

    fn collect_errors_into(
        &self,
        path: &ControlPath,
        acc: &mut IndexMap<String, ValidationErrors>,
    ) {
        if let Some(errors) = self.errors() {
            acc.insert(path.to_string(), errors.clone());
        }
        for (segment, child) in self.children() {
            child.collect_errors_into(&path.child(segment), acc);
        }
    }

    fn leaf_paths_into(&self, path: &ControlPath, acc: &mut Vec<ControlPath>) {
        if let Control::Field(_) = self {
            acc.push(path.clone());
            return;
        }
        for (segment, child) in self.children() {
            child.leaf_paths_into(&path.child(segment), acc);
        }
    }

    fn flags(&self) -> ControlFlags {
        match self {
            Control::Field(field) => field.flags,
            Control::Group(group) => group.flags,
            Control::List(list) => list.flags,
        }
    }

    fn flags_mut(&mut self) -> &mut ControlFlags {
        match self {
            Control::Field(field) => &mut field.flags,
            Control::Group(group) => &mut group.flags,
            Control::List(list) => &mut list.flags,
        }
    }

    fn validators_mut(&mut self) -> &mut Vec<Validator> {
        match self {
            Control::Field(field) => &mut field.validators,
            Control::Group(group) => &mut group.validators,
            Control::List(list) => &mut list.validators,
        }
    }

    fn errors_slot(&mut self) -> &mut Option<ValidationErrors> {
        match self {
            Control::Field(field) => &mut field.errors,
            Control::Group(group) => &mut group.errors,
            Control::List(list) => &mut list.errors,
        }
    }
}
