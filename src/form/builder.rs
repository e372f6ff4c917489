//! Tree-construction helpers. Controls built here are not validated yet; the owning
//! [`FormState`](super::FormState) runs every validator once the tree is assembled.

use indexmap::IndexMap;
use serde_json::Value;

use super::{
    control::{Control, FieldControl, GroupControl, ListControl},
    validators::Validator,
};

pub fn field(value: Value, validators: Vec<Validator>) -> Control {
    Control::Field(FieldControl::new(value, validators))
}

pub fn group<'a>(
    controls: impl IntoIterator<Item = (&'a str, Control)>,
    validators: Vec<Validator>,
) -> Control {
    let controls = controls
        .into_iter()
        .map(|(name, control)| (name.to_string(), control))
        .collect::<IndexMap<_, _>>();
    Control::Group(GroupControl::new(controls, validators))
}

pub fn list(controls: Vec<Control>) -> Control {
    Control::List(ListControl::new(controls, Vec::new()))
}
