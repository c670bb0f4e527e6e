use crate::dom_utils::{attr, collect_text, has_attr};
use crate::{Id, Node};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputControlType {
    Text,
    Checkbox,
    Radio,
    Other,
}

pub fn input_control_type(node: &Node) -> InputControlType {
    if !node.is_element("input") {
        return InputControlType::Other;
    }

    let ty = attr(node, "type")
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match ty {
        None => InputControlType::Text, // missing type defaults to text
        Some(t) if t.eq_ignore_ascii_case("text") => InputControlType::Text,
        Some(t) if t.eq_ignore_ascii_case("checkbox") => InputControlType::Checkbox,
        Some(t) if t.eq_ignore_ascii_case("radio") => InputControlType::Radio,
        _ => InputControlType::Other,
    }
}

pub fn is_checkable(node: &Node) -> bool {
    matches!(
        input_control_type(node),
        InputControlType::Checkbox | InputControlType::Radio
    )
}

/// Runtime state of form controls. Markup only ever holds the defaults.
#[derive(Clone, Debug, Default)]
pub struct FormState {
    values: HashMap<Id, String>,
    checked: HashMap<Id, bool>,
}

impl FormState {
    pub fn value(&self, id: Id) -> Option<&str> {
        self.values.get(&id).map(String::as_str)
    }

    pub fn set_value(&mut self, id: Id, value: String) {
        self.values.insert(id, value);
    }

    pub fn checked(&self, id: Id) -> Option<bool> {
        self.checked.get(&id).copied()
    }

    pub fn set_checked(&mut self, id: Id, checked: bool) {
        self.checked.insert(id, checked);
    }

    pub fn forget(&mut self, id: Id) {
        self.values.remove(&id);
        self.checked.remove(&id);
    }
}

/// The value markup alone implies: `value` for inputs, the selected option for selects.
pub fn default_value(node: &Node) -> String {
    if node.is_element("select") {
        let options = crate::traverse::elements_by_tag(node, "option");
        let chosen = options
            .iter()
            .find(|o| has_attr(o, "selected"))
            .or_else(|| options.first());
        return chosen.map(|o| option_value(o)).unwrap_or_default();
    }
    attr(node, "value").unwrap_or("").to_string()
}

fn option_value(option: &Node) -> String {
    if let Some(v) = attr(option, "value") {
        return v.to_string();
    }
    let mut text = String::new();
    collect_text(option.children(), &mut text);
    text.trim().to_string()
}
