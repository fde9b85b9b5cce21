use serde::{Deserialize, Serialize};

use crate::method_registry::NegationRule;

/// No-op step type; never sent to the remote server.
pub const ECHO_STEP_NAME: &str = "echo";
/// Step type played back locally with a timer.
pub const PAUSE_STEP_NAME: &str = "pause";
/// Navigation step type; the first step of a script carries the base URL.
pub const OPEN_STEP_NAME: &str = "open";

pub const PATTERN_PARAM: &str = "pattern";
pub const VARIABLE_NAME_PARAM: &str = "variableName";

const FRAME_SELECTION_STEPS: [&str; 2] = ["selectFrame", "selectFrameAndWait"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// How a step parameter's value is represented.
pub enum ParamKind {
    Locator,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A concrete step type derived from one base operation and one naming variant.
pub struct StepType {
    name: String,
    base_name: String,
    registry_name: String,
    negation: Option<NegationRule>,
    params: Vec<String>,
}

impl StepType {
    /// Builds a step type from the resolved base operation. `base_params` come
    /// from the API surface; synthetic `pattern`/`variableName` parameters are
    /// appended according to the expanded name.
    pub fn new(
        name: impl Into<String>,
        base_name: impl Into<String>,
        registry_name: impl Into<String>,
        negation: Option<NegationRule>,
        base_params: Vec<String>,
    ) -> Self {
        let name = name.into();
        let base_name = base_name.into();
        let mut params = base_params;
        let getter = base_name.starts_with("get") || base_name.starts_with("is");
        if getter
            && (name.starts_with("assert")
                || name.starts_with("verify")
                || name.starts_with("waitFor"))
        {
            params.push(PATTERN_PARAM.to_string());
        }
        if getter && name.starts_with("store") {
            params.push(VARIABLE_NAME_PARAM.to_string());
        }
        Self {
            name,
            base_name,
            registry_name: registry_name.into(),
            negation,
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Operation name in the API surface, e.g. `doClick` for `clickAndWait`.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Name as listed in the method registry, e.g. `click`.
    pub fn registry_name(&self) -> &str {
        &self.registry_name
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn param_kind(&self, param: &str) -> ParamKind {
        if param == "optionLocator" || FRAME_SELECTION_STEPS.contains(&self.name.as_str()) {
            return ParamKind::String;
        }
        if param.to_ascii_lowercase().contains("locator") {
            ParamKind::Locator
        } else {
            ParamKind::String
        }
    }

    pub fn negatable(&self) -> bool {
        self.negation.is_some()
    }

    pub fn negation_rule(&self) -> Option<NegationRule> {
        self.negation
    }

    /// Negated step name, computed from the expanded name on demand.
    pub fn negated_name(&self) -> Option<String> {
        self.negation.map(|rule| rule.apply(&self.name))
    }

    pub fn is_echo(&self) -> bool {
        self.name == ECHO_STEP_NAME
    }

    pub fn is_pause(&self) -> bool {
        self.name == PAUSE_STEP_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::{ParamKind, StepType};
    use crate::method_registry::NegationRule;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn unit_assert_variant_of_getter_appends_pattern() {
        let step = StepType::new(
            "assertTextPresent",
            "isTextPresent",
            "isTextPresent",
            Some(NegationRule::Default),
            params(&["target"]),
        );
        assert_eq!(step.params(), ["target", "pattern"]);
        assert_eq!(
            step.negated_name().as_deref(),
            Some("assertTextNotPresent")
        );
    }

    #[test]
    fn unit_store_variant_appends_variable_name_only() {
        let step = StepType::new("storeTitle", "getTitle", "getTitle", None, Vec::new());
        assert_eq!(step.params(), ["variableName"]);
        assert!(!step.negatable());
        assert_eq!(step.negated_name(), None);
    }

    #[test]
    fn unit_imperative_operations_gain_no_synthetic_parameters() {
        let step = StepType::new(
            "waitForPageToLoad",
            "doWaitForPageToLoad",
            "waitForPageToLoad",
            Some(NegationRule::WaitFor),
            params(&["timeout"]),
        );
        assert_eq!(step.params(), ["timeout"]);
    }

    #[test]
    fn unit_param_kind_detects_locators_with_carve_outs() {
        let select = StepType::new(
            "select",
            "doSelect",
            "select",
            None,
            params(&["selectLocator", "optionLocator"]),
        );
        assert_eq!(select.param_kind("selectLocator"), ParamKind::Locator);
        assert_eq!(select.param_kind("optionLocator"), ParamKind::String);

        let drag = StepType::new(
            "dragAndDropToObject",
            "doDragAndDropToObject",
            "dragAndDropToObject",
            None,
            params(&["locatorOfObjectToBeDragged", "locatorOfDragDestinationObject"]),
        );
        assert_eq!(
            drag.param_kind("locatorOfObjectToBeDragged"),
            ParamKind::Locator
        );

        let frame = StepType::new(
            "selectFrameAndWait",
            "doSelectFrame",
            "selectFrame",
            None,
            params(&["locator"]),
        );
        assert_eq!(frame.param_kind("locator"), ParamKind::String);
        assert_eq!(frame.param_kind("url"), ParamKind::String);
    }
}
