//! Script and step model consumed by playback.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use rcplay_catalog::StepType;
use serde::{Deserialize, Serialize};

/// Parameter of pause steps holding the wait time in milliseconds.
pub const WAIT_TIME_PARAM: &str = "waitTime";
/// Parameter of navigation steps holding the target URL.
pub const URL_PARAM: &str = "url";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Element locator: a strategy name such as `id` or `xpath` plus its target.
pub struct Locator {
    pub strategy: String,
    pub target: String,
}

impl Locator {
    pub fn new(strategy: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            strategy: strategy.into(),
            target: target.into(),
        }
    }

    /// `strategy=target`, the form the remote server expects.
    pub fn wire_text(&self) -> String {
        format!("{}={}", self.strategy, self.target)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Locator(Locator),
}

impl ParamValue {
    pub fn wire_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(text) => Cow::Borrowed(text),
            Self::Locator(locator) => Cow::Owned(locator.wire_text()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Locator(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    #[default]
    Pending,
    Success,
    Failure,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Script dialect; only Selenium 1 scripts have a remote-control backend.
pub enum SeleniumVersion {
    #[default]
    Selenium1,
    Selenium2,
}

impl SeleniumVersion {
    pub fn label(self) -> &'static str {
        match self {
            Self::Selenium1 => "1",
            Self::Selenium2 => "2",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "1" => Some(Self::Selenium1),
            "2" => Some(Self::Selenium2),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// One script step and its playback outcome.
pub struct Step {
    pub id: String,
    pub step_type: Arc<StepType>,
    pub negated: bool,
    pub params: BTreeMap<String, ParamValue>,
    pub outcome: StepOutcome,
    pub failure_message: Option<String>,
}

impl Step {
    pub fn new(id: impl Into<String>, step_type: Arc<StepType>) -> Self {
        Self {
            id: id.into(),
            step_type,
            negated: false,
            params: BTreeMap::new(),
            outcome: StepOutcome::Pending,
            failure_message: None,
        }
    }

    pub fn with_text(mut self, param: &str, value: impl Into<String>) -> Self {
        self.params
            .insert(param.to_string(), ParamValue::Text(value.into()));
        self
    }

    pub fn with_locator(
        mut self,
        param: &str,
        strategy: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.params.insert(
            param.to_string(),
            ParamValue::Locator(Locator::new(strategy, target)),
        );
        self
    }

    pub fn negated(mut self) -> Self {
        self.negated = true;
        self
    }

    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Name sent to the remote server, honouring the negated flag.
    pub fn command_name(&self) -> Cow<'_, str> {
        if self.negated {
            if let Some(negated) = self.step_type.negated_name() {
                return Cow::Owned(negated);
            }
            tracing::warn!(
                step = self.id.as_str(),
                step_type = self.step_type.name(),
                "negated flag set on non-negatable step type; using plain name"
            );
        }
        Cow::Borrowed(self.step_type.name())
    }

    /// Wait time of a pause step, parsed from its `waitTime` parameter.
    pub fn wait_time(&self) -> Option<Duration> {
        self.param(WAIT_TIME_PARAM)
            .and_then(ParamValue::as_text)
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
    }

    pub fn record(&mut self, outcome: StepOutcome, message: Option<String>) {
        self.outcome = outcome;
        self.failure_message = message;
    }

    pub fn reset(&mut self) {
        self.outcome = StepOutcome::Pending;
        self.failure_message = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    pub name: String,
    pub selenium_version: SeleniumVersion,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: name.into(),
            selenium_version: SeleniumVersion::Selenium1,
            steps,
        }
    }

    /// Base URL of the run: the `url` parameter of the first step.
    pub fn base_url(&self) -> Option<&str> {
        self.steps
            .first()
            .and_then(|step| step.param(URL_PARAM))
            .and_then(ParamValue::as_text)
    }

    pub fn clear_results(&mut self) {
        self.steps.iter_mut().for_each(Step::reset);
    }

    pub fn outcomes(&self) -> Vec<StepOutcome> {
        self.steps.iter().map(|step| step.outcome).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rcplay_catalog::StepCatalog;

    use super::{Locator, ParamValue, Script, Step, StepOutcome};

    #[test]
    fn unit_locator_wire_text_joins_strategy_and_target() {
        let value = ParamValue::Locator(Locator::new("css", "div > a"));
        assert_eq!(value.wire_text(), "css=div > a");
        assert_eq!(ParamValue::Text("plain".to_string()).wire_text(), "plain");
    }

    #[test]
    fn unit_command_name_uses_negated_name_only_when_negatable() {
        let catalog = StepCatalog::selenium1();
        let assert_step = Step::new(
            "s1",
            catalog.get("assertTextPresent").expect("type").clone(),
        )
        .negated();
        assert_eq!(assert_step.command_name(), "assertTextNotPresent");

        let click = Step::new("s2", catalog.get("click").expect("type").clone()).negated();
        assert_eq!(click.command_name(), "click");
    }

    #[test]
    fn unit_wait_time_parses_milliseconds() {
        let catalog = StepCatalog::selenium1();
        let pause = catalog.pause().expect("pause").clone();
        let step = Step::new("p", pause.clone()).with_text("waitTime", "250");
        assert_eq!(step.wait_time(), Some(Duration::from_millis(250)));
        let invalid = Step::new("p", pause).with_text("waitTime", "soon");
        assert_eq!(invalid.wait_time(), None);
    }

    #[test]
    fn unit_base_url_comes_from_first_step_and_results_reset() {
        let catalog = StepCatalog::selenium1();
        let mut script = Script::new(
            "demo",
            vec![
                Step::new("1", catalog.open().expect("open").clone())
                    .with_text("url", "http://example.test/"),
                Step::new("2", catalog.get("click").expect("click").clone())
                    .with_locator("locator", "id", "go"),
            ],
        );
        assert_eq!(script.base_url(), Some("http://example.test/"));

        script.steps[1].record(StepOutcome::Error, Some("boom".to_string()));
        script.clear_results();
        assert_eq!(script.outcomes(), vec![StepOutcome::Pending; 2]);
        assert!(script.steps[1].failure_message.is_none());
    }
}
