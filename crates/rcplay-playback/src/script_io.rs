//! Loading of JSON scripts and suites.
//!
//! A script document looks like:
//!
//! ```json
//! {
//!   "seleniumVersion": "1",
//!   "formatVersion": 1,
//!   "steps": [
//!     { "type": "open", "url": "http://example.test/${path}" },
//!     { "type": "click", "locator": { "type": "id", "value": "go" } },
//!     { "type": "verifyTextPresent", "negated": true, "target": "Error" }
//!   ],
//!   "data": { "source": "manual", "configs": { "manual": { "path": "home" } } }
//! }
//! ```
//!
//! A suite document lists script files:
//! `{ "type": "suite", "scripts": [{ "where": "local", "path": "login.json" }] }`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use rcplay_catalog::StepCatalog;
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::script::{Locator, ParamValue, Script, SeleniumVersion, Step};
use crate::suite_playback::ScriptSource;

const MAX_FORMAT_VERSION: u64 = 2;
const SUITE_TYPE: &str = "suite";
const LOCAL_LOCATION: &str = "local";
const VARIABLE_START: &str = "${";
const VARIABLE_END: &str = "}";
const RESERVED_STEP_KEYS: &[&str] = &["type", "negated", "id"];

#[derive(Debug, Error)]
pub enum ScriptLoadError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse script document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported Selenium version: \"{0}\"")]
    UnsupportedVersion(String),
    #[error("unsupported script format version: {0}")]
    UnsupportedFormatVersion(u64),
    #[error("step {index} has unknown type '{name}'")]
    UnknownStepType { index: usize, name: String },
    #[error("step {index} parameter '{param}' is invalid: {reason}")]
    InvalidParameter {
        index: usize,
        param: String,
        reason: String,
    },
    #[error("no data source named \"{0}\"")]
    UnknownDataSource(String),
    #[error("no variable binding for '{0}' found")]
    UnboundVariable(String),
    #[error("script file '{0}' not found")]
    ScriptNotFound(PathBuf),
    #[error("unsupported script location '{0}'")]
    UnsupportedLocation(String),
    #[error("suite '{0}' includes itself")]
    SuiteCycle(PathBuf),
    #[error("script index {index} is out of range for {len} scripts")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScriptDocument {
    selenium_version: Value,
    #[serde(default = "default_format_version")]
    format_version: u64,
    steps: Vec<Map<String, Value>>,
    #[serde(default)]
    data: Option<DataSection>,
}

fn default_format_version() -> u64 {
    1
}

#[derive(Debug, Deserialize)]
struct DataSection {
    source: String,
    #[serde(default)]
    configs: BTreeMap<String, BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct SuiteDocument {
    scripts: Vec<ScriptLocation>,
}

#[derive(Debug, Deserialize)]
struct ScriptLocation {
    #[serde(rename = "where", default = "default_location")]
    location: String,
    path: String,
}

fn default_location() -> String {
    LOCAL_LOCATION.to_string()
}

type DataRow = BTreeMap<String, String>;

fn data_rows(data: &DataSection) -> Result<Vec<DataRow>, ScriptLoadError> {
    let config = data.configs.get(&data.source).cloned().unwrap_or_default();
    match data.source.as_str() {
        "manual" => Ok(vec![config]),
        "none" => Ok(Vec::new()),
        other => Err(ScriptLoadError::UnknownDataSource(other.to_string())),
    }
}

/// Replaces `${name}` with the first row binding `name`.
fn substitute_variables(value: &str, rows: &[DataRow]) -> Result<String, ScriptLoadError> {
    let mut output = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find(VARIABLE_START) {
        let after_start = &rest[start + VARIABLE_START.len()..];
        let Some(end) = after_start.find(VARIABLE_END) else {
            break;
        };
        let name = &after_start[..end];
        let binding = rows
            .iter()
            .find_map(|row| row.get(name))
            .ok_or_else(|| ScriptLoadError::UnboundVariable(name.to_string()))?;
        output.push_str(&rest[..start]);
        output.push_str(binding);
        rest = &after_start[end + VARIABLE_END.len()..];
    }
    output.push_str(rest);
    Ok(output)
}

fn version_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn parse_param(
    index: usize,
    param: &str,
    value: &Value,
    rows: Option<&[DataRow]>,
) -> Result<ParamValue, ScriptLoadError> {
    let invalid = |reason: &str| ScriptLoadError::InvalidParameter {
        index,
        param: param.to_string(),
        reason: reason.to_string(),
    };
    match value {
        Value::String(text) => match rows {
            Some(rows) => Ok(ParamValue::Text(substitute_variables(text, rows)?)),
            None => Ok(ParamValue::Text(text.clone())),
        },
        Value::Number(number) => Ok(ParamValue::Text(number.to_string())),
        Value::Bool(flag) => Ok(ParamValue::Text(flag.to_string())),
        Value::Object(object) => {
            let strategy = object
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("locator is missing a string 'type'"))?;
            let target = object
                .get("value")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid("locator is missing a string 'value'"))?;
            Ok(ParamValue::Locator(Locator::new(strategy, target)))
        }
        Value::Null | Value::Array(_) => Err(invalid("expected a string, number or locator")),
    }
}

fn parse_step(
    index: usize,
    object: &Map<String, Value>,
    catalog: &StepCatalog,
    rows: Option<&[DataRow]>,
) -> Result<Step, ScriptLoadError> {
    let type_name = object.get("type").and_then(Value::as_str).unwrap_or("");
    let (step_type, negated_by_name) =
        catalog
            .resolve(type_name)
            .ok_or_else(|| ScriptLoadError::UnknownStepType {
                index,
                name: type_name.to_string(),
            })?;
    let negated_flag = match object.get("negated") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(_) => {
            return Err(ScriptLoadError::InvalidParameter {
                index,
                param: "negated".to_string(),
                reason: "expected a boolean".to_string(),
            })
        }
    };
    let id = object
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("step-{}", index + 1));

    let mut step = Step::new(id, step_type);
    step.negated = negated_by_name || negated_flag;
    for (key, value) in object {
        if RESERVED_STEP_KEYS.contains(&key.as_str()) {
            continue;
        }
        if !step.step_type.params().iter().any(|param| param == key) {
            tracing::debug!(
                step = index,
                step_type = step.step_type.name(),
                key = key.as_str(),
                "ignoring undeclared step key"
            );
            continue;
        }
        let value = parse_param(index, key, value, rows)?;
        step.params.insert(key.clone(), value);
    }
    Ok(step)
}

/// Parses a script document; step types are resolved against `catalog`.
pub fn parse_script(raw: &str, name: &str, catalog: &StepCatalog) -> Result<Script, ScriptLoadError> {
    let document: ScriptDocument = serde_json::from_str(raw)?;
    let version = version_text(&document.selenium_version);
    let Some(selenium_version) = SeleniumVersion::from_label(&version) else {
        return Err(ScriptLoadError::UnsupportedVersion(version));
    };
    if document.format_version > MAX_FORMAT_VERSION {
        return Err(ScriptLoadError::UnsupportedFormatVersion(
            document.format_version,
        ));
    }
    // Selenium 2 steps use another vocabulary; the script is kept so a suite
    // can report it without aborting the load.
    if selenium_version != SeleniumVersion::Selenium1 {
        tracing::debug!(
            script = name,
            version = selenium_version.label(),
            steps = document.steps.len(),
            "loaded script without resolving its steps"
        );
        return Ok(Script {
            name: name.to_string(),
            selenium_version,
            steps: Vec::new(),
        });
    }
    let rows = document.data.as_ref().map(data_rows).transpose()?;

    let steps = document
        .steps
        .iter()
        .enumerate()
        .map(|(index, object)| parse_step(index, object, catalog, rows.as_deref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Script::new(name, steps))
}

fn read_document(path: &Path) -> Result<String, ScriptLoadError> {
    std::fs::read_to_string(path).map_err(|source| ScriptLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_suite_document(raw: &str) -> Result<bool, ScriptLoadError> {
    let value: Value = serde_json::from_str(raw)?;
    Ok(value.get("type").and_then(Value::as_str) == Some(SUITE_TYPE))
}

pub fn load_script(path: &Path, catalog: &StepCatalog) -> Result<Script, ScriptLoadError> {
    let raw = read_document(path)?;
    parse_script(&raw, &path.display().to_string(), catalog)
}

/// Loads a script file, or every script of a suite file.
pub fn load_scripts(path: &Path, catalog: &StepCatalog) -> Result<Vec<Script>, ScriptLoadError> {
    load_nested(path, catalog, &mut Vec::new())
}

/// Loads the scripts a suite file lists. Paths resolve as given first, then
/// relative to the suite file's directory. Suites may list other suites but
/// not one that is already being loaded.
pub fn load_suite(path: &Path, catalog: &StepCatalog) -> Result<Vec<Script>, ScriptLoadError> {
    let raw = read_document(path)?;
    parse_suite(&raw, path, catalog, &mut Vec::new())
}

/// `open_suites` holds the canonical paths of the suites on the current
/// include chain.
fn load_nested(
    path: &Path,
    catalog: &StepCatalog,
    open_suites: &mut Vec<PathBuf>,
) -> Result<Vec<Script>, ScriptLoadError> {
    let raw = read_document(path)?;
    if is_suite_document(&raw)? {
        parse_suite(&raw, path, catalog, open_suites)
    } else {
        Ok(vec![parse_script(&raw, &path.display().to_string(), catalog)?])
    }
}

fn parse_suite(
    raw: &str,
    suite_path: &Path,
    catalog: &StepCatalog,
    open_suites: &mut Vec<PathBuf>,
) -> Result<Vec<Script>, ScriptLoadError> {
    let document: SuiteDocument = serde_json::from_str(raw)?;
    let canonical =
        std::fs::canonicalize(suite_path).unwrap_or_else(|_| suite_path.to_path_buf());
    if open_suites.contains(&canonical) {
        return Err(ScriptLoadError::SuiteCycle(suite_path.to_path_buf()));
    }
    open_suites.push(canonical);
    let scripts = load_suite_entries(&document, suite_path, catalog, open_suites);
    open_suites.pop();
    scripts
}

fn load_suite_entries(
    document: &SuiteDocument,
    suite_path: &Path,
    catalog: &StepCatalog,
    open_suites: &mut Vec<PathBuf>,
) -> Result<Vec<Script>, ScriptLoadError> {
    let suite_dir = suite_path.parent().unwrap_or_else(|| Path::new(""));
    let mut scripts = Vec::new();
    for location in &document.scripts {
        if location.location != LOCAL_LOCATION {
            return Err(ScriptLoadError::UnsupportedLocation(
                location.location.clone(),
            ));
        }
        let given = PathBuf::from(&location.path);
        let resolved = if given.exists() {
            given
        } else {
            let relative = suite_dir.join(&location.path);
            if !relative.exists() {
                return Err(ScriptLoadError::ScriptNotFound(given));
            }
            relative
        };
        scripts.extend(load_nested(&resolved, catalog, open_suites)?);
    }
    tracing::debug!(
        suite = %suite_path.display(),
        scripts = scripts.len(),
        "loaded suite"
    );
    Ok(scripts)
}

#[derive(Debug, Clone, Default)]
/// `ScriptSource` over scripts already held in memory.
pub struct InMemorySuite {
    scripts: Vec<Script>,
    current: Option<usize>,
}

impl InMemorySuite {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts,
            current: None,
        }
    }

    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

}

impl ScriptSource for InMemorySuite {
    fn script_names(&self) -> Vec<String> {
        self.scripts.iter().map(|script| script.name.clone()).collect()
    }

    fn switch_to_script(&mut self, index: usize) -> Result<(), ScriptLoadError> {
        if index >= self.scripts.len() {
            return Err(ScriptLoadError::OutOfRange {
                index,
                len: self.scripts.len(),
            });
        }
        self.current = Some(index);
        Ok(())
    }

    fn current_script(&mut self) -> Option<&mut Script> {
        self.current.and_then(|index| self.scripts.get_mut(index))
    }
}
