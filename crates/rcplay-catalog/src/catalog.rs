//! Step type catalog built once from the method registry.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::base_operations::BaseOperationTable;
use crate::method_registry::{method_registry, MethodRegistry};
use crate::step_type::{ParamKind, StepType, ECHO_STEP_NAME, OPEN_STEP_NAME, PAUSE_STEP_NAME};

const DEFAULT_STEP_NAME: &str = "click";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Step types of one registry subcategory, labelled `"<category>: <subcategory>"`.
pub struct StepCategory {
    pub label: String,
    pub step_types: Vec<Arc<StepType>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Flattened row describing one step type, used for step tables.
pub struct StepTypeSummary {
    pub name: String,
    pub category: String,
    pub base_name: String,
    pub negatable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negated_name: Option<String>,
    pub params: Vec<(String, ParamKind)>,
}

#[derive(Debug, Clone, Default)]
/// Immutable, name-indexed catalog of step types.
pub struct StepCatalog {
    by_name: BTreeMap<String, Arc<StepType>>,
    by_negated_name: BTreeMap<String, Arc<StepType>>,
    categories: Vec<StepCategory>,
}

impl StepCatalog {
    /// Expands every (category, subcategory, operation, variant) combination.
    /// Operations the API surface does not provide are skipped without error.
    pub fn build(registry: &MethodRegistry, operations: &BaseOperationTable) -> Self {
        let mut catalog = Self::default();
        for category in &registry.categories {
            let variants = category.effective_variants();
            for subcategory in &category.subcategories {
                let mut bucket = StepCategory {
                    label: format!("{}: {}", category.label, subcategory.label),
                    step_types: Vec::new(),
                };
                for registry_name in &subcategory.contents {
                    let Some(resolved) = operations.resolve(registry_name) else {
                        tracing::debug!(
                            operation = registry_name.as_str(),
                            category = category.name.as_str(),
                            "base operation unavailable; omitting step types"
                        );
                        continue;
                    };
                    for variant in &variants {
                        let step_type = Arc::new(StepType::new(
                            variant.apply(registry_name),
                            resolved.name.clone(),
                            registry_name.clone(),
                            category.negation,
                            resolved.params.clone(),
                        ));
                        catalog.register(step_type.clone());
                        bucket.step_types.push(step_type);
                    }
                }
                catalog.categories.push(bucket);
            }
        }
        catalog
    }

    /// Catalog of the Selenium 1 registry against the Selenium Core API surface.
    pub fn selenium1() -> Self {
        Self::build(&method_registry(), &BaseOperationTable::selenium_core())
    }

    fn register(&mut self, step_type: Arc<StepType>) {
        if let Some(negated) = step_type.negated_name() {
            self.by_negated_name.insert(negated, step_type.clone());
        }
        let name = step_type.name().to_string();
        if self.by_name.insert(name.clone(), step_type).is_some() {
            tracing::warn!(step_type = name.as_str(), "duplicate step type name replaced");
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<StepType>> {
        self.by_name.get(name)
    }

    pub fn get_negated(&self, negated_name: &str) -> Option<&Arc<StepType>> {
        self.by_negated_name.get(negated_name)
    }

    /// Resolves a plain or negated step name into `(step type, negated)`.
    pub fn resolve(&self, name: &str) -> Option<(Arc<StepType>, bool)> {
        if let Some(step_type) = self.by_name.get(name) {
            return Some((step_type.clone(), false));
        }
        self.by_negated_name
            .get(name)
            .map(|step_type| (step_type.clone(), true))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn categories(&self) -> &[StepCategory] {
        &self.categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<StepType>> {
        self.by_name.values()
    }

    pub fn negated_names(&self) -> impl Iterator<Item = &str> {
        self.by_negated_name.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn echo(&self) -> Option<&Arc<StepType>> {
        self.get(ECHO_STEP_NAME)
    }

    pub fn pause(&self) -> Option<&Arc<StepType>> {
        self.get(PAUSE_STEP_NAME)
    }

    pub fn open(&self) -> Option<&Arc<StepType>> {
        self.get(OPEN_STEP_NAME)
    }

    /// Step type offered for newly created steps.
    pub fn default_step_type(&self) -> Option<&Arc<StepType>> {
        self.get(DEFAULT_STEP_NAME)
    }

    /// One summary row per step type, in category order.
    pub fn summaries(&self) -> Vec<StepTypeSummary> {
        self.categories
            .iter()
            .flat_map(|category| {
                category
                    .step_types
                    .iter()
                    .map(move |step_type| StepTypeSummary {
                        name: step_type.name().to_string(),
                        category: category.label.clone(),
                        base_name: step_type.base_name().to_string(),
                        negatable: step_type.negatable(),
                        negated_name: step_type.negated_name(),
                        params: step_type
                            .params()
                            .iter()
                            .map(|param| (param.clone(), step_type.param_kind(param)))
                            .collect(),
                    })
            })
            .collect()
    }
}
