//! Step-type taxonomy for remote-control browser playback.
//!
//! Expands the declarative method registry against an automation API surface
//! into an immutable catalog of typed step definitions.

pub mod base_operations;
pub mod catalog;
pub mod method_registry;
pub mod step_type;

pub use base_operations::{BaseOperationTable, ResolvedOperation};
pub use catalog::{StepCatalog, StepCategory, StepTypeSummary};
pub use method_registry::{
    method_registry, MethodRegistry, NameVariant, NegationRule, RegistryCategory,
    RegistrySubcategory,
};
pub use step_type::{ParamKind, StepType, ECHO_STEP_NAME, OPEN_STEP_NAME, PAUSE_STEP_NAME};
