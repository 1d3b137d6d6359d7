//! Building-code compliance engine
//!
//! Evaluates building-design records (nested JSON) against typed rule
//! definitions grouped under regulations:
//! - `rules`: rule definitions, schema checks and the name-keyed rule store
//! - `handlers`: one evaluator per rule category
//! - `condition`: dotted-path lookup and the comparison operators used by general rules
//! - `validator`: runs a regulation store's rules against a design and scores the results
//! - `report`: building-level aggregation of per-regulation results

pub mod condition;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod patterns;
pub mod regulation;
pub mod report;
pub mod rules;
pub mod validation;
pub mod validator;

pub use condition::{compare, evaluate, resolve_path, Operator};
pub use engine::{ConditionResult, RuleEngine, RuleTestReport};
pub use error::{EvaluationError, RuleLoadError, StoreError, ValidatorError};
pub use handlers::{dispatch, DomainHandler, RuleOutcome};
pub use regulation::{
    InMemoryRegulationStore, Regulation, RegulationFilter, RegulationStore, ValidationRule,
};
pub use report::{ComplianceReport, RegulationDetail};
pub use rules::{
    validate_rule_definition, DuplicatePolicy, RuleCondition, RuleDefinition, RuleStore,
    RuleSummary, RuleType,
};
pub use shared_types::{Severity, ValidationViolation};
pub use validation::{ValidationResult, ValidationStatus};
pub use validator::BuildingCodeValidator;
