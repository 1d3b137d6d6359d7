//! Regulations and the store that owns them
//!
//! The validator only talks to a [`RegulationStore`]. Production deployments
//! back it with a database; [`InMemoryRegulationStore`] serves the CLI and
//! tests from a JSON catalog.

use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shared_types::Severity;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::rules::RuleDefinition;

fn default_version() -> String {
    "1.0".to_string()
}

fn default_priority() -> i64 {
    1
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regulation {
    pub id: u64,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub jurisdiction_id: Option<u64>,
    #[serde(default)]
    pub regulation_type: Option<String>,
    #[serde(default)]
    pub effective_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl Regulation {
    pub fn new(id: u64, code: &str, title: &str) -> Self {
        Self {
            id,
            code: code.to_string(),
            title: title.to_string(),
            description: None,
            category_id: None,
            jurisdiction_id: None,
            regulation_type: None,
            effective_date: None,
            expiry_date: None,
            version: default_version(),
            priority: default_priority(),
            active: true,
        }
    }

    pub fn with_type(mut self, regulation_type: &str) -> Self {
        self.regulation_type = Some(regulation_type.to_string());
        self
    }
}

/// A rule as stored against a regulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRule {
    pub id: u64,
    pub regulation_id: u64,
    pub rule_name: String,
    /// Free-form; unrecognised values are evaluated as general rules
    pub rule_type: String,
    #[serde(default)]
    pub rule_logic: Map<String, Value>,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

/// Narrows [`RegulationStore::get_regulations`]; `None` fields match anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegulationFilter {
    pub category_id: Option<u64>,
    pub jurisdiction_id: Option<u64>,
    pub regulation_type: Option<String>,
}

impl RegulationFilter {
    pub fn by_type(regulation_type: &str) -> Self {
        Self {
            regulation_type: Some(regulation_type.to_string()),
            ..Self::default()
        }
    }

    fn matches(&self, regulation: &Regulation) -> bool {
        self.category_id.map_or(true, |id| regulation.category_id == Some(id))
            && self
                .jurisdiction_id
                .map_or(true, |id| regulation.jurisdiction_id == Some(id))
            && self
                .regulation_type
                .as_deref()
                .map_or(true, |t| regulation.regulation_type.as_deref() == Some(t))
    }
}

pub trait RegulationStore {
    /// Active regulations matching `filter`, ordered by code
    fn get_regulations(&self, filter: &RegulationFilter) -> Result<Vec<Regulation>, StoreError>;

    /// Active rules of one regulation, highest priority first, then by name
    fn get_validation_rules(&self, regulation_id: u64) -> Result<Vec<ValidationRule>, StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Catalog {
    #[serde(default)]
    regulations: Vec<Regulation>,
    #[serde(default)]
    rules: Vec<ValidationRule>,
}

#[derive(Debug, Default)]
pub struct InMemoryRegulationStore {
    regulations: Vec<Regulation>,
    rules: Vec<ValidationRule>,
}

impl InMemoryRegulationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog of the form `{ "regulations": [...], "rules": [...] }`
    pub fn from_catalog_str(json: &str) -> Result<Self, StoreError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        debug!(
            regulations = catalog.regulations.len(),
            rules = catalog.rules.len(),
            "Parsed regulation catalog"
        );
        Ok(Self {
            regulations: catalog.regulations,
            rules: catalog.rules,
        })
    }

    pub fn from_catalog_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self::from_catalog_str(&json)?;
        info!(
            path = %path.display(),
            regulations = store.regulations.len(),
            rules = store.rules.len(),
            "Loaded regulation catalog"
        );
        Ok(store)
    }

    pub fn add_regulation(&mut self, regulation: Regulation) {
        self.regulations.push(regulation);
    }

    pub fn add_rule(&mut self, rule: ValidationRule) {
        self.rules.push(rule);
    }

    /// Store loaded rule definitions under a regulation, assigning fresh ids
    pub fn attach_rules(
        &mut self,
        regulation_id: u64,
        definitions: &[RuleDefinition],
    ) -> Result<usize, StoreError> {
        if !self.regulations.iter().any(|r| r.id == regulation_id) {
            return Err(StoreError::UnknownRegulation(regulation_id));
        }
        let mut next_id = self.rules.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        for definition in definitions {
            self.rules.push(definition.to_validation_rule(next_id, regulation_id));
            next_id += 1;
        }
        Ok(definitions.len())
    }

    pub fn regulation_count(&self) -> usize {
        self.regulations.len()
    }
}

impl RegulationStore for InMemoryRegulationStore {
    fn get_regulations(&self, filter: &RegulationFilter) -> Result<Vec<Regulation>, StoreError> {
        let mut regulations: Vec<Regulation> = self
            .regulations
            .iter()
            .filter(|r| r.active && filter.matches(r))
            .cloned()
            .collect();
        regulations.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(regulations)
    }

    fn get_validation_rules(&self, regulation_id: u64) -> Result<Vec<ValidationRule>, StoreError> {
        let mut rules: Vec<ValidationRule> = self
            .rules
            .iter()
            .filter(|r| r.active && r.regulation_id == regulation_id)
            .cloned()
            .collect();
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });
        Ok(rules)
    }
}
