//! Name-keyed table of loaded rule definitions
//!
//! The store is a plain value owned by whoever builds it. It does no
//! locking of its own; share it across threads behind an `RwLock`.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::Severity;
use tracing::{info, warn};

use super::schema::validate_rule_definition;
use super::{RuleDefinition, RuleType};
use crate::error::RuleLoadError;
use crate::patterns::FilePattern;

/// What happens when a loaded rule name is already in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Last load wins; the earlier definition is replaced
    #[default]
    Replace,
    /// The load fails and the table is left unchanged
    Reject,
}

/// Listing entry returned by [`RuleStore::list_rules`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    pub rule_name: String,
    pub rule_type: RuleType,
    pub version: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub priority: i64,
    pub enabled: bool,
    pub condition_count: usize,
}

impl From<&RuleDefinition> for RuleSummary {
    fn from(rule: &RuleDefinition) -> Self {
        Self {
            rule_name: rule.rule_name.clone(),
            rule_type: rule.rule_type,
            version: rule.version.clone(),
            description: rule.description.clone(),
            severity: rule.severity,
            priority: rule.priority,
            enabled: rule.enabled,
            condition_count: rule.conditions.len(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RuleStore {
    rules: BTreeMap<String, RuleDefinition>,
    policy: DuplicatePolicy,
}

impl RuleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            rules: BTreeMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Load every rule in a JSON file (a single object or an array).
    ///
    /// The file is all-or-nothing: if any definition is malformed, nothing
    /// from it is inserted.
    pub fn load_rules_from_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Vec<RuleDefinition>, RuleLoadError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(RuleLoadError::FileNotFound(path.to_path_buf()));
        }

        let text = fs::read_to_string(path).map_err(|source| RuleLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data: Value = serde_json::from_str(&text).map_err(|source| RuleLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        let rules = parse_rule_definitions(&data, &path.display().to_string())?;
        self.insert_all(&rules)?;

        info!(count = rules.len(), path = %path.display(), "Loaded rules");
        Ok(rules)
    }

    /// Load rules from already-parsed JSON, e.g. a request body
    pub fn load_rules_from_value(
        &mut self,
        data: &Value,
    ) -> Result<Vec<RuleDefinition>, RuleLoadError> {
        let rules = parse_rule_definitions(data, "<inline>")?;
        self.insert_all(&rules)?;
        Ok(rules)
    }

    /// Load every regular file in `directory` whose name matches `pattern`.
    ///
    /// Not recursive. Files are read in name order; the first failing file
    /// aborts the load, keeping whatever earlier files inserted.
    pub fn load_rules_from_directory(
        &mut self,
        directory: impl AsRef<Path>,
        pattern: &str,
    ) -> Result<Vec<RuleDefinition>, RuleLoadError> {
        let directory = directory.as_ref();
        if !directory.is_dir() {
            return Err(RuleLoadError::DirectoryNotFound(directory.to_path_buf()));
        }

        let matcher = FilePattern::new(pattern)?;
        let io_error = |source| RuleLoadError::Io {
            path: directory.to_path_buf(),
            source,
        };

        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(directory).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            let matches = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| matcher.matches(name));
            if matches && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut rules = Vec::new();
        for file in &files {
            rules.extend(self.load_rules_from_file(file)?);
        }

        info!(
            count = rules.len(),
            files = files.len(),
            directory = %directory.display(),
            pattern = %matcher,
            "Loaded rules from directory"
        );
        Ok(rules)
    }

    /// Schema-check a raw definition without loading it
    pub fn validate_rule_definition(data: &Value) -> Vec<String> {
        validate_rule_definition(data)
    }

    pub fn get_rule(&self, rule_name: &str) -> Option<&RuleDefinition> {
        self.rules.get(rule_name)
    }

    /// Summaries sorted by priority (highest first), then name
    pub fn list_rules(&self, rule_type: Option<RuleType>, enabled_only: bool) -> Vec<RuleSummary> {
        let mut summaries: Vec<RuleSummary> = self
            .rules
            .values()
            .filter(|rule| rule_type.map_or(true, |t| rule.rule_type == t))
            .filter(|rule| !enabled_only || rule.enabled)
            .map(RuleSummary::from)
            .collect();
        summaries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });
        summaries
    }

    /// Enabled rules in evaluation order (priority descending, then name)
    pub fn enabled_rules(&self) -> Vec<&RuleDefinition> {
        let mut rules: Vec<&RuleDefinition> =
            self.rules.values().filter(|rule| rule.enabled).collect();
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.rule_name.cmp(&b.rule_name))
        });
        rules
    }

    /// Returns whether the rule exists
    pub fn enable_rule(&mut self, rule_name: &str) -> bool {
        self.set_enabled(rule_name, true)
    }

    /// Returns whether the rule exists
    pub fn disable_rule(&mut self, rule_name: &str) -> bool {
        self.set_enabled(rule_name, false)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn set_enabled(&mut self, rule_name: &str, enabled: bool) -> bool {
        match self.rules.get_mut(rule_name) {
            Some(rule) => {
                rule.enabled = enabled;
                info!(rule = rule_name, enabled, "Rule toggled");
                true
            }
            None => false,
        }
    }

    fn insert_all(&mut self, rules: &[RuleDefinition]) -> Result<(), RuleLoadError> {
        if self.policy == DuplicatePolicy::Reject {
            let mut seen = std::collections::HashSet::new();
            for rule in rules {
                if self.rules.contains_key(&rule.rule_name) || !seen.insert(&rule.rule_name) {
                    return Err(RuleLoadError::DuplicateRule(rule.rule_name.clone()));
                }
            }
        }

        for rule in rules {
            if let Some(previous) = self.rules.insert(rule.rule_name.clone(), rule.clone()) {
                warn!(
                    rule = %rule.rule_name,
                    previous_version = %previous.version,
                    version = %rule.version,
                    "Replaced existing rule definition"
                );
            }
        }
        Ok(())
    }
}

/// Turn a parsed rule file into definitions, failing on the first bad entry
fn parse_rule_definitions(
    data: &Value,
    origin: &str,
) -> Result<Vec<RuleDefinition>, RuleLoadError> {
    match data {
        Value::Object(_) => Ok(vec![parse_rule_definition(data, origin)?]),
        Value::Array(items) => items
            .iter()
            .map(|item| parse_rule_definition(item, origin))
            .collect(),
        _ => Err(RuleLoadError::InvalidFormat(origin.to_string())),
    }
}

fn parse_rule_definition(data: &Value, origin: &str) -> Result<RuleDefinition, RuleLoadError> {
    let Some(object) = data.as_object() else {
        return Err(RuleLoadError::InvalidFormat(origin.to_string()));
    };
    for field in ["rule_name", "rule_type"] {
        if !object.contains_key(field) {
            return Err(RuleLoadError::MissingField(field.to_string()));
        }
    }

    let rule_name = object
        .get("rule_name")
        .map(crate::condition::display_value)
        .unwrap_or_default();
    let errors = validate_rule_definition(data);
    if !errors.is_empty() {
        return Err(RuleLoadError::InvalidDefinition { rule_name, errors });
    }

    RuleDefinition::deserialize(data).map_err(|err| RuleLoadError::InvalidDefinition {
        rule_name,
        errors: vec![err.to_string()],
    })
}
