//! The tracking table
//!
//! A flat map from `scope:variable` keys to the last statically known value of
//! the variable. Every entry starts out `null`; registering a key a second time
//! never touches the stored value.

use crate::analysis::scope_chain::ScopeFrame;
use crate::analysis::shape::{
    binding_names, parameter_names, resolve_assignment_target, AssignmentTargetName,
};
use crate::error::Result;
use indexmap::IndexMap;
use oxc_ast::ast::{AssignmentExpression, FormalParameters, VariableDeclarator};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Build the tracking-table key for `variable` in `scope`
pub fn state_key(scope: &str, variable: &str) -> String {
    format!("{scope}:{variable}")
}

/// Insertion-ordered tracking table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateTable {
    entries: IndexMap<String, Value>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `key` with an unknown (`null`) value unless it already exists
    ///
    /// Returns `true` if the key was new.
    pub fn register(&mut self, key: String) -> bool {
        if self.entries.contains_key(&key) {
            return false;
        }
        log::debug!("registered {key}");
        self.entries.insert(key, Value::Null);
        true
    }

    /// Register every formal parameter of a function under `scope_name`
    ///
    /// Parameters are tracked in the table only; they are not part of the
    /// scope's declared-variable list.
    pub fn register_parameters(
        &mut self,
        params: &FormalParameters<'_>,
        scope_name: &str,
    ) -> usize {
        parameter_names(params)
            .iter()
            .filter(|name| self.register(state_key(scope_name, name)))
            .count()
    }

    /// Register the names bound by a declarator and declare them in `scope`
    pub fn register_declarator(
        &mut self,
        declarator: &VariableDeclarator<'_>,
        scope: &mut ScopeFrame,
    ) -> Vec<String> {
        let names = binding_names(&declarator.id);
        for name in &names {
            scope.declare(name);
            self.register(state_key(&scope.name, name));
        }
        names
    }

    /// Register the target of an assignment in `scope`
    ///
    /// Assignments may write to variables declared elsewhere, so the name is
    /// not added to the scope's declared list. Unresolved targets are returned
    /// without registering anything.
    pub fn register_assignment(
        &mut self,
        assignment: &AssignmentExpression<'_>,
        scope: &ScopeFrame,
    ) -> AssignmentTargetName {
        let target = resolve_assignment_target(&assignment.left);
        if let Some(name) = target.identifier() {
            self.register(state_key(&scope.name, name));
        }
        target
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Compact single-line JSON, as spliced into the instrumented header
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
