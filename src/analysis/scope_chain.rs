//! Scope chain tracking
//!
//! The chain is a stack of [`ScopeFrame`]s seeded with the global `Program`
//! frame. Function scopes are pushed when their function is entered and
//! popped (and archived) when that same function is left.

use oxc_span::Span;
use serde::{Deserialize, Serialize};

/// Name of the global scope frame
pub const GLOBAL_SCOPE: &str = "Program";

/// Name of a function scope nested in `parent`, e.g. `Program:outer:inner`
pub fn child_scope_name(parent: &str, function: &str) -> String {
    format!("{parent}:{function}")
}

/// One lexical scope and the variables declared directly in it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeFrame {
    pub name: String,
    /// Declared names in first-seen order
    pub declared: Vec<String>,
    /// Span of the function that opened this scope; `None` for the global frame
    #[serde(skip)]
    pub owner: Option<Span>,
}

impl ScopeFrame {
    pub fn global() -> Self {
        Self {
            name: GLOBAL_SCOPE.to_string(),
            declared: Vec::new(),
            owner: None,
        }
    }

    pub fn is_global(&self) -> bool {
        self.owner.is_none()
    }

    /// Record a declared name; repeated declarations are kept once
    pub fn declare(&mut self, name: &str) {
        if !self.declared.iter().any(|declared| declared == name) {
            self.declared.push(name.to_string());
        }
    }

    /// Local part of the scope name (the function name, or `Program`)
    pub fn local_name(&self) -> &str {
        self.name.rsplit(':').next().unwrap_or(&self.name)
    }

    /// Human-readable summary of the declared variables
    pub fn summary(&self) -> String {
        let vars = if self.declared.is_empty() {
            "NONE".to_string()
        } else {
            self.declared.join(", ")
        };
        if self.is_global() {
            format!("Variables declared in the global scope: {vars}")
        } else {
            format!("Variables declared in the function {}(): {vars}", self.local_name())
        }
    }
}

/// Stack of active scopes plus the archive of completed ones
#[derive(Debug, Clone)]
pub struct ScopeChain {
    frames: Vec<ScopeFrame>,
    archive: Vec<ScopeFrame>,
}

impl ScopeChain {
    /// Create a chain seeded with the global frame
    pub fn new() -> Self {
        Self {
            frames: vec![ScopeFrame::global()],
            archive: Vec::new(),
        }
    }

    /// Innermost active scope
    ///
    /// The chain always holds the global frame until [`ScopeChain::close_global`].
    pub fn current(&self) -> &ScopeFrame {
        self.frames
            .last()
            .expect("scope chain holds the global frame during traversal")
    }

    pub fn current_mut(&mut self) -> &mut ScopeFrame {
        self.frames
            .last_mut()
            .expect("scope chain holds the global frame during traversal")
    }

    /// Number of active frames (function nesting depth + 1)
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Push a function scope owned by the function at `owner`
    pub fn enter_function(&mut self, function_name: &str, owner: Span) -> &ScopeFrame {
        let name = child_scope_name(&self.current().name, function_name);
        self.frames.push(ScopeFrame {
            name,
            declared: Vec::new(),
            owner: Some(owner),
        });
        self.current()
    }

    /// Whether the innermost scope was opened by the function at `span`
    pub fn is_owned_by(&self, span: Span) -> bool {
        self.frames.last().and_then(|frame| frame.owner) == Some(span)
    }

    /// Pop the function scope opened by `owner` and archive it
    ///
    /// Returns `None` (and leaves the chain untouched) when the innermost
    /// scope belongs to another node.
    pub fn leave_function(&mut self, owner: Span) -> Option<&ScopeFrame> {
        if !self.is_owned_by(owner) {
            return None;
        }
        let frame = self.frames.pop()?;
        self.archive.push(frame);
        self.archive.last()
    }

    /// Archive the global frame once the program node is left
    pub fn close_global(&mut self) -> Option<&ScopeFrame> {
        if self.frames.len() != 1 {
            return None;
        }
        let frame = self.frames.pop()?;
        self.archive.push(frame);
        self.archive.last()
    }

    /// Completed scopes in the order they were closed
    pub fn archive(&self) -> &[ScopeFrame] {
        &self.archive
    }

    pub fn into_archive(self) -> Vec<ScopeFrame> {
        self.archive
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}
