//! Single-pass scope-aware traversal
//!
//! [`ScopeVisitor`] hooks oxc's `enter_node`/`leave_node` callbacks, which
//! give a strict depth-first pre-order/post-order pair over the tree. Entry
//! opens function scopes and feeds the state table and update-site
//! collector; exit closes the scope opened by the same node.
//!
//! All traversal state lives in the visitor, so every run starts clean.

use crate::analysis::diagnostics::{AnalysisDiagnostic, DiagnosticKind};
use crate::analysis::location::{LineIndex, Location};
use crate::analysis::scope_chain::{ScopeChain, ScopeFrame};
use crate::analysis::shape::{
    resolve_assignment_target, AssignmentTargetName, NodeShape, ANONYMOUS_SCOPE,
};
use crate::analysis::state_table::StateTable;
use crate::analysis::update_sites::{UpdateSite, UpdateSiteCollector};
use oxc_ast::ast::{FormalParameters, Program};
use oxc_ast::AstKind;
use oxc_ast_visit::Visit;
use oxc_span::Span;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Everything collected by one traversal
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    pub state_table: StateTable,
    /// Completed scopes in closing order; the global scope comes last
    pub scopes: Vec<ScopeFrame>,
    pub update_sites: Vec<UpdateSite>,
    pub diagnostics: Vec<AnalysisDiagnostic>,
    /// Line count of the analyzed source
    pub line_count: usize,
}

/// Visitor carrying the per-run traversal context
pub struct ScopeVisitor<'s> {
    lines: LineIndex<'s>,
    chain: ScopeChain,
    table: StateTable,
    sites: UpdateSiteCollector,
    diagnostics: Vec<AnalysisDiagnostic>,
    /// Function expressions bound by a declarator or assignment, keyed by span
    bound_functions: HashMap<Span, Option<String>>,
    /// Assignments already reported through their enclosing statement
    statement_assignments: HashSet<Span>,
}

impl<'s> ScopeVisitor<'s> {
    pub fn new(source: &'s str, table_identifier: &str) -> Self {
        Self {
            lines: LineIndex::new(source),
            chain: ScopeChain::new(),
            table: StateTable::new(),
            sites: UpdateSiteCollector::new(table_identifier),
            diagnostics: Vec::new(),
            bound_functions: HashMap::new(),
            statement_assignments: HashSet::new(),
        }
    }

    /// Walk `program` once and return the collected artifacts
    pub fn analyze(mut self, program: &Program<'_>) -> Analysis {
        self.visit_program(program);
        Analysis {
            line_count: self.lines.line_count(),
            state_table: self.table,
            scopes: self.chain.into_archive(),
            update_sites: self.sites.into_sites(),
            diagnostics: self.diagnostics,
        }
    }

    fn enter(&mut self, shape: NodeShape<'_, '_>) {
        match shape {
            NodeShape::Program => {
                log::debug!("enter: curr scope: {}", self.chain.current().name);
            }
            NodeShape::FunctionDeclaration(func) => {
                let name = match &func.id {
                    Some(id) => id.name.to_string(),
                    None => self.anonymous_scope(func.span),
                };
                self.open_function_scope(&name, func.span, &func.params);
            }
            NodeShape::FunctionExpression(func) => {
                let Some(binding) = self.bound_functions.get(&func.span).cloned() else {
                    return;
                };
                if func.id.is_none() {
                    let binding_name = binding.as_deref().unwrap_or(ANONYMOUS_SCOPE);
                    self.report(
                        DiagnosticKind::NotDeanonymized,
                        func.span,
                        format!(
                            "function {binding_name} not deanonymized; \
                             run the deanonymization pass first"
                        ),
                    );
                }
                let name = binding.unwrap_or_else(|| self.anonymous_scope(func.span));
                self.open_function_scope(&name, func.span, &func.params);
            }
            NodeShape::ArrowFunction(arrow) => {
                let Some(binding) = self.bound_functions.get(&arrow.span).cloned() else {
                    return;
                };
                let name = binding.unwrap_or_else(|| self.anonymous_scope(arrow.span));
                self.open_function_scope(&name, arrow.span, &arrow.params);
            }
            NodeShape::VariableDeclarator(declarator) => {
                let names = self.table.register_declarator(declarator, self.chain.current_mut());
                if shape.is_mutation_site() {
                    let location = self.lines.location(declarator.span.end);
                    let scope_name = self.chain.current().name.clone();
                    for name in names {
                        self.sites.record(
                            location,
                            &scope_name,
                            &AssignmentTargetName::Identifier(name),
                        );
                    }
                }
                self.bind_function(&shape);
            }
            NodeShape::AssignmentStatement {
                statement,
                assignment,
            } => {
                self.statement_assignments.insert(assignment.span);
                let target = resolve_assignment_target(&assignment.left);
                if !target.is_resolved() {
                    self.report(
                        DiagnosticKind::UnresolvedTarget,
                        statement.span,
                        format!("cannot resolve the variable written by this assignment ({target})"),
                    );
                }
                let location = self.lines.location(statement.span.end);
                let scope_name = self.chain.current().name.clone();
                self.sites.record(location, &scope_name, &target);
                self.bind_function(&shape);
            }
            NodeShape::AssignmentExpression(assignment) => {
                let target = self.table.register_assignment(assignment, self.chain.current());
                let via_statement = self.statement_assignments.remove(&assignment.span);
                if !target.is_resolved() && !via_statement {
                    self.report(
                        DiagnosticKind::UnresolvedTarget,
                        assignment.span,
                        format!("cannot resolve the variable written by this assignment ({target})"),
                    );
                }
            }
            NodeShape::Unhandled => {}
        }
    }

    fn leave(&mut self, shape: NodeShape<'_, '_>) {
        match shape {
            NodeShape::Program => {
                if let Some(frame) = self.chain.close_global() {
                    log::debug!("printScope: {}", frame.summary());
                }
            }
            NodeShape::FunctionDeclaration(func) | NodeShape::FunctionExpression(func) => {
                self.close_function_scope(func.span);
            }
            NodeShape::ArrowFunction(arrow) => self.close_function_scope(arrow.span),
            _ => {}
        }
    }

    fn bind_function(&mut self, shape: &NodeShape<'_, '_>) {
        if let Some(bound) = shape.bound_function() {
            self.bound_functions.insert(bound.span, bound.binding);
        }
    }

    fn open_function_scope(&mut self, name: &str, span: Span, params: &FormalParameters<'_>) {
        let scope_name = self.chain.enter_function(name, span).name.clone();
        self.table.register_parameters(params, &scope_name);
        log::debug!("enter: new scope created: {scope_name}");
    }

    fn close_function_scope(&mut self, span: Span) {
        self.bound_functions.remove(&span);
        if let Some(frame) = self.chain.leave_function(span) {
            log::debug!("printScope: {}", frame.summary());
        }
    }

    fn anonymous_scope(&mut self, span: Span) -> String {
        self.report(
            DiagnosticKind::AnonymousScope,
            span,
            format!("function has no name; its scope is keyed as {ANONYMOUS_SCOPE}"),
        );
        ANONYMOUS_SCOPE.to_string()
    }

    fn report(&mut self, kind: DiagnosticKind, span: Span, message: String) {
        let diagnostic = AnalysisDiagnostic::new(kind, self.location(span.start), message);
        log::warn!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    fn location(&self, offset: u32) -> Location {
        self.lines.location(offset)
    }
}

impl<'a> Visit<'a> for ScopeVisitor<'_> {
    fn enter_node(&mut self, kind: AstKind<'a>) {
        self.enter(NodeShape::classify(kind));
    }

    fn leave_node(&mut self, kind: AstKind<'a>) {
        self.leave(NodeShape::classify(kind));
    }
}
