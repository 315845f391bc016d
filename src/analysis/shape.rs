//! Node shape classification
//!
//! The traversal only cares about a handful of syntax-node kinds. This module
//! turns oxc's [`AstKind`] into a closed [`NodeShape`] so the rest of the
//! engine matches on a finite set of cases, with [`NodeShape::Unhandled`] for
//! everything else.

use oxc_ast::ast::*;
use oxc_ast::AstKind;
use oxc_span::Span;
use std::fmt;

/// Sentinel used for scopes whose function has no usable name
pub const ANONYMOUS_SCOPE: &str = "<anonymous>";

/// The syntax-node kinds the engine understands
#[derive(Debug, Clone, Copy)]
pub enum NodeShape<'n, 'a> {
    /// Root of the tree; its scope is seeded before traversal
    Program,
    /// `function f() {}`
    FunctionDeclaration(&'n Function<'a>),
    /// `function () {}` in expression position
    FunctionExpression(&'n Function<'a>),
    /// `() => {}`
    ArrowFunction(&'n ArrowFunctionExpression<'a>),
    /// `let x = ...` (one declarator of a declaration)
    VariableDeclarator(&'n VariableDeclarator<'a>),
    /// `x = ...;` as a whole statement
    AssignmentStatement {
        statement: &'n ExpressionStatement<'a>,
        assignment: &'n AssignmentExpression<'a>,
    },
    /// Any assignment expression, nested or not
    AssignmentExpression(&'n AssignmentExpression<'a>),
    Unhandled,
}

impl<'a> NodeShape<'a, 'a> {
    pub fn classify(kind: AstKind<'a>) -> Self {
        match kind {
            AstKind::Program(_) => NodeShape::Program,
            AstKind::Function(func) => match func.r#type {
                FunctionType::FunctionDeclaration => NodeShape::FunctionDeclaration(func),
                FunctionType::FunctionExpression => NodeShape::FunctionExpression(func),
                _ => NodeShape::Unhandled,
            },
            AstKind::ArrowFunctionExpression(arrow) => NodeShape::ArrowFunction(arrow),
            AstKind::VariableDeclarator(declarator) => NodeShape::VariableDeclarator(declarator),
            AstKind::ExpressionStatement(statement) => match &statement.expression {
                Expression::AssignmentExpression(assignment) => NodeShape::AssignmentStatement {
                    statement,
                    assignment,
                },
                _ => NodeShape::Unhandled,
            },
            AstKind::AssignmentExpression(assignment) => NodeShape::AssignmentExpression(assignment),
            _ => NodeShape::Unhandled,
        }
    }
}

impl<'n, 'a> NodeShape<'n, 'a> {
    /// Whether this node is a mutation site: an assignment statement or a
    /// declarator with an initializer
    pub fn is_mutation_site(&self) -> bool {
        match self {
            NodeShape::AssignmentStatement { .. } => true,
            NodeShape::VariableDeclarator(declarator) => declarator.init.is_some(),
            _ => false,
        }
    }

    /// The function expression this node binds to a name, if any
    ///
    /// `let f = function () {}` and `f = function () {}` both bind the
    /// function on their right-hand side; that function opens a scope.
    pub fn bound_function(&self) -> Option<BoundFunction> {
        let (value, binding) = match self {
            NodeShape::VariableDeclarator(declarator) => {
                let binding = match &declarator.id.kind {
                    BindingPatternKind::BindingIdentifier(id) => Some(id.name.to_string()),
                    _ => None,
                };
                (declarator.init.as_ref()?, binding)
            }
            NodeShape::AssignmentStatement { assignment, .. } => {
                let binding = function_binding_name(&assignment.left);
                (&assignment.right, binding)
            }
            _ => return None,
        };

        match value.without_parentheses() {
            Expression::FunctionExpression(func) => Some(BoundFunction {
                span: func.span,
                binding,
            }),
            Expression::ArrowFunctionExpression(arrow) => Some(BoundFunction {
                span: arrow.span,
                binding,
            }),
            _ => None,
        }
    }
}

/// A function expression together with the name its binding gives it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundFunction {
    pub span: Span,
    pub binding: Option<String>,
}

/// Resolved name of an assignment or mutation target
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssignmentTargetName {
    Identifier(String),
    /// The target has no owning identifier; carries a label for the shape
    Unresolved(&'static str),
}

impl AssignmentTargetName {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            AssignmentTargetName::Identifier(name) => Some(name),
            AssignmentTargetName::Unresolved(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, AssignmentTargetName::Identifier(_))
    }
}

impl fmt::Display for AssignmentTargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssignmentTargetName::Identifier(name) => f.write_str(name),
            AssignmentTargetName::Unresolved(label) => write!(f, "<unresolved:{label}>"),
        }
    }
}

/// Resolve the variable an assignment writes to
///
/// Member writes (`a.b.c = 1`) are attributed to the outermost object
/// identifier (`a`).
pub fn resolve_assignment_target(target: &AssignmentTarget<'_>) -> AssignmentTargetName {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(id) => {
            AssignmentTargetName::Identifier(id.name.to_string())
        }
        AssignmentTarget::StaticMemberExpression(member) => resolve_object(&member.object),
        AssignmentTarget::ComputedMemberExpression(member) => resolve_object(&member.object),
        AssignmentTarget::PrivateFieldExpression(member) => resolve_object(&member.object),
        AssignmentTarget::ArrayAssignmentTarget(_) | AssignmentTarget::ObjectAssignmentTarget(_) => {
            AssignmentTargetName::Unresolved("DestructuringAssignment")
        }
        _ => AssignmentTargetName::Unresolved("TypeAssertion"),
    }
}

fn resolve_object(object: &Expression<'_>) -> AssignmentTargetName {
    match object.without_parentheses() {
        Expression::Identifier(id) => AssignmentTargetName::Identifier(id.name.to_string()),
        Expression::StaticMemberExpression(member) => resolve_object(&member.object),
        Expression::ComputedMemberExpression(member) => resolve_object(&member.object),
        Expression::PrivateFieldExpression(member) => resolve_object(&member.object),
        Expression::ThisExpression(_) => AssignmentTargetName::Unresolved("ThisExpression"),
        Expression::Super(_) => AssignmentTargetName::Unresolved("Super"),
        Expression::CallExpression(_) => AssignmentTargetName::Unresolved("CallExpression"),
        _ => AssignmentTargetName::Unresolved("Expression"),
    }
}

/// Name a function assigned to `target` should get
///
/// For `obj.handler = function () {}` this is the property name, not the
/// owning object.
fn function_binding_name(target: &AssignmentTarget<'_>) -> Option<String> {
    match target {
        AssignmentTarget::AssignmentTargetIdentifier(id) => Some(id.name.to_string()),
        AssignmentTarget::StaticMemberExpression(member) => Some(member.property.name.to_string()),
        _ => None,
    }
}

/// Every identifier bound by a pattern, in source order
pub fn binding_names(pattern: &BindingPattern<'_>) -> Vec<String> {
    let mut names = Vec::new();
    collect_binding_names(pattern, &mut names);
    names
}

/// Every identifier bound by a parameter list, rest parameter included
pub fn parameter_names(params: &FormalParameters<'_>) -> Vec<String> {
    let mut names = Vec::new();
    for param in &params.items {
        collect_binding_names(&param.pattern, &mut names);
    }
    if let Some(rest) = &params.rest {
        collect_binding_names(&rest.argument, &mut names);
    }
    names
}

fn collect_binding_names(pattern: &BindingPattern<'_>, names: &mut Vec<String>) {
    match &pattern.kind {
        BindingPatternKind::BindingIdentifier(id) => names.push(id.name.to_string()),
        BindingPatternKind::ObjectPattern(object) => {
            for property in &object.properties {
                collect_binding_names(&property.value, names);
            }
            if let Some(rest) = &object.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::ArrayPattern(array) => {
            for element in array.elements.iter().flatten() {
                collect_binding_names(element, names);
            }
            if let Some(rest) = &array.rest {
                collect_binding_names(&rest.argument, names);
            }
        }
        BindingPatternKind::AssignmentPattern(assignment) => {
            collect_binding_names(&assignment.left, names);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxc_allocator::Allocator;
    use oxc_parser::Parser;
    use oxc_span::SourceType;

    fn with_first_statement<R>(source: &str, check: impl FnOnce(&Statement<'_>) -> R) -> R {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
        assert!(ret.errors.is_empty(), "parse errors in {source:?}");
        check(&ret.program.body[0])
    }

    fn first_assignment_target(source: &str) -> AssignmentTargetName {
        with_first_statement(source, |stmt| match stmt {
            Statement::ExpressionStatement(stmt) => match &stmt.expression {
                Expression::AssignmentExpression(assign) => resolve_assignment_target(&assign.left),
                other => panic!("not an assignment: {other:?}"),
            },
            other => panic!("not an expression statement: {other:?}"),
        })
    }

    fn first_declarator_names(source: &str) -> Vec<String> {
        with_first_statement(source, |stmt| match stmt {
            Statement::VariableDeclaration(decl) => binding_names(&decl.declarations[0].id),
            other => panic!("not a declaration: {other:?}"),
        })
    }

    #[test]
    fn test_resolve_plain_identifier() {
        assert_eq!(
            first_assignment_target("x = 2;"),
            AssignmentTargetName::Identifier("x".to_string())
        );
    }

    #[test]
    fn test_resolve_member_to_outermost_object() {
        assert_eq!(
            first_assignment_target("config.server.port = 80;"),
            AssignmentTargetName::Identifier("config".to_string())
        );
        assert_eq!(
            first_assignment_target("items[i].done = true;"),
            AssignmentTargetName::Identifier("items".to_string())
        );
    }

    #[test]
    fn test_unresolved_targets() {
        let this_write = first_assignment_target("this.count = 0;");
        assert_eq!(this_write, AssignmentTargetName::Unresolved("ThisExpression"));
        assert_eq!(this_write.to_string(), "<unresolved:ThisExpression>");
        assert!(!first_assignment_target("[a, b] = [b, a];").is_resolved());
    }

    #[test]
    fn test_destructuring_binding_names() {
        assert_eq!(
            first_declarator_names("let { a, b: [c, d = 1], ...rest } = obj;"),
            vec!["a", "c", "d", "rest"]
        );
    }

    #[test]
    fn test_parameter_names_include_rest_and_defaults() {
        let names = with_first_statement("function f(a, b = 2, { c }, ...more) {}", |stmt| {
            match stmt {
                Statement::FunctionDeclaration(func) => parameter_names(&func.params),
                other => panic!("not a function: {other:?}"),
            }
        });
        assert_eq!(names, vec!["a", "b", "c", "more"]);
    }

    #[test]
    fn test_mutation_site_classification() {
        with_first_statement("let a = 1, b;", |stmt| {
            let Statement::VariableDeclaration(decl) = stmt else {
                panic!("not a declaration");
            };
            assert!(NodeShape::VariableDeclarator(&decl.declarations[0]).is_mutation_site());
            assert!(!NodeShape::VariableDeclarator(&decl.declarations[1]).is_mutation_site());
        });
    }

    #[test]
    fn test_bound_function_names() {
        with_first_statement("const handler = function () {};", |stmt| {
            let Statement::VariableDeclaration(decl) = stmt else {
                panic!("not a declaration");
            };
            let bound = NodeShape::VariableDeclarator(&decl.declarations[0])
                .bound_function()
                .expect("function initializer");
            assert_eq!(bound.binding.as_deref(), Some("handler"));
        });
        with_first_statement("module.exports.run = () => 1;", |stmt| {
            let Statement::ExpressionStatement(statement) = stmt else {
                panic!("not an expression statement");
            };
            let Expression::AssignmentExpression(assignment) = &statement.expression else {
                panic!("not an assignment");
            };
            let shape = NodeShape::AssignmentStatement {
                statement,
                assignment,
            };
            assert_eq!(
                shape.bound_function().and_then(|b| b.binding).as_deref(),
                Some("run")
            );
        });
    }
}
