//! AST visitor for traversing expression trees.
//!
//! Provides an `ExprVisitor` trait whose default methods walk into children,
//! and `referenced_paths`, which lists the data an expression reads.

use crate::node::*;

/// A visitor over expression nodes. Override the hooks of interest; call
/// `walk_expr` from an override to keep descending.
pub trait ExprVisitor {
    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_property(&mut self, path: &PropertyPath) {
        walk_computed(self, path);
    }

    fn visit_method_call(&mut self, object: &Expr, _method: &str, arguments: &[Expr]) {
        self.visit_expr(object);
        for argument in arguments {
            self.visit_expr(argument);
        }
    }
}

/// Visit every child of `expr`.
pub fn walk_expr<V: ExprVisitor + ?Sized>(visitor: &mut V, expr: &Expr) {
    match expr {
        Expr::Literal { .. } => {}
        Expr::Property(path) => visitor.visit_property(path),
        Expr::Parentheses { inner } => visitor.visit_expr(inner),
        Expr::Array { elements } => {
            for element in elements {
                visitor.visit_expr(element);
            }
        }
        Expr::Object { pairs } => {
            for pair in pairs {
                visitor.visit_expr(&pair.value);
            }
        }
        Expr::Index { object, index } => {
            visitor.visit_expr(object);
            visitor.visit_expr(index);
        }
        Expr::Member { object, .. } => visitor.visit_expr(object),
        Expr::MethodCall {
            object,
            method,
            arguments,
        } => visitor.visit_method_call(object, method, arguments),
        Expr::Ternary {
            condition,
            true_value,
            false_value,
        } => {
            visitor.visit_expr(condition);
            visitor.visit_expr(true_value);
            visitor.visit_expr(false_value);
        }
        Expr::Logical(b) | Expr::Comparison(b) | Expr::Arithmetic(b) => {
            visitor.visit_expr(&b.left);
            visitor.visit_expr(&b.right);
        }
        Expr::Unary { operand, .. } => visitor.visit_expr(operand),
    }
}

struct PathCollector {
    paths: Vec<String>,
}

impl ExprVisitor for PathCollector {
    fn visit_property(&mut self, path: &PropertyPath) {
        if !self.paths.contains(&path.path) {
            self.paths.push(path.path.clone());
        }
        walk_computed(self, path);
    }
}

/// Every property path an expression reads, in first-seen order.
pub fn referenced_paths(expr: &Expr) -> Vec<String> {
    let mut collector = PathCollector { paths: Vec::new() };
    collector.visit_expr(expr);
    collector.paths
}

/// The distinct root identifiers an expression reads.
pub fn referenced_roots(expr: &Expr) -> Vec<String> {
    struct Roots(Vec<String>);
    impl ExprVisitor for Roots {
        fn visit_property(&mut self, path: &PropertyPath) {
            if let Some(root) = path.root() {
                if !self.0.iter().any(|r| r == root) {
                    self.0.push(root.to_string());
                }
            }
            walk_computed(self, path);
        }
    }
    let mut roots = Roots(Vec::new());
    roots.visit_expr(expr);
    roots.0
}

fn walk_computed<V: ExprVisitor + ?Sized>(visitor: &mut V, path: &PropertyPath) {
    for segment in &path.segments {
        if let PropertySegment::Computed(inner) = segment {
            visitor.visit_expr(inner);
        }
    }
}
