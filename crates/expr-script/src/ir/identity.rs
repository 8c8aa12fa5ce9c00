//! Identity-compared handles.
//!
//! Parameters, labels, lambdas and runtime-variable sets are distinguished by
//! identity, not by name: two anonymous parameters of the same type are two
//! different variables. Each handle wraps an `Rc` and hashes its address.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use super::Expr;
use super::types::Type;

macro_rules! identity_handle {
    ($name:ident) => {
        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Rc::ptr_eq(&self.0, &other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                (Rc::as_ptr(&self.0) as *const () as usize).hash(state);
            }
        }
    };
}

#[derive(Debug)]
struct Variable {
    name: Option<String>,
    ty: Type,
}

impl Variable {
    fn new(ty: Type, name: Option<String>) -> Self {
        Self {
            name: name.filter(|n| !n.is_empty()),
            ty,
        }
    }
}

/// A lambda parameter or block variable.
#[derive(Debug, Clone)]
pub struct Parameter(Rc<Variable>);

identity_handle!(Parameter);

impl Parameter {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self(Rc::new(Variable::new(ty, Some(name.into()))))
    }

    pub fn anonymous(ty: Type) -> Self {
        Self(Rc::new(Variable::new(ty, None)))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }

    pub fn is_by_ref(&self) -> bool {
        matches!(self.0.ty, Type::ByRef(_))
    }
}

/// Target of jumps and labels.
#[derive(Debug, Clone)]
pub struct LabelTarget(Rc<Variable>);

identity_handle!(LabelTarget);

impl LabelTarget {
    pub fn new(ty: Type, name: impl Into<String>) -> Self {
        Self(Rc::new(Variable::new(ty, Some(name.into()))))
    }

    pub fn anonymous(ty: Type) -> Self {
        Self(Rc::new(Variable::new(ty, None)))
    }

    /// An anonymous label carrying no value.
    pub fn void() -> Self {
        Self::anonymous(Type::Void)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn ty(&self) -> &Type {
        &self.0.ty
    }
}

#[derive(Debug)]
pub struct LambdaData {
    pub name: Option<String>,
    pub parameters: Vec<Parameter>,
    pub body: Expr,
    pub return_type: Type,
}

/// A function literal.
#[derive(Debug, Clone)]
pub struct Lambda(Rc<LambdaData>);

identity_handle!(Lambda);

impl Lambda {
    /// A lambda returning its body's type.
    pub fn new(parameters: Vec<Parameter>, body: Expr) -> Self {
        let return_type = body.ty();
        Self::with_return_type(None, parameters, body, return_type)
    }

    pub fn with_return_type(
        name: Option<String>,
        parameters: Vec<Parameter>,
        body: Expr,
        return_type: Type,
    ) -> Self {
        Self(Rc::new(LambdaData {
            name,
            parameters,
            body,
            return_type,
        }))
    }

    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.0.parameters
    }

    pub fn body(&self) -> &Expr {
        &self.0.body
    }

    pub fn return_type(&self) -> &Type {
        &self.0.return_type
    }

    /// `Func<…>` or `Action<…>` matching the signature.
    pub fn delegate_type(&self) -> Type {
        let parameters = self.0.parameters.iter().map(|p| p.ty().clone()).collect();
        Type::delegate(parameters, self.0.return_type.clone())
    }

    /// Whether the body reads a variable bound outside the lambda.
    pub fn captures_outer_variables(&self) -> bool {
        let mut bound: Vec<Parameter> = self.0.parameters.clone();
        references_unbound(&self.0.body, &mut bound)
    }
}

fn references_unbound(expr: &Expr, bound: &mut Vec<Parameter>) -> bool {
    let scope = bound.len();
    let found = match expr {
        Expr::Parameter(p) => !bound.contains(p),
        Expr::Block(block) => {
            bound.extend(block.variables.iter().cloned());
            block
                .expressions
                .iter()
                .any(|e| references_unbound(e, bound))
        }
        Expr::Lambda(lambda) => {
            bound.extend(lambda.parameters().iter().cloned());
            references_unbound(lambda.body(), bound)
        }
        Expr::Try(node) => {
            references_unbound(&node.body, bound)
                || node.finally.as_deref().is_some_and(|e| references_unbound(e, bound))
                || node.fault.as_deref().is_some_and(|e| references_unbound(e, bound))
                || node.handlers.iter().any(|handler| {
                    let scope = bound.len();
                    bound.extend(handler.variable.iter().cloned());
                    let found = references_unbound(&handler.body, bound)
                        || handler
                            .filter
                            .as_ref()
                            .is_some_and(|f| references_unbound(f, bound));
                    bound.truncate(scope);
                    found
                })
        }
        Expr::RuntimeVariables(vars) => vars.variables().iter().any(|p| !bound.contains(p)),
        other => {
            let mut found = false;
            other.for_each_child(&mut |child| {
                found = found || references_unbound(child, bound);
            });
            found
        }
    };
    bound.truncate(scope);
    found
}

/// The set of variables exposed by a runtime-variables node.
#[derive(Debug, Clone)]
pub struct RuntimeVariables(Rc<Vec<Parameter>>);

identity_handle!(RuntimeVariables);

impl RuntimeVariables {
    pub fn new(variables: Vec<Parameter>) -> Self {
        Self(Rc::new(variables))
    }

    pub fn variables(&self) -> &[Parameter] {
        &self.0
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}
