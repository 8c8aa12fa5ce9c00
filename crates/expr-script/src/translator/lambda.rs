//! Lambdas: the entry method, promoted helper methods and inline lambdas.

use super::{Tail, Translator, is_inline};
use crate::error::Result;
use crate::ir::{Expr, Lambda, NodeKind, Parameter};
use crate::writer::CodeWriter;

/// What a lambda written as a method stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum MethodRole {
    /// The root lambda, named after the configured method name.
    Entry,
    /// A nested lambda moved out of its expression.
    Promoted,
}

impl Translator<'_> {
    /// `modifiers Ret name(params) { body }` at the current position.
    pub(super) fn visit_method(&mut self, lambda: &Lambda, role: MethodRole) -> Result<Lambda> {
        let name = match role {
            MethodRole::Entry => self.definitions.method_name().to_string(),
            MethodRole::Promoted => self.names.lambda(lambda),
        };
        self.out.write_line(match role {
            MethodRole::Entry => "public ",
            MethodRole::Promoted => "private ",
        });
        if self.definitions.is_static {
            self.write("static ");
        }
        self.write_type(lambda.return_type());
        self.write(&format!(" {name}"));
        let parameters = self.visit_list("(", lambda.parameters(), ")", false, |t, _, p| {
            Ok(t.visit_parameter_declaration(p))
        })?;

        self.out.open_brace(false);
        let tail = Tail::Return.for_type(lambda.return_type());
        let body = self.visit_body(lambda.body(), &tail)?;
        self.out.close_brace();

        Ok(Lambda::with_return_type(
            Some(name),
            parameters,
            body,
            lambda.return_type().clone(),
        ))
    }

    fn visit_parameter_declaration(&mut self, parameter: &Parameter) -> Parameter {
        if parameter.is_by_ref() {
            self.write("ref ");
        }
        self.write_type(parameter.ty());
        self.write(" ");
        self.visit_parameter(parameter, true)
    }

    /// A lambda in expression position. Lambdas that only use their own
    /// parameters become private methods referenced by name; capturing
    /// lambdas stay inline.
    pub(super) fn visit_nested_lambda(&mut self, lambda: &Lambda) -> Result<Expr> {
        if lambda.captures_outer_variables() {
            return self.visit_inline_lambda(lambda, true);
        }
        let name = self.names.lambda(lambda);
        self.write(&name);
        if let Some(promoted) = self.promoted_lambdas.get(lambda) {
            return Ok(Expr::Lambda(promoted.clone()));
        }

        let slot = self.promoted.len();
        self.promoted.push(String::new());
        let segment = CodeWriter::segment(
            self.definitions.member_indent(),
            self.layout.promoted_origin(slot),
        );
        let main = std::mem::replace(&mut self.out, segment);
        let saved = self.enter_function();
        tracing::trace!(method = %name, slot, "promoting lambda");

        // Blank line between members.
        self.out.newline();
        let result = self.visit_method(lambda, MethodRole::Promoted);

        self.leave_function(saved);
        let segment = std::mem::replace(&mut self.out, main);
        self.promoted[slot] = segment.into_string();
        let promoted = result?;
        self.promoted_lambdas.insert(lambda.clone(), promoted.clone());
        Ok(Expr::Lambda(promoted))
    }

    /// `x => body` or `(x, y) => body`, wrapped as `new Func<…>(…)` when the
    /// lambda must be a delegate value.
    pub(super) fn visit_inline_lambda(&mut self, lambda: &Lambda, as_delegate: bool) -> Result<Expr> {
        if as_delegate {
            self.write("new ");
            self.write_type(&lambda.delegate_type());
            self.write("(");
        }
        let parameters = match lambda.parameters() {
            [single] => vec![self.visit_parameter(single, true)],
            many => self.visit_list("(", many, ")", false, |t, _, p| Ok(t.visit_parameter(p, true)))?,
        };
        self.write(" => ");
        let body = if is_inline(lambda.body()) {
            self.visit_operand(lambda.body(), NodeKind::Quote, false)?
        } else {
            self.out.open_brace(true);
            let saved = self.enter_function();
            let tail = Tail::Return.for_type(lambda.return_type());
            let body = self.visit_body(lambda.body(), &tail);
            self.leave_function(saved);
            let body = body?;
            self.out.close_brace();
            body
        };
        if as_delegate {
            self.write(")");
        }
        Ok(Expr::Lambda(Lambda::with_return_type(
            lambda.name().map(str::to_string),
            parameters,
            body,
            lambda.return_type().clone(),
        )))
    }
}
