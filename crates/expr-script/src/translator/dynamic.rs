//! Late-bound operations, written as ordinary syntax on `dynamic` receivers.

use super::Translator;
use super::expr::operator_token;
use crate::error::{Result, TranslateError};
use crate::ir::{Binder, DynamicExpr, Expr, NodeKind};

fn too_few_arguments(node: &DynamicExpr) -> TranslateError {
    TranslateError::InvalidShape(format!(
        "{} binder needs {} arguments, found {}",
        node.binder,
        node.binder.min_arguments(),
        node.arguments.len()
    ))
}

impl Translator<'_> {
    pub(super) fn visit_dynamic(&mut self, node: &DynamicExpr) -> Result<Expr> {
        if node.arguments.len() < node.binder.min_arguments() {
            return Err(too_few_arguments(node));
        }
        let Some((receiver, rest)) = node.arguments.split_first() else {
            return Err(too_few_arguments(node));
        };
        self.types.mark_dynamic();

        let mut arguments = Vec::with_capacity(node.arguments.len());
        // Arguments past the ones a binder reads are carried over untouched.
        let mut passed = rest;
        match &node.binder {
            Binder::Convert { ty } => {
                self.write("(");
                self.write_type(ty);
                self.write(")");
                arguments.push(self.visit_operand(receiver, NodeKind::Convert, false)?);
            }
            Binder::GetMember { name } => {
                arguments.push(self.visit_operand(receiver, NodeKind::MemberAccess, false)?);
                self.write(&format!(".{name}"));
            }
            Binder::SetMember { name } => {
                arguments.push(self.visit_operand(receiver, NodeKind::MemberAccess, false)?);
                self.write(&format!(".{name} = "));
                let (value, tail) = rest.split_first().ok_or_else(|| too_few_arguments(node))?;
                arguments.push(self.visit_operand(value, NodeKind::Assign, true)?);
                passed = tail;
            }
            Binder::DeleteMember { name } => {
                arguments.push(self.visit_operand(receiver, NodeKind::MemberAccess, false)?);
                self.write(&format!(".{name} = null"));
            }
            Binder::GetIndex => {
                arguments.push(self.visit_operand(receiver, NodeKind::Index, false)?);
                arguments.extend(self.visit_arguments("[", rest, "]")?);
                passed = &[];
            }
            Binder::SetIndex => {
                arguments.push(self.visit_operand(receiver, NodeKind::Index, false)?);
                let (value, indices) = rest.split_last().ok_or_else(|| too_few_arguments(node))?;
                arguments.extend(self.visit_arguments("[", indices, "]")?);
                self.write(" = ");
                arguments.push(self.visit_operand(value, NodeKind::Assign, true)?);
                passed = &[];
            }
            Binder::DeleteIndex => {
                arguments.push(self.visit_operand(receiver, NodeKind::Index, false)?);
                arguments.extend(self.visit_arguments("[", rest, "]")?);
                self.write(" = null");
                passed = &[];
            }
            Binder::InvokeMember { name } => {
                arguments.push(self.visit_operand(receiver, NodeKind::MemberAccess, false)?);
                self.write(&format!(".{name}"));
                arguments.extend(self.visit_arguments("(", rest, ")")?);
                passed = &[];
            }
            Binder::Invoke => {
                arguments.push(self.visit_operand(receiver, NodeKind::Invoke, false)?);
                arguments.extend(self.visit_arguments("(", rest, ")")?);
                passed = &[];
            }
            Binder::CreateInstance => {
                self.write("new ");
                arguments.push(self.visit_operand(receiver, NodeKind::Invoke, false)?);
                arguments.extend(self.visit_arguments("(", rest, ")")?);
                passed = &[];
            }
            Binder::UnaryOperation(kind) => {
                arguments.push(self.visit_unary_operand(receiver, *kind)?);
            }
            Binder::BinaryOperation(kind) => {
                let token = operator_token(*kind)?;
                arguments.push(self.visit_operand(receiver, *kind, false)?);
                self.write(&format!(" {token} "));
                let (right, tail) = rest.split_first().ok_or_else(|| too_few_arguments(node))?;
                arguments.push(self.visit_operand(right, *kind, true)?);
                passed = tail;
            }
            Binder::Custom { .. } => {
                return Err(TranslateError::UnsupportedBinder {
                    binder: node.binder.to_string(),
                });
            }
        }
        arguments.extend(passed.iter().cloned());
        Ok(Expr::dynamic(node.binder.clone(), arguments, node.ty.clone()))
    }
}
