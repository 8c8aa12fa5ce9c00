//! Operators, member access, calls and object creation.

use super::Translator;
use crate::error::{Result, TranslateError};
use crate::hoist::HoistedValue;
use crate::ir::{
    BinaryExpr, BinaryOp, CallExpr, ElementInit, Expr, IndexExpr, InvocationExpr, ListInitExpr,
    MAX_DELEGATE_PARAMETERS, MemberBinding, MemberExpr, MemberInitExpr, Method, NewArrayExpr,
    NewArrayKind, NewExpr, NodeKind, Type, TypeBinaryExpr, TypeTest, UnaryExpr, UnaryOp,
};

/// Infix token of a binary operator.
pub(crate) fn operator_token(kind: NodeKind) -> Result<&'static str> {
    use NodeKind::*;
    Ok(match kind {
        Add | AddChecked => "+",
        AddAssign | AddAssignChecked => "+=",
        And => "&",
        AndAlso => "&&",
        AndAssign => "&=",
        Assign => "=",
        Coalesce => "??",
        Divide => "/",
        DivideAssign => "/=",
        Equal => "==",
        ExclusiveOr => "^",
        ExclusiveOrAssign => "^=",
        GreaterThan => ">",
        GreaterThanOrEqual => ">=",
        LeftShift => "<<",
        LeftShiftAssign => "<<=",
        LessThan => "<",
        LessThanOrEqual => "<=",
        Modulo => "%",
        ModuloAssign => "%=",
        Multiply | MultiplyChecked => "*",
        MultiplyAssign | MultiplyAssignChecked => "*=",
        NotEqual => "!=",
        Or => "|",
        OrAssign => "|=",
        OrElse => "||",
        RightShift => ">>",
        RightShiftAssign => ">>=",
        Subtract | SubtractChecked => "-",
        SubtractAssign | SubtractAssignChecked => "-=",
        other => return Err(TranslateError::UnsupportedOperator { kind: other }),
    })
}

impl Translator<'_> {
    pub(super) fn visit_binary(&mut self, node: &BinaryExpr) -> Result<Expr> {
        let kind = node.op.kind();
        let (left, right) = match node.op {
            BinaryOp::ArrayIndex => {
                let left = self.visit_operand(&node.left, kind, false)?;
                self.write("[");
                let right = self.visit_value(&node.right)?;
                self.write("]");
                (left, right)
            }
            BinaryOp::Power | BinaryOp::PowerAssign => {
                if node.op == BinaryOp::PowerAssign {
                    self.visit_operand(&node.left, kind, false)?;
                    self.write(" = ");
                }
                self.write_type(&Type::math());
                self.write(".Pow(");
                let left = self.visit_value(&node.left)?;
                self.write(", ");
                let right = self.visit_value(&node.right)?;
                self.write(")");
                (left, right)
            }
            _ => {
                let token = operator_token(kind)?;
                let left = self.visit_operand(&node.left, kind, false)?;
                self.write(&format!(" {token} "));
                let right = self.visit_operand(&node.right, kind, true)?;
                (left, right)
            }
        };
        Ok(Expr::binary_typed(node.op, left, right, node.ty.clone()))
    }

    pub(super) fn visit_unary(&mut self, node: &UnaryExpr) -> Result<Expr> {
        match node.op {
            UnaryOp::Convert | UnaryOp::ConvertChecked | UnaryOp::Unbox => {
                self.write("(");
                self.write_type(&node.ty);
                self.write(")");
            }
            UnaryOp::Throw => {
                if node.operand.is_none() {
                    self.write("throw");
                    return Ok(Expr::Unary(node.clone()));
                }
                self.write("throw ");
            }
            _ => {}
        }
        let Some(operand) = node.operand.as_deref() else {
            return Err(TranslateError::InvalidShape(format!(
                "{} node without an operand",
                node.op.kind()
            )));
        };
        let operand = match (node.op, operand) {
            (UnaryOp::Quote, Expr::Lambda(lambda)) => self.visit_inline_lambda(lambda, false)?,
            _ => self.visit_unary_operand(operand, node.op.kind())?,
        };
        if node.op == UnaryOp::TypeAs {
            self.write(" as ");
            self.write_type(&node.ty);
        }
        Ok(Expr::Unary(UnaryExpr {
            op: node.op,
            operand: Some(Box::new(operand)),
            ty: node.ty.clone(),
        }))
    }

    /// Operand with the prefix and postfix tokens of `kind`.
    pub(super) fn visit_unary_operand(&mut self, operand: &Expr, kind: NodeKind) -> Result<Expr> {
        let prefix = match kind {
            NodeKind::IsFalse => "!",
            NodeKind::Negate | NodeKind::NegateChecked => "-",
            NodeKind::Not if operand.ty().is_integral() => "~",
            NodeKind::Not => "!",
            NodeKind::OnesComplement => "~",
            NodeKind::PreDecrementAssign => "--",
            NodeKind::PreIncrementAssign => "++",
            NodeKind::UnaryPlus => "+",
            _ => "",
        };
        self.write(prefix);
        let result = self.visit_operand(operand, kind, false)?;
        let postfix = match kind {
            NodeKind::ArrayLength => ".Length",
            NodeKind::Decrement => " - 1",
            NodeKind::Increment => " + 1",
            NodeKind::PostDecrementAssign => "--",
            NodeKind::PostIncrementAssign => "++",
            _ => "",
        };
        self.write(postfix);
        Ok(result)
    }

    pub(super) fn visit_type_binary(&mut self, node: &TypeBinaryExpr) -> Result<Expr> {
        let expression = match node.test {
            TypeTest::Is => {
                let expression = self.visit_operand(&node.expression, NodeKind::TypeIs, false)?;
                self.write(" is ");
                self.write_type(&node.type_operand);
                expression
            }
            TypeTest::Equal => {
                let expression =
                    self.visit_operand(&node.expression, NodeKind::MemberAccess, false)?;
                if node.expression.ty().is_non_nullable_value() {
                    self.write(".GetType() == typeof(");
                } else {
                    self.write("?.GetType() == typeof(");
                }
                self.write_type(&node.type_operand);
                self.write(")");
                expression
            }
        };
        Ok(Expr::TypeBinary(TypeBinaryExpr {
            test: node.test,
            expression: Box::new(expression),
            type_operand: node.type_operand.clone(),
        }))
    }

    /// `object.Member` or `Type.Member`.
    fn visit_member_access(&mut self, object: Option<&Expr>, owner: &Type, name: &str) -> Result<Option<Expr>> {
        let object = match object {
            Some(object) => Some(self.visit_operand(object, NodeKind::MemberAccess, false)?),
            None => {
                self.write_type(owner);
                None
            }
        };
        self.write(".");
        self.write(name);
        Ok(object)
    }

    pub(super) fn visit_member(&mut self, node: &MemberExpr) -> Result<Expr> {
        let object = self.visit_member_access(
            node.object.as_deref(),
            &node.member.declaring_type,
            &node.member.name,
        )?;
        Ok(Expr::member(object, node.member.clone()))
    }

    pub(super) fn visit_index(&mut self, node: &IndexExpr) -> Result<Expr> {
        let object = match &node.indexer {
            Some(indexer) if !indexer.is_default_member() => self
                .visit_member_access(Some(&node.object), &indexer.declaring_type, &indexer.name)?
                .unwrap_or_else(|| (*node.object).clone()),
            _ => self.visit_operand(&node.object, NodeKind::Index, false)?,
        };
        let arguments = self.visit_arguments("[", &node.arguments, "]")?;
        Ok(Expr::Index(IndexExpr {
            object: Box::new(object),
            indexer: node.indexer.clone(),
            arguments,
            ty: node.ty.clone(),
        }))
    }

    pub(super) fn visit_invocation(&mut self, node: &InvocationExpr) -> Result<Expr> {
        // A delegate creation cannot be invoked without parentheses.
        let parenthesise = match &*node.target {
            Expr::Lambda(lambda) => lambda.captures_outer_variables(),
            Expr::New(_) => true,
            _ => false,
        };
        let target = if parenthesise {
            self.write("(");
            let target = self.visit_value(&node.target)?;
            self.write(")");
            target
        } else {
            self.visit_operand(&node.target, NodeKind::Invoke, false)?
        };
        let arguments = self.visit_arguments("(", &node.arguments, ")")?;
        Ok(Expr::Invocation(InvocationExpr {
            target: Box::new(target),
            arguments,
            ty: node.ty.clone(),
        }))
    }

    pub(super) fn visit_call(&mut self, node: &CallExpr) -> Result<Expr> {
        let method = &node.method;
        let mut arguments: &[Expr] = &node.arguments;
        let mut parameters = method.parameters.as_slice();
        let mut rewritten = Vec::with_capacity(arguments.len());
        let mut object = None;
        let mut hoisted = false;

        if let Some(receiver) = node.object.as_deref() {
            object = Some(self.visit_operand(receiver, NodeKind::Call, false)?);
        } else if !method.is_public
            || method
                .declaring_type
                .as_named()
                .is_some_and(|owner| !owner.is_public)
        {
            let field = self.hoist_method(method)?;
            self.write(&field);
            self.write(".Invoke");
            hoisted = true;
        } else if method.is_extension && !arguments.is_empty() {
            // Not written, but its namespace must be imported.
            self.types.translate(&method.declaring_type);
            rewritten.push(self.visit_operand(&arguments[0], NodeKind::Call, false)?);
            arguments = &arguments[1..];
            parameters = parameters.get(1..).unwrap_or_default();
        } else {
            self.write_type(&method.declaring_type);
        }

        if method.is_default_indexer_getter() {
            rewritten.extend(self.visit_arguments("[", arguments, "]")?);
            return Ok(Expr::call(object, method.clone(), rewritten));
        }

        if !hoisted {
            self.write(".");
            self.write(&method.name);
            if !method.generic_args.is_empty() {
                let args: Vec<String> = method
                    .generic_args
                    .iter()
                    .map(|arg| self.types.translate(arg))
                    .collect();
                self.write(&format!("<{}>", args.join(", ")));
            }
        }
        rewritten.extend(self.visit_list("(", arguments, ")", false, |t, i, arg| {
            if let Some(parameter) = parameters.get(i) {
                t.write(parameter.modifier());
            }
            t.visit_value(arg)
        })?);
        Ok(Expr::call(object, method.clone(), rewritten))
    }

    /// Hoists a non-public static method as a `Func`/`Action` field.
    fn hoist_method(&mut self, method: &Method) -> Result<String> {
        if method.parameters.iter().any(|p| p.is_out || p.is_by_ref()) {
            return Err(TranslateError::NonPublicMethod {
                method: method.name.clone(),
                reason: "out or by-reference parameters cannot be bound to a delegate".into(),
            });
        }
        if method.parameters.len() > MAX_DELEGATE_PARAMETERS {
            return Err(TranslateError::NonPublicMethod {
                method: method.name.clone(),
                reason: format!("more than {MAX_DELEGATE_PARAMETERS} parameters"),
            });
        }
        let parameters = method.parameters.iter().map(|p| p.ty.clone()).collect();
        let delegate = Type::delegate(parameters, method.return_type.clone());
        Ok(self.hoister.field_for(
            HoistedValue::Method(method.clone()),
            delegate,
            &method.name,
            &mut self.names,
        ))
    }

    pub(super) fn visit_new(&mut self, node: &NewExpr) -> Result<NewExpr> {
        self.write("new ");
        self.write_type(&node.ty);
        let arguments = self.visit_arguments("(", &node.arguments, ")")?;
        Ok(NewExpr {
            ty: node.ty.clone(),
            arguments,
        })
    }

    pub(super) fn visit_new_array(&mut self, node: &NewArrayExpr) -> Result<Expr> {
        let expressions = match node.kind {
            NewArrayKind::Bounds => {
                // Jagged arrays: bounds apply to the outermost dimension.
                let mut element = node.ty.element_type().unwrap_or(&Type::Object);
                let mut jagged = 0;
                while let Type::Array { element: inner, .. } = element {
                    element = &**inner;
                    jagged += 1;
                }
                self.write("new ");
                self.write_type(element);
                let bounds = self.visit_arguments("[", &node.expressions, "]")?;
                self.write(&"[]".repeat(jagged));
                bounds
            }
            NewArrayKind::Init => {
                self.write("new ");
                self.write_type(&node.ty);
                self.visit_elements(&node.expressions, false, |t, _, e| t.visit_value(e))?
            }
        };
        Ok(Expr::NewArray(NewArrayExpr {
            kind: node.kind,
            ty: node.ty.clone(),
            expressions,
        }))
    }

    pub(super) fn visit_member_init(&mut self, node: &MemberInitExpr) -> Result<Expr> {
        let new = self.visit_new(&node.new)?;
        let bindings =
            self.visit_elements(&node.bindings, true, |t, _, b| t.visit_member_binding(b))?;
        Ok(Expr::member_init(new, bindings))
    }

    fn visit_member_binding(&mut self, binding: &MemberBinding) -> Result<MemberBinding> {
        let member = binding.member().clone();
        self.write(&member.name);
        Ok(match binding {
            MemberBinding::Assignment { expression, .. } => {
                self.write(" = ");
                MemberBinding::Assignment {
                    member,
                    expression: self.visit_value(expression)?,
                }
            }
            MemberBinding::List { initializers, .. } => {
                self.write(" =");
                MemberBinding::List {
                    member,
                    initializers: self
                        .visit_elements(initializers, false, |t, _, init| t.visit_element_init(init))?,
                }
            }
            MemberBinding::Member { bindings, .. } => {
                self.write(" =");
                MemberBinding::Member {
                    member,
                    bindings: self
                        .visit_elements(bindings, true, |t, _, b| t.visit_member_binding(b))?,
                }
            }
        })
    }

    pub(super) fn visit_list_init(&mut self, node: &ListInitExpr) -> Result<Expr> {
        let new = self.visit_new(&node.new)?;
        let initializers =
            self.visit_elements(&node.initializers, false, |t, _, init| t.visit_element_init(init))?;
        Ok(Expr::list_init(new, initializers))
    }

    fn visit_element_init(&mut self, init: &ElementInit) -> Result<ElementInit> {
        let arguments = match init.arguments.as_slice() {
            [single] => vec![self.visit_value(single)?],
            many => self.visit_arguments("{", many, "}")?,
        };
        Ok(ElementInit { arguments })
    }
}
