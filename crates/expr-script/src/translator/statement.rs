//! Statement lowering: blocks, conditionals, loops, switches, try, jumps.

use std::collections::HashSet;

use super::{FaultScope, JumpScope, Tail, Translator};
use crate::error::Result;
use crate::ir::{
    BinaryOp, BlockExpr, CatchBlock, ConditionalExpr, Expr, GotoExpr, GotoKind, LabelExpr,
    LabelTarget, LoopExpr, NodeKind, Parameter, SwitchCase, SwitchExpr, TryExpr, Type, UnaryOp,
};

/// Whether a node can be written as a pure expression.
pub(crate) fn is_inline(node: &Expr) -> bool {
    match node {
        Expr::Block(_)
        | Expr::DebugInfo(_)
        | Expr::Label(_)
        | Expr::Loop(_)
        | Expr::Switch(_)
        | Expr::Try(_) => false,
        Expr::Conditional(conditional) => conditional_is_inline(conditional),
        _ => true,
    }
}

fn conditional_is_inline(conditional: &ConditionalExpr) -> bool {
    !conditional.ty.is_void() && is_inline(&conditional.if_true) && is_inline(&conditional.if_false)
}

fn is_throw(node: &Expr) -> bool {
    matches!(node, Expr::Unary(unary) if unary.op == UnaryOp::Throw)
}

/// Whether C# accepts `node;` as a statement.
fn is_statement_expression(node: &Expr) -> bool {
    match node {
        Expr::Call(_) | Expr::Invocation(_) | Expr::New(_) | Expr::Dynamic(_) => true,
        Expr::Binary(binary) => binary.op.kind().is_assignment(),
        Expr::Unary(unary) => unary.op.kind().is_assignment(),
        _ => false,
    }
}

/// Labels defined anywhere inside `node`, loop labels included.
fn labels_within(node: &Expr, labels: &mut HashSet<LabelTarget>) {
    match node {
        Expr::Label(label) => {
            labels.insert(label.target.clone());
        }
        Expr::Loop(lp) => {
            labels.extend(lp.break_label.iter().chain(&lp.continue_label).cloned());
        }
        _ => {}
    }
    node.for_each_child(&mut |child| labels_within(child, labels));
}

/// Rewritten statement list as a single node.
fn block_of(mut lines: Vec<Expr>) -> Expr {
    if lines.len() == 1 {
        return lines.remove(0);
    }
    Expr::block(lines)
}

/// Block variables whose first mention is as the target of a top-level
/// assignment. These are declared at that assignment.
fn implicitly_declared(block: &BlockExpr, tail: &Tail) -> HashSet<Parameter> {
    let mut undecided: Vec<&Parameter> = block.variables.iter().collect();
    let mut implicit = HashSet::new();
    let last = block.expressions.len().saturating_sub(1);
    for (i, statement) in block.expressions.iter().enumerate() {
        if undecided.is_empty() {
            break;
        }
        // A returned assignment cannot carry a declaration.
        let hands_on_value = i == last && *tail != Tail::Discard;
        undecided.retain(|variable| {
            let declares = match statement {
                Expr::Binary(assign) if assign.op == BinaryOp::Assign && !hands_on_value => {
                    matches!(&*assign.left, Expr::Parameter(target) if target == *variable)
                        && !assign.right.mentions(variable)
                }
                _ => false,
            };
            if declares {
                implicit.insert((*variable).clone());
                return false;
            }
            !statement.mentions(variable)
        });
    }
    implicit
}

/// Where a `break`/`continue`/`goto` lands.
enum Jump {
    Break,
    Continue,
    Goto(String),
}

impl Translator<'_> {
    /// Writes a block-only node in expression position as a self-invoking
    /// closure: `(new Func<T>(() => { … }))()`.
    pub(super) fn visit_closure(&mut self, node: &Expr) -> Result<Expr> {
        let ty = node.ty();
        let tail = Tail::Return.for_type(&ty);
        self.write("(new ");
        self.write_type(&Type::delegate(Vec::new(), ty));
        self.write("(() => ");
        self.out.open_brace(true);
        let saved = self.enter_function();
        let result = self.visit_statement(node, &tail);
        self.leave_function(saved);
        let result = result?;
        self.out.close_brace();
        self.write("))()");
        Ok(result)
    }

    /// Writes a node in statement position.
    pub(super) fn visit_statement(&mut self, node: &Expr, tail: &Tail) -> Result<Expr> {
        match node {
            Expr::Block(block) => self.visit_block(block, tail),
            Expr::Conditional(conditional) => self.visit_conditional(conditional, tail),
            Expr::Switch(switch) => self.visit_switch(switch, tail),
            Expr::Try(node) => self.visit_try(node, tail),
            Expr::Label(label) => self.visit_label(label, tail, true),
            Expr::Loop(lp) => self.visit_loop(lp, tail),
            other => self.visit(other),
        }
    }

    /// Writes the statements of a braced body.
    pub(super) fn visit_body(&mut self, node: &Expr, tail: &Tail) -> Result<Expr> {
        match node {
            Expr::Block(block) => self.visit_block(block, tail),
            empty if empty.is_empty() => Ok(empty.clone()),
            other => {
                let lines = self.visit_statements(std::slice::from_ref(other), tail)?;
                Ok(block_of(lines))
            }
        }
    }

    fn visit_statements(&mut self, statements: &[Expr], tail: &Tail) -> Result<Vec<Expr>> {
        let mut lines = Vec::with_capacity(statements.len());
        let last = statements.len().saturating_sub(1);
        if let Some(Expr::Label(label)) = statements.last() {
            self.hand_on_through(&label.target, tail.for_type(label.target.ty()));
        }
        for (i, statement) in statements.iter().enumerate() {
            if statement.is_empty() {
                continue;
            }
            if let Expr::DebugInfo(_) = statement {
                // Replaced by fresh sequence points in debug mode.
                if self.debug.is_none() {
                    lines.push(statement.clone());
                }
                continue;
            }
            let tail = if i == last {
                tail.clone()
            } else {
                Tail::Discard
            };
            match statement {
                Expr::Label(label) => lines.push(self.visit_label(label, &tail, i == last)?),
                inline if is_inline(inline) => {
                    self.out.newline();
                    let start = self.out.position();
                    let hands_on = !is_throw(inline)
                        && !matches!(inline, Expr::Goto(_))
                        && !inline.ty().is_void();
                    if let Some(prefix) = tail.prefix().filter(|_| hands_on) {
                        self.write(&prefix);
                    }
                    let line = self.visit(inline)?;
                    self.write(";");
                    lines.extend(self.mark(start));
                    lines.push(line);
                }
                other => {
                    if i > 0 {
                        self.out.newline();
                    }
                    lines.push(self.visit_statement(other, &tail)?);
                }
            }
        }
        Ok(lines)
    }

    pub(super) fn visit_block(&mut self, block: &BlockExpr, tail: &Tail) -> Result<Expr> {
        let tail = tail.for_type(&block.ty);
        let implicit = implicitly_declared(block, &tail);
        let mut variables = Vec::with_capacity(block.variables.len());
        let mut declared = false;
        for variable in &block.variables {
            if implicit.contains(variable) {
                variables.push(self.visit_parameter(variable, false));
                continue;
            }
            self.out.newline();
            self.write_type(variable.ty());
            self.write(" ");
            variables.push(self.visit_parameter(variable, true));
            self.write(";");
            declared = true;
        }
        if declared {
            self.out.newline();
        }
        let expressions = self.visit_statements(&block.expressions, &tail)?;
        Ok(Expr::Block(BlockExpr {
            variables,
            expressions,
            ty: block.ty.clone(),
        }))
    }

    pub(super) fn visit_conditional(
        &mut self,
        conditional: &ConditionalExpr,
        tail: &Tail,
    ) -> Result<Expr> {
        if !conditional_is_inline(conditional) {
            return self.visit_if(conditional, tail, false);
        }
        let test = self.visit_operand(&conditional.test, NodeKind::Conditional, false)?;
        self.write(" ? ");
        let if_true = self.visit_operand(&conditional.if_true, NodeKind::Conditional, false)?;
        self.write(" : ");
        let if_false = self.visit_operand(&conditional.if_false, NodeKind::Conditional, false)?;
        Ok(Expr::condition(test, if_true, if_false, conditional.ty.clone()))
    }

    fn visit_if(&mut self, conditional: &ConditionalExpr, tail: &Tail, chained: bool) -> Result<Expr> {
        let tail = tail.for_type(&conditional.ty);
        self.out.write_line(if chained { "else if (" } else { "if (" });
        let test = self.visit_test(&conditional.test)?;
        self.write(")");
        self.out.open_brace(false);
        let if_true = self.visit_body(&conditional.if_true, &tail)?;
        self.out.close_brace();
        let if_false = match &*conditional.if_false {
            Expr::Default(ty) if ty.is_void() || tail == Tail::Discard => {
                (*conditional.if_false).clone()
            }
            Expr::Conditional(nested) => self.visit_if(nested, &tail, true)?,
            other => {
                self.out.write_line("else");
                self.out.open_brace(false);
                let body = self.visit_body(other, &tail)?;
                self.out.close_brace();
                body
            }
        };
        Ok(Expr::condition(test, if_true, if_false, conditional.ty.clone()))
    }

    /// Writes an `if`/`while` test, wrapped with a sequence point in debug mode.
    fn visit_test(&mut self, test: &Expr) -> Result<Expr> {
        let start = self.out.position();
        let test = self.visit_value(test)?;
        Ok(match self.mark(start) {
            Some(point) => Expr::block(vec![point, test]),
            None => test,
        })
    }

    pub(super) fn visit_loop(&mut self, lp: &LoopExpr, tail: &Tail) -> Result<Expr> {
        let ty = lp.break_label.as_ref().map_or(Type::Void, |label| label.ty().clone());
        let tail = tail.for_type(&ty);
        if let Some(label) = &lp.break_label {
            self.hand_on_through(label, tail.clone());
        }
        self.jumps.push(JumpScope::Loop {
            break_label: lp.break_label.clone(),
            continue_label: lp.continue_label.clone(),
            break_via_goto: false,
            continue_via_goto: false,
        });
        let body = match &*lp.body {
            Expr::Conditional(conditional) if self.exits_loop(&conditional.if_false, lp) => {
                self.out.write_line("while (");
                let test = self.visit_test(&conditional.test)?;
                self.write(")");
                self.out.open_brace(false);
                let if_true = self.visit_body(&conditional.if_true, &Tail::Discard)?;
                self.write_continue_label();
                self.out.close_brace();
                // Falling out of the test hands on the label's default.
                if let Some(prefix) = tail.prefix() {
                    self.out.write_line(&prefix);
                    self.write_default(&ty);
                    self.write(";");
                }
                Expr::condition(
                    test,
                    if_true,
                    (*conditional.if_false).clone(),
                    conditional.ty.clone(),
                )
            }
            body => {
                self.out.write_line("while (true)");
                self.out.open_brace(false);
                let body = self.visit_body(body, &Tail::Discard)?;
                self.write_continue_label();
                self.out.close_brace();
                body
            }
        };
        if let Some(JumpScope::Loop {
            break_label: Some(label),
            break_via_goto: true,
            ..
        }) = self.jumps.pop()
        {
            let name = self.names.label(&label);
            self.out.write_line(&format!("{name}:;"));
        }
        Ok(Expr::loop_with_labels(
            body,
            lp.break_label.clone(),
            lp.continue_label.clone(),
        ))
    }

    fn exits_loop(&self, node: &Expr, lp: &LoopExpr) -> bool {
        match node {
            Expr::Goto(goto) => {
                goto.value.is_none() && lp.break_label.as_ref() == Some(&goto.target)
            }
            _ => false,
        }
    }

    /// Makes jumps to `target` hand their value on through `tail`.
    fn hand_on_through(&mut self, target: &LabelTarget, tail: Tail) {
        if tail != Tail::Discard {
            self.label_tails.insert(target.clone(), tail);
        }
    }

    /// Clears the fault flag of every try body a jump to `target` leaves.
    /// `None` leaves the whole method.
    fn leave_faults(&mut self, target: Option<&LabelTarget>) {
        let flags: Vec<String> = self
            .faults
            .iter()
            .rev()
            .take_while(|scope| target.is_none_or(|target| !scope.labels.contains(target)))
            .map(|scope| scope.flag.clone())
            .collect();
        for flag in flags {
            self.write(&format!("{flag} = false;"));
            self.out.newline();
        }
    }

    fn write_continue_label(&mut self) {
        if let Some(JumpScope::Loop {
            continue_label: Some(label),
            continue_via_goto: true,
            ..
        }) = self.jumps.last()
        {
            let label = label.clone();
            let name = self.names.label(&label);
            self.out.write_line(&format!("{name}:;"));
        }
    }

    fn resolve_jump(&mut self, target: &LabelTarget) -> Jump {
        for (depth, scope) in self.jumps.iter_mut().rev().enumerate() {
            let JumpScope::Loop {
                break_label,
                continue_label,
                break_via_goto,
                continue_via_goto,
            } = scope
            else {
                continue;
            };
            if break_label.as_ref() == Some(target) {
                if depth == 0 {
                    return Jump::Break;
                }
                *break_via_goto = true;
                break;
            }
            if continue_label.as_ref() == Some(target) {
                if depth == 0 {
                    return Jump::Continue;
                }
                *continue_via_goto = true;
                break;
            }
        }
        Jump::Goto(self.names.label(target))
    }

    pub(super) fn visit_goto(&mut self, goto: &GotoExpr) -> Result<Expr> {
        let target = &goto.target;
        let value = match self.label_tails.get(target).cloned() {
            Some(Tail::Return) => {
                self.leave_faults(None);
                self.write("return ");
                let value = self.visit_jump_value(goto)?;
                return Ok(Expr::jump(goto.kind, target.clone(), Some(value)));
            }
            Some(Tail::Assign(name)) => {
                self.write(&format!("{name} = "));
                let value = self.visit_jump_value(goto)?;
                self.write(";");
                self.out.newline();
                Some(value)
            }
            _ if goto.kind == GotoKind::Return => {
                self.leave_faults(None);
                self.write("return");
                let mut value = None;
                if let Some(node) = goto.value.as_deref() {
                    self.write(" ");
                    value = Some(self.visit_value(node)?);
                }
                return Ok(Expr::jump(goto.kind, target.clone(), value));
            }
            _ => match goto.value.as_deref() {
                // Nothing receives the value; only its effects are kept.
                Some(node) if is_statement_expression(node) => {
                    let value = self.visit(node)?;
                    self.write(";");
                    self.out.newline();
                    Some(value)
                }
                other => other.cloned(),
            },
        };
        self.leave_faults(Some(target));
        match self.resolve_jump(target) {
            Jump::Break => self.write("break"),
            Jump::Continue => self.write("continue"),
            Jump::Goto(name) => self.write(&format!("goto {name}")),
        }
        Ok(Expr::jump(goto.kind, target.clone(), value))
    }

    /// The carried value, or the target type's default.
    fn visit_jump_value(&mut self, goto: &GotoExpr) -> Result<Expr> {
        match goto.value.as_deref() {
            Some(node) => self.visit_value(node),
            None => self.visit_default_of(goto.target.ty()),
        }
    }

    fn visit_default_of(&mut self, ty: &Type) -> Result<Expr> {
        self.write_default(ty);
        Ok(Expr::default(ty.clone()))
    }

    /// `name:`. A label ending a body is followed by an empty statement, or
    /// hands on its default value. Under an assigning tail the default is
    /// stored before the label so that jumps keep the value they carried.
    pub(super) fn visit_label(&mut self, label: &LabelExpr, tail: &Tail, is_last: bool) -> Result<Expr> {
        let name = self.names.label(&label.target);
        let tail = if is_last {
            tail.for_type(label.target.ty())
        } else {
            Tail::Discard
        };
        let default_value = match &tail {
            Tail::Discard => {
                self.out.write_line(&format!("{name}:"));
                if is_last {
                    self.write(";");
                }
                label.default_value.as_deref().cloned()
            }
            Tail::Return => {
                self.out.write_line(&format!("{name}:"));
                self.out.write_line("return ");
                let value = self.visit_label_default(label)?;
                self.write(";");
                Some(value)
            }
            Tail::Assign(variable) => {
                self.out.write_line(&format!("{variable} = "));
                let value = self.visit_label_default(label)?;
                self.write(";");
                self.out.write_line(&format!("{name}:;"));
                Some(value)
            }
        };
        Ok(Expr::label(label.target.clone(), default_value))
    }

    fn visit_label_default(&mut self, label: &LabelExpr) -> Result<Expr> {
        match label.default_value.as_deref() {
            Some(value) => self.visit_value(value),
            None => self.visit_default_of(label.target.ty()),
        }
    }

    pub(super) fn visit_switch(&mut self, switch: &SwitchExpr, tail: &Tail) -> Result<Expr> {
        let tail = tail.for_type(&switch.ty);
        let returns = tail == Tail::Return;
        self.out.write_line("switch (");
        let value = self.visit_value(&switch.value)?;
        self.write(")");
        self.out.open_brace(false);
        self.jumps.push(JumpScope::Switch);
        let mut cases = Vec::with_capacity(switch.cases.len());
        for case in &switch.cases {
            let mut test_values = Vec::with_capacity(case.test_values.len());
            for test in &case.test_values {
                self.out.write_line("case ");
                test_values.push(self.visit_value(test)?);
                self.write(":");
            }
            let body = self.visit_case_body(&case.body, &tail, returns)?;
            cases.push(SwitchCase { test_values, body });
        }
        let default_body = match switch.default_body.as_deref() {
            Some(body) => {
                self.out.write_line("default:");
                Some(self.visit_case_body(body, &tail, returns)?)
            }
            None => None,
        };
        self.jumps.pop();
        self.out.close_brace();
        Ok(Expr::switch(value, cases, default_body, switch.ty.clone()))
    }

    fn visit_case_body(&mut self, body: &Expr, tail: &Tail, returns: bool) -> Result<Expr> {
        self.out.indent();
        let body = self.visit_body(body, tail)?;
        if !returns {
            self.out.write_line("break;");
        }
        self.out.dedent();
        Ok(body)
    }

    /// `try`/`catch`/`finally`. A fault handler is emulated with a flag that
    /// is cleared at the end of the try body and tested in `finally`.
    pub(super) fn visit_try(&mut self, node: &TryExpr, tail: &Tail) -> Result<Expr> {
        let tail = tail.for_type(&node.ty);
        let fault_flag = node.fault.as_ref().map(|_| self.names.fresh("fault"));
        let (inner, result) = match (&fault_flag, &tail) {
            (Some(_), Tail::Return) => {
                let name = self.names.fresh("result");
                self.out.newline();
                self.write_type(&node.ty);
                self.write(&format!(" {name};"));
                (Tail::Assign(name.clone()), Some(name))
            }
            _ => (tail.clone(), None),
        };
        if let Some(flag) = &fault_flag {
            self.out.write_line(&format!("bool {flag} = true;"));
        }

        self.out.write_line("try");
        self.out.open_brace(false);
        if let Some(flag) = &fault_flag {
            let mut labels = HashSet::new();
            labels_within(&node.body, &mut labels);
            self.faults.push(FaultScope {
                flag: flag.clone(),
                labels,
            });
        }
        let body = self.visit_body(&node.body, &inner);
        if fault_flag.is_some() {
            self.faults.pop();
        }
        let body = body?;
        if let Some(flag) = &fault_flag {
            self.out.write_line(&format!("{flag} = false;"));
        }
        self.out.close_brace();

        let mut handlers = Vec::with_capacity(node.handlers.len());
        for handler in &node.handlers {
            self.out.write_line("catch (");
            self.write_type(&handler.test);
            let variable = match &handler.variable {
                Some(variable) => {
                    self.write(" ");
                    Some(self.visit_parameter(variable, true))
                }
                None => None,
            };
            self.write(")");
            let filter = match &handler.filter {
                Some(filter) => {
                    self.write(" when (");
                    let filter = self.visit_value(filter)?;
                    self.write(")");
                    Some(filter)
                }
                None => None,
            };
            self.out.open_brace(false);
            let body = self.visit_body(&handler.body, &inner)?;
            self.out.close_brace();
            handlers.push(CatchBlock {
                test: handler.test.clone(),
                variable,
                body,
                filter,
            });
        }

        let mut finally = None;
        let mut fault = None;
        if node.finally.is_some() || node.fault.is_some() {
            self.out.write_line("finally");
            self.out.open_brace(false);
            if let Some(body) = node.finally.as_deref() {
                finally = Some(self.visit_body(body, &Tail::Discard)?);
            }
            if let (Some(body), Some(flag)) = (node.fault.as_deref(), &fault_flag) {
                self.out.write_line(&format!("if ({flag})"));
                self.out.open_brace(false);
                fault = Some(self.visit_body(body, &Tail::Discard)?);
                self.out.close_brace();
            }
            self.out.close_brace();
        }

        if let Some(name) = result {
            self.out.write_line(&format!("return {name};"));
        }
        Ok(Expr::Try(TryExpr {
            body: Box::new(body),
            handlers,
            finally: finally.map(Box::new),
            fault: fault.map(Box::new),
            ty: node.ty.clone(),
        }))
    }
}
