//! Expression tree → C# source.
//!
//! A [`Translator`] walks the tree once, writing source text and building a
//! rewritten copy of the tree as it goes. The rewritten tree has anonymous
//! parameters renamed to their synthetic names and, in debug mode, carries a
//! sequence point before every emitted statement.
//!
//! Expression-shaped constructs that C# can only express as statements
//! (blocks, loops, switches, try) are lowered: in statement position they are
//! written as statements, in expression position they are wrapped in a
//! self-invoking closure.
//!
//! ```text
//!   translate(tree)
//!     ├─ visit / visit_statement  → main body       (CodeWriter)
//!     ├─ nested lambdas           → promoted methods (one CodeWriter each)
//!     └─ assemble                 → usings, aliases, namespace, class,
//!                                   hoisted fields, body, promoted methods
//! ```

mod assemble;
mod dynamic;
mod expr;
mod lambda;
mod literal;
mod statement;

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::debug::{DebugMarker, DebugRecorder};
use crate::definitions::Definitions;
use crate::error::{Result, TranslateError};
use crate::hoist::{HoistedField, HoistedValue, Hoister};
use crate::ir::{Expr, LabelTarget, Lambda, NodeKind, Parameter, Type};
use crate::names::NameAllocator;
use crate::precedence::should_group;
use crate::type_names::TypeNames;
use crate::writer::{CodeWriter, TextPosition};

pub(crate) use statement::is_inline;

/// Result of translating one tree.
#[derive(Debug)]
pub struct Translation {
    pub script: String,
    /// The input tree with synthetic names applied and sequence points added.
    pub expression: Expr,
    /// Generated fields that must be assigned before the script runs.
    pub fields: Vec<HoistedField>,
    /// Namespaces imported by the script.
    pub namespaces: Vec<String>,
    /// Assemblies defining the types the script refers to.
    pub assemblies: BTreeSet<String>,
    /// Whether the script uses `dynamic`.
    pub has_dynamic: bool,
    /// Statement spans, in emission order. Empty unless debug mode is on.
    pub markers: Vec<DebugMarker>,
}

impl Translation {
    pub fn field(&self, name: &str) -> Option<&HoistedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn hoisted_value(&self, name: &str) -> Option<&HoistedValue> {
        self.field(name).map(|f| &f.value)
    }
}

/// Translates `node` into a script wrapped according to `definitions`.
///
/// A lambda at the root becomes the entry method; any other node is written
/// as a bare statement sequence.
pub fn translate(node: &Expr, definitions: &Definitions) -> Result<Translation> {
    tracing::debug!(
        kind = %node.kind(),
        type_name = ?definitions.type_name,
        debug = definitions.debug_document.is_some(),
        "translating expression tree"
    );
    let mut pass = Translator::new(definitions, Layout::default()).run(node)?;
    if definitions.debug_document.is_some() {
        // Marker positions depend on the header, which is only known once the
        // body has been written. Translation is deterministic, so a second
        // pass with the measured layout produces the same text.
        pass = Translator::new(definitions, pass.layout).run(node)?;
    }
    let translation = pass.translation;
    tracing::debug!(
        bytes = translation.script.len(),
        fields = translation.fields.len(),
        markers = translation.markers.len(),
        "translation finished"
    );
    Ok(translation)
}

/// Convenience for getting only the text.
pub trait ToScript {
    fn to_script(&self, definitions: &Definitions) -> Result<String>;
}

impl ToScript for Expr {
    fn to_script(&self, definitions: &Definitions) -> Result<String> {
        translate(self, definitions).map(|t| t.script)
    }
}

/// Where each separately written segment starts in the final script.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layout {
    main: TextPosition,
    promoted: Vec<TextPosition>,
}

impl Layout {
    fn promoted_origin(&self, slot: usize) -> TextPosition {
        self.promoted.get(slot).copied().unwrap_or_default()
    }
}

pub(crate) struct Pass {
    translation: Translation,
    layout: Layout,
}

/// How the last statement of a body hands its value to the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Tail {
    /// The value is discarded.
    Discard,
    /// `return value;`
    Return,
    /// `name = value;`
    Assign(String),
}

impl Tail {
    /// Void constructs never hand a value on.
    fn for_type(&self, ty: &Type) -> Tail {
        if ty.is_void() {
            Tail::Discard
        } else {
            self.clone()
        }
    }

    fn prefix(&self) -> Option<String> {
        match self {
            Tail::Discard => None,
            Tail::Return => Some("return ".to_string()),
            Tail::Assign(name) => Some(format!("{name} = ")),
        }
    }
}

/// An enclosing construct that `break`/`continue` bind to.
#[derive(Debug)]
pub(crate) enum JumpScope {
    Loop {
        break_label: Option<LabelTarget>,
        continue_label: Option<LabelTarget>,
        break_via_goto: bool,
        continue_via_goto: bool,
    },
    Switch,
}

/// A try body with a fault handler. Jumps leaving it clear its flag.
#[derive(Debug)]
pub(crate) struct FaultScope {
    flag: String,
    /// Labels defined inside the body.
    labels: HashSet<LabelTarget>,
}

/// Jump state of the enclosing method, set aside while another body is
/// written.
pub(crate) struct JumpContext {
    jumps: Vec<JumpScope>,
    faults: Vec<FaultScope>,
    label_tails: HashMap<LabelTarget, Tail>,
}

pub(crate) struct Translator<'a> {
    definitions: &'a Definitions,
    layout: Layout,
    out: CodeWriter,
    /// Text of promoted lambda methods, in the order they were started.
    promoted: Vec<String>,
    promoted_lambdas: HashMap<Lambda, Lambda>,
    names: NameAllocator,
    hoister: Hoister,
    types: TypeNames,
    /// Variables declared at their first assignment.
    pending_variables: HashSet<Parameter>,
    renamed: HashMap<Parameter, Parameter>,
    jumps: Vec<JumpScope>,
    faults: Vec<FaultScope>,
    /// Labels that hand their value on, and how jumps to them do it.
    label_tails: HashMap<LabelTarget, Tail>,
    debug: Option<DebugRecorder>,
}

impl<'a> Translator<'a> {
    pub(crate) fn new(definitions: &'a Definitions, layout: Layout) -> Self {
        let indent = definitions.member_indent();
        let out = if definitions.type_name.is_some() {
            CodeWriter::segment(indent, layout.main)
        } else {
            CodeWriter::document(indent)
        };
        Self {
            definitions,
            layout,
            out,
            promoted: Vec::new(),
            promoted_lambdas: HashMap::new(),
            names: NameAllocator::new(),
            hoister: Hoister::new(),
            types: TypeNames::new(),
            pending_variables: HashSet::new(),
            renamed: HashMap::new(),
            jumps: Vec::new(),
            faults: Vec::new(),
            label_tails: HashMap::new(),
            debug: definitions
                .debug_document
                .as_deref()
                .map(DebugRecorder::new),
        }
    }

    pub(crate) fn run(mut self, node: &Expr) -> Result<Pass> {
        let expression = match node {
            Expr::Lambda(lambda) => {
                Expr::Lambda(self.visit_method(lambda, lambda::MethodRole::Entry)?)
            }
            other => self.visit(other)?,
        };
        self.assemble(expression)
    }

    fn write(&mut self, text: &str) {
        self.out.write(text);
    }

    fn write_type(&mut self, ty: &Type) {
        let name = self.types.translate(ty);
        self.out.write(&name);
    }

    fn write_default(&mut self, ty: &Type) {
        let name = self.types.translate(ty);
        self.write(&format!("default({name})"));
    }

    /// Clears the jump state before writing a separate function body.
    fn enter_function(&mut self) -> JumpContext {
        JumpContext {
            jumps: std::mem::take(&mut self.jumps),
            faults: std::mem::take(&mut self.faults),
            label_tails: std::mem::take(&mut self.label_tails),
        }
    }

    fn leave_function(&mut self, saved: JumpContext) {
        self.jumps = saved.jumps;
        self.faults = saved.faults;
        self.label_tails = saved.label_tails;
    }

    /// Writes `node` in expression position.
    pub(crate) fn visit(&mut self, node: &Expr) -> Result<Expr> {
        match node {
            Expr::Binary(binary) => self.visit_binary(binary),
            Expr::Unary(unary) => self.visit_unary(unary),
            Expr::Constant(constant) => {
                self.write_value(&constant.value);
                Ok(node.clone())
            }
            Expr::Default(ty) => {
                self.write_default(ty);
                Ok(node.clone())
            }
            Expr::Parameter(parameter) => Ok(Expr::Parameter(self.visit_parameter(parameter, true))),
            Expr::Lambda(lambda) => self.visit_nested_lambda(lambda),
            Expr::Invocation(invocation) => self.visit_invocation(invocation),
            Expr::Call(call) => self.visit_call(call),
            Expr::New(new) => Ok(Expr::New(self.visit_new(new)?)),
            Expr::NewArray(array) => self.visit_new_array(array),
            Expr::Member(member) => self.visit_member(member),
            Expr::MemberInit(init) => self.visit_member_init(init),
            Expr::ListInit(init) => self.visit_list_init(init),
            Expr::Index(index) => self.visit_index(index),
            Expr::Conditional(conditional) => self.visit_conditional(conditional, &Tail::Discard),
            Expr::Block(block) => self.visit_block(block, &Tail::Discard),
            Expr::Loop(lp) => self.visit_loop(lp, &Tail::Discard),
            Expr::Goto(goto) => self.visit_goto(goto),
            Expr::Label(label) => self.visit_label(label, &Tail::Discard, true),
            Expr::Switch(switch) => self.visit_switch(switch, &Tail::Discard),
            Expr::Try(node) => self.visit_try(node, &Tail::Discard),
            Expr::TypeBinary(test) => self.visit_type_binary(test),
            Expr::DebugInfo(_) => Ok(node.clone()),
            Expr::RuntimeVariables(vars) => {
                let field = self.hoister.field_for(
                    HoistedValue::RuntimeVariables(vars.clone()),
                    Type::runtime_variables(),
                    "RuntimeVariables",
                    &mut self.names,
                );
                self.write(&field);
                Ok(node.clone())
            }
            Expr::Dynamic(dynamic) => self.visit_dynamic(dynamic),
            Expr::Extension(_) => Err(TranslateError::UnsupportedNode {
                kind: NodeKind::Extension,
            }),
        }
    }

    /// Writes an operand of a `parent` node, parenthesised when needed.
    pub(crate) fn visit_operand(
        &mut self,
        node: &Expr,
        parent: NodeKind,
        is_right: bool,
    ) -> Result<Expr> {
        if !is_inline(node) {
            return self.visit_closure(node);
        }
        if should_group(Some(node), parent, is_right) {
            self.write("(");
            let result = self.visit(node)?;
            self.write(")");
            Ok(result)
        } else {
            self.visit(node)
        }
    }

    /// Writes a node in a delimited expression slot (argument, test, index).
    pub(crate) fn visit_value(&mut self, node: &Expr) -> Result<Expr> {
        if !is_inline(node) {
            return self.visit_closure(node);
        }
        self.visit(node)
    }

    /// Writes a parameter reference, or marks it for declaration at its
    /// first write when `write` is false.
    pub(crate) fn visit_parameter(&mut self, parameter: &Parameter, write: bool) -> Parameter {
        let name = self.names.parameter(parameter);
        if write {
            if self.pending_variables.remove(parameter) {
                self.write_type(parameter.ty());
                self.write(" ");
            }
            self.write(&name);
        } else {
            self.pending_variables.insert(parameter.clone());
        }
        if parameter.name().is_some() {
            return parameter.clone();
        }
        self.renamed
            .entry(parameter.clone())
            .or_insert_with(|| Parameter::new(parameter.ty().clone(), name))
            .clone()
    }

    /// Writes `open item, item close`, one item per line when `wrap`.
    fn visit_list<T, U>(
        &mut self,
        open: &str,
        items: &[T],
        close: &str,
        wrap: bool,
        mut visit: impl FnMut(&mut Self, usize, &T) -> Result<U>,
    ) -> Result<Vec<U>> {
        self.write(open);
        if wrap {
            self.out.indent();
        }
        let mut result = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if wrap {
                self.out.newline();
            }
            result.push(visit(self, i, item)?);
            if i + 1 != items.len() {
                self.write(if wrap { "," } else { ", " });
            }
        }
        if wrap {
            self.out.dedent();
            self.out.newline();
        }
        self.write(close);
        Ok(result)
    }

    fn visit_arguments(&mut self, open: &str, args: &[Expr], close: &str) -> Result<Vec<Expr>> {
        self.visit_list(open, args, close, false, |t, _, arg| t.visit_value(arg))
    }

    /// Initializer braces. Wrapped for more than four items, or for several
    /// member bindings.
    fn visit_elements<T, U>(
        &mut self,
        items: &[T],
        bindings: bool,
        visit: impl FnMut(&mut Self, usize, &T) -> Result<U>,
    ) -> Result<Vec<U>> {
        let wrap = match items.len() {
            0 => false,
            1..=4 => bindings && items.len() > 1,
            _ => true,
        };
        if wrap {
            self.out.newline();
        } else {
            self.write(" ");
        }
        self.visit_list("{", items, "}", wrap, visit)
    }

    /// Records a sequence point for text written since `start`.
    fn mark(&mut self, start: TextPosition) -> Option<Expr> {
        let end = self.out.position();
        self.debug.as_mut().map(|debug| debug.record(start, end))
    }
}

#[cfg(test)]
mod tests;
