//! Typed expression-tree IR.
//!
//! [`Expr`] is a closed sum type: every shape the translator understands is a
//! variant, and every node reports a static result type through [`Expr::ty`].
//! Nodes are immutable values; variables, labels and lambdas are shared
//! identity handles (see [`identity`]).
//!
//! The associated constructors (`Expr::add`, `Expr::block`, …) infer result
//! types the same way the runtime's expression factory does, so small trees
//! can be written without spelling every type out.

mod binder;
mod identity;
mod kind;
mod member;
mod types;
mod value;

pub use binder::Binder;
pub use identity::{Lambda, LambdaData, LabelTarget, Parameter, RuntimeVariables};
pub use kind::{BinaryOp, GotoKind, NodeKind, TypeTest, UnaryOp};
pub use member::{Member, MemberKind, Method, MethodInfo, ParameterInfo};
pub use types::{CORE_LIBRARY, MAX_DELEGATE_PARAMETERS, NamedType, Type, TypeCategory};
pub use value::{HostObject, Value};

#[derive(Debug, Clone)]
pub enum Expr {
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Constant(ConstantExpr),
    Default(Type),
    Parameter(Parameter),
    Lambda(Lambda),
    Invocation(InvocationExpr),
    Call(CallExpr),
    New(NewExpr),
    NewArray(NewArrayExpr),
    Member(MemberExpr),
    MemberInit(MemberInitExpr),
    ListInit(ListInitExpr),
    Index(IndexExpr),
    Conditional(ConditionalExpr),
    Block(BlockExpr),
    Loop(LoopExpr),
    Goto(GotoExpr),
    Label(LabelExpr),
    Switch(SwitchExpr),
    Try(TryExpr),
    TypeBinary(TypeBinaryExpr),
    DebugInfo(DebugInfoExpr),
    RuntimeVariables(RuntimeVariables),
    Dynamic(DynamicExpr),
    Extension(ExtensionExpr),
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    /// Absent only for a rethrow.
    pub operand: Option<Box<Expr>>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct ConstantExpr {
    pub value: Value,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct InvocationExpr {
    pub target: Box<Expr>,
    pub arguments: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    /// Receiver; absent for static calls.
    pub object: Option<Box<Expr>>,
    pub method: Method,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct NewExpr {
    pub ty: Type,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewArrayKind {
    /// `new T[] { a, b }`
    Init,
    /// `new T[n]`
    Bounds,
}

#[derive(Debug, Clone)]
pub struct NewArrayExpr {
    pub kind: NewArrayKind,
    /// The array type being created.
    pub ty: Type,
    pub expressions: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Option<Box<Expr>>,
    pub member: Member,
}

#[derive(Debug, Clone)]
pub enum MemberBinding {
    Assignment { member: Member, expression: Expr },
    List { member: Member, initializers: Vec<ElementInit> },
    Member { member: Member, bindings: Vec<MemberBinding> },
}

impl MemberBinding {
    pub fn member(&self) -> &Member {
        match self {
            MemberBinding::Assignment { member, .. }
            | MemberBinding::List { member, .. }
            | MemberBinding::Member { member, .. } => member,
        }
    }
}

/// One collection-initializer entry (one `Add` call).
#[derive(Debug, Clone)]
pub struct ElementInit {
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberInitExpr {
    pub new: NewExpr,
    pub bindings: Vec<MemberBinding>,
}

#[derive(Debug, Clone)]
pub struct ListInitExpr {
    pub new: NewExpr,
    pub initializers: Vec<ElementInit>,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub object: Box<Expr>,
    /// Indexed property; absent for array access.
    pub indexer: Option<Member>,
    pub arguments: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct ConditionalExpr {
    pub test: Box<Expr>,
    pub if_true: Box<Expr>,
    pub if_false: Box<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct BlockExpr {
    pub variables: Vec<Parameter>,
    pub expressions: Vec<Expr>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct LoopExpr {
    pub body: Box<Expr>,
    pub break_label: Option<LabelTarget>,
    pub continue_label: Option<LabelTarget>,
}

#[derive(Debug, Clone)]
pub struct GotoExpr {
    pub kind: GotoKind,
    pub target: LabelTarget,
    pub value: Option<Box<Expr>>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct LabelExpr {
    pub target: LabelTarget,
    pub default_value: Option<Box<Expr>>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub test_values: Vec<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone)]
pub struct SwitchExpr {
    pub value: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub default_body: Option<Box<Expr>>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct CatchBlock {
    pub test: Type,
    pub variable: Option<Parameter>,
    pub body: Expr,
    pub filter: Option<Expr>,
}

impl CatchBlock {
    pub fn new(test: Type, body: Expr) -> Self {
        Self {
            test,
            variable: None,
            body,
            filter: None,
        }
    }

    /// Catch binding the exception to `variable`, whose type is the test type.
    pub fn with_variable(variable: Parameter, body: Expr) -> Self {
        Self {
            test: variable.ty().clone(),
            variable: Some(variable),
            body,
            filter: None,
        }
    }

    pub fn when(mut self, filter: Expr) -> Self {
        self.filter = Some(filter);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TryExpr {
    pub body: Box<Expr>,
    pub handlers: Vec<CatchBlock>,
    pub finally: Option<Box<Expr>>,
    pub fault: Option<Box<Expr>>,
    pub ty: Type,
}

#[derive(Debug, Clone)]
pub struct TypeBinaryExpr {
    pub test: TypeTest,
    pub expression: Box<Expr>,
    pub type_operand: Type,
}

/// A sequence point: marks the source span of the statement that follows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfoExpr {
    pub document: String,
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone)]
pub struct DynamicExpr {
    pub binder: Binder,
    pub arguments: Vec<Expr>,
    pub ty: Type,
}

/// A node from an extension library that must be reduced before translation.
#[derive(Debug, Clone)]
pub struct ExtensionExpr {
    pub name: String,
    pub ty: Type,
}

impl From<Parameter> for Expr {
    fn from(p: Parameter) -> Self {
        Expr::Parameter(p)
    }
}

impl From<Lambda> for Expr {
    fn from(l: Lambda) -> Self {
        Expr::Lambda(l)
    }
}

fn boxed(e: Expr) -> Box<Expr> {
    Box::new(e)
}

// Constructors
impl Expr {
    pub fn constant(value: impl Into<Value>) -> Expr {
        let value = value.into();
        let ty = value.ty();
        Expr::Constant(ConstantExpr { value, ty })
    }

    pub fn typed_constant(value: Value, ty: Type) -> Expr {
        Expr::Constant(ConstantExpr { value, ty })
    }

    pub fn null(ty: Type) -> Expr {
        Expr::typed_constant(Value::Null, ty)
    }

    pub fn default(ty: Type) -> Expr {
        Expr::Default(ty)
    }

    /// A no-op statement.
    pub fn empty() -> Expr {
        Expr::Default(Type::Void)
    }

    /// Binary node with the result type the runtime infers.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let ty = if op.is_comparison() || matches!(op, BinaryOp::AndAlso | BinaryOp::OrElse) {
            Type::Bool
        } else {
            match op {
                BinaryOp::ArrayIndex => left
                    .ty()
                    .element_type()
                    .cloned()
                    .unwrap_or(Type::Object),
                BinaryOp::Coalesce => right.ty(),
                _ => left.ty(),
            }
        };
        Expr::binary_typed(op, left, right, ty)
    }

    pub fn binary_typed(op: BinaryOp, left: Expr, right: Expr, ty: Type) -> Expr {
        Expr::Binary(BinaryExpr {
            op,
            left: boxed(left),
            right: boxed(right),
            ty,
        })
    }

    pub fn add(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Add, left, right)
    }

    pub fn subtract(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Subtract, left, right)
    }

    pub fn multiply(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Multiply, left, right)
    }

    pub fn divide(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Divide, left, right)
    }

    pub fn equal(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::Equal, left, right)
    }

    pub fn less_than(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::LessThan, left, right)
    }

    pub fn greater_than(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::GreaterThan, left, right)
    }

    pub fn and_also(left: Expr, right: Expr) -> Expr {
        Expr::binary(BinaryOp::AndAlso, left, right)
    }

    pub fn assign(target: Expr, value: Expr) -> Expr {
        Expr::binary(BinaryOp::Assign, target, value)
    }

    pub fn unary(op: UnaryOp, operand: Expr, ty: Type) -> Expr {
        Expr::Unary(UnaryExpr {
            op,
            operand: Some(boxed(operand)),
            ty,
        })
    }

    /// Unary node keeping the operand's type.
    pub fn unary_same(op: UnaryOp, operand: Expr) -> Expr {
        let ty = operand.ty();
        Expr::unary(op, operand, ty)
    }

    pub fn negate(operand: Expr) -> Expr {
        Expr::unary_same(UnaryOp::Negate, operand)
    }

    pub fn not(operand: Expr) -> Expr {
        Expr::unary_same(UnaryOp::Not, operand)
    }

    pub fn convert(operand: Expr, ty: Type) -> Expr {
        Expr::unary(UnaryOp::Convert, operand, ty)
    }

    pub fn type_as(operand: Expr, ty: Type) -> Expr {
        Expr::unary(UnaryOp::TypeAs, operand, ty)
    }

    pub fn array_length(array: Expr) -> Expr {
        Expr::unary(UnaryOp::ArrayLength, array, Type::Int)
    }

    pub fn throw(exception: Expr) -> Expr {
        Expr::unary(UnaryOp::Throw, exception, Type::Void)
    }

    pub fn rethrow() -> Expr {
        Expr::Unary(UnaryExpr {
            op: UnaryOp::Throw,
            operand: None,
            ty: Type::Void,
        })
    }

    pub fn quote(lambda: Lambda) -> Expr {
        let ty = lambda.delegate_type();
        Expr::unary(UnaryOp::Quote, Expr::Lambda(lambda), ty)
    }

    pub fn call(object: Option<Expr>, method: Method, arguments: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            object: object.map(boxed),
            method,
            arguments,
        })
    }

    pub fn call_static(method: Method, arguments: Vec<Expr>) -> Expr {
        Expr::call(None, method, arguments)
    }

    pub fn invoke(target: Expr, arguments: Vec<Expr>) -> Expr {
        let ty = match &target {
            Expr::Lambda(lambda) => lambda.return_type().clone(),
            other => delegate_result(&other.ty()),
        };
        Expr::Invocation(InvocationExpr {
            target: boxed(target),
            arguments,
            ty,
        })
    }

    pub fn new(ty: Type, arguments: Vec<Expr>) -> Expr {
        Expr::New(NewExpr { ty, arguments })
    }

    pub fn new_array_init(element: Type, expressions: Vec<Expr>) -> Expr {
        Expr::NewArray(NewArrayExpr {
            kind: NewArrayKind::Init,
            ty: Type::array(element),
            expressions,
        })
    }

    pub fn new_array_bounds(element: Type, bounds: Vec<Expr>) -> Expr {
        Expr::NewArray(NewArrayExpr {
            kind: NewArrayKind::Bounds,
            ty: Type::array_of_rank(element, bounds.len()),
            expressions: bounds,
        })
    }

    pub fn member(object: Option<Expr>, member: Member) -> Expr {
        Expr::Member(MemberExpr {
            object: object.map(boxed),
            member,
        })
    }

    pub fn member_init(new: NewExpr, bindings: Vec<MemberBinding>) -> Expr {
        Expr::MemberInit(MemberInitExpr { new, bindings })
    }

    pub fn list_init(new: NewExpr, initializers: Vec<ElementInit>) -> Expr {
        Expr::ListInit(ListInitExpr { new, initializers })
    }

    /// Array element or indexed-property access.
    pub fn index(object: Expr, indexer: Option<Member>, arguments: Vec<Expr>) -> Expr {
        let ty = match &indexer {
            Some(member) => member.ty.clone(),
            None => object.ty().element_type().cloned().unwrap_or(Type::Object),
        };
        Expr::Index(IndexExpr {
            object: boxed(object),
            indexer,
            arguments,
            ty,
        })
    }

    pub fn condition(test: Expr, if_true: Expr, if_false: Expr, ty: Type) -> Expr {
        Expr::Conditional(ConditionalExpr {
            test: boxed(test),
            if_true: boxed(if_true),
            if_false: boxed(if_false),
            ty,
        })
    }

    /// Value-producing conditional typed after the true branch.
    pub fn ternary(test: Expr, if_true: Expr, if_false: Expr) -> Expr {
        let ty = if_true.ty();
        Expr::condition(test, if_true, if_false, ty)
    }

    pub fn if_then(test: Expr, if_true: Expr) -> Expr {
        Expr::condition(test, if_true, Expr::empty(), Type::Void)
    }

    pub fn if_then_else(test: Expr, if_true: Expr, if_false: Expr) -> Expr {
        Expr::condition(test, if_true, if_false, Type::Void)
    }

    pub fn block(expressions: Vec<Expr>) -> Expr {
        Expr::block_with_variables(Vec::new(), expressions)
    }

    /// Block typed after its last expression.
    pub fn block_with_variables(variables: Vec<Parameter>, expressions: Vec<Expr>) -> Expr {
        let ty = expressions.last().map(Expr::ty).unwrap_or(Type::Void);
        Expr::Block(BlockExpr {
            variables,
            expressions,
            ty,
        })
    }

    pub fn loop_with_labels(
        body: Expr,
        break_label: Option<LabelTarget>,
        continue_label: Option<LabelTarget>,
    ) -> Expr {
        Expr::Loop(LoopExpr {
            body: boxed(body),
            break_label,
            continue_label,
        })
    }

    pub fn infinite_loop(body: Expr) -> Expr {
        Expr::loop_with_labels(body, None, None)
    }

    pub fn jump(kind: GotoKind, target: LabelTarget, value: Option<Expr>) -> Expr {
        Expr::Goto(GotoExpr {
            kind,
            target,
            value: value.map(boxed),
            ty: Type::Void,
        })
    }

    pub fn break_to(target: LabelTarget) -> Expr {
        Expr::jump(GotoKind::Break, target, None)
    }

    pub fn continue_to(target: LabelTarget) -> Expr {
        Expr::jump(GotoKind::Continue, target, None)
    }

    pub fn goto_label(target: LabelTarget) -> Expr {
        Expr::jump(GotoKind::Goto, target, None)
    }

    pub fn return_to(target: LabelTarget, value: Option<Expr>) -> Expr {
        Expr::jump(GotoKind::Return, target, value)
    }

    pub fn label(target: LabelTarget, default_value: Option<Expr>) -> Expr {
        Expr::Label(LabelExpr {
            target,
            default_value: default_value.map(boxed),
        })
    }

    pub fn switch(
        value: Expr,
        cases: Vec<SwitchCase>,
        default_body: Option<Expr>,
        ty: Type,
    ) -> Expr {
        Expr::Switch(SwitchExpr {
            value: boxed(value),
            cases,
            default_body: default_body.map(boxed),
            ty,
        })
    }

    pub fn try_catch(body: Expr, handlers: Vec<CatchBlock>) -> Expr {
        Expr::try_full(body, handlers, None, None)
    }

    pub fn try_finally(body: Expr, finally: Expr) -> Expr {
        Expr::try_full(body, Vec::new(), Some(finally), None)
    }

    pub fn try_fault(body: Expr, fault: Expr) -> Expr {
        Expr::try_full(body, Vec::new(), None, Some(fault))
    }

    /// Try typed after its body.
    pub fn try_full(
        body: Expr,
        handlers: Vec<CatchBlock>,
        finally: Option<Expr>,
        fault: Option<Expr>,
    ) -> Expr {
        let ty = body.ty();
        Expr::Try(TryExpr {
            body: boxed(body),
            handlers,
            finally: finally.map(boxed),
            fault: fault.map(boxed),
            ty,
        })
    }

    pub fn type_is(expression: Expr, ty: Type) -> Expr {
        Expr::TypeBinary(TypeBinaryExpr {
            test: TypeTest::Is,
            expression: boxed(expression),
            type_operand: ty,
        })
    }

    pub fn type_equal(expression: Expr, ty: Type) -> Expr {
        Expr::TypeBinary(TypeBinaryExpr {
            test: TypeTest::Equal,
            expression: boxed(expression),
            type_operand: ty,
        })
    }

    pub fn lambda(parameters: Vec<Parameter>, body: Expr) -> Expr {
        Expr::Lambda(Lambda::new(parameters, body))
    }

    pub fn runtime_variables(variables: Vec<Parameter>) -> Expr {
        Expr::RuntimeVariables(RuntimeVariables::new(variables))
    }

    pub fn dynamic(binder: Binder, arguments: Vec<Expr>, ty: Type) -> Expr {
        Expr::Dynamic(DynamicExpr {
            binder,
            arguments,
            ty,
        })
    }

    pub fn extension(name: impl Into<String>, ty: Type) -> Expr {
        Expr::Extension(ExtensionExpr {
            name: name.into(),
            ty,
        })
    }
}

/// Result type of a `Func<…>` delegate; `void` otherwise.
fn delegate_result(ty: &Type) -> Type {
    match ty.as_named() {
        Some(named) if named.simple_name() == "Func" => {
            named.generic_args.last().cloned().unwrap_or(Type::Void)
        }
        _ => Type::Void,
    }
}

// Queries
impl Expr {
    /// Static result type.
    pub fn ty(&self) -> Type {
        match self {
            Expr::Binary(node) => node.ty.clone(),
            Expr::Unary(node) => node.ty.clone(),
            Expr::Constant(node) => node.ty.clone(),
            Expr::Default(ty) => ty.clone(),
            Expr::Parameter(p) => match p.ty() {
                Type::ByRef(inner) => (**inner).clone(),
                ty => ty.clone(),
            },
            Expr::Lambda(lambda) => lambda.delegate_type(),
            Expr::Invocation(node) => node.ty.clone(),
            Expr::Call(node) => node.method.return_type.clone(),
            Expr::New(node) => node.ty.clone(),
            Expr::NewArray(node) => node.ty.clone(),
            Expr::Member(node) => node.member.ty.clone(),
            Expr::MemberInit(node) => node.new.ty.clone(),
            Expr::ListInit(node) => node.new.ty.clone(),
            Expr::Index(node) => node.ty.clone(),
            Expr::Conditional(node) => node.ty.clone(),
            Expr::Block(node) => node.ty.clone(),
            Expr::Loop(node) => node
                .break_label
                .as_ref()
                .map(|l| l.ty().clone())
                .unwrap_or(Type::Void),
            Expr::Goto(node) => node.ty.clone(),
            Expr::Label(node) => node.target.ty().clone(),
            Expr::Switch(node) => node.ty.clone(),
            Expr::Try(node) => node.ty.clone(),
            Expr::TypeBinary(_) => Type::Bool,
            Expr::DebugInfo(_) => Type::Void,
            Expr::RuntimeVariables(_) => Type::runtime_variables(),
            Expr::Dynamic(node) => node.ty.clone(),
            Expr::Extension(node) => node.ty.clone(),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Expr::Binary(node) => node.op.kind(),
            Expr::Unary(node) => node.op.kind(),
            Expr::Constant(_) => NodeKind::Constant,
            Expr::Default(_) => NodeKind::Default,
            Expr::Parameter(_) => NodeKind::Parameter,
            Expr::Lambda(_) => NodeKind::Lambda,
            Expr::Invocation(_) => NodeKind::Invoke,
            Expr::Call(_) => NodeKind::Call,
            Expr::New(_) => NodeKind::New,
            Expr::NewArray(node) => match node.kind {
                NewArrayKind::Init => NodeKind::NewArrayInit,
                NewArrayKind::Bounds => NodeKind::NewArrayBounds,
            },
            Expr::Member(_) => NodeKind::MemberAccess,
            Expr::MemberInit(_) => NodeKind::MemberInit,
            Expr::ListInit(_) => NodeKind::ListInit,
            Expr::Index(_) => NodeKind::Index,
            Expr::Conditional(_) => NodeKind::Conditional,
            Expr::Block(_) => NodeKind::Block,
            Expr::Loop(_) => NodeKind::Loop,
            Expr::Goto(_) => NodeKind::Goto,
            Expr::Label(_) => NodeKind::Label,
            Expr::Switch(_) => NodeKind::Switch,
            Expr::Try(_) => NodeKind::Try,
            Expr::TypeBinary(node) => node.test.kind(),
            Expr::DebugInfo(_) => NodeKind::DebugInfo,
            Expr::RuntimeVariables(_) => NodeKind::RuntimeVariables,
            Expr::Dynamic(_) => NodeKind::Dynamic,
            Expr::Extension(_) => NodeKind::Extension,
        }
    }

    /// Whether this is a no-op `default(void)`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Expr::Default(Type::Void))
    }

    /// Calls `f` on each direct child, lambda bodies included.
    pub fn for_each_child(&self, f: &mut dyn FnMut(&Expr)) {
        fn each_binding(binding: &MemberBinding, f: &mut dyn FnMut(&Expr)) {
            match binding {
                MemberBinding::Assignment { expression, .. } => f(expression),
                MemberBinding::List { initializers, .. } => {
                    initializers.iter().flat_map(|i| &i.arguments).for_each(|e| f(e))
                }
                MemberBinding::Member { bindings, .. } => {
                    bindings.iter().for_each(|b| each_binding(b, f))
                }
            }
        }

        match self {
            Expr::Binary(node) => {
                f(&node.left);
                f(&node.right);
            }
            Expr::Unary(node) => node.operand.iter().for_each(|e| f(e)),
            Expr::Lambda(lambda) => f(lambda.body()),
            Expr::Invocation(node) => {
                f(&node.target);
                node.arguments.iter().for_each(|e| f(e));
            }
            Expr::Call(node) => {
                node.object.iter().for_each(|e| f(e));
                node.arguments.iter().for_each(|e| f(e));
            }
            Expr::New(node) => node.arguments.iter().for_each(|e| f(e)),
            Expr::NewArray(node) => node.expressions.iter().for_each(|e| f(e)),
            Expr::Member(node) => node.object.iter().for_each(|e| f(e)),
            Expr::MemberInit(node) => {
                node.new.arguments.iter().for_each(|e| f(e));
                node.bindings.iter().for_each(|b| each_binding(b, f));
            }
            Expr::ListInit(node) => {
                node.new.arguments.iter().for_each(|e| f(e));
                node.initializers
                    .iter()
                    .flat_map(|i| &i.arguments)
                    .for_each(|e| f(e));
            }
            Expr::Index(node) => {
                f(&node.object);
                node.arguments.iter().for_each(|e| f(e));
            }
            Expr::Conditional(node) => {
                f(&node.test);
                f(&node.if_true);
                f(&node.if_false);
            }
            Expr::Block(node) => node.expressions.iter().for_each(|e| f(e)),
            Expr::Loop(node) => f(&node.body),
            Expr::Goto(node) => node.value.iter().for_each(|e| f(e)),
            Expr::Label(node) => node.default_value.iter().for_each(|e| f(e)),
            Expr::Switch(node) => {
                f(&node.value);
                for case in &node.cases {
                    case.test_values.iter().for_each(|e| f(e));
                    f(&case.body);
                }
                node.default_body.iter().for_each(|e| f(e));
            }
            Expr::Try(node) => {
                f(&node.body);
                for handler in &node.handlers {
                    handler.filter.iter().for_each(|e| f(e));
                    f(&handler.body);
                }
                node.finally.iter().for_each(|e| f(e));
                node.fault.iter().for_each(|e| f(e));
            }
            Expr::TypeBinary(node) => f(&node.expression),
            Expr::Dynamic(node) => node.arguments.iter().for_each(|e| f(e)),
            Expr::Constant(_)
            | Expr::Default(_)
            | Expr::Parameter(_)
            | Expr::DebugInfo(_)
            | Expr::RuntimeVariables(_)
            | Expr::Extension(_) => {}
        }
    }

    /// Whether `variable` occurs anywhere in this subtree.
    pub fn mentions(&self, variable: &Parameter) -> bool {
        match self {
            Expr::Parameter(p) => p == variable,
            Expr::RuntimeVariables(vars) => vars.variables().contains(variable),
            other => {
                let mut found = false;
                other.for_each_child(&mut |child| {
                    found = found || child.mentions(variable);
                });
                found
            }
        }
    }
}
