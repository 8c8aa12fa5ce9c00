//! Node tags.
//!
//! [`NodeKind`] names every shape an [`Expr`](super::Expr) can take. Binary
//! and unary nodes carry a narrower operator enum ([`BinaryOp`], [`UnaryOp`])
//! that converts losslessly into the tag.

use std::fmt;

/// The tag of an IR node. Determines arity and child roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Add,
    AddChecked,
    Subtract,
    SubtractChecked,
    Multiply,
    MultiplyChecked,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    ExclusiveOr,
    AndAlso,
    OrElse,
    LeftShift,
    RightShift,
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Coalesce,
    ArrayIndex,
    Assign,
    AddAssign,
    AddAssignChecked,
    SubtractAssign,
    SubtractAssignChecked,
    MultiplyAssign,
    MultiplyAssignChecked,
    DivideAssign,
    ModuloAssign,
    PowerAssign,
    AndAssign,
    OrAssign,
    ExclusiveOrAssign,
    LeftShiftAssign,
    RightShiftAssign,

    Negate,
    NegateChecked,
    UnaryPlus,
    Not,
    OnesComplement,
    IsTrue,
    IsFalse,
    Convert,
    ConvertChecked,
    TypeAs,
    ArrayLength,
    Quote,
    Throw,
    Unbox,
    Increment,
    Decrement,
    PreIncrementAssign,
    PreDecrementAssign,
    PostIncrementAssign,
    PostDecrementAssign,

    Constant,
    Default,
    Parameter,
    Lambda,
    Invoke,
    Call,
    New,
    NewArrayInit,
    NewArrayBounds,
    MemberAccess,
    MemberInit,
    ListInit,
    Index,
    Conditional,
    Block,
    Loop,
    Goto,
    Label,
    Switch,
    Try,
    TypeIs,
    TypeEqual,
    DebugInfo,
    RuntimeVariables,
    Dynamic,
    Extension,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl NodeKind {
    /// Whether the node stores into its operand.
    pub fn is_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::AddAssignChecked
                | Self::SubtractAssign
                | Self::SubtractAssignChecked
                | Self::MultiplyAssign
                | Self::MultiplyAssignChecked
                | Self::DivideAssign
                | Self::ModuloAssign
                | Self::PowerAssign
                | Self::AndAssign
                | Self::OrAssign
                | Self::ExclusiveOrAssign
                | Self::LeftShiftAssign
                | Self::RightShiftAssign
                | Self::PreIncrementAssign
                | Self::PreDecrementAssign
                | Self::PostIncrementAssign
                | Self::PostDecrementAssign
        )
    }
}

/// Declares an operator enum whose variants are a subset of [`NodeKind`].
macro_rules! operator_subset {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The node tag this operator produces.
            pub fn kind(self) -> NodeKind {
                match self {
                    $(Self::$variant => NodeKind::$variant),+
                }
            }
        }

        impl From<$name> for NodeKind {
            fn from(op: $name) -> Self {
                op.kind()
            }
        }
    };
}

operator_subset! {
    /// Operators of two-operand nodes.
    BinaryOp {
        Add,
        AddChecked,
        Subtract,
        SubtractChecked,
        Multiply,
        MultiplyChecked,
        Divide,
        Modulo,
        Power,
        And,
        Or,
        ExclusiveOr,
        AndAlso,
        OrElse,
        LeftShift,
        RightShift,
        Equal,
        NotEqual,
        LessThan,
        LessThanOrEqual,
        GreaterThan,
        GreaterThanOrEqual,
        Coalesce,
        ArrayIndex,
        Assign,
        AddAssign,
        AddAssignChecked,
        SubtractAssign,
        SubtractAssignChecked,
        MultiplyAssign,
        MultiplyAssignChecked,
        DivideAssign,
        ModuloAssign,
        PowerAssign,
        AndAssign,
        OrAssign,
        ExclusiveOrAssign,
        LeftShiftAssign,
        RightShiftAssign,
    }
}

operator_subset! {
    /// Operators of one-operand nodes.
    UnaryOp {
        Negate,
        NegateChecked,
        UnaryPlus,
        Not,
        OnesComplement,
        IsTrue,
        IsFalse,
        Convert,
        ConvertChecked,
        TypeAs,
        ArrayLength,
        Quote,
        Throw,
        Unbox,
        Increment,
        Decrement,
        PreIncrementAssign,
        PreDecrementAssign,
        PostIncrementAssign,
        PostDecrementAssign,
    }
}

impl BinaryOp {
    /// Whether the node produces `bool` regardless of operand types.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }
}

/// The two forms of type test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTest {
    /// Assignment compatibility (`x is T`).
    Is,
    /// Exact runtime type match.
    Equal,
}

impl TypeTest {
    pub fn kind(self) -> NodeKind {
        match self {
            Self::Is => NodeKind::TypeIs,
            Self::Equal => NodeKind::TypeEqual,
        }
    }
}

/// Flavour of a jump. Only `Return` changes rendering; the others resolve
/// against the enclosing loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GotoKind {
    Goto,
    Return,
    Break,
    Continue,
}
