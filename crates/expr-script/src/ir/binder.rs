//! Late-bound operations carried by dynamic nodes.

use std::fmt;

use super::kind::NodeKind;
use super::types::Type;

/// The operation a dynamic node performs. Argument 0 is the receiver.
#[derive(Debug, Clone, PartialEq)]
pub enum Binder {
    Convert { ty: Type },
    GetMember { name: String },
    SetMember { name: String },
    DeleteMember { name: String },
    GetIndex,
    SetIndex,
    DeleteIndex,
    InvokeMember { name: String },
    Invoke,
    CreateInstance,
    UnaryOperation(NodeKind),
    BinaryOperation(NodeKind),
    /// A binder from another language runtime.
    Custom { name: String },
}

impl Binder {
    /// Minimum number of arguments the binder reads.
    pub fn min_arguments(&self) -> usize {
        match self {
            Binder::SetMember { .. }
            | Binder::BinaryOperation(_)
            | Binder::GetIndex
            | Binder::DeleteIndex => 2,
            Binder::SetIndex => 3,
            _ => 1,
        }
    }
}

impl fmt::Display for Binder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binder::Convert { ty } => write!(f, "Convert({})", ty.full_name()),
            Binder::GetMember { name } => write!(f, "GetMember({name})"),
            Binder::SetMember { name } => write!(f, "SetMember({name})"),
            Binder::DeleteMember { name } => write!(f, "DeleteMember({name})"),
            Binder::GetIndex => f.write_str("GetIndex"),
            Binder::SetIndex => f.write_str("SetIndex"),
            Binder::DeleteIndex => f.write_str("DeleteIndex"),
            Binder::InvokeMember { name } => write!(f, "InvokeMember({name})"),
            Binder::Invoke => f.write_str("Invoke"),
            Binder::CreateInstance => f.write_str("CreateInstance"),
            Binder::UnaryOperation(kind) => write!(f, "UnaryOperation({kind})"),
            Binder::BinaryOperation(kind) => write!(f, "BinaryOperation({kind})"),
            Binder::Custom { name } => f.write_str(name),
        }
    }
}
