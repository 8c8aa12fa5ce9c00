//! Constant payloads.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::types::Type;

/// The value carried by a constant node.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    String(String),
    SByte(i8),
    Byte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    /// Decimal digits as written, e.g. `"12.50"`.
    Decimal(String),
    /// An enum value. `member` is absent when the raw value has no name.
    Enum {
        ty: Type,
        member: Option<String>,
        raw: i64,
    },
    /// A `Type` object (`typeof(T)`).
    Type(Type),
    /// Any runtime object without a literal form.
    Object(HostObject),
}

impl Value {
    /// Runtime type of the payload. `null` reports `object`.
    pub fn ty(&self) -> Type {
        match self {
            Value::Null => Type::Object,
            Value::Bool(_) => Type::Bool,
            Value::Char(_) => Type::Char,
            Value::String(_) => Type::String,
            Value::SByte(_) => Type::SByte,
            Value::Byte(_) => Type::Byte,
            Value::Short(_) => Type::Short,
            Value::UShort(_) => Type::UShort,
            Value::Int(_) => Type::Int,
            Value::UInt(_) => Type::UInt,
            Value::Long(_) => Type::Long,
            Value::ULong(_) => Type::ULong,
            Value::Float(_) => Type::Float,
            Value::Double(_) => Type::Double,
            Value::Decimal(_) => Type::Decimal,
            Value::Enum { ty, .. } => ty.clone(),
            Value::Type(_) => Type::system("Type"),
            Value::Object(object) => object.ty().clone(),
        }
    }

    /// Numeric payload below zero. Such constants render with a leading `-`
    /// and bind like a unary operator.
    pub fn is_negative(&self) -> bool {
        match self {
            Value::SByte(v) => *v < 0,
            Value::Short(v) => *v < 0,
            Value::Int(v) => *v < 0,
            Value::Long(v) => *v < 0,
            Value::Float(v) => v.is_sign_negative() && !v.is_nan(),
            Value::Double(v) => v.is_sign_negative() && !v.is_nan(),
            Value::Decimal(digits) => digits.starts_with('-'),
            _ => false,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })+
    };
}

value_from! {
    bool => Bool,
    char => Char,
    String => String,
    i8 => SByte,
    u8 => Byte,
    i16 => Short,
    u16 => UShort,
    i32 => Int,
    u32 => UInt,
    i64 => Long,
    u64 => ULong,
    f32 => Float,
    f64 => Double,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// An opaque runtime object, compared by identity.
#[derive(Clone)]
pub struct HostObject {
    ty: Type,
    data: Rc<dyn Any>,
}

impl HostObject {
    pub fn new<T: Any>(ty: Type, value: T) -> Self {
        Self {
            ty,
            data: Rc::new(value),
        }
    }

    pub fn from_rc(ty: Type, data: Rc<dyn Any>) -> Self {
        Self { ty, data }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.data.downcast_ref()
    }

    pub fn ptr_eq(&self, other: &HostObject) -> bool {
        self.address() == other.address()
    }

    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.data) as *const () as usize
    }
}

impl fmt::Debug for HostObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("ty", &self.ty)
            .field("address", &format_args!("{:#x}", self.address()))
            .finish()
    }
}
