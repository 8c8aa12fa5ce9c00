//! Reflected member descriptors.

use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::rc::Rc;

use super::types::Type;

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub ty: Type,
    pub is_out: bool,
}

impl ParameterInfo {
    pub fn is_by_ref(&self) -> bool {
        matches!(self.ty, Type::ByRef(_))
    }

    /// Argument modifier required at call sites.
    pub fn modifier(&self) -> &'static str {
        if self.is_out {
            "out "
        } else if self.is_by_ref() {
            "ref "
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub name: String,
    pub declaring_type: Type,
    pub return_type: Type,
    pub parameters: Vec<ParameterInfo>,
    pub generic_args: Vec<Type>,
    pub is_public: bool,
    pub is_static: bool,
    /// Compiler-generated accessor name (`get_Item`).
    pub is_special_name: bool,
    pub is_extension: bool,
}

impl MethodInfo {
    /// A public static method with no parameters.
    pub fn new(declaring_type: Type, name: impl Into<String>, return_type: Type) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            return_type,
            parameters: Vec::new(),
            generic_args: Vec::new(),
            is_public: true,
            is_static: true,
            is_special_name: false,
            is_extension: false,
        }
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.parameters.push(ParameterInfo {
            name: name.into(),
            ty,
            is_out: false,
        });
        self
    }

    pub fn out_param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.parameters.push(ParameterInfo {
            name: name.into(),
            ty: Type::by_ref(ty),
            is_out: true,
        });
        self
    }

    pub fn generic(mut self, args: Vec<Type>) -> Self {
        self.generic_args = args;
        self
    }

    pub fn instance(mut self) -> Self {
        self.is_static = false;
        self
    }

    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn special_name(mut self) -> Self {
        self.is_special_name = true;
        self
    }

    pub fn extension(mut self) -> Self {
        self.is_extension = true;
        self
    }

    pub fn build(self) -> Method {
        Method(Rc::new(self))
    }

    /// Whether this is the getter of the declaring type's default indexer.
    pub fn is_default_indexer_getter(&self) -> bool {
        if !self.is_special_name {
            return false;
        }
        let Some(property) = self.name.strip_prefix("get_") else {
            return false;
        };
        self.declaring_type
            .as_named()
            .and_then(|named| named.default_member.as_deref())
            == Some(property)
    }
}

/// A method handle, compared by identity.
#[derive(Debug, Clone)]
pub struct Method(Rc<MethodInfo>);

impl Method {
    pub(crate) fn address(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl Deref for Method {
    type Target = MethodInfo;

    fn deref(&self) -> &MethodInfo {
        &self.0
    }
}

impl PartialEq for Method {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Method {}

impl Hash for Method {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address().hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Field,
    Property,
}

/// A field or property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub declaring_type: Type,
    pub ty: Type,
    pub kind: MemberKind,
    pub is_static: bool,
}

impl Member {
    pub fn field(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            declaring_type,
            ty,
            kind: MemberKind::Field,
            is_static: false,
        }
    }

    pub fn property(declaring_type: Type, name: impl Into<String>, ty: Type) -> Self {
        Self {
            kind: MemberKind::Property,
            ..Self::field(declaring_type, name, ty)
        }
    }

    pub fn into_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Whether this property is the declaring type's default indexer.
    pub fn is_default_member(&self) -> bool {
        self.declaring_type
            .as_named()
            .and_then(|named| named.default_member.as_deref())
            == Some(self.name.as_str())
    }
}
