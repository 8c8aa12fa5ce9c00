//! Runtime type descriptors.
//!
//! Types compare structurally: two `Type::Named` values built separately from
//! the same description are the same type.

use std::rc::Rc;

/// Assembly that holds the primitive types.
pub const CORE_LIBRARY: &str = "System.Private.CoreLib";

/// Largest parameter count of the `Func`/`Action` delegate families.
pub const MAX_DELEGATE_PARAMETERS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Bool,
    Byte,
    SByte,
    Char,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Decimal,
    Object,
    String,
    Array { element: Box<Type>, rank: usize },
    Nullable(Box<Type>),
    ByRef(Box<Type>),
    Named(Rc<NamedType>),
}

/// What kind of declaration a named type is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeCategory {
    #[default]
    Class,
    Struct,
    Interface,
    Enum,
    Delegate,
}

/// A reflected, non-primitive type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamedType {
    pub namespace: Option<String>,
    /// Runtime name, including any arity suffix (`List`1`).
    pub name: String,
    pub generic_args: Vec<Type>,
    /// Open generic definition (`Dictionary<,>`).
    pub generic_definition: bool,
    pub declaring_type: Option<Type>,
    pub category: TypeCategory,
    pub is_public: bool,
    /// Instances resolve members at runtime (dynamic meta-object provider).
    pub is_dynamic: bool,
    /// Name of the default member, used by indexers (`Item`).
    pub default_member: Option<String>,
    pub assembly: Option<String>,
}

impl NamedType {
    pub fn new(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            name: name.into(),
            generic_args: Vec::new(),
            generic_definition: false,
            declaring_type: None,
            category: TypeCategory::Class,
            is_public: true,
            is_dynamic: false,
            default_member: None,
            assembly: None,
        }
    }

    pub fn generic(mut self, args: Vec<Type>) -> Self {
        self.generic_args = args;
        self
    }

    pub fn generic_definition(mut self) -> Self {
        self.generic_definition = true;
        self
    }

    pub fn nested_in(mut self, declaring: Type) -> Self {
        self.namespace = declaring.namespace().map(str::to_string);
        self.declaring_type = Some(declaring);
        self
    }

    pub fn category(mut self, category: TypeCategory) -> Self {
        self.category = category;
        self
    }

    pub fn interface(self) -> Self {
        self.category(TypeCategory::Interface)
    }

    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    pub fn dynamic(mut self) -> Self {
        self.is_dynamic = true;
        self
    }

    pub fn default_member(mut self, name: impl Into<String>) -> Self {
        self.default_member = Some(name.into());
        self
    }

    pub fn assembly(mut self, assembly: impl Into<String>) -> Self {
        self.assembly = Some(assembly.into());
        self
    }

    pub fn into_type(self) -> Type {
        Type::Named(Rc::new(self))
    }

    /// Name without the arity suffix.
    pub fn simple_name(&self) -> &str {
        match self.name.find('`') {
            Some(pos) => &self.name[..pos],
            None => &self.name,
        }
    }

    /// Number of generic parameters, from the arguments or the arity suffix.
    pub fn arity(&self) -> usize {
        if !self.generic_args.is_empty() {
            return self.generic_args.len();
        }
        self.name
            .rsplit_once('`')
            .and_then(|(_, n)| n.parse().ok())
            .unwrap_or(0)
    }

    pub fn is_generic(&self) -> bool {
        self.generic_definition || !self.generic_args.is_empty()
    }
}

impl From<NamedType> for Type {
    fn from(named: NamedType) -> Self {
        named.into_type()
    }
}

impl Type {
    pub fn named(namespace: &str, name: &str) -> Type {
        NamedType::new(Some(namespace).filter(|ns| !ns.is_empty()), name).into_type()
    }

    /// A public type from the `System` namespace in the core library.
    pub fn system(name: &str) -> Type {
        NamedType::new(Some("System"), name)
            .assembly(CORE_LIBRARY)
            .into_type()
    }

    pub fn array(element: Type) -> Type {
        Type::array_of_rank(element, 1)
    }

    pub fn array_of_rank(element: Type, rank: usize) -> Type {
        Type::Array {
            element: Box::new(element),
            rank: rank.max(1),
        }
    }

    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    pub fn by_ref(inner: Type) -> Type {
        Type::ByRef(Box::new(inner))
    }

    /// `Func<T1, …, TResult>`.
    pub fn func(parameters: Vec<Type>, result: Type) -> Type {
        let mut args = parameters;
        args.push(result);
        NamedType::new(Some("System"), format!("Func`{}", args.len()))
            .category(TypeCategory::Delegate)
            .assembly(CORE_LIBRARY)
            .generic(args)
            .into_type()
    }

    /// `Action` or `Action<T1, …>`.
    pub fn action(parameters: Vec<Type>) -> Type {
        if parameters.is_empty() {
            return NamedType::new(Some("System"), "Action")
                .category(TypeCategory::Delegate)
                .assembly(CORE_LIBRARY)
                .into_type();
        }
        NamedType::new(Some("System"), format!("Action`{}", parameters.len()))
            .category(TypeCategory::Delegate)
            .assembly(CORE_LIBRARY)
            .generic(parameters)
            .into_type()
    }

    /// `Func<…>` for value-producing signatures, `Action<…>` for void ones.
    pub fn delegate(parameters: Vec<Type>, result: Type) -> Type {
        if result.is_void() {
            Type::action(parameters)
        } else {
            Type::func(parameters, result)
        }
    }

    pub fn exception() -> Type {
        Type::system("Exception")
    }

    pub fn math() -> Type {
        Type::system("Math")
    }

    /// Field type of a hoisted runtime-variables node.
    pub fn runtime_variables() -> Type {
        NamedType::new(Some("System.Runtime.CompilerServices"), "IRuntimeVariables")
            .interface()
            .assembly(CORE_LIBRARY)
            .into_type()
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn is_integral(&self) -> bool {
        match self {
            Type::Byte
            | Type::SByte
            | Type::Short
            | Type::UShort
            | Type::Int
            | Type::UInt
            | Type::Long
            | Type::ULong
            | Type::Char => true,
            Type::Nullable(inner) => inner.is_integral(),
            Type::Named(named) => named.category == TypeCategory::Enum,
            _ => false,
        }
    }

    /// Value types that cannot hold `null`.
    pub fn is_non_nullable_value(&self) -> bool {
        match self {
            Type::Object | Type::String | Type::Array { .. } | Type::Void => false,
            Type::Nullable(_) => false,
            Type::ByRef(inner) => inner.is_non_nullable_value(),
            Type::Named(named) => {
                matches!(named.category, TypeCategory::Struct | TypeCategory::Enum)
            }
            _ => true,
        }
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Type::Named(named) if named.category == TypeCategory::Interface)
    }

    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }

    /// Element type of an array, or the referenced type of a by-ref.
    pub fn element_type(&self) -> Option<&Type> {
        match self {
            Type::Array { element, .. } | Type::ByRef(element) => Some(element),
            _ => None,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Type::Named(named) => named.namespace.as_deref(),
            Type::Array { element, .. } | Type::Nullable(element) | Type::ByRef(element) => {
                element.namespace()
            }
            _ => Some("System"),
        }
    }

    /// Assembly defining the type, if known.
    pub fn assembly(&self) -> Option<&str> {
        match self {
            Type::Named(named) => named.assembly.as_deref(),
            Type::Array { element, .. } | Type::Nullable(element) | Type::ByRef(element) => {
                element.assembly()
            }
            _ => Some(CORE_LIBRARY),
        }
    }

    /// Runtime name without namespace or arity suffix (`Int32`, `List`).
    pub fn runtime_name(&self) -> String {
        let name = match self {
            Type::Void => "Void",
            Type::Bool => "Boolean",
            Type::Byte => "Byte",
            Type::SByte => "SByte",
            Type::Char => "Char",
            Type::Short => "Int16",
            Type::UShort => "UInt16",
            Type::Int => "Int32",
            Type::UInt => "UInt32",
            Type::Long => "Int64",
            Type::ULong => "UInt64",
            Type::Float => "Single",
            Type::Double => "Double",
            Type::Decimal => "Decimal",
            Type::Object => "Object",
            Type::String => "String",
            Type::Array { element, .. } => return format!("{}Array", element.runtime_name()),
            Type::Nullable(_) => "Nullable",
            Type::ByRef(inner) => return inner.runtime_name(),
            Type::Named(named) => named.simple_name(),
        };
        name.to_string()
    }

    /// C# keyword for primitive types.
    pub fn keyword(&self) -> Option<&'static str> {
        Some(match self {
            Type::Void => "void",
            Type::Bool => "bool",
            Type::Byte => "byte",
            Type::SByte => "sbyte",
            Type::Char => "char",
            Type::Short => "short",
            Type::UShort => "ushort",
            Type::Int => "int",
            Type::UInt => "uint",
            Type::Long => "long",
            Type::ULong => "ulong",
            Type::Float => "float",
            Type::Double => "double",
            Type::Decimal => "decimal",
            Type::Object => "object",
            Type::String => "string",
            _ => return None,
        })
    }

    /// Fully qualified C# spelling, valid on the right of a `using` alias.
    pub fn full_name(&self) -> String {
        match self {
            Type::Array { element, rank } => {
                format!("{}[{}]", element.full_name(), ",".repeat(rank - 1))
            }
            Type::Nullable(inner) => format!("{}?", inner.full_name()),
            Type::ByRef(inner) => inner.full_name(),
            Type::Named(named) => {
                let mut name = match (&named.declaring_type, &named.namespace) {
                    (Some(declaring), _) => format!("{}.", declaring.full_name()),
                    (None, Some(ns)) if !ns.is_empty() => format!("{ns}."),
                    _ => String::new(),
                };
                name.push_str(named.simple_name());
                if named.generic_definition {
                    name.push('<');
                    name.push_str(&",".repeat(named.arity().saturating_sub(1)));
                    name.push('>');
                } else if !named.generic_args.is_empty() {
                    let args: Vec<String> =
                        named.generic_args.iter().map(Type::full_name).collect();
                    name.push('<');
                    name.push_str(&args.join(", "));
                    name.push('>');
                }
                name
            }
            primitive => primitive.keyword().unwrap_or_default().to_string(),
        }
    }
}
