//! Translation settings.
//!
//! [`Definitions`] controls the wrapper the script is emitted in. All fields
//! are optional; without a type name the translator emits a bare snippet.
//!
//! Settings can be loaded from TOML or JSON:
//!
//! ```toml
//! namespace = "Generated"
//! type_name = "Mapper"
//! is_static = true
//! method_name = "Map"
//! debug_document = "Mapper.cs"
//! ```

use serde::{Deserialize, Serialize};

use crate::ir::Type;

/// Entry method name when none is configured.
pub const DEFAULT_METHOD_NAME: &str = "Main";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Definitions {
    pub namespace: Option<String>,
    /// Class wrapping the generated members. Absent in snippet mode.
    pub type_name: Option<String>,
    pub is_static: bool,
    pub is_internal: bool,
    pub method_name: Option<String>,
    /// Base class and interfaces of the generated class.
    #[serde(skip)]
    pub implements: Vec<Type>,
    /// File name recorded in debug-position markers. Enables debug mode.
    pub debug_document: Option<String>,
}

impl Definitions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_toml_str(source: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(source)
    }

    pub fn from_json_str(source: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(source)
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_internal(mut self, is_internal: bool) -> Self {
        self.is_internal = is_internal;
        self
    }

    pub fn with_method_name(mut self, method_name: impl Into<String>) -> Self {
        self.method_name = Some(method_name.into());
        self
    }

    pub fn implementing(mut self, ty: Type) -> Self {
        self.implements.push(ty);
        self
    }

    pub fn with_debug_document(mut self, document: impl Into<String>) -> Self {
        self.debug_document = Some(document.into());
        self
    }

    pub fn method_name(&self) -> &str {
        self.method_name.as_deref().unwrap_or(DEFAULT_METHOD_NAME)
    }

    /// `Namespace.TypeName`, or just the type name.
    pub fn qualified_type_name(&self) -> Option<String> {
        let type_name = self.type_name.as_deref()?;
        Some(match self.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            Some(namespace) => format!("{namespace}.{type_name}"),
            None => type_name.to_string(),
        })
    }

    /// Indentation of members: inside the namespace and the class.
    pub(crate) fn member_indent(&self) -> usize {
        if self.type_name.is_none() {
            return 0;
        }
        if self.namespace.as_deref().is_some_and(|ns| !ns.is_empty()) {
            2
        } else {
            1
        }
    }
}
