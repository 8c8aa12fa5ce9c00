//! Identifier allocation.
//!
//! One [`NameAllocator`] lives for one translation run. It hands out
//! deterministic synthetic names (`p1`, `label2`, `func1`, …) from per-prefix
//! counters and remembers the name given to each identity-compared entity.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::ir::{LabelTarget, Lambda, Parameter};

/// Words that cannot be used as bare identifiers in the output.
pub const RESERVED_WORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "by", "byte", "case", "catch", "char",
    "checked", "class", "const", "continue", "decimal", "default", "delegate", "descending",
    "do", "double", "else", "enum", "event", "explicit", "extern", "false", "finally", "fixed",
    "float", "for", "foreach", "from", "goto", "group", "if", "implicit", "in", "int",
    "interface", "internal", "into", "is", "lock", "long", "namespace", "new", "null",
    "object", "operator", "orderby", "out", "override", "params", "private", "protected",
    "public", "readonly", "ref", "return", "sbyte", "sealed", "select", "short", "sizeof",
    "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true", "try",
    "typeof", "uint", "ulong", "unchecked", "unit", "unsafe", "ushort", "using", "var",
    "virtual", "void", "volatile", "where", "while", "yield",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

/// Prefixes reserved words with `@`.
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if is_reserved(name) {
        Cow::Owned(format!("@{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Turns a type or method name into a field-name prefix: drops the arity
/// suffix and anything that is not an identifier character.
pub fn identifier_prefix(name: &str) -> String {
    let name = name.split('`').next().unwrap_or(name);
    let prefix: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    if prefix.is_empty() || prefix.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{prefix}")
    } else {
        prefix
    }
}

#[derive(Debug, Default)]
pub struct NameAllocator {
    counters: HashMap<String, usize>,
    parameters: HashMap<Parameter, String>,
    labels: HashMap<LabelTarget, String>,
    lambdas: HashMap<Lambda, String>,
}

impl NameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for `prefix`: `prefix1`, `prefix2`, …
    pub fn fresh(&mut self, prefix: &str) -> String {
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        *counter += 1;
        format!("{prefix}{counter}")
    }

    pub fn parameter(&mut self, parameter: &Parameter) -> String {
        if let Some(name) = self.parameters.get(parameter) {
            return name.clone();
        }
        let name = match parameter.name() {
            Some(name) => escape_identifier(name).into_owned(),
            None => self.fresh("p"),
        };
        self.parameters.insert(parameter.clone(), name.clone());
        name
    }

    pub fn label(&mut self, label: &LabelTarget) -> String {
        if let Some(name) = self.labels.get(label) {
            return name.clone();
        }
        let name = match label.name() {
            Some(name) => escape_identifier(name).into_owned(),
            None => self.fresh("label"),
        };
        self.labels.insert(label.clone(), name.clone());
        name
    }

    pub fn lambda(&mut self, lambda: &Lambda) -> String {
        if let Some(name) = self.lambdas.get(lambda) {
            return name.clone();
        }
        let name = match lambda.name() {
            Some(name) => escape_identifier(name).into_owned(),
            None => self.fresh("func"),
        };
        self.lambdas.insert(lambda.clone(), name.clone());
        name
    }
}
