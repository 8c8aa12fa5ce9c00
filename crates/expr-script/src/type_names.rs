//! Type spelling and import bookkeeping.
//!
//! [`TypeNames::translate`] renders a [`Type`] the way the generated source
//! refers to it. Named types are registered on first use: the first type to
//! claim a simple name is written bare and its namespace is imported; later
//! types with the same simple name get a numbered alias
//! (`using Node2 = Other.Node;`).

use std::collections::{BTreeSet, HashMap};

use crate::ir::{NamedType, Type};

#[derive(Debug)]
struct Entry {
    /// Spelling before collision handling.
    base: String,
    /// Spelling used in the output.
    name: String,
    ty: Type,
}

#[derive(Debug, Default)]
pub struct TypeNames {
    entries: Vec<Entry>,
    index: HashMap<Type, usize>,
    namespaces: BTreeSet<String>,
    has_dynamic: bool,
}

impl TypeNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(&mut self, ty: &Type) -> String {
        if let Some(keyword) = ty.keyword() {
            return keyword.to_string();
        }
        match ty {
            Type::Array { element, rank } => {
                format!("{}[{}]", self.translate(element), ",".repeat(rank.saturating_sub(1)))
            }
            Type::Nullable(inner) => format!("{}?", self.translate(inner)),
            Type::ByRef(inner) => self.translate(inner),
            Type::Named(named) => self.translate_named(ty, named),
            _ => String::new(),
        }
    }

    fn translate_named(&mut self, ty: &Type, named: &NamedType) -> String {
        if !named.is_public || named.is_dynamic {
            self.has_dynamic = true;
            return "dynamic".to_string();
        }
        if let Some(&index) = self.index.get(ty) {
            return self.entries[index].name.clone();
        }
        let base = self.base_name(named);
        let collisions = self.entries.iter().filter(|e| e.base == base).count();
        let name = if collisions > 0 {
            format!("{}{}", named.simple_name(), collisions + 1)
        } else {
            if let Some(namespace) = named.namespace.as_deref().filter(|ns| !ns.is_empty()) {
                self.namespaces.insert(namespace.to_string());
            }
            base.clone()
        };
        tracing::trace!(ty = %ty.full_name(), name = %name, "registered type name");
        self.index.insert(ty.clone(), self.entries.len());
        self.entries.push(Entry {
            base,
            name: name.clone(),
            ty: ty.clone(),
        });
        name
    }

    /// Spelling relative to the imported namespace: declaring types dotted,
    /// arity stripped, generic arguments translated.
    fn base_name(&mut self, named: &NamedType) -> String {
        let mut name = match &named.declaring_type {
            Some(declaring) => format!("{}.", self.translate(declaring)),
            None => String::new(),
        };
        name.push_str(named.simple_name());
        if named.generic_definition {
            name.push('<');
            name.push_str(&",".repeat(named.arity().saturating_sub(1)));
            name.push('>');
        } else if !named.generic_args.is_empty() {
            let args: Vec<String> = named
                .generic_args
                .iter()
                .map(|arg| self.translate(arg))
                .collect();
            name.push('<');
            name.push_str(&args.join(", "));
            name.push('>');
        }
        name
    }

    /// Whether any translated type had to be written as `dynamic`.
    pub fn has_dynamic(&self) -> bool {
        self.has_dynamic
    }

    pub(crate) fn mark_dynamic(&mut self) {
        self.has_dynamic = true;
    }

    /// Imported namespaces, `System` and `System.*` first, then ordinal.
    pub fn namespaces(&self) -> Vec<String> {
        let mut namespaces: Vec<String> = self.namespaces.iter().cloned().collect();
        namespaces.sort_by_key(|ns| (!is_system_namespace(ns), ns.clone()));
        namespaces
    }

    /// `(alias, full name)` for every type renamed because of a collision.
    pub fn aliases(&self) -> Vec<(String, String)> {
        let mut aliases: Vec<(String, String)> = self
            .entries
            .iter()
            .filter(|e| e.name != e.base)
            .map(|e| (e.name.clone(), e.ty.full_name()))
            .collect();
        aliases.sort_by(|a, b| {
            (!is_system_namespace(&a.1), &a.0).cmp(&(!is_system_namespace(&b.1), &b.0))
        });
        aliases
    }

    /// Assemblies defining the registered types.
    pub fn assemblies(&self) -> BTreeSet<String> {
        let mut assemblies = BTreeSet::new();
        for entry in &self.entries {
            collect_assemblies(&entry.ty, &mut assemblies);
        }
        assemblies
    }
}

fn is_system_namespace(name: &str) -> bool {
    name == "System" || name.starts_with("System.")
}

fn collect_assemblies(ty: &Type, out: &mut BTreeSet<String>) {
    if let Some(assembly) = ty.assembly() {
        out.insert(assembly.to_string());
    }
    if let Some(named) = ty.as_named() {
        for arg in &named.generic_args {
            collect_assemblies(arg, out);
        }
        if let Some(declaring) = &named.declaring_type {
            collect_assemblies(declaring, out);
        }
    }
}
