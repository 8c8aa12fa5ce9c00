//! Hoisting of values without a literal form.
//!
//! Objects, non-public methods and runtime-variable sets cannot be written
//! as source text. Each one becomes a field on the generated class; the
//! caller assigns the field after compiling (see [`crate::compile`]).

use std::collections::HashMap;

use crate::ir::{HostObject, Method, RuntimeVariables, Type};
use crate::names::{NameAllocator, identifier_prefix};

/// A runtime value stored in a generated field.
#[derive(Debug, Clone)]
pub enum HoistedValue {
    Object(HostObject),
    /// Delegate over a method the generated code cannot call directly.
    Method(Method),
    RuntimeVariables(RuntimeVariables),
}

impl HoistedValue {
    fn key(&self) -> HoistKey {
        match self {
            HoistedValue::Object(object) => HoistKey::Object(object.address()),
            HoistedValue::Method(method) => HoistKey::Method(method.address()),
            HoistedValue::RuntimeVariables(vars) => HoistKey::RuntimeVariables(vars.address()),
        }
    }
}

// Addresses stay valid because every hoisted field keeps its value alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum HoistKey {
    Object(usize),
    Method(usize),
    RuntimeVariables(usize),
}

#[derive(Debug, Clone)]
pub struct HoistedField {
    pub name: String,
    pub ty: Type,
    pub value: HoistedValue,
}

#[derive(Debug, Default)]
pub struct Hoister {
    fields: Vec<HoistedField>,
    by_identity: HashMap<HoistKey, usize>,
}

impl Hoister {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field holding `value`, created on first use. `hint` names the field
    /// (`Settings` → `Settings1`).
    pub fn field_for(
        &mut self,
        value: HoistedValue,
        ty: Type,
        hint: &str,
        names: &mut NameAllocator,
    ) -> String {
        let key = value.key();
        if let Some(&index) = self.by_identity.get(&key) {
            return self.fields[index].name.clone();
        }
        let name = names.fresh(&identifier_prefix(hint));
        tracing::trace!(field = %name, hint, "hoisting value");
        self.by_identity.insert(key, self.fields.len());
        self.fields.push(HoistedField {
            name: name.clone(),
            ty,
            value,
        });
        name
    }

    pub fn fields(&self) -> &[HoistedField] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<HoistedField> {
        self.fields
    }
}
