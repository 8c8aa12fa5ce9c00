//! Final program text: imports, aliases, namespace, class, fields, methods.

use super::{Layout, Pass, Translation, Translator};
use crate::error::Result;
use crate::ir::Expr;
use crate::writer::CodeWriter;

impl Translator<'_> {
    /// Wraps the written body and promoted methods, and records where each
    /// segment landed.
    pub(super) fn assemble(mut self, expression: Expr) -> Result<Pass> {
        // Every type must be registered before the imports are written.
        let mut bases = self.definitions.implements.clone();
        bases.sort_by_key(|ty| ty.is_interface());
        let bases: Vec<String> = bases.iter().map(|ty| self.types.translate(ty)).collect();
        let mut fields: Vec<(String, String)> = self
            .hoister
            .fields()
            .iter()
            .map(|field| (field.name.clone(), self.types.translate(&field.ty)))
            .collect();
        fields.sort();

        let definitions = self.definitions;
        let mut out = CodeWriter::document(0);
        let mut layout = Layout::default();
        let body = self.out.into_string();

        match definitions.type_name.as_deref() {
            Some(type_name) => {
                let namespaces = self.types.namespaces();
                for namespace in &namespaces {
                    out.write_line(&format!("using {namespace};"));
                }
                if !namespaces.is_empty() {
                    out.newline();
                }
                let aliases = self.types.aliases();
                for (alias, full_name) in &aliases {
                    out.write_line(&format!("using {alias} = {full_name};"));
                }
                if !aliases.is_empty() {
                    out.newline();
                }

                let namespace = definitions.namespace.as_deref().filter(|ns| !ns.is_empty());
                if let Some(namespace) = namespace {
                    out.write_line(&format!("namespace {namespace}"));
                    out.open_brace(false);
                }
                let modifier = if definitions.is_internal { "internal" } else { "public" };
                let keyword = if definitions.is_static { "static class" } else { "class" };
                out.write_line(&format!("{modifier} {keyword} {type_name}"));
                if !bases.is_empty() {
                    out.write(&format!(" : {}", bases.join(", ")));
                }
                out.open_brace(false);

                let field_modifier = if definitions.is_static { "public static" } else { "public" };
                for (name, ty) in &fields {
                    out.write_line(&format!("{field_modifier} {ty} {name};"));
                }
                if !fields.is_empty() {
                    // Raw, so the blank line carries no pending indentation.
                    out.append_raw("\n");
                }

                layout.main = out.position();
                out.append_raw(&body);
                append_promoted(&mut out, &mut layout, &self.promoted);

                out.close_brace();
                if namespace.is_some() {
                    out.close_brace();
                }
            }
            None => {
                out.append_raw(&body);
                append_promoted(&mut out, &mut layout, &self.promoted);
            }
        }

        let has_dynamic = self.types.has_dynamic();
        let translation = Translation {
            script: out.into_string(),
            expression,
            namespaces: self.types.namespaces(),
            assemblies: self.types.assemblies(),
            has_dynamic,
            markers: self.debug.map(|debug| debug.markers).unwrap_or_default(),
            fields: self.hoister.into_fields(),
        };
        Ok(Pass {
            translation,
            layout,
        })
    }
}

fn append_promoted(out: &mut CodeWriter, layout: &mut Layout, promoted: &[String]) {
    for text in promoted {
        layout.promoted.push(out.position());
        out.append_raw(text);
    }
}
