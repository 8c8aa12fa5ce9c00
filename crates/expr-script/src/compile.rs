//! Compile-from-text workflow.
//!
//! ```text
//!   Lambda ─ translate ─> script ─ CompilerBackend::compile ─> artifact
//!                            │                                   │
//!                            └─ hoisted fields ── bind_field ────┘
//!
//!   any failure ─> DirectExecutor::compile_direct(lambda)
//! ```

use std::collections::BTreeSet;

use crate::definitions::Definitions;
use crate::error::TranslateError;
use crate::ir::{CORE_LIBRARY, Expr, Lambda};
use crate::traits::{BackendError, CompilerBackend, DirectExecutor};
use crate::translator::{Translation, translate};

/// Class name used when the definitions do not name one.
pub const DEFAULT_TYPE_NAME: &str = "Program";

/// Assemblies every generated script is compiled against.
pub const RUNTIME_REFERENCES: &[&str] = &[CORE_LIBRARY, "System.Runtime", "System.Collections"];

/// Extra reference needed when the script uses `dynamic`.
pub const DYNAMIC_REFERENCE: &str = "Microsoft.CSharp";

/// Everything a backend needs to compile one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub script: String,
    /// Document name of the script, as recorded in debug information.
    pub file_name: String,
    pub references: BTreeSet<String>,
    /// `Namespace.TypeName` of the generated class.
    pub type_name: String,
    pub method_name: String,
    pub is_static: bool,
}

impl CompileRequest {
    pub fn new(
        translation: &Translation,
        definitions: &Definitions,
        extra_references: &[String],
    ) -> Self {
        let type_name = definitions
            .qualified_type_name()
            .unwrap_or_else(|| DEFAULT_TYPE_NAME.to_string());
        let file_name = definitions
            .debug_document
            .clone()
            .unwrap_or_else(|| format!("{type_name}.cs"));

        let mut references = translation.assemblies.clone();
        references.extend(extra_references.iter().cloned());
        references.extend(RUNTIME_REFERENCES.iter().map(|r| r.to_string()));
        if translation.has_dynamic {
            references.insert(DYNAMIC_REFERENCE.to_string());
        }

        Self {
            script: translation.script.clone(),
            file_name,
            references,
            type_name,
            method_name: definitions.method_name().to_string(),
            is_static: definitions.is_static,
        }
    }
}

/// Options for [`compile_with_fallback`].
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Wrapper settings. Defaults to a static class named [`DEFAULT_TYPE_NAME`].
    pub definitions: Option<Definitions>,
    /// Assemblies to reference in addition to the ones the script mentions.
    pub references: Vec<String>,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(mut self, definitions: Definitions) -> Self {
        self.definitions = Some(definitions);
        self
    }

    pub fn with_reference(mut self, assembly: impl Into<String>) -> Self {
        self.references.push(assembly.into());
        self
    }

    /// The definitions actually used: static by default, and always wrapped
    /// in a class.
    pub fn effective_definitions(&self) -> Definitions {
        let mut definitions = self
            .definitions
            .clone()
            .unwrap_or_else(|| Definitions::new().with_static(true));
        if definitions.type_name.is_none() {
            definitions.type_name = Some(DEFAULT_TYPE_NAME.to_string());
        }
        definitions
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Translate(#[from] TranslateError),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Translates `lambda`, compiles the script and binds every hoisted field.
pub fn compile<B: CompilerBackend>(
    lambda: &Lambda,
    options: &CompileOptions,
    backend: &B,
) -> Result<B::Artifact, CompileError> {
    let definitions = options.effective_definitions();
    let translation = translate(&Expr::Lambda(lambda.clone()), &definitions)?;
    let request = CompileRequest::new(&translation, &definitions, &options.references);
    tracing::debug!(
        type_name = %request.type_name,
        file = %request.file_name,
        references = request.references.len(),
        "compiling generated script"
    );
    let mut artifact = backend.compile(&request)?;
    for field in &translation.fields {
        backend.bind_field(&mut artifact, &field.name, &field.value)?;
    }
    Ok(artifact)
}

/// [`compile`], falling back to `direct` on any failure.
pub fn compile_with_fallback<B, D>(
    lambda: &Lambda,
    options: &CompileOptions,
    backend: &B,
    direct: &D,
) -> B::Artifact
where
    B: CompilerBackend,
    D: DirectExecutor<Artifact = B::Artifact>,
{
    match compile(lambda, options, backend) {
        Ok(artifact) => artifact,
        Err(error) => {
            tracing::warn!(%error, "compiling generated script failed, using direct execution");
            direct.compile_direct(lambda)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::hoist::HoistedValue;
    use crate::ir::{Binder, HostObject, Parameter, Type, Value};

    #[derive(Debug, PartialEq)]
    enum Artifact {
        Compiled {
            type_name: String,
            bound: Vec<String>,
        },
        Direct(usize),
    }

    #[derive(Default)]
    struct MockBackend {
        fail_with: Option<String>,
        requests: RefCell<Vec<CompileRequest>>,
    }

    impl CompilerBackend for MockBackend {
        type Artifact = Artifact;

        fn compile(&self, request: &CompileRequest) -> Result<Artifact, BackendError> {
            self.requests.borrow_mut().push(request.clone());
            match &self.fail_with {
                Some(message) => Err(BackendError::Compile(message.clone())),
                None => Ok(Artifact::Compiled {
                    type_name: request.type_name.clone(),
                    bound: Vec::new(),
                }),
            }
        }

        fn bind_field(
            &self,
            artifact: &mut Artifact,
            name: &str,
            value: &HoistedValue,
        ) -> Result<(), BackendError> {
            let Artifact::Compiled { bound, .. } = artifact else {
                return Err(BackendError::MissingType("direct".into()));
            };
            if !matches!(value, HoistedValue::Object(_)) {
                return Err(BackendError::Bind {
                    name: name.to_string(),
                    reason: "only objects are supported".into(),
                });
            }
            bound.push(name.to_string());
            Ok(())
        }
    }

    struct Interpreter;

    impl DirectExecutor for Interpreter {
        type Artifact = Artifact;

        fn compile_direct(&self, lambda: &Lambda) -> Artifact {
            Artifact::Direct(lambda.parameters().len())
        }
    }

    fn add_one() -> Lambda {
        let x = Parameter::new(Type::Int, "x");
        Lambda::new(
            vec![x.clone()],
            Expr::add(Expr::Parameter(x), Expr::constant(1)),
        )
    }

    #[test]
    fn defaults_to_a_static_program_class() {
        let backend = MockBackend::default();
        let artifact = compile(&add_one(), &CompileOptions::new(), &backend).unwrap();
        assert_eq!(
            artifact,
            Artifact::Compiled {
                type_name: "Program".into(),
                bound: Vec::new(),
            }
        );
        let requests = backend.requests.borrow();
        let request = &requests[0];
        assert!(request.is_static);
        assert_eq!(request.method_name, "Main");
        assert_eq!(request.file_name, "Program.cs");
        assert!(request.script.starts_with("public static class Program"));
        assert!(request.references.contains(CORE_LIBRARY));
        assert!(request.references.contains("System.Collections"));
        assert!(!request.references.contains(DYNAMIC_REFERENCE));
    }

    #[test]
    fn explicit_definitions_keep_their_settings() {
        let backend = MockBackend::default();
        let options = CompileOptions::new()
            .with_definitions(
                Definitions::new()
                    .with_namespace("Generated")
                    .with_method_name("Run")
                    .with_debug_document("run.cs"),
            )
            .with_reference("App.Models");
        compile(&add_one(), &options, &backend).unwrap();
        let requests = backend.requests.borrow();
        let request = &requests[0];
        assert!(!request.is_static);
        assert_eq!(request.type_name, "Generated.Program");
        assert_eq!(request.method_name, "Run");
        assert_eq!(request.file_name, "run.cs");
        assert!(request.references.contains("App.Models"));
    }

    #[test]
    fn hoisted_fields_are_bound() {
        let settings = HostObject::new(Type::named("App", "Settings"), ());
        let lambda = Lambda::new(Vec::new(), Expr::constant(Value::Object(settings)));
        let backend = MockBackend::default();
        let artifact = compile(&lambda, &CompileOptions::new(), &backend).unwrap();
        assert_eq!(
            artifact,
            Artifact::Compiled {
                type_name: "Program".into(),
                bound: vec!["Settings1".into()],
            }
        );
    }

    #[test]
    fn dynamic_scripts_reference_the_binder_assembly() {
        let d = Parameter::new(Type::Object, "d");
        let lambda = Lambda::new(
            vec![d.clone()],
            Expr::dynamic(
                Binder::GetMember { name: "Name".into() },
                vec![Expr::Parameter(d)],
                Type::Object,
            ),
        );
        let backend = MockBackend::default();
        compile(&lambda, &CompileOptions::new(), &backend).unwrap();
        assert!(backend.requests.borrow()[0].references.contains(DYNAMIC_REFERENCE));
    }

    #[test]
    fn backend_failure_falls_back_to_direct_execution() {
        let backend = MockBackend {
            fail_with: Some("CS1002: ; expected".into()),
            ..Default::default()
        };
        let artifact =
            compile_with_fallback(&add_one(), &CompileOptions::new(), &backend, &Interpreter);
        assert_eq!(artifact, Artifact::Direct(1));
        assert!(matches!(
            compile(&add_one(), &CompileOptions::new(), &backend),
            Err(CompileError::Backend(BackendError::Compile(_)))
        ));
    }

    #[test]
    fn translation_failure_falls_back_without_compiling() {
        let lambda = Lambda::new(Vec::new(), Expr::extension("Custom", Type::Int));
        let backend = MockBackend::default();
        let artifact =
            compile_with_fallback(&lambda, &CompileOptions::new(), &backend, &Interpreter);
        assert_eq!(artifact, Artifact::Direct(0));
        assert!(backend.requests.borrow().is_empty());
    }

    #[test]
    fn binding_failure_falls_back() {
        let secret = crate::ir::MethodInfo::new(Type::named("App", "Secrets"), "Compute", Type::Int)
            .non_public()
            .build();
        let lambda = Lambda::new(Vec::new(), Expr::call_static(secret, Vec::new()));
        let backend = MockBackend::default();
        let artifact =
            compile_with_fallback(&lambda, &CompileOptions::new(), &backend, &Interpreter);
        assert_eq!(artifact, Artifact::Direct(0));
    }
}
