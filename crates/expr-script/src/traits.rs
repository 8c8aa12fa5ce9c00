//! Traits for the collaborators that turn a translation into something
//! runnable.

use crate::compile::CompileRequest;
use crate::hoist::HoistedValue;
use crate::ir::Lambda;

/// Error reported by a compiler backend.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("compilation failed: {0}")]
    Compile(String),

    #[error("type {0} not found in the compiled artifact")]
    MissingType(String),

    #[error("method {0} not found in the compiled artifact")]
    MissingMethod(String),

    #[error("cannot bind field {name}: {reason}")]
    Bind { name: String, reason: String },
}

/// A compiler that builds an artifact from generated source text.
pub trait CompilerBackend {
    /// The compiled entry point (a callable, a loaded type, …).
    type Artifact;

    /// Compiles the script and resolves the entry method.
    fn compile(&self, request: &CompileRequest) -> Result<Self::Artifact, BackendError>;

    /// Assigns a hoisted value to the generated field `name`. Called once per
    /// field before the artifact is handed out.
    fn bind_field(
        &self,
        artifact: &mut Self::Artifact,
        name: &str,
        value: &HoistedValue,
    ) -> Result<(), BackendError>;
}

/// Builds an artifact straight from the tree, without going through text.
pub trait DirectExecutor {
    type Artifact;

    fn compile_direct(&self, lambda: &Lambda) -> Self::Artifact;
}
