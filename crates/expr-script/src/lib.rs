//! Translate typed expression trees into readable C# source.
//!
//! `expr-script` takes an in-memory expression tree (the [`ir`] module) and
//! writes it out as C# text that a compiler can build again. In debug mode it
//! also records where every statement landed in the text and returns a copy
//! of the tree with a sequence point in front of each statement, so a
//! debugger stepping through the compiled tree lands on the generated lines.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────── translate ────────────────┐
//!   Expr (ir) ───> │ Translator ─ CodeWriter ─ TypeNames       │ ──> Translation
//!   Definitions    │            ─ NameAllocator ─ Hoister      │      script
//!                  │            ─ DebugRecorder (optional)     │      rewritten tree
//!                  └───────────────────────────────────────────┘      fields, markers
//!                                                                       │
//!                              compile_with_fallback ── CompilerBackend ┘
//!                                                   └── DirectExecutor (on failure)
//! ```
//!
//! # Example
//!
//! ```
//! use expr_script::{Definitions, Expr, Lambda, Parameter, Type, translate};
//!
//! let x = Parameter::new(Type::Int, "x");
//! let lambda = Lambda::new(vec![x.clone()], Expr::add(Expr::Parameter(x), Expr::constant(1)));
//! let translation = translate(&Expr::Lambda(lambda), &Definitions::new()).unwrap();
//! assert_eq!(translation.script, "public int Main(int x)\n{\n    return x + 1;\n}");
//! ```
//!
//! # Definitions
//!
//! Without a type name the output is a bare method (or expression). With one,
//! it is a whole compilation unit: `using` directives, aliases for clashing
//! short names, an optional namespace, the class, hoisted fields and the
//! methods. Definitions can be built in code or loaded from TOML or JSON.

pub mod compile;
pub mod debug;
pub mod definitions;
pub mod error;
pub mod hoist;
pub mod ir;
pub mod names;
pub mod precedence;
pub mod traits;
pub mod translator;
pub mod type_names;
pub mod writer;

// Re-exports: IR types
pub use ir::{BinaryOp, Binder, Expr, Lambda, NodeKind, Parameter, Type, UnaryOp, Value};

// Re-exports: translation
pub use debug::DebugMarker;
pub use definitions::Definitions;
pub use error::TranslateError;
pub use hoist::{HoistedField, HoistedValue};
pub use translator::{ToScript, Translation, translate};
pub use writer::TextPosition;

// Re-exports: compilation
pub use compile::{CompileError, CompileOptions, CompileRequest, compile_with_fallback};
pub use traits::{BackendError, CompilerBackend, DirectExecutor};
