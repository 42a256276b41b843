pub mod assets;
pub mod ast;
pub mod compiler;
pub mod config;
pub mod diagnostic;
pub mod emitter;
pub mod error;
pub mod ir;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod plugin;
pub mod properties;
pub mod theme;
pub mod validator;

pub use assets::{AssetKind, AssetMap};
pub use compiler::{compile, CompileOutput, Compiler};
pub use config::CompilerOptions;
pub use diagnostic::{Diagnostic, Diagnostics, Severity};
pub use error::{Error, Result, Span};
pub use ir::{AssetIr, Metadata};
pub use plugin::{BuildPhase, BundleOptions, CssppPlugin, DevServer, TransformResult};
