//! The full pipeline: preprocess, extract, validate, lower, generate.

use crate::assets::AssetMap;
use crate::config::CompilerOptions;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::emitter::emit_css;
use crate::error::Result;
use crate::ir::{AssetIr, Metadata};
use crate::lower::Transformer;
use crate::parser;
use crate::validator::Validator;

#[derive(Clone, Debug)]
pub struct CompileOutput {
    pub css: String,
    pub assets: AssetMap,
    /// Non-fatal diagnostics, in source order.
    pub warnings: Vec<Diagnostic>,
    pub metadata: Metadata,
}

impl CompileOutput {
    pub fn ir(&self) -> AssetIr {
        AssetIr::new(self.assets.clone(), self.metadata)
    }

    pub fn ir_json(&self) -> Result<String> {
        self.ir().to_json()
    }
}

/// Holds options only. Each [`Compiler::compile`] call builds its own
/// validator, transformer and diagnostics, so one compiler can serve many
/// threads.
#[derive(Clone, Debug, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compiles one source file. Fails with every validation error at once
    /// if any declaration is invalid; no output is produced in that case.
    pub fn compile(&self, source: &str) -> Result<CompileOutput> {
        let (mut stylesheet, diagnostics) = self.analyze(source)?;
        let metadata = Metadata {
            rules: stylesheet.rules.len(),
            errors: diagnostics.error_count(),
            warnings: diagnostics.warning_count(),
        };
        let warnings = diagnostics.into_result()?;

        let assets = Transformer::new().transform(&mut stylesheet)?;
        let css = emit_css(&stylesheet, self.options.banner);
        tracing::debug!(
            "compiled {} rule(s), {} warning(s)",
            metadata.rules,
            metadata.warnings
        );

        Ok(CompileOutput {
            css,
            assets,
            warnings,
            metadata,
        })
    }

    /// Runs extraction and validation only, returning every diagnostic
    /// without failing on validation errors.
    pub fn check(&self, source: &str) -> Result<Diagnostics> {
        self.analyze(source).map(|(_, diagnostics)| diagnostics)
    }

    fn analyze(&self, source: &str) -> Result<(crate::ast::Stylesheet, Diagnostics)> {
        let parsed = parser::parse(source)?;
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend(parsed.warnings);
        diagnostics.extend(Validator::new().validate(&parsed.stylesheet));
        Ok((parsed.stylesheet, diagnostics))
    }
}

/// Compiles with default options.
pub fn compile(source: &str) -> Result<CompileOutput> {
    Compiler::default().compile(source)
}
