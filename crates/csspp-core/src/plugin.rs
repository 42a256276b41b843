//! Build-tool integration.
//!
//! The host bundler drives three hooks: [`CssppPlugin::transform`] once per
//! module, [`CssppPlugin::handle_hot_update`] when a watched file changes
//! and [`CssppPlugin::write_bundle`] once the build is done. `transform` may
//! be called from many threads at once; the only shared state is the
//! per-module asset table below, guarded by a single mutex.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::{Condvar, Mutex};

use crate::assets::AssetMap;
use crate::compiler::{CompileOutput, Compiler};
use crate::config::CompilerOptions;
use crate::error::{Error, Result};
use crate::ir::{AssetIr, Metadata};

const PLUGIN_NAME: &str = "csspp";

/// The dev server side of hot reload.
pub trait DevServer {
    /// Ask every connected client to reload the page.
    fn full_reload(&self, file: &Path);
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransformResult {
    /// A JS module whose default export is the compiled CSS text.
    pub code: String,
    /// Source maps are not produced.
    pub map: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct BundleOptions {
    /// Output directory chosen by the bundler.
    pub dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildPhase {
    Idle,
    Transforming,
    Bundling,
}

#[derive(Debug)]
struct ModuleAssets {
    assets: AssetMap,
    metadata: Metadata,
    /// Completion order, used for last-write-wins merging.
    seq: u64,
}

#[derive(Debug)]
struct PluginState {
    phase: BuildPhase,
    in_flight: usize,
    modules: HashMap<String, ModuleAssets>,
    generations: HashMap<String, u64>,
    next_seq: u64,
}

impl Default for PluginState {
    fn default() -> Self {
        Self {
            phase: BuildPhase::Idle,
            in_flight: 0,
            modules: HashMap::new(),
            generations: HashMap::new(),
            next_seq: 0,
        }
    }
}

/// A transform that has started compiling.
struct Ticket {
    key: String,
    generation: u64,
}

pub struct CssppPlugin {
    compiler: Compiler,
    state: Mutex<PluginState>,
    idle: Condvar,
}

impl Default for CssppPlugin {
    fn default() -> Self {
        Self::new(CompilerOptions::default())
    }
}

impl CssppPlugin {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            compiler: Compiler::new(options),
            state: Mutex::new(PluginState::default()),
            idle: Condvar::new(),
        }
    }

    pub fn options(&self) -> &CompilerOptions {
        self.compiler.options()
    }

    pub fn phase(&self) -> BuildPhase {
        self.state.lock().phase
    }

    pub fn retained_modules(&self) -> usize {
        self.state.lock().modules.len()
    }

    /// Compiles one module. Returns `Ok(None)` for files this plugin does
    /// not own, and for results made stale by a hot update that arrived
    /// while compiling.
    pub fn transform(&self, code: &str, id: &str) -> Result<Option<TransformResult>> {
        if !self.options().matches(id) {
            return Ok(None);
        }

        let ticket = self.begin(id);
        let result = self.compiler.compile(code);
        let output = match result {
            Ok(output) => output,
            Err(err) => {
                self.abandon();
                return Err(err);
            }
        };

        for warning in &output.warnings {
            tracing::warn!("[{}] {}: {}", PLUGIN_NAME, id, warning);
        }

        if !self.finish(ticket, &output) {
            tracing::debug!("discarding stale compilation of {}", id);
            return Ok(None);
        }

        Ok(Some(TransformResult {
            code: format!("export default {};", serde_json::to_string(&output.css)?),
            map: None,
        }))
    }

    fn begin(&self, id: &str) -> Ticket {
        let key = module_key(id);
        let mut state = self.state.lock();
        state.phase = BuildPhase::Transforming;
        state.in_flight += 1;
        let generation = state.generations.get(&key).copied().unwrap_or(0);
        Ticket { key, generation }
    }

    fn abandon(&self) {
        let mut state = self.state.lock();
        self.release(&mut state);
    }

    /// Retains the module's assets unless the ticket went stale.
    fn finish(&self, ticket: Ticket, output: &CompileOutput) -> bool {
        let mut state = self.state.lock();
        self.release(&mut state);

        let current = state.generations.get(&ticket.key).copied().unwrap_or(0);
        if current != ticket.generation {
            return false;
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        state.modules.insert(
            ticket.key,
            ModuleAssets {
                assets: output.assets.clone(),
                metadata: output.metadata,
                seq,
            },
        );
        true
    }

    fn release(&self, state: &mut PluginState) {
        state.in_flight -= 1;
        if state.in_flight == 0 {
            self.idle.notify_all();
        }
    }

    /// Invalidates every retained asset map and forces a full page reload
    /// when `file` is a CSS++ source. Any compilation of `file` still in
    /// flight is discarded when it completes.
    pub fn handle_hot_update(&self, file: &Path, server: &dyn DevServer) -> bool {
        let id = file.to_string_lossy();
        if !self.options().matches(&id) {
            return false;
        }

        {
            let mut state = self.state.lock();
            *state.generations.entry(module_key(&id)).or_default() += 1;
            state.modules.clear();
        }

        tracing::info!("[{}] {} changed, full reload", PLUGIN_NAME, file.display());
        server.full_reload(file);
        true
    }

    /// Merges every retained asset map, last write wins per selector.
    pub fn merged_assets(&self) -> (AssetMap, Metadata) {
        let state = self.state.lock();
        merge_modules(&state)
    }

    /// Writes the aggregate asset IR once every pending transform has
    /// finished. Does nothing when no CSS++ module was transformed.
    ///
    /// `bundle` lists the files the host emitted; it is only logged.
    pub fn write_bundle(
        &self,
        options: &BundleOptions,
        bundle: &[String],
    ) -> Result<Option<PathBuf>> {
        let mut state = self.state.lock();
        while state.in_flight > 0 {
            self.idle.wait(&mut state);
        }

        if state.modules.is_empty() {
            state.phase = BuildPhase::Idle;
            return Ok(None);
        }

        state.phase = BuildPhase::Bundling;
        tracing::debug!(
            "aggregating {} module(s) into a bundle of {} file(s)",
            state.modules.len(),
            bundle.len()
        );
        let (assets, metadata) = merge_modules(&state);
        let result = self.write_ir(options, AssetIr::new(assets, metadata));
        state.phase = BuildPhase::Idle;

        let path = result?;
        tracing::info!("[{}] wrote {}", PLUGIN_NAME, path.display());
        Ok(Some(path))
    }

    fn write_ir(&self, options: &BundleOptions, ir: AssetIr) -> Result<PathBuf> {
        let dir = options
            .dir
            .clone()
            .unwrap_or_else(|| self.options().out_dir.clone());
        fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;

        let path = dir.join(&self.options().asset_file_name);
        fs::write(&path, ir.to_json()?).map_err(|e| Error::io(&path, e))?;
        Ok(path)
    }
}

fn merge_modules(state: &PluginState) -> (AssetMap, Metadata) {
    let mut modules: Vec<&ModuleAssets> = state.modules.values().collect();
    modules.sort_by_key(|m| m.seq);

    let mut assets = AssetMap::new();
    let mut metadata = Metadata::default();
    for module in modules {
        assets.merge(&module.assets);
        metadata.accumulate(&module.metadata);
    }
    (assets, metadata)
}

fn module_key(id: &str) -> String {
    id.split('?').next().unwrap_or(id).to_string()
}
