mod cli;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use csspp_core::{Compiler, CompilerOptions, Error, Result};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("csspp: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env("CSSPP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let options = CompilerOptions::discover(cli.config.as_deref(), &cwd)?;
    let compiler = Compiler::new(options);

    match cli.command {
        Commands::Build {
            input,
            output,
            assets,
        } => {
            build(&compiler, &input, output.as_deref(), assets)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { input } => check(&compiler, &input),
    }
}

fn build(
    compiler: &Compiler,
    input: &Path,
    output: Option<&Path>,
    assets: Option<PathBuf>,
) -> Result<()> {
    let src = read_source(input)?;
    let compiled = compiler.compile(&src)?;

    for warning in &compiled.warnings {
        tracing::warn!("{}: {}", input.display(), warning);
    }

    match output {
        Some(path) => write_file(path, &compiled.css)?,
        None => print!("{}", compiled.css),
    }

    let assets_path = assets.unwrap_or_else(|| {
        let dir = output
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| compiler.options().out_dir.clone());
        dir.join(&compiler.options().asset_file_name)
    });
    write_file(&assets_path, &compiled.ir_json()?)?;
    tracing::info!(
        "compiled {} ({} rules, {} warnings), assets in {}",
        input.display(),
        compiled.metadata.rules,
        compiled.metadata.warnings,
        assets_path.display()
    );
    Ok(())
}

fn check(compiler: &Compiler, input: &Path) -> Result<ExitCode> {
    let src = read_source(input)?;
    let diagnostics = compiler.check(&src)?;

    for diagnostic in diagnostics.iter() {
        println!("{}: {}", input.display(), diagnostic);
    }
    println!(
        "{} error(s), {} warning(s)",
        diagnostics.error_count(),
        diagnostics.warning_count()
    );

    Ok(if diagnostics.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }
    fs::write(path, contents).map_err(|e| Error::io(path, e))
}
