use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "csspp")]
#[command(about = "CSS++ compiler: emits standard CSS plus a JSON asset IR")]
pub struct Cli {
    /// JSON config file (defaults to ./csspp.config.json when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log pipeline progress
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a .csspp file
    Build {
        input: PathBuf,
        /// CSS output path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Asset IR output path; next to the CSS output when omitted
        #[arg(long)]
        assets: Option<PathBuf>,
    },
    /// Validate a .csspp file without writing anything
    Check { input: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_build_arguments() {
        let cli = Cli::parse_from(["csspp", "-v", "build", "app.csspp", "-o", "dist/app.css"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Build { input, output, assets } => {
                assert_eq!(input, PathBuf::from("app.csspp"));
                assert_eq!(output, Some(PathBuf::from("dist/app.css")));
                assert_eq!(assets, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
