//! PlanetCarver CLI - Command-line interface
//!
//! This binary provides a command-line interface to the PlanetCarver
//! library: it bootstraps the working directory with a planet dump and
//! splits it into similarly sized extracts.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::{run_generate_extracts, GenerateExtractsArgs};
use error::CliError;
use planetcarver::logging::{default_log_dir, default_log_file, init_logging};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

/// `<username>:<password>` credentials for the mapping service.
#[derive(Debug, Clone)]
pub struct MappingAuth {
    pub username: String,
    pub password: String,
}

impl FromStr for MappingAuth {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.split_once(':') {
            Some((username, password)) if !username.is_empty() && !password.contains(':') => {
                Ok(Self {
                    username: username.to_string(),
                    password: password.to_string(),
                })
            }
            _ => Err(format!("'{}' is not a <username>:<password> pair", raw)),
        }
    }
}

#[derive(Parser)]
#[command(name = "planetcarver")]
#[command(version = planetcarver::VERSION)]
#[command(about = "Split a planet-scale OSM extract into target-sized tiles", long_about = None)]
pub struct Cli {
    /// Working directory in which intermediate and temporary files are stored
    #[arg(short = 'w', long, default_value = "tmp")]
    pub working_dir: PathBuf,

    /// Directory that finished extracts are copied to
    #[arg(short = 'o', long, default_value = "out")]
    pub output_dir: PathBuf,

    /// Base URL under which a tileserver-mapping server is reachable
    #[arg(long)]
    pub mapping_url: Option<String>,

    /// <username>:<password> combination used to authenticate at the mapping server
    #[arg(long)]
    pub mapping_auth: Option<MappingAuth>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract similarly sized files from the latest OpenStreetMap planet dump
    GenerateExtracts(GenerateExtractsArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e).exit(),
    };

    for dir in [&cli.working_dir, &cli.output_dir] {
        if let Err(error) = std::fs::create_dir_all(dir) {
            CliError::Directory {
                path: dir.clone(),
                error,
            }
            .exit();
        }
    }

    match &cli.command {
        Command::GenerateExtracts(args) => match run_generate_extracts(&cli, args).await {
            Ok(summary) => {
                println!("{}", summary);
                // Failed or skipped branches mean the output set is
                // incomplete; signal it so wrappers can schedule a rerun.
                if summary.failed > 0 || summary.sink_failures > 0 || summary.abandoned > 0 {
                    process::exit(1);
                }
            }
            Err(e) => e.exit(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_auth_parses_user_pass() {
        let auth: MappingAuth = "alice:s3cret".parse().unwrap();
        assert_eq!(auth.username, "alice");
        assert_eq!(auth.password, "s3cret");
    }

    #[test]
    fn test_mapping_auth_rejects_malformed_input() {
        assert!("nopassword".parse::<MappingAuth>().is_err());
        assert!(":empty-user".parse::<MappingAuth>().is_err());
        assert!("too:many:colons".parse::<MappingAuth>().is_err());
    }

    #[test]
    fn test_cli_parses_generate_extracts() {
        let cli = Cli::parse_from([
            "planetcarver",
            "-w",
            "/tmp/work",
            "generate-extracts",
            "--target-size",
            "1000",
            "--max-zoom",
            "2",
            "--workers",
            "3",
        ]);
        assert_eq!(cli.working_dir, PathBuf::from("/tmp/work"));
        let Command::GenerateExtracts(args) = cli.command;
        assert_eq!(args.target_size, 1000);
        assert_eq!(args.max_zoom, 2);
        assert_eq!(args.workers, 3);
    }
}
