//! CLI subcommand implementations.

mod generate;

pub use generate::{run_generate_extracts, GenerateExtractsArgs};
