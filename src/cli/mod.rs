//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::OutputFormat;
use crate::core::{Principle, Profile};

/// Testability - weighted testability scoring for web page observations.
#[derive(Parser)]
#[command(name = "testability")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format: text, json or markdown (defaults to the configured format)
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Score one observation file
    #[command(alias = "score")]
    Assess(AssessArgs),

    /// Score several subjects from one file, in parallel
    Batch(BatchArgs),

    /// Print the active rule table
    Rules(SelectionArgs),

    /// Print the default configuration file
    Init,
}

/// Principle selection and gating shared by every scoring command.
#[derive(Args, Clone, Default)]
pub struct SelectionArgs {
    /// Principle preset: full or core
    #[arg(long)]
    pub profile: Option<Profile>,

    /// Explicit principles (comma-separated), overrides --profile
    #[arg(long, value_delimiter = ',')]
    pub principles: Vec<Principle>,

    /// TOML rule table replacing the built-in one
    #[arg(long)]
    pub rules: Option<PathBuf>,
}

#[derive(Args)]
pub struct AssessArgs {
    /// JSON observation file ("-" for stdin)
    pub observations: PathBuf,

    /// Subject name shown in the report
    #[arg(short, long)]
    pub subject: Option<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub gate: GateArgs,
}

#[derive(Args)]
pub struct BatchArgs {
    /// JSON file mapping subject name to observations ("-" for stdin)
    pub subjects: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub gate: GateArgs,
}

#[derive(Args, Clone, Default)]
pub struct GateArgs {
    /// Fail when an overall score is below this value
    #[arg(long)]
    pub fail_under: Option<u32>,

    /// Include per-rule detail
    #[arg(long)]
    pub breakdown: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_assess_with_principles() {
        let cli = Cli::parse_from([
            "testability",
            "-f",
            "json",
            "assess",
            "page.json",
            "--principles",
            "observability,unbugginess",
            "--fail-under",
            "60",
        ]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        match cli.command {
            Command::Assess(args) => {
                assert_eq!(args.observations, PathBuf::from("page.json"));
                assert_eq!(
                    args.selection.principles,
                    vec![Principle::Observability, Principle::Unbugginess]
                );
                assert_eq!(args.gate.fail_under, Some(60));
            }
            _ => panic!("Expected Assess"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_principle() {
        assert!(Cli::try_parse_from(["testability", "assess", "p.json", "--principles", "speed"])
            .is_err());
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::parse_from(["testability", "batch", "users.json", "--format", "md"]);
        assert_eq!(cli.format, Some(OutputFormat::Markdown));
    }

    #[test]
    fn test_profile_parsed_through_from_str() {
        let cli = Cli::parse_from(["testability", "rules", "--profile", "reduced"]);
        match cli.command {
            Command::Rules(selection) => assert_eq!(selection.profile, Some(Profile::Core)),
            _ => panic!("Expected Rules"),
        }
        assert!(Cli::try_parse_from(["testability", "rules", "--profile", "half"]).is_err());
        assert!(Cli::try_parse_from(["testability", "-f", "html", "init"]).is_err());
    }
}
