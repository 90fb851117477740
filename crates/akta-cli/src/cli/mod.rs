use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `akta` binary.
#[derive(Debug, Parser)]
#[command(
    name = "akta",
    version,
    about = "Akta - grounded answers on Malaysian employment law"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, text
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file layered above `.akta/config.toml`
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            config: self.config.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use akta_core::{Citizenship, RuleCategory};
    use chrono::NaiveDate;
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::root_commands::{RulesCommands, SchemaKind};
    use super::{Cli, Commands, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from(["akta", "--format", "json", "--verbose", "refresh"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Refresh(ref args) if args.source.is_none()));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["akta", "schema", "--quiet", "--config", "akta.toml"])
            .expect("cli should parse");

        assert!(cli.quiet);
        assert_eq!(cli.global_flags().config.unwrap().to_str(), Some("akta.toml"));
        assert!(matches!(cli.command, Commands::Schema(ref args) if args.kind == SchemaKind::All));
    }

    #[test]
    fn ask_takes_query_date_and_inputs() {
        let cli = Cli::try_parse_from([
            "akta",
            "ask",
            "How much EPF do I pay?",
            "--as-of",
            "2026-03-15",
            "--salary",
            "5000",
            "--citizenship",
            "permanent_resident",
            "--years",
            "3",
        ])
        .expect("cli should parse");

        let Commands::Ask(args) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.query, "How much EPF do I pay?");
        assert_eq!(args.as_of, NaiveDate::from_ymd_opt(2026, 3, 15));
        let inputs = args.inputs.to_inputs();
        assert_eq!(inputs.salary, Some(5000.0));
        assert_eq!(inputs.citizenship, Some(Citizenship::PermanentResident));
        assert_eq!(inputs.years_of_service, Some(3.0));
        assert!(inputs.age.is_none());
    }

    #[test]
    fn rules_compute_parses_category() {
        let cli = Cli::try_parse_from(["akta", "rules", "compute", "minimum-wage"])
            .expect("cli should parse");
        let Commands::Rules {
            action: RulesCommands::Compute(args),
        } = cli.command
        else {
            panic!("expected rules compute");
        };
        assert_eq!(args.category, RuleCategory::MinimumWage);
        assert!(args.inputs.to_inputs().is_empty());
    }

    #[test]
    fn budget_defaults_to_net_pay_in_kuala_lumpur() {
        let cli = Cli::try_parse_from(["akta", "budget", "--salary", "4000"]).expect("cli should parse");
        let Commands::Budget(args) = cli.command else {
            panic!("expected budget");
        };
        assert_eq!(args.city, "kuala_lumpur");
        assert!(!args.gross);

        let cli = Cli::try_parse_from(["akta", "budget", "--city", "penang", "--salary", "4000", "--gross"])
            .expect("cli should parse");
        assert!(matches!(cli.command, Commands::Budget(ref args) if args.gross && args.city == "penang"));
    }

    #[test]
    fn rules_compute_parses_new_entitlements() {
        let cli = Cli::try_parse_from(["akta", "rules", "compute", "maternity_leave"])
            .expect("cli should parse");
        assert!(matches!(
            cli.command,
            Commands::Rules { action: RulesCommands::Compute(ref args) }
                if args.category == RuleCategory::MaternityLeave
        ));
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Cli::try_parse_from(["akta", "--format", "xml", "refresh"]).is_err());
        assert!(Cli::try_parse_from(["akta", "rules", "compute", "pension"]).is_err());
        assert!(Cli::try_parse_from(["akta", "breakdown"]).is_err());
        assert!(Cli::try_parse_from(["akta", "budget", "--city", "penang"]).is_err());
    }
}
