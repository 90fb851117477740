use std::path::Path;

use akta_config::AktaConfig;
use akta_core::NumericInputs;
use akta_rules::{LivingCosts, RuleSet, RulesEngine};
use anyhow::Context;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::{BreakdownArgs, BudgetArgs, ComputeArgs, RulesCommands};
use crate::commands::as_of_or_today;
use crate::output::{RulesCheck, output};

/// Handle `akta rules`.
pub fn handle(action: &RulesCommands, config: &AktaConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        RulesCommands::Compute(args) => compute(args, config, flags),
        RulesCommands::Check => check(config, flags),
    }
}

fn compute(args: &ComputeArgs, config: &AktaConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = RulesEngine::from_config(&config.rules).context("failed to load rule table")?;
    let as_of = as_of_or_today(args.as_of);
    let fact = engine
        .compute(args.category, &args.inputs.to_inputs(), as_of)
        .with_context(|| format!("cannot compute {} as of {as_of}", args.category))?;
    output(&fact, flags.format)
}

/// Load the table without the integrity check and report every overlap.
fn check(config: &AktaConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let (table, rules) = if config.rules.is_configured() {
        let path = config.rules.table_path.trim();
        let rules = RuleSet::load_unchecked(Path::new(path))
            .with_context(|| format!("failed to read rule table {path}"))?;
        (path.to_string(), rules)
    } else {
        let rules = RuleSet::builtin().context("built-in rule table is invalid")?;
        ("built-in".to_string(), rules)
    };

    let report = RulesCheck {
        table,
        rules: rules.len(),
        violations: rules
            .check_integrity()
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    output(&report, flags.format)?;
    if !report.violations.is_empty() {
        anyhow::bail!("rule table has {} overlapping rule pairs", report.violations.len());
    }
    Ok(())
}

/// Handle `akta breakdown`.
pub fn breakdown(args: &BreakdownArgs, config: &AktaConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = RulesEngine::from_config(&config.rules).context("failed to load rule table")?;
    let inputs = NumericInputs::default()
        .with_salary(args.salary)
        .with_age(args.age.unwrap_or(config.composer.default_age))
        .with_citizenship(
            args.citizenship
                .unwrap_or(config.composer.default_citizenship),
        );
    let as_of = as_of_or_today(args.as_of);
    let breakdown = engine
        .salary_breakdown(&inputs, as_of)
        .with_context(|| format!("cannot compute breakdown as of {as_of}"))?;
    output(&breakdown, flags.format)
}

/// Handle `akta budget`: living costs against net pay, or gross with `--gross`.
pub fn budget(args: &BudgetArgs, config: &AktaConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let costs = LivingCosts::from_config(&config.rules).context("failed to load living-cost table")?;
    let income = if args.gross {
        args.salary
    } else {
        let engine = RulesEngine::from_config(&config.rules).context("failed to load rule table")?;
        let inputs = NumericInputs::default()
            .with_salary(args.salary)
            .with_age(args.age.unwrap_or(config.composer.default_age))
            .with_citizenship(
                args.citizenship
                    .unwrap_or(config.composer.default_citizenship),
            );
        let as_of = as_of_or_today(args.as_of);
        engine
            .salary_breakdown(&inputs, as_of)
            .with_context(|| format!("cannot compute net pay as of {as_of}"))?
            .net_pay
    };
    let budget = costs
        .budget(&args.city, income)
        .with_context(|| format!("cannot budget RM{income:.2} in {}", args.city))?;
    if budget.fallback {
        tracing::warn!(city = %args.city, used = %budget.city, "cli: city not listed, using default costs");
    }
    output(&budget, flags.format)
}
