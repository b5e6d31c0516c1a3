//! Testability CLI - score page observations against testability principles.

use std::io::{stdout, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use testability::assessment::{Assessment, Assessor};
use testability::cli::{Cli, Command, GateArgs, SelectionArgs};
use testability::config::Config;
use testability::core::{Error, Observations};
use testability::output::{BatchReport, Format};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    if let Some(format) = cli.format {
        config.output.format = format;
    }
    let format = Format::from(config.output.format);
    let mut out = stdout().lock();

    match cli.command {
        Command::Init => {
            out.write_all(Config::default_toml().as_bytes())?;
        }
        Command::Rules(selection) => {
            apply_selection(&mut config, &selection);
            let assessor = Assessor::from_config(&config)?;
            format.write_rules(assessor.scorer().table(), &mut out)?;
        }
        Command::Assess(args) => {
            apply_selection(&mut config, &args.selection);
            apply_gate(&mut config, &args.gate);
            let assessor = Assessor::from_config(&config)?;

            let content = read_input(&args.observations)?;
            let observations = Observations::from_json_str(&content)
                .with_context(|| format!("reading {}", args.observations.display()))?;
            let assessment = assessor.assess(args.subject.as_deref(), &observations)?;

            format.write_assessment(&assessment, &mut out)?;
            check_fail_under(&config, std::slice::from_ref(&assessment))?;
        }
        Command::Batch(args) => {
            apply_selection(&mut config, &args.selection);
            apply_gate(&mut config, &args.gate);
            let assessor = Assessor::from_config(&config)?;

            let content = read_input(&args.subjects)?;
            let subjects = Observations::batch_from_json_str(&content)
                .with_context(|| format!("reading {}", args.subjects.display()))?;
            let assessments = assessor.assess_batch(&subjects)?;

            let report = BatchReport::new(assessor.principles(), assessments);
            format.write_batch(&report, &mut out)?;
            check_fail_under(&config, &report.assessments)?;
        }
    }

    Ok(())
}

fn apply_selection(config: &mut Config, selection: &SelectionArgs) {
    if let Some(profile) = selection.profile {
        config.profile = profile;
        config.principles.clear();
    }
    if !selection.principles.is_empty() {
        config.principles = selection.principles.clone();
    }
    if let Some(rules) = &selection.rules {
        config.set_rules_file(rules);
    }
}

fn apply_gate(config: &mut Config, gate: &GateArgs) {
    if gate.fail_under.is_some() {
        config.score.fail_under = gate.fail_under;
    }
    if gate.breakdown {
        config.output.breakdown = true;
    }
}

fn read_input(path: &Path) -> anyhow::Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("reading observations from stdin")?;
        return Ok(content);
    }
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn check_fail_under(config: &Config, assessments: &[Assessment]) -> testability::core::Result<()> {
    let Some(minimum) = config.score.fail_under else {
        return Ok(());
    };
    match assessments.iter().find(|a| a.result.overall_score < minimum) {
        Some(failing) => Err(Error::threshold_violation(
            format!(
                "overall score {} for {} is below {}",
                failing.result.overall_score,
                failing.subject.as_deref().unwrap_or("subject"),
                minimum
            ),
            failing.result.overall_score,
        )),
        None => Ok(()),
    }
}
