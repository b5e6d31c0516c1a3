//! Output formatters for assessments.
//!
//! Presentation lives here only; the core produces plain structured data.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::assessment::{Assessment, BatchSummary, Priority};
use crate::core::{Principle, PrincipleSet, Result};
use crate::score::{PrincipleScore, RuleTable};

/// Output format enum.
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Json,
    Markdown,
    Text,
}

impl From<crate::config::OutputFormat> for Format {
    fn from(format: crate::config::OutputFormat) -> Self {
        match format {
            crate::config::OutputFormat::Json => Format::Json,
            crate::config::OutputFormat::Markdown => Format::Markdown,
            crate::config::OutputFormat::Text => Format::Text,
        }
    }
}

/// Several subjects assessed in one invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub principles: Vec<Principle>,
    pub summary: BatchSummary,
    pub assessments: Vec<Assessment>,
}

impl BatchReport {
    pub fn new(principles: &PrincipleSet, assessments: Vec<Assessment>) -> Self {
        Self {
            generated_at: Utc::now(),
            principles: principles.iter().collect(),
            summary: BatchSummary::from_assessments(&assessments),
            assessments,
        }
    }
}

impl Format {
    pub fn write_assessment<W: Write>(&self, assessment: &Assessment, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => write_json(assessment, writer),
            Format::Markdown => assessment_markdown(assessment, writer, 1),
            Format::Text => assessment_text(assessment, writer),
        }
    }

    pub fn write_batch<W: Write>(&self, report: &BatchReport, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => write_json(report, writer),
            Format::Markdown => {
                writeln!(writer, "# Testability Assessment Batch\n")?;
                writeln!(
                    writer,
                    "**Generated**: {}  \n**Subjects**: {}  \n**Mean Overall Score**: {:.1}\n",
                    report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    report.summary.subjects,
                    report.summary.mean_overall_score
                )?;
                if let Some(lowest) = &report.summary.lowest {
                    writeln!(
                        writer,
                        "**Lowest**: {} ({}/100, grade {})\n",
                        lowest.subject, lowest.overall_score, lowest.grade
                    )?;
                }
                for assessment in &report.assessments {
                    assessment_markdown(assessment, writer, 2)?;
                }
                Ok(())
            }
            Format::Text => {
                writeln!(
                    writer,
                    "Batch of {} subjects, mean overall score {:.1}",
                    report.summary.subjects, report.summary.mean_overall_score
                )?;
                if let Some(lowest) = &report.summary.lowest {
                    writeln!(
                        writer,
                        "Lowest: {} ({}/100, grade {})",
                        lowest.subject, lowest.overall_score, lowest.grade
                    )?;
                }
                for assessment in &report.assessments {
                    writeln!(writer)?;
                    assessment_text(assessment, writer)?;
                }
                Ok(())
            }
        }
    }

    /// JSON for `Format::Json`, TOML otherwise (the format rule files use).
    pub fn write_rules<W: Write>(&self, table: &RuleTable, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => write_json(table, writer),
            Format::Markdown | Format::Text => {
                write!(writer, "{}", table.to_toml_string()?)?;
                Ok(())
            }
        }
    }
}

fn write_json<T: Serialize, W: Write>(value: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

fn status(assessment: &Assessment, principle: Principle) -> Option<Priority> {
    assessment
        .recommendations
        .iter()
        .find(|r| r.principle == principle)
        .map(|r| r.priority)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn assessment_markdown<W: Write>(assessment: &Assessment, writer: &mut W, level: usize) -> Result<()> {
    let heading = "#".repeat(level.min(5));
    match &assessment.subject {
        Some(subject) => writeln!(writer, "{heading} Testability Assessment: {subject}\n")?,
        None => writeln!(writer, "{heading} Testability Assessment\n")?,
    }
    writeln!(
        writer,
        "**Overall Score**: {}/100 (grade {})\n",
        assessment.result.overall_score, assessment.result.grade
    )?;

    writeln!(writer, "| Principle | Score | Status |")?;
    writeln!(writer, "| --- | --- | --- |")?;
    for (principle, score) in &assessment.result.principle_scores {
        let state = status(assessment, *principle).map_or("OK", Priority::as_str);
        writeln!(writer, "| {principle} | {score} | {state} |")?;
    }
    writeln!(writer)?;

    writeln!(writer, "{heading}# Recommendations\n")?;
    if assessment.recommendations.is_empty() {
        writeln!(writer, "_No recommendations_\n")?;
    } else {
        writeln!(writer, "| Priority | Principle | Advice | Rationale |")?;
        writeln!(writer, "| --- | --- | --- | --- |")?;
        for rec in &assessment.recommendations {
            writeln!(
                writer,
                "| {} | {} | {} | {} |",
                rec.priority,
                rec.principle,
                escape_cell(&rec.advice),
                escape_cell(&rec.rationale)
            )?;
        }
        writeln!(writer)?;
    }

    if let Some(breakdown) = &assessment.breakdown {
        writeln!(writer, "{heading}# Breakdown\n")?;
        writeln!(writer, "| Principle | Sub-metric | Observation | Points | Budget |")?;
        writeln!(writer, "| --- | --- | --- | --- | --- |")?;
        for score in breakdown {
            for metric in &score.sub_metrics {
                let observation = if metric.defaulted {
                    format!("{} (missing)", metric.observation)
                } else {
                    metric.observation.clone()
                };
                writeln!(
                    writer,
                    "| {} | {} | {} | {} | {} |",
                    score.principle, metric.name, observation, metric.points, metric.budget
                )?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

fn assessment_text<W: Write>(assessment: &Assessment, writer: &mut W) -> Result<()> {
    match &assessment.subject {
        Some(subject) => writeln!(writer, "Testability assessment: {subject}")?,
        None => writeln!(writer, "Testability assessment")?,
    }
    writeln!(
        writer,
        "Overall score: {}/100 (grade {})",
        assessment.result.overall_score, assessment.result.grade
    )?;
    writeln!(writer)?;
    writeln!(writer, "Principle scores:")?;
    for (principle, score) in &assessment.result.principle_scores {
        match status(assessment, *principle) {
            Some(priority) => writeln!(writer, "  {:<26} {:>3}  [{}]", principle.display_name(), score, priority)?,
            None => writeln!(writer, "  {:<26} {:>3}", principle.display_name(), score)?,
        }
        if let Some(detail) = breakdown_for(assessment, *principle) {
            for metric in &detail.sub_metrics {
                let missing = if metric.defaulted { "  (missing)" } else { "" };
                writeln!(
                    writer,
                    "      {:<22} {:>3}/{:<3} {}{}",
                    metric.name, metric.points, metric.budget, metric.observation, missing
                )?;
            }
        }
    }

    writeln!(writer)?;
    if assessment.recommendations.is_empty() {
        writeln!(writer, "No recommendations.")?;
        return Ok(());
    }
    writeln!(writer, "Recommendations:")?;
    for (i, rec) in assessment.recommendations.iter().enumerate() {
        writeln!(writer, "  {}. [{}] {}: {}", i + 1, rec.priority, rec.principle, rec.advice)?;
        writeln!(writer, "     {}", rec.rationale)?;
    }
    Ok(())
}

fn breakdown_for(assessment: &Assessment, principle: Principle) -> Option<&PrincipleScore> {
    assessment
        .breakdown
        .as_ref()?
        .iter()
        .find(|s| s.principle == principle)
}
