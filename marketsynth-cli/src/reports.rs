use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use marketsynth_engine::{BatchReport, CommitSummary, MarketRecord, SynthesizedCity, Verdict};

#[derive(Debug, Serialize)]
struct JsonRejection<'a> {
    id: &'a str,
    error: String,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    generated_at: String,
    synthesized: usize,
    cities: &'a [SynthesizedCity],
    rejections: Vec<JsonRejection<'a>>,
    skipped: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a CommitSummary>,
}

/// The grouped `// STATE:` block, ready to paste into a corpus file.
pub fn generate_entries_report<W: Write + ?Sized>(out: &mut W, report: &BatchReport) -> Result<()> {
    let rendered = report.render_entries();
    if !rendered.is_empty() {
        writeln!(out, "{rendered}")?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write + ?Sized>(
    out: &mut W,
    report: &BatchReport,
    commit: Option<&CommitSummary>,
) -> Result<()> {
    let json = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        synthesized: report.cities.len(),
        cities: &report.cities,
        rejections: report
            .rejections
            .iter()
            .map(|rejection| JsonRejection {
                id: &rejection.id,
                error: rejection.error.to_string(),
            })
            .collect(),
        skipped: &report.skipped,
        commit,
    };
    serde_json::to_writer_pretty(&mut *out, &json)?;
    writeln!(out)?;
    Ok(())
}

fn verdict_label(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::StrongBuy | Verdict::Buy => verdict.as_str().green(),
        Verdict::Hold => verdict.as_str().yellow(),
        Verdict::Caution | Verdict::Avoid => verdict.as_str().red(),
    }
}

fn console_line(record: &MarketRecord) -> String {
    format!(
        "   {:<28} pop {:>9}  ${:>9}  ADR ${:>4} @ {:>3}%  rev ${:>6}/mo  rpr {:.3}  score {:>2} {}",
        record.name.bold(),
        record.population,
        record.median_home_price(),
        record.rental.avg_adr,
        record.rental.occupancy_rate,
        record.rental.monthly_revenue,
        record.rpr,
        record.overall(),
        verdict_label(record.verdict())
    )
}

pub fn generate_console_report<W: Write + ?Sized>(
    out: &mut W,
    report: &BatchReport,
    commit: Option<&CommitSummary>,
    duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Market Synthesis Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;
    writeln!(out, "Synthesized: {}", report.cities.len().to_string().green())?;
    writeln!(out, "Rejected: {}", report.rejections.len().to_string().red())?;
    writeln!(out, "Skipped (already in corpus): {}", report.skipped.len())?;
    writeln!(out, "Elapsed: {duration:?}")?;
    writeln!(out)?;

    for (state, records) in report.by_state() {
        writeln!(out, "{} ({} new)", state.bright_yellow().bold(), records.len())?;
        for record in records {
            writeln!(out, "{}", console_line(record))?;
        }
        writeln!(out)?;
    }

    if report.has_rejections() {
        writeln!(out, "{}", "❌ Rejected descriptors".red().bold())?;
        for rejection in &report.rejections {
            writeln!(out, "   • {}", rejection.error.to_string().red())?;
        }
        writeln!(out)?;
    }

    if let Some(commit) = commit {
        write_commit_summary(out, commit)?;
    }
    Ok(())
}

fn write_commit_summary<W: Write + ?Sized>(out: &mut W, commit: &CommitSummary) -> Result<()> {
    writeln!(out, "{}", "🗂  Corpus Changes".bright_blue().bold())?;
    if let Some(insert) = &commit.insert {
        writeln!(out, "   Inserted: {}", insert.inserted)?;
        if !insert.replaced.is_empty() {
            writeln!(out, "   Replaced: {}", insert.replaced.join(", "))?;
        }
        if !insert.kept_existing.is_empty() {
            writeln!(out, "   Kept existing: {}", insert.kept_existing.join(", "))?;
        }
        if !insert.created_states.is_empty() {
            writeln!(out, "   New states: {}", insert.created_states.join(", "))?;
        }
    }
    if let Some(dedup) = &commit.dedup {
        writeln!(
            out,
            "   Duplicates removed: {} ({} ids)",
            dedup.removed,
            dedup.duplicated_ids.len()
        )?;
    }
    let saved = if commit.saved {
        "saved".green()
    } else {
        "not saved".yellow()
    };
    writeln!(out, "   Corpus {saved}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write + ?Sized>(
    out: &mut W,
    report: &BatchReport,
    commit: Option<&CommitSummary>,
) -> Result<()> {
    writeln!(out, "# Market Synthesis Report\n")?;
    writeln!(out, "_Generated {}_\n", Utc::now().format("%Y-%m-%d %H:%M UTC"))?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Synthesized**: {}", report.cities.len())?;
    writeln!(out, "- **Rejected**: {}", report.rejections.len())?;
    writeln!(out, "- **Skipped**: {}", report.skipped.len())?;
    if let Some(insert) = commit.and_then(|commit| commit.insert.as_ref()) {
        writeln!(out, "- **Inserted into corpus**: {}", insert.inserted)?;
    }
    if let Some(dedup) = commit.and_then(|commit| commit.dedup.as_ref()) {
        writeln!(out, "- **Duplicates removed**: {}", dedup.removed)?;
    }
    writeln!(out)?;

    for (state, records) in report.by_state() {
        writeln!(out, "## {state}\n")?;
        writeln!(
            out,
            "| City | Population | Type | Median price | ADR | Occupancy | Revenue | RPR | Score | Verdict |"
        )?;
        writeln!(out, "|---|---:|---|---:|---:|---:|---:|---:|---:|---|")?;
        for record in records {
            writeln!(
                out,
                "| {} | {} | {} | ${} | ${} | {}% | ${} | {:.3} | {} | {} |",
                record.name,
                record.population,
                record.amenity_delta.market_type,
                record.median_home_price(),
                record.rental.avg_adr,
                record.rental.occupancy_rate,
                record.rental.monthly_revenue,
                record.rpr,
                record.overall(),
                record.verdict()
            )?;
        }
        writeln!(out)?;
    }

    if report.has_rejections() {
        writeln!(out, "## Rejected\n")?;
        for rejection in &report.rejections {
            writeln!(out, "- {}", rejection.error)?;
        }
        writeln!(out)?;
    }
    Ok(())
}
