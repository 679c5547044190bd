//! Rendering results to the terminal.

use slicewright_lint::Violation;
use slicewright_pipeline::BatchReport;

use crate::cli::OutputFormat;

/// Print a batch generation report.
pub fn render_batch_report(report: &BatchReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for outcome in &report.outcomes {
                match &outcome.result {
                    Ok(action) => println!("{}: {:?}", outcome.label, action),
                    Err(err) => println!("{}: failed: {:#}", outcome.label, err),
                }
            }
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = report
                .outcomes
                .iter()
                .map(|outcome| match &outcome.result {
                    Ok(action) => serde_json::json!({
                        "slice": outcome.label,
                        "status": format!("{action:?}").to_lowercase(),
                    }),
                    Err(err) => serde_json::json!({
                        "slice": outcome.label,
                        "status": "failed",
                        "error": format!("{err:#}"),
                    }),
                })
                .collect();
            print_json(&serde_json::Value::Array(entries));
        }
    }
}

/// Print the full violation list; truncating it would hide the picture the
/// user needs.
pub fn render_violations(violations: &[Violation], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for violation in violations {
                println!(
                    "{}: {}: {}",
                    violation.kind.as_str(),
                    violation.location,
                    violation.message
                );
            }
            if violations.is_empty() {
                println!("no violations");
            }
        }
        OutputFormat::Json => match serde_json::to_value(violations) {
            Ok(value) => print_json(&value),
            Err(err) => eprintln!("failed to render violations: {err}"),
        },
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => eprintln!("failed to render output: {err}"),
    }
}
