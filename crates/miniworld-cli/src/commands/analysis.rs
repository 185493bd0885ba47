use clap::Args;
use serde_json::{json, Value};

use miniworld_core::narrative::NarrativePayload;
use miniworld_core::report::{build_report, compute_both};
use miniworld_core::{score_walkability, underwrite};

use super::{resolve_state, to_value, ProjectSourceArgs};

/// Arguments for the financial model
#[derive(Args)]
pub struct FinancialsArgs {
    #[command(flatten)]
    pub source: ProjectSourceArgs,
}

/// Arguments for the walkability model
#[derive(Args)]
pub struct WalkabilityArgs {
    #[command(flatten)]
    pub source: ProjectSourceArgs,
}

/// Arguments for the combined report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: ProjectSourceArgs,
}

/// Arguments for the partner-summary brief
#[derive(Args)]
pub struct NarrativeArgs {
    #[command(flatten)]
    pub source: ProjectSourceArgs,

    /// Print only the prompt text
    #[arg(long)]
    pub prompt_only: bool,
}

pub fn run_financials(args: FinancialsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let state = resolve_state(&args.source)?;
    to_value(&underwrite(&state))
}

pub fn run_walkability(args: WalkabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let state = resolve_state(&args.source)?;
    to_value(&score_walkability(&state))
}

pub fn run_report(args: ReportArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let state = resolve_state(&args.source)?;
    let report = build_report(&state);
    tracing::info!(
        warnings = report.warnings.len(),
        elapsed_us = report.metadata.computation_time_us,
        "report built"
    );
    to_value(&report)
}

pub fn run_narrative(args: NarrativeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let state = resolve_state(&args.source)?;
    let (fin, walk) = compute_both(&state);
    let payload = NarrativePayload::from_results(&state, &fin, &walk);
    let prompt = payload.prompt();

    if args.prompt_only {
        return Ok(Value::String(prompt));
    }
    Ok(json!({
        "payload": to_value(&payload)?,
        "prompt": prompt,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniworld_core::ProjectState;

    /// Source args reading the reference project from a file in `dir`.
    fn reference_source(dir: &tempfile::TempDir) -> ProjectSourceArgs {
        let path = dir.path().join("project.json");
        std::fs::write(&path, serde_json::to_string(&ProjectState::default()).unwrap()).unwrap();
        ProjectSourceArgs {
            input: Some(path.to_string_lossy().into_owned()),
            project: None,
            store_dir: dir.path().join("store").to_string_lossy().into_owned(),
            updates: Vec::new(),
        }
    }

    #[test]
    fn test_report_envelope_shape() {
        let dir = tempfile::tempdir().unwrap();
        let value = run_report(ReportArgs {
            source: reference_source(&dir),
        })
        .unwrap();

        assert!(value["methodology"].as_str().unwrap().contains("Walkability"));
        assert_eq!(value["result"]["dashboard"]["dscr_status"], "watch");
        assert_eq!(value["result"]["dashboard"]["funding_probability"], "MODERATE");
        assert_eq!(value["result"]["walkability"]["grade"], "Car Dependent");
    }

    #[test]
    fn test_narrative_prompt_only() {
        let dir = tempfile::tempdir().unwrap();
        let value = run_narrative(NarrativeArgs {
            source: reference_source(&dir),
            prompt_only: true,
        })
        .unwrap();

        assert!(value.as_str().unwrap().contains("- Total Cost: $13,707,000"));
    }
}
