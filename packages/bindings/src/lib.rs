use napi::Result as NapiResult;
use napi_derive::napi;

use miniworld_core::narrative::NarrativePayload;
use miniworld_core::report::{build_report as build_project_report, compute_both};
use miniworld_core::{ProjectState, ProjectUpdate};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_state(state_json: &str) -> NapiResult<ProjectState> {
    serde_json::from_str(state_json).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------

#[napi]
pub fn default_project() -> NapiResult<String> {
    serde_json::to_string(&ProjectState::default()).map_err(to_napi_error)
}

#[napi]
pub fn compute_financials(state_json: String) -> NapiResult<String> {
    let state = parse_state(&state_json)?;
    let output = miniworld_core::underwrite(&state);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn compute_walkability(state_json: String) -> NapiResult<String> {
    let state = parse_state(&state_json)?;
    let output = miniworld_core::score_walkability(&state);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_report(state_json: String) -> NapiResult<String> {
    let state = parse_state(&state_json)?;
    let output = build_project_report(&state);
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

#[napi]
pub fn narrative_prompt(state_json: String) -> NapiResult<String> {
    let state = parse_state(&state_json)?;
    let (fin, walk) = compute_both(&state);
    Ok(NarrativePayload::from_results(&state, &fin, &walk).prompt())
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[napi]
pub fn apply_update(state_json: String, update_json: String) -> NapiResult<String> {
    let state = parse_state(&state_json)?;
    let update: ProjectUpdate = serde_json::from_str(&update_json).map_err(to_napi_error)?;
    let next = miniworld_core::apply_update(&state, update).map_err(to_napi_error)?;
    serde_json::to_string(&next).map_err(to_napi_error)
}
