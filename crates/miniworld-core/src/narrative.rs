//! Partner-summary narrative contract.
//!
//! The engine does not write prose. It assembles the figures a partner
//! summary is built from, renders the brief handed to whatever text
//! generator the host wires in, and guarantees that a failing generator
//! never breaks the report.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::financial::FinancialResult;
use crate::state::ProjectState;
use crate::types::{Money, SquareFeet};
use crate::walkability::{WalkabilityGrade, WalkabilityResult};

/// Returned when the generator answers with no text.
pub const EMPTY_SUMMARY_PLACEHOLDER: &str = "Summary generation failed.";

/// Returned when the generator fails outright.
pub const FAILED_SUMMARY_PLACEHOLDER: &str =
    "Error generating AI summary. Please check your API key and network connection.";

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("Narrative service unavailable: {0}")]
    Unavailable(String),

    #[error("Narrative request rejected: {0}")]
    Rejected(String),
}

/// Snapshot of the figures a partner summary quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativePayload {
    pub total_project_cost: Money,
    pub required_equity: Money,
    pub dscr: Decimal,
    pub phase1_dscr: Decimal,
    pub walk_score: Decimal,
    pub grade: WalkabilityGrade,
    pub five_min_walk_compliant: bool,
    pub break_even_rent_psf: Money,
    pub site_acres: Decimal,
    pub total_build_sf: SquareFeet,
    pub phase1_sf: SquareFeet,
    pub hard_cost_psf: Money,
}

impl NarrativePayload {
    pub fn from_results(
        state: &ProjectState,
        fin: &FinancialResult,
        walk: &WalkabilityResult,
    ) -> Self {
        NarrativePayload {
            total_project_cost: fin.total_project_cost,
            required_equity: fin.required_equity,
            dscr: fin.dscr,
            phase1_dscr: fin.phase1_dscr,
            walk_score: walk.final_score,
            grade: walk.grade,
            five_min_walk_compliant: walk.five_min_walk_compliant,
            break_even_rent_psf: fin.break_even_rent_psf,
            site_acres: state.site_acres,
            total_build_sf: state.total_build_sf,
            phase1_sf: state.phase1_sf,
            hard_cost_psf: state.hard_cost_psf,
        }
    }

    /// The executive-summary brief sent to the text generator.
    pub fn prompt(&self) -> String {
        format!(
            "Generate a professional, high-impact executive summary for a real estate investment \
partner for a walkable mixed-use project.

KEY DATA:
- Total Cost: ${total_cost}
- Required Equity: ${equity}
- DSCR (Conservative): {dscr}
- Phase 1 Standalone DSCR: {phase1_dscr}
- Walkability Score: {score}/100 ({grade})
- 5-Min Walk Compliance: {compliance}
- Break-even Rent: ${break_even}/SF

PROJECT DETAILS:
- Acres: {acres}
- Total SF: {total_sf}
- Phase 1 SF: {phase1_sf}
- Hard Cost/SF: ${hard_cost}

Write exactly three short paragraphs:
1. Financial Confidence: Explain why the project pencils using the DSCR and Break-even numbers.
2. Place Identity: Describe why the walkability score makes this a superior destination compared to traditional suburban retail.
3. Capital Discipline: Highlight the phase strategy and why Phase 1 is a safe standalone bet for partners.

Tone: Institutional, calm, precise. No fluff.
",
            total_cost = group_thousands(self.total_project_cost),
            equity = group_thousands(self.required_equity),
            dscr = fixed(self.dscr, 2),
            phase1_dscr = fixed(self.phase1_dscr, 2),
            score = fixed(self.walk_score, 0),
            grade = self.grade,
            compliance = if self.five_min_walk_compliant { "Yes" } else { "No" },
            break_even = fixed(self.break_even_rent_psf, 2),
            acres = self.site_acres.normalize(),
            total_sf = self.total_build_sf.normalize(),
            phase1_sf = self.phase1_sf.normalize(),
            hard_cost = self.hard_cost_psf.normalize(),
        )
    }
}

/// Anything that can turn a payload into summary text (an LLM client, a
/// template engine, a canned fixture).
pub trait NarrativeGenerator {
    fn generate(&self, payload: &NarrativePayload) -> Result<String, NarrativeError>;
}

impl<F> NarrativeGenerator for F
where
    F: Fn(&NarrativePayload) -> Result<String, NarrativeError>,
{
    fn generate(&self, payload: &NarrativePayload) -> Result<String, NarrativeError> {
        self(payload)
    }
}

/// Ask `generator` for a partner summary. Never fails: an error or an empty
/// answer degrades to a placeholder string.
pub fn generate_narrative(
    generator: &dyn NarrativeGenerator,
    state: &ProjectState,
    fin: &FinancialResult,
    walk: &WalkabilityResult,
) -> String {
    let payload = NarrativePayload::from_results(state, fin, walk);
    match generator.generate(&payload) {
        Ok(text) if text.trim().is_empty() => {
            tracing::warn!("narrative generator returned empty text");
            EMPTY_SUMMARY_PLACEHOLDER.to_string()
        }
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, "narrative generation failed");
            FAILED_SUMMARY_PLACEHOLDER.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

fn fixed(value: Decimal, dp: u32) -> String {
    let rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.prec$}", prec = dp as usize)
}

/// `1234567.891` -> `1,234,567.89`
fn group_thousands(value: Decimal) -> String {
    let rounded = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (text.clone(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
