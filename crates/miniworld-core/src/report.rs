use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::financial::{
    compute_financials, underwrite, FinancialResult, EQUITY_WATCH_PCT, LENDER_MIN_DSCR,
};
use crate::state::{validate_state, ProjectState};
use crate::tenant_mix::{analyze_tenant_mix, TenantMixResult};
use crate::types::{with_metadata, ComputationOutput};
use crate::walkability::{compute_walkability, score_walkability, WalkabilityResult};

/// Traffic-light status for a headline metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricStatus {
    Healthy,
    Normal,
    Watch,
}

/// Partner verdict on institutional funding under bank DSCR standards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingProbability {
    High,
    Moderate,
}

/// Headline indicators shown above the detailed results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub dscr_status: MetricStatus,
    pub funding_probability: FundingProbability,
    pub equity_status: MetricStatus,
    pub walk_compliance: String,
}

/// Everything the presentation layer renders for one project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectReport {
    pub financials: FinancialResult,
    pub walkability: WalkabilityResult,
    pub tenant_mix: TenantMixResult,
    pub dashboard: Dashboard,
}

pub fn build_dashboard(fin: &FinancialResult, walk: &WalkabilityResult) -> Dashboard {
    Dashboard {
        dscr_status: if fin.dscr < LENDER_MIN_DSCR {
            MetricStatus::Watch
        } else {
            MetricStatus::Healthy
        },
        funding_probability: if fin.dscr >= LENDER_MIN_DSCR {
            FundingProbability::High
        } else {
            FundingProbability::Moderate
        },
        equity_status: if fin.equity_pct > EQUITY_WATCH_PCT {
            MetricStatus::Watch
        } else {
            MetricStatus::Normal
        },
        walk_compliance: if walk.five_min_walk_compliant {
            "5-Min Walk Compliant".into()
        } else {
            "Scaling Risk".into()
        },
    }
}

/// Run both models and the rent-roll summary against one snapshot.
pub fn build_report(state: &ProjectState) -> ComputationOutput<ProjectReport> {
    let start = Instant::now();

    let underwriting = underwrite(state);
    let scoring = score_walkability(state);

    let mut warnings = validate_state(state);
    for w in underwriting.warnings.into_iter().chain(scoring.warnings) {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }

    let financials = underwriting.result;
    let walkability = scoring.result;
    let dashboard = build_dashboard(&financials, &walkability);
    let report = ProjectReport {
        tenant_mix: analyze_tenant_mix(state),
        financials,
        walkability,
        dashboard,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Project Feasibility Report (Underwriting + Walkability + Tenant Mix)",
        state,
        warnings,
        elapsed,
        report,
    )
}

/// Convenience for callers that only need the two core results.
pub fn compute_both(state: &ProjectState) -> (FinancialResult, WalkabilityResult) {
    (compute_financials(state), compute_walkability(state))
}
