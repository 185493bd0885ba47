use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::numeric::{compound_factor, outside_percent_range, pct, safe_div, to_pct};
use crate::state::{
    percent_range_warning, phase1_exceeds_total_warning, ProjectState, NEGATIVE_RATE_WARNING,
    NO_BUILD_AREA_WARNING, ZERO_AMORTIZATION_WARNING,
};
use crate::types::{with_metadata, ComputationOutput, Money, Rate};

/// Vacancy and collection loss applied to gross potential rent.
pub const VACANCY_RATE: Rate = dec!(0.10);

/// Operating expenses as a share of effective gross income.
pub const EXPENSE_RATIO: Rate = dec!(0.32);

/// Minimum DSCR a construction lender will size to.
pub const LENDER_MIN_DSCR: Decimal = dec!(1.25);

/// Equity share above which the capital raise is flagged.
pub const EQUITY_WATCH_PCT: Decimal = dec!(40);

const MONTHS_PER_YEAR: Decimal = dec!(12);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Development budget and stabilised underwriting for a project snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialResult {
    /// Land cost including closing costs
    pub land_total_cost: Money,
    pub hard_cost_total: Money,
    pub soft_cost_total: Money,
    pub contingency_total: Money,
    /// Land + hard + soft + contingency
    pub total_project_cost: Money,
    /// Total project cost per buildable SF
    pub cost_per_sf: Money,
    /// Loan sized at max LTC
    pub max_loan: Money,
    pub required_equity: Money,
    /// Equity as a percent of total project cost
    pub equity_pct: Decimal,
    pub gross_potential_rent: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    pub monthly_payment: Money,
    pub annual_debt_service: Money,
    /// NOI / annual debt service
    pub dscr: Decimal,
    /// Rent per buildable SF needed to cover debt service and opex
    pub break_even_rent_psf: Money,
    /// Phase 1 share of buildable area
    pub phase1_weight: Decimal,
    pub phase1_noi: Money,
    pub phase1_loan: Money,
    pub phase1_debt_service: Money,
    pub phase1_dscr: Decimal,
}

#[derive(Debug, Clone, Serialize)]
struct UnderwritingAssumptions {
    vacancy_rate: Rate,
    expense_ratio: Rate,
    payment_frequency: &'static str,
    zero_rate_policy: &'static str,
    phase1_allocation: &'static str,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Underwrite the project: development budget, capital stack, stabilised
/// NOI, debt service and the pro-rata phase 1 view.
///
/// Infallible. Every division is zero-guarded, so incomplete or zeroed
/// project data still yields a complete result.
pub fn compute_financials(state: &ProjectState) -> FinancialResult {
    // --- Development budget ---
    let land_total_cost = state.land_cost * (Decimal::ONE + pct(state.land_closing_pct));
    let hard_cost_total = state.total_build_sf * state.hard_cost_psf;
    let soft_cost_total = hard_cost_total * pct(state.soft_cost_pct);
    let contingency_total = hard_cost_total * pct(state.contingency_pct);
    let total_project_cost = land_total_cost + hard_cost_total + soft_cost_total + contingency_total;
    let cost_per_sf = safe_div(total_project_cost, state.total_build_sf, Decimal::ZERO);

    // --- Capital stack ---
    let max_loan = total_project_cost * pct(state.max_ltc);
    let required_equity = total_project_cost - max_loan;
    let equity_pct = to_pct(safe_div(required_equity, total_project_cost, Decimal::ZERO));

    // --- Stabilised income ---
    let gross_potential_rent: Money = state.tenants.iter().map(|t| t.sf * t.rent_psf).sum();
    let effective_gross_income = gross_potential_rent * (Decimal::ONE - VACANCY_RATE);
    let operating_expenses = effective_gross_income * EXPENSE_RATIO;
    let noi = effective_gross_income - operating_expenses;

    // --- Debt service ---
    let monthly_rate = pct(state.interest_rate) / MONTHS_PER_YEAR;
    let total_months = state.amort_years.saturating_mul(12);
    let monthly_payment = compute_monthly_payment(max_loan, monthly_rate, total_months);
    let annual_debt_service = monthly_payment.saturating_mul(MONTHS_PER_YEAR);

    let dscr = coverage(noi, annual_debt_service);
    let break_even_rent_psf = safe_div(
        annual_debt_service.saturating_add(operating_expenses),
        state.total_build_sf,
        Decimal::ZERO,
    );

    // --- Phase 1 (pro-rata by area) ---
    let phase1_weight = safe_div(state.phase1_sf, state.total_build_sf, Decimal::ZERO);
    let phase1_noi = noi * phase1_weight;
    let phase1_loan = max_loan * phase1_weight;
    let phase1_debt_service = annual_debt_service.saturating_mul(phase1_weight);
    let phase1_dscr = coverage(phase1_noi, phase1_debt_service);

    tracing::debug!(
        %total_project_cost,
        %noi,
        %annual_debt_service,
        %dscr,
        "computed financials"
    );

    FinancialResult {
        land_total_cost,
        hard_cost_total,
        soft_cost_total,
        contingency_total,
        total_project_cost,
        cost_per_sf,
        max_loan,
        required_equity,
        equity_pct,
        gross_potential_rent,
        effective_gross_income,
        operating_expenses,
        noi,
        monthly_payment,
        annual_debt_service,
        dscr,
        break_even_rent_psf,
        phase1_weight,
        phase1_noi,
        phase1_loan,
        phase1_debt_service,
        phase1_dscr,
    }
}

/// [`compute_financials`] wrapped in the standard output envelope, with
/// warnings for inputs and results a lender would question.
pub fn underwrite(state: &ProjectState) -> ComputationOutput<FinancialResult> {
    let start = Instant::now();
    let result = compute_financials(state);
    let warnings = collect_warnings(state, &result);

    let assumptions = UnderwritingAssumptions {
        vacancy_rate: VACANCY_RATE,
        expense_ratio: EXPENSE_RATIO,
        payment_frequency: "monthly, annualised x12",
        zero_rate_policy: "straight-line amortisation",
        phase1_allocation: "pro-rata by buildable SF",
    };

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Development Underwriting (Fixed Vacancy / Expense Stress)",
        &assumptions,
        warnings,
        elapsed,
        result,
    )
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Level monthly payment: P * r(1+r)^n / ((1+r)^n - 1).
///
/// Zero rate falls back to straight-line `P / n`; zero periods gives 0. If
/// `(1+r)^n` or the numerator overflows, the payment has converged to
/// interest only (`P * r`).
fn compute_monthly_payment(principal: Money, monthly_rate: Rate, total_months: u32) -> Money {
    if total_months == 0 {
        return Decimal::ZERO;
    }
    if monthly_rate.is_zero() {
        return safe_div(principal, Decimal::from(total_months), Decimal::ZERO);
    }

    let interest_only = principal.saturating_mul(monthly_rate);
    let annuity = compound_factor(monthly_rate, total_months).and_then(|compound| {
        let numerator = interest_only.checked_mul(compound)?;
        Some(safe_div(numerator, compound - Decimal::ONE, interest_only))
    });
    annuity.unwrap_or(interest_only)
}

/// Coverage ratio, 0 unless the obligation is positive.
fn coverage(income: Money, obligation: Money) -> Decimal {
    if obligation > Decimal::ZERO {
        safe_div(income, obligation, Decimal::ZERO)
    } else {
        Decimal::ZERO
    }
}

fn collect_warnings(state: &ProjectState, result: &FinancialResult) -> Vec<String> {
    let mut warnings = Vec::new();

    if state.total_build_sf <= Decimal::ZERO {
        warnings.push(NO_BUILD_AREA_WARNING.into());
    }
    if state.phase1_sf > state.total_build_sf {
        warnings.push(phase1_exceeds_total_warning(state));
    }
    for (field, value) in [
        ("land_closing_pct", state.land_closing_pct),
        ("soft_cost_pct", state.soft_cost_pct),
        ("contingency_pct", state.contingency_pct),
        ("max_ltc", state.max_ltc),
    ] {
        if outside_percent_range(value) {
            warnings.push(percent_range_warning(field, value));
        }
    }
    if state.interest_rate < Decimal::ZERO {
        warnings.push(NEGATIVE_RATE_WARNING.into());
    }
    if state.interest_rate.is_zero() && result.max_loan > Decimal::ZERO {
        warnings.push("Zero interest rate; debt service uses straight-line amortisation".into());
    }
    if state.amort_years == 0 && result.max_loan > Decimal::ZERO {
        warnings.push(ZERO_AMORTIZATION_WARNING.into());
    }
    if state.tenants.is_empty() {
        warnings.push("No tenants on the rent roll; NOI is 0".into());
    }
    if result.annual_debt_service > Decimal::ZERO && result.dscr < LENDER_MIN_DSCR {
        warnings.push(format!(
            "DSCR of {:.2}x is below the {LENDER_MIN_DSCR}x lender minimum",
            result.dscr
        ));
    }
    if result.equity_pct > EQUITY_WATCH_PCT {
        warnings.push(format!(
            "Required equity is {:.1}% of capital; above {EQUITY_WATCH_PCT}%",
            result.equity_pct
        ));
    }

    warnings
}
