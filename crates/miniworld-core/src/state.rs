use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreError;
use crate::numeric::outside_percent_range;
use crate::types::{Feet, Money, Percent, SquareFeet};
use crate::CoreResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Tenant use category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TenantCategory {
    #[default]
    Retail,
    Office,
    Wellness,
    Dining,
    Anchor,
}

impl TenantCategory {
    pub const ALL: [TenantCategory; 5] = [
        TenantCategory::Retail,
        TenantCategory::Office,
        TenantCategory::Wellness,
        TenantCategory::Dining,
        TenantCategory::Anchor,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TenantCategory::Retail => "Retail",
            TenantCategory::Office => "Office",
            TenantCategory::Wellness => "Wellness",
            TenantCategory::Dining => "Dining",
            TenantCategory::Anchor => "Anchor",
        }
    }
}

impl fmt::Display for TenantCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single lease on the rent roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    /// Unique within a project
    pub id: String,
    pub name: String,
    pub category: TenantCategory,
    /// Leased area
    pub sf: SquareFeet,
    /// Annual base rent per square foot
    pub rent_psf: Money,
    /// Hours open per day
    pub operating_hours: Decimal,
    /// Trades past conventional daytime hours
    pub night_active: bool,
}

impl Tenant {
    /// A blank lease with the defaults the tenant-mix screen starts from.
    pub fn placeholder(id: impl Into<String>) -> Self {
        Tenant {
            id: id.into(),
            name: "New Tenant".into(),
            category: TenantCategory::Retail,
            sf: dec!(1500),
            rent_psf: dec!(30),
            operating_hours: dec!(10),
            night_active: false,
        }
    }
}

/// Complete set of project inputs. Both models read a snapshot of this and
/// never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    // Land
    pub land_cost: Money,
    /// Closing costs as a percent of land cost
    pub land_closing_pct: Percent,

    // Construction
    pub total_build_sf: SquareFeet,
    /// Area delivered in the first phase (expected <= total_build_sf)
    pub phase1_sf: SquareFeet,
    pub hard_cost_psf: Money,
    /// Soft costs as a percent of hard cost
    pub soft_cost_pct: Percent,
    /// Contingency as a percent of hard cost
    pub contingency_pct: Percent,

    // Capital
    /// Maximum loan-to-cost
    pub max_ltc: Percent,
    /// Annual interest rate
    pub interest_rate: Percent,
    pub amort_years: u32,
    /// Interest-only months. Carried for the lender term sheet; not used by
    /// the debt service calculation.
    pub io_months: u32,

    // Urbanism
    pub site_acres: Decimal,
    pub ped_spine_length_ft: Feet,
    pub avg_block_length_ft: Feet,
    /// Activity nodes along the pedestrian spine
    pub num_nodes: u32,
    pub shade_pct: Percent,
    pub seating_interval_ft: Feet,
    pub tree_interval_ft: Feet,
    pub heat_mitigation_count: u32,
    pub active_frontage_pct: Percent,
    pub parking_visible_pct: Percent,
    pub car_crossings_count: u32,

    pub tenants: Vec<Tenant>,
}

impl Default for ProjectState {
    /// The reference mixed-use project new sessions open with.
    fn default() -> Self {
        ProjectState {
            land_cost: dec!(1500000),
            land_closing_pct: dec!(2),
            total_build_sf: dec!(45000),
            phase1_sf: dec!(15000),
            hard_cost_psf: dec!(220),
            soft_cost_pct: dec!(15),
            contingency_pct: dec!(8),
            max_ltc: dec!(65),
            interest_rate: dec!(7.25),
            amort_years: 25,
            io_months: 18,
            site_acres: dec!(12),
            ped_spine_length_ft: dec!(800),
            avg_block_length_ft: dec!(250),
            num_nodes: 3,
            shade_pct: dec!(45),
            seating_interval_ft: dec!(200),
            tree_interval_ft: dec!(50),
            heat_mitigation_count: 1,
            active_frontage_pct: dec!(65),
            parking_visible_pct: dec!(20),
            car_crossings_count: 2,
            tenants: vec![
                Tenant {
                    id: "1".into(),
                    name: "Anchor Grocer".into(),
                    category: TenantCategory::Retail,
                    sf: dec!(12000),
                    rent_psf: dec!(28),
                    operating_hours: dec!(14),
                    night_active: false,
                },
                Tenant {
                    id: "2".into(),
                    name: "The Daily Brew".into(),
                    category: TenantCategory::Dining,
                    sf: dec!(2200),
                    rent_psf: dec!(42),
                    operating_hours: dec!(12),
                    night_active: false,
                },
                Tenant {
                    id: "3".into(),
                    name: "Main St Wellness".into(),
                    category: TenantCategory::Wellness,
                    sf: dec!(3500),
                    rent_psf: dec!(35),
                    operating_hours: dec!(10),
                    night_active: false,
                },
                Tenant {
                    id: "4".into(),
                    name: "Social Taphouse".into(),
                    category: TenantCategory::Dining,
                    sf: dec!(4000),
                    rent_psf: dec!(38),
                    operating_hours: dec!(11),
                    night_active: true,
                },
            ],
        }
    }
}

impl ProjectState {
    pub fn tenant(&self, id: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.id == id)
    }

    pub fn leased_sf(&self) -> SquareFeet {
        self.tenants.iter().map(|t| t.sf).sum()
    }
}

// ---------------------------------------------------------------------------
// Updates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum LandUpdate {
    LandCost(Money),
    ClosingPct(Percent),
    SiteAcres(Decimal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum ConstructionUpdate {
    TotalBuildSf(SquareFeet),
    Phase1Sf(SquareFeet),
    HardCostPsf(Money),
    SoftCostPct(Percent),
    ContingencyPct(Percent),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum CapitalUpdate {
    MaxLtc(Percent),
    InterestRate(Percent),
    AmortYears(u32),
    IoMonths(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum UrbanismUpdate {
    PedSpineLengthFt(Feet),
    AvgBlockLengthFt(Feet),
    NumNodes(u32),
    ShadePct(Percent),
    SeatingIntervalFt(Feet),
    TreeIntervalFt(Feet),
    HeatMitigationCount(u32),
    ActiveFrontagePct(Percent),
    ParkingVisiblePct(Percent),
    CarCrossingsCount(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TenantUpdate {
    Add { tenant: Tenant },
    Remove { id: String },
    Rename { id: String, name: String },
    SetCategory { id: String, category: TenantCategory },
    SetSf { id: String, sf: SquareFeet },
    SetRentPsf { id: String, rent_psf: Money },
    SetOperatingHours { id: String, hours: Decimal },
    SetNightActive { id: String, night_active: bool },
}

/// One typed edit to a project, grouped the way the input sheet is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "group", content = "update", rename_all = "snake_case")]
pub enum ProjectUpdate {
    Land(LandUpdate),
    Construction(ConstructionUpdate),
    Capital(CapitalUpdate),
    Urbanism(UrbanismUpdate),
    Tenant(TenantUpdate),
}

// ---------------------------------------------------------------------------
// Reducers
// ---------------------------------------------------------------------------

/// Apply a single update and return the new state. The input snapshot is
/// left untouched.
pub fn apply_update(state: &ProjectState, update: ProjectUpdate) -> CoreResult<ProjectState> {
    let mut next = state.clone();
    match update {
        ProjectUpdate::Land(u) => apply_land(&mut next, u),
        ProjectUpdate::Construction(u) => apply_construction(&mut next, u),
        ProjectUpdate::Capital(u) => apply_capital(&mut next, u),
        ProjectUpdate::Urbanism(u) => apply_urbanism(&mut next, u),
        ProjectUpdate::Tenant(u) => apply_tenant(&mut next, u)?,
    }
    Ok(next)
}

/// Apply updates in order, stopping at the first failure.
pub fn apply_updates(
    state: &ProjectState,
    updates: impl IntoIterator<Item = ProjectUpdate>,
) -> CoreResult<ProjectState> {
    updates
        .into_iter()
        .try_fold(state.clone(), |acc, u| apply_update(&acc, u))
}

fn apply_land(state: &mut ProjectState, update: LandUpdate) {
    match update {
        LandUpdate::LandCost(v) => state.land_cost = v,
        LandUpdate::ClosingPct(v) => state.land_closing_pct = v,
        LandUpdate::SiteAcres(v) => state.site_acres = v,
    }
}

fn apply_construction(state: &mut ProjectState, update: ConstructionUpdate) {
    match update {
        ConstructionUpdate::TotalBuildSf(v) => state.total_build_sf = v,
        ConstructionUpdate::Phase1Sf(v) => state.phase1_sf = v,
        ConstructionUpdate::HardCostPsf(v) => state.hard_cost_psf = v,
        ConstructionUpdate::SoftCostPct(v) => state.soft_cost_pct = v,
        ConstructionUpdate::ContingencyPct(v) => state.contingency_pct = v,
    }
}

fn apply_capital(state: &mut ProjectState, update: CapitalUpdate) {
    match update {
        CapitalUpdate::MaxLtc(v) => state.max_ltc = v,
        CapitalUpdate::InterestRate(v) => state.interest_rate = v,
        CapitalUpdate::AmortYears(v) => state.amort_years = v,
        CapitalUpdate::IoMonths(v) => state.io_months = v,
    }
}

fn apply_urbanism(state: &mut ProjectState, update: UrbanismUpdate) {
    match update {
        UrbanismUpdate::PedSpineLengthFt(v) => state.ped_spine_length_ft = v,
        UrbanismUpdate::AvgBlockLengthFt(v) => state.avg_block_length_ft = v,
        UrbanismUpdate::NumNodes(v) => state.num_nodes = v,
        UrbanismUpdate::ShadePct(v) => state.shade_pct = v,
        UrbanismUpdate::SeatingIntervalFt(v) => state.seating_interval_ft = v,
        UrbanismUpdate::TreeIntervalFt(v) => state.tree_interval_ft = v,
        UrbanismUpdate::HeatMitigationCount(v) => state.heat_mitigation_count = v,
        UrbanismUpdate::ActiveFrontagePct(v) => state.active_frontage_pct = v,
        UrbanismUpdate::ParkingVisiblePct(v) => state.parking_visible_pct = v,
        UrbanismUpdate::CarCrossingsCount(v) => state.car_crossings_count = v,
    }
}

fn apply_tenant(state: &mut ProjectState, update: TenantUpdate) -> CoreResult<()> {
    match update {
        TenantUpdate::Add { tenant } => {
            if tenant.id.trim().is_empty() {
                return Err(CoreError::InvalidInput {
                    field: "tenant.id".into(),
                    reason: "Tenant id must not be empty".into(),
                });
            }
            if state.tenant(&tenant.id).is_some() {
                return Err(CoreError::DuplicateTenant { id: tenant.id });
            }
            state.tenants.push(tenant);
        }
        TenantUpdate::Remove { id } => {
            let before = state.tenants.len();
            state.tenants.retain(|t| t.id != id);
            if state.tenants.len() == before {
                return Err(CoreError::TenantNotFound { id });
            }
        }
        TenantUpdate::Rename { id, name } => tenant_mut(state, &id)?.name = name,
        TenantUpdate::SetCategory { id, category } => tenant_mut(state, &id)?.category = category,
        TenantUpdate::SetSf { id, sf } => tenant_mut(state, &id)?.sf = sf,
        TenantUpdate::SetRentPsf { id, rent_psf } => tenant_mut(state, &id)?.rent_psf = rent_psf,
        TenantUpdate::SetOperatingHours { id, hours } => {
            tenant_mut(state, &id)?.operating_hours = hours
        }
        TenantUpdate::SetNightActive { id, night_active } => {
            tenant_mut(state, &id)?.night_active = night_active
        }
    }
    Ok(())
}

fn tenant_mut<'a>(state: &'a mut ProjectState, id: &str) -> CoreResult<&'a mut Tenant> {
    state
        .tenants
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| CoreError::TenantNotFound { id: id.to_string() })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

// Conditions reported by both `validate_state` and the model envelopes share
// one wording so the report merge keeps a single copy.
pub(crate) const NO_BUILD_AREA_WARNING: &str =
    "Total buildable SF is not positive; per-SF metrics default to 0";
pub(crate) const ZERO_AMORTIZATION_WARNING: &str =
    "Amortization period is 0 years; debt service defaults to 0";
pub(crate) const NEGATIVE_RATE_WARNING: &str = "Interest rate is negative";

pub(crate) fn phase1_exceeds_total_warning(state: &ProjectState) -> String {
    format!(
        "Phase 1 SF ({}) exceeds total buildable SF ({})",
        state.phase1_sf, state.total_build_sf
    )
}

pub(crate) fn percent_range_warning(field: &str, value: Percent) -> String {
    format!("{field} = {value} is outside 0-100%")
}

/// Caller-side sanity checks. The models accept any numbers; this reports
/// the ones an analyst should look at.
pub fn validate_state(state: &ProjectState) -> Vec<String> {
    let mut warnings = Vec::new();

    if state.total_build_sf <= Decimal::ZERO {
        warnings.push(NO_BUILD_AREA_WARNING.into());
    }
    if state.phase1_sf > state.total_build_sf {
        warnings.push(phase1_exceeds_total_warning(state));
    }
    if state.phase1_sf < Decimal::ZERO {
        warnings.push("Phase 1 SF is negative".into());
    }
    if state.land_cost < Decimal::ZERO {
        warnings.push("Land cost is negative".into());
    }
    if state.amort_years == 0 {
        warnings.push(ZERO_AMORTIZATION_WARNING.into());
    }

    let leased = state.leased_sf();
    if state.total_build_sf > Decimal::ZERO && leased > state.total_build_sf {
        warnings.push(format!(
            "Leased SF ({leased}) exceeds total buildable SF ({}); rent roll is over-leased",
            state.total_build_sf
        ));
    }

    let percents = [
        ("land_closing_pct", state.land_closing_pct),
        ("soft_cost_pct", state.soft_cost_pct),
        ("contingency_pct", state.contingency_pct),
        ("max_ltc", state.max_ltc),
        ("shade_pct", state.shade_pct),
        ("active_frontage_pct", state.active_frontage_pct),
        ("parking_visible_pct", state.parking_visible_pct),
    ];
    for (field, value) in percents {
        if outside_percent_range(value) {
            warnings.push(percent_range_warning(field, value));
        }
    }
    if state.interest_rate < Decimal::ZERO {
        warnings.push(NEGATIVE_RATE_WARNING.into());
    }

    for t in &state.tenants {
        if t.sf <= Decimal::ZERO {
            warnings.push(format!("Tenant '{}' has non-positive leased SF", t.name));
        }
        if t.rent_psf < Decimal::ZERO {
            warnings.push(format!("Tenant '{}' has negative rent", t.name));
        }
    }

    warnings
}
