use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::numeric::{safe_div, to_pct};
use crate::state::{ProjectState, TenantCategory};
use crate::types::{Money, SquareFeet};

/// Leased area and rent for one use category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryAllocation {
    pub category: TenantCategory,
    pub tenant_count: usize,
    pub sf: SquareFeet,
    pub annual_rent: Money,
    /// Share of leased SF
    pub share_pct: Decimal,
}

/// Rent roll summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantMixResult {
    pub tenant_count: usize,
    pub leased_sf: SquareFeet,
    /// Leased SF as a percent of buildable SF (0 without buildable area)
    pub utilization_pct: Decimal,
    /// More SF leased than will be built. Allowed, but reported.
    pub over_leased: bool,
    /// Rent-weighted average rent per leased SF
    pub avg_rent_psf: Money,
    pub avg_operating_hours: Decimal,
    pub night_active_count: usize,
    pub night_active_pct: Decimal,
    /// Categories with leased area, in category order
    pub by_category: Vec<CategoryAllocation>,
}

/// Summarise the rent roll the way the tenant-mix screen shows it.
pub fn analyze_tenant_mix(state: &ProjectState) -> TenantMixResult {
    let tenant_count = state.tenants.len();
    let count = Decimal::from(tenant_count as u64);
    let leased_sf = state.leased_sf();
    let gross_rent: Money = state.tenants.iter().map(|t| t.sf * t.rent_psf).sum();
    let total_hours: Decimal = state.tenants.iter().map(|t| t.operating_hours).sum();
    let night_active_count = state.tenants.iter().filter(|t| t.night_active).count();

    let by_category = TenantCategory::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<_> = state
                .tenants
                .iter()
                .filter(|t| t.category == category)
                .collect();
            let sf: SquareFeet = members.iter().map(|t| t.sf).sum();
            if sf <= Decimal::ZERO {
                return None;
            }
            Some(CategoryAllocation {
                category,
                tenant_count: members.len(),
                sf,
                annual_rent: members.iter().map(|t| t.sf * t.rent_psf).sum(),
                share_pct: to_pct(safe_div(sf, leased_sf, Decimal::ZERO)),
            })
        })
        .collect();

    TenantMixResult {
        tenant_count,
        leased_sf,
        utilization_pct: to_pct(safe_div(leased_sf, state.total_build_sf, Decimal::ZERO)),
        over_leased: state.total_build_sf > Decimal::ZERO && leased_sf > state.total_build_sf,
        avg_rent_psf: safe_div(gross_rent, leased_sf, Decimal::ZERO),
        avg_operating_hours: safe_div(total_hours, count, Decimal::ZERO),
        night_active_count,
        night_active_pct: to_pct(safe_div(
            Decimal::from(night_active_count as u64),
            count,
            Decimal::ZERO,
        )),
        by_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Tenant;
    use rust_decimal_macros::dec;

    #[test]
    fn test_reference_rent_roll() {
        let mix = analyze_tenant_mix(&ProjectState::default());

        assert_eq!(mix.tenant_count, 4);
        assert_eq!(mix.leased_sf, dec!(21700));
        assert!(!mix.over_leased);
        assert_eq!(mix.night_active_count, 1);
        assert_eq!(mix.night_active_pct, dec!(25));
        // 702,900 / 21,700
        assert_eq!(mix.avg_rent_psf, dec!(702900) / dec!(21700));

        let diff = (mix.utilization_pct - dec!(48.22)).abs();
        assert!(diff < dec!(0.01), "utilization {}", mix.utilization_pct);
    }

    #[test]
    fn test_categories_skip_empty() {
        let mix = analyze_tenant_mix(&ProjectState::default());
        let cats: Vec<_> = mix.by_category.iter().map(|c| c.category).collect();

        assert_eq!(
            cats,
            vec![
                TenantCategory::Retail,
                TenantCategory::Wellness,
                TenantCategory::Dining
            ]
        );
        let dining = &mix.by_category[2];
        assert_eq!(dining.tenant_count, 2);
        assert_eq!(dining.sf, dec!(6200));
        assert_eq!(dining.annual_rent, dec!(244400));
    }

    #[test]
    fn test_over_lease_reported() {
        let mut state = ProjectState::default();
        state.tenants.push(Tenant {
            sf: dec!(30000),
            ..Tenant::placeholder("big")
        });
        let mix = analyze_tenant_mix(&state);

        assert!(mix.over_leased);
        assert!(mix.utilization_pct > dec!(100));
    }

    #[test]
    fn test_empty_roll() {
        let mut state = ProjectState::default();
        state.tenants.clear();
        state.total_build_sf = Decimal::ZERO;
        let mix = analyze_tenant_mix(&state);

        assert_eq!(mix.leased_sf, Decimal::ZERO);
        assert_eq!(mix.utilization_pct, Decimal::ZERO);
        assert_eq!(mix.avg_rent_psf, Decimal::ZERO);
        assert_eq!(mix.night_active_pct, Decimal::ZERO);
        assert!(mix.by_category.is_empty());
    }
}
