pub mod error;
pub mod numeric;
pub mod types;

pub mod financial;
pub mod narrative;
pub mod report;
pub mod state;
pub mod store;
pub mod tenant_mix;
pub mod walkability;

pub use error::CoreError;
pub use financial::{compute_financials, underwrite, FinancialResult};
pub use state::{apply_update, ProjectState, ProjectUpdate, Tenant, TenantCategory};
pub use types::*;
pub use walkability::{compute_walkability, score_walkability, WalkabilityGrade, WalkabilityResult};

/// Standard result type for all miniworld operations
pub type CoreResult<T> = Result<T, CoreError>;
