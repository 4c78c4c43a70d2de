//! Role gating: the per-navigation gate and plan selection.

mod role_gate;
mod select_plan;

pub use role_gate::{GateCheck, GateOutcome, RoleGate, DEFAULT_DEBOUNCE};
pub use select_plan::{SelectPlan, SelectPlanError};
