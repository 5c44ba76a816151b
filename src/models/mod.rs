pub mod enums;
pub mod patient;
pub mod risk_profile;
pub mod triage;

pub use patient::Patient;
pub use risk_profile::{risk_profile, RiskProfile};
pub use triage::{ChatTurn, RiskVerdict, TriageEntry};
