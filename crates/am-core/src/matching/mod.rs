pub mod dealbreakers;
pub mod friction;
pub mod interests;
pub mod practical;
pub mod scoring;
pub mod traits;
pub mod weights;

pub use dealbreakers::{run_all_gate_checks, GateDecision, GateResult};
pub use scoring::{CompatibilityEngine, EngineConfig, MatchReport, ScoringResult};
pub use weights::Weights;
