mod breaks;
pub mod config;
pub mod model;
pub mod observer;
pub mod pending;
pub mod report;

// Re-export commonly used types
pub use config::{
    EvaluationMode, SimulationConfig, DEFAULT_OSCILLATION_CAP, DEFAULT_RECOVERY_WINDOW,
};
pub use model::{Model, ModelState};
pub use observer::SimulationObserver;
pub use pending::PendingQueue;
pub use report::{BreakInfo, SettleReport};
