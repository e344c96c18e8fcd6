pub mod bits;
pub mod bus;
pub mod signal_value;
pub mod snapshot;

// Re-export commonly used types
pub use bus::{Bus, Pull};
pub use signal_value::{ChangeListener, SignalValue};
pub use snapshot::ValueSnapshot;
