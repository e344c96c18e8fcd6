pub mod evaluation_context;
pub mod port_specs;
pub mod traits;

// Re-export commonly used types
pub use evaluation_context::{InitContext, ReadContext, WriteContext};
pub use port_specs::{Port, PortKind};
pub use traits::{Node, NodeKind};
