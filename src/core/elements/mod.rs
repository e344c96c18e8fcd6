pub mod arithmetic;
pub mod combinational;
pub mod flipflops;
pub mod gates;
pub mod io;
pub mod memory;
pub mod wiring;

// Re-export commonly used types
pub use arithmetic::Adder;
pub use combinational::Combinational;
pub use flipflops::{Counter, DFlipFlop};
pub use gates::{And, Nand, Nor, Not, Or, Xnor, Xor};
pub use io::{Break, Clock, Reset};
pub use memory::{Ram, RamPins};
pub use wiring::{Const, Driver, Multiplexer};
