pub mod components;
pub mod elements;
pub mod execution;
pub mod fault;
pub mod probes;
pub mod types;
pub mod values;
