pub mod collector;
pub mod counters;
pub mod memory;
pub mod platform;
pub mod reader;
