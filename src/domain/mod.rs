pub mod catalog;
pub mod callsite;
pub mod extract;
pub mod graph;
