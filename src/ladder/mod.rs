//! Blur budgets and precomputed frame ladders.

pub mod budget;
pub mod builder;
