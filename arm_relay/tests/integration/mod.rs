//! Integration test modules.

mod bus;
mod coalescing;
mod common;
mod control_strategy;
mod startup;
mod validation;
