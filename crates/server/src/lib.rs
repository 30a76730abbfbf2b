pub mod block;
pub mod config;
pub mod event_bus;
pub mod fluid;
pub mod metrics;
pub mod registry;
pub mod rules;
pub mod simulation;
pub mod worldgen;
