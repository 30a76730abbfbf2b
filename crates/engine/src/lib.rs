//! Block storage, the world access port, and the causal dispatcher that
//! drives block-update rules.
//!
//! Nothing in this crate knows what a block *means*. Game layers register
//! [`rules::Rule`]s that read and write the world through
//! [`access::WorldAccess`]; the [`causal`] module decides when each update
//! runs.

pub mod access;
pub mod causal;
pub mod rules;
pub mod world;
