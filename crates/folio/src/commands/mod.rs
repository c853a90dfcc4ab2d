//! CLI command implementations.

pub(crate) mod build;
pub(crate) mod nav;

pub(crate) use build::BuildArgs;
pub(crate) use nav::NavArgs;
