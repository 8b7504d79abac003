//! Command line configuration and logging setup.

pub(crate) mod config;
pub(crate) mod logging;
