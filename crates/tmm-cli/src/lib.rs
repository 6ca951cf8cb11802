//! Library side of the `tmm` command: batch loading, commands and logging.

pub mod batch;
pub mod commands;
pub mod logging;
