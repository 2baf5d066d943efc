//! CLI command implementations for folio.
//!
//! Each module corresponds to a subcommand (`folio <command>`).

pub mod build;
pub mod check;
pub mod init;
pub mod scholar;
pub mod sync;
