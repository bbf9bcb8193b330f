//! API Module
//!
//! Front-end surface over the logic controllers.
//!
//! Structure:
//! - commands.rs: one handler per CLI subcommand

pub mod commands;
