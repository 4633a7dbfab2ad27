//! Program tree engine for academic curricula
//!
//! Trees of trainings, groups and learning units joined by typed links, with the
//! business rules that govern editing them: authorized relationships, prerequisites,
//! versions and yearly postponement.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
