//! Application layer: use cases over program trees and their versions
//!
//! This layer loads aggregates through the repository traits, runs the domain
//! operation and writes the result back. Nothing is written when validation fails.

pub mod command;
pub mod error;
pub mod services;

pub use command::*;
pub use error::{ApplicationError, ApplicationResult};
pub use services::{PostponementService, ProgramTreeService, ProgramTreeVersionService};
