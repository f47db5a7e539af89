//! packrig library
//!
//! Composes the `build` and `develop` bundler configurations of a JSX
//! component application from one shared base.

pub mod cli;
pub mod compose;
pub mod config;
pub mod emit;
pub mod error;
pub mod rules;
pub mod runner;
pub mod update;
pub mod utils;

pub use cli::Cli;
pub use compose::{ConfigComposer, Environment};
pub use config::{Config, Configuration};
pub use error::ConfigurationError;
