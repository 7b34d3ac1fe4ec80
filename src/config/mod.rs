//! Configuration handling for repogen
//!
//! This module contains data structures for:
//! - `repogen.yaml` - Product and repository generation configuration
//! - `settings.xml` - Maven settings defining the remote repository chain

pub mod repogen;
pub mod settings;

pub use repogen::{RepogenConfig, locate};
pub use settings::{RemoteRepository, ResolverSettings};

/// Default configuration file name
pub const CONFIG_FILE: &str = "repogen.yaml";

/// Environment variable pointing at the configuration file
pub const CONFIG_ENV: &str = "REPOGEN_CONFIG";
