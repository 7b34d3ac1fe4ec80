//! Repogen - deliverable Maven repository generator
//!
//! Assembles the zipped Maven repository shipped alongside a product release:
//! root coordinates are sourced from an extensions list or completed builds,
//! mapped to productized versions, resolved against the remote repositories
//! of a Maven settings file and packaged deterministically.
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use repogen::config::RepogenConfig;
//! use repogen::operations::RepoManager;
//! use repogen::transport::HttpFetcher;
//!
//! # fn main() -> miette::Result<()> {
//! let config = RepogenConfig::load(Path::new("repogen.yaml"))?;
//! let request = config.to_request()?;
//! let manager = RepoManager::new(
//!     Arc::new(HttpFetcher::new(request.tuning.timeout)?),
//!     Arc::new(config.build_info_collector()?),
//!     Arc::new(config.static_catalog()),
//! );
//! let repository = manager.prepare(&request)?;
//! println!("{}", repository.repository_zip_path.display());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod operations;
pub mod package;
pub mod progress;
pub mod remap;
pub mod request;
pub mod resolver;
pub mod source;
pub mod temp;
pub mod transport;
pub mod xml;
