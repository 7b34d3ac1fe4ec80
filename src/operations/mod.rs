//! Operations module for generating deliverable repositories
//!
//! This module provides the high-level workflow that coordinates:
//! - Source: Root coordinates (from source module)
//! - Remap: Productized versions (from remap module)
//! - Resolver: Downloads and dependency traversal (from resolver module)
//! - Package: Staging, archive and digest (from package module)

pub mod generate;

pub use generate::RepoManager;
