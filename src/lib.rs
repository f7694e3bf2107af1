//! vcpkg-cache - cache vcpkg in CI
//!
//! Derives a deterministic cache key for a vcpkg checkout (ordinary clone or
//! git submodule), restores the closest cache entry and decides whether a
//! new entry has to be saved.

pub mod bootstrap;
pub mod cache;
pub mod cli;
pub mod config;
pub mod env;
pub mod error;
pub mod git;
pub mod manifest;

pub use error::{VcpkgError, VcpkgResult};
