//! Isolated environment management.
//!
//! Packages are installed into a dedicated virtualenv rather than the base
//! interpreter. [`ensure_environment`] creates or reuses it and returns an
//! [`EnvironmentHandle`] that later stages use to run the environment's
//! interpreter explicitly.

pub mod handle;
pub mod manager;

pub use handle::{EnvironmentHandle, InstallerUpgrade};
pub use manager::{ensure_environment, EnvironmentOptions};
