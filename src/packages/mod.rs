//! Package manifest, installation and import validation.

pub mod import_names;
pub mod installer;
pub mod manifest;

pub use import_names::ImportNames;
pub use installer::{install_and_validate, InstallOptions, Strategy};
pub use manifest::{load_manifest, parse_manifest, PackageSpec};
