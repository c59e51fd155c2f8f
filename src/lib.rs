//! Workspace-level tooling package. The actual crates live under `crates/`;
//! this package only exists to carry the pre-commit hook configuration.
