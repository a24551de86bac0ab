//! vylint: keeps Vy render methods and their element factories in sync.
//!
//! Every `render*` method marked as a Vy component needs a companion factory
//! method (`render` -> `el`, `renderHeader` -> `headerEl`) with the same
//! parameter list. vylint reports missing or mismatched companions and can
//! generate them.

// Core infrastructure - re-exported from vylint-core
pub use vylint_core::config;
pub use vylint_core::diagnostic;
pub use vylint_core::error;
pub use vylint_core::output;
pub use vylint_core::patch;
pub use vylint_core::text;

// Language support
pub use vylint_php as php;

// Front door
pub mod cli;
pub mod files;
