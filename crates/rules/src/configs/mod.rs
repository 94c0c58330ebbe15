//! Configuration model and its JSON wire shape.
//!
//! - `RuleFormatVersion`: which rule-file grammar a configuration uses
//! - `RulesConfig`: format version plus raw rule files
//! - `Config`: a tenant's rules and alert routing, encoded via `ConfigCompat`
//! - `View` / `VersionedRulesConfig`: versioned snapshots with soft deletion

mod format;
mod rules_config;
mod tenant;
mod view;

pub use format::*;
pub use rules_config::*;
pub use tenant::*;
pub use view::*;
