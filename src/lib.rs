//! Artifact Regen: regenerates a re-hosted copy of an upstream class
//!
//! Downloads the current upstream revision of YAMLParser's
//! `FileConfiguration`, rewrites it into an abstract base class and merges
//! locally-defined static helpers into it.
//!
//! # Architecture
//!
//! The pipeline is linear: [`payload`] → [`fetch`] → [`rewrite`] →
//! [`persist`], wired together by [`pipeline`]. Every anchored rewrite
//! compiles down to a single primitive, [`Edit`], a verified byte-span
//! replacement on the in-memory text. The rule sequence itself is data
//! ([`RewritePlan`]), so adding or removing a rule never touches control
//! flow.
//!
//! # Guarantees
//!
//! - The destination is written once, after every rule succeeded
//! - Writes go through a tempfile + fsync + rename
//! - Upstream text is decoded strictly as UTF-8
//!
//! # Example
//!
//! ```no_run
//! use artifact_regen::{regenerate, HttpSource, RegenConfig};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = HttpSource::new()?;
//! let report = regenerate(&RegenConfig::default(), Path::new("."), &source)?;
//! println!("wrote {} bytes to {}", report.bytes_written, report.destination.display());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod config;
pub mod edit;
pub mod fetch;
pub mod payload;
pub mod persist;
pub mod pipeline;
pub mod rewrite;

// Re-exports
pub use config::{load_from_path, load_from_str, load_or_default, ConfigError, RegenConfig};
pub use edit::{Edit, EditError, EditVerification};
pub use fetch::{ArtifactSource, FetchError, FileSource, HttpSource, StaticSource};
pub use payload::{load_payload, AugmentationPayload, PayloadError};
pub use persist::{write_artifact, PersistError};
pub use pipeline::{regenerate, render, RegenError, RegenReport, Rendered};
pub use rewrite::{RewritePlan, RewriteRule, RuleError, RuleKind, RuleStep, StepOutcome, StepTrace};
