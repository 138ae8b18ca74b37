//! Extraction core for agentscrape: turns one agent-directory HTML page into
//! deduplicated agent contact records.
//!
//! The page's data is scattered across embedded script JSON, loose JSON-like
//! fragments inside other scripts, and visible text. Each source is mined
//! separately and the results are reconciled into one record per agent.
//! Nothing in this crate performs network, filesystem, or environment access.

pub mod candidates;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod reconcile;
pub mod text_metrics;
pub mod types;
pub mod validation;
pub mod walker;

pub use error::AgentScrapeError;
pub use reconcile::{parse_agents_from_document, parse_agents_from_html};
pub use types::{AgentMetrics, AgentRecord, PhoneEntry};
