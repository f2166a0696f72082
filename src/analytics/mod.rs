//! Per-click analytics capture and aggregation.
//!
//! Everything in this module is best-effort relative to the redirect itself:
//! a failure to capture or persist analytics detail never breaks the
//! user-facing response.

pub mod aggregator;
pub mod ip_extractor;
pub mod user_agent;

pub use aggregator::ClickSummary;
pub use ip_extractor::extract_client_address;
pub use user_agent::{parse_user_agent, UserAgentInfo};
