//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: the frontier of one run (discovered/visited URLs, parent
//!   attribution, broken findings)
//! - `CheckOutcome`: the classified result of a single status check

mod crawl_state;
mod outcome;

// Re-export main types
pub use crawl_state::CrawlState;
pub use outcome::{summarize_error, CheckOutcome, METHOD_NOT_ALLOWED, TIMEOUT_LABEL};
