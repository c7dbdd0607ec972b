//! Orchestration around the review engine.
//!
//! Requests flow through:
//! 1. `MailSource::fetch_pending()` (batch of email + draft pairs)
//! 2. `QualityEngine::review()` (pure, no I/O)
//! 3. `ReviewStore::save_review()`
//! 4. `MailTransport::send_reply()`, skipped for escalated reviews
//!
//! **Escalated replies are never sent automatically.**

pub mod memory;
pub mod processor;
pub mod types;
pub mod worker;

pub use processor::ReviewPipeline;
pub use types::{Delivery, MailSource, MailTransport, ReviewOutcome, ReviewRecord, ReviewStore};
