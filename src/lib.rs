//! Email Review: quality review and escalation for drafted email replies.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod review;
