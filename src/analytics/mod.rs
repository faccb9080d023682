//! Interaction analytics: a JSONL log of handled questions and the
//! aggregation behind `datachat stats`.

pub mod logger;
pub mod reporter;
