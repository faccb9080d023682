//! datachat: ask questions about a dataset, get answers, charts and
//! dashboards back.
//!
//! The pipeline is [`router`] → [`llm`] (or a canned dashboard reply) →
//! [`parser`] → [`chart`], driven by [`assistant::Assistant`] over an
//! explicit [`session::Session`]. [`cli`] and [`web`] are the two front ends.

pub mod analytics;
pub mod assistant;
pub mod chart;
pub mod cli;
pub mod config;
pub mod datasets;
pub mod llm;
pub mod parser;
pub mod router;
pub mod session;
pub mod web;
