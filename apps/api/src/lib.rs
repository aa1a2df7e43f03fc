//! Job-posting fraud check: free-text extraction via a language model,
//! reconciliation with form input, and a verdict from a remote classifier.

pub mod config;
pub mod decoder;
pub mod errors;
pub mod extraction;
pub mod llm_client;
pub mod pipeline;
pub mod prediction;
pub mod reconcile;
pub mod routes;
pub mod schema;
pub mod state;
pub mod verdict_view;
