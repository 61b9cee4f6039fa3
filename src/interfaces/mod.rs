//! Entry surfaces: the operation dispatcher and the file readers the CLI
//! feeds it from.

pub mod api;
pub mod csv;
pub mod jsonl;
