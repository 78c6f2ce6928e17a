// src/ingest/providers/mod.rs
pub mod sheets_csv;
