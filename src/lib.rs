//! # Review Harness
//!
//! Batch ingestion, name resolution, and LLM analysis of shared documents.
//!
//! Review Harness takes a list of share links, resolves each to a file in the
//! source store, parses the submitter's name out of the file name, makes sure
//! the file is present in the remote analysis store (reusing earlier uploads),
//! runs a prompt against every file, and persists the results as JSON.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────────┐   ┌──────────────┐   ┌──────────┐
//! │ Share links │──▶│  Ingestion pipeline  │──▶│   Analyzer   │──▶│   JSON   │
//! └─────────────┘   │ id → name → catalog  │   │ prompt+blob  │   │ results  │
//!                   │ → stage → upload     │   └──────┬───────┘   └──────────┘
//!                   └──────────┬───────────┘          │
//!                              ▼                      ▼
//!                   ┌────────────────────┐   ┌─────────────────┐
//!                   │ SourceStore (Drive)│   │ AnalysisService │
//!                   │ RemoteStore(Gemini)│   │    (Gemini)     │
//!                   └────────────────────┘   └─────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export GOOGLE_ACCESS_TOKEN=...   # Drive access token
//! export GEMINI_API_KEY=...
//! rvw run --links links.txt                 # ingest, analyze, write responses.json
//! rvw run --links links.txt --prompt ocr    # transcription prompt instead
//! rvw roster --links links.txt              # first/last name table
//! rvw names "(2023) John Smith_A1b2_x.pdf"  # offline name check
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Collaborator error types |
//! | [`traits`] | Source store, remote store, and analysis service seams |
//! | [`identifier`] | File id extraction from links |
//! | [`names`] | Person-name resolution from file names |
//! | [`catalog`] | Remote catalog snapshot |
//! | [`staging`] | Scoped temporary files |
//! | [`ingest`] | Ingestion pipeline |
//! | [`analyze`] | Batch analyzer |
//! | [`roster`] | Name roster |
//! | [`export`] | Link lists and result files |
//! | [`drive`] | Google Drive client |
//! | [`gemini`] | Gemini client |

pub mod analyze;
pub mod catalog;
pub mod config;
pub mod drive;
pub mod error;
pub mod export;
pub mod gemini;
pub mod identifier;
pub mod ingest;
pub mod models;
pub mod names;
pub mod roster;
pub mod staging;
pub mod traits;
