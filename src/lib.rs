//! # notesmith
//!
//! An in-memory notes service with PDF-grounded chat and audience question
//! generation on top of an OpenAI-compatible chat-completion API.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │   HTTP     │──▶│  NoteStore   │   │ DocumentContext │◀── upload-pdf
//! │  (axum)    │   │  (in-memory) │   └────────┬────────┘    (extract)
//! └─────┬──────┘   └──────────────┘            │
//!       │                                      ▼
//!       └──────── chat / questions ──▶ CompletionClient ──▶ external API
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=sk-...
//! notesmith serve                    # listens on 127.0.0.1:3000
//! PORT=8080 notesmith serve          # override the port
//! notesmith check-config             # print the effective configuration
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and environment overrides |
//! | [`models`] | Notes and their request schemas |
//! | [`store`] | Note storage trait and in-memory backend |
//! | [`document`] | The shared current-document context |
//! | [`extract`] | PDF text extraction |
//! | [`ingest`] | Upload spooling and context replacement |
//! | [`llm`] | Chat-completion client abstraction |
//! | [`chat`] | Chat gateway |
//! | [`questions`] | Question generation and reply parsing |
//! | [`server`] | HTTP server |

pub mod chat;
pub mod config;
pub mod document;
pub mod extract;
pub mod ingest;
pub mod llm;
pub mod models;
pub mod questions;
pub mod server;
pub mod store;
