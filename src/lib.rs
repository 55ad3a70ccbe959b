//! # Review Harness
//!
//! Retrieval-grounded pull request review.
//!
//! Review Harness indexes a repository's source files as embedding vectors
//! in SQLite, then grounds an LLM review of a proposed change: the diff is
//! embedded, the nearest indexed files are retrieved, and their raw content
//! is fed to the model alongside the diff.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌───────────┐
//! │  Indexer  │──▶│ Normalize+Embed  │──▶│  SQLite   │
//! │ (walkdir) │   │  (OpenAI, 1536)  │   │  vectors  │
//! └───────────┘   └──────────────────┘   └─────┬─────┘
//!                                              │ nearest-K
//! ┌───────────┐   ┌──────────────────┐   ┌─────▼─────┐
//! │  GitHub   │──▶│ Context Assembler│◀──│ Retriever │
//! │ (PR diff) │   │  diff + context  │   └───────────┘
//! └───────────┘   └────────┬─────────┘
//!                          ▼
//!                 ┌──────────────────┐   ┌───────────┐
//!                 │   LLM analysis   │──▶│  Report   │
//!                 └──────────────────┘   └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! prr init                          # create the database
//! prr index ./my-repo               # embed the repository
//! prr review octocat hello-world 7  # review a pull request
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`normalize`] | Deterministic text cleanup before embedding |
//! | [`embedding`] | Embedding provider abstraction + vector codec |
//! | [`store`] | SQLite vector store with nearest-neighbor search |
//! | [`indexer`] | Repository tree walking and index population |
//! | [`context`] | Retrieval and review-context assembly |
//! | [`github`] | Pull request metadata and unified diffs |
//! | [`llm`] | Prompt rendering and chat-completion analysis |
//! | [`report`] | Markdown report rendering |
//! | [`review`] | End-to-end review workflow |

pub mod config;
pub mod context;
pub mod db;
pub mod embedding;
pub mod github;
pub mod indexer;
pub mod inspect;
pub mod llm;
pub mod migrate;
pub mod normalize;
pub mod report;
pub mod review;
pub mod store;
