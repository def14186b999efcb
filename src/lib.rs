//! # FieldDesk
//!
//! A local-first constituent intake and follow-up tracker for campaign
//! field offices.
//!
//! Public intake forms (event requests, volunteer signups, live field
//! contact capture, business cards) feed a per-office SQLite store of
//! contacts, provenance records, and staff follow-ups, exposed through a
//! CLI (`fdesk`) and a JSON HTTP API, with a best-effort push of each
//! follow-up bundle to an optional remote endpoint.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────┐
//! │ Form modules│──▶│   Intake     │──▶│  SQLite   │
//! │ 4 intakes   │   │  pipeline    │   │ 6 tables  │
//! └─────────────┘   └──────┬──────┘   └────┬─────┘
//!                          │               │
//!                     best-effort      ┌───┴──────┐
//!                          ▼           ▼          ▼
//!                    ┌──────────┐ ┌────────┐ ┌────────┐
//!                    │  remote  │ │  CLI   │ │  HTTP  │
//!                    │   sync   │ │(fdesk) │ │ board  │
//!                    └──────────┘ └────────┘ └────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! fdesk init                         # create database
//! fdesk serve api                    # accept form submissions
//! fdesk followups list               # staff triage
//! fdesk import contacts rows.jsonl   # bulk load a voter-file export
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core record types |
//! | [`store`] | SQLite contact store and merge policy |
//! | [`intake`] | Intake pipeline orchestration |
//! | [`forms`] | Form-module validation and mapping |
//! | [`board`] | Staff follow-up board |
//! | [`sync`] | Best-effort remote follow-up push |
//! | [`server`] | JSON HTTP API |
//! | [`import`] | JSON-lines bulk contact import |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |

pub mod board;
pub mod config;
pub mod db;
pub mod forms;
pub mod import;
pub mod intake;
pub mod migrate;
pub mod models;
pub mod server;
pub mod store;
pub mod sync;
