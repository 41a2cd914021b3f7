//! # arksave
//!
//! Read-only extraction of creature records from ARK save containers:
//! - Interned name table built from the save header
//! - Value-prefix range scans in place of a secondary index
//! - Property stream decoding of engine object blobs
//! - Creature assembly from instance and status blobs
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! │              (NameTable + store handle, query)               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │  Locator    │          │   Creature   │
//!   │ (ranges)    │          │   Builder    │
//!   └──────┬──────┘          └──────┬───────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────┐          ┌──────────────┐
//!   │ SaveStore   │          │   Decoder    │
//!   │ (scans)     │          │  (property   │
//!   └─────────────┘          │   stream)    │
//!                            └──────┬───────┘
//!                                   │
//!                                   ▼
//!                            ┌──────────────┐
//!                            │  NameTable   │
//!                            └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod diagnostics;

pub mod names;
pub mod store;
pub mod locator;
pub mod decoder;
pub mod creature;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ArkError, Result};
pub use config::Config;
pub use diagnostics::Diagnostic;
pub use names::{NameId, NameTable};
pub use creature::{CreatureRecord, StatPoints};
pub use session::{QueryOutput, Session};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of arksave
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
