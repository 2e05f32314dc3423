//! Stateful ledger engine for Saldo.
//!
//! This crate owns all shared mutable ledger state and the locking
//! discipline around it. It wires the pure logic from `saldo-core` into a
//! concurrency-safe engine:
//!
//! - `registry` - account registry with guarded balances
//! - `journal` - journal entry store
//! - `posting` - the Draft -> Posted transition
//! - `closing` - fiscal period closing
//! - `history` - closing history queries
//! - `engine` - the facade tying everything together
//!
//! Transport, authentication, and persistence are external collaborators:
//! every operation takes plain data (including an opaque caller identity)
//! and returns plain data or a typed [`saldo_core::ledger::LedgerError`].

pub mod closing;
pub mod engine;
pub mod history;
pub mod journal;
pub mod posting;
pub mod registry;

mod fiscal;

pub use engine::LedgerEngine;
pub use fiscal::PeriodStore;
pub use history::{ClosingHistory, LastClosingInfo};
pub use journal::JournalStore;
pub use posting::PostingEngine;
pub use registry::AccountRegistry;
