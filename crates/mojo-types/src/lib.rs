//! Mojo Types - Canonical domain types for the credibility/mojo economy
//!
//! This crate contains all foundational types for the mojo core with zero
//! dependencies on other mojo crates. It defines the complete type system
//! for:
//!
//! - Identity types (UserId, GroupId, QuestId, etc.)
//! - The Mojo currency and the static rank ladder
//! - Odds and payout math for prophecy/curse wagers
//! - Quest and speculation records with tagged lifecycle states
//! - Weekly goal records and per-user statistics
//!
//! # Architectural invariants
//!
//! 1. Rank 1 costs nothing, requires nothing, and can never be demoted from
//! 2. Wager odds are frozen at request time from the *receiver's* credibility
//! 3. Illegal lifecycle combinations are unrepresentable (tagged states,
//!    not bundles of optional status fields)
//! 4. Mojo balances never go negative; the ledger fails closed

pub mod error;
pub mod goal;
pub mod identity;
pub mod mojo;
pub mod odds;
pub mod quest;
pub mod rank;
pub mod speculation;
pub mod statistics;

pub use error::*;
pub use goal::*;
pub use identity::*;
pub use mojo::*;
pub use odds::*;
pub use quest::*;
pub use rank::*;
pub use speculation::*;
pub use statistics::*;
