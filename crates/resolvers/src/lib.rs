//! `NameResolver` implementations backed by external profile services.
//!
//! Two interchangeable backends exist: a generic web3.bio profile lookup
//! and a Farcaster username search. Both honor the collaborator contract
//! from `mention-core`: a bounded per-lookup timeout, and `None` for every
//! failure mode instead of an error.

pub mod farcaster;
pub mod web3bio;

pub use farcaster::FarcasterResolver;
pub use web3bio::Web3BioResolver;

use core::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);
