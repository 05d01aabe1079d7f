//! A DataLayer singleton wallet core: tracks, advances and rebases the
//! chain of authenticated-root singletons a DataLayer store publishes
//! under, independent of any particular chain client or wallet backend.
//!
//! See `SPEC_FULL.md` at the workspace root for the full module map; each
//! submodule here corresponds to one of its components.

pub mod collaborators;
pub mod error;
pub mod fork;
pub mod launcher;
pub mod offer;
pub mod record;
pub mod store;
pub mod successor;
pub mod sync;
pub mod transaction;
pub mod types;
pub mod wallet;
pub mod wallet_event;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod scenario_tests;

pub use error::{DataLayerError, Result};
pub use record::{LauncherInfo, LineageProof, SingletonRecord};
pub use transaction::TransactionRecord;
pub use wallet::{DataLayerWallet, EventSink, WalletConfig};
pub use wallet_event::DataLayerEvent;
