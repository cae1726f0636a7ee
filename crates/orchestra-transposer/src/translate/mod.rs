// crates/orchestra-transposer/src/translate/mod.rs

//! The four schema translators.
//!
//! Every translator follows the same shape: metadata mapping, then leaf
//! collections (datatypes, codesets), then the field catalogue, then
//! recursive structure expansion, then emit. Decode findings are fatal to a
//! conversion; dangling references and oversized names degrade gracefully
//! with a logged warning and a placeholder.

mod orchestra_to_sbe;
mod orchestra_to_unified;
mod sbe_to_orchestra;
mod unified_to_orchestra;
mod updater;

pub use orchestra_to_sbe::Orchestra2Sbe;
pub use orchestra_to_unified::Orchestra2Unified;
pub use sbe_to_orchestra::{Sbe2Orchestra, SbeSource};
pub use unified_to_orchestra::{RepositoryVersion, Unified2Orchestra};
pub use updater::OrchestraUpdater;

/// Local timestamp in the ISO form generated repositories carry.
pub(crate) fn timestamp() -> String {
    chrono::Local::now()
        .naive_local()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
