//! Synergy
//!
//! Proposal and consensus resolution engine for collective social
//! governance: collectives, boards, drafts, releases and events that change
//! only through proposals ratified by their electorate.

/// Module version information
pub mod version {
    /// The current version of the Synergy library
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// Re-export core components for easy access
pub mod core {
    pub use synergy_common as common;
    pub use synergy_crypto as crypto;
}

pub use synergy_actions as actions;
pub use synergy_governance as governance;

/// Node implementation components
pub mod node {
    pub use synergy_node_core as core;
}
