//! Outbound notifications
//!
//! The engine reports what it does to an optional [`Indexer`] (activity
//! feeds, outstanding-ballot lists) and an optional [`Notifier`] channel.
//! Both see a resolved proposal only after it left the registry.

use std::collections::BTreeSet;

use synergy_actions::Action;
use synergy_crypto::{Hash, Token};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::graph::{Board, Draft, Edit, Event, Stamp};

/// Secondary index fed by the engine
#[cfg_attr(test, mockall::automock)]
pub trait Indexer {
    /// Every intake action, whatever its outcome
    fn index_action(&mut self, action: &Action);

    /// `electorate` has an outstanding ballot on `hash`
    fn index_vote_hash(&mut self, electorate: &BTreeSet<Token>, hash: &Hash);

    /// Nobody needs to vote on `hash` anymore
    fn remove_vote_hash(&mut self, hash: &Hash);

    /// Called once per resolved proposal
    fn index_consensus(&mut self, hash: &Hash, approved: bool);

    fn add_member(&mut self, _token: &Token, _handle: &str) {}

    fn add_board_to_collective(&mut self, _board: &Board, _collective: &str) {}

    fn add_event_to_collective(&mut self, _event: &Event, _collective: &str) {}

    fn remove_event_from_collective(&mut self, _event: &Event, _collective: &str) {}

    fn add_stamp_to_collective(&mut self, _stamp: &Stamp, _collective: &str) {}

    fn add_draft(&mut self, _draft: &Draft) {}

    fn add_edit(&mut self, _edit: &Edit) {}

    fn add_checkin(&mut self, _attendee: &Token, _event: &Event) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    AcceptProposal,
    RejectProposal,
    ExpireProposal,
}

/// A proposal left the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Updated {
    pub action: NotifyAction,
    pub hash: Hash,
}

pub type Notifier = UnboundedSender<Updated>;

/// The engine's outbound collaborators
#[derive(Default)]
pub struct Hooks {
    pub indexer: Option<Box<dyn Indexer + Send>>,
    pub notifier: Option<Notifier>,
}

impl Hooks {
    pub fn new(indexer: Option<Box<dyn Indexer + Send>>, notifier: Option<Notifier>) -> Self {
        Self { indexer, notifier }
    }

    /// Run `f` against the indexer, if one is installed
    pub fn index(&mut self, f: impl FnOnce(&mut dyn Indexer)) {
        if let Some(indexer) = self.indexer.as_deref_mut() {
            f(indexer);
        }
    }

    pub fn notify(&self, action: NotifyAction, hash: Hash) {
        if let Some(notifier) = &self.notifier {
            if notifier.send(Updated { action, hash }).is_err() {
                debug!(hash = %hash, "notification receiver dropped");
            }
        }
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("indexer", &self.indexer.is_some())
            .field("notifier", &self.notifier.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn test_notify_without_receiver_is_silent() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let hooks = Hooks::new(None, Some(tx));
        hooks.notify(NotifyAction::ExpireProposal, Hash::ZERO);
    }

    #[test]
    fn test_index_reaches_indexer() {
        let mut mock = MockIndexer::new();
        mock.expect_remove_vote_hash()
            .withf(|hash| *hash == Hash::of(b"p"))
            .times(1)
            .return_const(());
        let mut hooks = Hooks::new(Some(Box::new(mock)), None);
        hooks.index(|indexer| indexer.remove_vote_hash(&Hash::of(b"p")));
    }
}
