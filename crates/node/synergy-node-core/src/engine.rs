//! Single-owner intake for the governance state
//!
//! The [`State`] lives inside one tokio task and is reached only through an
//! [`EngineHandle`]. Commands are queued on a bounded channel and applied one
//! at a time, each to completion, so no two actions ever observe each other
//! half-applied.

use synergy_actions::Action;
use synergy_crypto::Hash;
use synergy_governance::{GovernanceResult, Pool, State};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{NodeError, NodeResult};

/// Requests understood by the engine task
#[derive(Debug)]
pub enum Command {
    Apply {
        action: Action,
        reply: oneshot::Sender<GovernanceResult<()>>,
    },
    NextBlock {
        epoch: u64,
        reply: oneshot::Sender<Vec<Hash>>,
    },
    Pooling {
        hash: Hash,
        reply: oneshot::Sender<Option<Pool>>,
    },
    Shutdown,
}

/// Owner of the governance state
pub struct Engine {
    state: State,
    commands: mpsc::Receiver<Command>,
}

impl Engine {
    /// Move `state` into a new task and return the handle that feeds it.
    /// The task yields the state back once it shuts down.
    pub fn spawn(state: State, capacity: usize) -> (EngineHandle, JoinHandle<State>) {
        let (tx, rx) = mpsc::channel(capacity);
        let engine = Engine {
            state,
            commands: rx,
        };
        (EngineHandle { commands: tx }, tokio::spawn(engine.run()))
    }

    async fn run(mut self) -> State {
        debug!("engine started");
        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Apply { action, reply } => {
                    let kind = action.kind_name();
                    let author = action.author();
                    let result = self.state.apply(action);
                    if let Err(error) = &result {
                        warn!(kind, author = %author, error = %error, "action rejected");
                    }
                    let _ = reply.send(result);
                }
                Command::NextBlock { epoch, reply } => {
                    let expired = self.state.next_block(epoch);
                    let _ = reply.send(expired);
                }
                Command::Pooling { hash, reply } => {
                    let _ = reply.send(self.state.pooling(&hash));
                }
                Command::Shutdown => break,
            }
        }
        info!(
            epoch = self.state.epoch(),
            pending = self.state.proposals().len(),
            "engine stopped"
        );
        self.state
    }
}

/// Cloneable sender side of the engine
#[derive(Debug, Clone)]
pub struct EngineHandle {
    commands: mpsc::Sender<Command>,
}

impl EngineHandle {
    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> NodeResult<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| NodeError::EngineStopped)?;
        response.await.map_err(|_| NodeError::EngineStopped)
    }

    /// Apply one action; a governance rejection surfaces as
    /// [`NodeError::Governance`]
    pub async fn apply(&self, action: Action) -> NodeResult<()> {
        self.request(|reply| Command::Apply { action, reply })
            .await?
            .map_err(NodeError::from)
    }

    /// Advance to `epoch` and return the proposals that expired
    pub async fn next_block(&self, epoch: u64) -> NodeResult<Vec<Hash>> {
        self.request(|reply| Command::NextBlock { epoch, reply }).await
    }

    pub async fn pooling(&self, hash: Hash) -> NodeResult<Option<Pool>> {
        self.request(|reply| Command::Pooling { hash, reply }).await
    }

    pub async fn shutdown(&self) -> NodeResult<()> {
        self.commands
            .send(Command::Shutdown)
            .await
            .map_err(|_| NodeError::EngineStopped)
    }
}
