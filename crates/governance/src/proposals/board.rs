//! Board proposals
//!
//! Creating a board and changing its editors is decided by the parent
//! collective; updates and pins by the board's editors.

use synergy_actions::{BoardEditor, Pin, UpdateBoard, Vote};
use synergy_crypto::Hash;

use crate::collective::{Collective, UnnamedCollective};
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::{Board, ObjectGraph};
use crate::index::Hooks;
use crate::proposals::{Proposal, ProposalKind};

fn live_board<'a>(graph: &'a mut ObjectGraph, name: &str) -> GovernanceResult<&'a mut Board> {
    graph
        .board_mut(name)
        .ok_or_else(|| GovernanceError::NotFound(format!("board {}", name)))
}

/// A new board awaiting its collective's approval
#[derive(Debug)]
pub struct PendingBoard {
    pub board: Board,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingBoard {
    pub fn new(board: Board, collective: Collective) -> Self {
        Self {
            hash: board.hash,
            board,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingBoard {
    ballot_box!(ProposalKind::CreateBoard, collective);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        if graph.boards.contains_key(&self.hash) {
            return Err(GovernanceError::Conflict(format!(
                "board {} already exists",
                self.board.name
            )));
        }
        hooks.index(|indexer| indexer.add_board_to_collective(&self.board, &self.collective.name));
        graph.boards.insert(self.hash, self.board);
        Ok(())
    }
}

#[derive(Debug)]
pub struct PendingUpdateBoard {
    pub update: UpdateBoard,
    pub editors: UnnamedCollective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingUpdateBoard {
    pub fn new(update: UpdateBoard, editors: UnnamedCollective) -> Self {
        Self {
            hash: update.hashed(),
            update,
            editors,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingUpdateBoard {
    ballot_box!(ProposalKind::UpdateBoard, editors);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let board = live_board(graph, &self.update.board)?;
        if let Some(pin_majority) = self.update.pin_majority {
            board.editors.change_majority(pin_majority);
        }
        if let Some(description) = self.update.description {
            board.description = description;
        }
        if let Some(keywords) = self.update.keywords {
            board.keywords = keywords;
        }
        Ok(())
    }
}

/// Pin or unpin a draft. Board and draft reference each other, so both
/// sides change together.
#[derive(Debug)]
pub struct PendingPin {
    pub pin: Pin,
    pub editors: UnnamedCollective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingPin {
    pub fn new(pin: Pin, editors: UnnamedCollective) -> Self {
        Self {
            hash: pin.hashed(),
            pin,
            editors,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingPin {
    ballot_box!(ProposalKind::Pin, editors);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let Pin { board: name, draft, pin, .. } = self.pin;
        if !graph.drafts.contains_key(&draft) {
            return Err(GovernanceError::NotFound(format!("draft {}", draft)));
        }
        let board = live_board(graph, &name)?;
        if pin {
            board.pin(draft)?;
        } else {
            board.unpin(&draft)?;
        }
        if let Some(draft) = graph.drafts.get_mut(&draft) {
            if pin {
                draft.pinned.push(name);
            } else {
                draft.pinned.retain(|board| board != &name);
            }
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PendingBoardEditor {
    pub editor: BoardEditor,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingBoardEditor {
    pub fn new(editor: BoardEditor, collective: Collective) -> Self {
        Self {
            hash: editor.hashed(),
            editor,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingBoardEditor {
    ballot_box!(ProposalKind::BoardEditor, collective);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let board = live_board(graph, &self.editor.board)?;
        if self.editor.insert {
            board.editors.members.insert(self.editor.editor);
        } else {
            board.editors.members.remove(&self.editor.editor);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collective::Electorate;
    use crate::graph::Draft;
    use synergy_actions::Policy;
    use synergy_crypto::Token;

    fn token(n: u8) -> Token {
        Token::new([n; 32])
    }

    fn board() -> Board {
        Board {
            name: "news".into(),
            keywords: vec![],
            description: String::new(),
            collective: "A".into(),
            editors: UnnamedCollective::new(50, [token(1)]),
            pinned: vec![],
            hash: Hash::of(b"news"),
        }
    }

    fn draft(hash: Hash) -> Draft {
        Draft {
            title: "t".into(),
            date: 1,
            description: String::new(),
            authors: Electorate::Unnamed(UnnamedCollective::new(100, [token(1)])),
            content_type: "md".into(),
            hash,
            previous: None,
            keywords: vec![],
            references: vec![],
            votes: vec![],
            pinned: vec![],
            edits: vec![],
            approved: true,
        }
    }

    fn collective() -> Collective {
        Collective::founded_by("A".into(), String::new(), token(1), Policy::new(50, 50))
    }

    #[test]
    fn test_create_board_conflict() {
        let mut graph = ObjectGraph::new(1);
        Box::new(PendingBoard::new(board(), collective()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        let again = Box::new(PendingBoard::new(board(), collective()))
            .apply(&mut graph, &mut Hooks::default());
        assert!(matches!(again, Err(GovernanceError::Conflict(_))));
    }

    #[test]
    fn test_pin_is_symmetric() {
        let mut graph = ObjectGraph::new(1);
        let hash = Hash::of(b"draft");
        graph.boards.insert(Hash::of(b"news"), board());
        graph.drafts.insert(hash, draft(hash));
        let pin = |epoch, pin| Pin {
            epoch,
            author: token(1),
            reasons: String::new(),
            board: "news".into(),
            draft: hash,
            pin,
        };
        let editors = board().editors;
        Box::new(PendingPin::new(pin(1, true), editors.clone()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        assert_eq!(graph.board("news").unwrap().pinned, vec![hash]);
        assert_eq!(graph.drafts[&hash].pinned, vec!["news".to_string()]);

        Box::new(PendingPin::new(pin(2, false), editors))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        assert!(graph.board("news").unwrap().pinned.is_empty());
        assert!(graph.drafts[&hash].pinned.is_empty());
    }

    #[test]
    fn test_board_editor_and_update() {
        let mut graph = ObjectGraph::new(1);
        graph.boards.insert(Hash::of(b"news"), board());
        let editor = BoardEditor {
            epoch: 1,
            author: token(1),
            reasons: String::new(),
            board: "news".into(),
            editor: token(2),
            insert: true,
        };
        Box::new(PendingBoardEditor::new(editor, collective()))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        let update = UpdateBoard {
            epoch: 2,
            author: token(1),
            reasons: String::new(),
            board: "news".into(),
            description: Some("daily".into()),
            keywords: None,
            pin_majority: Some(100),
        };
        let editors = graph.board("news").unwrap().editors.clone();
        Box::new(PendingUpdateBoard::new(update, editors))
            .apply(&mut graph, &mut Hooks::default())
            .unwrap();
        let board = graph.board("news").unwrap();
        assert_eq!(board.editors.members.len(), 2);
        assert_eq!(board.editors.majority, 100);
        assert_eq!(board.description, "daily");
    }
}
