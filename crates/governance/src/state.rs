//! The action dispatcher
//!
//! [`State`] receives one parsed action at a time. It checks the action's
//! preconditions against the live graph, opens the matching proposal with a
//! frozen electorate and casts the proposer's own approving ballot, which
//! may resolve the proposal on the spot. Nothing here is shared: callers
//! serialize access by owning the state.

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use synergy_actions::{
    Action, BoardEditor, CancelEvent, CheckinEvent, CreateBoard, CreateCollective, CreateEvent,
    Draft as DraftAction, Edit as EditAction, GreetCheckinEvent, ImprintStamp, Pin, Policy, React,
    ReleaseDraft, RemoveMember, RequestMembership, Signin, UpdateBoard, UpdateCollective, UpdateEvent,
    Vote,
};
use synergy_crypto::{Hash, Token};
use tracing::{debug, info};

use crate::collective::{Collective, Consensual, Electorate, UnnamedCollective};
use crate::config::GovernanceConfig;
use crate::deadline::Deadlines;
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::{Board, Checkin, Draft, Edit, Event, ObjectGraph, Release, Stamp};
use crate::index::{Hooks, Indexer, Notifier, NotifyAction};
use crate::proposals::event::checkin_key;
use crate::proposals::{
    PendingBoard, PendingBoardEditor, PendingCancelEvent, PendingCheckinGreet, PendingDraft,
    PendingEdit, PendingEvent, PendingEventUpdate, PendingPin, PendingRelease, PendingRemoveMember,
    PendingRequestMembership, PendingStamp, PendingUpdateBoard, PendingUpdateCollective, Proposal,
};
use crate::registry::{Pool, Proposals};

/// Reasons recorded on the proposer's own ballot
pub const SELF_VOTE_REASONS: &str = "commit";

/// Majority of ad-hoc author groups without an explicit policy
const UNANIMITY: u8 = 100;

fn check_percentage(name: &str, value: u8) -> GovernanceResult<()> {
    if value > synergy_actions::policy::MAX_PERCENTAGE {
        return Err(GovernanceError::InvalidPolicy(format!("{} {} exceeds 100", name, value)));
    }
    Ok(())
}

fn not_found(what: impl std::fmt::Display) -> GovernanceError {
    GovernanceError::NotFound(what.to_string())
}

/// Ad-hoc group of an author and their co-authors
fn co_authorship(majority: u8, author: Token, co_authors: &[Token]) -> Electorate {
    let members = std::iter::once(author).chain(co_authors.iter().copied());
    Electorate::Unnamed(UnnamedCollective::new(majority, members))
}

/// Governance state: the live graph plus everything pending on it
#[derive(Debug)]
pub struct State {
    epoch: u64,
    config: GovernanceConfig,
    graph: ObjectGraph,
    proposals: Proposals,
    deadlines: Deadlines,
    hooks: Hooks,
}

impl State {
    pub fn new(config: GovernanceConfig) -> Self {
        Self {
            epoch: 0,
            graph: ObjectGraph::new(config.reactions_count),
            proposals: Proposals::new(),
            deadlines: Deadlines::new(),
            hooks: Hooks::default(),
            config,
        }
    }

    pub fn with_hooks(config: GovernanceConfig, hooks: Hooks) -> Self {
        Self {
            hooks,
            ..Self::new(config)
        }
    }

    pub fn set_indexer(&mut self, indexer: Box<dyn Indexer + Send>) {
        self.hooks.indexer = Some(indexer);
    }

    pub fn set_notifier(&mut self, notifier: Notifier) {
        self.hooks.notifier = Some(notifier);
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    pub fn graph(&self) -> &ObjectGraph {
        &self.graph
    }

    pub fn proposals(&self) -> &Proposals {
        &self.proposals
    }

    pub fn deadlines(&self) -> &Deadlines {
        &self.deadlines
    }

    pub fn pooling(&self, hash: &Hash) -> Option<Pool> {
        self.proposals.pooling(hash)
    }

    /// Wall-clock time of `epoch`: genesis plus one second per epoch
    pub fn time_of_epoch(&self, epoch: u64) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(epoch).ok()?;
        self.config
            .genesis_time
            .checked_add_signed(Duration::try_seconds(seconds)?)
    }

    /// Advance to `epoch`, expiring every proposal whose deadline has
    /// passed. Returns the expired hashes.
    pub fn next_block(&mut self, epoch: u64) -> Vec<Hash> {
        self.epoch = epoch;
        let mut expired = Vec::new();
        for hash in self.deadlines.expire(epoch) {
            if self.proposals.delete(&hash, &mut self.hooks).is_some() {
                info!(hash = %hash, epoch, "proposal expired");
                self.hooks.notify(NotifyAction::ExpireProposal, hash);
                expired.push(hash);
            }
        }
        expired
    }

    /// Apply one action
    pub fn apply(&mut self, action: Action) -> GovernanceResult<()> {
        self.hooks.index(|indexer| indexer.index_action(&action));
        debug!(
            kind = action.kind_name(),
            author = %action.author(),
            epoch = action.epoch(),
            "applying action"
        );
        match action {
            Action::Vote(vote) => self.cast(vote),
            Action::Signin(signin) => self.signin(signin),
            Action::React(react) => self.react(react),
            Action::CreateCollective(create) => self.create_collective(create),
            Action::UpdateCollective(update) => self.update_collective(update),
            Action::RequestMembership(request) => self.request_membership(request),
            Action::RemoveMember(remove) => self.remove_member(remove),
            Action::Draft(draft) => self.draft(draft),
            Action::Edit(edit) => self.edit(edit),
            Action::ReleaseDraft(release) => self.release_draft(release),
            Action::ImprintStamp(stamp) => self.imprint_stamp(stamp),
            Action::CreateBoard(board) => self.create_board(board),
            Action::UpdateBoard(update) => self.update_board(update),
            Action::Pin(pin) => self.pin(pin),
            Action::BoardEditor(editor) => self.board_editor(editor),
            Action::CreateEvent(create) => self.create_event(create),
            Action::CancelEvent(cancel) => self.cancel_event(cancel),
            Action::UpdateEvent(update) => self.update_event(update),
            Action::CheckinEvent(checkin) => self.checkin_event(checkin),
            Action::GreetCheckinEvent(greet) => self.greet_checkin_event(greet),
        }
    }

    /// Register a record, schedule its expiry and cast the proposer's ballot
    fn open(&mut self, record: Box<dyn Proposal>, author: Token, epoch: u64) -> GovernanceResult<()> {
        let hash = self.register(record, epoch)?;
        self.cast(Vote {
            epoch,
            author,
            reasons: SELF_VOTE_REASONS.to_string(),
            hash,
            approve: true,
        })
    }

    fn register(&mut self, record: Box<dyn Proposal>, epoch: u64) -> GovernanceResult<Hash> {
        let kind = record.kind();
        let hash = self.proposals.add(record, &mut self.hooks)?;
        let deadline = epoch.saturating_add(self.config.proposal_deadline);
        self.deadlines.set(deadline, hash);
        debug!(hash = %hash, kind = %kind, deadline, "proposal opened");
        Ok(hash)
    }

    fn cast(&mut self, vote: Vote) -> GovernanceResult<()> {
        let hash = vote.hash;
        let outcome = self
            .proposals
            .incorporate_vote(vote, &mut self.graph, &mut self.hooks);
        self.settle_deadline(&hash);
        outcome.map(|_| ())
    }

    fn settle_deadline(&mut self, hash: &Hash) {
        if !self.proposals.has(hash) {
            self.deadlines.clear(hash);
        }
    }

    fn require_member(&self, token: &Token) -> GovernanceResult<()> {
        if self.graph.is_member(token) {
            Ok(())
        } else {
            Err(GovernanceError::NotAMember(format!("{} has not signed in", token)))
        }
    }

    fn collective(&self, name: &str) -> GovernanceResult<&Collective> {
        self.graph
            .collective(name)
            .ok_or_else(|| not_found(format_args!("collective {}", name)))
    }

    fn member_of<'a>(&'a self, name: &str, token: &Token) -> GovernanceResult<&'a Collective> {
        let collective = self.collective(name)?;
        if !collective.is_member(token) {
            return Err(GovernanceError::NotAMember(format!("{} is not in {}", token, name)));
        }
        Ok(collective)
    }

    fn board(&self, name: &str) -> GovernanceResult<&Board> {
        self.graph
            .board(name)
            .ok_or_else(|| not_found(format_args!("board {}", name)))
    }

    fn event(&self, hash: &Hash) -> GovernanceResult<&Event> {
        self.graph
            .events
            .get(hash)
            .ok_or_else(|| not_found(format_args!("event {}", hash)))
    }

    fn managed_event(&self, hash: &Hash, author: &Token) -> GovernanceResult<&Event> {
        let event = self.event(hash)?;
        if !event.managers.is_member(author) {
            return Err(GovernanceError::Unauthorized(format!(
                "{} does not manage event {}",
                author, hash
            )));
        }
        Ok(event)
    }

    fn signin(&mut self, signin: Signin) -> GovernanceResult<()> {
        if self.graph.is_member(&signin.author) {
            return Err(GovernanceError::AlreadyExists(format!("member {}", signin.author)));
        }
        if self.graph.handles.contains_key(&signin.handle) {
            return Err(GovernanceError::AlreadyExists(format!("handle {}", signin.handle)));
        }
        self.hooks
            .index(|indexer| indexer.add_member(&signin.author, &signin.handle));
        self.graph.handles.insert(signin.handle.clone(), signin.author);
        self.graph.members.insert(signin.author, signin.handle);
        Ok(())
    }

    fn react(&mut self, react: React) -> GovernanceResult<()> {
        let counts = self
            .graph
            .reactions
            .get_mut(usize::from(react.reaction))
            .ok_or_else(|| not_found(format_args!("reaction {}", react.reaction)))?;
        *counts.entry(react.hash).or_insert(0) += 1;
        Ok(())
    }

    /// Collectives are created outright with the author as sole member
    fn create_collective(&mut self, create: CreateCollective) -> GovernanceResult<()> {
        self.require_member(&create.author)?;
        let hash = create.hashed();
        if self.graph.collectives.contains_key(&hash) {
            return Err(GovernanceError::AlreadyExists(format!("collective {}", create.name)));
        }
        check_percentage("majority", create.policy.majority)?;
        check_percentage("super majority", create.policy.super_majority)?;
        let collective =
            Collective::founded_by(create.name, create.description, create.author, create.policy);
        info!(collective = %collective.name, "collective created");
        self.graph.collectives.insert(hash, collective);
        Ok(())
    }

    fn update_collective(&mut self, update: UpdateCollective) -> GovernanceResult<()> {
        let photo = self.member_of(&update.on_behalf_of, &update.author)?.photo();
        if let Some(majority) = update.majority {
            check_percentage("majority", majority)?;
        }
        if let Some(super_majority) = update.super_majority {
            check_percentage("super majority", super_majority)?;
        }
        let (author, epoch) = (update.author, update.epoch);
        self.open(Box::new(PendingUpdateCollective::new(update, photo)), author, epoch)
    }

    /// Joining takes a vote; leaving is immediate
    fn request_membership(&mut self, request: RequestMembership) -> GovernanceResult<()> {
        self.require_member(&request.author)?;
        let collective = self.collective(&request.collective)?;
        let is_member = collective.is_member(&request.author);
        if request.include && is_member {
            return Err(GovernanceError::AlreadyExists(format!(
                "{} already in {}",
                request.author, request.collective
            )));
        }
        if !request.include {
            if !is_member {
                return Err(GovernanceError::NotAMember(format!(
                    "{} is not in {}",
                    request.author, request.collective
                )));
            }
            if let Some(live) = self.graph.collective_mut(&request.collective) {
                live.remove_member(&request.author);
            }
            return Ok(());
        }
        let photo = collective.photo();
        let (author, epoch) = (request.author, request.epoch);
        self.open(Box::new(PendingRequestMembership::new(request, photo)), author, epoch)
    }

    /// Removing someone else takes a vote; removing oneself is immediate
    fn remove_member(&mut self, remove: RemoveMember) -> GovernanceResult<()> {
        let collective = self.member_of(&remove.on_behalf_of, &remove.author)?;
        if !collective.is_member(&remove.member) {
            return Err(GovernanceError::NotAMember(format!(
                "{} is not in {}",
                remove.member, remove.on_behalf_of
            )));
        }
        if remove.author == remove.member {
            let hash = remove.hashed();
            if let Some(live) = self.graph.collective_mut(&remove.on_behalf_of) {
                live.remove_member(&remove.member);
            }
            self.hooks.index(|indexer| indexer.index_consensus(&hash, true));
            return Ok(());
        }
        let photo = collective.photo();
        let (author, epoch) = (remove.author, remove.epoch);
        self.open(Box::new(PendingRemoveMember::new(remove, photo)), author, epoch)
    }

    fn claimed(&self, hash: &Hash) -> bool {
        self.graph.drafts.contains_key(hash) || self.graph.edits.contains_key(hash)
    }

    fn draft(&mut self, draft: DraftAction) -> GovernanceResult<()> {
        let hash = draft.hashed();
        if self.claimed(&hash) {
            return Err(GovernanceError::AlreadyExists(format!("content {}", hash)));
        }
        let previous = draft.previous_draft.filter(|previous| !previous.is_zero());
        let previous_authors = match &previous {
            Some(previous) => {
                let prior = self
                    .graph
                    .drafts
                    .get(previous)
                    .ok_or_else(|| not_found(format_args!("draft {}", previous)))?;
                if !prior.authors.is_member(&draft.author) {
                    return Err(GovernanceError::Unauthorized(format!(
                        "{} is not an author of {}",
                        draft.author, previous
                    )));
                }
                Some(self.graph.electorate_photo(&prior.authors))
            }
            None => None,
        };
        let authors = if !draft.co_authors.is_empty() {
            let majority = match draft.policy {
                Some(Policy { majority, .. }) => {
                    check_percentage("majority", majority)?;
                    majority
                }
                None => UNANIMITY,
            };
            co_authorship(majority, draft.author, &draft.co_authors)
        } else if let Some(name) = &draft.on_behalf_of {
            Electorate::Named(self.member_of(name, &draft.author)?.photo())
        } else {
            co_authorship(UNANIMITY, draft.author, &[])
        };
        let (author, epoch) = (draft.author, draft.epoch);
        let object = Draft {
            title: draft.title,
            date: draft.epoch,
            description: draft.description,
            authors,
            content_type: draft.content_type,
            hash,
            previous,
            keywords: draft.keywords,
            references: draft.references,
            votes: Vec::new(),
            pinned: Vec::new(),
            edits: Vec::new(),
            approved: false,
        };
        self.open(Box::new(PendingDraft::new(object, previous_authors)), author, epoch)
    }

    fn edit(&mut self, edit: EditAction) -> GovernanceResult<()> {
        let hash = edit.hashed();
        if self.claimed(&hash) {
            return Err(GovernanceError::AlreadyExists(format!("content {}", hash)));
        }
        let draft = self
            .graph
            .drafts
            .get(&edit.edited_draft)
            .ok_or_else(|| not_found(format_args!("draft {}", edit.edited_draft)))?;
        let draft_authors = self.graph.electorate_photo(&draft.authors);
        let authors = match &edit.on_behalf_of {
            Some(name) => Electorate::Named(self.member_of(name, &edit.author)?.photo()),
            None => co_authorship(UNANIMITY, edit.author, &edit.co_authors),
        };
        let object = Edit {
            authors,
            date: edit.epoch,
            reasons: edit.reasons,
            draft: edit.edited_draft,
            content_type: edit.content_type,
            hash,
            votes: Vec::new(),
        };
        self.open(Box::new(PendingEdit::new(object, draft_authors)), edit.author, edit.epoch)
    }

    fn release_draft(&mut self, release: ReleaseDraft) -> GovernanceResult<()> {
        let draft = self
            .graph
            .drafts
            .get(&release.content_hash)
            .ok_or_else(|| not_found(format_args!("draft {}", release.content_hash)))?;
        if !draft.authors.is_member(&release.author) {
            return Err(GovernanceError::Unauthorized(format!(
                "{} is not an author of {}",
                release.author, release.content_hash
            )));
        }
        if self.graph.releases.contains_key(&release.content_hash) {
            return Err(GovernanceError::AlreadyExists(format!(
                "release of {}",
                release.content_hash
            )));
        }
        let authors = self.graph.electorate_photo(&draft.authors);
        let object = Release {
            epoch: release.epoch,
            draft: release.content_hash,
            hash: release.hashed(),
            votes: Vec::new(),
            stamps: Vec::new(),
        };
        self.open(Box::new(PendingRelease::new(object, authors)), release.author, release.epoch)
    }

    fn imprint_stamp(&mut self, stamp: ImprintStamp) -> GovernanceResult<()> {
        self.require_member(&stamp.author)?;
        if !self.graph.releases.contains_key(&stamp.hash) {
            return Err(not_found(format_args!("release of {}", stamp.hash)));
        }
        let reputation = self.member_of(&stamp.on_behalf_of, &stamp.author)?.photo();
        let object = Stamp {
            reputation: stamp.on_behalf_of.clone(),
            release: stamp.hash,
            hash: stamp.hashed(),
            votes: Vec::new(),
        };
        self.open(Box::new(PendingStamp::new(object, reputation)), stamp.author, stamp.epoch)
    }

    fn create_board(&mut self, create: CreateBoard) -> GovernanceResult<()> {
        self.require_member(&create.author)?;
        if self.graph.board(&create.name).is_some() {
            return Err(GovernanceError::AlreadyExists(format!("board {}", create.name)));
        }
        check_percentage("pin majority", create.pin_majority)?;
        let photo = self.member_of(&create.on_behalf_of, &create.author)?.photo();
        let board = Board {
            hash: create.hashed(),
            name: create.name,
            keywords: create.keywords,
            description: create.description,
            collective: create.on_behalf_of,
            editors: UnnamedCollective::new(create.pin_majority, [create.author]),
            pinned: Vec::new(),
        };
        self.open(Box::new(PendingBoard::new(board, photo)), create.author, create.epoch)
    }

    fn update_board(&mut self, update: UpdateBoard) -> GovernanceResult<()> {
        self.require_member(&update.author)?;
        let board = self.board(&update.board)?;
        let in_collective = self
            .graph
            .collective(&board.collective)
            .map_or(false, |collective| collective.is_member(&update.author));
        if !in_collective && !board.editors.is_member(&update.author) {
            return Err(GovernanceError::Unauthorized(format!(
                "{} neither edits {} nor belongs to {}",
                update.author, update.board, board.collective
            )));
        }
        if let Some(pin_majority) = update.pin_majority {
            check_percentage("pin majority", pin_majority)?;
        }
        let editors = board.editors.clone();
        let (author, epoch) = (update.author, update.epoch);
        self.open(Box::new(PendingUpdateBoard::new(update, editors)), author, epoch)
    }

    fn pin(&mut self, pin: Pin) -> GovernanceResult<()> {
        let board = self.board(&pin.board)?;
        if !self.graph.drafts.contains_key(&pin.draft) {
            return Err(not_found(format_args!("draft {}", pin.draft)));
        }
        if !board.editors.is_member(&pin.author) {
            return Err(GovernanceError::Unauthorized(format!(
                "{} does not edit {}",
                pin.author, pin.board
            )));
        }
        let pinned = board.pinned.contains(&pin.draft);
        if pin.pin && pinned {
            return Err(GovernanceError::AlreadyExists(format!(
                "draft {} pinned on {}",
                pin.draft, pin.board
            )));
        }
        if !pin.pin && !pinned {
            return Err(not_found(format_args!("draft {} on {}", pin.draft, pin.board)));
        }
        let editors = board.editors.clone();
        let (author, epoch) = (pin.author, pin.epoch);
        self.open(Box::new(PendingPin::new(pin, editors)), author, epoch)
    }

    fn board_editor(&mut self, editor: BoardEditor) -> GovernanceResult<()> {
        let board = self.board(&editor.board)?;
        if !self.graph.is_member(&editor.editor) {
            return Err(GovernanceError::NotAMember(format!(
                "{} has not signed in",
                editor.editor
            )));
        }
        let photo = self.member_of(&board.collective, &editor.author)?.photo();
        let (author, epoch) = (editor.author, editor.epoch);
        self.open(Box::new(PendingBoardEditor::new(editor, photo)), author, epoch)
    }

    fn create_event(&mut self, create: CreateEvent) -> GovernanceResult<()> {
        self.require_member(&create.author)?;
        check_percentage("manager majority", create.manager_majority)?;
        let collective = self.member_of(&create.on_behalf_of, &create.author)?;
        let managers = if create.managers.is_empty() {
            UnnamedCollective::new(collective.policy.majority, collective.members.iter().copied())
        } else {
            UnnamedCollective::new(create.manager_majority, create.managers.iter().copied())
        };
        let photo = collective.photo();
        let event = Event {
            hash: create.hashed(),
            collective: create.on_behalf_of,
            start_at: create.start_at,
            estimated_end: create.estimated_end,
            description: create.description,
            venue: create.venue,
            open: create.open,
            public: create.public,
            managers,
            votes: Vec::new(),
            checkins: BTreeMap::new(),
            live: false,
            reasons: create.reasons,
        };
        self.open(Box::new(PendingEvent::new(event, photo)), create.author, create.epoch)
    }

    fn cancel_event(&mut self, cancel: CancelEvent) -> GovernanceResult<()> {
        let event = self.managed_event(&cancel.hash, &cancel.author)?;
        if !event.live {
            return Err(not_found(format_args!("live event {}", cancel.hash)));
        }
        let managers = event.managers.clone();
        let record = PendingCancelEvent::new(cancel.hash, cancel.hashed(), managers);
        self.open(Box::new(record), cancel.author, cancel.epoch)
    }

    fn update_event(&mut self, update: UpdateEvent) -> GovernanceResult<()> {
        let managers = self
            .managed_event(&update.event_hash, &update.author)?
            .managers
            .clone();
        if let Some(majority) = update.manager_majority {
            check_percentage("manager majority", majority)?;
        }
        let (author, epoch) = (update.author, update.epoch);
        self.open(Box::new(PendingEventUpdate::new(update, managers)), author, epoch)
    }

    /// Record the check-in and wait for a manager to greet it
    fn checkin_event(&mut self, checkin: CheckinEvent) -> GovernanceResult<()> {
        self.require_member(&checkin.author)?;
        let event = self.event(&checkin.event_hash)?;
        if !event.live {
            return Err(not_found(format_args!("live event {}", checkin.event_hash)));
        }
        if event.checkins.contains_key(&checkin.author) {
            return Err(GovernanceError::AlreadyExists(format!(
                "checkin of {} at {}",
                checkin.author, checkin.event_hash
            )));
        }
        let record = PendingCheckinGreet::new(checkin.event_hash, checkin.author, event.managers.clone());
        self.register(Box::new(record), checkin.epoch)?;
        if let Some(event) = self.graph.events.get_mut(&checkin.event_hash) {
            event.checkins.insert(
                checkin.author,
                Checkin {
                    ephemeral_token: checkin.ephemeral_token,
                    reasons: checkin.reasons,
                    greeting: None,
                },
            );
            let event: &Event = event;
            self.hooks
                .index(|indexer| indexer.add_checkin(&checkin.author, event));
        }
        Ok(())
    }

    fn greet_checkin_event(&mut self, greet: GreetCheckinEvent) -> GovernanceResult<()> {
        let event = self.event(&greet.event_hash)?;
        let checkin = event
            .checkins
            .get(&greet.checked_in)
            .ok_or_else(|| not_found(format_args!("checkin of {}", greet.checked_in)))?;
        if checkin.greeting.is_some() {
            return Err(GovernanceError::Conflict(format!(
                "checkin of {} already greeted",
                greet.checked_in
            )));
        }
        let key = checkin_key(&greet.event_hash, &greet.checked_in);
        let outcome = self
            .proposals
            .incorporate_greet(&greet, key, &mut self.graph, &mut self.hooks);
        self.settle_deadline(&key);
        outcome
    }
}
