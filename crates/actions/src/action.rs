//! The tagged union of every action the engine accepts

use serde::{Deserialize, Serialize};
use std::fmt;
use synergy_crypto::{Hash, Token};

use crate::board::{BoardEditor, CreateBoard, Pin, UpdateBoard};
use crate::collective::{CreateCollective, RemoveMember, RequestMembership, UpdateCollective};
use crate::draft::{Draft, Edit, ImprintStamp, ReleaseDraft};
use crate::event::{CancelEvent, CheckinEvent, CreateEvent, GreetCheckinEvent, UpdateEvent};
use crate::member::{React, Signin};
use crate::policy::Vote;

/// A parsed action, tagged by `kind` in its serialized form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    Vote(Vote),
    Signin(Signin),
    React(React),
    CreateCollective(CreateCollective),
    UpdateCollective(UpdateCollective),
    RequestMembership(RequestMembership),
    RemoveMember(RemoveMember),
    Draft(Draft),
    Edit(Edit),
    ReleaseDraft(ReleaseDraft),
    ImprintStamp(ImprintStamp),
    CreateBoard(CreateBoard),
    UpdateBoard(UpdateBoard),
    Pin(Pin),
    BoardEditor(BoardEditor),
    CreateEvent(CreateEvent),
    CancelEvent(CancelEvent),
    UpdateEvent(UpdateEvent),
    CheckinEvent(CheckinEvent),
    GreetCheckinEvent(GreetCheckinEvent),
}

macro_rules! each_action {
    ($action:expr, $inner:ident => $body:expr) => {
        match $action {
            Action::Vote($inner) => $body,
            Action::Signin($inner) => $body,
            Action::React($inner) => $body,
            Action::CreateCollective($inner) => $body,
            Action::UpdateCollective($inner) => $body,
            Action::RequestMembership($inner) => $body,
            Action::RemoveMember($inner) => $body,
            Action::Draft($inner) => $body,
            Action::Edit($inner) => $body,
            Action::ReleaseDraft($inner) => $body,
            Action::ImprintStamp($inner) => $body,
            Action::CreateBoard($inner) => $body,
            Action::UpdateBoard($inner) => $body,
            Action::Pin($inner) => $body,
            Action::BoardEditor($inner) => $body,
            Action::CreateEvent($inner) => $body,
            Action::CancelEvent($inner) => $body,
            Action::UpdateEvent($inner) => $body,
            Action::CheckinEvent($inner) => $body,
            Action::GreetCheckinEvent($inner) => $body,
        }
    };
}

impl Action {
    pub fn epoch(&self) -> u64 {
        each_action!(self, a => a.epoch)
    }

    pub fn author(&self) -> Token {
        each_action!(self, a => a.author)
    }

    pub fn reasons(&self) -> &str {
        each_action!(self, a => a.reasons.as_str())
    }

    /// Resolution hash of the action
    pub fn hashed(&self) -> Hash {
        each_action!(self, a => a.hashed())
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Action::Vote(_) => "vote",
            Action::Signin(_) => "signin",
            Action::React(_) => "react",
            Action::CreateCollective(_) => "create_collective",
            Action::UpdateCollective(_) => "update_collective",
            Action::RequestMembership(_) => "request_membership",
            Action::RemoveMember(_) => "remove_member",
            Action::Draft(_) => "draft",
            Action::Edit(_) => "edit",
            Action::ReleaseDraft(_) => "release_draft",
            Action::ImprintStamp(_) => "imprint_stamp",
            Action::CreateBoard(_) => "create_board",
            Action::UpdateBoard(_) => "update_board",
            Action::Pin(_) => "pin",
            Action::BoardEditor(_) => "board_editor",
            Action::CreateEvent(_) => "create_event",
            Action::CancelEvent(_) => "cancel_event",
            Action::UpdateEvent(_) => "update_event",
            Action::CheckinEvent(_) => "checkin_event",
            Action::GreetCheckinEvent(_) => "greet_checkin_event",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {} at epoch {}", self.kind_name(), self.author(), self.epoch())
    }
}
