//! Event proposals
//!
//! Creating an event is put to the organising collective. Once live, the
//! event's managers decide updates and cancellation and greet attendees.

use synergy_actions::{GreetCheckinEvent, HashBuilder, UpdateEvent, Vote};
use synergy_crypto::{Hash, Token};

use crate::collective::{Collective, Consensual, UnnamedCollective};
use crate::error::{GovernanceError, GovernanceResult};
use crate::graph::{Event, Greeting, ObjectGraph};
use crate::index::Hooks;
use crate::proposals::{Proposal, ProposalKind};

fn live_event<'a>(graph: &'a mut ObjectGraph, hash: &Hash) -> GovernanceResult<&'a mut Event> {
    graph
        .events
        .get_mut(hash)
        .ok_or_else(|| GovernanceError::NotFound(format!("event {}", hash)))
}

/// Key of the pending greeting for `attendee` at `event`
pub fn checkin_key(event: &Hash, attendee: &Token) -> Hash {
    HashBuilder::new("checkin")
        .put_hash(event)
        .put_token(attendee)
        .finish()
}

#[derive(Debug)]
pub struct PendingEvent {
    pub event: Event,
    pub collective: Collective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingEvent {
    pub fn new(event: Event, collective: Collective) -> Self {
        Self {
            hash: event.hash,
            event,
            collective,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingEvent {
    ballot_box!(ProposalKind::CreateEvent, collective);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        if graph.events.contains_key(&self.hash) {
            return Err(GovernanceError::Conflict(format!("event {} already live", self.hash)));
        }
        let mut event = self.event;
        event.live = true;
        event.votes = self.votes;
        hooks.index(|indexer| indexer.add_event_to_collective(&event, &event.collective));
        graph.events.insert(event.hash, event);
        Ok(())
    }
}

/// Changes to a live event. `None` fields are left unchanged.
#[derive(Debug)]
pub struct PendingEventUpdate {
    pub update: UpdateEvent,
    pub managers: UnnamedCollective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingEventUpdate {
    pub fn new(update: UpdateEvent, managers: UnnamedCollective) -> Self {
        Self {
            hash: update.hashed(),
            update,
            managers,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingEventUpdate {
    ballot_box!(ProposalKind::UpdateEvent, managers);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let update = self.update;
        let event = live_event(graph, &update.event_hash)?;
        if let Some(start_at) = update.start_at {
            event.start_at = start_at;
        }
        if let Some(estimated_end) = update.estimated_end {
            event.estimated_end = estimated_end;
        }
        if let Some(description) = update.description {
            event.description = description;
        }
        if let Some(venue) = update.venue {
            event.venue = venue;
        }
        if let Some(open) = update.open {
            event.open = open;
        }
        if let Some(public) = update.public {
            event.public = public;
        }
        if let Some(managers) = update.managers {
            event.managers.members = managers.into_iter().collect();
        }
        if let Some(majority) = update.manager_majority {
            event.managers.change_majority(majority);
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PendingCancelEvent {
    pub event: Hash,
    pub managers: UnnamedCollective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
}

impl PendingCancelEvent {
    pub fn new(event: Hash, hash: Hash, managers: UnnamedCollective) -> Self {
        Self {
            event,
            managers,
            hash,
            votes: Vec::new(),
        }
    }
}

impl Proposal for PendingCancelEvent {
    ballot_box!(ProposalKind::CancelEvent, managers);

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, hooks: &mut Hooks) -> GovernanceResult<()> {
        let event = live_event(graph, &self.event)?;
        if !event.live {
            return Err(GovernanceError::Conflict(format!("event {} not live", self.event)));
        }
        event.live = false;
        let event: &Event = event;
        hooks.index(|indexer| indexer.remove_event_from_collective(event, &event.collective));
        Ok(())
    }
}

/// A check-in waiting for any one manager's greeting. Ballots do not
/// resolve it.
#[derive(Debug)]
pub struct PendingCheckinGreet {
    pub event: Hash,
    pub attendee: Token,
    pub managers: UnnamedCollective,
    pub hash: Hash,
    pub votes: Vec<Vote>,
    pub greeting: Option<Greeting>,
}

impl PendingCheckinGreet {
    pub fn new(event: Hash, attendee: Token, managers: UnnamedCollective) -> Self {
        Self {
            hash: checkin_key(&event, &attendee),
            event,
            attendee,
            managers,
            votes: Vec::new(),
            greeting: None,
        }
    }
}

impl Proposal for PendingCheckinGreet {
    ballot_box!(ProposalKind::EventCheckinGreet, managers);

    fn votable(&self) -> bool {
        false
    }

    fn greet(&mut self, greet: &GreetCheckinEvent) -> GovernanceResult<()> {
        if !self.managers.is_member(&greet.author) {
            return Err(GovernanceError::Unauthorized(format!(
                "{} does not manage event {}",
                greet.author, self.event
            )));
        }
        if self.greeting.is_some() {
            return Err(GovernanceError::Conflict(format!(
                "checkin of {} already greeted",
                self.attendee
            )));
        }
        self.greeting = Some(Greeting {
            manager: greet.author,
            secret_key: greet.secret_key.clone(),
            private_content: greet.private_content.clone(),
        });
        Ok(())
    }

    fn apply(self: Box<Self>, graph: &mut ObjectGraph, _hooks: &mut Hooks) -> GovernanceResult<()> {
        let attendee = self.attendee;
        let event = live_event(graph, &self.event)?;
        let checkin = event
            .checkins
            .get_mut(&attendee)
            .ok_or_else(|| GovernanceError::NotFound(format!("checkin of {}", attendee)))?;
        if checkin.greeting.is_some() {
            return Err(GovernanceError::Conflict(format!("checkin of {} already greeted", attendee)));
        }
        checkin.greeting = self.greeting;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Checkin;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn token(n: u8) -> Token {
        Token::new([n; 32])
    }

    fn event() -> Event {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 18, 0, 0).unwrap();
        Event {
            collective: "A".into(),
            start_at: start,
            estimated_end: start,
            description: String::new(),
            venue: "hall".into(),
            open: true,
            public: true,
            hash: Hash::of(b"event"),
            managers: UnnamedCollective::new(50, [token(1)]),
            votes: vec![],
            checkins: BTreeMap::new(),
            live: true,
            reasons: String::new(),
        }
    }

    fn greet(author: u8) -> GreetCheckinEvent {
        GreetCheckinEvent {
            epoch: 3,
            author: token(author),
            reasons: String::new(),
            event_hash: Hash::of(b"event"),
            checked_in: token(7),
            ephemeral_token: token(8),
            secret_key: vec![1, 2],
            private_content: vec![3],
        }
    }

    #[test]
    fn test_greet_requires_manager_and_is_single() {
        let mut pending = PendingCheckinGreet::new(Hash::of(b"event"), token(7), event().managers);
        assert!(!pending.votable());
        assert!(matches!(pending.greet(&greet(2)), Err(GovernanceError::Unauthorized(_))));
        pending.greet(&greet(1)).unwrap();
        assert!(matches!(pending.greet(&greet(1)), Err(GovernanceError::Conflict(_))));
    }

    #[test]
    fn test_greeting_lands_on_checkin() {
        let mut graph = ObjectGraph::new(1);
        let mut live = event();
        live.checkins.insert(
            token(7),
            Checkin {
                ephemeral_token: token(8),
                reasons: String::new(),
                greeting: None,
            },
        );
        graph.events.insert(live.hash, live);
        let mut pending = Box::new(PendingCheckinGreet::new(Hash::of(b"event"), token(7), event().managers));
        pending.greet(&greet(1)).unwrap();
        pending.apply(&mut graph, &mut Hooks::default()).unwrap();
        let greeting = graph.events[&Hash::of(b"event")].checkins[&token(7)]
            .greeting
            .clone()
            .unwrap();
        assert_eq!(greeting.manager, token(1));
        assert_eq!(greeting.secret_key, vec![1, 2]);
    }

    #[test]
    fn test_cancel_takes_event_offline_once() {
        let mut graph = ObjectGraph::new(1);
        graph.events.insert(Hash::of(b"event"), event());
        let cancel = |n: &[u8]| {
            Box::new(PendingCancelEvent::new(Hash::of(b"event"), Hash::of(n), event().managers))
        };
        cancel(&b"c1"[..]).apply(&mut graph, &mut Hooks::default()).unwrap();
        assert!(!graph.events[&Hash::of(b"event")].live);
        assert!(matches!(
            cancel(&b"c2"[..]).apply(&mut graph, &mut Hooks::default()),
            Err(GovernanceError::Conflict(_))
        ));
    }
}
