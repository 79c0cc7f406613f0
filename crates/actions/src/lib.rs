//! Synergy protocol actions
//!
//! The structs in this crate are the already-parsed form of every action the
//! governance engine accepts. Each action knows its resolution hash: the
//! content-derived identifier under which the engine files the proposal the
//! action opens, and which voters address with [`Vote::hash`].

pub mod action;
pub mod board;
pub mod collective;
pub mod draft;
pub mod event;
pub mod hashing;
pub mod member;
pub mod policy;

pub use action::Action;
pub use board::{BoardEditor, CreateBoard, Pin, UpdateBoard};
pub use collective::{CreateCollective, RemoveMember, RequestMembership, UpdateCollective};
pub use draft::{Draft, Edit, ImprintStamp, ReleaseDraft};
pub use event::{CancelEvent, CheckinEvent, CreateEvent, GreetCheckinEvent, UpdateEvent};
pub use hashing::HashBuilder;
pub use member::{React, Signin};
pub use policy::{Policy, Vote};
