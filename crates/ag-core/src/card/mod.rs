//! Expand/collapse behaviour of list cards.
//!
//! A card owns two side-effects tied to its disclosure state: a view
//! increment fired once per collapsed → expanded transition, and the
//! membership of the realtime room of its match while expanded.

use crate::ids::{DemandId, MatchId, TransportId};

/// Resource whose view counter is bumped on expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewTarget {
    /// `GET /demand/:id` increments server-side.
    Demand(DemandId),
    /// `POST /transport/:id/views`.
    Transport(TransportId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disclosure {
    Collapsed,
    Expanded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardState {
    pub disclosure: Disclosure,
    pub view_target: Option<ViewTarget>,
    /// Match whose chat thread is shown inline.
    pub match_id: Option<MatchId>,
}

impl CardState {
    pub fn new(view_target: Option<ViewTarget>, match_id: Option<MatchId>) -> Self {
        Self {
            disclosure: Disclosure::Collapsed,
            view_target,
            match_id,
        }
    }

    pub fn is_expanded(&self) -> bool {
        self.disclosure == Disclosure::Expanded
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardEvent {
    Toggle,
    Expand,
    Collapse,
    /// The card is going away (page change, list refresh).
    Dispose,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardAction {
    IncrementView(ViewTarget),
    JoinRoom(MatchId),
    LoadThread(MatchId),
    LeaveRoom(MatchId),
}

pub struct CardDisclosure;

impl CardDisclosure {
    pub fn transition(mut state: CardState, event: CardEvent) -> (CardState, Vec<CardAction>) {
        let expand = match (state.disclosure, event) {
            (Disclosure::Collapsed, CardEvent::Toggle | CardEvent::Expand) => true,
            (Disclosure::Expanded, CardEvent::Toggle | CardEvent::Collapse | CardEvent::Dispose) => {
                false
            }
            _ => return (state, Vec::new()),
        };

        let mut actions = Vec::new();
        if expand {
            state.disclosure = Disclosure::Expanded;
            if let Some(target) = &state.view_target {
                actions.push(CardAction::IncrementView(target.clone()));
            }
            if let Some(match_id) = &state.match_id {
                actions.push(CardAction::JoinRoom(match_id.clone()));
                actions.push(CardAction::LoadThread(match_id.clone()));
            }
        } else {
            state.disclosure = Disclosure::Collapsed;
            if let Some(match_id) = &state.match_id {
                actions.push(CardAction::LeaveRoom(match_id.clone()));
            }
        }
        (state, actions)
    }
}
