//! List card controller: expand/collapse side effects and the inline chat
//! of the card's match.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info_span, warn, Instrument};

use ag_core::card::{CardAction, CardDisclosure, CardEvent, CardState, ViewTarget};
use ag_core::ids::MatchId;
use ag_core::marketplace::{Demand, Message, NewMessage};
use ag_core::notify::Toast;
use ag_core::ports::{
    ApiError, MessagePort, NotifierPort, RealtimeError, RealtimePort, ResourceReadPort,
    TransportPort,
};
use ag_core::realtime::{RealtimeCommand, RealtimeEvent};

/// Membership of a match room.
///
/// Released explicitly with [`RoomSubscription::leave`]; dropping an
/// unreleased subscription schedules the `leaveMatch` emit on the current
/// runtime.
pub struct RoomSubscription {
    match_id: MatchId,
    realtime: Arc<dyn RealtimePort>,
    released: bool,
}

impl RoomSubscription {
    pub async fn join(
        realtime: Arc<dyn RealtimePort>,
        match_id: MatchId,
    ) -> Result<Self, RealtimeError> {
        realtime
            .emit(RealtimeCommand::JoinMatch(match_id.clone()))
            .await?;
        debug!(match_id = %match_id, "joined match room");
        Ok(Self {
            match_id,
            realtime,
            released: false,
        })
    }

    pub fn match_id(&self) -> &MatchId {
        &self.match_id
    }

    pub async fn leave(mut self) -> Result<(), RealtimeError> {
        self.released = true;
        debug!(match_id = %self.match_id, "leaving match room");
        self.realtime
            .emit(RealtimeCommand::LeaveMatch(self.match_id.clone()))
            .await
    }
}

impl Drop for RoomSubscription {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let command = RealtimeCommand::LeaveMatch(self.match_id.clone());
        let realtime = self.realtime.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(err) = realtime.emit(command).await {
                        debug!(error = %err, "leave on drop failed");
                    }
                });
            }
            Err(_) => warn!(match_id = %self.match_id, "room subscription dropped outside a runtime"),
        }
    }
}

/// Ports a card needs.
#[derive(Clone)]
pub struct CardPorts {
    pub demands: Arc<dyn ResourceReadPort<Demand>>,
    pub transport: Arc<dyn TransportPort>,
    pub messages: Arc<dyn MessagePort>,
    pub realtime: Arc<dyn RealtimePort>,
    pub notifier: Arc<dyn NotifierPort>,
}

pub struct CardController {
    ports: CardPorts,
    state: Mutex<CardState>,
    room: tokio::sync::Mutex<Option<RoomSubscription>>,
    thread: Mutex<Vec<Message>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl CardController {
    pub fn new(ports: CardPorts, view_target: Option<ViewTarget>, match_id: Option<MatchId>) -> Self {
        Self {
            ports,
            state: Mutex::new(CardState::new(view_target, match_id)),
            room: tokio::sync::Mutex::new(None),
            thread: Mutex::new(Vec::new()),
        }
    }

    pub fn is_expanded(&self) -> bool {
        lock(&self.state).is_expanded()
    }

    pub fn thread(&self) -> Vec<Message> {
        lock(&self.thread).clone()
    }

    pub async fn toggle(&self) {
        self.handle(CardEvent::Toggle).await
    }

    pub async fn expand(&self) {
        self.handle(CardEvent::Expand).await
    }

    pub async fn collapse(&self) {
        self.handle(CardEvent::Collapse).await
    }

    /// The card is leaving the screen.
    pub async fn dispose(&self) {
        self.handle(CardEvent::Dispose).await
    }

    async fn handle(&self, event: CardEvent) {
        let actions = {
            let mut state = lock(&self.state);
            let (next, actions) = CardDisclosure::transition(state.clone(), event);
            *state = next;
            actions
        };

        for action in actions {
            debug!(?action, "card executing action");
            match action {
                CardAction::IncrementView(target) => self.increment_view(target),
                CardAction::JoinRoom(match_id) => self.join_room(match_id).await,
                CardAction::LoadThread(match_id) => self.load_thread(&match_id).await,
                CardAction::LeaveRoom(_) => self.leave_room().await,
            }
        }
    }

    /// Fire-and-forget: failures are logged and never shown.
    fn increment_view(&self, target: ViewTarget) {
        let demands = self.ports.demands.clone();
        let transport = self.ports.transport.clone();
        let span = info_span!("usecase.card.increment_view", target = ?target);
        tokio::spawn(
            async move {
                let result = match &target {
                    ViewTarget::Demand(id) => demands.get(id).await.map(|_| ()),
                    ViewTarget::Transport(id) => transport.increment_views(id).await,
                };
                if let Err(err) = result {
                    warn!(error = %err, "view increment failed");
                }
            }
            .instrument(span),
        );
    }

    async fn join_room(&self, match_id: MatchId) {
        let mut room = self.room.lock().await;
        if room.as_ref().is_some_and(|r| r.match_id() == &match_id) {
            return;
        }
        match RoomSubscription::join(self.ports.realtime.clone(), match_id).await {
            Ok(subscription) => *room = Some(subscription),
            Err(err) => warn!(error = %err, "could not join match room"),
        }
    }

    async fn leave_room(&self) {
        let subscription = self.room.lock().await.take();
        if let Some(subscription) = subscription {
            if let Err(err) = subscription.leave().await {
                warn!(error = %err, "could not leave match room");
            }
        }
    }

    async fn load_thread(&self, match_id: &MatchId) {
        match self.ports.messages.thread(match_id).await {
            Ok(messages) => *lock(&self.thread) = messages,
            Err(err) => self.report(&err, "could not load messages"),
        }
    }

    /// Sends a chat message in the card's match. Blank input is ignored.
    pub async fn send_message(&self, content: &str) -> Result<Option<Message>, ApiError> {
        let Some(match_id) = lock(&self.state).match_id.clone() else {
            return Ok(None);
        };
        let Some(message) = NewMessage::new(match_id, content) else {
            return Ok(None);
        };

        match self.ports.messages.send(&message).await {
            Ok(sent) => {
                self.append(sent.clone());
                Ok(Some(sent))
            }
            Err(err) => {
                self.report(&err, "could not send message");
                Err(err)
            }
        }
    }

    pub async fn mark_read(&self) -> Result<(), ApiError> {
        let Some(match_id) = lock(&self.state).match_id.clone() else {
            return Ok(());
        };
        self.ports.messages.mark_read(&match_id).await
    }

    /// Appends a pushed message when it belongs to this card's open thread.
    pub fn apply_event(&self, event: &RealtimeEvent) -> bool {
        let RealtimeEvent::NewMessage(message) = event else {
            return false;
        };
        {
            let state = lock(&self.state);
            if !state.is_expanded() || state.match_id.as_ref() != Some(&message.match_id) {
                return false;
            }
        }
        self.append(message.clone())
    }

    pub async fn follow(
        &self,
        mut events: broadcast::Receiver<RealtimeEvent>,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => match event {
                    Ok(event) => {
                        self.apply_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => warn!(skipped, "card lagged behind realtime events"),
                    Err(RecvError::Closed) => break,
                },
            }
        }
    }

    fn append(&self, message: Message) -> bool {
        let mut thread = lock(&self.thread);
        if thread.iter().any(|m| m.id == message.id) {
            return false;
        }
        thread.push(message);
        true
    }

    fn report(&self, err: &ApiError, context: &str) {
        warn!(error = %err, "{context}");
        self.ports.notifier.notify(Toast::error(err.user_message()));
    }
}
