use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::events::ServerEvent;

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

/// Opaque handle for one connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Default)]
struct Inner {
    clients: HashMap<ClientId, EventSender>,
    channels: HashMap<String, HashSet<ClientId>>,
}

/// Channel membership for connected clients.
///
/// Each client owns an unbounded outbound queue; the transport drains the
/// receiving half. Emission copies the member handles out under the lock and
/// sends after releasing it, so joins and leaves racing with a broadcast
/// never cause a skipped or doubled delivery to anyone else.
#[derive(Default)]
pub struct SubscriptionRegistry {
    inner: Mutex<Inner>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a new client and hand back the queue its events arrive on.
    pub fn connect(&self) -> (ClientId, EventReceiver) {
        let id = ClientId(Uuid::new_v4());
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().clients.insert(id, tx);
        debug!(client = %id, "client connected");
        (id, rx)
    }

    /// Returns false when the client was already a member or is unknown.
    pub fn join(&self, client: ClientId, channel: &str) -> bool {
        let mut inner = self.lock();
        if !inner.clients.contains_key(&client) {
            return false;
        }
        inner
            .channels
            .entry(channel.to_string())
            .or_default()
            .insert(client)
    }

    /// Returns false when the client was not a member.
    pub fn leave(&self, client: ClientId, channel: &str) -> bool {
        let mut inner = self.lock();
        let Some(members) = inner.channels.get_mut(channel) else {
            return false;
        };
        let removed = members.remove(&client);
        if members.is_empty() {
            inner.channels.remove(channel);
        }
        removed
    }

    /// Leave every channel and drop the client's queue.
    pub fn disconnect(&self, client: ClientId) {
        let mut inner = self.lock();
        Self::remove_client(&mut inner, client);
        debug!(client = %client, "client disconnected");
    }

    fn remove_client(inner: &mut Inner, client: ClientId) {
        inner.clients.remove(&client);
        inner.channels.retain(|_, members| {
            members.remove(&client);
            !members.is_empty()
        });
    }

    pub fn is_member(&self, client: ClientId, channel: &str) -> bool {
        self.lock()
            .channels
            .get(channel)
            .map(|members| members.contains(&client))
            .unwrap_or(false)
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.lock().channels.get(channel).map(HashSet::len).unwrap_or(0)
    }

    pub fn client_count(&self) -> usize {
        self.lock().clients.len()
    }

    /// Deliver `event` to every current member of `channel`. Returns the
    /// number of clients reached. Members whose queue is closed are
    /// disconnected.
    pub fn emit(&self, channel: &str, event: &ServerEvent) -> usize {
        let snapshot = {
            let inner = self.lock();
            match inner.channels.get(channel) {
                Some(members) => members
                    .iter()
                    .filter_map(|id| inner.clients.get(id).map(|tx| (*id, tx.clone())))
                    .collect::<Vec<_>>(),
                None => return 0,
            }
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in snapshot {
            match tx.send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(_) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut inner = self.lock();
            for id in closed {
                Self::remove_client(&mut inner, id);
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NEWS_CHANNEL;

    fn event() -> ServerEvent {
        ServerEvent::update(vec![])
    }

    #[test]
    fn test_join_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (client, mut rx) = registry.connect();

        assert!(registry.join(client, NEWS_CHANNEL));
        assert!(!registry.join(client, NEWS_CHANNEL));
        assert_eq!(registry.subscriber_count(NEWS_CHANNEL), 1);

        assert_eq!(registry.emit(NEWS_CHANNEL, &event()), 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_leave_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let (client, _rx) = registry.connect();

        assert!(!registry.leave(client, NEWS_CHANNEL));
        registry.join(client, NEWS_CHANNEL);
        assert!(registry.leave(client, NEWS_CHANNEL));
        assert!(!registry.leave(client, NEWS_CHANNEL));
        assert!(!registry.is_member(client, NEWS_CHANNEL));
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_unknown_client_cannot_join() {
        let registry = SubscriptionRegistry::new();
        let (client, _rx) = registry.connect();
        registry.disconnect(client);
        assert!(!registry.join(client, NEWS_CHANNEL));
        assert_eq!(registry.subscriber_count(NEWS_CHANNEL), 0);
    }

    #[test]
    fn test_leave_does_not_affect_others() {
        let registry = SubscriptionRegistry::new();
        let (a, mut rx_a) = registry.connect();
        let (b, mut rx_b) = registry.connect();
        registry.join(a, NEWS_CHANNEL);
        registry.join(b, NEWS_CHANNEL);

        registry.leave(a, NEWS_CHANNEL);
        assert_eq!(registry.emit(NEWS_CHANNEL, &event()), 1);
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_disconnect_leaves_all_channels() {
        let registry = SubscriptionRegistry::new();
        let (client, _rx) = registry.connect();
        registry.join(client, NEWS_CHANNEL);
        registry.join(client, "other");

        registry.disconnect(client);
        assert_eq!(registry.subscriber_count(NEWS_CHANNEL), 0);
        assert_eq!(registry.subscriber_count("other"), 0);
        assert_eq!(registry.client_count(), 0);
    }

    #[test]
    fn test_emit_to_empty_channel() {
        let registry = SubscriptionRegistry::new();
        let (_client, mut rx) = registry.connect();
        assert_eq!(registry.emit(NEWS_CHANNEL, &event()), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_receivers_are_pruned() {
        let registry = SubscriptionRegistry::new();
        let (gone, rx_gone) = registry.connect();
        let (alive, mut rx_alive) = registry.connect();
        registry.join(gone, NEWS_CHANNEL);
        registry.join(alive, NEWS_CHANNEL);
        drop(rx_gone);

        assert_eq!(registry.emit(NEWS_CHANNEL, &event()), 1);
        assert!(rx_alive.try_recv().is_ok());
        assert_eq!(registry.subscriber_count(NEWS_CHANNEL), 1);
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_channels_are_independent() {
        let registry = SubscriptionRegistry::new();
        let (client, mut rx) = registry.connect();
        registry.join(client, "other");

        assert_eq!(registry.emit(NEWS_CHANNEL, &event()), 0);
        assert!(rx.try_recv().is_err());
    }
}
