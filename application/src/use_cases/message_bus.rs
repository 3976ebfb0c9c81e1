//! In-process message bus.
//!
//! Each registered agent owns an unbounded mailbox, so messages from one
//! sender to one receiver are received in send order. Topic publication
//! fans out to the subscribers registered at publish time; later
//! subscribers do not see earlier messages.

use bdi_domain::{AgentId, Message, MessageId, Performative};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommunicationError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(AgentId),

    #[error("Agent already registered: {0}")]
    AlreadyRegistered(AgentId),

    #[error("Message {0} has no receiver")]
    MissingReceiver(MessageId),

    #[error("Mailbox of {0} is closed")]
    MailboxClosed(AgentId),
}

/// Receiving end of an agent's mailbox.
pub struct Mailbox {
    agent_id: AgentId,
    receiver: mpsc::UnboundedReceiver<Message>,
}

impl Mailbox {
    pub fn agent_id(&self) -> &AgentId {
        &self.agent_id
    }

    /// Everything delivered so far, in arrival order, without waiting.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(message) = self.receiver.try_recv() {
            messages.push(message);
        }
        messages
    }

    /// Wait for the next message. `None` once the agent is deregistered.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }
}

#[derive(Default)]
struct BusState {
    mailboxes: HashMap<AgentId, mpsc::UnboundedSender<Message>>,
    subscriptions: HashMap<String, BTreeSet<AgentId>>,
}

/// Routes messages between the agents of one society.
#[derive(Default)]
pub struct MessageBus {
    state: RwLock<BusState>,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, agent_id: AgentId) -> Result<Mailbox, CommunicationError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.mailboxes.contains_key(&agent_id) {
            return Err(CommunicationError::AlreadyRegistered(agent_id));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        state.mailboxes.insert(agent_id.clone(), sender);
        debug!("Registered mailbox for {}", agent_id);
        Ok(Mailbox { agent_id, receiver })
    }

    /// Remove an agent's mailbox and all its subscriptions.
    pub fn deregister(&self, agent_id: &AgentId) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        for subscribers in state.subscriptions.values_mut() {
            subscribers.remove(agent_id);
        }
        state.mailboxes.remove(agent_id).is_some()
    }

    pub fn is_registered(&self, agent_id: &AgentId) -> bool {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state.mailboxes.contains_key(agent_id)
    }

    pub fn agents(&self) -> Vec<AgentId> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut agents: Vec<_> = state.mailboxes.keys().cloned().collect();
        agents.sort();
        agents
    }

    /// Deliver a message to its receiver's mailbox.
    pub fn send(&self, message: Message) -> Result<(), CommunicationError> {
        let Some(receiver) = message.receiver().cloned() else {
            return Err(CommunicationError::MissingReceiver(message.id().clone()));
        };
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mailbox = state
            .mailboxes
            .get(&receiver)
            .ok_or_else(|| CommunicationError::UnknownAgent(receiver.clone()))?;
        debug!(
            "{} -> {}: {}",
            message.sender(),
            receiver,
            message.performative()
        );
        mailbox
            .send(message)
            .map_err(|_| CommunicationError::MailboxClosed(receiver))
    }

    /// Build and deliver a direct message.
    pub fn tell(
        &self,
        sender: AgentId,
        receiver: AgentId,
        performative: Performative,
        content: impl Into<Value>,
    ) -> Result<MessageId, CommunicationError> {
        let message = Message::new(sender, performative, content).to(receiver);
        let id = message.id().clone();
        self.send(message)?;
        Ok(id)
    }

    pub fn subscribe(&self, agent_id: &AgentId, topic: impl Into<String>) -> Result<(), CommunicationError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if !state.mailboxes.contains_key(agent_id) {
            return Err(CommunicationError::UnknownAgent(agent_id.clone()));
        }
        state
            .subscriptions
            .entry(topic.into())
            .or_default()
            .insert(agent_id.clone());
        Ok(())
    }

    pub fn unsubscribe(&self, agent_id: &AgentId, topic: &str) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state
            .subscriptions
            .get_mut(topic)
            .is_some_and(|subscribers| subscribers.remove(agent_id))
    }

    pub fn subscribers(&self, topic: &str) -> Vec<AgentId> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        state
            .subscriptions
            .get(topic)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Fan a topic message out to the current subscribers, except the sender.
    ///
    /// Returns how many mailboxes received it.
    pub fn publish(
        &self,
        sender: AgentId,
        topic: &str,
        performative: Performative,
        content: impl Into<Value>,
    ) -> usize {
        let message = Message::new(sender, performative, content).on_topic(topic);
        let recipients: Vec<AgentId> = self
            .subscribers(topic)
            .into_iter()
            .filter(|a| a != message.sender())
            .collect();
        self.fan_out(&message, recipients)
    }

    /// Send to every registered agent except the sender.
    pub fn broadcast(&self, sender: AgentId, performative: Performative, content: impl Into<Value>) -> usize {
        let message = Message::new(sender, performative, content);
        let recipients: Vec<AgentId> = self
            .agents()
            .into_iter()
            .filter(|a| a != message.sender())
            .collect();
        self.fan_out(&message, recipients)
    }

    fn fan_out(&self, message: &Message, recipients: Vec<AgentId>) -> usize {
        recipients
            .into_iter()
            .filter(|receiver| self.send(message.addressed_to(receiver.clone())).is_ok())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_send_preserves_order() {
        let bus = MessageBus::new();
        let mut b = bus.register("b".into()).unwrap();
        bus.register("a".into()).unwrap();

        for i in 0..5 {
            bus.tell("a".into(), "b".into(), Performative::Inform, json!({ "n": i }))
                .unwrap();
        }
        let received: Vec<_> = b.drain().iter().map(|m| m.content()["n"].clone()).collect();
        assert_eq!(received, vec![json!(0), json!(1), json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn test_send_to_unknown_agent() {
        let bus = MessageBus::new();
        let err = bus
            .tell("a".into(), "ghost".into(), Performative::Inform, "hi")
            .unwrap_err();
        assert_eq!(err, CommunicationError::UnknownAgent("ghost".into()));
    }

    #[test]
    fn test_send_without_receiver() {
        let bus = MessageBus::new();
        let message = Message::new("a".into(), Performative::Inform, "hi");
        assert!(matches!(
            bus.send(message),
            Err(CommunicationError::MissingReceiver(_))
        ));
    }

    #[test]
    fn test_duplicate_registration() {
        let bus = MessageBus::new();
        let _mailbox = bus.register("a".into()).unwrap();
        assert!(matches!(
            bus.register("a".into()),
            Err(CommunicationError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn test_publish_has_no_backfill() {
        let bus = MessageBus::new();
        let mut early = bus.register("early".into()).unwrap();
        let mut late = bus.register("late".into()).unwrap();
        bus.register("pub".into()).unwrap();

        bus.subscribe(&"early".into(), "weather").unwrap();
        assert_eq!(bus.publish("pub".into(), "weather", Performative::Inform, json!({"rain": true})), 1);

        bus.subscribe(&"late".into(), "weather").unwrap();
        assert_eq!(bus.publish("pub".into(), "weather", Performative::Inform, json!({"rain": false})), 2);

        assert_eq!(early.drain().len(), 2);
        let late_msgs = late.drain();
        assert_eq!(late_msgs.len(), 1);
        assert_eq!(late_msgs[0].content()["rain"], json!(false));
        assert_eq!(late_msgs[0].topic(), Some("weather"));
        assert_eq!(late_msgs[0].receiver(), Some(&AgentId::new("late")));
    }

    #[test]
    fn test_unsubscribe_and_deregister() {
        let bus = MessageBus::new();
        let _a = bus.register("a".into()).unwrap();
        let _b = bus.register("b".into()).unwrap();
        bus.subscribe(&"a".into(), "t").unwrap();
        bus.subscribe(&"b".into(), "t").unwrap();

        assert!(bus.unsubscribe(&"a".into(), "t"));
        assert!(!bus.unsubscribe(&"a".into(), "t"));
        assert!(bus.deregister(&"b".into()));
        assert!(bus.subscribers("t").is_empty());
        assert!(bus.subscribe(&"b".into(), "t").is_err());
    }

    #[test]
    fn test_broadcast_skips_sender() {
        let bus = MessageBus::new();
        let mut a = bus.register("a".into()).unwrap();
        let mut b = bus.register("b".into()).unwrap();
        let mut c = bus.register("c".into()).unwrap();

        assert_eq!(bus.broadcast("a".into(), Performative::Inform, "hello"), 2);
        assert!(a.drain().is_empty());
        assert_eq!(b.drain().len(), 1);
        assert_eq!(c.drain().len(), 1);
    }
}
