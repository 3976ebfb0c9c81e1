//! Message envelope and performatives

use crate::core::ids::{AgentId, ConversationId, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Speech-act type of a message.
///
/// Serialized in kebab-case (`accept-proposal`). Strings outside the set
/// deserialize to [`Performative::Unknown`], which receivers answer with
/// `not-understood`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Performative {
    Inform,
    Request,
    Agree,
    Refuse,
    Query,
    Propose,
    AcceptProposal,
    RejectProposal,
    Failure,
    NotUnderstood,
    #[serde(other)]
    Unknown,
}

impl Performative {
    pub fn as_str(&self) -> &str {
        match self {
            Performative::Inform => "inform",
            Performative::Request => "request",
            Performative::Agree => "agree",
            Performative::Refuse => "refuse",
            Performative::Query => "query",
            Performative::Propose => "propose",
            Performative::AcceptProposal => "accept-proposal",
            Performative::RejectProposal => "reject-proposal",
            Performative::Failure => "failure",
            Performative::NotUnderstood => "not-understood",
            Performative::Unknown => "unknown",
        }
    }

    /// Performatives that answer another message and expect no reply.
    pub fn is_reply(&self) -> bool {
        matches!(
            self,
            Performative::Agree
                | Performative::Refuse
                | Performative::AcceptProposal
                | Performative::RejectProposal
                | Performative::Failure
                | Performative::NotUnderstood
        )
    }
}

impl std::fmt::Display for Performative {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable message between agents.
///
/// Built with [`Message::new`] and the `to`/`on_topic`/`in_conversation`
/// builders; there are no setters once it is handed to the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    id: MessageId,
    sender: AgentId,
    #[serde(default)]
    receiver: Option<AgentId>,
    #[serde(default)]
    topic: Option<String>,
    performative: Performative,
    content: Value,
    #[serde(default)]
    conversation_id: Option<ConversationId>,
    #[serde(default)]
    reply_to: Option<MessageId>,
    timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(sender: AgentId, performative: Performative, content: impl Into<Value>) -> Self {
        Self {
            id: MessageId::generate(),
            sender,
            receiver: None,
            topic: None,
            performative,
            content: content.into(),
            conversation_id: None,
            reply_to: None,
            timestamp: Utc::now(),
        }
    }

    pub fn to(mut self, receiver: AgentId) -> Self {
        self.receiver = Some(receiver);
        self
    }

    pub fn on_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    pub fn in_conversation(mut self, conversation_id: ConversationId) -> Self {
        self.conversation_id = Some(conversation_id);
        self
    }

    /// A reply from `from` back to this message's sender.
    ///
    /// Keeps the conversation id, or opens one named after this message.
    pub fn reply(&self, from: AgentId, performative: Performative, content: impl Into<Value>) -> Self {
        let conversation = self
            .conversation_id
            .clone()
            .unwrap_or_else(|| ConversationId::new(self.id.as_str()));
        let mut reply = Message::new(from, performative, content)
            .to(self.sender.clone())
            .in_conversation(conversation);
        reply.reply_to = Some(self.id.clone());
        reply
    }

    /// Copy of a topic message addressed to one subscriber.
    pub fn addressed_to(&self, receiver: AgentId) -> Self {
        let mut copy = self.clone();
        copy.receiver = Some(receiver);
        copy
    }

    pub fn id(&self) -> &MessageId {
        &self.id
    }

    pub fn sender(&self) -> &AgentId {
        &self.sender
    }

    pub fn receiver(&self) -> Option<&AgentId> {
        self.receiver.as_ref()
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn performative(&self) -> Performative {
        self.performative
    }

    pub fn content(&self) -> &Value {
        &self.content
    }

    pub fn conversation_id(&self) -> Option<&ConversationId> {
        self.conversation_id.as_ref()
    }

    pub fn reply_to(&self) -> Option<&MessageId> {
        self.reply_to.as_ref()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}
