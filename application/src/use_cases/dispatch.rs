//! Receiver-side handling of delivered messages.
//!
//! Every message is first revised into the `inbox:<sender>` belief. The
//! performative then decides what else happens:
//!
//! | Performative | Effect | Reply |
//! |---|---|---|
//! | INFORM | content folded into beliefs | AGREE if acknowledging |
//! | QUERY | none | INFORM with the value, or FAILURE |
//! | REQUEST | queued for the execute phase if capable | REFUSE if not capable |
//! | PROPOSE | desire adopted if acceptable | ACCEPT_PROPOSAL / REJECT_PROPOSAL |
//! | replies | none | none |
//! | unknown | none | NOT_UNDERSTOOD |

use crate::config::CycleConfig;
use bdi_domain::message::{inbox_belief, inform_beliefs, query_key, requested_action};
use bdi_domain::{
    AgentId, AgentProfile, BeliefStore, DesireId, DesireSet, Message, Performative, Proposal,
    ResourcePool, RevisionOutcome,
};
use serde_json::json;

/// A REQUEST accepted for execution in the execute phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub request: Message,
    pub action: String,
}

/// What handling one message produced.
#[derive(Debug, Default)]
pub struct Dispatched {
    pub revisions: Vec<RevisionOutcome>,
    pub reply: Option<Message>,
    pub request: Option<PendingRequest>,
    pub adopted: Option<DesireId>,
}

/// Handles messages on behalf of one agent.
pub struct PerformativeDispatcher<'a> {
    agent_id: &'a AgentId,
    profile: &'a AgentProfile,
    config: &'a CycleConfig,
}

impl<'a> PerformativeDispatcher<'a> {
    pub fn new(agent_id: &'a AgentId, profile: &'a AgentProfile, config: &'a CycleConfig) -> Self {
        Self {
            agent_id,
            profile,
            config,
        }
    }

    pub fn dispatch(
        &self,
        message: &Message,
        beliefs: &mut BeliefStore,
        desires: &mut DesireSet,
        resources: &ResourcePool,
    ) -> Dispatched {
        let mut dispatched = Dispatched::default();
        dispatched.revisions.push(beliefs.revise(inbox_belief(message)));

        match message.performative() {
            Performative::Inform => {
                for belief in inform_beliefs(message) {
                    dispatched.revisions.push(beliefs.revise(belief));
                }
                if self.config.acknowledge_informs {
                    dispatched.reply = Some(self.reply(
                        message,
                        Performative::Agree,
                        json!({ "received": message.id() }),
                    ));
                }
            }
            Performative::Query => {
                dispatched.reply = Some(self.answer_query(message, beliefs));
            }
            Performative::Request => match requested_action(message.content()) {
                Some(action) if self.profile.can(action) => {
                    dispatched.request = Some(PendingRequest {
                        request: message.clone(),
                        action: action.to_string(),
                    });
                }
                Some(action) => {
                    dispatched.reply = Some(self.reply(
                        message,
                        Performative::Refuse,
                        json!({ "action": action, "reason": "not capable" }),
                    ));
                }
                None => {
                    dispatched.reply = Some(self.reply(
                        message,
                        Performative::NotUnderstood,
                        json!({ "reason": "request names no action" }),
                    ));
                }
            },
            Performative::Propose => {
                let (reply, adopted) = self.evaluate_proposal(message, desires, resources);
                dispatched.reply = Some(reply);
                dispatched.adopted = adopted;
            }
            Performative::Agree
            | Performative::Refuse
            | Performative::AcceptProposal
            | Performative::RejectProposal
            | Performative::Failure
            | Performative::NotUnderstood => {}
            Performative::Unknown => {
                dispatched.reply = Some(self.reply(
                    message,
                    Performative::NotUnderstood,
                    json!({ "reason": "unsupported performative" }),
                ));
            }
        }

        dispatched
    }

    fn answer_query(&self, message: &Message, beliefs: &BeliefStore) -> Message {
        let Some(key) = query_key(message.content()) else {
            return self.reply(
                message,
                Performative::NotUnderstood,
                json!({ "reason": "query names no belief" }),
            );
        };
        match beliefs.get(&key).filter(|b| !b.is_flagged()) {
            Some(belief) => self.reply(
                message,
                Performative::Inform,
                json!({
                    "query": message.content(),
                    "value": belief.value,
                    "certainty": belief.certainty.value(),
                }),
            ),
            None => self.reply(
                message,
                Performative::Failure,
                json!({ "query": message.content(), "reason": "no such belief" }),
            ),
        }
    }

    fn evaluate_proposal(
        &self,
        message: &Message,
        desires: &mut DesireSet,
        resources: &ResourcePool,
    ) -> (Message, Option<DesireId>) {
        let proposal = match Proposal::from_content(message.content()) {
            Ok(proposal) => proposal,
            Err(e) => {
                let reply = self.reply(
                    message,
                    Performative::RejectProposal,
                    json!({ "reason": e.to_string() }),
                );
                return (reply, None);
            }
        };

        if proposal.priority < self.config.min_proposal_priority {
            let reply = self.reply(
                message,
                Performative::RejectProposal,
                json!({
                    "reason": "priority too low",
                    "minimum": self.config.min_proposal_priority,
                }),
            );
            return (reply, None);
        }
        if let Err(e) = resources.check(&proposal.resources) {
            let reply = self.reply(
                message,
                Performative::RejectProposal,
                json!({ "reason": e.to_string() }),
            );
            return (reply, None);
        }

        let desire = proposal.into_desire();
        let id = desire.id.clone();
        desires.adopt(desire);
        let reply = self.reply(
            message,
            Performative::AcceptProposal,
            json!({ "desire_id": id }),
        );
        (reply, Some(id))
    }

    fn reply(&self, message: &Message, performative: Performative, content: serde_json::Value) -> Message {
        message.reply(self.agent_id.clone(), performative, content)
    }
}
