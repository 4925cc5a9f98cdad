//! Host-authoritative combat session.
//!
//! One task owns the [`CombatController`] and the dice. Every participant,
//! local or remote, submits actions through a cloneable [`HostHandle`]; the
//! commands share one bounded queue and are handled strictly in arrival
//! order, so two actions never spend the same tracker at once. Results are
//! broadcast as [`SessionEvent`]s. Observers render those and never run the
//! rules themselves.

use crate::combat::{AttackOutcome, AttackRequest, CombatController};
use crate::config::HostConfig;
use crate::dice::DiceRoller;
use crate::error::{CombatError, HostError};
use crate::tracker::AttackTracker;
use crate::world::{ActiveCondition, Condition, Encounter, EntityId, GridPosition};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, trace};

type Reply<T> = oneshot::Sender<T>;

/// Commands processed by the host task.
#[derive(Debug)]
pub enum HostCommand {
    Attack {
        request: AttackRequest,
        reply: Reply<Result<AttackOutcome, CombatError>>,
    },
    BeginTurn {
        entity: EntityId,
        reply: Reply<Result<AttackTracker, CombatError>>,
    },
    EndTurn {
        reply: Reply<Option<EntityId>>,
    },
    SetDodging {
        entity: EntityId,
        dodging: bool,
        reply: Reply<Result<(), CombatError>>,
    },
    MoveTo {
        entity: EntityId,
        position: GridPosition,
        reply: Reply<Result<(), CombatError>>,
    },
    AddCondition {
        entity: EntityId,
        condition: ActiveCondition,
        reply: Reply<Result<(), CombatError>>,
    },
    RemoveCondition {
        entity: EntityId,
        condition: Condition,
        reply: Reply<Result<(), CombatError>>,
    },
    /// Read-only copy of the authoritative encounter.
    Snapshot { reply: Reply<Encounter> },
    /// Stop the host and hand back the final encounter.
    Shutdown { reply: Reply<Encounter> },
}

/// What every participant sees.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    TurnStarted {
        entity: EntityId,
        round: u32,
        tracker: AttackTracker,
    },
    AttackResolved(AttackOutcome),
    AttackRejected {
        request: AttackRequest,
        reason: String,
    },
    TurnEnded {
        round: u32,
        next: Option<EntityId>,
    },
}

/// The task that owns the authoritative state.
pub struct CombatHost<D> {
    controller: CombatController,
    dice: D,
    commands: mpsc::Receiver<HostCommand>,
    events: broadcast::Sender<SessionEvent>,
}

impl<D: DiceRoller + Send + 'static> CombatHost<D> {
    /// Start the host on the current tokio runtime.
    pub fn spawn(config: HostConfig, encounter: Encounter, dice: D) -> HostHandle {
        let (command_tx, command_rx) = mpsc::channel(config.queue_capacity.max(1));
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));

        let host = Self {
            controller: CombatController::new(config.rules, encounter),
            dice,
            commands: command_rx,
            events: event_tx.clone(),
        };
        tokio::spawn(host.run());

        HostHandle {
            commands: command_tx,
            events: event_tx,
        }
    }

    async fn run(mut self) {
        debug!("combat host started");
        while let Some(command) = self.commands.recv().await {
            if !self.handle(command) {
                break;
            }
        }
        debug!("combat host stopped");
    }

    /// Returns false once the host should stop.
    fn handle(&mut self, command: HostCommand) -> bool {
        match command {
            HostCommand::Attack { request, reply } => {
                let result = self.controller.attack(&request, &mut self.dice);
                match &result {
                    Ok(outcome) => self.publish(SessionEvent::AttackResolved(outcome.clone())),
                    Err(err) => self.publish(SessionEvent::AttackRejected {
                        request,
                        reason: err.to_string(),
                    }),
                }
                respond(reply, result);
            }
            HostCommand::BeginTurn { entity, reply } => {
                let result = self.controller.begin_turn(entity);
                if let Ok(tracker) = result {
                    self.publish(SessionEvent::TurnStarted {
                        entity,
                        round: self.controller.encounter().round,
                        tracker,
                    });
                }
                respond(reply, result);
            }
            HostCommand::EndTurn { reply } => {
                let next = self.controller.end_turn();
                self.publish(SessionEvent::TurnEnded {
                    round: self.controller.encounter().round,
                    next,
                });
                respond(reply, next);
            }
            HostCommand::SetDodging {
                entity,
                dodging,
                reply,
            } => respond(reply, self.controller.set_dodging(entity, dodging)),
            HostCommand::MoveTo {
                entity,
                position,
                reply,
            } => respond(reply, self.controller.move_to(entity, position)),
            HostCommand::AddCondition {
                entity,
                condition,
                reply,
            } => respond(reply, self.controller.add_condition(entity, condition)),
            HostCommand::RemoveCondition {
                entity,
                condition,
                reply,
            } => respond(reply, self.controller.remove_condition(entity, condition)),
            HostCommand::Snapshot { reply } => {
                respond(reply, self.controller.encounter().clone());
            }
            HostCommand::Shutdown { reply } => {
                respond(reply, self.controller.encounter().clone());
                return false;
            }
        }
        true
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            trace!("no session observers");
        }
    }
}

fn respond<T>(reply: Reply<T>, value: T) {
    if reply.send(value).is_err() {
        debug!("reply channel closed (caller dropped)");
    }
}

/// Cloneable handle for submitting actions to a running host.
#[derive(Debug, Clone)]
pub struct HostHandle {
    commands: mpsc::Sender<HostCommand>,
    events: broadcast::Sender<SessionEvent>,
}

impl HostHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> HostCommand,
    ) -> Result<T, HostError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| HostError::Stopped)?;
        reply_rx.await.map_err(|_| HostError::ReplyDropped)
    }

    pub async fn attack(&self, request: AttackRequest) -> Result<AttackOutcome, HostError> {
        Ok(self
            .request(|reply| HostCommand::Attack { request, reply })
            .await??)
    }

    pub async fn begin_turn(&self, entity: EntityId) -> Result<AttackTracker, HostError> {
        Ok(self
            .request(|reply| HostCommand::BeginTurn { entity, reply })
            .await??)
    }

    /// End the current turn. Returns whose turn is next.
    pub async fn end_turn(&self) -> Result<Option<EntityId>, HostError> {
        self.request(|reply| HostCommand::EndTurn { reply }).await
    }

    pub async fn set_dodging(&self, entity: EntityId, dodging: bool) -> Result<(), HostError> {
        Ok(self
            .request(|reply| HostCommand::SetDodging {
                entity,
                dodging,
                reply,
            })
            .await??)
    }

    pub async fn move_to(&self, entity: EntityId, position: GridPosition) -> Result<(), HostError> {
        Ok(self
            .request(|reply| HostCommand::MoveTo {
                entity,
                position,
                reply,
            })
            .await??)
    }

    pub async fn add_condition(
        &self,
        entity: EntityId,
        condition: ActiveCondition,
    ) -> Result<(), HostError> {
        Ok(self
            .request(|reply| HostCommand::AddCondition {
                entity,
                condition,
                reply,
            })
            .await??)
    }

    pub async fn remove_condition(
        &self,
        entity: EntityId,
        condition: Condition,
    ) -> Result<(), HostError> {
        Ok(self
            .request(|reply| HostCommand::RemoveCondition {
                entity,
                condition,
                reply,
            })
            .await??)
    }

    pub async fn snapshot(&self) -> Result<Encounter, HostError> {
        self.request(|reply| HostCommand::Snapshot { reply }).await
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Stop the host once the commands queued ahead of this one are handled.
    pub async fn shutdown(self) -> Result<Encounter, HostError> {
        self.request(|reply| HostCommand::Shutdown { reply }).await
    }
}
