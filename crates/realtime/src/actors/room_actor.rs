//! One tokio task per live room: owns the `RoomState`, drives the pure
//! reducer, and translates its output into Socket.IO broadcasts, real
//! timers, and best-effort persistence writes.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use doodleguess_core::catalogue::WordCatalogue;
use doodleguess_core::game::{reduce, Recipients, RoomCommand, RoomEvent, RoomState, Targeted, TimerAction, TimerKind};
use doodleguess_core::CoreError;
use doodleguess_db::DbPool;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use socketioxide::SocketIo;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::registry::RoomRegistry;

/// A command paired with an optional reply channel; timer fires and the
/// disconnect notification carry no reply, since nothing is waiting.
pub struct Envelope {
    pub command: RoomCommand,
    pub respond: Option<oneshot::Sender<CommandReply>>,
}

impl Envelope {
    pub fn new(command: RoomCommand, respond: oneshot::Sender<CommandReply>) -> Self {
        Self { command, respond: Some(respond) }
    }

    pub fn fire_and_forget(command: RoomCommand) -> Self {
        Self { command, respond: None }
    }
}

/// A command's verdict, paired with a snapshot of the room state taken
/// right after it was applied — callers that need more than a bare ack
/// (e.g. a joining player's recent chat history) read it from here
/// rather than round-tripping back through the actor.
pub struct CommandReply {
    pub result: Result<(), CoreError>,
    pub state: RoomState,
}

pub struct RoomActor {
    state: RoomState,
    rx: mpsc::Receiver<Envelope>,
    tx: mpsc::Sender<Envelope>,
    db: DbPool,
    io: SocketIo,
    registry: Arc<RoomRegistry>,
    rng: ChaCha20Rng,
    catalogue: WordCatalogue,
    generations: HashMap<TimerKind, u64>,
}

impl RoomActor {
    pub fn new(
        state: RoomState,
        rx: mpsc::Receiver<Envelope>,
        tx: mpsc::Sender<Envelope>,
        db: DbPool,
        io: SocketIo,
        registry: Arc<RoomRegistry>,
    ) -> Self {
        Self {
            state,
            rx,
            tx,
            db,
            io,
            registry,
            rng: ChaCha20Rng::from_entropy(),
            catalogue: WordCatalogue::default(),
            generations: HashMap::new(),
        }
    }

    pub async fn run(mut self) {
        let room_id = self.state.id.clone();
        let code = self.state.code.clone();

        while let Some(envelope) = self.rx.recv().await {
            let Envelope { command, respond } = envelope;

            if let RoomCommand::TimerFired { kind, generation } = &command {
                if self.generations.get(kind).copied().unwrap_or(0) != *generation {
                    debug!(room_id = %room_id, ?kind, generation, "discarding stale timer fire");
                    continue;
                }
            }

            let name = command.name();
            let removed_player_id = match &command {
                RoomCommand::Leave { player_id } => Some(player_id.clone()),
                RoomCommand::KickPlayer { target_id, .. } => Some(target_id.clone()),
                _ => None,
            };
            let result = reduce(&self.state, command, Utc::now(), &mut self.rng, &self.catalogue);
            self.state = result.state;

            self.apply_timer_actions(&result.timer_actions);
            self.emit_events(&result.events);
            let removed_player_id = removed_player_id.filter(|_| result.reply.is_ok());
            self.persist_after(&result.events, removed_player_id.as_deref()).await;

            debug!(room_id = %room_id, command = name, events = result.events.len(), "processed command");

            if let Some(respond) = respond {
                let _ = respond.send(CommandReply { result: result.reply, state: self.state.clone() });
            }

            if result.destroy {
                break;
            }
        }

        if let Err(err) = doodleguess_db::players::delete_players_for_room(&self.db, &room_id).await {
            warn!(error = %err, room_id = %room_id, "failed to delete player rows on eviction");
        }
        if let Err(err) = doodleguess_db::rooms::delete_room(&self.db, &room_id).await {
            warn!(error = %err, room_id = %room_id, "failed to delete room row on eviction");
        }
        self.registry.remove(&room_id, &code);
    }

    fn apply_timer_actions(&mut self, actions: &[TimerAction]) {
        for action in actions {
            match action {
                TimerAction::Schedule { kind, after_secs } => {
                    let generation = self.generations.entry(*kind).or_insert(0);
                    *generation += 1;
                    let fire_generation = *generation;
                    let kind = *kind;
                    let after_secs = *after_secs;
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(Duration::from_secs(after_secs)).await;
                        let _ = tx
                            .send(Envelope::fire_and_forget(RoomCommand::TimerFired {
                                kind,
                                generation: fire_generation,
                            }))
                            .await;
                    });
                }
                TimerAction::Cancel { kind } => {
                    *self.generations.entry(*kind).or_insert(0) += 1;
                }
                TimerAction::CancelAll => {
                    for generation in self.generations.values_mut() {
                        *generation += 1;
                    }
                }
            }
        }
    }

    fn emit_events(&self, events: &[Targeted]) {
        for targeted in events {
            let name = targeted.event.name();
            let result = match &targeted.recipients {
                Recipients::Room => self.io.to(self.state.code.clone()).emit(name, &targeted.event),
                Recipients::Player(player_id) => self.io.to(player_id.clone()).emit(name, &targeted.event),
            };
            if let Err(err) = result {
                warn!(error = %err, event = name, "failed to emit room event");
            }
        }
    }

    /// Best-effort persistence: the in-memory `RoomState` stays
    /// authoritative regardless of whether any of this succeeds (§4.7).
    ///
    /// `removed_player_id` carries the member a successful `Leave` or
    /// `KickPlayer` command took out of `state.players`; the reducer's
    /// events don't always name that player directly, so the actor
    /// tracks it from the originating command instead.
    async fn persist_after(&self, events: &[Targeted], removed_player_id: Option<&str>) {
        if let Err(err) = doodleguess_db::rooms::sync_room_state(
            &self.db,
            &self.state.id,
            &self.state.host_player_id,
            &self.state.phase.to_string(),
            self.state.players.len() as i16,
        )
        .await
        {
            warn!(error = %err, room_id = %self.state.id, "failed to sync room row");
        }

        if let Some(player_id) = removed_player_id {
            if let Err(err) = doodleguess_db::players::delete_player(&self.db, player_id).await {
                warn!(error = %err, player_id = %player_id, "failed to delete player row");
            }
        }

        for targeted in events {
            match &targeted.event {
                RoomEvent::PlayerJoined { player_id, .. } => self.persist_new_player(player_id).await,
                RoomEvent::HostChanged { new_host_id, .. } => self.persist_host_change(new_host_id).await,
                RoomEvent::CorrectGuess { .. } => self.persist_scores().await,
                RoomEvent::GameEnded { rankings } => {
                    for (i, row) in rankings.iter().enumerate() {
                        let Some(user_id) = &row.user_id else { continue };
                        let won = i == 0;
                        if let Err(err) = doodleguess_db::profiles::record_game_result(
                            &self.db,
                            user_id,
                            row.score as i32,
                            won,
                        )
                        .await
                        {
                            warn!(error = %err, user_id = %user_id, "failed to record game result");
                        }
                    }
                }
                _ => {}
            }
        }
    }

    async fn persist_new_player(&self, player_id: &str) {
        let Some(player) = self.state.get_player(player_id) else { return };
        if let Err(err) = doodleguess_db::players::insert_player(
            &self.db,
            &player.id,
            &self.state.id,
            player.user_id.as_deref(),
            &player.name,
            player.avatar.as_deref(),
            player.is_host,
            &player.session_id,
        )
        .await
        {
            // A rejoin with a previously-seen id hits this path too; a
            // unique-violation here is the expected, harmless case.
            debug!(error = %err, player_id = %player_id, "insert_player no-op (likely a rejoin)");
        }
    }

    async fn persist_host_change(&self, new_host_id: &str) {
        if let Err(err) = doodleguess_db::players::set_host(&self.db, &self.state.id, new_host_id).await {
            warn!(error = %err, room_id = %self.state.id, new_host_id = %new_host_id, "failed to persist host change");
        }
    }

    async fn persist_scores(&self) {
        for player in &self.state.players {
            if let Err(err) =
                doodleguess_db::players::update_score(&self.db, &player.id, player.score as i32).await
            {
                warn!(error = %err, player_id = %player.id, "failed to persist score");
            }
        }
    }
}
