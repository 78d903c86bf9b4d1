//! Room state reducer - the heart of the room engine.
//!
//! A pure function that takes room state, a command, the current time
//! and a source of randomness, and returns the new state along with any
//! events and timer actions that resulted. Both the production actor and
//! this module's tests drive the same function, so behaviour under test
//! is exactly behaviour in production.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::catalogue::{self, WordCatalogue};
use crate::error::CoreError;
use crate::guess::{self, GuessOutcome};
use crate::id;

use super::commands::{RoomCommand, TimerKind};
use super::events::{RankingRow, RoomEvent, Targeted};
use super::rules::{self, RoomSettings};
use super::scoring;
use super::state::{ChatMessage, PlayerState, RoomPhase, RoomState};

/// An instruction to (re)schedule or cancel a room-owned timer. The
/// reducer only declares intent; the actor owns the actual sleep tasks
/// and the generation counters that let a stale fire be discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    Schedule { kind: TimerKind, after_secs: u64 },
    Cancel { kind: TimerKind },
    /// Cancel every timer kind legal nowhere outside this room's
    /// lifetime — used on gameEnd and on room destruction (invariant 6).
    CancelAll,
}

/// Result of applying a command to the room state.
#[derive(Debug)]
pub struct ReducerResult {
    pub state: RoomState,
    pub events: Vec<Targeted>,
    pub timer_actions: Vec<TimerAction>,
    /// The command's synchronous reply (§7 propagation policy): errors
    /// are returned here and never broadcast.
    pub reply: Result<(), CoreError>,
    /// Set when the room has no members left and its empty-room grace
    /// timer fired; the registry should remove it from the live map and
    /// the persistence store.
    pub destroy: bool,
}

impl ReducerResult {
    fn ok(state: RoomState, events: Vec<Targeted>, timer_actions: Vec<TimerAction>) -> Self {
        Self { state, events, timer_actions, reply: Ok(()), destroy: false }
    }

    fn unchanged(state: RoomState, err: CoreError) -> Self {
        Self { state, events: vec![], timer_actions: vec![], reply: Err(err), destroy: false }
    }
}

/// Pure function: apply a command to room state, returning the new
/// state, the events it produced, and any timer (re)scheduling needed.
pub fn reduce(
    state: &RoomState,
    command: RoomCommand,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
    catalogue: &WordCatalogue,
) -> ReducerResult {
    match command {
        RoomCommand::Join { player_id, session_id, name, avatar, restored_score } => {
            handle_join(state.clone(), player_id, session_id, name, avatar, restored_score)
        }
        RoomCommand::Leave { player_id } => handle_leave(state.clone(), player_id),
        RoomCommand::Disconnect { player_id } => handle_disconnect(state.clone(), player_id),
        RoomCommand::Reconnect { player_id, new_session_id } => {
            handle_reconnect(state.clone(), player_id, new_session_id)
        }
        RoomCommand::UpdateSettings { player_id, draw_time, max_rounds } => {
            handle_update_settings(state.clone(), player_id, draw_time, max_rounds)
        }
        RoomCommand::StartGame { player_id } => handle_start_game(state.clone(), player_id, now, rng),
        RoomCommand::SelectWord { player_id, word } => {
            handle_select_word(state.clone(), player_id, word, now)
        }
        RoomCommand::PlayAgain { player_id } => handle_play_again(state.clone(), player_id),
        RoomCommand::ChatOrGuess { player_id, text } => {
            handle_chat_or_guess(state.clone(), player_id, text, now)
        }
        RoomCommand::DrawStroke { player_id, payload } => {
            handle_draw(state.clone(), player_id, RoomEvent::DrawStroke { payload })
        }
        RoomCommand::DrawClear { player_id } => {
            handle_draw(state.clone(), player_id, RoomEvent::DrawClear)
        }
        RoomCommand::DrawUndo { player_id } => {
            handle_draw(state.clone(), player_id, RoomEvent::DrawUndo)
        }
        RoomCommand::KickPlayer { player_id, target_id } => {
            handle_kick(state.clone(), player_id, target_id, now)
        }
        RoomCommand::TimerFired { kind, generation: _ } => {
            handle_timer(state.clone(), kind, now, rng, catalogue)
        }
    }
}

// ---------------------------------------------------------------------
// Snapshot / chat helpers
// ---------------------------------------------------------------------

fn snapshot_event(state: &RoomState) -> Targeted {
    use super::events::{PlayerSnapshot, RoomSnapshot};

    let room = RoomSnapshot {
        id: state.id.clone(),
        code: state.code.clone(),
        phase: state.phase.to_string(),
        round: state.round,
        turn: state.turn,
        max_rounds: state.settings.max_rounds,
        time_left: state.time_left,
        draw_time: state.settings.draw_time,
        current_drawer: state.current_drawer_id.clone(),
        word_length: state.masked_word.as_ref().map(|m| m.chars().count()),
        masked_word: state.masked_word.clone(),
        theme: state.settings.theme.clone(),
        is_private: state.settings.is_private,
        max_players: state.settings.max_players,
    };
    let players = state.players.iter().map(PlayerSnapshot::from).collect();
    Targeted::room(RoomEvent::RoomSync { room, players })
}

fn validate_chat_text(text: &str) -> Result<String, CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().count() > rules::MAX_CHAT_LENGTH {
        return Err(CoreError::InvalidInput("message length out of range".into()));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------
// Membership (§4.5)
// ---------------------------------------------------------------------

fn handle_join(
    mut state: RoomState,
    player_id: String,
    session_id: String,
    name: String,
    avatar: Option<String>,
    restored_score: Option<u32>,
) -> ReducerResult {
    if state.phase != RoomPhase::Lobby {
        return ReducerResult::unchanged(state, CoreError::WrongPhase("room is not in lobby".into()));
    }
    if state.players.len() >= state.settings.max_players as usize {
        return ReducerResult::unchanged(state, CoreError::RoomFull);
    }
    if let Some(deny_until) = state.kick_deny_until.get(&player_id) {
        if *deny_until > Utc::now() {
            return ReducerResult::unchanged(
                state,
                CoreError::NotAuthorised("recently kicked from this room".into()),
            );
        }
    }
    let trimmed_name = name.trim();
    if trimmed_name.is_empty() || trimmed_name.chars().count() > rules::MAX_NAME_LENGTH {
        return ReducerResult::unchanged(state, CoreError::InvalidInput("name length out of range".into()));
    }

    let mut player = PlayerState::new(player_id.clone(), session_id, trimmed_name.to_string(), avatar);
    if let Some(score) = restored_score {
        player.score = score;
    }
    // A room that emptied out and is being rejoined has no host left to
    // transfer from; the first joiner picks it back up (invariant 4).
    if state.players.is_empty() {
        player.is_host = true;
    }
    state.players.push(player);
    state.drawer_order.push(player_id.clone());
    state.last_activity = Utc::now();

    let mut events = vec![Targeted::room(RoomEvent::PlayerJoined {
        player_id,
        name: trimmed_name.to_string(),
    })];
    events.push(snapshot_event(&state));

    ReducerResult::ok(state, events, vec![TimerAction::Cancel { kind: TimerKind::EmptyRoomCleanup }])
}

fn remove_member(state: &mut RoomState, player_id: &str) -> Option<PlayerState> {
    let idx = state.players.iter().position(|p| p.id == player_id)?;
    let player = state.players.remove(idx);
    state.drawer_order.retain(|id| id != player_id);
    state.guessed_players.remove(player_id);
    Some(player)
}

/// Shared tail of leave/disconnect/kick: host promotion, drawer-left
/// transition, and empty-room cleanup scheduling.
fn after_member_removed(
    mut state: RoomState,
    removed: PlayerState,
    now: DateTime<Utc>,
) -> (RoomState, Vec<Targeted>, Vec<TimerAction>) {
    let mut events = Vec::new();
    let mut timer_actions = Vec::new();

    if removed.is_host {
        if let Some(new_host_id) = state.drawer_order.first().cloned() {
            if let Some(p) = state.get_player_mut(&new_host_id) {
                p.is_host = true;
                events.push(Targeted::room(RoomEvent::HostChanged {
                    new_host_id: p.id.clone(),
                    new_host_name: p.name.clone(),
                }));
            }
        }
    }

    let was_drawer = state.current_drawer_id.as_deref() == Some(removed.id.as_str());
    if was_drawer && state.phase == RoomPhase::Drawing {
        let (s, mut evs, mut actions) =
            enter_round_end(state, removed.id.clone(), "drawer left".into(), false, now);
        state = s;
        events.append(&mut evs);
        timer_actions.append(&mut actions);
    }

    if state.players.is_empty() {
        timer_actions.push(TimerAction::Schedule {
            kind: TimerKind::EmptyRoomCleanup,
            after_secs: rules::EMPTY_ROOM_GRACE_SECS,
        });
    } else {
        events.push(snapshot_event(&state));
    }

    (state, events, timer_actions)
}

fn handle_leave(mut state: RoomState, player_id: String) -> ReducerResult {
    let Some(removed) = remove_member(&mut state, &player_id) else {
        return ReducerResult::unchanged(state, CoreError::NotMember);
    };
    let (state, events, timer_actions) = after_member_removed(state, removed, Utc::now());
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_disconnect(mut state: RoomState, player_id: String) -> ReducerResult {
    let Some(player) = state.get_player_mut(&player_id) else {
        return ReducerResult::unchanged(state, CoreError::NotMember);
    };
    if !player.is_connected {
        return ReducerResult::ok(state, vec![], vec![]);
    }
    player.is_connected = false;

    let mut events = vec![Targeted::room(RoomEvent::PlayerDisconnected { player_id: player_id.clone() })];
    let mut timer_actions = Vec::new();

    let was_drawer = state.current_drawer_id.as_deref() == Some(player_id.as_str());
    if state.phase == RoomPhase::Drawing {
        if was_drawer {
            let (s, mut evs, mut actions) =
                enter_round_end(state, player_id.clone(), "drawer left".into(), false, Utc::now());
            state = s;
            events.append(&mut evs);
            timer_actions.append(&mut actions);
        } else if state.connected_non_drawer_ids().is_empty() {
            let (s, mut evs, mut actions) =
                enter_round_end(state, player_id.clone(), "all disconnected".into(), false, Utc::now());
            state = s;
            events.append(&mut evs);
            timer_actions.append(&mut actions);
        }
    }

    events.push(snapshot_event(&state));
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_reconnect(mut state: RoomState, player_id: String, new_session_id: String) -> ReducerResult {
    let Some(player) = state.get_player_mut(&player_id) else {
        return ReducerResult::unchanged(state, CoreError::NotMember);
    };
    player.session_id = new_session_id;
    player.is_connected = true;

    let events = vec![
        Targeted::whisper(player_id, snapshot_event(&state).event),
    ];
    ReducerResult::ok(state, events, vec![TimerAction::Cancel { kind: TimerKind::EmptyRoomCleanup }])
}

fn handle_kick(
    mut state: RoomState,
    requester_id: String,
    target_id: String,
    now: DateTime<Utc>,
) -> ReducerResult {
    if !state.get_player(&requester_id).is_some_and(|p| p.is_host) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("host only".into()));
    }
    let Some(removed) = remove_member(&mut state, &target_id) else {
        return ReducerResult::unchanged(state, CoreError::NotMember);
    };
    state.kick_deny_until.insert(target_id.clone(), now + chrono::Duration::seconds(60));

    let (state, mut events, timer_actions) = after_member_removed(state, removed, now);
    events.insert(0, Targeted::whisper(target_id, RoomEvent::PlayerKicked { reason: "kicked by host".into() }));
    ReducerResult::ok(state, events, timer_actions)
}

// ---------------------------------------------------------------------
// Settings & lifecycle (§4.2)
// ---------------------------------------------------------------------

fn handle_update_settings(
    mut state: RoomState,
    player_id: String,
    draw_time: Option<u32>,
    max_rounds: Option<u8>,
) -> ReducerResult {
    if !state.get_player(&player_id).is_some_and(|p| p.is_host) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("host only".into()));
    }
    if state.phase != RoomPhase::Lobby {
        return ReducerResult::unchanged(state, CoreError::WrongPhase("settings are lobby-only".into()));
    }
    if let Err(msg) = RoomSettings::validate_update(draw_time, max_rounds) {
        return ReducerResult::unchanged(state, CoreError::InvalidInput(msg));
    }
    if let Some(dt) = draw_time {
        state.settings.draw_time = dt;
    }
    if let Some(r) = max_rounds {
        state.settings.max_rounds = r;
    }
    let events = vec![snapshot_event(&state)];
    ReducerResult::ok(state, events, vec![])
}

fn handle_start_game(
    mut state: RoomState,
    player_id: String,
    _now: DateTime<Utc>,
    rng: &mut impl Rng,
) -> ReducerResult {
    if !state.get_player(&player_id).is_some_and(|p| p.is_host) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("host only".into()));
    }
    if state.phase != RoomPhase::Lobby || state.is_starting {
        return ReducerResult::unchanged(state, CoreError::WrongPhase("game already starting or in progress".into()));
    }
    if state.connected_count() < rules::MIN_PLAYERS as usize {
        return ReducerResult::unchanged(state, CoreError::InvalidInput("not enough players".into()));
    }

    use rand::seq::SliceRandom;
    state.drawer_order.shuffle(rng);
    state.round = 1;
    state.turn = 0;
    state.is_starting = true;

    let events = vec![Targeted::room(RoomEvent::GameStarting { countdown: rules::START_COUNTDOWN_SECS })];
    let timer_actions = vec![TimerAction::Schedule {
        kind: TimerKind::StartCountdown,
        after_secs: rules::START_COUNTDOWN_SECS,
    }];
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_play_again(mut state: RoomState, player_id: String) -> ReducerResult {
    if !state.get_player(&player_id).is_some_and(|p| p.is_host) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("host only".into()));
    }
    if state.phase != RoomPhase::GameEnd {
        return ReducerResult::unchanged(state, CoreError::WrongPhase("play again is only valid after gameEnd".into()));
    }
    for p in state.players.iter_mut() {
        p.score = 0;
        p.has_guessed = false;
        p.is_drawing = false;
    }
    state.phase = RoomPhase::Lobby;
    state.round = 1;
    state.turn = 0;
    state.current_drawer_id = None;
    state.current_word = None;
    state.masked_word = None;
    state.guessed_players.clear();
    state.offered_words.clear();
    state.is_starting = false;
    state.pending_round_end_reason = None;

    let events = vec![snapshot_event(&state)];
    ReducerResult::ok(state, events, vec![TimerAction::CancelAll])
}

// ---------------------------------------------------------------------
// choosing / drawing transitions (§4.2, §4.3)
// ---------------------------------------------------------------------

fn enter_choosing(
    mut state: RoomState,
    rng: &mut impl Rng,
    catalogue: &WordCatalogue,
) -> (RoomState, Vec<Targeted>, Vec<TimerAction>) {
    state.phase = RoomPhase::Choosing;
    state.is_starting = false;
    state.current_word = None;
    state.masked_word = None;
    state.pending_round_end_reason = None;

    let drawer_id = state.drawer_order[state.turn % state.drawer_order.len()].clone();
    for p in state.players.iter_mut() {
        p.has_guessed = false;
        p.is_drawing = p.id == drawer_id;
    }
    state.current_drawer_id = Some(drawer_id.clone());
    state.guessed_players.clear();

    let words = catalogue.pick_distinct(&state.settings.theme, 3, rng);
    state.offered_words = words.clone();

    let mut events = vec![Targeted::whisper(drawer_id, RoomEvent::ChooseWord { words })];
    events.push(snapshot_event(&state));

    let timer_actions = vec![TimerAction::Schedule {
        kind: TimerKind::AutoPick,
        after_secs: rules::AUTO_PICK_TIMEOUT_SECS,
    }];
    (state, events, timer_actions)
}

fn enter_drawing(mut state: RoomState, word: String) -> (RoomState, Vec<Targeted>, Vec<TimerAction>) {
    let drawer_id = state.current_drawer_id.clone().unwrap_or_default();
    state.phase = RoomPhase::Drawing;
    state.masked_word = Some(catalogue::mask(&word));
    state.time_left = state.settings.draw_time;
    state.guessed_players.clear();
    state.offered_words.clear();
    state.current_word = Some(word.clone());

    let mut events = vec![Targeted::whisper(drawer_id.clone(), RoomEvent::Word { word })];
    events.push(Targeted::room(RoomEvent::TurnStart {
        drawer_id,
        word_length: state.masked_word.as_ref().unwrap().chars().count(),
        masked_word: state.masked_word.clone().unwrap(),
        time_left: state.time_left,
    }));
    events.push(snapshot_event(&state));

    let timer_actions = vec![
        TimerAction::Cancel { kind: TimerKind::AutoPick },
        TimerAction::Schedule { kind: TimerKind::Tick, after_secs: 1 },
    ];
    (state, events, timer_actions)
}

fn enter_round_end(
    mut state: RoomState,
    _triggering_player: String,
    reason: String,
    all_guessed: bool,
    _now: DateTime<Utc>,
) -> (RoomState, Vec<Targeted>, Vec<TimerAction>) {
    let word = state.current_word.clone().unwrap_or_default();
    state.phase = RoomPhase::RoundEnd;
    state.pending_round_end_reason = None;
    for p in state.players.iter_mut() {
        p.is_drawing = false;
    }
    state.current_word = None;
    state.masked_word = None;

    let mut events =
        vec![Targeted::room(RoomEvent::TurnEnd { word, reason, all_guessed })];
    events.push(snapshot_event(&state));

    let timer_actions = vec![
        TimerAction::Cancel { kind: TimerKind::Tick },
        TimerAction::Cancel { kind: TimerKind::AutoPick },
        TimerAction::Schedule { kind: TimerKind::PostTurnDelay, after_secs: rules::TURN_END_DELAY_SECS },
    ];
    (state, events, timer_actions)
}

fn enter_game_end(mut state: RoomState, reason_note: &str) -> (RoomState, Vec<Targeted>, Vec<TimerAction>) {
    let _ = reason_note;
    state.phase = RoomPhase::GameEnd;
    state.current_drawer_id = None;
    for p in state.players.iter_mut() {
        p.is_drawing = false;
    }

    let mut ranked: Vec<&PlayerState> = state.players.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    let rankings = ranked
        .into_iter()
        .enumerate()
        .map(|(i, p)| RankingRow {
            rank: (i + 1) as u8,
            id: p.id.clone(),
            name: p.name.clone(),
            score: p.score,
            user_id: p.user_id.clone(),
        })
        .collect();

    let events = vec![Targeted::room(RoomEvent::GameEnded { rankings }), snapshot_event(&state)];
    (state, events, vec![TimerAction::CancelAll])
}

fn handle_select_word(mut state: RoomState, player_id: String, word: String, _now: DateTime<Utc>) -> ReducerResult {
    if state.phase != RoomPhase::Choosing {
        return ReducerResult::unchanged(state, CoreError::WrongPhase("word selection is choosing-only".into()));
    }
    if state.current_drawer_id.as_deref() != Some(player_id.as_str()) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("only the drawer selects a word".into()));
    }
    if !state.offered_words.contains(&word) {
        return ReducerResult::unchanged(state, CoreError::InvalidInput("word was not offered".into()));
    }
    let (s, events, timer_actions) = enter_drawing(state.clone(), word);
    state = s;
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_draw(state: RoomState, player_id: String, event: RoomEvent) -> ReducerResult {
    if state.phase != RoomPhase::Drawing || state.current_drawer_id.as_deref() != Some(player_id.as_str()) {
        return ReducerResult::unchanged(state, CoreError::NotAuthorised("only the current drawer may draw".into()));
    }
    ReducerResult::ok(state, vec![Targeted::room(event)], vec![])
}

// ---------------------------------------------------------------------
// Guess arbitration (§4.4)
// ---------------------------------------------------------------------

fn handle_chat_or_guess(mut state: RoomState, player_id: String, text: String, now: DateTime<Utc>) -> ReducerResult {
    let trimmed = match validate_chat_text(&text) {
        Ok(t) => t,
        Err(e) => return ReducerResult::unchanged(state, e),
    };

    let is_drawer = state.current_drawer_id.as_deref() == Some(player_id.as_str());
    let already_guessed = state.get_player(&player_id).is_some_and(|p| p.has_guessed);

    if state.phase == RoomPhase::Drawing && !is_drawer && !already_guessed {
        let word = state.current_word.clone().unwrap_or_default();
        match guess::evaluate(&trimmed, &word) {
            GuessOutcome::Correct => return handle_correct_guess(state, player_id, now),
            GuessOutcome::Close => {
                let name = state.get_player(&player_id).map(|p| p.name.clone()).unwrap_or_default();
                let message = ChatMessage {
                    id: id::generate_chat_id(),
                    player_id: player_id.clone(),
                    player_name: name,
                    text: trimmed.clone(),
                    timestamp: now,
                    is_guess: true,
                    is_close: true,
                };
                state.push_chat(message.clone());
                let events = vec![
                    Targeted::room(RoomEvent::ChatMessage(message)),
                    Targeted::whisper(player_id, RoomEvent::CloseGuess { message: trimmed }),
                ];
                return ReducerResult::ok(state, events, vec![]);
            }
            GuessOutcome::Miss => {}
        }
    }

    let name = state.get_player(&player_id).map(|p| p.name.clone()).unwrap_or_default();
    let is_guess = state.phase == RoomPhase::Drawing && !is_drawer;
    let message = ChatMessage {
        id: id::generate_chat_id(),
        player_id,
        player_name: name,
        text: trimmed,
        timestamp: now,
        is_guess,
        is_close: false,
    };
    state.push_chat(message.clone());
    ReducerResult::ok(state, vec![Targeted::room(RoomEvent::ChatMessage(message))], vec![])
}

fn handle_correct_guess(mut state: RoomState, player_id: String, now: DateTime<Utc>) -> ReducerResult {
    state.guessed_players.insert(player_id.clone());
    let guessed_count_after = state.guessed_players.len() as u32;
    let time_left = state.time_left;
    let draw_time = state.settings.draw_time;
    let points = scoring::guesser_points(time_left, draw_time, guessed_count_after);

    let mut player_name = String::new();
    if let Some(p) = state.get_player_mut(&player_id) {
        p.has_guessed = true;
        p.score += points;
        player_name = p.name.clone();
    }
    if let Some(drawer_id) = state.current_drawer_id.clone() {
        if let Some(drawer) = state.get_player_mut(&drawer_id) {
            drawer.score += scoring::drawer_bonus();
        }
    }

    let mut events = vec![Targeted::room(RoomEvent::CorrectGuess {
        player_id: player_id.clone(),
        player_name,
        points,
    })];

    let mut timer_actions = Vec::new();
    let all_guessed = state
        .connected_non_drawer_ids()
        .iter()
        .all(|id| state.get_player(id).is_some_and(|p| p.has_guessed));
    if all_guessed {
        // 1s settle: piggy-back on the next tick instead of a bespoke timer.
        state.pending_round_end_reason = Some("all guessed".into());
    }
    events.push(snapshot_event(&state));
    let _ = now;

    timer_actions.push(TimerAction::Cancel { kind: TimerKind::Tick });
    timer_actions.push(TimerAction::Schedule { kind: TimerKind::Tick, after_secs: 1 });
    ReducerResult::ok(state, events, timer_actions)
}

// ---------------------------------------------------------------------
// Timers (§4.3)
// ---------------------------------------------------------------------

fn handle_timer(
    state: RoomState,
    kind: TimerKind,
    now: DateTime<Utc>,
    rng: &mut impl Rng,
    catalogue: &WordCatalogue,
) -> ReducerResult {
    match kind {
        TimerKind::StartCountdown => handle_start_countdown_fire(state, rng, catalogue),
        TimerKind::AutoPick => handle_auto_pick_fire(state, now),
        TimerKind::Tick | TimerKind::HintReveal => handle_tick_fire(state, now, rng),
        TimerKind::PostTurnDelay => handle_post_turn_delay_fire(state, rng, catalogue),
        TimerKind::EmptyRoomCleanup => handle_empty_room_cleanup_fire(state),
    }
}

fn handle_start_countdown_fire(state: RoomState, rng: &mut impl Rng, catalogue: &WordCatalogue) -> ReducerResult {
    if state.phase != RoomPhase::Lobby || !state.is_starting {
        return ReducerResult::ok(state, vec![], vec![]);
    }
    let (state, events, timer_actions) = enter_choosing(state, rng, catalogue);
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_auto_pick_fire(state: RoomState, now: DateTime<Utc>) -> ReducerResult {
    if state.phase != RoomPhase::Choosing {
        return ReducerResult::ok(state, vec![], vec![]);
    }
    let word = state.offered_words.first().cloned().unwrap_or_default();
    let (state, events, timer_actions) = enter_drawing(state, word);
    let _ = now;
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_tick_fire(mut state: RoomState, now: DateTime<Utc>, rng: &mut impl Rng) -> ReducerResult {
    if state.phase != RoomPhase::Drawing {
        return ReducerResult::ok(state, vec![], vec![]);
    }

    if let Some(reason) = state.pending_round_end_reason.clone() {
        let (state, events, timer_actions) =
            enter_round_end(state, String::new(), reason, true, now);
        return ReducerResult::ok(state, events, timer_actions);
    }

    state.time_left = state.time_left.saturating_sub(1);
    let mut events = vec![Targeted::room(RoomEvent::TimeUpdate { time_left: state.time_left })];

    let draw_time = state.settings.draw_time;
    if state.time_left > 0
        && state.time_left % rules::HINT_INTERVAL_SECS == 0
        && state.time_left < draw_time.saturating_sub(10)
    {
        if let (Some(masked), Some(word)) = (state.masked_word.clone(), state.current_word.clone()) {
            let revealed = catalogue::reveal_one(&masked, &word, rng);
            state.masked_word = Some(revealed.clone());
            events.push(Targeted::room(RoomEvent::Hint { masked_word: revealed }));
        }
    }

    if state.time_left == 0 {
        let (s, mut evs, actions) =
            enter_round_end(state, String::new(), "time up".into(), false, now);
        events.append(&mut evs);
        return ReducerResult::ok(s, events, actions);
    }

    ReducerResult::ok(state, events, vec![TimerAction::Schedule { kind: TimerKind::Tick, after_secs: 1 }])
}

fn handle_post_turn_delay_fire(
    state: RoomState,
    rng: &mut impl Rng,
    catalogue: &WordCatalogue,
) -> ReducerResult {
    if state.phase != RoomPhase::RoundEnd {
        return ReducerResult::ok(state, vec![], vec![]);
    }

    if state.connected_count() < rules::MIN_PLAYERS as usize {
        let (state, events, timer_actions) = enter_game_end(state, "too few players");
        return ReducerResult::ok(state, events, timer_actions);
    }

    let order_len = state.drawer_order.len();
    if order_len == 0 {
        let (state, events, timer_actions) = enter_game_end(state, "no players remain");
        return ReducerResult::ok(state, events, timer_actions);
    }

    let next_turn = state.turn + 1;
    if next_turn < order_len {
        let mut state = state;
        state.turn = next_turn;
        let (state, events, timer_actions) = enter_choosing(state, rng, catalogue);
        return ReducerResult::ok(state, events, timer_actions);
    }

    if state.round < state.settings.max_rounds {
        let mut state = state;
        state.turn = 0;
        state.round += 1;
        let mut events = vec![Targeted::room(RoomEvent::RoundEnd { round: state.round })];
        let (state, mut more, timer_actions) = enter_choosing(state, rng, catalogue);
        events.append(&mut more);
        return ReducerResult::ok(state, events, timer_actions);
    }

    let (state, events, timer_actions) = enter_game_end(state, "final round complete");
    ReducerResult::ok(state, events, timer_actions)
}

fn handle_empty_room_cleanup_fire(state: RoomState) -> ReducerResult {
    if !state.players.is_empty() {
        return ReducerResult::ok(state, vec![], vec![]);
    }
    ReducerResult { state, events: vec![], timer_actions: vec![TimerAction::CancelAll], reply: Ok(()), destroy: true }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(42)
    }

    fn two_player_room() -> RoomState {
        let now = Utc::now();
        let host = PlayerState::new("ply_a".into(), "tok_a".into(), "A".into(), None);
        let mut settings = RoomSettings::default();
        settings.draw_time = 30;
        settings.max_rounds = 1;
        let mut room = RoomState::new("room_1".into(), "ABCDEF".into(), host, settings, now);
        let join = reduce(
            &room,
            RoomCommand::Join {
                player_id: "ply_b".into(),
                session_id: "tok_b".into(),
                name: "B".into(),
                avatar: None,
                restored_score: None,
            },
            now,
            &mut rng(),
            &WordCatalogue::default(),
        );
        room = join.state;
        room
    }

    /// S1 — happy path, two players, one round.
    #[test]
    fn scenario_s1_happy_path() {
        let mut room = two_player_room();
        let now = Utc::now();
        let catalogue = WordCatalogue::default();
        let mut r = rng();

        let start = reduce(&room, RoomCommand::StartGame { player_id: "ply_a".into() }, now, &mut r, &catalogue);
        assert!(start.reply.is_ok());
        room = start.state;
        assert!(room.is_starting);

        let countdown_fire = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::StartCountdown, generation: 0 },
            now,
            &mut r,
            &catalogue,
        );
        room = countdown_fire.state;
        assert_eq!(room.phase, RoomPhase::Choosing);
        let drawer_id = room.current_drawer_id.clone().unwrap();

        let word = room.offered_words.first().cloned().unwrap();
        let select = reduce(
            &room,
            RoomCommand::SelectWord { player_id: drawer_id.clone(), word: word.clone() },
            now,
            &mut r,
            &catalogue,
        );
        assert!(select.reply.is_ok());
        room = select.state;
        assert_eq!(room.phase, RoomPhase::Drawing);
        assert_eq!(room.time_left, 30);

        // Force timeLeft to 25 the way the spec scenario frames it.
        room.time_left = 25;

        let guesser_id = if drawer_id == "ply_a" { "ply_b" } else { "ply_a" };
        let guess = reduce(
            &room,
            RoomCommand::ChatOrGuess { player_id: guesser_id.to_string(), text: word },
            now,
            &mut r,
            &catalogue,
        );
        assert!(guess.reply.is_ok());
        room = guess.state;

        let guesser_score = room.get_player(guesser_id).unwrap().score;
        let drawer_score = room.get_player(&drawer_id).unwrap().score;
        assert_eq!(guesser_score, 263);
        assert_eq!(drawer_score, 25);
        assert!(room.pending_round_end_reason.is_some());

        // Next tick performs the 1s settle -> roundEnd.
        let tick = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::Tick, generation: 0 },
            now,
            &mut r,
            &catalogue,
        );
        room = tick.state;
        assert_eq!(room.phase, RoomPhase::RoundEnd);

        // PostTurnDelay: single-turn order with maxRounds=1 -> gameEnd.
        let advance = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::PostTurnDelay, generation: 0 },
            now,
            &mut r,
            &catalogue,
        );
        room = advance.state;
        assert_eq!(room.phase, RoomPhase::GameEnd);

        let ranking_event = advance
            .events
            .iter()
            .find_map(|t| match &t.event {
                RoomEvent::GameEnded { rankings } => Some(rankings.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(ranking_event[0].id, guesser_id);
        assert_eq!(ranking_event[0].score, 263);
        assert_eq!(ranking_event[1].score, 25);
    }

    /// S2 — auto-pick.
    #[test]
    fn scenario_s2_auto_pick() {
        let mut room = two_player_room();
        let now = Utc::now();
        let catalogue = WordCatalogue::default();
        let mut r = rng();

        room = reduce(&room, RoomCommand::StartGame { player_id: "ply_a".into() }, now, &mut r, &catalogue).state;
        room = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::StartCountdown, generation: 0 },
            now,
            &mut r,
            &catalogue,
        )
        .state;
        assert_eq!(room.phase, RoomPhase::Choosing);
        let first_offered = room.offered_words[0].clone();

        let fired = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::AutoPick, generation: 0 },
            now,
            &mut r,
            &catalogue,
        );
        room = fired.state;
        assert_eq!(room.phase, RoomPhase::Drawing);
        assert_eq!(room.current_word, Some(first_offered));
    }

    /// S3 — close guess.
    #[test]
    fn scenario_s3_close_guess() {
        let mut room = two_player_room();
        room.phase = RoomPhase::Drawing;
        room.current_drawer_id = Some("ply_a".into());
        room.current_word = Some("pomme".into());
        room.masked_word = Some(catalogue::mask("pomme"));
        room.time_left = 20;
        let catalogue = WordCatalogue::default();
        let mut r = rng();
        let now = Utc::now();

        let result = reduce(
            &room,
            RoomCommand::ChatOrGuess { player_id: "ply_b".into(), text: "pome".into() },
            now,
            &mut r,
            &catalogue,
        );
        room = result.state;
        assert_eq!(room.get_player("ply_b").unwrap().score, 0);
        assert!(result.events.iter().any(|t| matches!(t.event, RoomEvent::CloseGuess { .. })));
        assert!(result.events.iter().any(|t| matches!(&t.event, RoomEvent::ChatMessage(m) if m.is_close)));
    }

    /// S4 — drawer disconnect.
    #[test]
    fn scenario_s4_drawer_disconnect() {
        let mut room = two_player_room();
        room.phase = RoomPhase::Drawing;
        room.current_drawer_id = Some("ply_a".into());
        room.current_word = Some("avion".into());
        room.masked_word = Some(catalogue::mask("avion"));
        room.time_left = 40;
        if let Some(p) = room.get_player_mut("ply_a") {
            p.is_drawing = true;
        }
        let catalogue = WordCatalogue::default();
        let mut r = rng();
        let now = Utc::now();

        let result = reduce(&room, RoomCommand::Disconnect { player_id: "ply_a".into() }, now, &mut r, &catalogue);
        room = result.state;
        assert_eq!(room.phase, RoomPhase::RoundEnd);
        let turn_end = result
            .events
            .iter()
            .find_map(|t| match &t.event {
                RoomEvent::TurnEnd { word, reason, all_guessed } => {
                    Some((word.clone(), reason.clone(), *all_guessed))
                }
                _ => None,
            })
            .unwrap();
        assert_eq!(turn_end.0, "avion");
        assert_eq!(turn_end.1, "drawer left");
        assert!(!turn_end.2);
        assert_eq!(room.get_player("ply_b").unwrap().score, 0);
    }

    /// S5 — host leaves lobby.
    #[test]
    fn scenario_s5_host_leaves_lobby() {
        let room = two_player_room();
        let catalogue = WordCatalogue::default();
        let mut r = rng();
        let now = Utc::now();

        let result = reduce(&room, RoomCommand::Leave { player_id: "ply_a".into() }, now, &mut r, &catalogue);
        let room = result.state;
        assert!(room.get_player("ply_b").unwrap().is_host);
        assert!(result.events.iter().any(|t| matches!(&t.event, RoomEvent::HostChanged { new_host_id, .. } if new_host_id == "ply_b")));
    }

    /// S6 — empty room grace.
    #[test]
    fn scenario_s6_empty_room_grace() {
        let room = two_player_room();
        let catalogue = WordCatalogue::default();
        let mut r = rng();
        let now = Utc::now();

        let after_a = reduce(&room, RoomCommand::Leave { player_id: "ply_a".into() }, now, &mut r, &catalogue).state;
        let result = reduce(&after_a, RoomCommand::Leave { player_id: "ply_b".into() }, now, &mut r, &catalogue);
        let empty_room = result.state;
        assert!(empty_room.players.is_empty());
        assert!(result.timer_actions.iter().any(|a| matches!(a, TimerAction::Schedule { kind: TimerKind::EmptyRoomCleanup, .. })));

        // Rejoin before the grace timer fires cancels the cleanup.
        let rejoin = reduce(
            &empty_room,
            RoomCommand::Join {
                player_id: "ply_c".into(),
                session_id: "tok_c".into(),
                name: "C".into(),
                avatar: None,
                restored_score: None,
            },
            now,
            &mut r,
            &catalogue,
        );
        assert!(rejoin.timer_actions.contains(&TimerAction::Cancel { kind: TimerKind::EmptyRoomCleanup }));

        // If nobody rejoins, the cleanup fire destroys the room.
        let cleanup = reduce(
            &empty_room,
            RoomCommand::TimerFired { kind: TimerKind::EmptyRoomCleanup, generation: 0 },
            now,
            &mut r,
            &catalogue,
        );
        assert!(cleanup.destroy);
    }

    #[test]
    fn join_rejects_when_room_full() {
        let mut room = two_player_room();
        room.settings.max_players = 2;
        let result = reduce(
            &room,
            RoomCommand::Join {
                player_id: "ply_c".into(),
                session_id: "tok_c".into(),
                name: "C".into(),
                avatar: None,
                restored_score: None,
            },
            Utc::now(),
            &mut rng(),
            &WordCatalogue::default(),
        );
        assert_eq!(result.reply, Err(CoreError::RoomFull));
    }

    #[test]
    fn settings_update_rejected_outside_lobby() {
        let mut room = two_player_room();
        room.phase = RoomPhase::Drawing;
        let result = reduce(
            &room,
            RoomCommand::UpdateSettings { player_id: "ply_a".into(), draw_time: Some(60), max_rounds: None },
            Utc::now(),
            &mut rng(),
            &WordCatalogue::default(),
        );
        assert!(matches!(result.reply, Err(CoreError::WrongPhase(_))));
    }

    #[test]
    fn non_host_cannot_kick() {
        let room = two_player_room();
        let result = reduce(
            &room,
            RoomCommand::KickPlayer { player_id: "ply_b".into(), target_id: "ply_a".into() },
            Utc::now(),
            &mut rng(),
            &WordCatalogue::default(),
        );
        assert_eq!(result.reply, Err(CoreError::NotAuthorised("host only".into())));
    }

    #[test]
    fn invariants_hold_through_a_full_turn() {
        let mut room = two_player_room();
        let now = Utc::now();
        let catalogue = WordCatalogue::default();
        let mut r = rng();
        room.check_invariants();

        room = reduce(&room, RoomCommand::StartGame { player_id: "ply_a".into() }, now, &mut r, &catalogue).state;
        room.check_invariants();
        room = reduce(
            &room,
            RoomCommand::TimerFired { kind: TimerKind::StartCountdown, generation: 0 },
            now,
            &mut r,
            &catalogue,
        )
        .state;
        room.check_invariants();
        let drawer = room.current_drawer_id.clone().unwrap();
        let word = room.offered_words[0].clone();
        room = reduce(&room, RoomCommand::SelectWord { player_id: drawer, word }, now, &mut r, &catalogue).state;
        room.check_invariants();
    }
}
