use super::constants::{FRAME_CHANNEL_CAPACITY, STOPPED_STATUS, UNKNOWN_STATUS};
use super::controls::{ControlCommand, Controls};
use super::frame::{format_frame, get_frame_by_turn, is_terminal};
use super::types::{Frame, GameMeta, RawSnapshot};
use crate::app::config::ViewerOptions;
use crate::engine::{Engine, EngineUpdate};
use crate::host::HostNotifier;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Playback controller for one watched game.
///
/// Frames only ever get appended; the controller moves a pointer over them.
/// Every read and write of the session goes through `state`, and timed
/// playback is a spawned loop that polls `paused` around each delay.
pub struct Viewer<E, H> {
    engine: E,
    host: H,
    options: ViewerOptions,
    state: Mutex<ViewerState>,
}

#[derive(Debug)]
struct ViewerState {
    frames: Vec<Frame>,
    current_turn: Option<u32>,
    paused: bool,
    game_status: String,
    board: (u32, u32),
    target_turn: Option<u32>,
    highlighted: Option<String>,
    ingesting: bool,
    streaming: bool,
    game_over: bool,
    playback_epoch: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerSnapshot {
    pub turn: Option<u32>,
    pub paused: bool,
    #[serde(rename = "gameStatus")]
    pub game_status: String,
    pub width: u32,
    pub height: u32,
    #[serde(rename = "frameCount")]
    pub frame_count: usize,
    #[serde(rename = "gameOver")]
    pub game_over: bool,
    pub highlighted: Option<String>,
    pub ingesting: bool,
    pub controls: Controls,
}

impl ViewerState {
    fn new(target_turn: Option<u32>) -> Self {
        Self {
            frames: Vec::new(),
            current_turn: None,
            paused: true,
            game_status: UNKNOWN_STATUS.to_string(),
            board: (0, 0),
            target_turn,
            highlighted: None,
            ingesting: false,
            streaming: false,
            game_over: false,
            playback_epoch: 0,
        }
    }

    fn frame(&self, turn: u32) -> Option<&Frame> {
        get_frame_by_turn(&self.frames, turn)
    }

    fn has_turn(&self, turn: u32) -> bool {
        self.frame(turn).is_some()
    }

    fn apply_meta(&mut self, meta: &GameMeta) {
        self.game_status = meta.game.status.clone();
        self.board = (meta.game.width, meta.game.height);
    }

    /// Stops playback on a terminal turn. Game over is raised the first time
    /// only; later visits just pause.
    fn finish_game(&mut self) {
        self.paused = true;
        if self.game_over {
            return;
        }
        self.game_over = true;
        tracing::info!(turn = ?self.current_turn, "game over");
    }

    fn jump_to_target(&mut self) {
        let Some(target) = self.target_turn else { return };
        let Some(frame) = self.frames.get(target as usize) else { return };
        self.current_turn = Some(frame.turn);
        self.target_turn = None;
        tracing::debug!(turn = frame.turn, "jumped to requested turn");
    }
}

impl<E: Engine, H: HostNotifier> Viewer<E, H> {
    pub fn new(engine: E, host: H, options: ViewerOptions) -> Self {
        let target_turn = options.turn;
        Self {
            engine,
            host,
            options,
            state: Mutex::new(ViewerState::new(target_turn)),
        }
    }

    pub fn options(&self) -> &ViewerOptions {
        &self.options
    }

    pub async fn request_frames(&self) {
        let mut state = self.state.lock().await;
        state.ingesting = true;
        state.streaming = true;
    }

    /// Streams the whole game from the engine into the viewer, returning once
    /// the engine has no more turns. Transport failures are handed back as-is.
    pub async fn fetch_frames(self: &Arc<Self>) -> anyhow::Result<()> {
        self.request_frames().await;
        tracing::info!(game = %self.options.game, engine = %self.options.engine, "streaming frames");

        let (tx, mut rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let stream = self.engine.stream_all_frames(&self.options.game, tx);
        let ingest = async {
            while let Some(update) = rx.recv().await {
                match update {
                    EngineUpdate::Frame(meta, raw) => self.ingest_frame(meta, raw).await,
                    EngineUpdate::Status(meta) => self.ingest_status(meta).await,
                }
            }
        };
        let (result, ()) = tokio::join!(stream, ingest);

        self.state.lock().await.streaming = false;
        result.with_context(|| format!("failed to stream frames of game {}", self.options.game))
    }

    pub async fn ingest_frame(self: &Arc<Self>, meta: GameMeta, mut raw: RawSnapshot) {
        // The engine leaves the turn off the first frame.
        raw.turn = Some(raw.turn.unwrap_or(0));

        let mut state = self.state.lock().await;
        state.apply_meta(&meta);

        let mut frame = format_frame(&raw);
        if state.has_turn(frame.turn) {
            tracing::debug!(turn = frame.turn, "skipping turn that is already buffered");
            return;
        }
        frame.game_over = is_terminal(&meta, &frame);
        let turn = frame.turn;
        state.frames.push(frame);
        tracing::trace!(turn, frames = state.frames.len(), "frame ingested");

        let mut autoplay = false;
        if turn == 0 {
            state.current_turn = Some(0);
            self.host.notify(0);
            if self.options.autoplay {
                state.paused = false;
                autoplay = true;
            }
        }
        state.jump_to_target();
        drop(state);

        if autoplay {
            self.play_from(0).await;
        }
    }

    /// Records a status that arrived without a turn. If the game has ended,
    /// the last buffered turn may only now be recognizable as the final one.
    pub async fn ingest_status(&self, meta: GameMeta) {
        let mut state = self.state.lock().await;
        state.apply_meta(&meta);
        let Some(last) = state.frames.last_mut() else { return };
        if !last.game_over && is_terminal(&meta, last) {
            last.game_over = true;
            tracing::debug!(turn = last.turn, "last buffered turn ends the game");
        }
    }

    /// Starts timed playback at `turn`. Any loop already running is retired
    /// at its next check, so at most one loop ever moves the pointer.
    pub async fn play_from(self: &Arc<Self>, turn: u32) -> JoinHandle<()> {
        let epoch = {
            let mut state = self.state.lock().await;
            state.playback_epoch += 1;
            state.playback_epoch
        };
        tracing::debug!(turn, epoch, "playback started");
        let viewer = Arc::clone(self);
        tokio::spawn(async move { viewer.run_playback(epoch, turn).await })
    }

    async fn run_playback(&self, epoch: u64, from: u32) {
        let mut next = Some(from);
        loop {
            if !self.is_playing(epoch).await {
                return;
            }
            tokio::time::sleep(self.options.frame_delay).await;

            let mut state = self.state.lock().await;
            if state.paused || state.playback_epoch != epoch {
                return;
            }
            let turn = next
                .take()
                .unwrap_or_else(|| state.current_turn.map_or(0, |current| current + 1));
            let Some(frame) = state.frame(turn) else {
                let on_final_turn = state
                    .current_turn
                    .and_then(|current| state.frame(current))
                    .is_some_and(|frame| frame.game_over);
                if on_final_turn {
                    state.finish_game();
                    return;
                }
                if state.streaming {
                    next = Some(turn);
                    continue;
                }
                tracing::debug!(turn, "playback ran out of frames");
                state.paused = true;
                return;
            };
            let game_over = frame.game_over;
            state.current_turn = Some(turn);

            if game_over {
                state.finish_game();
                return;
            }
        }
    }

    async fn is_playing(&self, epoch: u64) -> bool {
        let state = self.state.lock().await;
        !state.paused && state.playback_epoch == epoch
    }

    pub async fn toggle_pause(self: &Arc<Self>) -> anyhow::Result<()> {
        let (status, current) = {
            let mut state = self.state.lock().await;
            if !state.paused {
                // The host hears about the turn that resuming will show.
                self.host.notify(state.current_turn.map_or(0, |turn| turn + 1));
                state.paused = true;
                return Ok(());
            }
            (state.game_status.clone(), state.current_turn)
        };

        if status == STOPPED_STATUS {
            self.engine
                .start_game(&self.options.game)
                .await
                .with_context(|| format!("failed to restart game {}", self.options.game))?;
            let viewer = Arc::clone(self);
            tokio::spawn(async move {
                if let Err(error) = viewer.fetch_frames().await {
                    tracing::warn!(?error, "frame stream failed after restart");
                }
            });
        }

        self.state.lock().await.paused = false;
        self.play_from(current.unwrap_or(0)).await;
        Ok(())
    }

    pub async fn step_forward(&self) {
        self.step(|turn| turn.checked_add(1)).await;
    }

    pub async fn step_backward(&self) {
        self.step(|turn| turn.checked_sub(1)).await;
    }

    async fn step(&self, next: impl FnOnce(u32) -> Option<u32>) {
        let mut state = self.state.lock().await;
        let Some(target) = state.current_turn.and_then(next) else { return };
        if !state.has_turn(target) {
            return;
        }
        self.host.notify(target);
        state.current_turn = Some(target);
    }

    pub async fn reload(&self) {
        let mut state = self.state.lock().await;
        if state.paused && state.has_turn(0) {
            state.current_turn = Some(0);
        }
    }

    pub async fn set_highlighted(&self, id: Option<String>) {
        self.state.lock().await.highlighted = id;
    }

    /// Highlights `id`, or clears the highlight if `id` already has it.
    pub async fn toggle_highlight(&self, id: &str) {
        let mut state = self.state.lock().await;
        state.highlighted = match state.highlighted.as_deref() {
            Some(current) if current == id => None,
            _ => Some(id.to_string()),
        };
    }

    pub async fn handle_command(self: &Arc<Self>, command: ControlCommand) -> anyhow::Result<()> {
        match command {
            ControlCommand::Reload => self.reload().await,
            ControlCommand::TogglePause => self.toggle_pause().await?,
            ControlCommand::StepBackward => self.step_backward().await,
            ControlCommand::StepForward => self.step_forward().await,
        }
        Ok(())
    }

    pub async fn current_frame(&self) -> Option<Frame> {
        let state = self.state.lock().await;
        let turn = state.current_turn?;
        state.frame(turn).cloned()
    }

    pub async fn snapshot(&self) -> ViewerSnapshot {
        let state = self.state.lock().await;
        ViewerSnapshot {
            turn: state.current_turn,
            paused: state.paused,
            game_status: state.game_status.clone(),
            width: state.board.0,
            height: state.board.1,
            frame_count: state.frames.len(),
            game_over: state.game_over,
            highlighted: state.highlighted.clone(),
            ingesting: state.ingesting,
            controls: Controls::for_state(state.current_turn.unwrap_or(0), state.paused),
        }
    }
}
