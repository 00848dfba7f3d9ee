//! Terminal replay viewer for recorded episodes
//!
//! Plays a saved replay frame by frame without re-simulating anything.
//!
//! # Controls
//!
//! - Q/Esc/Ctrl+C: Quit
//!
//! # Example
//!
//! ```rust,ignore
//! use evo_snake::modes::ReplayMode;
//! use std::{path::Path, time::Duration};
//!
//! let mut replay_mode = ReplayMode::load(
//!     Path::new("runs/game_states.json"),
//!     Duration::from_millis(100),
//! )?;
//! replay_mode.run().await?;
//! ```

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    io::{stderr, Stderr},
    path::Path,
    time::Duration,
};
use tracing::info;

use crate::render::{Renderer, ReplayView};
use crate::replay::{load_replay, play, ReplayLog, ReplayMetadata};

/// Largest grid side the viewer will draw
const MAX_GRID_SIDE: usize = 1000;

/// Replay viewer over one loaded replay document
pub struct ReplayMode {
    log: ReplayLog,

    /// Sidecar metadata, when the replay was saved with one
    metadata: Option<ReplayMetadata>,

    grid_width: usize,
    grid_height: usize,

    /// Delay between frames
    frame_delay: Duration,

    renderer: Renderer,
}

impl ReplayMode {
    /// Load a replay and its metadata
    ///
    /// Without metadata the grid size is inferred from the cells the
    /// frames touch.
    pub fn load(path: &Path, frame_delay: Duration) -> Result<Self> {
        let (log, metadata) = load_replay(path)
            .with_context(|| format!("Failed to load replay from {:?}", path))?;

        let (grid_width, grid_height) = match &metadata {
            Some(meta) => (meta.grid_width, meta.grid_height),
            None => infer_dimensions(&log)?,
        };
        anyhow::ensure!(
            grid_width <= MAX_GRID_SIDE && grid_height <= MAX_GRID_SIDE,
            "replay grid {}x{} is larger than the viewer supports ({}x{})",
            grid_width,
            grid_height,
            MAX_GRID_SIDE,
            MAX_GRID_SIDE
        );

        info!(
            path = %path.display(),
            frames = log.len(),
            grid_width,
            grid_height,
            strategy = metadata.as_ref().map(|meta| meta.strategy.kind.name()),
            fitness = metadata.as_ref().map(|meta| meta.fitness),
            "replay loaded"
        );

        Ok(Self {
            log,
            metadata,
            grid_width,
            grid_height,
            frame_delay,
            renderer: Renderer::new(),
        })
    }

    pub fn log(&self) -> &ReplayLog {
        &self.log
    }

    pub fn metadata(&self) -> Option<&ReplayMetadata> {
        self.metadata.as_ref()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid_width, self.grid_height)
    }

    /// Play the replay in the terminal
    ///
    /// Sets up the terminal, plays every frame and keeps the summary on
    /// screen until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        if self.log.is_empty() {
            info!("replay has no frames; nothing to show");
            return Ok(());
        }

        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_playback(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_playback(&self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        let mut events = EventStream::new();
        let frames = self.log.frames();
        let total = frames.len();

        let view = |index: usize, finished: bool| ReplayView {
            grid_width: self.grid_width,
            grid_height: self.grid_height,
            index,
            total,
            finished,
        };

        let playback = play(frames, self.frame_delay, quit_requested(&mut events), |idx, frame| {
            terminal
                .draw(|f| self.renderer.render(f, frame, &view(idx, false)))
                .map(|_| ())
        })
        .await
        .context("Failed to draw frame")?;

        if playback.cancelled {
            return Ok(());
        }

        if let Some(last) = frames.last() {
            terminal
                .draw(|f| self.renderer.render(f, last, &view(total - 1, true)))
                .context("Failed to draw frame")?;
            quit_requested(&mut events).await;
        }

        Ok(())
    }

    fn cleanup_terminal(&mut self, terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

/// Resolves once the user asks to quit or the event stream closes
async fn quit_requested(events: &mut EventStream) {
    loop {
        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if is_quit_key(key) => return,
                Some(_) => {}
                None => return,
            },
            _ = tokio::signal::ctrl_c() => return,
        }
    }
}

fn is_quit_key(key: KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Smallest grid holding every recorded cell, at least 2x2
///
/// Fails on negative coordinates and on grids past [`MAX_GRID_SIDE`].
fn infer_dimensions(log: &ReplayLog) -> Result<(usize, usize)> {
    let mut width = 2;
    let mut height = 2;

    for cell in log
        .frames()
        .iter()
        .flat_map(|frame| frame.snake.iter().chain(&frame.apples))
    {
        let (Ok(x), Ok(y)) = (usize::try_from(cell.x), usize::try_from(cell.y)) else {
            anyhow::bail!("replay contains a negative cell {:?}", cell);
        };
        anyhow::ensure!(
            x < MAX_GRID_SIDE && y < MAX_GRID_SIDE,
            "replay cell {:?} lies outside the largest supported grid ({}x{}); save the replay with metadata",
            cell,
            MAX_GRID_SIDE,
            MAX_GRID_SIDE
        );
        width = width.max(x + 1);
        height = height.max(y + 1);
    }

    Ok((width, height))
}
