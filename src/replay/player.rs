//! Paced playback of recorded frames
//!
//! Playback performs no game logic: it hands each stored frame to a
//! renderer callback, one per tick, and stops early when the quit future
//! resolves. Frames are only read, so abandoning playback midway is safe.

use futures::FutureExt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use super::log::Frame;

/// How a playback session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Playback {
    /// Frames handed to the renderer
    pub shown: usize,
    /// Whether the quit signal cut playback short
    pub cancelled: bool,
}

/// Yield `frames` in order, one every `frame_delay`
///
/// `on_frame` receives the frame index and the frame; an error from it
/// aborts playback. `quit` is polled between frames. A zero delay plays
/// the frames back to back.
pub async fn play<F, E, Q>(
    frames: &[Frame],
    frame_delay: Duration,
    quit: Q,
    mut on_frame: F,
) -> Result<Playback, E>
where
    F: FnMut(usize, &Frame) -> Result<(), E>,
    Q: Future<Output = ()>,
{
    tokio::pin!(quit);

    let mut ticker = (!frame_delay.is_zero()).then(|| {
        let mut ticker = interval(frame_delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker
    });

    for (idx, frame) in frames.iter().enumerate() {
        let cancelled = match ticker.as_mut() {
            Some(ticker) => {
                tokio::select! {
                    biased;
                    _ = &mut quit => true,
                    _ = ticker.tick() => false,
                }
            }
            None => quit.as_mut().now_or_never().is_some(),
        };

        if cancelled {
            return Ok(Playback {
                shown: idx,
                cancelled: true,
            });
        }

        on_frame(idx, frame)?;
    }

    Ok(Playback {
        shown: frames.len(),
        cancelled: false,
    })
}
