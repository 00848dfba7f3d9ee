//! Mapping policy outputs to a legal move

use crate::error::{Error, Result};
use crate::game::Direction;

/// Number of policy outputs, one per direction in canonical order
pub const ACTION_COUNT: usize = 4;

/// Select the direction with the highest score, never the reverse of `facing`
///
/// The score of the reversing move is treated as negative infinity, as is
/// any NaN. Among equal maxima the lowest canonical index wins, so the
/// choice is deterministic even when every output is the same.
pub fn select_direction(outputs: &[f64], facing: Direction) -> Result<Direction> {
    if outputs.len() != ACTION_COUNT {
        return Err(Error::OutputMismatch(outputs.len()));
    }

    let masked = facing.opposite().index();
    let mut best: Option<(usize, f64)> = None;

    for (idx, &score) in outputs.iter().enumerate() {
        if idx == masked {
            continue;
        }
        let score = if score.is_nan() { f64::NEG_INFINITY } else { score };
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((idx, score)),
        }
    }

    // Three candidates always remain after masking
    let (idx, _) = best.unwrap_or((Direction::Up.index(), f64::NEG_INFINITY));
    Ok(Direction::ALL[idx])
}
