//! Per-frame render loop bookkeeping
//!
//! The window's event loop drives frames; `RenderLoop` decides whether a frame
//! should still be produced and measures the time since the previous one.
//! Cancelling the token stops frames for good, including from another thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Longest step fed to camera damping, so a stalled window doesn't jump
const MAX_FRAME_DELTA: f32 = 0.1;

/// Shared stop flag for a render loop
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Frame pacing state for one viewer
#[derive(Debug)]
pub struct RenderLoop {
    token: CancellationToken,
    last_tick: Option<Instant>,
    frame_count: u64,
}

impl RenderLoop {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            last_tick: None,
            frame_count: 0,
        }
    }

    /// Advance one frame; returns the elapsed seconds, or `None` once cancelled
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        if self.token.is_cancelled() {
            return None;
        }

        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since(last).as_secs_f32().min(MAX_FRAME_DELTA),
            None => 0.0,
        };
        self.last_tick = Some(now);
        self.frame_count += 1;
        Some(dt)
    }

    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            log::debug!("Render loop cancelled after {} frames", self.frame_count);
        }
        self.token.cancel();
    }

    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for RenderLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_has_zero_delta() {
        let mut render_loop = RenderLoop::new();
        let start = Instant::now();
        assert_eq!(render_loop.tick(start), Some(0.0));

        let dt = render_loop.tick(start + Duration::from_millis(16)).unwrap();
        assert!((dt - 0.016).abs() < 1e-4);
        assert_eq!(render_loop.frame_count(), 2);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut render_loop = RenderLoop::new();
        let start = Instant::now();
        render_loop.tick(start);
        let dt = render_loop.tick(start + Duration::from_secs(5)).unwrap();
        assert_eq!(dt, MAX_FRAME_DELTA);
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let mut render_loop = RenderLoop::new();
        let token = render_loop.token();
        render_loop.tick(Instant::now());

        std::thread::spawn(move || token.cancel()).join().unwrap();

        assert!(!render_loop.is_running());
        assert_eq!(render_loop.tick(Instant::now()), None);
        assert_eq!(render_loop.frame_count(), 1);
    }
}
