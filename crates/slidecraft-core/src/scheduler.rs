//! Frame-rate gate for provisional renders.
//!
//! Pointer input is processed at full rate; the scheduler decides when the
//! host may repaint. The host drives it from its animation-frame callback
//! and stops rescheduling once [`FrameOutcome::Stopped`] is returned.

use std::time::Duration;

// Use web_time for WASM compatibility
#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Default render rate.
pub const DEFAULT_TARGET_FPS: u32 = 60;

/// Identifies one generation of the render loop.
///
/// Frames delivered with a handle from an earlier `start` are ignored, so
/// at most one callback chain stays alive per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoopHandle(u64);

/// What happened on an animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The tick callback ran.
    Rendered,
    /// Too soon after the previous render; skipped.
    Coalesced,
    /// The loop is stopped or the handle is stale. Do not reschedule.
    Stopped,
}

impl FrameOutcome {
    /// Whether the host should request another animation frame.
    pub fn should_reschedule(self) -> bool {
        self != FrameOutcome::Stopped
    }
}

/// Rate-limited render loop state.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Duration,
    generation: u64,
    running: bool,
    last_render: Option<Instant>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_FPS)
    }
}

impl FrameScheduler {
    /// Create a stopped scheduler targeting `target_fps` renders per second.
    pub fn new(target_fps: u32) -> Self {
        Self::with_interval(Duration::from_secs_f64(1.0 / f64::from(target_fps.max(1))))
    }

    /// Create a stopped scheduler with an explicit render window.
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            generation: 0,
            running: false,
            last_render: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start a new loop generation, superseding any previous one.
    pub fn start(&mut self) -> LoopHandle {
        self.generation += 1;
        self.running = true;
        self.last_render = None;
        log::debug!("Render loop started (generation {})", self.generation);
        LoopHandle(self.generation)
    }

    /// Stop the loop. Returns `true` if it was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        if was_running {
            log::debug!("Render loop stopped (generation {})", self.generation);
        }
        self.running = false;
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether frames delivered with `handle` are still honored.
    pub fn is_current(&self, handle: LoopHandle) -> bool {
        self.running && handle.0 == self.generation
    }

    /// Handle an animation frame at `now`.
    ///
    /// Runs `on_tick` at most once per render window. Frames arriving
    /// faster are dropped, not queued.
    pub fn tick(
        &mut self,
        handle: LoopHandle,
        now: Instant,
        on_tick: impl FnOnce(),
    ) -> FrameOutcome {
        if !self.is_current(handle) {
            return FrameOutcome::Stopped;
        }
        if let Some(last) = self.last_render {
            if now.duration_since(last) < self.interval {
                return FrameOutcome::Coalesced;
            }
        }
        self.last_render = Some(now);
        on_tick();
        FrameOutcome::Rendered
    }

    /// Like [`tick`](Self::tick) for hosts that render after the call returns.
    pub fn poll(&mut self, handle: LoopHandle, now: Instant) -> FrameOutcome {
        self.tick(handle, now, || {})
    }

    /// Render immediately, bypassing the rate limit.
    ///
    /// The render counts toward the current window, so a loop frame arriving
    /// right after is coalesced.
    pub fn force_render(&mut self, now: Instant, on_tick: impl FnOnce()) {
        self.mark_rendered(now);
        on_tick();
    }

    /// Record a render the host performed outside the loop at `now`.
    ///
    /// Opens a new render window: loop frames within the interval coalesce.
    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_render = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_stopped_by_default() {
        let mut scheduler = FrameScheduler::default();
        let handle = scheduler.start();
        scheduler.stop();
        assert_eq!(scheduler.poll(handle, Instant::now()), FrameOutcome::Stopped);
        assert!(!FrameOutcome::Stopped.should_reschedule());
    }

    #[test]
    fn test_first_frame_renders() {
        let mut scheduler = FrameScheduler::new(60);
        let handle = scheduler.start();
        let mut ticks = 0;
        let outcome = scheduler.tick(handle, Instant::now(), || ticks += 1);
        assert_eq!(outcome, FrameOutcome::Rendered);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn test_coalesces_fast_frames() {
        let mut scheduler = FrameScheduler::new(60);
        let handle = scheduler.start();
        let t0 = Instant::now();
        let mut ticks = 0;

        // A 250 Hz event storm over 100 ms.
        for i in 0..25 {
            scheduler.tick(handle, t0 + ms(i * 4), || ticks += 1);
        }
        // Renders land at 0, 20, 40, 60, 80 ms.
        assert_eq!(ticks, 5);
    }

    #[test]
    fn test_window_boundary() {
        let mut scheduler = FrameScheduler::with_interval(ms(10));
        let handle = scheduler.start();
        let t0 = Instant::now();
        assert_eq!(scheduler.poll(handle, t0), FrameOutcome::Rendered);
        assert_eq!(scheduler.poll(handle, t0 + ms(9)), FrameOutcome::Coalesced);
        assert_eq!(scheduler.poll(handle, t0 + ms(10)), FrameOutcome::Rendered);
        assert!(FrameOutcome::Coalesced.should_reschedule());
    }

    #[test]
    fn test_restart_invalidates_old_handle() {
        let mut scheduler = FrameScheduler::default();
        let old = scheduler.start();
        let new = scheduler.start();
        let now = Instant::now();
        assert_eq!(scheduler.poll(old, now), FrameOutcome::Stopped);
        assert_eq!(scheduler.poll(new, now), FrameOutcome::Rendered);
        assert!(!scheduler.is_current(old));
    }

    #[test]
    fn test_force_render_bypasses_gate() {
        let mut scheduler = FrameScheduler::with_interval(ms(10));
        let handle = scheduler.start();
        let t0 = Instant::now();
        scheduler.poll(handle, t0);

        let mut forced = false;
        scheduler.force_render(t0 + ms(1), || forced = true);
        assert!(forced);
        assert_eq!(scheduler.poll(handle, t0 + ms(5)), FrameOutcome::Coalesced);
        assert_eq!(scheduler.poll(handle, t0 + ms(11)), FrameOutcome::Rendered);
    }

    #[test]
    fn test_mark_rendered_opens_window() {
        let mut scheduler = FrameScheduler::with_interval(ms(10));
        let handle = scheduler.start();
        let t0 = Instant::now();

        scheduler.mark_rendered(t0);
        let mut ticks = 0;
        assert_eq!(scheduler.tick(handle, t0 + ms(4), || ticks += 1), FrameOutcome::Coalesced);
        assert_eq!(ticks, 0);
        assert_eq!(scheduler.tick(handle, t0 + ms(10), || ticks += 1), FrameOutcome::Rendered);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn test_mark_rendered_while_stopped() {
        let mut scheduler = FrameScheduler::default();
        let now = Instant::now();
        scheduler.mark_rendered(now);
        assert!(!scheduler.is_running());

        // A fresh generation starts with an open window.
        let handle = scheduler.start();
        assert_eq!(scheduler.poll(handle, now), FrameOutcome::Rendered);
    }

    #[test]
    fn test_stop_reports_previous_state() {
        let mut scheduler = FrameScheduler::default();
        assert!(!scheduler.stop());
        scheduler.start();
        assert!(scheduler.stop());
    }
}
