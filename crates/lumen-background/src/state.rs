//! Background animation state management.

use std::fmt;

use lumen_core::{Pointer, Viewport};

use crate::animations::aurora::{self, AuroraPoint};
use crate::animations::stars::{self, Star};
use crate::canvas::Canvas;
use crate::painter::paint_frame;
use crate::random::RandomSource;
use crate::scheduler::{FrameHandle, FrameScheduler};

/// Whether the render loop is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Active,
    Stopped,
}

/// Input notifications delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostEvent {
    /// The viewport changed size.
    Resize(Viewport),
    /// The pointer moved to a new position in viewport coordinates.
    PointerMove(Pointer),
}

/// Background animation state for one mounted view.
///
/// Owns the canvas, the star field, the aurora control points, the cached
/// pointer and viewport, and the single pending frame request.
pub struct BackgroundState<C> {
    /// Drawing target; `None` when no canvas could be obtained.
    canvas: Option<C>,
    /// Star field, rebuilt on every resize.
    stars: Vec<Star>,
    /// Aurora control points, rebuilt on every resize.
    aurora_points: Vec<AuroraPoint>,
    /// Last known pointer position.
    pointer: Pointer,
    /// Last known viewport size.
    viewport: Viewport,
    /// Randomness for initialization and star wrapping.
    rng: Box<dyn RandomSource>,
    scheduler: FrameScheduler,
    /// Handle of the frame we requested, for cancellation.
    frame: Option<FrameHandle>,
    /// Frames painted since mount.
    frames: u64,
    lifecycle: Lifecycle,
    /// Whether host events are still accepted.
    listening: bool,
}

impl<C> fmt::Debug for BackgroundState<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundState")
            .field("has_canvas", &self.canvas.is_some())
            .field("stars", &self.stars.len())
            .field("aurora_points", &self.aurora_points.len())
            .field("pointer", &self.pointer)
            .field("viewport", &self.viewport)
            .field("frame", &self.frame)
            .field("frames", &self.frames)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl<C: Canvas> BackgroundState<C> {
    /// Mount the background onto a canvas.
    ///
    /// Sizes the canvas to `viewport`, builds the simulation, starts
    /// listening for host events, and requests the first frame. Without a
    /// usable canvas the returned state is already stopped and never draws.
    pub fn mount(canvas: Option<C>, viewport: Viewport, rng: Box<dyn RandomSource>) -> Self {
        let mut state = Self {
            canvas: None,
            stars: Vec::new(),
            aurora_points: Vec::new(),
            pointer: Pointer::default(),
            viewport,
            rng,
            scheduler: FrameScheduler::new(),
            frame: None,
            frames: 0,
            lifecycle: Lifecycle::Stopped,
            listening: false,
        };

        let Some(mut canvas) = canvas else {
            tracing::warn!("no canvas available, background disabled");
            return state;
        };
        if let Err(e) = canvas.resize(viewport) {
            tracing::warn!(error = %e, "could not size canvas, background disabled");
            return state;
        }

        state.canvas = Some(canvas);
        state.reset_simulation();
        state.lifecycle = Lifecycle::Active;
        state.listening = true;
        state.frame = Some(state.scheduler.request());
        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            stars = state.stars.len(),
            "background mounted"
        );
        state
    }

    /// Rebuild both collections for the current viewport.
    fn reset_simulation(&mut self) {
        self.stars = stars::init_stars(self.viewport, self.rng.as_mut());
        self.aurora_points = aurora::init_points(self.viewport, self.rng.as_mut());
    }

    /// Apply a host notification. Returns `false` if it was ignored
    /// because the background is stopped.
    pub fn handle_event(&mut self, event: HostEvent) -> bool {
        if !self.listening {
            return false;
        }
        match event {
            HostEvent::Resize(viewport) => self.resize(viewport),
            HostEvent::PointerMove(pointer) => self.pointer = pointer,
        }
        true
    }

    fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(canvas) = self.canvas.as_mut()
            && let Err(e) = canvas.resize(viewport)
        {
            tracing::warn!(error = %e, "could not resize canvas, stopping background");
            self.stop();
            return;
        }
        self.reset_simulation();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            stars = self.stars.len(),
            "background resized"
        );
    }

    /// Run the pending frame: advance the simulation one step and paint.
    ///
    /// Returns `false` without touching any state when stopped or when no
    /// frame is pending.
    pub fn tick(&mut self) -> bool {
        if self.lifecycle != Lifecycle::Active {
            return false;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        if self.scheduler.take_due().is_none() {
            return false;
        }

        aurora::update_points(&mut self.aurora_points, self.pointer);
        stars::update_stars(&mut self.stars, self.viewport, self.pointer, self.rng.as_mut());
        paint_frame(
            canvas,
            self.viewport,
            &self.stars,
            &self.aurora_points,
            self.pointer,
        );

        self.frames += 1;
        self.frame = Some(self.scheduler.request());
        tracing::trace!(frame = self.frames, "painted frame");
        true
    }

    /// Stop the loop: cancel the pending frame and stop listening for host
    /// events. Safe to call more than once.
    pub fn stop(&mut self) {
        if let Some(handle) = self.frame.take() {
            self.scheduler.cancel(handle);
        }
        self.listening = false;
        if self.lifecycle == Lifecycle::Active {
            tracing::info!(frames = self.frames, "background stopped");
        }
        self.lifecycle = Lifecycle::Stopped;
    }
}

impl<C> BackgroundState<C> {
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle == Lifecycle::Active
    }

    /// Whether host events are still being accepted.
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Whether a frame is waiting to run.
    pub fn has_pending_frame(&self) -> bool {
        self.scheduler.pending().is_some()
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn aurora_points(&self) -> &[AuroraPoint] {
        &self.aurora_points
    }

    pub fn pointer(&self) -> Pointer {
        self.pointer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames painted since mount.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::painter::tests::RecordingCanvas;
    use crate::raster::Surface;

    fn mount_recording(width: u32, height: u32, seed: u64) -> BackgroundState<RecordingCanvas> {
        BackgroundState::mount(
            Some(RecordingCanvas::default()),
            Viewport::new(width, height),
            Box::new(StdRng::seed_from_u64(seed)),
        )
    }

    fn calls(state: &BackgroundState<RecordingCanvas>) -> usize {
        state.canvas().map_or(0, |c| c.calls.len())
    }

    #[test]
    fn test_mount_builds_simulation() {
        let state = mount_recording(1600, 900, 1);
        assert!(state.is_active());
        assert!(state.is_listening());
        assert!(state.has_pending_frame());
        assert_eq!(state.stars().len(), 180);
        let xs: Vec<f32> = state.aurora_points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 320.0, 640.0, 960.0, 1280.0, 1600.0]);
        assert_eq!(state.canvas().unwrap().size, Viewport::new(1600, 900));
        assert_eq!(state.pointer(), Pointer::default());
        assert_eq!(calls(&state), 0);
    }

    #[test]
    fn test_mount_without_canvas_never_draws() {
        let mut state: BackgroundState<RecordingCanvas> = BackgroundState::mount(
            None,
            Viewport::new(800, 600),
            Box::new(StdRng::seed_from_u64(1)),
        );
        assert_eq!(state.lifecycle(), Lifecycle::Stopped);
        assert!(!state.has_pending_frame());
        assert!(!state.tick());
        assert!(!state.handle_event(HostEvent::Resize(Viewport::new(10, 10))));
        assert!(state.stars().is_empty());
    }

    #[test]
    fn test_mount_with_oversized_surface_is_stopped() {
        let state = BackgroundState::mount(
            Some(Surface::default()),
            Viewport::new(1 << 16, 1 << 16),
            Box::new(StdRng::seed_from_u64(1)),
        );
        assert!(!state.is_active());
        assert!(state.stars().is_empty());
        assert!(state.canvas().is_none());
    }

    #[test]
    fn test_tick_paints_and_requests_next_frame() {
        let mut state = mount_recording(400, 200, 2);
        assert!(state.tick());
        assert_eq!(state.frames(), 1);
        assert!(state.has_pending_frame());
        let first = calls(&state);
        assert!(first > 0);
        assert!(state.tick());
        assert_eq!(calls(&state), first * 2);
    }

    #[test]
    fn test_tick_without_pending_frame_is_noop() {
        let mut state = mount_recording(400, 200, 2);
        state.scheduler.take_due();
        assert!(!state.tick());
        assert_eq!(calls(&state), 0);
        assert_eq!(state.frames(), 0);
    }

    #[test]
    fn test_resize_reinitializes() {
        let mut state = mount_recording(1600, 900, 3);
        state.tick();
        let before = state.stars().to_vec();

        assert!(state.handle_event(HostEvent::Resize(Viewport::new(800, 400))));
        assert_eq!(state.stars().len(), 40);
        assert_eq!(state.aurora_points()[5].x, 800.0);
        assert!(state.aurora_points().iter().all(|p| p.y == 160.0));
        assert_eq!(state.canvas().unwrap().size, Viewport::new(800, 400));

        // Same size again still rebuilds from scratch.
        assert!(state.handle_event(HostEvent::Resize(Viewport::new(1600, 900))));
        assert_eq!(state.stars().len(), before.len());
        assert_ne!(state.stars(), before.as_slice());
    }

    #[test]
    fn test_resize_to_zero_keeps_running() {
        let mut state = mount_recording(400, 200, 4);
        state.handle_event(HostEvent::Resize(Viewport::new(0, 0)));
        assert!(state.stars().is_empty());
        assert_eq!(state.aurora_points().len(), 6);
        assert!(state.tick());
    }

    #[test]
    fn test_failed_resize_stops() {
        let mut state = BackgroundState::mount(
            Some(Surface::default()),
            Viewport::new(32, 16),
            Box::new(StdRng::seed_from_u64(5)),
        );
        assert!(state.is_active());
        state.handle_event(HostEvent::Resize(Viewport::new(1 << 16, 1 << 16)));
        assert!(!state.is_active());
        assert!(!state.has_pending_frame());
        assert!(!state.tick());
    }

    #[test]
    fn test_pointer_move_applies_next_frame() {
        let mut state = mount_recording(1600, 900, 6);
        let pointer = Pointer::new(0.0, 200.0);
        assert!(state.handle_event(HostEvent::PointerMove(pointer)));
        assert_eq!(state.pointer(), pointer);

        let point = state.aurora_points()[0].clone();
        state.tick();
        let mut expected = point.clone();
        expected.phase += expected.speed;
        let target = expected.target_y(pointer);
        expected.ease_toward(target);
        assert!((state.aurora_points()[0].y - expected.y).abs() < 1e-4);
        // The pointer sits above the point, so it is lifted.
        assert!(state.aurora_points()[0].y < point.y);
    }

    #[test]
    fn test_stop_then_tick_is_inert() {
        let mut state = mount_recording(800, 600, 7);
        state.tick();
        state.stop();
        let drawn = calls(&state);
        let stars = state.stars().to_vec();
        let points = state.aurora_points().to_vec();

        assert!(!state.tick());
        assert!(!state.handle_event(HostEvent::PointerMove(Pointer::new(1.0, 1.0))));
        assert!(!state.handle_event(HostEvent::Resize(Viewport::new(10, 10))));

        assert_eq!(calls(&state), drawn);
        assert_eq!(state.stars(), stars.as_slice());
        assert_eq!(state.aurora_points(), points.as_slice());
        assert_eq!(state.pointer(), Pointer::default());
        assert_eq!(state.viewport(), Viewport::new(800, 600));
        assert!(!state.has_pending_frame());
        assert!(!state.is_listening());
        assert_eq!(state.frames(), 1);

        state.stop();
        assert_eq!(state.lifecycle(), Lifecycle::Stopped);
    }

    #[test]
    fn test_ticks_on_real_surface() {
        let mut state = BackgroundState::mount(
            Some(Surface::default()),
            Viewport::new(160, 100),
            Box::new(StdRng::seed_from_u64(8)),
        );
        for _ in 0..3 {
            assert!(state.tick());
        }
        let surface = state.canvas().unwrap();
        assert_eq!(surface.width(), 160);
        assert!((surface.pixel(80, 50).a - 1.0).abs() < 1e-4);
    }
}
