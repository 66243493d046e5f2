//! Single-slot frame request queue.
//!
//! Mirrors a host's "request next frame" facility: at most one frame is
//! pending at a time, a tick consumes it, and the renderer re-requests at
//! the end of every tick. Cancelling clears the slot so no further tick
//! fires.

/// Identifies one frame request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

/// Holds the pending frame request, if any.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    pending: Option<FrameHandle>,
    next_id: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a frame, replacing any request already pending.
    pub fn request(&mut self) -> FrameHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = FrameHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    /// Cancel `handle` if it is still pending. Returns whether it was.
    pub fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    /// Take the pending request so its frame can run.
    pub fn take_due(&mut self) -> Option<FrameHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<FrameHandle> {
        self.pending
    }
}
