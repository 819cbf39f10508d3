//! Run loop: receive → process → account.
//!
//! Single thread of control. The loop blocks on the inbound pipe, hands each
//! frame to [`RelayApp::process`] and records how long it took. Rejections
//! are already accounted for by the app, so the loop only traces them.
//!
//! ## RT Setup
//! With the `rt` feature, [`rt_setup`] locks memory, prefaults the stack, pins
//! the thread to a core and switches it to `SCHED_FIFO` before the loop
//! starts. Without it every step is a no-op.
//!
//! ## Exit
//! - the `running` flag clears → `Ok(())`
//! - every sender is gone → `PipeErr` event, then [`RunError::PipeClosed`]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::bus::{BusError, Pipe};
use crate::dispatch::RelayApp;
use crate::events::EventSink;
use crate::transport::Transport;

/// How often the loop re-checks the `running` flag while idle.
pub const IDLE_POLL: Duration = Duration::from_millis(100);

// ─── Dispatch Statistics ────────────────────────────────────────────

/// O(1) per-message timing statistics. No allocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchStats {
    /// Frames processed, accepted or not.
    pub count: u64,
    /// Frames rejected.
    pub rejected: u64,
    pub last_ns: u64,
    pub min_ns: u64,
    pub max_ns: u64,
    sum_ns: u128,
}

impl DispatchStats {
    pub const fn new() -> Self {
        Self {
            count: 0,
            rejected: 0,
            last_ns: 0,
            min_ns: u64::MAX,
            max_ns: 0,
            sum_ns: 0,
        }
    }

    /// Record one processed frame.
    #[inline]
    pub fn record(&mut self, duration_ns: u64, accepted: bool) {
        self.count += 1;
        if !accepted {
            self.rejected += 1;
        }
        self.last_ns = duration_ns;
        self.min_ns = self.min_ns.min(duration_ns);
        self.max_ns = self.max_ns.max(duration_ns);
        self.sum_ns += u128::from(duration_ns);
    }

    /// Average processing time [ns] (0 if nothing was processed).
    #[inline]
    pub fn avg_ns(&self) -> u64 {
        if self.count == 0 {
            0
        } else {
            (self.sum_ns / u128::from(self.count)) as u64
        }
    }

    /// Log a one-line summary.
    pub fn log_summary(&self) {
        if self.count == 0 {
            info!("dispatch stats: no frames processed");
            return;
        }
        info!(
            frames = self.count,
            rejected = self.rejected,
            min_ns = self.min_ns,
            avg_ns = self.avg_ns(),
            max_ns = self.max_ns,
            "dispatch stats"
        );
    }
}

impl Default for DispatchStats {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Errors ─────────────────────────────────────────────────────────

/// Fatal run-loop errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// RT system call failed.
    #[error("RT setup error: {0}")]
    RtSetup(String),

    /// The inbound pipe failed.
    #[error("pipe read error: {0}")]
    PipeClosed(BusError),
}

// ─── RT Setup ───────────────────────────────────────────────────────

/// Lock all current and future memory pages.
#[cfg(feature = "rt")]
fn rt_mlockall() -> Result<(), RunError> {
    use nix::sys::mman::{MlockallFlags, mlockall};
    mlockall(MlockallFlags::MCL_CURRENT | MlockallFlags::MCL_FUTURE)
        .map_err(|e| RunError::RtSetup(format!("mlockall failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_mlockall() -> Result<(), RunError> {
    Ok(())
}

/// Touch 256 KiB of stack so the pages are resident before the loop.
#[cfg(feature = "rt")]
fn prefault_stack() {
    let mut buf = [0u8; 256 * 1024];
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, exclusive reference into `buf`.
        unsafe { core::ptr::write_volatile(byte, 0xFF) };
    }
    core::hint::black_box(&buf);
}

#[cfg(not(feature = "rt"))]
fn prefault_stack() {}

/// Pin the current thread to `cpu`.
#[cfg(feature = "rt")]
fn rt_set_affinity(cpu: usize) -> Result<(), RunError> {
    use nix::sched::{CpuSet, sched_setaffinity};
    use nix::unistd::Pid;

    let mut cpuset = CpuSet::new();
    cpuset
        .set(cpu)
        .map_err(|e| RunError::RtSetup(format!("CpuSet::set({cpu}) failed: {e}")))?;
    sched_setaffinity(Pid::from_raw(0), &cpuset)
        .map_err(|e| RunError::RtSetup(format!("sched_setaffinity failed: {e}")))
}

#[cfg(not(feature = "rt"))]
fn rt_set_affinity(_cpu: usize) -> Result<(), RunError> {
    Ok(())
}

/// Switch the current thread to SCHED_FIFO.
#[cfg(feature = "rt")]
fn rt_set_scheduler(priority: i32) -> Result<(), RunError> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the calling thread.
    let ret = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if ret != 0 {
        let err = std::io::Error::last_os_error();
        return Err(RunError::RtSetup(format!(
            "sched_setscheduler(SCHED_FIFO, {priority}) failed: {err}"
        )));
    }
    Ok(())
}

#[cfg(not(feature = "rt"))]
fn rt_set_scheduler(_priority: i32) -> Result<(), RunError> {
    Ok(())
}

/// Full RT setup sequence. Call from the dispatch thread before [`Runner::run`].
pub fn rt_setup(cpu_core: usize, rt_priority: i32) -> Result<(), RunError> {
    rt_mlockall()?;
    prefault_stack();
    rt_set_affinity(cpu_core)?;
    rt_set_scheduler(rt_priority)?;
    Ok(())
}

// ─── Runner ─────────────────────────────────────────────────────────

/// Drives a [`RelayApp`] from an inbound [`Pipe`].
pub struct Runner<T: Transport, E: EventSink> {
    pub app: RelayApp<T, E>,
    pipe: Pipe,
    pub stats: DispatchStats,
}

impl<T: Transport, E: EventSink> Runner<T, E> {
    pub fn new(app: RelayApp<T, E>, pipe: Pipe) -> Self {
        Self {
            app,
            pipe,
            stats: DispatchStats::new(),
        }
    }

    /// Process one frame and record its timing.
    #[inline]
    pub fn step(&mut self, frame: &[u8]) {
        let start = Instant::now();
        let result = self.app.process(frame);
        let elapsed = start.elapsed().as_nanos() as u64;
        self.stats.record(elapsed, result.is_ok());
        if let Err(e) = result {
            debug!("frame dropped: {e}");
        }
    }

    /// Loop until `running` clears or the pipe closes.
    pub fn run(&mut self, running: &Arc<AtomicBool>) -> Result<(), RunError> {
        while running.load(Ordering::SeqCst) {
            // ═══ RECEIVE PHASE ═══
            let frame = match self.pipe.receive_timeout(IDLE_POLL) {
                Ok(Some(frame)) => frame,
                Ok(None) => continue,
                // Producers drop their senders on shutdown.
                Err(e) if !running.load(Ordering::SeqCst) => {
                    debug!("pipe closed during shutdown: {e}");
                    return Ok(());
                }
                Err(e) => {
                    self.app.report_pipe_error(&e);
                    return Err(RunError::PipeClosed(e));
                }
            };

            // ═══ PROCESS PHASE ═══
            self.step(&frame);
        }
        Ok(())
    }

    /// Drain whatever is queued without blocking, then return.
    pub fn drain(&mut self) -> usize {
        let mut n = 0;
        while let Ok(Some(frame)) = self.pipe.receive_timeout(Duration::ZERO) {
            self.step(&frame);
            n += 1;
        }
        n
    }
}
