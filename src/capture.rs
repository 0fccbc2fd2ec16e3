#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Scoped capture of candidate output.
//!
//! Evaluation strategies route everything a candidate prints through
//! [`emit`]. While a [`CaptureGuard`] is held, that output lands in the
//! guard's buffer; otherwise it goes to standard output. There is one capture
//! slot per process. A thread that wants it while another thread holds it
//! waits; the owning thread asking again gets [`CaptureError::Nested`].

use std::{
    io::Write,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
    thread::{self, ThreadId},
};

use crate::error::CaptureError;

/// State of the process-wide capture slot.
#[derive(Default)]
struct Slot {
    /// Thread currently capturing, if any.
    owner:  Option<ThreadId>,
    /// Output gathered so far by the owner.
    buffer: String,
}

/// The capture slot.
static SLOT: Mutex<Slot> = Mutex::new(Slot {
    owner:  None,
    buffer: String::new(),
});

/// Signalled whenever the slot is released.
static RELEASED: Condvar = Condvar::new();

/// Locks the slot, resetting it if a previous holder panicked mid-update.
fn lock() -> Result<MutexGuard<'static, Slot>, CaptureError> {
    match SLOT.lock() {
        Ok(slot) => Ok(slot),
        Err(poisoned) => {
            let mut slot = poisoned.into_inner();
            *slot = Slot::default();
            SLOT.clear_poison();
            RELEASED.notify_all();
            Err(CaptureError::Poisoned)
        }
    }
}

/// Locks the slot as is, even if a previous holder panicked.
fn lock_recovered() -> MutexGuard<'static, Slot> {
    SLOT.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds the capture slot; releasing happens on drop at the latest.
#[must_use = "output is only captured while the guard is alive"]
pub struct CaptureGuard {
    /// Set once the buffer has been handed out.
    released: bool,
}

impl CaptureGuard {
    /// Acquires the capture slot for the current thread.
    pub fn acquire() -> Result<Self, CaptureError> {
        let me = thread::current().id();
        let mut slot = lock()?;
        loop {
            match slot.owner {
                None => break,
                Some(owner) if owner == me => return Err(CaptureError::Nested),
                Some(_) => {
                    slot = RELEASED.wait(slot).map_err(|_| CaptureError::Poisoned)?;
                }
            }
        }
        slot.owner = Some(me);
        slot.buffer.clear();
        tracing::trace!("output capture acquired");
        Ok(Self { released: false })
    }

    /// Releases the slot and returns everything captured.
    pub fn release(mut self) -> Result<String, CaptureError> {
        self.released = true;
        let mut slot = lock()?;
        let captured = std::mem::take(&mut slot.buffer);
        slot.owner = None;
        drop(slot);
        RELEASED.notify_all();
        tracing::trace!(bytes = captured.len(), "output capture released");
        Ok(captured)
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let mut slot = lock_recovered();
        slot.owner = None;
        slot.buffer.clear();
        drop(slot);
        RELEASED.notify_all();
    }
}

/// Writes one line of candidate output.
///
/// Goes to the capture buffer when the calling thread is capturing, and to
/// standard output otherwise.
pub fn emit(line: &str) {
    emit_to(line, &mut std::io::stdout().lock());
}

/// Like [`emit`], with `out` standing in for standard output.
fn emit_to(line: &str, out: &mut impl Write) {
    let me = thread::current().id();
    {
        let mut slot = lock_recovered();
        if slot.owner == Some(me) {
            slot.buffer.push_str(line);
            slot.buffer.push('\n');
            return;
        }
    }
    let _ = writeln!(out, "{line}");
}

/// Whether the calling thread currently holds the capture slot.
pub fn is_capturing() -> bool {
    lock_recovered().owner == Some(thread::current().id())
}

/// Runs `f` with output captured, returning its result and the captured
/// text.
///
/// The slot is released on every exit path, including a panic inside `f`.
pub fn with_suppressed_output<T>(f: impl FnOnce() -> T) -> Result<(T, String), CaptureError> {
    let guard = CaptureGuard::acquire()?;
    let value = f();
    let captured = guard.release()?;
    Ok((value, captured))
}
