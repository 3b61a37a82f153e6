//! Ctrl+C handling for CLI commands.
//!
//! The handler only raises a flag and wakes waiters; a second Ctrl+C restores
//! the terminal (if a hook is set) and exits with 130.

use std::future::Future;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tokio::sync::Notify;

static INTERRUPTED: AtomicBool = AtomicBool::new(false);
static INTERRUPT_NOTIFY: OnceLock<Notify> = OnceLock::new();
static RESTORE_HOOK: OnceLock<Box<dyn Fn() + Send + Sync>> = OnceLock::new();

#[derive(Debug)]
pub struct InterruptedError;

impl std::fmt::Display for InterruptedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interrupted")
    }
}

impl std::error::Error for InterruptedError {}

/// Installs the Ctrl+C handler.
///
/// # Errors
/// Returns an error if a handler is already registered.
pub fn init() -> Result<()> {
    ctrlc::set_handler(trigger_ctrl_c).context("Error setting Ctrl+C handler")
}

/// Raises the interrupt flag, force-exiting on a second call.
pub fn trigger_ctrl_c() {
    if INTERRUPTED.swap(true, Ordering::SeqCst) {
        // process::exit skips Drop, so restore the terminal here.
        if let Some(hook) = RESTORE_HOOK.get() {
            hook();
        }
        std::process::exit(130);
    }
    INTERRUPT_NOTIFY.get_or_init(Notify::new).notify_waiters();
}

pub fn is_interrupted() -> bool {
    INTERRUPTED.load(Ordering::SeqCst)
}

/// Waits until an interrupt is triggered.
pub async fn wait_for_interrupt() {
    loop {
        let notified = INTERRUPT_NOTIFY.get_or_init(Notify::new).notified();
        if is_interrupted() {
            return;
        }
        notified.await;
    }
}

/// Runs `future` unless Ctrl+C arrives first.
///
/// # Errors
/// Returns `InterruptedError` on interrupt, otherwise the future's own error.
pub async fn interruptible<T>(future: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::select! {
        result = future => result,
        () = wait_for_interrupt() => Err(InterruptedError.into()),
    }
}

pub fn reset() {
    INTERRUPTED.store(false, Ordering::SeqCst);
}

/// Registers a hook run on the second Ctrl+C before exit.
pub fn set_restore_hook<F>(hook: F)
where
    F: Fn() + Send + Sync + 'static,
{
    let _ = RESTORE_HOOK.set(Box::new(hook));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_interruptible_passes_result_through() {
        reset();
        let value = interruptible(async { Ok::<_, anyhow::Error>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_interrupted_error_display() {
        let err: anyhow::Error = InterruptedError.into();
        assert!(err.downcast_ref::<InterruptedError>().is_some());
        assert_eq!(err.to_string(), "Interrupted");
    }
}
