//! # Cancellation
//!
//! Shutdown is cooperative. The coordinator owns a [`CancellationSignal`] and sets
//! it exactly once. Actors get a [`CancellationToken`] from it, which can only be
//! read, and check it at fixed points of their loop. A
//! [`ShutdownTrigger`] is the external event the coordinator waits on before
//! setting the signal.

use async_trait::async_trait;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

/// Write-once shutdown flag. Not `Clone`: there is one writer.
#[derive(Debug, Default)]
pub struct CancellationSignal {
    flag: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// A read-only handle on this signal.
    pub fn token(&self) -> CancellationToken {
        CancellationToken {
            flag: Arc::clone(&self.flag),
        }
    }

    /// Sets the flag. Returns `true` only for the call that actually set it.
    pub fn set(&self) -> bool {
        !self.flag.swap(true, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Reader side of a [`CancellationSignal`].
#[derive(Debug, Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// The single external event that ends a run (window close, Ctrl-C, a timer).
#[async_trait]
pub trait ShutdownTrigger: Send {
    /// Resolves when the host wants the simulation to stop.
    async fn wait(&mut self) -> io::Result<()>;
}

/// Fires on Ctrl-C.
#[derive(Debug, Clone, Copy, Default)]
pub struct CtrlC;

#[async_trait]
impl ShutdownTrigger for CtrlC {
    async fn wait(&mut self) -> io::Result<()> {
        tokio::signal::ctrl_c().await
    }
}

/// Fires after a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct After(pub Duration);

#[async_trait]
impl ShutdownTrigger for After {
    async fn wait(&mut self) -> io::Result<()> {
        tokio::time::sleep(self.0).await;
        Ok(())
    }
}

/// Fires when the paired sender sends, or is dropped.
#[async_trait]
impl ShutdownTrigger for oneshot::Receiver<()> {
    async fn wait(&mut self) -> io::Result<()> {
        let _ = self.await;
        Ok(())
    }
}
