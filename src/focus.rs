// This is free and unencumbered software released into the public domain.

use crate::events::HardwareEvent;
use std::{
    sync::mpsc::{RecvTimeoutError, SyncSender, sync_channel},
    thread::JoinHandle,
    time::Duration,
};

/// One-shot timer armed on every tap-to-focus gesture. If it elapses before
/// being cancelled, focus-and-metering reverts to continuous mode; the
/// elapsed notification is marshaled through the hardware event channel like
/// any other completion. Dropping the timer cancels and joins it, so a stale
/// timer can never fire into a session that has moved on.
pub struct FocusTimer {
    cancel_tx: SyncSender<()>,
    join: Option<JoinHandle<()>>,
}

impl FocusTimer {
    pub fn arm(timeout: Duration, ticket: u64, events: SyncSender<HardwareEvent>) -> Self {
        let (cancel_tx, cancel_rx) = sync_channel::<()>(1);

        let join = std::thread::spawn(move || {
            if let Err(RecvTimeoutError::Timeout) = cancel_rx.recv_timeout(timeout) {
                let _ = events.try_send(HardwareEvent::FocusTimerElapsed { ticket });
            }
        });

        Self {
            cancel_tx,
            join: Some(join),
        }
    }
}

impl Drop for FocusTimer {
    fn drop(&mut self) {
        let _ = self.cancel_tx.try_send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}
