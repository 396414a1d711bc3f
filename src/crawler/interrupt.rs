//! Cooperative user-interrupt signal for the batch loop

use tokio::sync::watch;

/// Sending half, triggered once by the signal handler
#[derive(Debug)]
pub struct InterruptHandle {
    tx: watch::Sender<bool>,
}

impl InterruptHandle {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Receiving half polled by the batch loop between and during records
#[derive(Debug, Clone)]
pub struct Interrupt {
    rx: Option<watch::Receiver<bool>>,
}

/// Creates a connected handle/interrupt pair
pub fn channel() -> (InterruptHandle, Interrupt) {
    let (tx, rx) = watch::channel(false);
    (InterruptHandle { tx }, Interrupt { rx: Some(rx) })
}

impl Interrupt {
    /// An interrupt that never fires
    pub fn never() -> Self {
        Self { rx: None }
    }

    /// Installs a Ctrl-C listener and returns the interrupt it feeds
    pub fn on_ctrl_c() -> Self {
        let (handle, interrupt) = channel();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received, saving processed records");
                handle.trigger();
            }
        });
        interrupt
    }

    pub fn is_triggered(&self) -> bool {
        self.rx.as_ref().map(|rx| *rx.borrow()).unwrap_or(false)
    }

    /// Completes once the interrupt has been triggered
    ///
    /// Stays pending forever when the handle is dropped without triggering.
    pub async fn triggered(&mut self) {
        if let Some(rx) = self.rx.as_mut() {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    break;
                }
            }
        }
        futures::future::pending::<()>().await
    }
}
