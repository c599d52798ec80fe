use std::sync::Arc;

use tokio::sync::watch;

use crate::models::{RentBuyMode, UiMode};

/// Rent/buy/ai toggle state, shared the same way as [`super::SearchStore`].
#[derive(Debug, Clone)]
pub struct ModeStore {
    inner: Arc<watch::Sender<UiMode>>,
}

impl Default for ModeStore {
    fn default() -> Self {
        Self::new(UiMode::default())
    }
}

impl ModeStore {
    pub fn new(mode: UiMode) -> Self {
        let (sender, _) = watch::channel(mode);
        Self {
            inner: Arc::new(sender),
        }
    }

    pub fn mode(&self) -> UiMode {
        *self.inner.borrow()
    }

    /// Mode forwarded to the API; `ai` is sent as `rent`.
    pub fn api_mode(&self) -> RentBuyMode {
        RentBuyMode::from(self.mode())
    }

    pub fn set_mode(&self, mode: UiMode) {
        self.inner.send_if_modified(|current| {
            let changed = *current != mode;
            *current = mode;
            changed
        });
    }

    /// Rent becomes buy; anything else becomes rent.
    pub fn toggle_mode(&self) {
        let next = match self.mode() {
            UiMode::Rent => UiMode::Buy,
            UiMode::Buy | UiMode::Ai => UiMode::Rent,
        };
        self.set_mode(next);
    }

    pub fn subscribe(&self) -> watch::Receiver<UiMode> {
        self.inner.subscribe()
    }
}
