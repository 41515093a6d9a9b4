//! The active display language.

use std::sync::Arc;

use grubline_core::Language;
use tokio::sync::watch;

/// Holds the active language and notifies subscribers when it changes.
///
/// Cloning shares the same state. Subscribers receive a
/// [`watch::Receiver`]; dropping it unsubscribes.
#[derive(Debug, Clone)]
pub struct LanguageContext {
    tx: Arc<watch::Sender<Language>>,
}

impl LanguageContext {
    /// Create a context starting at `initial`.
    #[must_use]
    pub fn new(initial: Language) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    /// The active language.
    #[must_use]
    pub fn current(&self) -> Language {
        *self.tx.borrow()
    }

    /// Switch the active language.
    ///
    /// Returns the previous language when it actually changed; subscribers
    /// are only notified in that case.
    pub fn set(&self, language: Language) -> Option<Language> {
        let mut previous = None;
        self.tx.send_if_modified(|current| {
            if *current == language {
                return false;
            }
            previous = Some(*current);
            *current = language;
            true
        });
        if let Some(from) = previous {
            tracing::info!(%from, to = %language, "Language changed");
        }
        previous
    }

    /// Receive language changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.tx.subscribe()
    }
}

impl Default for LanguageContext {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
