use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senselib_events::Notifier;
use senselib_kernel::Id;

use super::{InteractionBackend, Optimistic, WidgetError};

/// Heart toggle marking a document as a favorite.
pub struct FavoriteToggle {
    document: Id,
    state: Mutex<Optimistic<bool>>,
    backend: Arc<dyn InteractionBackend>,
    notifier: Notifier,
}

impl FavoriteToggle {
    pub fn new(
        document: Id,
        favorite: bool,
        backend: Arc<dyn InteractionBackend>,
        notifier: Notifier,
    ) -> Self {
        Self {
            document,
            state: Mutex::new(Optimistic::new(favorite)),
            backend,
            notifier,
        }
    }

    pub fn is_favorite(&self) -> bool {
        *self.lock().value()
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_pending()
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    /// Flip the flag. Returns the confirmed value.
    pub async fn toggle(&self) -> Result<bool, WidgetError> {
        let favorite = self.lock().apply(|favorite| {
            *favorite = !*favorite;
            *favorite
        })?;

        let result = self.backend.set_favorite(self.document, favorite).await;
        self.lock().settle(&result);
        match result {
            Ok(()) => Ok(favorite),
            Err(error) => {
                self.notifier.error(
                    "Favorites",
                    format!("Could not update favorites: {}", error.user_message()),
                );
                Err(error.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Optimistic<bool>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
