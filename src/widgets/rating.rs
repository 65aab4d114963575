use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use senselib_events::Notifier;
use senselib_kernel::Id;

use super::{InteractionBackend, Optimistic, WidgetError};

pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingSummary {
    pub average: f32,
    pub count: u32,
    /// The current reader's own rating, if any.
    pub mine: Option<u8>,
}

impl RatingSummary {
    /// Summary after the reader rates `stars`, replacing their earlier rating.
    pub fn with_rating(self, stars: u8) -> Self {
        let total = self.average * self.count as f32;
        let (total, count) = match self.mine {
            Some(previous) => (total - f32::from(previous) + f32::from(stars), self.count.max(1)),
            None => (total + f32::from(stars), self.count + 1),
        };
        Self {
            average: total / count as f32,
            count,
            mine: Some(stars),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarFill {
    Full,
    Half,
    Empty,
}

/// Star icons for an average, rounded to the nearest half star.
pub fn star_fill(average: f32, max: u8) -> Vec<StarFill> {
    (0..max)
        .map(|index| {
            let remaining = average - f32::from(index);
            if remaining >= 0.75 {
                StarFill::Full
            } else if remaining >= 0.25 {
                StarFill::Half
            } else {
                StarFill::Empty
            }
        })
        .collect()
}

pub struct StarRating {
    document: Id,
    state: Mutex<Optimistic<RatingSummary>>,
    backend: Arc<dyn InteractionBackend>,
    notifier: Notifier,
}

impl StarRating {
    pub fn new(
        document: Id,
        summary: RatingSummary,
        backend: Arc<dyn InteractionBackend>,
        notifier: Notifier,
    ) -> Self {
        Self {
            document,
            state: Mutex::new(Optimistic::new(summary)),
            backend,
            notifier,
        }
    }

    pub fn summary(&self) -> RatingSummary {
        *self.lock().value()
    }

    pub fn stars(&self) -> Vec<StarFill> {
        star_fill(self.summary().average, MAX_STARS)
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error().map(str::to_string)
    }

    pub async fn rate(&self, stars: u8) -> Result<RatingSummary, WidgetError> {
        if !(1..=MAX_STARS).contains(&stars) {
            return Err(WidgetError::InvalidRating {
                stars,
                max: MAX_STARS,
            });
        }

        let summary = self.lock().apply(|summary| {
            *summary = summary.with_rating(stars);
            *summary
        })?;

        let result = self.backend.rate(self.document, stars).await;
        self.lock().settle(&result);
        match result {
            Ok(()) => {
                tracing::debug!(document = %self.document, stars, "rating saved");
                Ok(summary)
            }
            Err(error) => {
                self.notifier.error(
                    "Rating",
                    format!("Could not save your rating: {}", error.user_message()),
                );
                Err(error.into())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Optimistic<RatingSummary>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::SimulatedBackend;
    use senselib_kernel::ApiError;
    use std::time::Duration;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    fn rating(backend: &Arc<SimulatedBackend>) -> StarRating {
        let summary = RatingSummary {
            average: 4.0,
            count: 2,
            mine: None,
        };
        StarRating::new(Id(1), summary, backend.clone(), Notifier::new(4))
    }

    #[test]
    fn rerating_replaces_the_previous_vote() {
        let summary = RatingSummary {
            average: 4.0,
            count: 2,
            mine: None,
        };
        let first = summary.with_rating(5);
        assert_eq!(first.count, 3);
        assert!(close(first.average, 13.0 / 3.0));

        let second = first.with_rating(2);
        assert_eq!(second.count, 3);
        assert!(close(second.average, 10.0 / 3.0));
        assert_eq!(second.mine, Some(2));
    }

    #[test]
    fn fill_rounds_to_half_stars() {
        use StarFill::*;
        assert_eq!(star_fill(3.5, 5), vec![Full, Full, Full, Half, Empty]);
        assert_eq!(star_fill(4.8, 5), vec![Full, Full, Full, Full, Full]);
        assert_eq!(star_fill(0.0, 3), vec![Empty, Empty, Empty]);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_rating_restores_the_summary() {
        let backend = Arc::new(SimulatedBackend::new(Duration::from_millis(100), "Lan"));
        let widget = rating(&backend);
        backend.fail_next(ApiError::unauthorized("Sign in to rate"));

        assert!(widget.rate(5).await.is_err());
        assert_eq!(widget.summary().count, 2);
        assert_eq!(widget.summary().mine, None);
        assert_eq!(widget.error().as_deref(), Some("Sign in to rate"));

        let saved = widget.rate(3).await.unwrap();
        assert_eq!(saved.mine, Some(3));
        assert_eq!(widget.error(), None);
    }

    #[tokio::test]
    async fn out_of_range_rating_is_refused() {
        let widget = rating(&Arc::new(SimulatedBackend::new(Duration::ZERO, "Lan")));
        assert!(matches!(
            widget.rate(0).await,
            Err(WidgetError::InvalidRating { stars: 0, max: 5 })
        ));
        assert!(matches!(
            widget.rate(6).await,
            Err(WidgetError::InvalidRating { .. })
        ));
    }
}
