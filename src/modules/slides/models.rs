use senselib_kernel::{Entity, Id};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::controllers::Draft;

/// Home-page carousel slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub id: Id,
    pub title: String,
    /// Set by the image upload endpoint, never by the form.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link: String,
    pub display_order: i32,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Entity for Slide {
    const NAME: &'static str = "slides";

    fn id(&self) -> Id {
        self.id
    }

    fn is_active(&self) -> Option<bool> {
        Some(self.is_active)
    }

    fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideDraft {
    pub title: String,
    pub link: String,
    pub display_order: i32,
}

impl Draft for SlideDraft {
    type Entity = Slide;

    fn from_entity(entity: &Slide) -> Self {
        Self {
            title: entity.title.clone(),
            link: entity.link.clone(),
            display_order: entity.display_order,
        }
    }
}
