use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::storage::StorageLocator;

/// A video entity as held by the registry.
///
/// `video_locator` is only set after the object has been uploaded. `pending_video_locators`
/// holds one entry per upload that has started but not yet been confirmed, and
/// `retired_video_locators` holds replaced objects that still have to be deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_locator: Option<StorageLocator>,
    #[serde(default)]
    pub pending_video_locators: Vec<StorageLocator>,
    #[serde(default)]
    pub retired_video_locators: Vec<StorageLocator>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn new(user_id: Uuid, title: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.into(),
            description: description.into(),
            thumbnail_url: None,
            video_locator: None,
            pending_video_locators: Vec::new(),
            retired_video_locators: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Whether the registry still has cleanup to do for this video.
    pub fn has_unsettled_uploads(&self) -> bool {
        !self.pending_video_locators.is_empty() || !self.retired_video_locators.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Video as returned to clients; the stored locator is replaced by a signed URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VideoResponse {
    pub fn from_video(video: Video, video_url: Option<String>) -> Self {
        Self {
            id: video.id,
            user_id: video.user_id,
            title: video.title,
            description: video.description,
            thumbnail_url: video.thumbnail_url,
            video_url,
            created_at: video.created_at,
            updated_at: video.updated_at,
        }
    }
}
