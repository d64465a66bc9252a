use std::sync::Arc;

use super::{MetadataService, VideoMetadata};
use crate::utils::format_views;

/// Best-effort display metadata lookup
#[derive(Clone)]
pub struct MetadataRetriever {
    service: Arc<dyn MetadataService>,
}

impl MetadataRetriever {
    pub fn new(service: Arc<dyn MetadataService>) -> Self {
        Self { service }
    }

    /// Fetch title and formatted view count for a reference
    ///
    /// Never fails: a service error yields null title and views. A successful lookup
    /// always carries a title (possibly empty) and a views string, "0 views" when the
    /// service had no count.
    pub async fn fetch_metadata(&self, url: &str) -> VideoMetadata {
        match self.service.video_details(url).await {
            Ok(details) => VideoMetadata {
                title: Some(details.title.unwrap_or_default()),
                views: Some(format_views(details.views.unwrap_or(0))),
                target_url: url.to_string(),
            },
            Err(err) => {
                tracing::error!(url, "Failed to fetch metadata: {:#}", err);
                VideoMetadata::unavailable(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{MockMetadataService, VideoDetails};

    const URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[tokio::test]
    async fn test_full_metadata() {
        let mut mock = MockMetadataService::new();
        mock.expect_video_details()
            .withf(|url| url == URL)
            .returning(|_| {
                Ok(VideoDetails {
                    title: Some("Never Gonna Give You Up".to_string()),
                    views: Some(1_234_567_890),
                })
            });

        let metadata = MetadataRetriever::new(Arc::new(mock)).fetch_metadata(URL).await;
        assert_eq!(metadata.title.as_deref(), Some("Never Gonna Give You Up"));
        assert_eq!(metadata.views.as_deref(), Some("1,234,567,890 views"));
        assert_eq!(metadata.target_url, URL);
    }

    #[tokio::test]
    async fn test_partial_metadata_defaults() {
        let mut mock = MockMetadataService::new();
        mock.expect_video_details()
            .returning(|_| Ok(VideoDetails::default()));

        let metadata = MetadataRetriever::new(Arc::new(mock)).fetch_metadata(URL).await;
        assert_eq!(metadata.title.as_deref(), Some(""));
        assert_eq!(metadata.views.as_deref(), Some("0 views"));
    }

    #[tokio::test]
    async fn test_total_failure() {
        let mut mock = MockMetadataService::new();
        mock.expect_video_details()
            .returning(|_| Err(anyhow::anyhow!("video unavailable")));

        let metadata = MetadataRetriever::new(Arc::new(mock)).fetch_metadata(URL).await;
        assert_eq!(metadata, VideoMetadata::unavailable(URL));
        assert_eq!(metadata.target_url, URL);
    }
}
