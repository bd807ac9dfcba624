use std::sync::Arc;

use course_core::model::{PlaybackSettings, PlaybackSettingsDraft};
use storage::repository::PlaybackSettingsRepository;

use crate::error::SettingsServiceError;

#[derive(Clone)]
pub struct PlaybackSettingsService {
    repo: Arc<dyn PlaybackSettingsRepository>,
}

impl PlaybackSettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn PlaybackSettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<PlaybackSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation fails or persistence fails.
    pub async fn save(
        &self,
        draft: PlaybackSettingsDraft,
    ) -> Result<PlaybackSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{PlaybackSettingsError, Voice};
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn load_falls_back_to_defaults() {
        let service = PlaybackSettingsService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(service.load().await.unwrap(), PlaybackSettings::default());
    }

    #[tokio::test]
    async fn save_validates_before_persisting() {
        let service = PlaybackSettingsService::new(Arc::new(InMemoryRepository::new()));
        let err = service
            .save(PlaybackSettingsDraft {
                rate: 0.1,
                ..PlaybackSettingsDraft::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsServiceError::Settings(PlaybackSettingsError::InvalidRate(_))
        ));
        assert_eq!(service.load().await.unwrap(), PlaybackSettings::default());

        let saved = service
            .save(PlaybackSettingsDraft {
                voice: Voice::Alternate,
                ..PlaybackSettingsDraft::default()
            })
            .await
            .unwrap();
        assert_eq!(service.load().await.unwrap(), saved);
    }
}
