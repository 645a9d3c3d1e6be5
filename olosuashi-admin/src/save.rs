use olosuashi_core::{ApiError, ApiResult, TourGateway, TourMediaGateway};
use olosuashi_shared::{ImageUpload, Tour, TourImage};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::form::{CoverChoice, FormErrors, TourForm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStep {
    CreateTour,
    UpdateTour,
    UploadImages,
    SetCover,
}

impl fmt::Display for SaveStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SaveStep::CreateTour => "create tour",
            SaveStep::UpdateTour => "update tour",
            SaveStep::UploadImages => "upload images",
            SaveStep::SetCover => "set cover image",
        };
        f.write_str(name)
    }
}

/// Per-step retry budget. Only transport failures are retried. Any answer
/// from the server, including an undecodable body or a 5xx, fails the step
/// immediately.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Multiplied by the attempt number before each retry.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// What was undone after a failed step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompensationReport {
    pub deleted_tour: Option<Uuid>,
    pub deleted_images: Vec<Uuid>,
    /// The record was updated in place before the failure; the old field
    /// values are not restored.
    pub update_kept: bool,
    /// Undo actions that themselves failed.
    pub failures: Vec<String>,
}

impl CompensationReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && !self.update_kept
    }
}

#[derive(Debug)]
pub struct SaveReport {
    pub tour: Tour,
    pub uploaded: Vec<TourImage>,
    pub cover: Option<Uuid>,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Tour form is invalid: {0}")]
    Invalid(FormErrors),

    #[error("Could not {step} after {attempts} attempt(s): {source}")]
    StepFailed {
        step: SaveStep,
        attempts: u32,
        #[source]
        source: ApiError,
        compensation: CompensationReport,
    },
}

/// Create/update, upload images, set cover, as one unit.
///
/// Each step is retried under [`RetryPolicy`]. When a step gives up, the
/// steps already done are undone in reverse order: a freshly created tour
/// is deleted (taking its images with it); on an existing tour, newly
/// uploaded images are deleted.
pub struct TourSaveSaga {
    tours: Arc<dyn TourGateway>,
    media: Arc<dyn TourMediaGateway>,
    policy: RetryPolicy,
}

impl TourSaveSaga {
    pub fn new(
        tours: Arc<dyn TourGateway>,
        media: Arc<dyn TourMediaGateway>,
        policy: RetryPolicy,
    ) -> Self {
        Self { tours, media, policy }
    }

    pub async fn save(&self, form: &TourForm) -> Result<SaveReport, SaveError> {
        let payload = form.validate().map_err(SaveError::Invalid)?;

        // 1. Record
        let (tour, created) = match form.id {
            None => {
                let tour = self
                    .with_retry(SaveStep::CreateTour, || self.tours.create_tour(&payload))
                    .await
                    .map_err(|(source, attempts)| SaveError::StepFailed {
                        step: SaveStep::CreateTour,
                        attempts,
                        source,
                        compensation: CompensationReport::default(),
                    })?;
                info!("Created tour {} ({})", tour.id, tour.slug);
                (tour, true)
            }
            Some(id) => {
                let tour = self
                    .with_retry(SaveStep::UpdateTour, || self.tours.update_tour(id, &payload))
                    .await
                    .map_err(|(source, attempts)| SaveError::StepFailed {
                        step: SaveStep::UpdateTour,
                        attempts,
                        source,
                        compensation: CompensationReport::default(),
                    })?;
                info!("Updated tour {}", tour.id);
                (tour, false)
            }
        };

        // 2. Images
        let uploads: Vec<ImageUpload> = form.pending_images.iter().map(|p| p.to_upload()).collect();
        let uploaded = if uploads.is_empty() {
            Vec::new()
        } else {
            match self
                .with_retry(SaveStep::UploadImages, || {
                    self.media.upload_images(tour.id, uploads.clone())
                })
                .await
            {
                Ok(images) => {
                    info!("Uploaded {} image(s) to tour {}", images.len(), tour.id);
                    images
                }
                Err((source, attempts)) => {
                    let compensation = self.compensate(tour.id, created, &[]).await;
                    return Err(SaveError::StepFailed {
                        step: SaveStep::UploadImages,
                        attempts,
                        source,
                        compensation,
                    });
                }
            }
        };

        // 3. Cover
        let cover = match form.cover {
            None => None,
            Some(CoverChoice::Existing(id)) => Some(id),
            Some(CoverChoice::Pending(index)) => match uploaded.get(index) {
                Some(image) => Some(image.id),
                None => {
                    warn!(
                        "Server returned {} image(s), cover index {} has no match",
                        uploaded.len(),
                        index
                    );
                    None
                }
            },
        };

        if let Some(image_id) = cover {
            if let Err((source, attempts)) = self
                .with_retry(SaveStep::SetCover, || self.media.set_cover_image(tour.id, image_id))
                .await
            {
                let compensation = self.compensate(tour.id, created, &uploaded).await;
                return Err(SaveError::StepFailed {
                    step: SaveStep::SetCover,
                    attempts,
                    source,
                    compensation,
                });
            }
        }

        Ok(SaveReport { tour, uploaded, cover })
    }

    async fn with_retry<T, F, Fut>(&self, step: SaveStep, mut op: F) -> Result<T, (ApiError, u32)>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ApiResult<T>>,
    {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transport() && attempt < max_attempts => {
                    warn!("{} failed (attempt {}/{}): {}", step, attempt, max_attempts, e);
                    tokio::time::sleep(self.policy.backoff * attempt).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("{} failed after {} attempt(s): {}", step, attempt, e);
                    return Err((e, attempt));
                }
            }
        }
    }

    async fn compensate(&self, tour_id: Uuid, created: bool, uploaded: &[TourImage]) -> CompensationReport {
        let mut report = CompensationReport::default();

        if created {
            match self.tours.delete_tour(tour_id).await {
                Ok(()) => {
                    warn!("Rolled back tour {}", tour_id);
                    report.deleted_tour = Some(tour_id);
                }
                Err(e) => {
                    error!("Rollback of tour {} failed: {}", tour_id, e);
                    report.failures.push(format!("delete tour {}: {}", tour_id, e));
                }
            }
            return report;
        }

        report.update_kept = true;
        for image in uploaded.iter().rev() {
            match self.media.delete_image(tour_id, image.id).await {
                Ok(()) => report.deleted_images.push(image.id),
                Err(e) => {
                    error!("Rollback of image {} failed: {}", image.id, e);
                    report.failures.push(format!("delete image {}: {}", image.id, e));
                }
            }
        }
        warn!(
            "Tour {} keeps its updated fields; removed {} uploaded image(s)",
            tour_id,
            report.deleted_images.len()
        );
        report
    }
}
