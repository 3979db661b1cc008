//! Capture and assessment workflows.
//!
//! Both workflows call an external service first and then persist what it
//! returned. References are checked before the camera is triggered, so a
//! bad request never produces an orphaned capture.

use std::sync::Arc;

use mockable::Clock;
use tracing::{error, info};

use crate::domain::ports::{
    AnalysisRequest, AnalysisService, CaptureRequest, CaptureService,
};
use crate::domain::records::{
    Assessment, EntityKind, Image, LinkageError, NewAssessment, NewImage, NewRecord, Record,
    RecordId,
};
use crate::domain::{LinkCheckError, RecordStore};

/// Request to capture an image into an image set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureImageRequest {
    /// Patient being imaged.
    pub patient_id: RecordId,
    /// Image set receiving the capture.
    pub set_id: RecordId,
}

/// Request to assess a stored image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssessImageRequest {
    /// Image to assess.
    pub image_id: RecordId,
}

/// Failures of the imaging workflows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImagingError {
    /// The image to assess does not exist.
    #[error("image {id} does not exist")]
    ImageNotFound {
        /// Requested image id.
        id: RecordId,
    },
    /// The request references missing or inconsistent parents.
    #[error(transparent)]
    Linkage(#[from] LinkageError),
    /// The camera or analyzer failed.
    #[error("{message}")]
    Upstream {
        /// Caller-facing summary.
        message: String,
    },
    /// The record store failed.
    #[error("{message}")]
    Persistence {
        /// Caller-facing summary.
        message: String,
    },
}

impl ImagingError {
    fn upstream(message: &str) -> Self {
        Self::Upstream {
            message: message.to_owned(),
        }
    }

    fn persistence(message: &str) -> Self {
        Self::Persistence {
            message: message.to_owned(),
        }
    }
}

/// Coordinates the camera, the analyzer and the record store.
#[derive(Clone)]
pub struct ImagingService {
    store: RecordStore,
    capture: Arc<dyn CaptureService>,
    analysis: Arc<dyn AnalysisService>,
    clock: Arc<dyn Clock>,
}

impl ImagingService {
    /// Creates the service.
    pub fn new(
        store: RecordStore,
        capture: Arc<dyn CaptureService>,
        analysis: Arc<dyn AnalysisService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            capture,
            analysis,
            clock,
        }
    }

    /// Captures an image for the set and stores it.
    ///
    /// The image takes the camera's timestamp when one is reported and the
    /// current time otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::Linkage`] when the set does not belong to
    /// the patient, [`ImagingError::Upstream`] when the camera fails and
    /// [`ImagingError::Persistence`] when the image cannot be stored.
    pub async fn capture_image(&self, request: CaptureImageRequest) -> Result<Image, ImagingError> {
        let pending = NewImage {
            set_id: request.set_id,
            patient_id: request.patient_id,
            image_timestamp: self.clock.utc(),
            uri: String::new(),
        };
        self.check_links(&NewRecord::Image(pending.clone())).await?;

        let response = self
            .capture
            .capture(CaptureRequest {
                patient_id: request.patient_id,
                set_id: request.set_id,
            })
            .await
            .map_err(|err| {
                error!(set_id = %request.set_id, error = %err, "camera capture failed");
                ImagingError::upstream("Failed to capture image")
            })?;

        let draft = NewRecord::Image(NewImage {
            image_timestamp: response
                .image_timestamp
                .unwrap_or(pending.image_timestamp),
            uri: response.uri,
            ..pending
        })
        .normalized()
        .map_err(|err| {
            error!(set_id = %request.set_id, error = %err, "camera returned an unusable image");
            ImagingError::upstream("Failed to capture image")
        })?;

        match self.store.create(draft).await {
            Some(Record::Image(image)) => {
                info!(image_id = %image.id, set_id = %image.set_id, "image captured");
                Ok(image)
            }
            _ => Err(ImagingError::persistence("No id received for new image")),
        }
    }

    /// Sends a stored image to the analyzer and records the verdict.
    ///
    /// # Errors
    ///
    /// Returns [`ImagingError::ImageNotFound`] for unknown images,
    /// [`ImagingError::Upstream`] when the analyzer fails and
    /// [`ImagingError::Persistence`] when the store fails.
    pub async fn assess_image(
        &self,
        request: AssessImageRequest,
    ) -> Result<Assessment, ImagingError> {
        let image = self.load_image(request.image_id).await?;

        let response = self
            .analysis
            .analyze(AnalysisRequest {
                image_id: image.id,
                uri: image.uri.clone(),
            })
            .await
            .map_err(|err| {
                error!(image_id = %image.id, error = %err, "image analysis failed");
                ImagingError::upstream("Failed to assess image")
            })?;

        let draft = NewRecord::Assessment(NewAssessment {
            image_id: image.id,
            set_id: image.set_id,
            patient_id: image.patient_id,
            assessment_timestamp: response
                .assessment_timestamp
                .unwrap_or_else(|| self.clock.utc()),
            assessment: response.assessment,
        });

        match self.store.create(draft).await {
            Some(Record::Assessment(assessment)) => {
                info!(
                    assessment_id = %assessment.id,
                    image_id = %assessment.image_id,
                    outcome = assessment.assessment,
                    "image assessed"
                );
                Ok(assessment)
            }
            _ => Err(ImagingError::persistence("No id received for new assessment")),
        }
    }

    async fn check_links(&self, draft: &NewRecord) -> Result<(), ImagingError> {
        self.store.check_links(draft).await.map_err(|err| match err {
            LinkCheckError::Linkage(linkage) => ImagingError::Linkage(linkage),
            LinkCheckError::Store(store) => {
                error!(error = %store, "failed to load parent records");
                ImagingError::persistence("Failed to verify record links")
            }
        })
    }

    async fn load_image(&self, id: RecordId) -> Result<Image, ImagingError> {
        let found = self
            .store
            .fetch_by_id(id, EntityKind::Image.table_name())
            .await
            .map_err(|_| ImagingError::persistence("Duplicate uuids found"))?;
        match found {
            Some(Record::Image(image)) => Ok(image),
            _ => Err(ImagingError::ImageNotFound { id }),
        }
    }
}
