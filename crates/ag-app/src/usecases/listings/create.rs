use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ag_core::marketplace::{ListingDraft, ListingValidationError, Resource};
use ag_core::ports::{ApiError, ImageEncodeError, ImageEncoderPort, ResourceWritePort};
use ag_core::user::{Capability, RoleSet};

#[derive(Debug, thiserror::Error)]
pub enum CreateListingError {
    #[error("your role does not allow this ({0:?})")]
    Forbidden(Capability),
    #[error(transparent)]
    Invalid(#[from] ListingValidationError),
    #[error("failed to read image: {0}")]
    Image(#[from] ImageEncodeError),
    #[error("this listing takes no images")]
    ImagesNotAccepted,
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CreateListingError {
    pub fn user_message(&self) -> String {
        match self {
            CreateListingError::Api(err) => err.user_message(),
            other => other.to_string(),
        }
    }
}

/// Create form submit: capability check, image encoding, validation, then
/// exactly one `POST /<resource>`.
pub struct CreateListing<R: Resource> {
    writer: Arc<dyn ResourceWritePort<R>>,
    images: Arc<dyn ImageEncoderPort>,
}

impl<R> CreateListing<R>
where
    R: Resource,
    R::Draft: ListingDraft,
{
    pub fn new(writer: Arc<dyn ResourceWritePort<R>>, images: Arc<dyn ImageEncoderPort>) -> Self {
        Self { writer, images }
    }

    pub async fn execute(
        &self,
        author: &RoleSet,
        mut draft: R::Draft,
        image_paths: Vec<PathBuf>,
    ) -> Result<R, CreateListingError> {
        let span = info_span!(
            "usecase.create_listing.execute",
            resource = R::PATH,
            images = image_paths.len()
        );
        async move {
            let capability = <R::Draft as ListingDraft>::CAPABILITY;
            if !author.can(capability) {
                return Err(CreateListingError::Forbidden(capability));
            }

            if !image_paths.is_empty() {
                let mut encoded = Vec::with_capacity(image_paths.len());
                for path in &image_paths {
                    encoded.push(self.images.encode_data_url(path).await?);
                }
                draft
                    .images_mut()
                    .ok_or(CreateListingError::ImagesNotAccepted)?
                    .extend(encoded);
            }

            draft.validate()?;

            let created = self.writer.create(&draft).await?;
            info!(id = %created.id(), "listing created");
            Ok(created)
        }
        .instrument(span)
        .await
    }
}
