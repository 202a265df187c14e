use image::DynamicImage;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Recognition {
    #[schema(example = "Person 1")]
    pub name: String,
}

/// Maps a decoded photo to an identity. `None` means no face was recognized.
pub trait FaceRecognizer: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> Option<Recognition>;
}

/// Reports the same configured identity for every image without
/// looking at the pixels.
pub struct PlaceholderRecognizer {
    name: String,
}

impl PlaceholderRecognizer {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl FaceRecognizer for PlaceholderRecognizer {
    fn recognize(&self, _image: &DynamicImage) -> Option<Recognition> {
        Some(Recognition {
            name: self.name.clone(),
        })
    }
}
