use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permissions::DeviceCapability;

pub const DEFAULT_CROP_DIMENSION: u32 = 200;
pub const MAX_CROP_DIMENSION: u32 = 4096;

#[derive(Clone)]
pub struct ImagePicker<E> {
    context: CapabilityContext<PickerOperation, E>,
}

impl<Ev> Capability<Ev> for ImagePicker<Ev> {
    type Operation = PickerOperation;
    type MappedSelf<MappedEv> = ImagePicker<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        ImagePicker::new(self.context.map_event(f))
    }
}

impl<E> ImagePicker<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<PickerOperation, E>) -> Self {
        Self { context }
    }

    /// Opens the camera or the gallery depending on `source`.
    pub fn acquire<F>(&self, source: ImageSource, options: PickerOptions, callback: F)
    where
        F: FnOnce(PickerResult) -> E + Send + 'static,
        E: Send,
    {
        let options = options.validated();
        let operation = match source {
            ImageSource::Camera => PickerOperation::OpenCamera { options },
            ImageSource::Gallery => PickerOperation::OpenPicker { options },
        };

        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(operation).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum PickerOperation {
    OpenCamera { options: PickerOptions },
    OpenPicker { options: PickerOptions },
}

impl Operation for PickerOperation {
    type Output = PickerResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImageSource {
    Camera,
    Gallery,
}

impl ImageSource {
    /// The device permission that must be granted before the picker opens.
    #[must_use]
    pub const fn required_capability(self) -> DeviceCapability {
        match self {
            Self::Camera => DeviceCapability::Camera,
            Self::Gallery => DeviceCapability::PhotoLibrary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MediaType {
    #[default]
    Photo,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PickerOptions {
    pub width: u32,
    pub height: u32,
    /// 0.0 to 1.0, where 1.0 keeps full quality.
    pub compress_quality: f32,
    pub media_type: MediaType,
    pub cropping: bool,
    pub free_style_crop: bool,
    pub multiple: bool,
}

impl Default for PickerOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_CROP_DIMENSION,
            height: DEFAULT_CROP_DIMENSION,
            compress_quality: 1.0,
            media_type: MediaType::Photo,
            cropping: true,
            free_style_crop: true,
            multiple: false,
        }
    }
}

impl PickerOptions {
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width.clamp(1, MAX_CROP_DIMENSION);
        self.height = height.clamp(1, MAX_CROP_DIMENSION);
        self
    }

    pub fn with_quality(mut self, quality: f32) -> Self {
        self.compress_quality = quality;
        self
    }

    pub fn without_cropping(mut self) -> Self {
        self.cropping = false;
        self.free_style_crop = false;
        self
    }

    /// Only one profile picture is ever selected.
    pub fn validated(mut self) -> Self {
        self.width = self.width.clamp(1, MAX_CROP_DIMENSION);
        self.height = self.height.clamp(1, MAX_CROP_DIMENSION);
        self.compress_quality = if self.compress_quality.is_finite() {
            self.compress_quality.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.multiple = false;
        if !self.cropping {
            self.free_style_crop = false;
        }
        self
    }
}

/// What the picker hands back. Only the local path is required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PickedImage {
    pub path: String,
    pub mime: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size_bytes: Option<u64>,
}

impl PickedImage {
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: None,
            width: None,
            height: None,
            size_bytes: None,
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum PickerError {
    #[error("selection cancelled by user")]
    Cancelled,

    #[error("picker unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("picker failed: {reason}")]
    Failed { reason: String },
}

impl PickerError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PickerError::Cancelled)
    }
}

pub type PickerResult = Result<PickedImage, PickerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_match_profile_crop() {
        let options = PickerOptions::default();
        assert_eq!(options.width, 200);
        assert_eq!(options.height, 200);
        assert!((options.compress_quality - 1.0).abs() < f32::EPSILON);
        assert_eq!(options.media_type, MediaType::Photo);
        assert!(options.cropping);
        assert!(options.free_style_crop);
        assert!(!options.multiple);
    }

    #[test]
    fn validation_clamps_and_forces_single_selection() {
        let options = PickerOptions {
            width: 0,
            height: 10_000,
            compress_quality: 1.8,
            multiple: true,
            cropping: false,
            ..PickerOptions::default()
        }
        .validated();

        assert_eq!(options.width, 1);
        assert_eq!(options.height, MAX_CROP_DIMENSION);
        assert!((options.compress_quality - 1.0).abs() < f32::EPSILON);
        assert!(!options.multiple);
        assert!(!options.free_style_crop);
    }

    #[test]
    fn builder_methods() {
        let options = PickerOptions::default()
            .with_dimensions(512, 384)
            .with_quality(0.8)
            .without_cropping();
        assert_eq!((options.width, options.height), (512, 384));
        assert!((options.compress_quality - 0.8).abs() < f32::EPSILON);
        assert!(!options.cropping);
    }

    #[test]
    fn sources_need_matching_permission() {
        assert_eq!(
            ImageSource::Camera.required_capability(),
            DeviceCapability::Camera
        );
        assert_eq!(
            ImageSource::Gallery.required_capability(),
            DeviceCapability::PhotoLibrary
        );
    }

    #[test]
    fn cancellation_helper() {
        assert!(PickerError::Cancelled.is_cancellation());
        assert!(!PickerError::Failed { reason: "io".into() }.is_cancellation());
    }
}
