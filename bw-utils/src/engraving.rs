use std::sync::Arc;

use bevy::ecs::resource::Resource;
use serde::{Deserialize, Serialize};

use crate::Face;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngravingMethod {
    #[default]
    Upload,
    Text,
}

impl EngravingMethod {
    pub const ALL: [Self; 2] = [Self::Upload, Self::Text];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Upload => "Upload",
            Self::Text => "Text",
        }
    }

    pub const fn helper(self) -> &'static str {
        match self {
            Self::Upload => "SVG, PNG, JPEG, or BMP under 10MB",
            Self::Text => "Add text with your font + size",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    pub const ALL: [Self; 3] = [Self::Left, Self::Center, Self::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Top,
    Bottom,
    Left,
    Right,
    #[default]
    Center,
}

impl Placement {
    pub const ALL: [Self; 5] = [
        Self::Top,
        Self::Left,
        Self::Center,
        Self::Right,
        Self::Bottom,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Contain: the whole image is visible.
    #[default]
    Fit,
    /// Cover: the square is filled, excess is cropped.
    Fill,
    /// Exact square, aspect ratio ignored.
    Stretch,
}

impl ImageFit {
    pub const ALL: [Self; 3] = [Self::Fit, Self::Fill, Self::Stretch];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fit => "Fit",
            Self::Fill => "Fill",
            Self::Stretch => "Stretch",
        }
    }
}

/// Raw bytes of an uploaded image. Cloning shares the buffer.
#[derive(Clone)]
pub struct SourceImage {
    pub name: String,
    pub bytes: Arc<[u8]>,
}

impl SourceImage {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Same upload, compared by buffer identity before content.
    pub fn same_bytes(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.bytes, &other.bytes) || self.bytes == other.bytes
    }
}

impl PartialEq for SourceImage {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.same_bytes(other)
    }
}

impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The user's chosen decoration for one face.
///
/// Both methods keep their fields so switching back and forth restores the
/// previous input; only the fields of `method` affect the rendered texture.
#[derive(Debug, Clone, PartialEq)]
pub struct EngravingSpec {
    pub method: EngravingMethod,
    pub text: String,
    pub font: String,
    pub size: f32,
    pub alignment: TextAlign,
    pub placement: Placement,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub upload: Option<SourceImage>,
    pub fit: ImageFit,
}

impl Default for EngravingSpec {
    fn default() -> Self {
        Self {
            method: EngravingMethod::Upload,
            text: String::new(),
            font: String::new(),
            size: Self::DEFAULT_SIZE,
            alignment: TextAlign::Center,
            placement: Placement::Center,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            upload: None,
            fit: ImageFit::Fit,
        }
    }
}

impl EngravingSpec {
    pub const DEFAULT_SIZE: f32 = 70.0;
    pub const DEFAULT_FONT: &'static str = "Arial, sans-serif";

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            method: EngravingMethod::Text,
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn upload(source: SourceImage, fit: ImageFit) -> Self {
        Self {
            method: EngravingMethod::Upload,
            upload: Some(source),
            fit,
            ..Default::default()
        }
    }

    /// Requested size, or the default when it is not a positive number.
    pub fn font_size(&self) -> f32 {
        if self.size.is_finite() && self.size > 0.0 {
            self.size
        } else {
            Self::DEFAULT_SIZE
        }
    }

    pub fn font_family(&self) -> &str {
        let trimmed = self.font.trim();
        if trimmed.is_empty() {
            Self::DEFAULT_FONT
        } else {
            trimmed
        }
    }

    /// Whether this spec can produce any pixels at all.
    pub fn has_content(&self) -> bool {
        match self.method {
            EngravingMethod::Text => !self.text.trim().is_empty(),
            EngravingMethod::Upload => self.upload.as_ref().is_some_and(|s| !s.is_empty()),
        }
    }

    /// Compares only the fields that influence the synthesized texture.
    pub fn renders_same(&self, other: &Self) -> bool {
        if self.method != other.method {
            return false;
        }
        match self.method {
            EngravingMethod::Text => {
                self.text == other.text
                    && self.font_family() == other.font_family()
                    && self.font_size() == other.font_size()
                    && self.alignment == other.alignment
                    && self.placement == other.placement
                    && self.bold == other.bold
                    && self.italic == other.italic
                    && self.underline == other.underline
                    && self.strikethrough == other.strikethrough
            }
            EngravingMethod::Upload => {
                self.fit == other.fit
                    && match (&self.upload, &other.upload) {
                        (Some(a), Some(b)) => a.same_bytes(b),
                        (None, None) => true,
                        _ => false,
                    }
            }
        }
    }
}

/// Total mapping from face to engraving, always six entries.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct FaceEngravings([EngravingSpec; 6]);

impl FaceEngravings {
    pub fn get(&self, face: Face) -> &EngravingSpec {
        &self.0[face.index()]
    }

    pub fn get_mut(&mut self, face: Face) -> &mut EngravingSpec {
        &mut self.0[face.index()]
    }

    pub fn set(&mut self, face: Face, spec: EngravingSpec) {
        self.0[face.index()] = spec;
    }

    pub fn with(mut self, face: Face, spec: EngravingSpec) -> Self {
        self.set(face, spec);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Face, &EngravingSpec)> {
        Face::ALL.into_iter().zip(self.0.iter())
    }
}
