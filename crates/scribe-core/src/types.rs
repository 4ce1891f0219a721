//! Core data types for the Scribe pipeline.
//!
//! `AnalysisResult` is what the vision service tells us about one image;
//! `ProcessingRecord` is the self-contained unit persisted for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// A caption with the service's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Caption {
    pub text: String,

    /// Confidence score from 0.0 to 1.0
    pub confidence: f32,
}

impl Caption {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// A content tag with confidence score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag label (e.g., "outdoor", "dog", "grass")
    pub name: String,

    /// Confidence score from 0.0 to 1.0
    pub confidence: f32,
}

impl Tag {
    /// Create a new tag with the given name and confidence.
    pub fn new(name: impl Into<String>, confidence: f32) -> Self {
        Self {
            name: name.into(),
            confidence,
        }
    }
}

/// Pixel rectangle in the coordinate space of the analyzed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// An object located in the image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    /// Object label
    pub name: String,

    /// Confidence score from 0.0 to 1.0
    pub confidence: f32,

    pub bounding_box: BoundingBox,
}

/// Structured output of the vision service for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Primary caption, if the service produced one
    pub caption: Option<Caption>,

    /// Region captions, in service order
    #[serde(default)]
    pub dense_captions: Vec<Caption>,

    /// Tags with unique names, in service order
    #[serde(default)]
    pub tags: Vec<Tag>,

    #[serde(default)]
    pub objects: Vec<DetectedObject>,

    /// Model version reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,

    /// Image width as seen by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,

    /// Image height as seen by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

impl AnalysisResult {
    /// Drop repeated tag names, keeping the first occurrence.
    pub fn dedup_tags(&mut self) {
        let mut seen = HashSet::with_capacity(self.tags.len());
        self.tags.retain(|tag| seen.insert(tag.name.clone()));
    }

    /// Names of all tags, in order.
    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }

    /// Names of all detected objects, in order.
    pub fn object_names(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.name.as_str()).collect()
    }
}

/// The persisted result for one successfully processed image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRecord {
    /// When the record was assembled (RFC 3339, UTC)
    pub timestamp: DateTime<Utc>,

    /// Path of the source image as it was given to the run
    pub image_path: PathBuf,

    pub analysis: AnalysisResult,

    /// Text produced by the generation deployment
    pub generated_text: String,
}

impl ProcessingRecord {
    /// Assemble a record stamped with the current time.
    pub fn new(image_path: PathBuf, analysis: AnalysisResult, generated_text: String) -> Self {
        Self {
            timestamp: Utc::now(),
            image_path,
            analysis,
            generated_text,
        }
    }
}
