//! Image Analysis 4.0 REST client.
//!
//! Sends the raw image bytes as `application/octet-stream` and requests
//! captions, dense captions, tags and objects in a single call.

use super::VisionAnalyzer;
use crate::config::VisionConfig;
use crate::error::VisionServiceError;
use crate::types::{AnalysisResult, BoundingBox, Caption, DetectedObject, Tag};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Caption features are only served for English.
const CAPTION_LANGUAGE: &str = "en";

/// Image analysis client authenticated with a subscription key.
pub struct AzureVisionClient {
    endpoint: String,
    api_key: String,
    api_version: String,
    language: String,
    model_version: String,
    gender_neutral_caption: bool,
    client: reqwest::Client,
    timeout: Duration,
}

impl AzureVisionClient {
    pub fn new(config: &VisionConfig, timeout: Duration) -> Self {
        Self {
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            language: config.language.clone(),
            model_version: config.model_version.clone(),
            gender_neutral_caption: config.gender_neutral_caption,
            client: reqwest::Client::new(),
            timeout,
        }
    }

    fn analyze_url(&self) -> String {
        format!("{}/computervision/imageanalysis:analyze", self.endpoint)
    }

    /// Comma-separated feature list for the request.
    fn features(&self) -> &'static str {
        if self.language == CAPTION_LANGUAGE {
            "caption,denseCaptions,tags,objects"
        } else {
            "tags,objects"
        }
    }
}

// --- Response types ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    model_version: Option<String>,
    caption_result: Option<CaptionValue>,
    dense_captions_result: Option<ValueList<CaptionValue>>,
    tags_result: Option<ValueList<TagValue>>,
    objects_result: Option<ValueList<ObjectValue>>,
    metadata: Option<ImageMetadata>,
}

#[derive(Deserialize)]
struct ValueList<T> {
    values: Vec<T>,
}

#[derive(Deserialize)]
struct CaptionValue {
    text: String,
    confidence: f32,
}

#[derive(Deserialize)]
struct TagValue {
    name: String,
    confidence: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectValue {
    bounding_box: Rect,
    tags: Vec<TagValue>,
}

#[derive(Deserialize)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}

#[derive(Deserialize)]
struct ImageMetadata {
    width: u32,
    height: u32,
}

impl From<AnalyzeResponse> for AnalysisResult {
    fn from(resp: AnalyzeResponse) -> Self {
        let objects = resp
            .objects_result
            .map(|list| list.values)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                // An object is labelled by its best tag; unlabelled regions are dropped.
                let label = obj.tags.into_iter().next()?;
                Some(DetectedObject {
                    name: label.name,
                    confidence: label.confidence,
                    bounding_box: BoundingBox {
                        x: obj.bounding_box.x,
                        y: obj.bounding_box.y,
                        width: obj.bounding_box.w,
                        height: obj.bounding_box.h,
                    },
                })
            })
            .collect();

        let mut analysis = AnalysisResult {
            caption: resp
                .caption_result
                .map(|c| Caption::new(c.text, c.confidence)),
            dense_captions: resp
                .dense_captions_result
                .map(|list| list.values)
                .unwrap_or_default()
                .into_iter()
                .map(|c| Caption::new(c.text, c.confidence))
                .collect(),
            tags: resp
                .tags_result
                .map(|list| list.values)
                .unwrap_or_default()
                .into_iter()
                .map(|t| Tag::new(t.name, t.confidence))
                .collect(),
            objects,
            model_version: resp.model_version,
            width: resp.metadata.as_ref().map(|m| m.width),
            height: resp.metadata.as_ref().map(|m| m.height),
        };
        analysis.dedup_tags();
        analysis
    }
}

#[async_trait]
impl VisionAnalyzer for AzureVisionClient {
    async fn analyze(&self, image_path: &Path) -> Result<AnalysisResult, VisionServiceError> {
        let start = Instant::now();

        let bytes =
            tokio::fs::read(image_path)
                .await
                .map_err(|e| VisionServiceError::ReadImage {
                    path: image_path.to_path_buf(),
                    source: e,
                })?;

        let gender_neutral = if self.gender_neutral_caption {
            "true"
        } else {
            "false"
        };

        let resp = self
            .client
            .post(self.analyze_url())
            .query(&[
                ("api-version", self.api_version.as_str()),
                ("features", self.features()),
                ("language", self.language.as_str()),
                ("model-version", self.model_version.as_str()),
                ("gender-neutral-caption", gender_neutral),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.api_key)
            .header("Content-Type", "application/octet-stream")
            .body(bytes)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| VisionServiceError::Request {
                path: image_path.to_path_buf(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(VisionServiceError::Http {
                path: image_path.to_path_buf(),
                status_code: status.as_u16(),
                body,
            });
        }

        let parsed: AnalyzeResponse =
            resp.json()
                .await
                .map_err(|e| VisionServiceError::InvalidResponse {
                    path: image_path.to_path_buf(),
                    message: e.to_string(),
                })?;

        let analysis = AnalysisResult::from(parsed);
        tracing::debug!(
            "Analyzed {:?} in {:?}: {} tags, {} objects",
            image_path,
            start.elapsed(),
            analysis.tags.len(),
            analysis.objects.len()
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_bytes, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ANALYZE_PATH: &str = "/computervision/imageanalysis:analyze";

    fn sample_response() -> serde_json::Value {
        serde_json::json!({
            "modelVersion": "2023-10-01",
            "captionResult": {"text": "a dog running on grass", "confidence": 0.87},
            "denseCaptionsResult": {"values": [
                {"text": "a dog running on grass", "confidence": 0.87,
                 "boundingBox": {"x": 0, "y": 0, "w": 640, "h": 480}},
                {"text": "a brown dog", "confidence": 0.81,
                 "boundingBox": {"x": 10, "y": 20, "w": 300, "h": 200}}
            ]},
            "tagsResult": {"values": [
                {"name": "dog", "confidence": 0.99},
                {"name": "grass", "confidence": 0.95},
                {"name": "dog", "confidence": 0.40}
            ]},
            "objectsResult": {"values": [
                {"boundingBox": {"x": 10, "y": 20, "w": 300, "h": 200},
                 "tags": [{"name": "dog", "confidence": 0.9}]},
                {"boundingBox": {"x": 1, "y": 1, "w": 5, "h": 5}, "tags": []}
            ]},
            "metadata": {"width": 640, "height": 480}
        })
    }

    fn client_for(server: &MockServer, language: &str) -> AzureVisionClient {
        let config = VisionConfig {
            endpoint: format!("{}/", server.uri()),
            api_key: "test-key".to_string(),
            language: language.to_string(),
            ..VisionConfig::default()
        };
        AzureVisionClient::new(&config, Duration::from_secs(5))
    }

    fn write_image(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
        path
    }

    #[tokio::test]
    async fn test_analyze_parses_all_features() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .and(header("Ocp-Apim-Subscription-Key", "test-key"))
            .and(header("Content-Type", "application/octet-stream"))
            .and(query_param("features", "caption,denseCaptions,tags,objects"))
            .and(query_param("api-version", "2024-02-01"))
            .and(body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0]))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = write_image(&dir, "dog.jpg");
        let analysis = client_for(&server, "en").analyze(&image).await.unwrap();

        assert_eq!(
            analysis.caption,
            Some(Caption::new("a dog running on grass", 0.87))
        );
        assert_eq!(analysis.dense_captions.len(), 2);
        assert_eq!(analysis.tag_names(), vec!["dog", "grass"]);
        assert_eq!(analysis.object_names(), vec!["dog"]);
        assert_eq!(
            analysis.objects[0].bounding_box,
            BoundingBox {
                x: 10,
                y: 20,
                width: 300,
                height: 200
            }
        );
        assert_eq!(analysis.model_version.as_deref(), Some("2023-10-01"));
        assert_eq!(analysis.width, Some(640));
    }

    #[tokio::test]
    async fn test_non_english_skips_caption_features() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .and(query_param("features", "tags,objects"))
            .and(query_param("language", "pt"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "modelVersion": "2023-10-01",
                "tagsResult": {"values": [{"name": "cachorro", "confidence": 0.98}]},
                "metadata": {"width": 10, "height": 10}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = write_image(&dir, "dog.jpg");
        let analysis = client_for(&server, "pt").analyze(&image).await.unwrap();

        assert!(analysis.caption.is_none());
        assert!(analysis.dense_captions.is_empty());
        assert_eq!(analysis.tag_names(), vec!["cachorro"]);
    }

    #[tokio::test]
    async fn test_auth_failure_keeps_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Access denied"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = write_image(&dir, "dog.jpg");
        let err = client_for(&server, "en").analyze(&image).await.unwrap_err();

        match err {
            VisionServiceError::Http {
                status_code, body, ..
            } => {
                assert_eq!(status_code, 401);
                assert!(body.contains("Access denied"));
            }
            other => panic!("Expected HTTP error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_garbage_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ANALYZE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let image = write_image(&dir, "dog.jpg");
        let err = client_for(&server, "en").analyze(&image).await.unwrap_err();
        assert!(matches!(err, VisionServiceError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_never_reaches_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_response()))
            .expect(0)
            .mount(&server)
            .await;

        let err = client_for(&server, "en")
            .analyze(Path::new("/nonexistent/ghost.jpg"))
            .await
            .unwrap_err();
        assert!(matches!(err, VisionServiceError::ReadImage { .. }));
    }
}
