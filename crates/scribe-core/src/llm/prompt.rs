//! Prompt construction from vision output.

use crate::types::AnalysisResult;

const SYSTEM_PROMPT: &str = "You are an assistant specialized in analyzing and describing images.";

const CLOSING_LINE: &str = "Give a structured and complete answer.";

/// A two-message chat prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    /// Build the description prompt for one image.
    ///
    /// Deterministic: the same analysis always yields the same prompt text.
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let (caption, confidence) = match &analysis.caption {
            Some(c) => (c.text.as_str(), c.confidence),
            None => ("", 0.0),
        };
        let dense: Vec<&str> = analysis
            .dense_captions
            .iter()
            .map(|c| c.text.as_str())
            .collect();

        let user = format!(
            "You are an assistant specialized in describing images in a detailed, \
             contextualized way.\n\
             \n\
             Analyze the following data extracted from an image and provide:\n\
             1. A detailed description of the image\n\
             2. A possible context for the image\n\
             3. Points of interest in the image\n\
             4. Possible uses or applications for this image\n\
             \n\
             Analysis data:\n\
             - Main caption: {caption}\n\
             - Caption confidence: {confidence:.2}\n\
             - Dense captions: {dense}\n\
             - Tags: {tags}\n\
             - Detected objects: {objects}\n\
             \n\
             {CLOSING_LINE}",
            dense = list_or_none(&dense),
            tags = list_or_none(&analysis.tag_names()),
            objects = list_or_none(&analysis.object_names()),
        );

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user,
        }
    }

    /// Ask for the answer in `language` (a vision language code such as "pt").
    pub fn answer_in(mut self, language: &str) -> Self {
        let language = language.trim();
        if language.is_empty() {
            return self;
        }
        self.user.push_str(&format!(
            "\nWrite your answer in {}.",
            language_name(language)
        ));
        self
    }
}

/// English name for the common analysis language codes; other codes pass through.
fn language_name(code: &str) -> String {
    let name = match code.to_ascii_lowercase().as_str() {
        "en" => "English",
        "pt" => "Portuguese",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "nl" => "Dutch",
        "ja" => "Japanese",
        "zh" => "Chinese",
        _ => return format!("the language with code \"{code}\""),
    };
    name.to_string()
}

fn list_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}
