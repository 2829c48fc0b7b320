//! Prompt templates and reply parsing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use adplace_models::Persona;
use regex_lite::Regex;
use serde_json::{json, Value};

/// Emotion chaptering request sent to the video-understanding service.
pub const EMOTION_CHAPTER_PROMPT: &str =
    "chapterize the video for emotion timeline and time stamp it based on the video";

/// Key frame request sent to the video-understanding service.
pub const KEY_FRAMES_PROMPT: &str = "What are the key frame timestamps of the video?";

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[a-zA-Z]*\s*\n?(.*?)```").unwrap());

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    match FENCED_BLOCK.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a model reply as JSON, tolerating code fences and leading prose.
pub fn parse_json_reply(text: &str) -> Option<Value> {
    let body = strip_code_fence(text);
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }
    let start = body.find('{')?;
    let end = body.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&body[start..=end]).ok()
}

/// Renders persona-specific analysis prompts.
#[derive(Debug, Clone)]
pub struct PersonaPromptBuilder {
    required_scores: Vec<String>,
}

impl PersonaPromptBuilder {
    pub fn new(required_scores: Vec<String>) -> Self {
        Self { required_scores }
    }

    pub fn required_scores(&self) -> &[String] {
        &self.required_scores
    }

    /// Full prompt: persona profile, analysis request and score object schema.
    pub fn render(&self, persona: &Persona) -> String {
        let tone = &persona.output_tone;
        let mut prompt = format!(
            r#"Analyze this video from the perspective of "{name}" - {motto}

Persona Profile:
- {summary}
- Evaluation Focus: {focus}
- Emotional Triggers: {triggers}
- Positive Biases: {positive}
- Negative Biases: {negative}
- Preferred Tone: {tone}

Please provide a detailed analysis covering:
1. How well this content aligns with this persona's interests and values
2. What emotional responses this content would likely trigger
3. Specific strengths and weaknesses from this persona's perspective
4. Recommendations for improvement to better appeal to this persona
5. Overall score (0-10) for persona alignment

Format your response in a clear, {tone} tone that matches this persona's communication style."#,
            name = persona.name,
            motto = persona.motto,
            summary = persona.summary,
            focus = persona.evaluation_focus.join(", "),
            triggers = persona.engagement_style.emotional_triggers.join(", "),
            positive = persona.biases.positive.join(", "),
            negative = persona.biases.negative.join(", "),
        );

        let fields = self
            .required_scores
            .iter()
            .map(|s| format!("    \"{}\": <number 0-10>", s))
            .collect::<Vec<_>>()
            .join(",\n");
        prompt.push_str(&format!(
            "\n\nReturn ONLY a single JSON object with this schema:\n{{\n  \"content_overview\": \"<one paragraph describing what happens in the video>\",\n  \"scores\": {{\n{}\n  }}\n}}",
            fields
        ));
        prompt
    }

    /// JSON schema for structured-output capable endpoints.
    pub fn response_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .required_scores
            .iter()
            .map(|s| (s.clone(), json!({"type": "number"})))
            .collect();
        json!({
            "type": "object",
            "properties": {
                "content_overview": {"type": "string"},
                "scores": {
                    "type": "object",
                    "properties": properties,
                    "required": self.required_scores,
                }
            },
            "required": ["content_overview", "scores"]
        })
    }
}

/// Parsed persona analysis reply.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonaReply {
    pub content_overview: String,
    pub scores: BTreeMap<String, f64>,
}

impl PersonaReply {
    /// Parse a reply. Text that is not a score object becomes the overview
    /// with no scores.
    pub fn parse(text: &str) -> Self {
        let Some(Value::Object(obj)) = parse_json_reply(text) else {
            return Self {
                content_overview: text.trim().to_string(),
                scores: BTreeMap::new(),
            };
        };

        let content_overview = obj
            .get("content_overview")
            .or_else(|| obj.get("summary"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let scores = obj
            .get("scores")
            .and_then(Value::as_object)
            .map(|scores| {
                scores
                    .iter()
                    .filter_map(|(k, v)| score_value(v).map(|n| (k.clone(), n)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            content_overview,
            scores,
        }
    }
}

fn score_value(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Ask for ad categories that suit the detected key frames.
pub fn ad_category_prompt(key_frames: &str) -> String {
    format!(
        "Given these key frame timestamps and descriptions of a video:\n\n{}\n\n\
         Identify the advertisement product categories that would fit naturally at each key frame. \
         Return ONLY a JSON object of the form \
         {{\"categories\": [{{\"timestamp\": \"HH:MM:SS\", \"category\": \"...\", \"reason\": \"...\"}}]}}.",
        key_frames
    )
}

/// Ask for an emotion timeline as CSV.
pub fn emotion_csv_prompt(chapters: &str) -> String {
    format!(
        "Convert this emotion chaptering of a video into a CSV emotion timeline:\n\n{}\n\n\
         Use the header `start_time,end_time,emotion,intensity` with times in seconds and \
         intensity between 0 and 1. Return ONLY the CSV.",
        chapters
    )
}

/// Ask whether a product fits any segment of the emotion timeline.
pub fn ad_match_prompt(product: &str, segments_csv: &str, categories: &str) -> String {
    format!(
        "would {} Products fit  any of the segments  {} and give the transition as well make sure it \
         matches with {}. Give the answer in a Answer in JSON format with keys and make sure nothing \
         is outside the dict",
        product, segments_csv, categories
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use adplace_models::{Biases, EngagementStyle};

    fn persona() -> Persona {
        Persona {
            name: "Die-hard Fan".to_string(),
            category: "sports".to_string(),
            motto: "Every play matters".to_string(),
            summary: "Follows every match live".to_string(),
            evaluation_focus: vec!["authenticity".to_string(), "energy".to_string()],
            engagement_style: EngagementStyle {
                emotional_triggers: vec!["last-minute goals".to_string()],
            },
            biases: Biases {
                positive: vec!["team pride".to_string()],
                negative: vec!["staged moments".to_string()],
            },
            output_tone: "enthusiastic".to_string(),
        }
    }

    fn builder() -> PersonaPromptBuilder {
        PersonaPromptBuilder::new(vec!["content_alignment".to_string(), "visual_appeal".to_string()])
    }

    #[test]
    fn test_render_includes_profile() {
        let prompt = builder().render(&persona());
        assert!(prompt.starts_with("Analyze this video from the perspective of \"Die-hard Fan\" - Every play matters"));
        assert!(prompt.contains("- Evaluation Focus: authenticity, energy"));
        assert!(prompt.contains("- Emotional Triggers: last-minute goals"));
        assert!(prompt.contains("- Negative Biases: staged moments"));
        assert!(prompt.contains("5. Overall score (0-10) for persona alignment"));
        assert!(prompt.contains("in a clear, enthusiastic tone"));
        assert!(prompt.contains("\"visual_appeal\": <number 0-10>"));
    }

    #[test]
    fn test_response_schema_lists_required_scores() {
        let schema = builder().response_schema();
        assert_eq!(
            schema["properties"]["scores"]["required"],
            json!(["content_alignment", "visual_appeal"])
        );
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fence("```\nplain\n```"), "plain");
        assert_eq!(strip_code_fence("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_reply_with_prose_and_string_scores() {
        let reply = PersonaReply::parse(
            "Here you go:\n{\"content_overview\": \"crowd cheers\", \"scores\": {\"visual_appeal\": \"7.5\", \"content_alignment\": 8}}",
        );
        assert_eq!(reply.content_overview, "crowd cheers");
        assert_eq!(reply.scores["visual_appeal"], 7.5);
        assert_eq!(reply.scores["content_alignment"], 8.0);
    }

    #[test]
    fn test_parse_plain_text_reply() {
        let reply = PersonaReply::parse("A tense final quarter with a late comeback.");
        assert_eq!(reply.content_overview, "A tense final quarter with a late comeback.");
        assert!(reply.scores.is_empty());
    }

    #[test]
    fn test_ad_match_prompt() {
        let prompt = ad_match_prompt("Volkswagen Ad", "0,10,joy,0.8", "automotive");
        assert!(prompt.starts_with("would Volkswagen Ad Products fit"));
        assert!(prompt.contains("0,10,joy,0.8"));
        assert!(prompt.ends_with("make sure nothing is outside the dict"));
    }
}
