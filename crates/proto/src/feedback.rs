//! Feedback request/outcome types exchanged between the tool dispatcher
//! and a feedback session.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ProtoError;

/// Unique identifier for a feedback session, used to correlate log lines.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Creates a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the raw session identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Page color theme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the browser's `prefers-color-scheme`.
    #[default]
    Auto,
    /// Force the light palette.
    Light,
    /// Force the dark palette.
    Dark,
}

impl Theme {
    /// Returns the lowercase theme name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Parses a user-supplied theme name, falling back to [`Theme::Auto`]
    /// when the value is absent or unrecognised.
    pub fn parse_or_auto(value: Option<&str>) -> Self {
        value
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = ProtoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Theme::Auto),
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ProtoError::InvalidTheme(other.to_string())),
        }
    }
}

/// A prompt waiting for a human decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRequest {
    /// Text shown to the reviewer.
    pub prompt: String,
    /// Presentation hint for the page.
    pub theme: Theme,
}

impl FeedbackRequest {
    /// Creates a request for `prompt` rendered with `theme`.
    pub fn new(prompt: impl Into<String>, theme: Theme) -> Self {
        Self {
            prompt: prompt.into(),
            theme,
        }
    }
}

/// An image pasted by the reviewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    /// Declared content type, always `image/*`.
    pub mime_type: String,
    /// Decoded image bytes.
    pub data: Vec<u8>,
}

impl ImageAttachment {
    /// Parses a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Result<Self, ProtoError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ProtoError::InvalidImage("missing data: scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| ProtoError::InvalidImage("missing payload separator".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| ProtoError::InvalidImage("payload is not base64".to_string()))?;
        if !mime_type.starts_with("image/") || mime_type.len() == "image/".len() {
            return Err(ProtoError::InvalidImage(format!(
                "unsupported content type: {mime_type}"
            )));
        }
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| ProtoError::InvalidImage(e.to_string()))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// Returns the payload as standard padded base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

/// Terminal classification of a feedback session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeKind {
    /// Confirmed with no instructions.
    Approved,
    /// Confirmed with instructions.
    Adjusted,
    /// Explicitly cancelled.
    Cancelled,
    /// The reviewer wants no further confirmation calls.
    ConversationEnded,
    /// Nobody answered before the deadline.
    TimedOut,
}

impl std::fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutcomeKind::Approved => write!(f, "approved"),
            OutcomeKind::Adjusted => write!(f, "adjusted"),
            OutcomeKind::Cancelled => write!(f, "cancelled"),
            OutcomeKind::ConversationEnded => write!(f, "conversation_ended"),
            OutcomeKind::TimedOut => write!(f, "timed_out"),
        }
    }
}

/// The single result a feedback session resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackOutcome {
    pub kind: OutcomeKind,
    /// Trimmed instruction text; empty unless `kind` is `Adjusted`.
    pub text: String,
    pub images: Vec<ImageAttachment>,
}

impl FeedbackOutcome {
    /// Confirmation without instructions (images may still be attached).
    pub fn approved(images: Vec<ImageAttachment>) -> Self {
        Self {
            kind: OutcomeKind::Approved,
            text: String::new(),
            images,
        }
    }

    /// Confirmation carrying adjustment instructions.
    pub fn adjusted(text: impl Into<String>, images: Vec<ImageAttachment>) -> Self {
        Self {
            kind: OutcomeKind::Adjusted,
            text: text.into(),
            images,
        }
    }

    pub fn cancelled() -> Self {
        Self::bare(OutcomeKind::Cancelled)
    }

    pub fn conversation_ended() -> Self {
        Self::bare(OutcomeKind::ConversationEnded)
    }

    pub fn timed_out() -> Self {
        Self::bare(OutcomeKind::TimedOut)
    }

    fn bare(kind: OutcomeKind) -> Self {
        Self {
            kind,
            text: String::new(),
            images: Vec::new(),
        }
    }

    /// `true` for outcomes the caller should treat as "no objection".
    pub fn is_approval(&self) -> bool {
        matches!(self.kind, OutcomeKind::Approved | OutcomeKind::TimedOut)
    }
}

/// Terminal action chosen on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitAction {
    Confirm,
    Cancel,
    End,
}

/// JSON body of `POST /submit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPayload {
    pub action: SubmitAction,
    /// Non-string values are treated as absent.
    #[serde(default, deserialize_with = "string_or_none")]
    pub text: Option<String>,
    /// Data URLs of pasted images. Kept as raw JSON so one bad entry
    /// cannot reject the whole submission.
    #[serde(default, deserialize_with = "list_or_empty")]
    pub images: Vec<serde_json::Value>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}

fn list_or_empty<'de, D>(deserializer: D) -> Result<Vec<serde_json::Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => Vec::new(),
    })
}

impl SubmitPayload {
    /// Classifies the submission. Images that fail to decode are dropped.
    pub fn into_outcome(self) -> FeedbackOutcome {
        match self.action {
            SubmitAction::Cancel => FeedbackOutcome::cancelled(),
            SubmitAction::End => FeedbackOutcome::conversation_ended(),
            SubmitAction::Confirm => {
                let images = self
                    .images
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .filter_map(|url| ImageAttachment::from_data_url(url).ok())
                    .collect();
                let text = self.text.as_deref().unwrap_or_default().trim();
                if text.is_empty() {
                    FeedbackOutcome::approved(images)
                } else {
                    FeedbackOutcome::adjusted(text, images)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: serde_json::Value) -> SubmitPayload {
        serde_json::from_value(json).expect("valid payload")
    }

    #[test]
    fn theme_parses_known_names_case_insensitively() {
        assert_eq!("dark".parse::<Theme>().unwrap(), Theme::Dark);
        assert_eq!(" Light ".parse::<Theme>().unwrap(), Theme::Light);
        assert_eq!("AUTO".parse::<Theme>().unwrap(), Theme::Auto);
    }

    #[test]
    fn theme_falls_back_to_auto() {
        assert_eq!(Theme::parse_or_auto(None), Theme::Auto);
        assert_eq!(Theme::parse_or_auto(Some("solarized")), Theme::Auto);
        assert_eq!(Theme::parse_or_auto(Some("dark")), Theme::Dark);
    }

    #[test]
    fn png_data_url_decodes_and_reencodes_unchanged() {
        let image = ImageAttachment::from_data_url("data:image/png;base64,Zm9v").unwrap();
        assert_eq!(image.mime_type, "image/png");
        assert_eq!(image.data, b"foo");
        assert_eq!(image.to_base64(), "Zm9v");
    }

    #[test]
    fn data_url_rejects_malformed_entries() {
        for bad in [
            "Zm9v",
            "data:image/png;base64",
            "data:image/png,Zm9v",
            "data:text/plain;base64,Zm9v",
            "data:image/;base64,Zm9v",
            "data:image/png;base64,@@@",
        ] {
            assert!(
                ImageAttachment::from_data_url(bad).is_err(),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn confirm_with_blank_text_is_approved() {
        let outcome = payload(serde_json::json!({"action":"confirm","text":"   ","images":[]}))
            .into_outcome();
        assert_eq!(outcome.kind, OutcomeKind::Approved);
        assert!(outcome.text.is_empty());
        assert!(outcome.is_approval());
    }

    #[test]
    fn confirm_with_text_is_adjusted_and_trimmed() {
        let outcome = payload(serde_json::json!({
            "action": "confirm",
            "text": "  use snake_case\n",
            "images": ["data:image/png;base64,Zm9v", "garbage"]
        }))
        .into_outcome();
        assert_eq!(outcome.kind, OutcomeKind::Adjusted);
        assert_eq!(outcome.text, "use snake_case");
        assert_eq!(outcome.images.len(), 1);
        assert!(!outcome.is_approval());
    }

    #[test]
    fn cancel_and_end_ignore_text_and_images() {
        let cancelled = payload(serde_json::json!({
            "action": "cancel",
            "text": "nope",
            "images": ["data:image/png;base64,Zm9v"]
        }))
        .into_outcome();
        assert_eq!(cancelled, FeedbackOutcome::cancelled());

        let ended = payload(serde_json::json!({"action":"end"})).into_outcome();
        assert_eq!(ended, FeedbackOutcome::conversation_ended());
    }

    #[test]
    fn non_string_fields_are_ignored_not_fatal() {
        let outcome = payload(serde_json::json!({
            "action": "confirm",
            "text": "use snake_case",
            "images": ["data:image/png;base64,Zm9v", 42, null, {"url": "x"}]
        }))
        .into_outcome();
        assert_eq!(outcome.kind, OutcomeKind::Adjusted);
        assert_eq!(outcome.text, "use snake_case");
        assert_eq!(outcome.images.len(), 1);

        let outcome = payload(serde_json::json!({"action":"confirm","text":null,"images":null}))
            .into_outcome();
        assert_eq!(outcome, FeedbackOutcome::approved(Vec::new()));

        let outcome = payload(serde_json::json!({"action":"confirm","text":7,"images":"x"}))
            .into_outcome();
        assert_eq!(outcome, FeedbackOutcome::approved(Vec::new()));
    }

    #[test]
    fn unknown_action_fails_to_parse() {
        let parsed = serde_json::from_str::<SubmitPayload>(r#"{"action":"maybe"}"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn timed_out_counts_as_approval() {
        let outcome = FeedbackOutcome::timed_out();
        assert!(outcome.is_approval());
        assert!(outcome.text.is_empty());
        assert!(outcome.images.is_empty());
        assert_eq!(outcome.kind.to_string(), "timed_out");
    }
}
