use serde::{Deserialize, Serialize};

/// Fixed set of intake channels. Serialized snake_case to match the dataset.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    WebChat,
    WebForm,
    Sms,
    Whatsapp,
    PhoneVoicemail,
    FacebookMessenger,
    InstagramDm,
}

impl Channel {
    pub fn label(&self) -> &'static str {
        match self {
            Channel::Email => "Email",
            Channel::WebChat => "Web Chat",
            Channel::WebForm => "Web Form",
            Channel::Sms => "SMS",
            Channel::Whatsapp => "WhatsApp",
            Channel::PhoneVoicemail => "Voicemail",
            Channel::FacebookMessenger => "Messenger",
            Channel::InstagramDm => "Instagram DM",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Dataset {
    pub messages: Vec<Message>,
}

/// A single inbound inquiry. Loaded once at startup, never mutated afterwards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Message {
    pub message_id: String,
    pub channel: Channel,
    pub received_at_utc: String,
    pub message_content: MessageContent,
    pub triage: Triage,
    pub draft_response: DraftResponse,
    #[serde(default)]
    pub compliance: Option<Compliance>,
}

impl Message {
    pub fn privacy_risk(&self) -> bool {
        self.compliance
            .as_ref()
            .is_some_and(|c| c.possible_ferpa_privacy_risk)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MessageContent {
    pub text: String,
    #[serde(default = "default_sentiment")]
    pub sentiment: String,
    #[serde(default)]
    pub urgency_signals: Vec<String>,
    #[serde(default)]
    pub normalized_summary: Option<String>,
    #[serde(default = "default_language")]
    pub language_detected: String,
}

impl MessageContent {
    pub fn has_urgency_signal(&self, signal: &str) -> bool {
        self.urgency_signals.iter().any(|s| s == signal)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Triage {
    pub primary_intent: String,
    #[serde(default)]
    pub category: Option<String>,
    pub queue: String,
    #[serde(default)]
    pub priority: Priority,
    pub requires_human_handoff: bool,
    #[serde(default)]
    pub sla_target_minutes: Option<u32>,
    #[serde(default)]
    pub high_intent_score: u32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DraftResponse {
    pub body: String,
    #[serde(default)]
    pub metadata: ResponseMetadata,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ResponseMetadata {
    #[serde(default)]
    pub confidence: Option<Confidence>,
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub human_review_required: bool,
    #[serde(default)]
    pub guardrails: Vec<String>,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

impl ResponseMetadata {
    /// Confidence score with the dataset's storytelling fallback.
    pub fn confidence_score(&self) -> f64 {
        self.confidence.as_ref().map(|c| c.score).unwrap_or(0.6)
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Confidence {
    pub score: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Compliance {
    #[serde(default)]
    pub possible_ferpa_privacy_risk: bool,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Citation {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source_id: Option<String>,
}

fn default_sentiment() -> String {
    "neutral".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_round_trips_snake_case() {
        let json = "\"phone_voicemail\"";
        let channel: Channel = serde_json::from_str(json).unwrap();
        assert_eq!(channel, Channel::PhoneVoicemail);
        assert_eq!(serde_json::to_string(&channel).unwrap(), json);
    }

    #[test]
    fn optional_content_fields_default() {
        let json = r#"{ "text": "hello" }"#;
        let content: MessageContent = serde_json::from_str(json).unwrap();
        assert_eq!(content.sentiment, "neutral");
        assert_eq!(content.language_detected, "en");
        assert!(content.urgency_signals.is_empty());
    }

    #[test]
    fn confidence_score_falls_back() {
        let meta = ResponseMetadata::default();
        assert_eq!(meta.confidence_score(), 0.6);
    }

    #[test]
    fn privacy_risk_reads_the_compliance_block() {
        let compliance: Compliance =
            serde_json::from_str(r#"{ "possible_ferpa_privacy_risk": true }"#).unwrap();
        assert!(compliance.possible_ferpa_privacy_risk);
        let empty: Compliance = serde_json::from_str("{}").unwrap();
        assert!(!empty.possible_ferpa_privacy_risk);
    }

    #[test]
    fn priority_defaults_to_normal() {
        let json = r#"{
            "primary_intent": "program_question",
            "queue": "Admissions",
            "requires_human_handoff": false
        }"#;
        let triage: Triage = serde_json::from_str(json).unwrap();
        assert_eq!(triage.priority, Priority::Normal);
        assert_eq!(triage.high_intent_score, 0);
    }
}
