//! JSON bodies exchanged with the ads backend.
use derive_more::Display;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::ad::{AdFormat, ResolvedAd};

/// Caller input for an ad request.
///
/// ```
/// # use chat_ads::{AdFormat, AdRequest};
/// let request = AdRequest::new("conversation-1", "message-7", "learning english vocabulary")
///     .language("en")
///     .formats([AdFormat::ActionCard, AdFormat::LeadGen]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdRequest {
    pub conversation_id: String,
    pub message_id: String,
    pub context_text: String,
    pub language: Option<String>,
    pub user_id: Option<String>,
    /// Empty means every format is eligible.
    pub formats: Vec<AdFormat>,
}

impl AdRequest {
    pub fn new(
        conversation_id: impl Into<String>,
        message_id: impl Into<String>,
        context_text: impl Into<String>,
    ) -> Self {
        AdRequest {
            conversation_id: conversation_id.into(),
            message_id: message_id.into(),
            context_text: context_text.into(),
            language: None,
            user_id: None,
            formats: Vec::new(),
        }
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Restrict the request to the given formats, in order of preference.
    pub fn formats(mut self, formats: impl IntoIterator<Item = AdFormat>) -> Self {
        self.formats = formats.into_iter().collect();
        self
    }
}

/// Body of `POST {baseUrl}/requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub app_id: String,
    pub conversation_id: String,
    pub message_id: String,
    pub context_text: String,
    pub language: Option<String>,
    pub user_id: Option<String>,
    pub sdk_version: Version,
    pub formats: Option<Vec<AdFormat>>,
}

impl RequestPayload {
    pub fn new(app_id: &str, sdk_version: &Version, request: &AdRequest) -> Self {
        RequestPayload {
            app_id: app_id.to_owned(),
            conversation_id: request.conversation_id.clone(),
            message_id: request.message_id.clone(),
            context_text: request.context_text.clone(),
            language: request.language.clone(),
            user_id: request.user_id.clone(),
            sdk_version: sdk_version.clone(),
            formats: (!request.formats.is_empty()).then(|| request.formats.clone()),
        }
    }
}

/// Response body of `POST {baseUrl}/requests`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub ok: bool,
    #[serde(default)]
    pub ad: Option<ResolvedAd>,
    #[serde(default)]
    pub request_id: Option<String>,
}

/// Outcome of a successful ad request. `ad == None` means no ad matched the context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdResult {
    pub ad: Option<ResolvedAd>,
    pub request_id: Option<String>,
}

impl From<AdResponse> for AdResult {
    fn from(response: AdResponse) -> Self {
        AdResult {
            ad: response.ad,
            request_id: response.request_id,
        }
    }
}

/// Engagement event type, as sent in the `type` field.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    #[display(fmt = "impression")]
    Impression,
    #[display(fmt = "click")]
    Click,
    #[display(fmt = "submit")]
    Submit,
    #[display(fmt = "optionTap")]
    OptionTap,
}

/// Event type together with the fields only that type carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    Impression,
    Click,
    Submit { submitted_email: String },
    OptionTap { option_id: String },
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::Impression => EventType::Impression,
            EventKind::Click => EventType::Click,
            EventKind::Submit { .. } => EventType::Submit,
            EventKind::OptionTap { .. } => EventType::OptionTap,
        }
    }
}

/// Body of `POST {baseUrl}/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(flatten)]
    pub kind: EventKind,
    pub ad_id: String,
    pub advertiser_id: String,
    pub request_id: String,
    pub app_id: String,
    pub conversation_id: Option<String>,
    pub user_id: Option<String>,
}

impl EventPayload {
    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }
}

#[cfg(test)]
mod tests {
    use semver::Version;
    use serde_json::json;

    use super::{AdRequest, AdResponse, EventKind, EventPayload, EventType, RequestPayload};
    use crate::AdFormat;

    fn event(kind: EventKind) -> EventPayload {
        EventPayload {
            kind,
            ad_id: "ad-1".to_owned(),
            advertiser_id: "adv-1".to_owned(),
            request_id: "r1".to_owned(),
            app_id: "app-1".to_owned(),
            conversation_id: None,
            user_id: Some("u1".to_owned()),
        }
    }

    #[test]
    fn request_payload_wire_shape() {
        let request = AdRequest::new("c1", "m1", "learning english vocabulary")
            .formats([AdFormat::LeadGen, AdFormat::StaticAd]);
        let payload = RequestPayload::new("app-1", &Version::new(1, 2, 3), &request);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "appId": "app-1",
                "conversationId": "c1",
                "messageId": "m1",
                "contextText": "learning english vocabulary",
                "language": null,
                "userId": null,
                "sdkVersion": "1.2.3",
                "formats": ["lead_gen", "static"],
            })
        );
    }

    #[test]
    fn empty_formats_are_sent_as_null() {
        let request = AdRequest::new("c1", "m1", "text").formats([]);
        let payload = RequestPayload::new("app-1", &Version::new(1, 0, 0), &request);
        assert_eq!(payload.formats, None);
    }

    #[test]
    fn response_with_null_ad() {
        let response: AdResponse =
            serde_json::from_value(json!({ "ok": true, "ad": null, "requestId": "r1" })).unwrap();
        assert_eq!(response.ad, None);
        assert_eq!(response.request_id.as_deref(), Some("r1"));
    }

    #[test]
    fn response_missing_ok_fails() {
        let result = serde_json::from_value::<AdResponse>(json!({ "ad": null }));
        assert!(result.is_err());
    }

    #[test]
    fn impression_has_no_conditional_fields() {
        let value = serde_json::to_value(event(EventKind::Impression)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "impression",
                "adId": "ad-1",
                "advertiserId": "adv-1",
                "requestId": "r1",
                "appId": "app-1",
                "conversationId": null,
                "userId": "u1",
            })
        );
    }

    #[test]
    fn submit_carries_email_only() {
        let value = serde_json::to_value(event(EventKind::Submit {
            submitted_email: "a@b.c".to_owned(),
        }))
        .unwrap();
        assert_eq!(value["type"], "submit");
        assert_eq!(value["submittedEmail"], "a@b.c");
        assert!(value.get("optionId").is_none());
    }

    #[test]
    fn option_tap_carries_option_id_only() {
        let payload = event(EventKind::OptionTap {
            option_id: "o2".to_owned(),
        });
        assert_eq!(payload.event_type(), EventType::OptionTap);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["type"], "optionTap");
        assert_eq!(value["optionId"], "o2");
        assert!(value.get("submittedEmail").is_none());
    }

    #[test]
    fn event_payload_decodes_from_wire() {
        let payload: EventPayload = serde_json::from_value(json!({
            "type": "click",
            "adId": "ad-1",
            "advertiserId": "adv-1",
            "requestId": "unknown",
            "appId": "app-1",
            "conversationId": "c1",
            "userId": null,
        }))
        .unwrap();
        assert_eq!(payload.kind, EventKind::Click);
        assert_eq!(payload.conversation_id.as_deref(), Some("c1"));
    }
}
