//! Ads as returned by the backend, and chat messages that may embed them.
use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Display variant of an ad.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdFormat {
    #[serde(rename = "action_card")]
    #[display(fmt = "action_card")]
    ActionCard,
    #[serde(rename = "lead_gen")]
    #[display(fmt = "lead_gen")]
    LeadGen,
    #[serde(rename = "static")]
    #[display(fmt = "static")]
    StaticAd,
    #[serde(rename = "followup")]
    #[display(fmt = "followup")]
    Followup,
}

/// Configuration of a lead generation (email capture) ad. Missing fields fall back to generic
/// copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadGenConfig {
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    #[serde(default = "default_submit_text")]
    pub submit_text: String,
    #[serde(default = "default_success_message")]
    pub success_message: String,
}

fn default_placeholder() -> String {
    "Enter your email".to_owned()
}

fn default_submit_text() -> String {
    "Submit".to_owned()
}

fn default_success_message() -> String {
    "Thanks! We'll be in touch.".to_owned()
}

impl Default for LeadGenConfig {
    fn default() -> Self {
        LeadGenConfig {
            placeholder: default_placeholder(),
            submit_text: default_submit_text(),
            success_message: default_success_message(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticAdConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// A follow-up question with selectable answers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    /// In display order. Ids are unique within the ad.
    #[serde(default)]
    pub options: Vec<FollowupOption>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupOption {
    pub id: String,
    pub label: String,
    pub value: String,
}

/// Format-specific configuration. The variant is the ad's format, so a config can never disagree
/// with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatConfig {
    ActionCard,
    LeadGen(LeadGenConfig),
    StaticAd(StaticAdConfig),
    Followup(FollowupConfig),
}

impl FormatConfig {
    pub fn format(&self) -> AdFormat {
        match self {
            FormatConfig::ActionCard => AdFormat::ActionCard,
            FormatConfig::LeadGen(_) => AdFormat::LeadGen,
            FormatConfig::StaticAd(_) => AdFormat::StaticAd,
            FormatConfig::Followup(_) => AdFormat::Followup,
        }
    }
}

/// A fully-formed ad returned by the backend, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ResolvedAdWire", into = "ResolvedAdWire")]
pub struct ResolvedAd {
    pub id: String,
    pub advertiser_id: String,
    pub advertiser_name: String,
    pub title: String,
    pub description: String,
    pub cta_text: String,
    pub cta_url: String,
    pub config: FormatConfig,
}

impl ResolvedAd {
    pub fn format(&self) -> AdFormat {
        self.config.format()
    }

    /// Present only for [`AdFormat::LeadGen`] ads.
    pub fn lead_gen_config(&self) -> Option<&LeadGenConfig> {
        match &self.config {
            FormatConfig::LeadGen(config) => Some(config),
            _ => None,
        }
    }

    /// Present only for [`AdFormat::StaticAd`] ads.
    pub fn static_ad_config(&self) -> Option<&StaticAdConfig> {
        match &self.config {
            FormatConfig::StaticAd(config) => Some(config),
            _ => None,
        }
    }

    /// Present only for [`AdFormat::Followup`] ads.
    pub fn followup_config(&self) -> Option<&FollowupConfig> {
        match &self.config {
            FormatConfig::Followup(config) => Some(config),
            _ => None,
        }
    }
}

/// Wire shape of [`ResolvedAd`]: a `format` tag plus optional per-format objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvedAdWire {
    id: String,
    advertiser_id: String,
    advertiser_name: String,
    title: String,
    #[serde(default)]
    description: String,
    cta_text: String,
    cta_url: String,
    format: AdFormat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lead_gen: Option<LeadGenConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    static_ad: Option<StaticAdConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    followup: Option<FollowupConfig>,
}

impl TryFrom<ResolvedAdWire> for ResolvedAd {
    type Error = String;

    fn try_from(wire: ResolvedAdWire) -> Result<Self, Self::Error> {
        // Objects for other formats are ignored.
        let config = match wire.format {
            AdFormat::ActionCard => FormatConfig::ActionCard,
            AdFormat::LeadGen => FormatConfig::LeadGen(wire.lead_gen.unwrap_or_default()),
            AdFormat::StaticAd => FormatConfig::StaticAd(wire.static_ad.unwrap_or_default()),
            AdFormat::Followup => {
                let followup = wire.followup.unwrap_or_default();
                if let Some(id) = duplicate_option_id(&followup.options) {
                    return Err(format!(
                        "duplicate followup option id {:?} in ad {:?}",
                        id, wire.id
                    ));
                }
                FormatConfig::Followup(followup)
            }
        };

        Ok(ResolvedAd {
            id: wire.id,
            advertiser_id: wire.advertiser_id,
            advertiser_name: wire.advertiser_name,
            title: wire.title,
            description: wire.description,
            cta_text: wire.cta_text,
            cta_url: wire.cta_url,
            config,
        })
    }
}

fn duplicate_option_id(options: &[FollowupOption]) -> Option<&str> {
    let mut seen = HashSet::new();
    options
        .iter()
        .map(|option| option.id.as_str())
        .find(|id| !seen.insert(*id))
}

impl From<ResolvedAd> for ResolvedAdWire {
    fn from(ad: ResolvedAd) -> Self {
        let format = ad.format();
        let (lead_gen, static_ad, followup) = match ad.config {
            FormatConfig::ActionCard => (None, None, None),
            FormatConfig::LeadGen(config) => (Some(config), None, None),
            FormatConfig::StaticAd(config) => (None, Some(config), None),
            FormatConfig::Followup(config) => (None, None, Some(config)),
        };
        ResolvedAdWire {
            id: ad.id,
            advertiser_id: ad.advertiser_id,
            advertiser_name: ad.advertiser_name,
            title: ad.title,
            description: ad.description,
            cta_text: ad.cta_text,
            cta_url: ad.cta_url,
            format,
            lead_gen,
            static_ad,
            followup,
        }
    }
}

/// A message in a chat transcript: user or assistant text, or an embedded ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ChatMessage {
    User {
        id: String,
        text: String,
    },
    Ai {
        id: String,
        text: String,
    },
    Ad {
        id: String,
        ad: ResolvedAd,
        #[serde(default)]
        request_id: Option<String>,
    },
}

impl ChatMessage {
    pub fn id(&self) -> &str {
        match self {
            ChatMessage::User { id, .. } | ChatMessage::Ai { id, .. } | ChatMessage::Ad { id, .. } => {
                id.as_str()
            }
        }
    }

    /// Text of a user or assistant message.
    pub fn text(&self) -> Option<&str> {
        match self {
            ChatMessage::User { text, .. } | ChatMessage::Ai { text, .. } => Some(text.as_str()),
            ChatMessage::Ad { .. } => None,
        }
    }

    pub fn ad(&self) -> Option<&ResolvedAd> {
        match self {
            ChatMessage::Ad { ad, .. } => Some(ad),
            _ => None,
        }
    }
}
