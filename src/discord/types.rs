use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The `type` field of an incoming interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionType {
    Ping = 1,
    ApplicationCommand = 2,
    MessageComponent = 3,
    ApplicationCommandAutocomplete = 4,
    ModalSubmit = 5,
}

impl InteractionType {
    pub fn from_u64(value: u64) -> Option<Self> {
        match value {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            3 => Some(Self::MessageComponent),
            4 => Some(Self::ApplicationCommandAutocomplete),
            5 => Some(Self::ModalSubmit),
            _ => None,
        }
    }

    /// Reads the discriminator of a decoded payload.
    pub fn of(payload: &Value) -> Option<Self> {
        discriminator(payload).and_then(Self::from_u64)
    }
}

/// The `type` field of an interaction response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum InteractionResponseType {
    Pong = 1,
    ChannelMessageWithSource = 4,
    DeferredChannelMessageWithSource = 5,
    DeferredUpdateMessage = 6,
    UpdateMessage = 7,
    ApplicationCommandAutocompleteResult = 8,
    Modal = 9,
}

pub struct InteractionResponseFlags;

impl InteractionResponseFlags {
    /// Only the invoking user sees the message.
    pub const EPHEMERAL: u32 = 1 << 6;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseData {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u32>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: InteractionResponseType::Pong as u8,
            data: None,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: InteractionResponseType::ChannelMessageWithSource as u8,
            data: Some(ResponseData {
                content: content.into(),
                flags: None,
            }),
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            kind: InteractionResponseType::ChannelMessageWithSource as u8,
            data: Some(ResponseData {
                content: content.into(),
                flags: Some(InteractionResponseFlags::EPHEMERAL),
            }),
        }
    }
}

/// The `type` field of a webhook event delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WebhookType {
    Ping = 0,
    Event = 1,
}

impl WebhookType {
    pub fn of(payload: &Value) -> Option<Self> {
        match discriminator(payload)? {
            0 => Some(Self::Ping),
            1 => Some(Self::Event),
            _ => None,
        }
    }
}

/// Events an app can subscribe to over webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebhookEventType {
    ApplicationAuthorized,
    ApplicationDeauthorized,
    EntitlementCreate,
    QuestUserEnrollment,
    LobbyMessageCreate,
    LobbyMessageUpdate,
    LobbyMessageDelete,
    GameDirectMessageCreate,
    GameDirectMessageUpdate,
    GameDirectMessageDelete,
}

impl WebhookEventType {
    /// Reads `event.type` of a decoded webhook payload.
    pub fn of(payload: &Value) -> Option<Self> {
        let kind = payload.get("event")?.get("type")?.clone();
        serde_json::from_value(kind).ok()
    }
}

/// Integral numbers only, whether written as `1` or `1.0`.
fn discriminator(payload: &Value) -> Option<u64> {
    let kind = payload.get("type")?;
    kind.as_u64().or_else(|| {
        kind.as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u8::MAX as f64)
            .map(|f| f as u64)
    })
}
