use serde::{Deserialize, Serialize};

use crate::capabilities::{HttpResult, TimerOutput, ViewportNotification};
use crate::config::CoreConfig;
use crate::gallery::CardHandle;
use crate::item::DatasetItemId;
use crate::settings::SettingsField;

// --- Event enum: large variants boxed ---

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    /// Replace the tunables. Invalid configurations are rejected and the
    /// previous one stays in force.
    Configured {
        config: Box<CoreConfig>,
    },

    // Gallery cards
    CardMounted {
        item: DatasetItemId,
        alt: String,
        overlay: Option<String>,
    },
    CardUnmounted {
        card: CardHandle,
    },
    CaptionEdited {
        card: CardHandle,
        text: String,
    },
    /// The shell finished decoding the card's image.
    ImageDecoded {
        card: CardHandle,
    },
    ImageFailed {
        card: CardHandle,
        reason: String,
    },

    // Settings
    SettingsOpened,
    SettingsClosed,
    SettingsFieldChanged {
        field: SettingsField,
        value: String,
    },
    SettingsSubmitted,

    // Capability responses
    ViewportNotified {
        card: CardHandle,
        notification: ViewportNotification,
    },
    CaptionFetched {
        card: CardHandle,
        request_id: String,
        result: Box<HttpResult>,
    },
    SettingsLoaded {
        session: u64,
        request_id: String,
        result: Box<HttpResult>,
    },
    SettingsSaved {
        session: u64,
        request_id: String,
        result: Box<HttpResult>,
    },
    StatusTimerElapsed {
        session: u64,
        ticket: u64,
        output: TimerOutput,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Configured { .. } => "configured",
            Event::CardMounted { .. } => "card_mounted",
            Event::CardUnmounted { .. } => "card_unmounted",
            Event::CaptionEdited { .. } => "caption_edited",
            Event::ImageDecoded { .. } => "image_decoded",
            Event::ImageFailed { .. } => "image_failed",
            Event::SettingsOpened => "settings_opened",
            Event::SettingsClosed => "settings_closed",
            Event::SettingsFieldChanged { .. } => "settings_field_changed",
            Event::SettingsSubmitted => "settings_submitted",
            Event::ViewportNotified { .. } => "viewport_notified",
            Event::CaptionFetched { .. } => "caption_fetched",
            Event::SettingsLoaded { .. } => "settings_loaded",
            Event::SettingsSaved { .. } => "settings_saved",
            Event::StatusTimerElapsed { .. } => "status_timer_elapsed",
        }
    }

    /// The card a card-scoped event is addressed to.
    pub fn card(&self) -> Option<CardHandle> {
        match self {
            Event::CardUnmounted { card }
            | Event::CaptionEdited { card, .. }
            | Event::ImageDecoded { card }
            | Event::ImageFailed { card, .. }
            | Event::ViewportNotified { card, .. }
            | Event::CaptionFetched { card, .. } => Some(*card),
            _ => None,
        }
    }
}
