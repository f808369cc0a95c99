//! View models handed to the shell. Everything here is derived from
//! [`crate::Model`] on demand and never stored.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::gallery::{CardHandle, MountedCard};
use crate::settings::{InputKind, LoadState, SaveStatus, SettingsField, SettingsPanel};

/// Duration of the image fade-in once it has decoded.
pub const IMAGE_FADE_MS: u32 = 300;
/// Row hint for the caption editor.
pub const CAPTION_EDITOR_ROWS: u32 = 3;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ViewModel {
    pub cards: Vec<CardView>,
    pub settings: Option<SettingsView>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CardView {
    pub card: CardHandle,
    pub alt: String,
    /// `None` until the card has been on screen. The placeholder box keeps
    /// its layout until then.
    pub image: Option<ImageView>,
    pub overlay: Option<String>,
    pub caption: Option<CaptionEditor>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ImageView {
    pub src: String,
    pub revealed: bool,
    pub opacity: f32,
    pub fade_ms: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CaptionEditor {
    pub text: String,
    pub rows: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SettingsView {
    pub loading: bool,
    pub fields: Vec<SettingsFieldView>,
    pub submit_label: String,
    pub submit_disabled: bool,
    pub status_message: Option<String>,
    pub status_is_error: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SettingsFieldView {
    pub field: SettingsField,
    pub key: String,
    pub label: String,
    pub help: String,
    pub warning: Option<String>,
    pub placeholder: String,
    pub input_kind: InputKind,
    pub value: String,
}

impl CardView {
    /// `api_base` is the configured backend origin; without one the image
    /// source stays a rooted path on the shell's own origin.
    pub(crate) fn build(card: CardHandle, mounted: &MountedCard, api_base: Option<&Url>) -> Self {
        let state = &mounted.state;

        let image = state.is_visible().then(|| {
            let revealed = state.image_loaded();
            let path = mounted.item.image_path();
            let src = match api_base.map(|base| base.join(&path)) {
                Some(Ok(url)) => url.into(),
                _ => path,
            };
            ImageView {
                src,
                revealed,
                opacity: if revealed { 1.0 } else { 0.0 },
                fade_ms: IMAGE_FADE_MS,
            }
        });

        let caption = state.caption().map(|caption| CaptionEditor {
            text: caption.text().to_string(),
            rows: CAPTION_EDITOR_ROWS,
        });

        Self {
            card,
            alt: mounted.alt.clone(),
            image,
            overlay: mounted.overlay.clone(),
            caption,
        }
    }
}

impl SettingsView {
    pub(crate) fn build(panel: &SettingsPanel) -> Self {
        let form = panel.form();
        let fields = SettingsField::ALL
            .iter()
            .map(|&field| SettingsFieldView {
                field,
                key: field.key().to_string(),
                label: field.label().to_string(),
                help: field.help().to_string(),
                warning: field.warning().map(str::to_string),
                placeholder: field.placeholder().to_string(),
                input_kind: field.input_kind(),
                value: form.get(field).to_string(),
            })
            .collect();

        let status = panel.status();
        Self {
            loading: panel.load_state() == LoadState::Loading,
            fields,
            submit_label: status.submit_label().to_string(),
            submit_disabled: status == SaveStatus::Saving,
            status_message: status.message().map(str::to_string),
            status_is_error: status == SaveStatus::Error,
        }
    }
}
