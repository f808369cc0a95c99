//! Settings panel: load on open, edit locally, save the whole document.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use zeroize::Zeroize;

pub const SETTINGS_PATH: &str = "/api/settings";

// --- Secret wrapper: redacts Debug, zeroizes on Drop ---

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Each key is read on its own: a value of the wrong type never fails the
/// document. `null`, `false`, `0`, objects and arrays read as an empty
/// string; other numbers and `true` keep their text.
fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    })
}

fn secret_or_empty<'de, D>(deserializer: D) -> Result<Secret, D::Error>
where
    D: Deserializer<'de>,
{
    string_or_empty(deserializer).map(Secret)
}

/// The wire document for `GET`/`POST /api/settings`. Doubles as the editable
/// form copy the panel holds.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct SettingsDocument {
    #[serde(rename = "HF_TOKEN", default, deserialize_with = "secret_or_empty")]
    pub hf_token: Secret,
    #[serde(rename = "TRAINING_FOLDER", default, deserialize_with = "string_or_empty")]
    pub training_folder: String,
    #[serde(rename = "DATASETS_FOLDER", default, deserialize_with = "string_or_empty")]
    pub datasets_folder: String,
}

impl SettingsDocument {
    pub fn get(&self, field: SettingsField) -> &str {
        match field {
            SettingsField::HfToken => self.hf_token.expose(),
            SettingsField::TrainingFolder => &self.training_folder,
            SettingsField::DatasetsFolder => &self.datasets_folder,
        }
    }

    pub fn set(&mut self, field: SettingsField, value: impl Into<String>) {
        match field {
            SettingsField::HfToken => self.hf_token = Secret::new(value),
            SettingsField::TrainingFolder => self.training_folder = value.into(),
            SettingsField::DatasetsFolder => self.datasets_folder = value.into(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SettingsField {
    HfToken,
    TrainingFolder,
    DatasetsFolder,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Password,
}

impl SettingsField {
    pub const ALL: [SettingsField; 3] = [
        SettingsField::HfToken,
        SettingsField::TrainingFolder,
        SettingsField::DatasetsFolder,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SettingsField::HfToken => "HF_TOKEN",
            SettingsField::TrainingFolder => "TRAINING_FOLDER",
            SettingsField::DatasetsFolder => "DATASETS_FOLDER",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::HfToken => "Hugging Face Token",
            SettingsField::TrainingFolder => "Training Folder Path",
            SettingsField::DatasetsFolder => "Dataset Folder Path",
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            SettingsField::HfToken => {
                "Create a Read token on Huggingface if you need to access gated/private models."
            }
            SettingsField::TrainingFolder => {
                "We will store your training information here. Must be an absolute path. \
                 If blank, it will default to the output folder in the project root."
            }
            SettingsField::DatasetsFolder => "Where we store and find your datasets.",
        }
    }

    pub fn warning(self) -> Option<&'static str> {
        match self {
            SettingsField::DatasetsFolder => Some(
                "Warning: This software may modify datasets so it is recommended you keep a \
                 backup somewhere else or have a dedicated folder for this software.",
            ),
            _ => None,
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            SettingsField::HfToken => "Enter your Hugging Face token",
            SettingsField::TrainingFolder => "Enter training folder path",
            SettingsField::DatasetsFolder => "Enter datasets folder path",
        }
    }

    pub fn input_kind(self) -> InputKind {
        match self {
            SettingsField::HfToken => InputKind::Password,
            _ => InputKind::Text,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Success,
    Error,
}

impl SaveStatus {
    pub fn message(self) -> Option<&'static str> {
        match self {
            SaveStatus::Success => Some("Settings saved successfully!"),
            SaveStatus::Error => Some("Error saving settings. Please try again."),
            SaveStatus::Idle | SaveStatus::Saving => None,
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            SaveStatus::Saving => "Saving...",
            _ => "Save Settings",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Loaded,
    Failed,
}

/// One open settings panel. `session` distinguishes it from panels opened
/// earlier so their late responses can be dropped.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SettingsPanel {
    session: u64,
    form: SettingsDocument,
    load: LoadState,
    status: SaveStatus,
    status_ticket: u64,
}

impl SettingsPanel {
    pub fn open(session: u64) -> Self {
        Self {
            session,
            form: SettingsDocument::default(),
            load: LoadState::Loading,
            status: SaveStatus::Idle,
            status_ticket: 0,
        }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn form(&self) -> &SettingsDocument {
        &self.form
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    pub fn apply_loaded(&mut self, document: SettingsDocument) {
        self.form = document;
        self.load = LoadState::Loaded;
    }

    /// A failed load leaves the empty form editable.
    pub fn load_failed(&mut self) {
        self.load = LoadState::Failed;
    }

    pub fn edit(&mut self, field: SettingsField, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Start a save. Returns the document to send, or `None` while a save is
    /// already running.
    pub fn submit(&mut self) -> Option<SettingsDocument> {
        if self.status == SaveStatus::Saving {
            return None;
        }
        self.set_status(SaveStatus::Saving);
        Some(self.form.clone())
    }

    /// Record the save outcome. Returns the ticket the auto-clear timer must
    /// present, or `None` if no save was running.
    pub fn save_finished(&mut self, succeeded: bool) -> Option<u64> {
        if self.status != SaveStatus::Saving {
            return None;
        }
        self.set_status(if succeeded {
            SaveStatus::Success
        } else {
            SaveStatus::Error
        });
        Some(self.status_ticket)
    }

    /// Return to idle, unless the status changed since `ticket` was issued.
    pub fn clear_status(&mut self, ticket: u64) -> bool {
        if ticket != self.status_ticket || self.status == SaveStatus::Saving {
            return false;
        }
        let changed = self.status != SaveStatus::Idle;
        self.status = SaveStatus::Idle;
        changed
    }

    fn set_status(&mut self, status: SaveStatus) {
        self.status = status;
        self.status_ticket = self.status_ticket.wrapping_add(1);
    }
}
