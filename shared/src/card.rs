//! State machine of one lazily loaded dataset card.
//!
//! Three independent machines live here:
//!
//! ```text
//! visibility:   NotObserved --(entry meets threshold)--> Visible      [terminal]
//! caption:      Idle --(visible, guard)--> InFlight --(ok)--> Loaded   [terminal]
//!                                                   \--(err)--> Failed [terminal]
//! image_loaded: false --(decoded while visible)--> true               [terminal]
//! ```
//!
//! Transitions are plain methods on [`CardState`] that return the
//! [`CardCommand`]s the host must carry out. Nothing here performs I/O, so
//! every invariant can be exercised without a browser or a network.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::IntersectionEntry;
use crate::error::AppError;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    NotObserved,
    Visible,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub enum CaptionFetch {
    #[default]
    Idle,
    InFlight,
    Loaded(Caption),
    Failed,
}

impl CaptionFetch {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CaptionFetch::Loaded(_) | CaptionFetch::Failed)
    }
}

/// A fetched caption and the local, never persisted, edit of it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    fetched: String,
    draft: String,
}

impl Caption {
    fn new(text: String) -> Self {
        Self {
            draft: text.clone(),
            fetched: text,
        }
    }

    pub fn fetched(&self) -> &str {
        &self.fetched
    }

    pub fn text(&self) -> &str {
        &self.draft
    }

    pub fn is_edited(&self) -> bool {
        self.draft != self.fetched
    }
}

/// Side effects a transition asks its host to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardCommand {
    /// Release the viewport registration.
    StopObserving,
    /// Issue the one caption request this card will ever make.
    FetchCaption,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("caption is not loaded")]
    CaptionNotLoaded,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CardState {
    visibility: Visibility,
    observing: bool,
    image_loaded: bool,
    caption: CaptionFetch,
}

impl Default for CardState {
    fn default() -> Self {
        Self::new()
    }
}

impl CardState {
    /// A freshly mounted card: registered with the viewport, nothing fetched.
    pub fn new() -> Self {
        Self {
            visibility: Visibility::NotObserved,
            observing: true,
            image_loaded: false,
            caption: CaptionFetch::Idle,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_visible(&self) -> bool {
        self.visibility == Visibility::Visible
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    pub fn image_loaded(&self) -> bool {
        self.image_loaded
    }

    pub fn caption_fetch(&self) -> &CaptionFetch {
        &self.caption
    }

    pub fn caption(&self) -> Option<&Caption> {
        match &self.caption {
            CaptionFetch::Loaded(caption) => Some(caption),
            _ => None,
        }
    }

    /// Feed one viewport notification.
    ///
    /// The first entry that meets `threshold` makes the card visible, releases
    /// the registration and starts the caption fetch. Every later entry,
    /// including ones reporting the card has left the viewport, is inert.
    pub fn on_intersection(&mut self, entry: IntersectionEntry, threshold: f64) -> Vec<CardCommand> {
        if !self.observing || self.is_visible() || !entry.meets(threshold) {
            return Vec::new();
        }

        self.visibility = Visibility::Visible;
        self.observing = false;

        let mut commands = vec![CardCommand::StopObserving];
        commands.extend(self.request_caption());
        commands
    }

    /// The shell cannot observe the viewport. The card stays hidden for good,
    /// which is the safe degraded mode: nothing is fetched.
    pub fn on_observation_unavailable(&mut self) -> Vec<CardCommand> {
        if !self.observing {
            return Vec::new();
        }
        self.observing = false;
        vec![CardCommand::StopObserving]
    }

    /// React to the card being visible. Idempotent: the check and the move to
    /// `InFlight` happen in the same `&mut self` call, so duplicate or
    /// re-entrant triggers can never yield a second request.
    pub fn request_caption(&mut self) -> Option<CardCommand> {
        if !self.is_visible() || self.caption != CaptionFetch::Idle {
            return None;
        }
        self.caption = CaptionFetch::InFlight;
        Some(CardCommand::FetchCaption)
    }

    /// Apply the outcome of the caption request. Results arriving in any
    /// state other than `InFlight` are ignored; returns whether state changed.
    pub fn on_caption_result(&mut self, result: Result<String, AppError>) -> bool {
        if self.caption != CaptionFetch::InFlight {
            return false;
        }
        self.caption = match result {
            Ok(text) => CaptionFetch::Loaded(Caption::new(text)),
            Err(_) => CaptionFetch::Failed,
        };
        true
    }

    /// The shell finished decoding the image. Only meaningful once the image
    /// was requested, i.e. once visible; returns whether state changed.
    pub fn on_image_decoded(&mut self) -> bool {
        if !self.is_visible() || self.image_loaded {
            return false;
        }
        self.image_loaded = true;
        true
    }

    pub fn edit_caption(&mut self, text: impl Into<String>) -> Result<(), CardError> {
        match &mut self.caption {
            CaptionFetch::Loaded(caption) => {
                caption.draft = text.into();
                Ok(())
            }
            _ => Err(CardError::CaptionNotLoaded),
        }
    }

    /// The card is being destroyed. Releases a registration that never fired.
    pub fn on_unmount(&mut self) -> Vec<CardCommand> {
        if self.observing {
            self.observing = false;
            vec![CardCommand::StopObserving]
        } else {
            Vec::new()
        }
    }
}
