use serde::{Deserialize, Serialize};

use crate::config::CoreConfig;
use crate::gallery::Gallery;
use crate::settings::SettingsPanel;

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Model {
    pub config: CoreConfig,
    pub gallery: Gallery,
    /// The open settings panel, if any.
    pub settings: Option<SettingsPanel>,
    next_session: u64,
}

impl Model {
    /// Start a new settings session, replacing any panel that was open.
    pub fn open_settings(&mut self) -> u64 {
        self.next_session = self.next_session.wrapping_add(1);
        self.settings = Some(SettingsPanel::open(self.next_session));
        self.next_session
    }

    pub fn close_settings(&mut self) -> bool {
        self.settings.take().is_some()
    }

    /// The panel for `session`, or `None` when that session was closed or
    /// replaced.
    pub fn settings_session(&mut self, session: u64) -> Option<&mut SettingsPanel> {
        self.settings
            .as_mut()
            .filter(|panel| panel.session() == session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopening_replaces_the_session() {
        let mut model = Model::default();
        let first = model.open_settings();
        let second = model.open_settings();
        assert_ne!(first, second);
        assert!(model.settings_session(first).is_none());
        assert!(model.settings_session(second).is_some());
    }

    #[test]
    fn closed_session_is_gone() {
        let mut model = Model::default();
        let session = model.open_settings();
        assert!(model.close_settings());
        assert!(!model.close_settings());
        assert!(model.settings_session(session).is_none());
    }
}
