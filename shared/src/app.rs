use std::time::Duration;

use tracing::{debug, info, instrument, warn};

use crate::capabilities::{
    Capabilities, HttpRequest, HttpResponse, HttpResult, ObserverId, ViewportNotification,
};
use crate::card::CardCommand;
use crate::config::CoreConfig;
use crate::error::{AppError, AppResult, ErrorKind};
use crate::event::Event;
use crate::gallery::{CardHandle, MountedCard};
use crate::model::Model;
use crate::settings::{SettingsDocument, SETTINGS_PATH};
use crate::view::{CardView, SettingsView, ViewModel};

#[derive(Default)]
pub struct App;

impl App {
    /// A transport failure or a non-2xx status, as one error.
    fn successful(result: HttpResult, request_id: &str) -> AppResult<HttpResponse> {
        let response = result?;
        if !response.is_success() {
            return Err(AppError::from_http_status(response.status(), Some(response.body()))
                .with_context("request_id", request_id));
        }
        Ok(response)
    }

    fn caption_from_response(result: HttpResult, request_id: &str) -> AppResult<String> {
        Ok(Self::successful(result, request_id)?.body_string(request_id)?)
    }

    fn settings_from_response(result: HttpResult, request_id: &str) -> AppResult<SettingsDocument> {
        Ok(Self::successful(result, request_id)?.json(request_id)?)
    }

    /// Carry out what a card transition asked for.
    fn execute(
        card: CardHandle,
        mounted: &mut MountedCard,
        commands: Vec<CardCommand>,
        config: &CoreConfig,
        caps: &Capabilities,
    ) {
        for command in commands {
            match command {
                CardCommand::StopObserving => caps.viewport.disconnect(ObserverId(card)),
                CardCommand::FetchCaption => {
                    let request = HttpRequest::get(mounted.item.caption_path())
                        .and_then(|request| request.on_origin(config.api_base.as_ref()));
                    match request {
                        Ok(request) => caps.http.send(request, move |request_id, result| {
                            Event::CaptionFetched {
                                card,
                                request_id,
                                result: Box::new(result),
                            }
                        }),
                        // A request that cannot even be built fails the card
                        // the same way a transport error would.
                        Err(e) => {
                            warn!(%card, item = %mounted.item, error = %e, "caption request rejected");
                            mounted.state.on_caption_result(Err(e.into()));
                        }
                    }
                }
            }
        }
    }

    fn schedule_status_clear(session: u64, ticket: u64, after: Duration, caps: &Capabilities) {
        caps.timer.after(ticket, after, move |output| Event::StatusTimerElapsed {
            session,
            ticket,
            output,
        });
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    #[instrument(
        skip_all,
        fields(event = event.name(), card = event.card().map(tracing::field::display))
    )]
    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        match event {
            Event::Configured { config } => match config.validate() {
                Ok(()) => {
                    info!(
                        threshold = config.visibility_threshold,
                        status_clear_after_ms = config.status_clear_after_ms,
                        api_base = ?config.api_base.as_ref().map(url::Url::as_str),
                        "configuration applied"
                    );
                    model.config = *config;
                    caps.render.render();
                }
                Err(e) => warn!(error = %e, "configuration rejected, keeping the previous one"),
            },

            Event::CardMounted { item, alt, overlay } => {
                debug!(%item, "mounting card");
                let card = model.gallery.mount(item, alt, overlay);
                caps.viewport.observe(
                    ObserverId(card),
                    model.config.visibility_threshold,
                    move |notification| Event::ViewportNotified { card, notification },
                );
                caps.render.render();
            }

            Event::CardUnmounted { card } => {
                let Some(mut mounted) = model.gallery.unmount(card) else {
                    debug!(%card, "unmount of unknown card ignored");
                    return;
                };
                let commands = mounted.state.on_unmount();
                Self::execute(card, &mut mounted, commands, &model.config, caps);
                caps.render.render();
            }

            Event::ViewportNotified { card, notification } => {
                let threshold = model.config.visibility_threshold;
                let Some(mounted) = model.gallery.get_mut(card) else {
                    debug!(%card, "viewport notification for unmounted card dropped");
                    return;
                };
                let commands = match notification {
                    ViewportNotification::Intersection(entry) => {
                        mounted.state.on_intersection(entry, threshold)
                    }
                    ViewportNotification::Unavailable => {
                        warn!(
                            %card,
                            code = ErrorKind::ObservationUnavailable.code(),
                            "viewport observation unavailable, card stays hidden"
                        );
                        mounted.state.on_observation_unavailable()
                    }
                };
                if commands.is_empty() {
                    return;
                }
                debug!(%card, item = %mounted.item, ?commands, "card transition");
                Self::execute(card, mounted, commands, &model.config, caps);
                caps.render.render();
            }

            Event::CaptionFetched {
                card,
                request_id,
                result,
            } => {
                let Some(mounted) = model.gallery.get_mut(card) else {
                    debug!(%card, %request_id, "caption for unmounted card dropped");
                    return;
                };
                let outcome = Self::caption_from_response(*result, &request_id);
                if let Err(e) = &outcome {
                    warn!(
                        %card,
                        item = %mounted.item,
                        %request_id,
                        code = e.code(),
                        error = %e,
                        "caption fetch failed"
                    );
                }
                if mounted.state.on_caption_result(outcome) {
                    caps.render.render();
                }
            }

            Event::ImageDecoded { card } => {
                let revealed = model
                    .gallery
                    .get_mut(card)
                    .is_some_and(|mounted| mounted.state.on_image_decoded());
                if revealed {
                    caps.render.render();
                }
            }

            Event::ImageFailed { card, reason } => match model.gallery.get(card) {
                Some(mounted) => warn!(%card, item = %mounted.item, %reason, "image failed to load"),
                None => debug!(%card, "image failure for unmounted card dropped"),
            },

            Event::CaptionEdited { card, text } => {
                let Some(mounted) = model.gallery.get_mut(card) else {
                    debug!(%card, "edit for unmounted card dropped");
                    return;
                };
                match mounted.state.edit_caption(text) {
                    Ok(()) => caps.render.render(),
                    Err(e) => debug!(%card, error = %e, "caption edit ignored"),
                }
            }

            Event::SettingsOpened => {
                let session = model.open_settings();
                info!(session, "settings opened");
                let request = HttpRequest::get(SETTINGS_PATH)
                    .and_then(|request| request.on_origin(model.config.api_base.as_ref()));
                match request {
                    Ok(request) => caps.http.send(request, move |request_id, result| {
                        Event::SettingsLoaded {
                            session,
                            request_id,
                            result: Box::new(result),
                        }
                    }),
                    Err(e) => {
                        warn!(session, error = %e, "settings request rejected");
                        if let Some(panel) = model.settings_session(session) {
                            panel.load_failed();
                        }
                    }
                }
                caps.render.render();
            }

            Event::SettingsClosed => {
                if model.close_settings() {
                    caps.render.render();
                }
            }

            Event::SettingsLoaded {
                session,
                request_id,
                result,
            } => {
                let Some(panel) = model.settings_session(session) else {
                    debug!(session, %request_id, "settings for closed panel dropped");
                    return;
                };
                match Self::settings_from_response(*result, &request_id) {
                    Ok(document) => panel.apply_loaded(document),
                    Err(e) => {
                        warn!(session, %request_id, code = e.code(), error = %e, "failed to load settings");
                        panel.load_failed();
                    }
                }
                caps.render.render();
            }

            Event::SettingsFieldChanged { field, value } => {
                if let Some(panel) = model.settings.as_mut() {
                    panel.edit(field, value);
                    caps.render.render();
                }
            }

            Event::SettingsSubmitted => {
                let after = model.config.status_clear_after();
                let Some(panel) = model.settings.as_mut() else {
                    return;
                };
                let Some(document) = panel.submit() else {
                    debug!("save already running");
                    return;
                };
                let session = panel.session();
                let request = HttpRequest::post(SETTINGS_PATH)
                    .and_then(|request| request.on_origin(model.config.api_base.as_ref()))
                    .and_then(|request| request.with_json(&document));
                match request {
                    Ok(request) => caps.http.send(request, move |request_id, result| {
                        Event::SettingsSaved {
                            session,
                            request_id,
                            result: Box::new(result),
                        }
                    }),
                    Err(e) => {
                        warn!(session, error = %e, "settings save rejected");
                        if let Some(ticket) = panel.save_finished(false) {
                            Self::schedule_status_clear(session, ticket, after, caps);
                        }
                    }
                }
                caps.render.render();
            }

            Event::SettingsSaved {
                session,
                request_id,
                result,
            } => {
                let after = model.config.status_clear_after();
                let Some(panel) = model.settings_session(session) else {
                    debug!(session, %request_id, "save result for closed panel dropped");
                    return;
                };
                let succeeded = match Self::successful(*result, &request_id) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(session, %request_id, code = e.code(), error = %e, "settings save failed");
                        false
                    }
                };
                if let Some(ticket) = panel.save_finished(succeeded) {
                    info!(session, succeeded, "settings save finished");
                    Self::schedule_status_clear(session, ticket, after, caps);
                    caps.render.render();
                }
            }

            Event::StatusTimerElapsed { session, ticket, .. } => {
                let cleared = model
                    .settings_session(session)
                    .is_some_and(|panel| panel.clear_status(ticket));
                if cleared {
                    caps.render.render();
                }
            }
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        let api_base = model.config.api_base.as_ref();
        ViewModel {
            cards: model
                .gallery
                .iter()
                .map(|(card, mounted)| CardView::build(card, mounted, api_base))
                .collect(),
            settings: model.settings.as_ref().map(SettingsView::build),
        }
    }
}
