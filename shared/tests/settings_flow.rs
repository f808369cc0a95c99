mod common;

use assert_matches::assert_matches;
use crux_core::Request;
use serde_json::{json, Value};

use dataset_ui::capabilities::{
    HttpError, HttpMethod, HttpOperation, HttpResponse, TimerOperation, TimerOutput,
};
use dataset_ui::settings::{SaveStatus, SettingsField};
use dataset_ui::{CoreConfig, Effect, Event};

use common::{http_requests, is_render, renders, timers, Harness};

fn single_http(effects: Vec<Effect>) -> Request<HttpOperation> {
    let mut requests = http_requests(effects);
    assert_eq!(requests.len(), 1, "expected exactly one http request");
    requests.remove(0)
}

fn single_timer(effects: Vec<Effect>) -> Request<TimerOperation> {
    let mut timers = timers(effects);
    assert_eq!(timers.len(), 1, "expected exactly one timer");
    timers.remove(0)
}

fn open_with(h: &mut Harness, body: Value) {
    let mut load = single_http(h.send(Event::SettingsOpened));
    {
        let request = load.operation.request();
        assert_eq!(request.method(), HttpMethod::Get);
        assert_eq!(request.path(), "/api/settings");
    }
    h.resolve(&mut load, Ok(HttpResponse::ok(body.to_string())));
}

fn sent_document(request: &Request<HttpOperation>) -> Value {
    serde_json::from_slice(request.operation.request().body().unwrap()).unwrap()
}

fn field_values(h: &Harness) -> Vec<String> {
    h.view()
        .settings
        .unwrap()
        .fields
        .into_iter()
        .map(|field| field.value)
        .collect()
}

fn status(h: &Harness) -> SaveStatus {
    h.model.settings.as_ref().unwrap().status()
}

#[test]
fn loaded_settings_post_back_unchanged() {
    let mut h = Harness::default();
    let document = json!({
        "HF_TOKEN": "abc",
        "TRAINING_FOLDER": "",
        "DATASETS_FOLDER": "/data"
    });
    open_with(&mut h, document.clone());

    let view = h.view().settings.unwrap();
    assert!(!view.loading);
    assert_eq!(field_values(&h), ["abc", "", "/data"]);

    let save = single_http(h.send(Event::SettingsSubmitted));
    let request = save.operation.request();
    assert_eq!(request.method(), HttpMethod::Post);
    assert_eq!(request.path(), "/api/settings");
    assert_eq!(request.content_type(), Some("application/json"));
    assert_eq!(sent_document(&save), document);
}

#[test]
fn missing_and_null_keys_load_as_empty() {
    let mut h = Harness::default();
    open_with(&mut h, json!({ "HF_TOKEN": null, "DATASETS_FOLDER": "/d" }));
    assert_eq!(field_values(&h), ["", "", "/d"]);

    let save = single_http(h.send(Event::SettingsSubmitted));
    assert_eq!(
        sent_document(&save),
        json!({ "HF_TOKEN": "", "TRAINING_FOLDER": "", "DATASETS_FOLDER": "/d" })
    );
}

#[test]
fn one_mistyped_key_does_not_blank_the_others() {
    let mut h = Harness::default();
    open_with(
        &mut h,
        json!({ "HF_TOKEN": "abc", "TRAINING_FOLDER": 5, "DATASETS_FOLDER": { "x": 1 } }),
    );
    assert_eq!(field_values(&h), ["abc", "5", ""]);
    assert_eq!(h.view().settings.unwrap().status_message, None);
}

#[test]
fn failed_load_leaves_empty_editable_form() {
    let mut h = Harness::default();
    let mut load = single_http(h.send(Event::SettingsOpened));
    let request_id = load.operation.request().request_id().to_string();
    h.resolve(
        &mut load,
        Err(HttpError::Timeout {
            timeout_ms: 30_000,
            request_id,
        }),
    );

    let view = h.view().settings.unwrap();
    assert!(!view.loading);
    assert_eq!(view.status_message, None);
    assert_eq!(field_values(&h), ["", "", ""]);

    h.send(Event::SettingsFieldChanged {
        field: SettingsField::TrainingFolder,
        value: "/train".into(),
    });
    assert_eq!(field_values(&h), ["", "/train", ""]);
}

#[test]
fn rejected_load_leaves_empty_form() {
    let mut h = Harness::default();
    let mut load = single_http(h.send(Event::SettingsOpened));
    h.resolve(&mut load, Ok(HttpResponse::new(500, r#"{"HF_TOKEN":"x"}"#)));
    assert!(!h.view().settings.unwrap().loading);
    assert_eq!(field_values(&h), ["", "", ""]);
}

#[test]
fn edits_are_sent_on_submit() {
    let mut h = Harness::default();
    open_with(&mut h, json!({}));
    h.send(Event::SettingsFieldChanged {
        field: SettingsField::HfToken,
        value: "hf_new".into(),
    });

    let save = single_http(h.send(Event::SettingsSubmitted));
    assert_eq!(sent_document(&save)["HF_TOKEN"], "hf_new");
}

#[test]
fn submit_is_ignored_while_saving() {
    let mut h = Harness::default();
    open_with(&mut h, json!({}));

    let _save = single_http(h.send(Event::SettingsSubmitted));
    assert_eq!(status(&h), SaveStatus::Saving);
    let view = h.view().settings.unwrap();
    assert!(view.submit_disabled);
    assert_eq!(view.submit_label, "Saving...");

    assert!(h.send(Event::SettingsSubmitted).is_empty());
}

#[test]
fn success_banner_clears_after_interval() {
    let mut h = Harness::default();
    open_with(&mut h, json!({}));
    let mut save = single_http(h.send(Event::SettingsSubmitted));

    let effects = h.resolve(&mut save, Ok(HttpResponse::ok("{}")));
    assert_eq!(renders(&effects), 1);
    let mut timer = single_timer(effects);
    assert_matches!(timer.operation, TimerOperation::After { millis: 2000, .. });

    let view = h.view().settings.unwrap();
    assert_eq!(
        view.status_message.as_deref(),
        Some("Settings saved successfully!")
    );
    assert!(!view.status_is_error);

    let effects = h.resolve(&mut timer, TimerOutput::Elapsed);
    assert!(is_render(&effects[0]));
    assert_eq!(status(&h), SaveStatus::Idle);
    assert_eq!(h.view().settings.unwrap().status_message, None);
}

#[test]
fn rejected_save_shows_error() {
    let mut h = Harness::default();
    open_with(&mut h, json!({}));
    let mut save = single_http(h.send(Event::SettingsSubmitted));

    let effects = h.resolve(&mut save, Ok(HttpResponse::new(500, "disk full")));
    let _timer = single_timer(effects);
    let view = h.view().settings.unwrap();
    assert_eq!(
        view.status_message.as_deref(),
        Some("Error saving settings. Please try again.")
    );
    assert!(view.status_is_error);
    assert_eq!(view.submit_label, "Save Settings");
}

#[test]
fn stale_timer_does_not_clear_newer_status() {
    let mut h = Harness::default();
    open_with(&mut h, json!({}));

    let mut first_save = single_http(h.send(Event::SettingsSubmitted));
    let mut first_timer = single_timer(h.resolve(&mut first_save, Ok(HttpResponse::ok(""))));

    let mut second_save = single_http(h.send(Event::SettingsSubmitted));
    let mut second_timer =
        single_timer(h.resolve(&mut second_save, Ok(HttpResponse::new(503, ""))));

    assert!(h.resolve(&mut first_timer, TimerOutput::Elapsed).is_empty());
    assert_eq!(status(&h), SaveStatus::Error);

    h.resolve(&mut second_timer, TimerOutput::Elapsed);
    assert_eq!(status(&h), SaveStatus::Idle);
}

#[test]
fn custom_clear_interval_is_used() {
    let mut h = Harness::default();
    let config = CoreConfig::from_json(r#"{ "status_clear_after_ms": 750 }"#).unwrap();
    h.send(Event::Configured {
        config: Box::new(config),
    });
    open_with(&mut h, json!({}));
    let mut save = single_http(h.send(Event::SettingsSubmitted));
    let timer = single_timer(h.resolve(&mut save, Ok(HttpResponse::ok(""))));
    assert_matches!(timer.operation, TimerOperation::After { millis: 750, .. });
}

#[test]
fn configured_origin_is_used_for_settings() {
    let mut h = Harness::default();
    let config = CoreConfig::from_json(r#"{ "api_base": "https://backend.example:8443" }"#).unwrap();
    h.send(Event::Configured {
        config: Box::new(config),
    });

    let load = single_http(h.send(Event::SettingsOpened));
    assert_eq!(
        load.operation.request().url(),
        "https://backend.example:8443/api/settings"
    );
}

#[test]
fn responses_for_closed_panel_are_dropped() {
    let mut h = Harness::default();
    let mut load = single_http(h.send(Event::SettingsOpened));
    assert!(!h.send(Event::SettingsClosed).is_empty());

    let effects = h.resolve(&mut load, Ok(HttpResponse::ok(r#"{"HF_TOKEN":"late"}"#)));
    assert!(effects.is_empty());
    assert!(h.view().settings.is_none());
}

#[test]
fn reopened_panel_ignores_previous_session() {
    let mut h = Harness::default();
    let mut stale = single_http(h.send(Event::SettingsOpened));
    let mut fresh = single_http(h.send(Event::SettingsOpened));

    h.resolve(&mut fresh, Ok(HttpResponse::ok(r#"{"DATASETS_FOLDER":"/new"}"#)));
    let effects = h.resolve(&mut stale, Ok(HttpResponse::ok(r#"{"DATASETS_FOLDER":"/old"}"#)));
    assert!(effects.is_empty());
    assert_eq!(field_values(&h), ["", "", "/new"]);
}

#[test]
fn token_never_appears_in_debug_output() {
    let mut h = Harness::default();
    open_with(&mut h, json!({ "HF_TOKEN": "hf_very_secret" }));
    let debug = format!("{:?}", h.model);
    assert!(!debug.contains("hf_very_secret"));
}
