#![allow(dead_code)]

use crux_core::capability::Operation;
use crux_core::testing::AppTester;
use crux_core::Request;

use dataset_ui::capabilities::{HttpOperation, TimerOperation, ViewportOperation};
use dataset_ui::{App, Effect, Event, Model, ViewModel};

/// An app plus its model, with every event a resolved request produces fed
/// straight back into `update`, the way a shell-hosted core behaves.
pub struct Harness {
    app: AppTester<App, Effect>,
    pub model: Model,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            app: AppTester::default(),
            model: Model::default(),
        }
    }
}

impl Harness {
    pub fn send(&mut self, event: Event) -> Vec<Effect> {
        let update = self.app.update(event, &mut self.model);
        self.settle(update.effects, update.events)
    }

    pub fn resolve<Op: Operation>(&mut self, request: &mut Request<Op>, output: Op::Output) -> Vec<Effect> {
        let update = self
            .app
            .resolve(request, output)
            .expect("request should accept a response");
        self.settle(update.effects, update.events)
    }

    /// Whether the request still takes a response.
    pub fn accepts<Op: Operation>(&mut self, request: &mut Request<Op>, output: Op::Output) -> bool {
        self.app.resolve(request, output).is_ok()
    }

    pub fn view(&self) -> ViewModel {
        self.app.view(&self.model)
    }

    fn settle(&mut self, mut effects: Vec<Effect>, events: Vec<Event>) -> Vec<Effect> {
        for event in events {
            let more = self.send(event);
            effects.extend(more);
        }
        effects
    }
}

pub fn is_render(effect: &Effect) -> bool {
    matches!(effect, Effect::Render(_))
}

pub fn renders(effects: &[Effect]) -> usize {
    effects.iter().filter(|effect| is_render(effect)).count()
}

pub fn http_requests(effects: Vec<Effect>) -> Vec<Request<HttpOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Http(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn viewport_requests(effects: Vec<Effect>) -> Vec<Request<ViewportOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Viewport(request) => Some(request),
            _ => None,
        })
        .collect()
}

pub fn timers(effects: Vec<Effect>) -> Vec<Request<TimerOperation>> {
    effects
        .into_iter()
        .filter_map(|effect| match effect {
            Effect::Timer(request) => Some(request),
            _ => None,
        })
        .collect()
}
