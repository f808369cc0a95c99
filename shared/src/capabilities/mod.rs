//! Side-effect plumbing between the core and its shell.
//!
//! The core never performs I/O. Each capability turns intent into a crux
//! request carried by an [`Effect`]; the shell performs the operation and
//! resolves the request, which feeds an [`Event`] back into `update`.

mod http;
mod timer;
mod viewport;

pub use crux_core::render::Render;

pub use self::http::{
    Http, HttpError, HttpMethod, HttpOperation, HttpRequest, HttpResponse, HttpResult,
    MAX_PATH_LENGTH,
};
pub use self::timer::{Timer, TimerOperation, TimerOutput};
pub use self::viewport::{
    IntersectionEntry, ObserverId, Rect, Viewport, ViewportNotification, ViewportOperation,
};

use crate::app::App;
use crate::event::Event;

/// Everything the core can ask the shell to do. The derive produces the
/// `Effect` enum with one variant per field: `Http`, `Viewport`, `Timer` and
/// `Render`.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub viewport: Viewport<Event>,
    pub timer: Timer<Event>,
    pub render: Render<Event>,
}
