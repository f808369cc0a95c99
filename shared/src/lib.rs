//! Headless core of the dataset browser: lazily loaded image/caption cards
//! and the settings panel.
//!
//! The crate never performs I/O. [`App`] is a crux app: a shell (web,
//! desktop, test harness) hosts it in a `crux_core::Core`, sends [`Event`]s,
//! executes the [`Effect`]s it gets back, resolves them with their outputs and
//! renders [`ViewModel`]s.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod capabilities;
pub mod card;
pub mod config;
pub mod error;
pub mod event;
pub mod gallery;
pub mod item;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod settings;
pub mod view;

pub use crate::app::App;
pub use crate::capabilities::{Capabilities, Effect};
pub use crate::config::{ConfigError, CoreConfig};
pub use crate::error::{AppError, AppResult, ErrorKind};
pub use crate::event::Event;
pub use crate::gallery::CardHandle;
pub use crate::item::DatasetItemId;
pub use crate::model::Model;
pub use crate::view::ViewModel;
