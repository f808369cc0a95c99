//! Viewport observation capability.
//!
//! The shell backs this with whatever it has: `IntersectionObserver` in a
//! browser, or a scroll listener feeding [`IntersectionEntry::from_geometry`]
//! elsewhere. A shell with neither answers [`ViewportNotification::Unavailable`].

use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::gallery::CardHandle;

/// Identifies one observation registration. One per mounted card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObserverId(pub CardHandle);

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewportOperation {
    /// Start delivering intersection notifications for the element.
    Observe {
        observer: ObserverId,
        threshold: f64,
    },
    /// Tear down the registration; later notifications are ignored.
    Disconnect { observer: ObserverId },
}

impl Operation for ViewportOperation {
    type Output = ViewportNotification;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ViewportNotification {
    Intersection(IntersectionEntry),
    Unavailable,
}

/// Axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        if self.width.is_finite() && self.height.is_finite() {
            self.width.max(0.0) * self.height.max(0.0)
        } else {
            0.0
        }
    }

    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }
}

/// Shells report entries as plain JSON, so decoding goes through
/// [`IntersectionEntry::new`] like every other construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawIntersectionEntry")]
pub struct IntersectionEntry {
    ratio: f64,
    is_intersecting: bool,
}

#[derive(Deserialize)]
struct RawIntersectionEntry {
    ratio: f64,
    is_intersecting: bool,
}

impl From<RawIntersectionEntry> for IntersectionEntry {
    fn from(raw: RawIntersectionEntry) -> Self {
        Self::new(raw.ratio, raw.is_intersecting)
    }
}

impl IntersectionEntry {
    pub fn new(ratio: f64, is_intersecting: bool) -> Self {
        let ratio = if ratio.is_nan() { 0.0 } else { ratio.clamp(0.0, 1.0) };
        Self {
            ratio,
            is_intersecting,
        }
    }

    /// Compute an entry the way `IntersectionObserver` would. Edge-adjacent
    /// rectangles intersect with a ratio of zero.
    pub fn from_geometry(element: &Rect, viewport: &Rect) -> Self {
        match element.intersection(viewport) {
            None => Self::new(0.0, false),
            Some(overlap) => {
                let area = element.area();
                let ratio = if area > 0.0 {
                    overlap.area() / area
                } else {
                    1.0
                };
                Self::new(ratio, true)
            }
        }
    }

    /// Fraction of the element's area inside the viewport, 0.0 to 1.0.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_intersecting(&self) -> bool {
        self.is_intersecting
    }

    pub fn meets(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

pub struct Viewport<Ev> {
    context: CapabilityContext<ViewportOperation, Ev>,
}

impl<Ev> Capability<Ev> for Viewport<Ev> {
    type Operation = ViewportOperation;
    type MappedSelf<MappedEv> = Viewport<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Viewport::new(self.context.map_event(f))
    }
}

impl<Ev> Viewport<Ev> {
    pub fn new(context: CapabilityContext<ViewportOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Viewport<Ev>
where
    Ev: 'static,
{
    /// Register `observer`. Every notification the shell delivers for it is
    /// mapped through `callback` until the registration is torn down.
    pub fn observe<F>(&self, observer: ObserverId, threshold: f64, callback: F)
    where
        F: Fn(ViewportNotification) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let notifications = ctx.stream_from_shell(ViewportOperation::Observe {
                observer,
                threshold,
            });
            futures::pin_mut!(notifications);
            while let Some(notification) = notifications.next().await {
                ctx.update_app(callback(notification));
            }
        });
    }

    pub fn disconnect(&self, observer: ObserverId) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(ViewportOperation::Disconnect { observer })
                .await;
        });
    }
}
