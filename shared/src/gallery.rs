//! Generational arena of mounted cards.
//!
//! Every completion the shell delivers is addressed by [`CardHandle`]. When a
//! card is unmounted its slot's generation is bumped, so a response that
//! arrives afterwards no longer matches any live card and is discarded
//! without touching state that belongs to somebody else.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::card::CardState;
use crate::item::DatasetItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardHandle {
    index: u32,
    generation: u32,
}

impl CardHandle {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for CardHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct MountedCard {
    pub item: DatasetItemId,
    pub alt: String,
    /// Content the shell layers on top of the image, if any.
    pub overlay: Option<String>,
    pub state: CardState,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
struct Slot {
    generation: u32,
    card: Option<MountedCard>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct Gallery {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live handles in mount order, which is also display order.
    order: Vec<CardHandle>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn mount(
        &mut self,
        item: DatasetItemId,
        alt: impl Into<String>,
        overlay: Option<String>,
    ) -> CardHandle {
        let card = MountedCard {
            item,
            alt: alt.into(),
            overlay,
            state: CardState::new(),
        };

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.card = Some(card);
                CardHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    card: Some(card),
                });
                CardHandle {
                    index,
                    generation: 0,
                }
            }
        };

        self.order.push(handle);
        handle
    }

    /// Remove a card. Returns `None` for handles that are already stale.
    pub fn unmount(&mut self, handle: CardHandle) -> Option<MountedCard> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let card = slot.card.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.order.retain(|h| *h != handle);
        Some(card)
    }

    pub fn get(&self, handle: CardHandle) -> Option<&MountedCard> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.card.as_ref())
    }

    pub fn get_mut(&mut self, handle: CardHandle) -> Option<&mut MountedCard> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.card.as_mut())
    }

    /// Live cards in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CardHandle, &MountedCard)> + '_ {
        self.order
            .iter()
            .filter_map(move |handle| self.get(*handle).map(|card| (*handle, card)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> DatasetItemId {
        DatasetItemId::new(id).unwrap()
    }

    #[test]
    fn mount_and_lookup() {
        let mut gallery = Gallery::new();
        let a = gallery.mount(item("a.png"), "a", None);
        let b = gallery.mount(item("b.png"), "b", Some("3".into()));
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.get(a).unwrap().item.as_str(), "a.png");
        assert_eq!(gallery.get(b).unwrap().overlay.as_deref(), Some("3"));
    }

    #[test]
    fn unmount_invalidates_handle() {
        let mut gallery = Gallery::new();
        let a = gallery.mount(item("a.png"), "a", None);
        assert!(gallery.unmount(a).is_some());
        assert!(gallery.get(a).is_none());
        assert!(gallery.unmount(a).is_none());
        assert!(gallery.is_empty());
    }

    #[test]
    fn reused_slot_gets_new_generation() {
        let mut gallery = Gallery::new();
        let old = gallery.mount(item("a.png"), "a", None);
        gallery.unmount(old);
        let new = gallery.mount(item("b.png"), "b", None);

        assert_eq!(old.index(), new.index());
        assert_ne!(old.generation(), new.generation());
        assert!(gallery.get(old).is_none());
        assert!(gallery.get_mut(old).is_none());
        assert_eq!(gallery.get(new).unwrap().item.as_str(), "b.png");
    }

    #[test]
    fn iteration_follows_mount_order() {
        let mut gallery = Gallery::new();
        let a = gallery.mount(item("a"), "", None);
        let b = gallery.mount(item("b"), "", None);
        let c = gallery.mount(item("c"), "", None);
        gallery.unmount(b);
        let d = gallery.mount(item("d"), "", None);

        let handles: Vec<_> = gallery.iter().map(|(h, _)| h).collect();
        assert_eq!(handles, vec![a, c, d]);
    }

    #[test]
    fn cards_do_not_share_state() {
        let mut gallery = Gallery::new();
        let a = gallery.mount(item("same.png"), "", None);
        let b = gallery.mount(item("same.png"), "", None);
        gallery.get_mut(a).unwrap().state.on_unmount();
        assert!(!gallery.get(a).unwrap().state.is_observing());
        assert!(gallery.get(b).unwrap().state.is_observing());
    }
}
