//! Cosmetic shop: catalogues, purchase rules and grid layout
//!
//! Items sit in a 4-column grid followed by a Back entry. Activating an item
//! equips it when owned, buys and equips it when affordable, and otherwise
//! does nothing.

use crate::HitRect;
use crate::consts::SCREEN_H;
use crate::persistence::KeyValueStore;
use crate::progression::{Cosmetic, CosmeticKind, Progression};
use crate::sim::grid::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub cosmetic: Cosmetic,
    pub name: &'static str,
    pub price: u32,
}

const fn item(kind: CosmeticKind, slot: usize, name: &'static str, price: u32) -> ShopItem {
    ShopItem {
        cosmetic: Cosmetic::new(kind, slot),
        name,
        price,
    }
}

/// Everything one mini-game sells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalogue {
    pub items: &'static [ShopItem],
}

use CosmeticKind::{Skin, Theme};

pub const MAZE_CATALOGUE: Catalogue = Catalogue {
    items: &[
        item(Skin, 0, "Classic", 0),
        item(Skin, 1, "Cherry", 50),
        item(Skin, 2, "Mint", 50),
        item(Skin, 3, "Sky", 50),
        item(Skin, 4, "Violet", 50),
        item(Skin, 5, "Ember", 50),
        item(Skin, 6, "Frost", 50),
        item(Skin, 7, "Gold", 50),
        item(Theme, 0, "Navy", 0),
        item(Theme, 1, "Forest", 100),
        item(Theme, 2, "Crimson", 100),
        item(Theme, 3, "Neon", 100),
    ],
};

pub const SHOOTER_CATALOGUE: Catalogue = Catalogue {
    items: &[
        item(Skin, 0, "Falcon", 0),
        item(Skin, 1, "Viper", 100),
        item(Skin, 2, "Hornet", 200),
        item(Skin, 3, "Raven", 300),
        item(Skin, 4, "Comet", 500),
        item(Skin, 5, "Nova", 800),
    ],
};

pub const PENALTY_CATALOGUE: Catalogue = Catalogue {
    items: &[
        item(Skin, 0, "Home", 0),
        item(Skin, 1, "Away", 100),
        item(Skin, 2, "Forest", 150),
        item(Skin, 3, "Golden", 300),
    ],
};

impl Catalogue {
    /// Items plus the trailing Back entry
    pub fn entries(&self) -> usize {
        self.items.len() + 1
    }

    pub fn back_index(&self) -> usize {
        self.items.len()
    }

    pub fn get(&self, index: usize) -> Option<&ShopItem> {
        self.items.get(index)
    }

    /// Slot count per cosmetic kind, for loading progression
    pub fn slots(&self) -> Vec<(CosmeticKind, usize)> {
        let mut slots: Vec<(CosmeticKind, usize)> = Vec::new();
        for it in self.items {
            let kind = it.cosmetic.kind;
            let count = it.cosmetic.slot + 1;
            match slots.iter_mut().find(|(k, _)| *k == kind) {
                Some(entry) => entry.1 = entry.1.max(count),
                None => slots.push((kind, count)),
            }
        }
        slots
    }
}

/// Outcome of activating a shop item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Equipped,
    Purchased,
    Declined,
}

pub fn activate<S: KeyValueStore>(progression: &mut Progression<S>, item: &ShopItem) -> Activation {
    if progression.record().owns(item.cosmetic) {
        progression.equip(item.cosmetic);
        return Activation::Equipped;
    }
    if progression.purchase(item.cosmetic, item.price) {
        progression.equip(item.cosmetic);
        return Activation::Purchased;
    }
    log::debug!("cannot afford {} ({} coins)", item.name, item.price);
    Activation::Declined
}

pub const COLUMNS: usize = 4;
pub const BOX_W: i32 = 100;
pub const BOX_H: i32 = 90;
pub const GAP: i32 = 15;
pub const GRID_X: i32 = 20;
pub const GRID_Y: i32 = 120;
/// Rows above this belong to the fixed header
pub const LIST_TOP: i32 = 110;
const BACK_W: i32 = 120;
const BACK_H: i32 = 40;

/// Unscrolled rectangle of entry `index` (items, then Back)
pub fn entry_rect(index: usize, catalogue: &Catalogue) -> HitRect {
    let rows = catalogue.items.len().div_ceil(COLUMNS) as i32;
    if index >= catalogue.back_index() {
        let y = GRID_Y + rows * (BOX_H + GAP);
        return HitRect::new(crate::consts::SCREEN_W / 2 - BACK_W / 2, y, BACK_W, BACK_H);
    }
    let col = (index % COLUMNS) as i32;
    let row = (index / COLUMNS) as i32;
    HitRect::new(
        GRID_X + col * (BOX_W + GAP),
        GRID_Y + row * (BOX_H + GAP),
        BOX_W,
        BOX_H,
    )
}

/// Largest useful scroll offset
pub fn max_scroll(catalogue: &Catalogue) -> i32 {
    let back = entry_rect(catalogue.back_index(), catalogue);
    (back.y + back.h + GAP - SCREEN_H).max(0)
}

pub fn clamp_scroll(scroll: i32, catalogue: &Catalogue) -> i32 {
    scroll.clamp(0, max_scroll(catalogue))
}

/// Adjust `scroll` so entry `index` is fully inside the list area
pub fn scroll_to_show(index: usize, scroll: i32, catalogue: &Catalogue) -> i32 {
    let rect = entry_rect(index, catalogue);
    let top = rect.y - scroll;
    let bottom = top + rect.h;
    let scroll = if top < LIST_TOP {
        rect.y - LIST_TOP
    } else if bottom > SCREEN_H {
        rect.y + rect.h - SCREEN_H
    } else {
        scroll
    };
    clamp_scroll(scroll, catalogue)
}

/// Entry under a screen point, taking scroll into account
pub fn hit_test(x: i32, y: i32, scroll: i32, catalogue: &Catalogue) -> Option<usize> {
    if y < LIST_TOP {
        return None;
    }
    (0..catalogue.entries()).find(|&i| entry_rect(i, catalogue).shifted(-scroll).contains(x, y))
}

/// Cursor movement in the grid; Down from the last row lands on Back
pub fn move_cursor(cursor: usize, dir: Direction, catalogue: &Catalogue) -> usize {
    let last = catalogue.entries() - 1;
    match dir {
        Direction::Left => cursor.saturating_sub(1),
        Direction::Right => (cursor + 1).min(last),
        Direction::Up => cursor.saturating_sub(COLUMNS),
        Direction::Down => (cursor + COLUMNS).min(last),
        Direction::None => cursor,
    }
}
