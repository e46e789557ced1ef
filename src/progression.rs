//! Persistent progression: coins, high score and cosmetics
//!
//! Loaded once at boot from a [`KeyValueStore`]. Mutations land in memory and
//! mark keys pending; [`Progression::flush`] writes just those keys. The
//! console flushes once at the end of any frame that changed something.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;

/// Store key names one game uses for its scalar values. Unlock flags are
/// always `<kind>_<slot>`, e.g. `skin_3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreKeys {
    pub coins: &'static str,
    pub high_score: &'static str,
    pub skin: &'static str,
    pub theme: &'static str,
}

impl StoreKeys {
    /// Key holding the equipped slot of `kind`
    pub fn equipped(&self, kind: CosmeticKind) -> &'static str {
        match kind {
            CosmeticKind::Skin => self.skin,
            CosmeticKind::Theme => self.theme,
        }
    }
}

pub const MAZE_KEYS: StoreKeys = StoreKeys {
    coins: "totalCoins",
    high_score: "highScore",
    skin: "skin",
    theme: "theme",
};

pub const SHOOTER_KEYS: StoreKeys = StoreKeys {
    coins: "coins",
    high_score: "highScore",
    skin: "equippedSkin",
    theme: "theme",
};

pub const PENALTY_KEYS: StoreKeys = StoreKeys {
    coins: "coins",
    high_score: "highScore",
    skin: "kit",
    theme: "theme",
};

/// Saved counts go through `i32`; larger balances saturate
fn stored(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Cosmetic family
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CosmeticKind {
    /// Player character or ship look
    Skin,
    /// Board colours
    Theme,
}

impl CosmeticKind {
    fn prefix(self) -> &'static str {
        match self {
            CosmeticKind::Skin => "skin",
            CosmeticKind::Theme => "theme",
        }
    }
}

/// One unlockable, addressed by kind and slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cosmetic {
    pub kind: CosmeticKind,
    pub slot: usize,
}

impl Cosmetic {
    pub const fn new(kind: CosmeticKind, slot: usize) -> Self {
        Self { kind, slot }
    }

    /// Store key of the "unlocked" flag, e.g. `skin_3`
    pub fn key(&self) -> String {
        format!("{}_{}", self.kind.prefix(), self.slot)
    }

    /// Slot 0 of every kind is owned from the start
    pub fn is_default(&self) -> bool {
        self.slot == 0
    }
}

/// In-memory progression
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub coins: u32,
    pub high_score: u32,
    pub unlocked: BTreeSet<Cosmetic>,
    pub skin: usize,
    pub theme: usize,
}

impl ProgressionRecord {
    pub fn owns(&self, item: Cosmetic) -> bool {
        item.is_default() || self.unlocked.contains(&item)
    }

    pub fn equipped(&self, kind: CosmeticKind) -> usize {
        match kind {
            CosmeticKind::Skin => self.skin,
            CosmeticKind::Theme => self.theme,
        }
    }

    /// Would `score` become the new high score
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.high_score
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    Coins,
    HighScore,
    Equipped(CosmeticKind),
    Unlocked(Cosmetic),
}

/// Progression bound to its store
#[derive(Debug)]
pub struct Progression<S: KeyValueStore> {
    store: S,
    keys: StoreKeys,
    record: ProgressionRecord,
    pending: BTreeSet<Pending>,
}

impl<S: KeyValueStore> Progression<S> {
    /// Read the record under `keys`; `slots` lists how many slots each kind has
    pub fn load(store: S, keys: StoreKeys, slots: &[(CosmeticKind, usize)]) -> Self {
        let mut record = ProgressionRecord {
            coins: store.get_int(keys.coins, 0).max(0) as u32,
            high_score: store.get_int(keys.high_score, 0).max(0) as u32,
            ..Default::default()
        };
        for &(kind, count) in slots {
            for slot in 1..count {
                let item = Cosmetic::new(kind, slot);
                if store.get_bool(&item.key(), false) {
                    record.unlocked.insert(item);
                }
            }
            let equipped = store.get_int(keys.equipped(kind), 0).max(0) as usize;
            // A stale or foreign index falls back to the free slot
            let equipped = if equipped < count && record.owns(Cosmetic::new(kind, equipped)) {
                equipped
            } else {
                0
            };
            match kind {
                CosmeticKind::Skin => record.skin = equipped,
                CosmeticKind::Theme => record.theme = equipped,
            }
        }
        log::info!(
            "progression loaded: {} coins, high score {}, {} unlocks",
            record.coins,
            record.high_score,
            record.unlocked.len()
        );
        Self {
            store,
            keys,
            record,
            pending: BTreeSet::new(),
        }
    }

    pub fn record(&self) -> &ProgressionRecord {
        &self.record
    }

    pub fn keys(&self) -> StoreKeys {
        self.keys
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn add_coins(&mut self, coins: u32) {
        if coins == 0 {
            return;
        }
        self.record.coins = self.record.coins.saturating_add(coins);
        self.pending.insert(Pending::Coins);
    }

    /// Returns true when `score` is a new high score
    pub fn record_score(&mut self, score: u32) -> bool {
        if !self.record.qualifies(score) {
            return false;
        }
        self.record.high_score = score;
        self.pending.insert(Pending::HighScore);
        log::info!("new high score {score}");
        true
    }

    /// Spend `price` coins to unlock `item`; false if unaffordable or already owned
    pub fn purchase(&mut self, item: Cosmetic, price: u32) -> bool {
        if self.record.owns(item) || self.record.coins < price {
            return false;
        }
        self.record.coins -= price;
        self.record.unlocked.insert(item);
        self.pending.insert(Pending::Coins);
        self.pending.insert(Pending::Unlocked(item));
        log::info!("purchased {} for {price} coins", item.key());
        true
    }

    /// Equip an owned item
    pub fn equip(&mut self, item: Cosmetic) -> bool {
        if !self.record.owns(item) {
            return false;
        }
        let slot = match item.kind {
            CosmeticKind::Skin => &mut self.record.skin,
            CosmeticKind::Theme => &mut self.record.theme,
        };
        if *slot != item.slot {
            *slot = item.slot;
            self.pending.insert(Pending::Equipped(item.kind));
        }
        true
    }

    /// Write every pending key; returns the number of writes issued
    pub fn flush(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        for key in &pending {
            match *key {
                Pending::Coins => self.store.put_int(self.keys.coins, stored(self.record.coins)),
                Pending::HighScore => self
                    .store
                    .put_int(self.keys.high_score, stored(self.record.high_score)),
                Pending::Equipped(kind) => self
                    .store
                    .put_int(self.keys.equipped(kind), self.record.equipped(kind) as i32),
                Pending::Unlocked(item) => self.store.put_bool(&item.key(), true),
            }
        }
        pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    const SLOTS: [(CosmeticKind, usize); 2] = [(CosmeticKind::Skin, 8), (CosmeticKind::Theme, 4)];

    #[test]
    fn test_load_defaults() {
        let p = Progression::load(MemoryStore::new(), MAZE_KEYS, &SLOTS);
        assert_eq!(p.record().coins, 0);
        assert!(p.record().owns(Cosmetic::new(CosmeticKind::Skin, 0)));
        assert!(!p.record().owns(Cosmetic::new(CosmeticKind::Skin, 1)));
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_load_reads_keys() {
        let mut store = MemoryStore::new();
        store.put_int("totalCoins", 120);
        store.put_int("highScore", 900);
        store.put_bool("skin_3", true);
        store.put_int("skin", 3);
        // Equipped but never bought: ignored
        store.put_int("theme", 2);

        let p = Progression::load(store, MAZE_KEYS, &SLOTS);
        assert_eq!(p.record().coins, 120);
        assert_eq!(p.record().high_score, 900);
        assert_eq!(p.record().skin, 3);
        assert_eq!(p.record().theme, 0);
    }

    #[test]
    fn test_purchase_and_flush() {
        let mut p = Progression::load(MemoryStore::new(), MAZE_KEYS, &SLOTS);
        let item = Cosmetic::new(CosmeticKind::Theme, 2);
        assert!(!p.purchase(item, 100));

        p.add_coins(60);
        p.add_coins(60);
        assert!(p.purchase(item, 100));
        assert!(!p.purchase(item, 100));
        assert!(p.equip(item));
        assert_eq!(p.record().coins, 20);

        // totalCoins, theme_2, theme: three writes no matter how many mutations
        assert_eq!(p.flush(), 3);
        assert_eq!(p.flush(), 0);
        assert_eq!(p.store().get_int("totalCoins", 0), 20);
        assert!(p.store().get_bool("theme_2", false));
        assert_eq!(p.store().get_int("theme", 0), 2);
    }

    #[test]
    fn test_high_score_only_increases() {
        let mut p = Progression::load(MemoryStore::new(), MAZE_KEYS, &SLOTS);
        assert!(p.record_score(500));
        assert!(!p.record_score(400));
        assert!(!p.record_score(500));
        assert_eq!(p.record().high_score, 500);
    }

    #[test]
    fn test_each_game_uses_its_own_keys() {
        let mut store = MemoryStore::new();
        store.put_int("totalCoins", 70);
        store.put_int("coins", 900);
        store.put_bool("skin_2", true);
        store.put_int("equippedSkin", 2);
        store.put_int("skin", 1);

        let maze = Progression::load(store.clone(), MAZE_KEYS, &SLOTS);
        assert_eq!(maze.record().coins, 70);
        // skin_1 never bought
        assert_eq!(maze.record().skin, 0);

        let mut shooter = Progression::load(store, SHOOTER_KEYS, &[(CosmeticKind::Skin, 6)]);
        assert_eq!(shooter.record().coins, 900);
        assert_eq!(shooter.record().skin, 2);

        shooter.add_coins(1);
        assert!(shooter.equip(Cosmetic::new(CosmeticKind::Skin, 0)));
        shooter.flush();
        assert_eq!(shooter.store().get_int("coins", 0), 901);
        assert_eq!(shooter.store().get_int("equippedSkin", -1), 0);
        assert_eq!(shooter.store().get_int("totalCoins", 0), 70);
    }

    #[test]
    fn test_huge_balance_saturates_instead_of_wrapping() {
        let mut p = Progression::load(MemoryStore::new(), MAZE_KEYS, &SLOTS);
        p.add_coins(i32::MAX as u32);
        p.add_coins(10);
        p.record_score(u32::MAX);
        p.flush();
        assert_eq!(p.store().get_int("totalCoins", 0), i32::MAX);
        assert_eq!(p.store().get_int("highScore", 0), i32::MAX);

        let reloaded = Progression::load(p.store().clone(), MAZE_KEYS, &SLOTS);
        assert_eq!(reloaded.record().coins, i32::MAX as u32);
    }

    #[test]
    fn test_equip_requires_ownership() {
        let mut p = Progression::load(MemoryStore::new(), MAZE_KEYS, &SLOTS);
        assert!(!p.equip(Cosmetic::new(CosmeticKind::Skin, 5)));
        assert!(p.equip(Cosmetic::new(CosmeticKind::Skin, 0)));
        assert!(!p.is_dirty());
    }
}
