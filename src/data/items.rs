use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RGB, WHITE, YELLOW};

pub const DEFAULT_INVENTORY_CAPACITY: usize = 20;
pub const POTION_BASE_HEAL: i32 = 30;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    Potion,
    Sword,
    Shield,
    Armor,
    Helmet,
    Gold,
}

impl ItemKind {
    pub const ALL: [ItemKind; 6] = [
        ItemKind::Potion,
        ItemKind::Sword,
        ItemKind::Shield,
        ItemKind::Armor,
        ItemKind::Helmet,
        ItemKind::Gold,
    ];

    pub fn base_name(self) -> &'static str {
        match self {
            ItemKind::Potion => "Health Potion",
            ItemKind::Sword => "Sword",
            ItemKind::Shield => "Shield",
            ItemKind::Armor => "Armor",
            ItemKind::Helmet => "Helmet",
            ItemKind::Gold => "Gold Coins",
        }
    }

    pub fn slot(self) -> Option<EquipSlot> {
        match self {
            ItemKind::Sword => Some(EquipSlot::Weapon),
            ItemKind::Shield => Some(EquipSlot::Shield),
            ItemKind::Armor => Some(EquipSlot::Body),
            ItemKind::Helmet => Some(EquipSlot::Head),
            ItemKind::Potion | ItemKind::Gold => None,
        }
    }

    fn base_value(self) -> i32 {
        match self {
            ItemKind::Potion => 10,
            ItemKind::Sword => 25,
            ItemKind::Shield => 20,
            ItemKind::Armor => 30,
            ItemKind::Helmet => 15,
            ItemKind::Gold => 0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    fn prefix(self) -> &'static str {
        match self {
            Rarity::Common => "",
            Rarity::Uncommon => "Fine ",
            Rarity::Rare => "Superior ",
            Rarity::Epic => "Masterwork ",
            Rarity::Legendary => "Legendary ",
        }
    }

    fn stat_multiplier(self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 1.5,
            Rarity::Rare => 2.0,
            Rarity::Epic => 2.5,
            Rarity::Legendary => 3.0,
        }
    }

    fn value_multiplier(self) -> f32 {
        match self {
            Rarity::Common => 1.0,
            Rarity::Uncommon => 2.0,
            Rarity::Rare => 4.0,
            Rarity::Epic => 8.0,
            Rarity::Legendary => 15.0,
        }
    }

    pub fn color(self) -> RGB {
        match self {
            Rarity::Common => RGB::named(WHITE),
            Rarity::Uncommon => RGB::from_u8(126, 211, 33),
            Rarity::Rare => RGB::from_u8(96, 165, 255),
            Rarity::Epic => RGB::from_u8(193, 126, 255),
            Rarity::Legendary => RGB::named(YELLOW),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EquipSlot {
    Weapon,
    Shield,
    Head,
    Body,
}

impl EquipSlot {
    pub const ALL: [EquipSlot; 4] = [
        EquipSlot::Weapon,
        EquipSlot::Shield,
        EquipSlot::Head,
        EquipSlot::Body,
    ];

    fn index(self) -> usize {
        match self {
            EquipSlot::Weapon => 0,
            EquipSlot::Shield => 1,
            EquipSlot::Head => 2,
            EquipSlot::Body => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EquipSlot::Weapon => "weapon",
            EquipSlot::Shield => "shield",
            EquipSlot::Head => "head",
            EquipSlot::Body => "body",
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemStats {
    pub heal: i32,
    pub attack: i32,
    pub defense: i32,
    pub health: i32,
    pub gold: i32,
}

impl ItemStats {
    fn roll(kind: ItemKind, rarity: Rarity, rng: &mut RandomNumberGenerator) -> Self {
        let scale = |base: i32| (base as f32 * rarity.stat_multiplier()) as i32;
        match kind {
            ItemKind::Potion => Self {
                heal: scale(POTION_BASE_HEAL),
                ..Self::default()
            },
            ItemKind::Sword => Self {
                attack: scale(5),
                ..Self::default()
            },
            ItemKind::Shield => Self {
                defense: scale(3),
                ..Self::default()
            },
            ItemKind::Armor => Self {
                defense: scale(4),
                health: scale(10),
                ..Self::default()
            },
            ItemKind::Helmet => Self {
                defense: scale(2),
                health: scale(5),
                ..Self::default()
            },
            ItemKind::Gold => Self {
                gold: rng.range(5, 21),
                ..Self::default()
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub kind: ItemKind,
    pub rarity: Rarity,
    pub stats: ItemStats,
}

impl Item {
    pub fn new(kind: ItemKind, rarity: Rarity, rng: &mut RandomNumberGenerator) -> Self {
        Self {
            kind,
            rarity,
            stats: ItemStats::roll(kind, rarity, rng),
        }
    }

    pub fn common(kind: ItemKind, rng: &mut RandomNumberGenerator) -> Self {
        Self::new(kind, Rarity::Common, rng)
    }

    pub fn name(&self) -> String {
        format!("{}{}", self.rarity.prefix(), self.kind.base_name())
    }

    pub fn description(&self) -> String {
        match self.kind {
            ItemKind::Potion => format!("Restores {} HP", self.stats.heal),
            ItemKind::Gold => format!("Worth {} coins", self.stats.gold),
            ItemKind::Sword | ItemKind::Shield | ItemKind::Armor | ItemKind::Helmet => {
                let mut parts = Vec::new();
                if self.stats.attack > 0 {
                    parts.push(format!("+{} Attack", self.stats.attack));
                }
                if self.stats.defense > 0 {
                    parts.push(format!("+{} Defense", self.stats.defense));
                }
                if self.stats.health > 0 {
                    parts.push(format!("+{} Health", self.stats.health));
                }
                parts.join(", ")
            }
        }
    }

    pub fn value(&self) -> i32 {
        let base = match self.kind {
            ItemKind::Gold => self.stats.gold,
            other => other.base_value(),
        };
        (base as f32 * self.rarity.value_multiplier()) as i32
    }

    pub fn slot(&self) -> Option<EquipSlot> {
        self.kind.slot()
    }

    pub fn is_equipment(&self) -> bool {
        self.slot().is_some()
    }
}

fn pick<T: Copy>(rng: &mut RandomNumberGenerator, options: &[T]) -> T {
    options[rng.range(0, options.len())]
}

fn weighted_rarity(rng: &mut RandomNumberGenerator) -> Rarity {
    const WEIGHTS: [(Rarity, i32); 5] = [
        (Rarity::Common, 60),
        (Rarity::Uncommon, 25),
        (Rarity::Rare, 10),
        (Rarity::Epic, 4),
        (Rarity::Legendary, 1),
    ];
    let mut roll = rng.range(0, 100);
    for (rarity, weight) in WEIGHTS {
        if roll < weight {
            return rarity;
        }
        roll -= weight;
    }
    Rarity::Common
}

/// Any kind, with the rarity pool skewed towards common finds.
pub fn random_item(rng: &mut RandomNumberGenerator) -> Item {
    const RARITY_POOL: [Rarity; 8] = [
        Rarity::Common,
        Rarity::Common,
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
    ];
    let kind = pick(rng, &ItemKind::ALL);
    let rarity = pick(rng, &RARITY_POOL);
    Item::new(kind, rarity, rng)
}

/// Common potion, sword or shield: the pool for level rewards and the
/// special skill's scavenge branch.
pub fn basic_find(rng: &mut RandomNumberGenerator) -> Item {
    let kind = pick(rng, &[ItemKind::Potion, ItemKind::Sword, ItemKind::Shield]);
    Item::common(kind, rng)
}

/// 30% of kills drop something; most drops are consumables.
pub fn zombie_loot(rng: &mut RandomNumberGenerator) -> Option<Item> {
    if rng.range(0, 100) >= 30 {
        return None;
    }
    let kind = if rng.range(0, 100) < 60 {
        pick(rng, &[ItemKind::Potion, ItemKind::Gold])
    } else {
        pick(
            rng,
            &[
                ItemKind::Sword,
                ItemKind::Shield,
                ItemKind::Armor,
                ItemKind::Helmet,
            ],
        )
    };
    let rarity = weighted_rarity(rng);
    Some(Item::new(kind, rarity, rng))
}

pub fn chest_contents(rng: &mut RandomNumberGenerator) -> Vec<Item> {
    const CHEST_KINDS: [ItemKind; 5] = [
        ItemKind::Potion,
        ItemKind::Sword,
        ItemKind::Shield,
        ItemKind::Armor,
        ItemKind::Gold,
    ];
    let count = rng.range(1, 4);
    (0..count)
        .map(|_| {
            let kind = pick(rng, &CHEST_KINDS);
            Item::common(kind, rng)
        })
        .collect()
}

/// Carried items plus the four equipment slots and the coin purse.
#[derive(Clone, Debug)]
pub struct Inventory {
    items: Vec<Item>,
    capacity: usize,
    equipped: [Option<Item>; 4],
    pub gold: i32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_INVENTORY_CAPACITY)
    }
}

impl Inventory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            equipped: Default::default(),
            gold: 0,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    pub fn add(&mut self, item: Item) -> bool {
        if self.is_full() {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<Item> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn first_of(&self, kind: ItemKind) -> Option<usize> {
        self.items.iter().position(|item| item.kind == kind)
    }

    pub fn equipped(&self, slot: EquipSlot) -> Option<&Item> {
        self.equipped[slot.index()].as_ref()
    }

    /// Moves the item at `index` into its slot; whatever was there goes back
    /// into the pack. Non-equipment and bad indices are refused.
    pub fn equip(&mut self, index: usize) -> bool {
        let Some(slot) = self.items.get(index).and_then(Item::slot) else {
            return false;
        };
        let item = self.items.remove(index);
        if let Some(previous) = self.equipped[slot.index()].replace(item) {
            self.items.push(previous);
        }
        true
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> bool {
        if self.is_full() {
            return false;
        }
        match self.equipped[slot.index()].take() {
            Some(item) => {
                self.items.push(item);
                true
            }
            None => false,
        }
    }

    pub fn equipment_bonus(&self) -> ItemStats {
        self.equipped
            .iter()
            .flatten()
            .fold(ItemStats::default(), |mut total, item| {
                total.attack += item.stats.attack;
                total.defense += item.stats.defense;
                total.health += item.stats.health;
                total
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> RandomNumberGenerator {
        RandomNumberGenerator::seeded(0x1234)
    }

    #[test]
    fn rarity_scales_stats_and_names() {
        let mut rng = rng();
        let common = Item::new(ItemKind::Armor, Rarity::Common, &mut rng);
        let epic = Item::new(ItemKind::Armor, Rarity::Epic, &mut rng);
        assert_eq!(common.stats.defense, 4);
        assert_eq!(common.stats.health, 10);
        assert_eq!(epic.stats.defense, 10);
        assert_eq!(epic.stats.health, 25);
        assert_eq!(epic.name(), "Masterwork Armor");
        assert_eq!(common.name(), "Armor");
        assert_eq!(epic.value(), 240);
        assert_eq!(common.description(), "+4 Defense, +10 Health");
    }

    #[test]
    fn gold_rolls_within_range() {
        let mut rng = rng();
        for _ in 0..100 {
            let gold = Item::common(ItemKind::Gold, &mut rng);
            assert!((5..=20).contains(&gold.stats.gold));
            assert!(!gold.is_equipment());
        }
    }

    #[test]
    fn inventory_respects_capacity() {
        let mut rng = rng();
        let mut inventory = Inventory::with_capacity(2);
        assert!(inventory.add(Item::common(ItemKind::Potion, &mut rng)));
        assert!(inventory.add(Item::common(ItemKind::Potion, &mut rng)));
        assert!(!inventory.add(Item::common(ItemKind::Sword, &mut rng)));
        assert_eq!(inventory.len(), 2);
        assert!(inventory.remove(5).is_none());
    }

    #[test]
    fn equipping_swaps_previous_item_back() {
        let mut rng = rng();
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Sword, &mut rng));
        inventory.add(Item::new(ItemKind::Sword, Rarity::Rare, &mut rng));
        assert!(inventory.equip(0));
        assert_eq!(inventory.equipment_bonus().attack, 5);
        assert!(inventory.equip(0));
        assert_eq!(inventory.equipment_bonus().attack, 10);
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory.items()[0].rarity, Rarity::Common);
    }

    #[test]
    fn potions_and_gold_cannot_be_equipped() {
        let mut rng = rng();
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Potion, &mut rng));
        assert!(!inventory.equip(0));
        assert!(!inventory.equip(3));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn unequip_needs_room() {
        let mut rng = rng();
        let mut inventory = Inventory::with_capacity(1);
        inventory.add(Item::common(ItemKind::Helmet, &mut rng));
        assert!(inventory.equip(0));
        inventory.add(Item::common(ItemKind::Potion, &mut rng));
        assert!(!inventory.unequip(EquipSlot::Head));
        inventory.remove(0);
        assert!(inventory.unequip(EquipSlot::Head));
        assert!(inventory.equipped(EquipSlot::Head).is_none());
        assert!(!inventory.unequip(EquipSlot::Weapon));
    }

    #[test]
    fn chest_contents_are_common_and_bounded() {
        let mut rng = rng();
        for _ in 0..50 {
            let contents = chest_contents(&mut rng);
            assert!((1..=3).contains(&contents.len()));
            assert!(contents.iter().all(|item| item.rarity == Rarity::Common));
            assert!(contents.iter().all(|item| item.kind != ItemKind::Helmet));
        }
    }
}
