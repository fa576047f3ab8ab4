use crate::{
    data::items::{EquipSlot, Inventory, Item, ItemKind},
    ecs::components::CombatStats,
};

/// The player's half of a fight: base stats plus the pack, borrowed for the
/// length of one call. Totals always include equipped gear.
pub struct PlayerSide<'a> {
    pub stats: &'a mut CombatStats,
    pub inventory: &'a mut Inventory,
}

impl<'a> PlayerSide<'a> {
    pub fn new(stats: &'a mut CombatStats, inventory: &'a mut Inventory) -> Self {
        Self { stats, inventory }
    }

    pub fn hp(&self) -> i32 {
        self.stats.hp
    }

    pub fn max_hp(&self) -> i32 {
        self.stats.max_hp + self.inventory.equipment_bonus().health
    }

    pub fn attack_power(&self) -> i32 {
        self.stats.power + self.inventory.equipment_bonus().attack
    }

    pub fn defense_power(&self) -> i32 {
        self.stats.defense + self.inventory.equipment_bonus().defense
    }

    pub fn is_alive(&self) -> bool {
        self.stats.hp > 0
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.stats.hp = (self.stats.hp - damage).max(0);
    }

    /// Returns how much was actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.stats.hp;
        self.stats.hp = (self.stats.hp + amount).min(self.max_hp());
        self.stats.hp - before
    }

    pub fn pickup(&mut self, item: Item) -> Result<String, Item> {
        let name = item.name();
        if self.inventory.is_full() {
            return Err(item);
        }
        self.inventory.add(item);
        Ok(format!("Picked up {name}"))
    }

    /// Potions and gold are consumed, equipment is put on. Always yields a
    /// line for the log, including for an empty slot.
    pub fn use_item(&mut self, index: usize) -> String {
        let Some(item) = self.inventory.get(index).cloned() else {
            return "Cannot use this item".to_string();
        };
        match item.kind {
            ItemKind::Potion => {
                self.inventory.remove(index);
                let healed = self.heal(item.stats.heal);
                format!("Used {}! Healed {healed} HP.", item.name())
            }
            ItemKind::Gold => {
                self.inventory.remove(index);
                self.inventory.gold += item.stats.gold;
                format!("Gained {} gold!", item.stats.gold)
            }
            ItemKind::Sword | ItemKind::Shield | ItemKind::Armor | ItemKind::Helmet => {
                if self.equip(index) {
                    format!("Equipped {}.", item.name())
                } else {
                    format!("Cannot equip {}.", item.name())
                }
            }
        }
    }

    /// Equips and keeps hp consistent: a player at full health stays at full
    /// health when max hp rises, and hp never exceeds the new maximum.
    pub fn equip(&mut self, index: usize) -> bool {
        let old_max = self.max_hp();
        if !self.inventory.equip(index) {
            return false;
        }
        self.settle_hp(old_max);
        true
    }

    pub fn unequip(&mut self, slot: EquipSlot) -> bool {
        let old_max = self.max_hp();
        if !self.inventory.unequip(slot) {
            return false;
        }
        self.settle_hp(old_max);
        true
    }

    fn settle_hp(&mut self, old_max: i32) {
        let new_max = self.max_hp();
        if self.stats.hp == old_max && new_max > old_max {
            self.stats.hp = new_max;
        } else if self.stats.hp > new_max {
            self.stats.hp = new_max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::Rarity;
    use bracket_random::prelude::RandomNumberGenerator;

    fn stats(hp: i32) -> CombatStats {
        CombatStats {
            max_hp: 100,
            hp,
            power: 10,
            defense: 0,
        }
    }

    #[test]
    fn potion_heals_up_to_max_and_is_consumed() {
        let mut rng = RandomNumberGenerator::seeded(1);
        let mut stats = stats(90);
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Potion, &mut rng));
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        assert_eq!(player.use_item(0), "Used Health Potion! Healed 10 HP.");
        assert_eq!(player.hp(), 100);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn gold_goes_to_the_purse() {
        let mut rng = RandomNumberGenerator::seeded(2);
        let mut stats = stats(50);
        let mut inventory = Inventory::default();
        let gold = Item::common(ItemKind::Gold, &mut rng);
        let coins = gold.stats.gold;
        inventory.add(gold);
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        player.use_item(0);
        assert_eq!(player.inventory.gold, coins);
        assert!(player.inventory.is_empty());
    }

    #[test]
    fn equipment_adds_to_totals() {
        let mut rng = RandomNumberGenerator::seeded(3);
        let mut stats = stats(100);
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Sword, &mut rng));
        inventory.add(Item::new(ItemKind::Armor, Rarity::Rare, &mut rng));
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        assert_eq!(player.use_item(0), "Equipped Sword.");
        assert_eq!(player.attack_power(), 15);
        assert!(player.equip(0));
        assert_eq!(player.defense_power(), 8);
        assert_eq!(player.max_hp(), 120);
        assert_eq!(player.hp(), 120, "full health follows the raised maximum");
    }

    #[test]
    fn removing_health_gear_clamps_hp() {
        let mut rng = RandomNumberGenerator::seeded(4);
        let mut stats = stats(100);
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Armor, &mut rng));
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        assert!(player.equip(0));
        assert_eq!(player.hp(), 110);
        assert!(player.unequip(EquipSlot::Body));
        assert_eq!(player.hp(), 100);
    }

    #[test]
    fn bad_slot_is_reported_not_fatal() {
        let mut stats = stats(40);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        assert_eq!(player.use_item(7), "Cannot use this item");
        assert_eq!(player.hp(), 40);
    }

    #[test]
    fn pickup_refuses_when_full() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let mut stats = stats(40);
        let mut inventory = Inventory::with_capacity(1);
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        assert!(player.pickup(Item::common(ItemKind::Potion, &mut rng)).is_ok());
        let refused = player.pickup(Item::common(ItemKind::Shield, &mut rng));
        assert_eq!(refused.map_err(|item| item.kind), Err(ItemKind::Shield));
    }
}
