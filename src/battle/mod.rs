//! Turn-based duel between the player and a single zombie.
//!
//! A session walks `AwaitingInput -> Resolving -> EnemyTurn -> AwaitingInput`
//! until one side drops, ending in `PlayerWon` or `PlayerLost`. The player's
//! stats are never stored here; every call borrows them through
//! [`PlayerSide`], so the resolver only owns the enemy snapshot and the
//! per-battle bookkeeping (log, defend flag, skill cooldowns).

mod player;

pub use player::PlayerSide;

use std::collections::VecDeque;

use bracket_random::prelude::RandomNumberGenerator;

use crate::{
    config::BattleConfig,
    data::items::{ItemKind, basic_find},
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattlePhase {
    Idle,
    AwaitingInput,
    Resolving,
    EnemyTurn,
    PlayerWon,
    PlayerLost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattleResult {
    PlayerWon,
    PlayerLost,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnOwner {
    Player,
    Enemy,
}

/// The four skill slots, bound to Q W E R.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Skill {
    Attack,
    Defend,
    Heal,
    Special,
}

impl Skill {
    pub const ALL: [Skill; 4] = [Skill::Attack, Skill::Defend, Skill::Heal, Skill::Special];

    pub fn name(self) -> &'static str {
        match self {
            Skill::Attack => "Attack",
            Skill::Defend => "Defend",
            Skill::Heal => "Heal",
            Skill::Special => "Special",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Skill::Attack => "Roll dice to attack",
            Skill::Defend => "Reduce next damage",
            Skill::Heal => "Use health potion",
            Skill::Special => "Special ability",
        }
    }

    pub fn hotkey(self) -> char {
        match self {
            Skill::Attack => 'Q',
            Skill::Defend => 'W',
            Skill::Heal => 'E',
            Skill::Special => 'R',
        }
    }

    fn index(self) -> usize {
        match self {
            Skill::Attack => 0,
            Skill::Defend => 1,
            Skill::Heal => 2,
            Skill::Special => 3,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BattleAction {
    Skill(Skill),
    UseItem(usize),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    Rejected,
}

/// What the battle knows about the zombie it is fighting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnemySnapshot {
    pub id: u32,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
}

impl EnemySnapshot {
    pub fn new(id: u32, name: impl Into<String>, hp: i32, attack: i32) -> Self {
        Self {
            id,
            name: name.into(),
            hp,
            max_hp: hp,
            attack,
        }
    }
}

/// Damage dealt by an enemy swing. Armor never fully negates a hit.
pub fn enemy_damage(attack: i32, roll: i32, defense: i32) -> i32 {
    (attack + roll - defense).max(1)
}

#[derive(Clone, Debug)]
pub struct BattleSession {
    enemy: EnemySnapshot,
    phase: BattlePhase,
    log: VecDeque<String>,
    defending: bool,
    result: Option<BattleResult>,
    cooldowns: [u32; 4],
}

pub struct BattleResolver {
    config: BattleConfig,
    session: Option<BattleSession>,
}

impl BattleResolver {
    pub fn new(config: BattleConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    pub fn start(&mut self, enemy: EnemySnapshot) {
        if let Some(current) = &self.session {
            log::warn!(
                "Battle with {} replaced by {} before it finished",
                current.enemy.name,
                enemy.name
            );
        }
        log::info!(
            "Battle started: {} (hp {}, attack {})",
            enemy.name,
            enemy.hp,
            enemy.attack
        );
        let mut session = BattleSession {
            phase: BattlePhase::AwaitingInput,
            log: VecDeque::with_capacity(self.config.log_capacity + 1),
            defending: false,
            result: None,
            cooldowns: [0; 4],
            enemy,
        };
        let opening = format!("Battle started with {}!", session.enemy.name);
        push_capped(&mut session.log, self.config.log_capacity, opening);
        self.session = Some(session);
    }

    /// Drops all battle state. Safe to call at any time, any number of times.
    pub fn end(&mut self) {
        if let Some(session) = self.session.take() {
            log::debug!("Battle with {} torn down", session.enemy.name);
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn phase(&self) -> BattlePhase {
        self.session
            .as_ref()
            .map_or(BattlePhase::Idle, |session| session.phase)
    }

    pub fn turn_owner(&self) -> Option<TurnOwner> {
        match self.phase() {
            BattlePhase::AwaitingInput | BattlePhase::Resolving => Some(TurnOwner::Player),
            BattlePhase::EnemyTurn => Some(TurnOwner::Enemy),
            BattlePhase::Idle | BattlePhase::PlayerWon | BattlePhase::PlayerLost => None,
        }
    }

    pub fn enemy(&self) -> Option<&EnemySnapshot> {
        self.session.as_ref().map(|session| &session.enemy)
    }

    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.session
            .iter()
            .flat_map(|session| session.log.iter().map(String::as_str))
    }

    pub fn is_defending(&self) -> bool {
        self.session.as_ref().is_some_and(|session| session.defending)
    }

    pub fn cooldown(&self, skill: Skill) -> u32 {
        self.session
            .as_ref()
            .map_or(0, |session| session.cooldowns[skill.index()])
    }

    pub fn result(&self) -> Option<BattleResult> {
        self.session.as_ref().and_then(|session| session.result)
    }

    /// Hands back the terminal result and closes the session. Returns `None`
    /// (and keeps the session) while the fight is still running.
    pub fn take_result(&mut self) -> Option<BattleResult> {
        let result = self.result()?;
        self.session = None;
        Some(result)
    }

    /// One player action. Anything outside the input window, an empty item
    /// slot, or a skill still cooling down is refused and the turn stays put.
    pub fn act(
        &mut self,
        action: BattleAction,
        player: &mut PlayerSide,
        rng: &mut RandomNumberGenerator,
    ) -> ActionOutcome {
        let capacity = self.config.log_capacity;
        let Some(session) = self.session.as_mut() else {
            return ActionOutcome::Rejected;
        };
        if session.phase != BattlePhase::AwaitingInput {
            return ActionOutcome::Rejected;
        }

        match action {
            BattleAction::UseItem(slot) => {
                if slot >= player.inventory.len() {
                    return ActionOutcome::Rejected;
                }
                session.tick_cooldowns();
                let line = player.use_item(slot);
                push_capped(&mut session.log, capacity, line);
            }
            BattleAction::Skill(skill) => {
                if session.cooldowns[skill.index()] > 0 {
                    let line = format!("{} is on cooldown!", skill.name());
                    push_capped(&mut session.log, capacity, line);
                    return ActionOutcome::Rejected;
                }
                session.tick_cooldowns();
                let line = match skill {
                    Skill::Attack => attack(session, player, &self.config, rng),
                    Skill::Defend => {
                        session.defending = true;
                        "Player defends! (Damage reduction next turn)".to_string()
                    }
                    Skill::Heal => heal(player),
                    Skill::Special => {
                        session.cooldowns[skill.index()] = self.config.special_cooldown;
                        special(player, rng)
                    }
                };
                push_capped(&mut session.log, capacity, line);
            }
        }

        session.phase = BattlePhase::Resolving;
        ActionOutcome::Accepted
    }

    /// Advances one step of the state machine and reports a result once the
    /// fight is decided.
    pub fn update(
        &mut self,
        player: &mut PlayerSide,
        rng: &mut RandomNumberGenerator,
    ) -> Option<BattleResult> {
        let capacity = self.config.log_capacity;
        let session = self.session.as_mut()?;
        match session.phase {
            BattlePhase::Idle | BattlePhase::AwaitingInput => None,
            BattlePhase::PlayerWon | BattlePhase::PlayerLost => session.result,
            BattlePhase::Resolving => {
                if session.enemy.hp <= 0 {
                    let line = format!("{} defeated!", session.enemy.name);
                    push_capped(&mut session.log, capacity, line);
                    log::info!("Player defeated {}", session.enemy.name);
                    return Some(session.finish(BattleResult::PlayerWon));
                }
                let line = enemy_attack(session, player, &self.config, rng);
                push_capped(&mut session.log, capacity, line);
                session.phase = BattlePhase::EnemyTurn;
                None
            }
            BattlePhase::EnemyTurn => {
                if !player.is_alive() {
                    push_capped(&mut session.log, capacity, "Player defeated!".to_string());
                    log::info!("Player fell to {}", session.enemy.name);
                    return Some(session.finish(BattleResult::PlayerLost));
                }
                session.phase = BattlePhase::AwaitingInput;
                None
            }
        }
    }

    /// Runs `update` until the player has to choose again or the battle ends.
    pub fn resolve_turn(
        &mut self,
        player: &mut PlayerSide,
        rng: &mut RandomNumberGenerator,
    ) -> Option<BattleResult> {
        loop {
            if let Some(result) = self.update(player, rng) {
                return Some(result);
            }
            if matches!(self.phase(), BattlePhase::AwaitingInput | BattlePhase::Idle) {
                return None;
            }
        }
    }
}

impl BattleSession {
    fn tick_cooldowns(&mut self) {
        for cooldown in &mut self.cooldowns {
            *cooldown = cooldown.saturating_sub(1);
        }
    }

    fn finish(&mut self, result: BattleResult) -> BattleResult {
        self.phase = match result {
            BattleResult::PlayerWon => BattlePhase::PlayerWon,
            BattleResult::PlayerLost => BattlePhase::PlayerLost,
        };
        self.result = Some(result);
        result
    }
}

fn push_capped(log: &mut VecDeque<String>, capacity: usize, line: String) {
    log.push_back(line);
    while log.len() > capacity {
        log.pop_front();
    }
}

fn roll(config: &BattleConfig, rng: &mut RandomNumberGenerator) -> i32 {
    rng.range(config.dice_min, config.dice_max + 1)
}

fn attack(
    session: &mut BattleSession,
    player: &PlayerSide,
    config: &BattleConfig,
    rng: &mut RandomNumberGenerator,
) -> String {
    let dice = roll(config, rng);
    let damage = player.attack_power() + dice;
    session.enemy.hp = (session.enemy.hp - damage).max(0);
    format!("Player attacks! (Roll: {dice}) Damage: {damage}")
}

// A missing potion still spends the turn.
fn heal(player: &mut PlayerSide) -> String {
    match player.inventory.first_of(ItemKind::Potion) {
        Some(slot) => player.use_item(slot),
        None => "No potions available!".to_string(),
    }
}

// The focus branch has no mechanical effect yet.
fn special(player: &mut PlayerSide, rng: &mut RandomNumberGenerator) -> String {
    if rng.range(0, 100) < 50 {
        return "Player focuses! Next attack deals extra damage!".to_string();
    }
    let item = basic_find(rng);
    let name = item.name();
    match player.pickup(item) {
        Ok(_) => format!("Found {name}!"),
        Err(_) => "Inventory full!".to_string(),
    }
}

fn enemy_attack(
    session: &mut BattleSession,
    player: &mut PlayerSide,
    config: &BattleConfig,
    rng: &mut RandomNumberGenerator,
) -> String {
    let dice = roll(config, rng);
    let bonus = if session.defending {
        config.defend_bonus
    } else {
        0
    };
    session.defending = false;
    let damage = enemy_damage(session.enemy.attack, dice, player.defense_power() + bonus);
    player.take_damage(damage);
    if bonus > 0 {
        format!(
            "{} attacks! (Roll: {dice}) Blocked some damage! Took {damage}",
            session.enemy.name
        )
    } else {
        format!(
            "{} attacks! (Roll: {dice}) Damage: {damage}",
            session.enemy.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data::items::{Inventory, Item},
        ecs::components::CombatStats,
    };

    fn fixed_dice(value: i32) -> BattleConfig {
        BattleConfig {
            dice_min: value,
            dice_max: value,
            ..BattleConfig::default()
        }
    }

    fn stats(hp: i32, power: i32, defense: i32) -> CombatStats {
        CombatStats {
            max_hp: hp,
            hp,
            power,
            defense,
        }
    }

    fn zombie(hp: i32, attack: i32) -> EnemySnapshot {
        EnemySnapshot::new(1, "Zombie (Lv.1)", hp, attack)
    }

    #[test]
    fn enemy_damage_never_drops_below_one() {
        assert_eq!(enemy_damage(8, 1, 50), 1);
        assert_eq!(enemy_damage(8, 6, 14), 1);
        assert_eq!(enemy_damage(8, 6, 4), 10);
    }

    #[test]
    fn heavy_armor_still_takes_one_damage_per_swing() {
        let mut rng = RandomNumberGenerator::seeded(1);
        let mut stats = stats(100, 0, 50);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(1000, 8));
        for turn in 1..=5 {
            battle.act(BattleAction::Skill(Skill::Defend), &mut player, &mut rng);
            assert_eq!(battle.resolve_turn(&mut player, &mut rng), None);
            assert_eq!(player.hp(), 100 - turn);
        }
    }

    #[test]
    fn one_attack_finishes_a_weak_zombie() {
        for seed in 0..50 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let mut stats = stats(100, 10, 0);
            let mut inventory = Inventory::default();
            let mut player = PlayerSide::new(&mut stats, &mut inventory);
            let mut battle = BattleResolver::new(BattleConfig::default());
            battle.start(zombie(5, 8));
            assert_eq!(
                battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng),
                ActionOutcome::Accepted
            );
            assert_eq!(
                battle.resolve_turn(&mut player, &mut rng),
                Some(BattleResult::PlayerWon)
            );
            assert_eq!(battle.enemy().map(|enemy| enemy.hp), Some(0));
            assert_eq!(player.hp(), 100, "the zombie never got a swing");
        }
    }

    #[test]
    fn defend_covers_exactly_one_enemy_attack() {
        let mut rng = RandomNumberGenerator::seeded(2);
        let mut stats = stats(100, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(fixed_dice(3));
        battle.start(zombie(1000, 8));

        battle.act(BattleAction::Skill(Skill::Defend), &mut player, &mut rng);
        assert!(battle.is_defending());
        battle.resolve_turn(&mut player, &mut rng);
        assert!(!battle.is_defending());
        assert_eq!(player.hp(), 100 - 6);

        battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng);
        battle.resolve_turn(&mut player, &mut rng);
        assert_eq!(player.hp(), 100 - 6 - 11);
    }

    #[test]
    fn phases_step_through_the_enemy_turn() {
        let mut rng = RandomNumberGenerator::seeded(3);
        let mut stats = stats(100, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        assert_eq!(battle.phase(), BattlePhase::Idle);
        battle.start(zombie(50, 8));
        assert_eq!(battle.turn_owner(), Some(TurnOwner::Player));

        battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng);
        assert_eq!(battle.phase(), BattlePhase::Resolving);
        assert_eq!(
            battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng),
            ActionOutcome::Rejected,
            "only one action per turn"
        );
        assert_eq!(battle.update(&mut player, &mut rng), None);
        assert_eq!(battle.turn_owner(), Some(TurnOwner::Enemy));
        assert!(player.hp() < 100);
        assert_eq!(battle.update(&mut player, &mut rng), None);
        assert_eq!(battle.phase(), BattlePhase::AwaitingInput);
    }

    #[test]
    fn missing_potion_still_spends_the_turn() {
        let mut rng = RandomNumberGenerator::seeded(4);
        let mut stats = stats(100, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(50, 8));
        assert_eq!(
            battle.act(BattleAction::Skill(Skill::Heal), &mut player, &mut rng),
            ActionOutcome::Accepted
        );
        assert!(battle.log().any(|line| line == "No potions available!"));
        battle.update(&mut player, &mut rng);
        assert_eq!(battle.phase(), BattlePhase::EnemyTurn);
        assert!(player.hp() < 100);
    }

    #[test]
    fn heal_uses_the_first_potion() {
        let mut rng = RandomNumberGenerator::seeded(5);
        let mut stats = stats(100, 1, 0);
        stats.hp = 40;
        let mut inventory = Inventory::default();
        inventory.add(Item::common(ItemKind::Sword, &mut rng));
        inventory.add(Item::common(ItemKind::Potion, &mut rng));
        inventory.add(Item::common(ItemKind::Potion, &mut rng));
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(50, 8));
        battle.act(BattleAction::Skill(Skill::Heal), &mut player, &mut rng);
        assert_eq!(player.hp(), 70);
        assert_eq!(player.inventory.len(), 2);
        assert_eq!(player.inventory.items()[0].kind, ItemKind::Sword);
    }

    #[test]
    fn special_cools_down_for_two_player_turns() {
        let mut rng = RandomNumberGenerator::seeded(6);
        let mut stats = stats(1000, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(1000, 1));

        let special = BattleAction::Skill(Skill::Special);
        let attack = BattleAction::Skill(Skill::Attack);
        assert_eq!(battle.act(special, &mut player, &mut rng), ActionOutcome::Accepted);
        battle.resolve_turn(&mut player, &mut rng);

        assert_eq!(battle.act(special, &mut player, &mut rng), ActionOutcome::Rejected);
        assert_eq!(battle.phase(), BattlePhase::AwaitingInput);
        assert!(battle.log().any(|line| line == "Special is on cooldown!"));
        battle.act(attack, &mut player, &mut rng);
        battle.resolve_turn(&mut player, &mut rng);

        assert_eq!(battle.act(special, &mut player, &mut rng), ActionOutcome::Rejected);
        battle.act(attack, &mut player, &mut rng);
        battle.resolve_turn(&mut player, &mut rng);

        assert_eq!(battle.cooldown(Skill::Special), 0);
        assert_eq!(battle.act(special, &mut player, &mut rng), ActionOutcome::Accepted);
    }

    #[test]
    fn special_either_focuses_or_finds_loot() {
        for seed in 0..40 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let mut stats = stats(100, 1, 0);
            let mut inventory = Inventory::with_capacity(1);
            let mut player = PlayerSide::new(&mut stats, &mut inventory);
            let mut battle = BattleResolver::new(BattleConfig::default());
            battle.start(zombie(100, 1));
            battle.act(BattleAction::Skill(Skill::Special), &mut player, &mut rng);
            let last = battle.log().last().map(str::to_string).unwrap_or_default();
            if last.starts_with("Found") {
                assert_eq!(player.inventory.len(), 1);
            } else {
                assert!(last.starts_with("Player focuses!"), "unexpected line {last}");
                assert!(player.inventory.is_empty());
            }
        }
    }

    #[test]
    fn full_pack_reports_instead_of_dropping() {
        let mut saw_full = false;
        for seed in 0..40 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let mut stats = stats(100, 1, 0);
            let mut inventory = Inventory::with_capacity(1);
            inventory.add(Item::common(ItemKind::Gold, &mut rng));
            let mut player = PlayerSide::new(&mut stats, &mut inventory);
            let mut battle = BattleResolver::new(BattleConfig::default());
            battle.start(zombie(100, 1));
            battle.act(BattleAction::Skill(Skill::Special), &mut player, &mut rng);
            assert_eq!(player.inventory.len(), 1);
            saw_full |= battle.log().any(|line| line == "Inventory full!");
        }
        assert!(saw_full);
    }

    #[test]
    fn bad_item_slot_is_a_no_op() {
        let mut rng = RandomNumberGenerator::seeded(7);
        let mut stats = stats(100, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(100, 1));
        let before: Vec<String> = battle.log().map(str::to_string).collect();
        assert_eq!(
            battle.act(BattleAction::UseItem(2), &mut player, &mut rng),
            ActionOutcome::Rejected
        );
        assert_eq!(battle.phase(), BattlePhase::AwaitingInput);
        assert_eq!(battle.log().map(str::to_string).collect::<Vec<_>>(), before);
    }

    #[test]
    fn player_loss_is_reported_after_the_enemy_turn() {
        let mut rng = RandomNumberGenerator::seeded(8);
        let mut stats = stats(5, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(100, 20));
        battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng);
        assert_eq!(
            battle.resolve_turn(&mut player, &mut rng),
            Some(BattleResult::PlayerLost)
        );
        assert_eq!(player.hp(), 0);
        assert_eq!(battle.take_result(), Some(BattleResult::PlayerLost));
        assert!(!battle.is_active());
        assert_eq!(battle.take_result(), None);
    }

    #[test]
    fn log_keeps_only_the_newest_lines() {
        let mut rng = RandomNumberGenerator::seeded(9);
        let mut stats = stats(10_000, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(10_000, 1));
        for _ in 0..20 {
            battle.act(BattleAction::Skill(Skill::Attack), &mut player, &mut rng);
            battle.resolve_turn(&mut player, &mut rng);
        }
        assert_eq!(battle.log().count(), 8);
        assert!(battle.log().all(|line| !line.starts_with("Battle started")));
    }

    #[test]
    fn end_is_idempotent_and_resets_everything() {
        let mut rng = RandomNumberGenerator::seeded(10);
        let mut stats = stats(100, 1, 0);
        let mut inventory = Inventory::default();
        let mut player = PlayerSide::new(&mut stats, &mut inventory);
        let mut battle = BattleResolver::new(BattleConfig::default());
        battle.start(zombie(100, 1));
        battle.act(BattleAction::Skill(Skill::Defend), &mut player, &mut rng);
        battle.end();
        battle.end();
        assert_eq!(battle.phase(), BattlePhase::Idle);
        assert!(!battle.is_defending());
        assert!(battle.enemy().is_none());
        assert_eq!(battle.log().count(), 0);

        battle.start(zombie(100, 1));
        assert_eq!(battle.log().count(), 1);
        assert_eq!(battle.cooldown(Skill::Special), 0);
    }
}
