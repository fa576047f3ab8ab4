use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::Entity;

use crate::{
    battle::{ActionOutcome, BattleAction, BattleResolver, BattleResult},
    config::GameConfig,
    data::{
        LevelRules,
        items::{EquipSlot, basic_find},
        monsters::ZombieTemplate,
    },
    ecs::{EcsWorld, PlayerSetup},
    map::{Level, START_POINT, chest::LootDrop},
};

pub const LOG_MAX_ENTRIES: usize = 8;
const LEVEL_REWARD_CHANCE: i32 = 70;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Playing,
    Battle,
    GameOver,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move(Point),
    Battle(BattleAction),
    UseItem(usize),
    Unequip(EquipSlot),
    Restart,
}

/// One run of the game: the current level, the entity world, the battle in
/// progress and everything the HUD reads.
pub struct GameSession {
    config: GameConfig,
    seed: u64,
    rng: RandomNumberGenerator,
    level: Level,
    rules: LevelRules,
    world: EcsWorld,
    battle: BattleResolver,
    opponent: Option<Entity>,
    drops: Vec<LootDrop>,
    state: SessionState,
    time_left: f32,
    last_point: Point,
    messages: Vec<String>,
}

impl GameSession {
    pub fn new(config: GameConfig) -> Self {
        let seed = config
            .seed
            .unwrap_or_else(|| chrono::Utc::now().timestamp_millis() as u64);
        let mut rng = RandomNumberGenerator::seeded(seed);
        let rules = LevelRules::for_level(1, &config);
        let level = Level::generate(1, rules.maze_width, rules.maze_height, &mut rng);
        let world = EcsWorld::new(&level.grid, &player_setup(&config), seed.rotate_left(17));
        let battle = BattleResolver::new(config.battle.clone());
        log::info!("New run with seed {seed}");

        let mut session = Self {
            time_left: rules.time_limit,
            config,
            seed,
            rng,
            level,
            rules,
            world,
            battle,
            opponent: None,
            drops: Vec::new(),
            state: SessionState::Playing,
            last_point: START_POINT,
            messages: Vec::new(),
        };
        session.spawn_zombies();
        session.push_log_entry("Find the exit before time runs out!");
        session
    }

    /// Throws the run away and starts again from level 1. The random stream
    /// continues, so the new maze differs from the last one.
    pub fn restart(&mut self) {
        self.battle.end();
        self.opponent = None;
        let rules = LevelRules::for_level(1, &self.config);
        let level = Level::generate(1, rules.maze_width, rules.maze_height, &mut self.rng);
        let world_seed = self.rng.range(0, i32::MAX) as u64;
        self.world = EcsWorld::new(&level.grid, &player_setup(&self.config), world_seed);
        self.level = level;
        self.time_left = rules.time_limit;
        self.rules = rules;
        self.drops.clear();
        self.last_point = START_POINT;
        self.messages.clear();
        self.state = SessionState::Playing;
        self.spawn_zombies();
        self.push_log_entry("Game restarted. Find the exit!");
        log::info!("Run restarted");
    }

    pub fn command(&mut self, command: Command) {
        match (self.state, command) {
            (_, Command::Restart) => self.restart(),
            (SessionState::Playing, Command::Move(delta)) => self.world.queue_player_step(delta),
            (SessionState::Playing, Command::UseItem(slot)) => {
                if let Some(line) = self.world.with_player(|player| player.use_item(slot)) {
                    self.push_log_entry(line);
                }
            }
            (SessionState::Playing, Command::Unequip(slot)) => {
                match self.world.with_player(|player| player.unequip(slot)) {
                    Some(true) => self.push_log_entry(format!("Unequipped {}.", slot.as_str())),
                    Some(false) => self.push_log_entry("Nothing to unequip."),
                    None => {}
                }
            }
            (SessionState::Battle, Command::Battle(action)) => self.battle_action(action),
            (SessionState::Battle, Command::UseItem(slot)) => {
                self.battle_action(BattleAction::UseItem(slot))
            }
            _ => {}
        }
    }

    pub fn tick(&mut self, dt: f32) {
        match self.state {
            SessionState::Playing => self.tick_playing(dt),
            SessionState::Battle => self.tick_battle(),
            SessionState::GameOver => {}
        }
    }

    fn tick_playing(&mut self, dt: f32) {
        self.time_left -= dt;
        if self.time_left <= 0.0 {
            self.time_left = 0.0;
            self.game_over("Time's up! The zombies got you.".to_string());
            return;
        }

        self.world.advance(dt);
        let point = self.world.player_point();
        if self.level.is_exit(point) {
            self.complete_level();
            return;
        }
        if point != self.last_point {
            self.last_point = point;
            self.open_chest(point);
            self.collect_drops(point);
        }
        if let Some(entity) = self.world.take_encounter() {
            self.begin_battle(entity);
        }
    }

    fn tick_battle(&mut self) {
        if !self.battle.is_active() {
            log::warn!("In battle state without an active battle");
            self.opponent = None;
            self.state = SessionState::Playing;
            return;
        }
        let battle = &mut self.battle;
        let rng = &mut self.rng;
        let result = self
            .world
            .with_player(|player| battle.resolve_turn(player, rng))
            .flatten();
        if result.is_some() {
            self.finish_battle();
        }
    }

    fn battle_action(&mut self, action: BattleAction) {
        let battle = &mut self.battle;
        let rng = &mut self.rng;
        let outcome = self
            .world
            .with_player(|player| battle.act(action, player, rng));
        if outcome == Some(ActionOutcome::Rejected) {
            log::debug!("Battle action {action:?} rejected");
        }
    }

    fn begin_battle(&mut self, entity: Entity) {
        let Some(snapshot) = self.world.enemy_snapshot(entity) else {
            return;
        };
        self.world.clear_player_intent();
        self.push_log_entry(format!("{} attacks!", snapshot.name));
        self.battle.start(snapshot);
        self.opponent = Some(entity);
        self.state = SessionState::Battle;
    }

    fn finish_battle(&mut self) {
        let name = self
            .battle
            .enemy()
            .map(|enemy| enemy.name.clone())
            .unwrap_or_else(|| "the zombie".to_string());
        let result = self.battle.take_result();
        self.battle.end();
        let opponent = self.opponent.take();
        match result {
            Some(BattleResult::PlayerWon) => {
                self.push_log_entry(format!("Defeated {name}!"));
                if let Some((point, loot)) =
                    opponent.and_then(|entity| self.world.defeat_enemy(entity, &mut self.rng))
                {
                    if let Some(item) = loot {
                        self.push_log_entry(format!("{name} dropped {}!", item.name()));
                        self.drops.push(LootDrop::new(point, item));
                    }
                }
                // standing on the drop already; collect it straight away
                let here = self.world.player_point();
                self.collect_drops(here);
                self.state = SessionState::Playing;
            }
            Some(BattleResult::PlayerLost) => {
                self.game_over(format!("You were killed by {name}!"));
            }
            None => {
                log::warn!("Battle finished without a result");
                self.state = SessionState::Playing;
            }
        }
    }

    fn complete_level(&mut self) {
        let finished = self.level.number;
        self.push_log_entry(format!("Level {finished} complete!"));
        if self.rng.range(0, 100) < LEVEL_REWARD_CHANCE {
            let reward = basic_find(&mut self.rng);
            let name = reward.name();
            match self.world.with_player(|player| player.pickup(reward)) {
                Some(Ok(_)) => self.push_log_entry(format!("Found {name} on the stairs!")),
                Some(Err(_)) => self.push_log_entry("Inventory full!"),
                None => {}
            }
        }
        self.start_level(finished + 1);
    }

    fn start_level(&mut self, number: u32) {
        self.rules = LevelRules::for_level(number, &self.config);
        self.level = Level::generate(
            number,
            self.rules.maze_width,
            self.rules.maze_height,
            &mut self.rng,
        );
        self.world.load_level(&self.level.grid);
        self.drops.clear();
        self.time_left = self.rules.time_limit;
        self.last_point = START_POINT;
        self.spawn_zombies();
        self.push_log_entry(format!(
            "Entered level {number}. {:.0} seconds on the clock.",
            self.time_left
        ));
    }

    fn spawn_zombies(&mut self) {
        let mut boss_pending = self.rules.boss_level;
        let mut spawned = 0;
        for _ in 0..self.rules.zombie_attempts {
            let Some(point) = self.level.edge_spawn(&mut self.rng) else {
                continue;
            };
            if point == START_POINT {
                continue;
            }
            let template = ZombieTemplate::for_level(self.level.number, boss_pending);
            self.world
                .spawn_zombie(&template, point, self.config.zombie_move_interval);
            if boss_pending {
                self.push_log_entry(format!("{} lurks somewhere in the dark...", template.name));
                boss_pending = false;
            }
            spawned += 1;
        }
        log::debug!(
            "Spawned {spawned} of {} zombies on level {}",
            self.rules.zombie_attempts,
            self.level.number
        );
    }

    fn open_chest(&mut self, point: Point) {
        let Some(chest) = self.level.chest_at_mut(point) else {
            return;
        };
        let items = chest.open();
        if items.is_empty() {
            return;
        }
        self.push_log_entry("Opened a chest!");
        for item in items {
            match self.world.with_player(|player| player.pickup(item)) {
                Some(Ok(line)) => self.push_log_entry(line),
                Some(Err(item)) => {
                    self.push_log_entry(format!("No room for {}; left it on the floor.", item.name()));
                    self.drops.push(LootDrop::new(point, item));
                }
                None => {}
            }
        }
    }

    fn collect_drops(&mut self, point: Point) {
        let (here, elsewhere): (Vec<LootDrop>, Vec<LootDrop>) = std::mem::take(&mut self.drops)
            .into_iter()
            .partition(|drop| drop.point == point);
        self.drops = elsewhere;
        for drop in here {
            match self.world.with_player(|player| player.pickup(drop.item)) {
                Some(Ok(line)) => self.push_log_entry(line),
                Some(Err(item)) => {
                    self.push_log_entry("Inventory full!");
                    self.drops.push(LootDrop::new(point, item));
                }
                None => {}
            }
        }
    }

    fn game_over(&mut self, reason: String) {
        log::info!(
            "Game over on level {} with seed {}: {reason}",
            self.level.number,
            self.seed
        );
        self.battle.end();
        self.opponent = None;
        self.state = SessionState::GameOver;
        self.push_log_entry(reason);
        self.push_log_entry("Press Enter to play again.");
    }

    fn push_log_entry<S: Into<String>>(&mut self, entry: S) {
        self.messages.insert(0, entry.into());
        self.messages.truncate(LOG_MAX_ENTRIES);
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn time_left(&self) -> f32 {
        self.time_left
    }

    pub fn world(&self) -> &EcsWorld {
        &self.world
    }

    pub fn battle(&self) -> &BattleResolver {
        &self.battle
    }

    pub fn drops(&self) -> &[LootDrop] {
        &self.drops
    }

    /// Newest first.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

fn player_setup(config: &GameConfig) -> PlayerSetup {
    PlayerSetup {
        max_hp: config.player_max_hp,
        attack: config.player_base_attack,
        gold: config.player_starting_gold,
        inventory_capacity: config.inventory_capacity,
        vision_radius: config.vision_radius,
    }
}
