pub mod components;
pub mod resources;
pub mod systems;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RGB, YELLOW};
use specs::prelude::{
    Builder, Dispatcher, DispatcherBuilder, Entity, Join, World as SpecsWorld, WorldExt,
};

use crate::{
    ai::ChaseAgent,
    battle::{EnemySnapshot, PlayerSide},
    data::{
        items::{Inventory, Item, ItemKind},
        monsters::ZombieTemplate,
    },
    fog::VisibilityField,
    map::{Grid, START_POINT},
};

use self::{
    components::{CombatStats, Enemy, IntentStep, PlayerTag, Position, Renderable},
    resources::{DeltaTime, Encounter, MazeContext},
    systems::{ChaseSystem, EncounterSystem, FogSystem, MovementSystem},
};

/// Starting numbers for a fresh player.
#[derive(Clone, Debug)]
pub struct PlayerSetup {
    pub max_hp: i32,
    pub attack: i32,
    pub gold: i32,
    pub inventory_capacity: usize,
    pub vision_radius: f32,
}

/// Render/HUD view of one enemy.
#[derive(Clone, Debug)]
pub struct EnemyView {
    pub point: Point,
    pub name: String,
    pub hp: i32,
    pub max_hp: i32,
    pub boss: bool,
}

pub struct EcsWorld {
    specs_world: SpecsWorld,
    dispatcher: Dispatcher<'static, 'static>,
    player: Entity,
}

impl EcsWorld {
    pub fn new(grid: &Grid, setup: &PlayerSetup, seed: u64) -> Self {
        let mut specs_world = SpecsWorld::new();
        Self::register_components(&mut specs_world);
        let mut rng = RandomNumberGenerator::seeded(seed);
        let player = Self::spawn_player(&mut specs_world, setup, &mut rng);
        specs_world.insert(rng);
        specs_world.insert(MazeContext::new(grid.clone()));
        specs_world.insert(DeltaTime::default());
        specs_world.insert(Encounter::default());
        specs_world.insert(VisibilityField::with_radius(
            grid.width(),
            grid.height(),
            setup.vision_radius,
        ));
        let dispatcher = DispatcherBuilder::new()
            .with(MovementSystem, "movement", &[])
            .with(ChaseSystem, "chase", &["movement"])
            .with(EncounterSystem, "encounter", &["chase"])
            .with(FogSystem, "fog", &["movement"])
            .build();

        let mut world = Self {
            specs_world,
            dispatcher,
            player,
        };
        world.refresh_visibility();
        world
    }

    fn register_components(world: &mut SpecsWorld) {
        world.register::<Position>();
        world.register::<Renderable>();
        world.register::<IntentStep>();
        world.register::<PlayerTag>();
        world.register::<Enemy>();
        world.register::<ChaseAgent>();
        world.register::<CombatStats>();
        world.register::<Inventory>();
    }

    fn spawn_player(
        world: &mut SpecsWorld,
        setup: &PlayerSetup,
        rng: &mut RandomNumberGenerator,
    ) -> Entity {
        let mut inventory = Inventory::with_capacity(setup.inventory_capacity);
        inventory.gold = setup.gold;
        inventory.add(Item::common(ItemKind::Potion, rng));
        inventory.add(Item::common(ItemKind::Sword, rng));
        world
            .create_entity()
            .with(Position { point: START_POINT })
            .with(Renderable {
                glyph: b'@' as u16,
                color: RGB::named(YELLOW),
                order: 2,
            })
            .with(CombatStats {
                max_hp: setup.max_hp,
                hp: setup.max_hp,
                power: setup.attack,
                defense: 0,
            })
            .with(PlayerTag)
            .with(inventory)
            .build()
    }

    /// Swaps in a new maze: enemies are cleared, the player goes back to the
    /// start cell and the fog is forgotten. Player stats and pack carry over.
    pub fn load_level(&mut self, grid: &Grid) {
        self.clear_enemies();
        self.specs_world.insert(MazeContext::new(grid.clone()));
        self.specs_world.insert(Encounter::default());
        {
            let mut field = self.specs_world.write_resource::<VisibilityField>();
            field.reset(grid.width(), grid.height());
        }
        self.clear_player_intent();
        self.set_player_point(START_POINT);
        self.refresh_visibility();
    }

    /// One frame of simulation: queued player step, chasing, encounter
    /// detection and fog.
    pub fn advance(&mut self, dt: f32) {
        self.specs_world.insert(DeltaTime(dt));
        self.dispatcher.dispatch(&mut self.specs_world);
        self.specs_world.maintain();
    }

    pub fn queue_player_step(&mut self, delta: Point) {
        let mut intents = self.specs_world.write_component::<IntentStep>();
        let _ = intents.insert(self.player, IntentStep { delta });
    }

    pub fn clear_player_intent(&mut self) {
        let mut intents = self.specs_world.write_component::<IntentStep>();
        let _ = intents.remove(self.player);
    }

    pub fn player_point(&self) -> Point {
        let storage = self.specs_world.read_component::<Position>();
        storage
            .get(self.player)
            .map(|pos| pos.point)
            .unwrap_or(START_POINT)
    }

    pub fn set_player_point(&mut self, point: Point) {
        let mut positions = self.specs_world.write_component::<Position>();
        if let Some(pos) = positions.get_mut(self.player) {
            pos.point = point;
        }
    }

    pub fn player_stats(&self) -> Option<CombatStats> {
        let stats = self.specs_world.read_component::<CombatStats>();
        stats.get(self.player).cloned()
    }

    pub fn player_inventory(&self) -> Option<Inventory> {
        let inventories = self.specs_world.read_component::<Inventory>();
        inventories.get(self.player).cloned()
    }

    /// Borrows the player's stats and pack as a [`PlayerSide`] for the
    /// duration of `f`.
    pub fn with_player<R>(&mut self, f: impl FnOnce(&mut PlayerSide) -> R) -> Option<R> {
        let mut stats = self.specs_world.write_component::<CombatStats>();
        let mut inventories = self.specs_world.write_component::<Inventory>();
        let player_stats = stats.get_mut(self.player)?;
        let inventory = inventories.get_mut(self.player)?;
        let mut side = PlayerSide::new(player_stats, inventory);
        Some(f(&mut side))
    }

    pub fn spawn_zombie(
        &mut self,
        template: &ZombieTemplate,
        point: Point,
        base_interval: f32,
    ) -> Entity {
        self.specs_world
            .create_entity()
            .with(Position { point })
            .with(Renderable {
                glyph: template.glyph as u16,
                color: template.color,
                order: 1,
            })
            .with(Enemy::new(template.name.clone(), template.boss))
            .with(ChaseAgent::new(point, template.move_interval(base_interval)))
            .with(CombatStats {
                max_hp: template.hp,
                hp: template.hp,
                power: template.attack,
                defense: template.defense,
            })
            .build()
    }

    pub fn enemies(&self) -> Vec<EnemyView> {
        let positions = self.specs_world.read_component::<Position>();
        let enemies = self.specs_world.read_component::<Enemy>();
        let stats = self.specs_world.read_component::<CombatStats>();
        (&positions, &enemies, &stats)
            .join()
            .map(|(pos, enemy, stat)| EnemyView {
                point: pos.point,
                name: enemy.name.clone(),
                hp: stat.hp,
                max_hp: stat.max_hp,
                boss: enemy.boss,
            })
            .collect()
    }

    pub fn enemy_count(&self) -> usize {
        self.specs_world.read_component::<Enemy>().join().count()
    }

    pub fn enemy_snapshot(&self, entity: Entity) -> Option<EnemySnapshot> {
        let enemies = self.specs_world.read_component::<Enemy>();
        let stats = self.specs_world.read_component::<CombatStats>();
        let enemy = enemies.get(entity)?;
        let stat = stats.get(entity)?;
        Some(EnemySnapshot {
            id: entity.id(),
            name: enemy.name.clone(),
            hp: stat.hp,
            max_hp: stat.max_hp,
            attack: stat.power,
        })
    }

    /// Collects a pending encounter. The enemy is only reported while it is
    /// still alive in the world.
    pub fn take_encounter(&mut self) -> Option<Entity> {
        let entity = self
            .specs_world
            .write_resource::<Encounter>()
            .enemy
            .take()?;
        self.specs_world.is_alive(entity).then_some(entity)
    }

    /// Removes a beaten enemy and returns where it stood plus whatever it
    /// dropped. Loot is rolled once per enemy.
    pub fn defeat_enemy(
        &mut self,
        entity: Entity,
        rng: &mut RandomNumberGenerator,
    ) -> Option<(Point, Option<Item>)> {
        let point = {
            let positions = self.specs_world.read_component::<Position>();
            positions.get(entity)?.point
        };
        let loot = {
            let mut enemies = self.specs_world.write_component::<Enemy>();
            enemies.get_mut(entity).and_then(|enemy| enemy.drop_loot(rng))
        };
        self.remove_enemy(entity);
        Some((point, loot))
    }

    pub fn remove_enemy(&mut self, entity: Entity) {
        if entity == self.player {
            return;
        }
        if let Err(err) = self.specs_world.delete_entity(entity) {
            log::debug!("Enemy already gone: {err}");
        }
        self.specs_world.maintain();
    }

    pub fn clear_enemies(&mut self) {
        let doomed: Vec<Entity> = {
            let entities = self.specs_world.entities();
            let enemies = self.specs_world.read_component::<Enemy>();
            (&entities, &enemies).join().map(|(entity, _)| entity).collect()
        };
        if let Err(err) = self.specs_world.delete_entities(&doomed) {
            log::warn!("Failed to clear enemies: {err:?}");
        }
        self.specs_world.maintain();
    }

    pub fn each_renderable<F>(&self, mut f: F)
    where
        F: FnMut(Point, &Renderable),
    {
        let positions = self.specs_world.read_component::<Position>();
        let renderables = self.specs_world.read_component::<Renderable>();
        let mut drawn: Vec<(Point, &Renderable)> = (&positions, &renderables)
            .join()
            .map(|(pos, renderable)| (pos.point, renderable))
            .collect();
        drawn.sort_by_key(|(_, renderable)| renderable.order);
        for (point, renderable) in drawn {
            f(point, renderable);
        }
    }

    pub fn with_visibility<R>(&self, f: impl FnOnce(&VisibilityField) -> R) -> R {
        let field = self.specs_world.read_resource::<VisibilityField>();
        f(&field)
    }

    /// Recomputes sight without stepping the simulation.
    pub fn refresh_visibility(&mut self) {
        let origin = self.player_point();
        let maze = self.specs_world.read_resource::<MazeContext>();
        let mut field = self.specs_world.write_resource::<VisibilityField>();
        field.update_from(origin, &maze.grid);
    }
}
