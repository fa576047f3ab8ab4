use bracket_random::prelude::RandomNumberGenerator;
use specs::prelude::*;

use super::{
    components::{Enemy, IntentStep, PlayerTag, Position},
    resources::{DeltaTime, Encounter, MazeContext},
};
use crate::{ai::ChaseAgent, fog::VisibilityField};

/// Applies queued single-tile steps. Steps into walls are dropped.
#[derive(Default)]
pub struct MovementSystem;

impl<'a> System<'a> for MovementSystem {
    type SystemData = (
        Entities<'a>,
        WriteStorage<'a, Position>,
        WriteStorage<'a, IntentStep>,
        ReadExpect<'a, MazeContext>,
    );

    fn run(&mut self, (entities, mut positions, mut intents, maze): Self::SystemData) {
        let mut to_clear = Vec::new();
        for (entity, pos, intent) in (&entities, &mut positions, &intents).join() {
            let target = pos.point + intent.delta;
            if maze.is_walkable(target) {
                pos.point = target;
            }
            to_clear.push(entity);
        }

        for entity in to_clear {
            intents.remove(entity);
        }
    }
}

#[derive(Default)]
pub struct ChaseSystem;

impl<'a> System<'a> for ChaseSystem {
    type SystemData = (
        WriteStorage<'a, Position>,
        WriteStorage<'a, ChaseAgent>,
        ReadStorage<'a, PlayerTag>,
        ReadExpect<'a, MazeContext>,
        ReadExpect<'a, DeltaTime>,
        WriteExpect<'a, RandomNumberGenerator>,
    );

    fn run(
        &mut self,
        (mut positions, mut agents, players, maze, dt, mut rng): Self::SystemData,
    ) {
        let target = {
            let positions_ref: &WriteStorage<Position> = &positions;
            (positions_ref, &players).join().next().map(|(pos, _)| pos.point)
        };
        let Some(target) = target else {
            return;
        };
        for (agent, pos) in (&mut agents, &mut positions).join() {
            agent.position = pos.point;
            if agent.update(target, &maze.grid, dt.0, &mut rng) {
                pos.point = agent.position;
            }
        }
    }
}

/// Flags the first enemy standing on the player's tile. An encounter that
/// has not been collected yet is left alone.
#[derive(Default)]
pub struct EncounterSystem;

impl<'a> System<'a> for EncounterSystem {
    type SystemData = (
        Entities<'a>,
        ReadStorage<'a, Position>,
        ReadStorage<'a, PlayerTag>,
        ReadStorage<'a, Enemy>,
        WriteExpect<'a, Encounter>,
    );

    fn run(&mut self, (entities, positions, players, enemies, mut encounter): Self::SystemData) {
        if encounter.enemy.is_some() {
            return;
        }
        let Some(player) = (&positions, &players).join().next().map(|(pos, _)| pos.point) else {
            return;
        };
        encounter.enemy = (&entities, &positions, &enemies)
            .join()
            .find(|(_, pos, _)| pos.point == player)
            .map(|(entity, _, _)| entity);
    }
}

#[derive(Default)]
pub struct FogSystem;

impl<'a> System<'a> for FogSystem {
    type SystemData = (
        ReadStorage<'a, Position>,
        ReadStorage<'a, PlayerTag>,
        ReadExpect<'a, MazeContext>,
        WriteExpect<'a, VisibilityField>,
    );

    fn run(&mut self, (positions, players, maze, mut field): Self::SystemData) {
        if let Some((pos, _)) = (&positions, &players).join().next() {
            field.update_from(pos.point, &maze.grid);
        }
    }
}
