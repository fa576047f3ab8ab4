use bracket_geometry::prelude::Point;
use bracket_terminal::prelude::*;

use crate::{
    battle::{BattlePhase, BattleResolver, Skill, TurnOwner},
    data::items::{EquipSlot, Inventory},
    ecs::EcsWorld,
    fog::VisibilityField,
    map::{Grid, Level},
    session::{GameSession, SessionState},
};

const MAP_ORIGIN: Point = Point { x: 1, y: 4 };
const PANEL_X: i32 = 46;
const LOG_PANEL_START: i32 = 40;
const NEARBY_ROWS: usize = 8;

pub fn draw_session(ctx: &mut BTerm, session: &GameSession) {
    ctx.cls();
    draw_header(ctx, session);

    let level = session.level();
    let world = session.world();
    world.with_visibility(|field| {
        draw_map(ctx, &level.grid, MAP_ORIGIN, field);
        draw_features(ctx, session, field);
        draw_entities(ctx, world, field);
        if session.state() == SessionState::Playing {
            draw_nearby(ctx, world, field, PANEL_X, 28);
        }
    });

    match (session.state(), world.player_inventory()) {
        (SessionState::Battle, Some(inventory)) => {
            draw_battle(ctx, session.battle(), PANEL_X, 4);
            draw_inventory(ctx, &inventory, PANEL_X, 27, 3);
        }
        (_, Some(inventory)) => draw_inventory(ctx, &inventory, PANEL_X, 5, 14),
        (_, None) => {}
    }

    draw_log(ctx, session.messages(), LOG_PANEL_START);

    if session.state() == SessionState::GameOver {
        draw_game_over(ctx, level);
    }
}

fn draw_header(ctx: &mut BTerm, session: &GameSession) {
    let (width, _) = ctx.get_char_size();
    ctx.draw_box(0, 0, width - 1, 3, RGB::named(GRAY), RGB::named(BLACK));
    let time_left = session.time_left();
    let clock = if time_left <= 10.0 {
        RGB::named(RED)
    } else if time_left <= 30.0 {
        RGB::named(ORANGE)
    } else {
        RGB::named(LIGHT_CYAN)
    };
    ctx.print_color(
        2,
        1,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        format!("Zombie Dungeon · Level {}", session.level().number),
    );
    ctx.print_color(
        30,
        1,
        clock,
        RGB::named(BLACK),
        format!("Time {:>3.0}s", time_left.ceil()),
    );

    let world = session.world();
    let explored = world.with_visibility(|field| {
        let (w, h) = field.dimensions();
        let tiles = (w * h).max(1) as usize;
        (w, h, field.explored_count() * 100 / tiles, field.visible_count())
    });
    ctx.print_color(
        2,
        2,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
        format!(
            "{}x{} maze · {}% mapped · {} tiles in sight · {} zombies",
            explored.0,
            explored.1,
            explored.2,
            explored.3,
            world.enemy_count()
        ),
    );

    if let (Some(stats), Some(inventory)) = (world.player_stats(), world.player_inventory()) {
        let bonus = inventory.equipment_bonus();
        let max_hp = stats.max_hp + bonus.health;
        let hp_color = if stats.hp * 10 <= max_hp * 3 {
            RGB::named(RED)
        } else {
            RGB::named(LIGHT_GREEN)
        };
        ctx.print_color(
            44,
            1,
            hp_color,
            RGB::named(BLACK),
            format!("HP {}/{max_hp}", stats.hp),
        );
        ctx.print_color(
            58,
            1,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!(
                "ATK {} DEF {} ${}",
                stats.power + bonus.attack,
                stats.defense + bonus.defense,
                inventory.gold
            ),
        );
    }
}

pub fn draw_map(ctx: &mut BTerm, grid: &Grid, map_origin: Point, field: &VisibilityField) {
    for y in 0..grid.height() {
        let screen_y = map_origin.y + y;
        for x in 0..grid.width() {
            let screen_x = map_origin.x + x;
            let cell = grid.cell(x, y);
            if field.is_visible(x, y) {
                ctx.set(screen_x, screen_y, cell.color(), RGB::named(BLACK), cell.glyph());
            } else if field.is_explored(x, y) {
                ctx.set(
                    screen_x,
                    screen_y,
                    RGB::named(DARK_GRAY),
                    RGB::named(BLACK),
                    cell.glyph(),
                );
            } else {
                ctx.set(
                    screen_x,
                    screen_y,
                    RGB::named(BLACK),
                    RGB::named(BLACK),
                    b' ' as u16,
                );
            }
        }
    }
}

// Exit and chests stay on the map once explored; drops need line of sight.
fn draw_features(ctx: &mut BTerm, session: &GameSession, field: &VisibilityField) {
    let level = session.level();
    let exit = level.grid.exit();
    if field.is_explored(exit.x, exit.y) {
        let fg = if field.is_visible(exit.x, exit.y) {
            RGB::named(LIGHT_GREEN)
        } else {
            RGB::named(DARK_GRAY)
        };
        plot(ctx, exit, fg, b'>' as u16);
    }
    for chest in &level.chests {
        if !field.is_explored(chest.point.x, chest.point.y) {
            continue;
        }
        let fg = if chest.is_open() {
            RGB::named(DARK_GRAY)
        } else {
            RGB::named(GOLD)
        };
        let glyph = if chest.is_open() { b'_' } else { b'=' };
        plot(ctx, chest.point, fg, glyph as u16);
    }
    for drop in session.drops() {
        if field.should_show_entity(drop.point.x, drop.point.y) {
            plot(ctx, drop.point, drop.item.rarity.color(), b'!' as u16);
        }
    }
}

fn draw_entities(ctx: &mut BTerm, world: &EcsWorld, field: &VisibilityField) {
    world.each_renderable(|point, renderable| {
        if field.should_show_entity(point.x, point.y) {
            plot(ctx, point, renderable.color, renderable.glyph);
        }
    });
}

fn draw_nearby(ctx: &mut BTerm, world: &EcsWorld, field: &VisibilityField, x: i32, y: i32) {
    let in_sight: Vec<_> = world
        .enemies()
        .into_iter()
        .filter(|enemy| field.should_show_entity(enemy.point.x, enemy.point.y))
        .collect();
    if in_sight.is_empty() {
        return;
    }
    ctx.print_color(x, y, RGB::named(WHITE), RGB::named(BLACK), "In sight");
    for (row, enemy) in in_sight.iter().take(NEARBY_ROWS).enumerate() {
        let fg = if enemy.boss {
            RGB::named(MAGENTA)
        } else {
            RGB::named(RED)
        };
        ctx.print_color(
            x,
            y + 1 + row as i32,
            fg,
            RGB::named(BLACK),
            format!("{} {}/{}", enemy.name, enemy.hp, enemy.max_hp),
        );
    }
}

fn plot(ctx: &mut BTerm, point: Point, fg: RGB, glyph: u16) {
    ctx.set(
        MAP_ORIGIN.x + point.x,
        MAP_ORIGIN.y + point.y,
        fg,
        RGB::named(BLACK),
        glyph,
    );
}

fn draw_inventory(ctx: &mut BTerm, inventory: &Inventory, x: i32, y: i32, rows: usize) {
    ctx.print_color(
        x,
        y,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("Pack {}/{}", inventory.len(), inventory.capacity()),
    );
    for (row, slot) in EquipSlot::ALL.iter().enumerate() {
        let (fg, label) = match inventory.equipped(*slot) {
            Some(item) => (item.rarity.color(), item.name()),
            None => (RGB::named(DARK_GRAY), "-".to_string()),
        };
        ctx.print_color(
            x,
            y + 1 + row as i32,
            fg,
            RGB::named(BLACK),
            format!("{:<7}{label}", slot.as_str()),
        );
    }
    for (idx, item) in inventory.items().iter().take(rows).enumerate() {
        let line = if idx < 9 {
            format!("[{}] {}", idx + 1, item.name())
        } else {
            format!("    {}", item.name())
        };
        ctx.print_color(x, y + 6 + idx as i32, item.rarity.color(), RGB::named(BLACK), &line);
    }
    if let Some(first) = inventory.items().first() {
        ctx.print_color(
            x,
            y + 7 + rows.min(inventory.len()) as i32,
            RGB::named(DARK_GRAY),
            RGB::named(BLACK),
            if first.is_equipment() {
                format!("{} (worth {}, use to equip)", first.description(), first.value())
            } else {
                format!("{} (worth {})", first.description(), first.value())
            },
        );
    }
}

fn draw_battle(ctx: &mut BTerm, battle: &BattleResolver, x: i32, y: i32) {
    ctx.draw_box(x - 1, y, 33, 21, RGB::named(RED), RGB::named(BLACK));
    let Some(enemy) = battle.enemy() else {
        return;
    };
    ctx.print_color(x + 1, y + 1, RGB::named(RED), RGB::named(BLACK), &enemy.name);
    ctx.print_color(
        x + 1,
        y + 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("HP {}/{}  ATK {}", enemy.hp, enemy.max_hp, enemy.attack),
    );
    let bar_width = 28;
    let filled = if enemy.max_hp > 0 {
        (enemy.hp.max(0) * bar_width / enemy.max_hp) as usize
    } else {
        0
    };
    let bar: String = "#".repeat(filled) + &".".repeat(bar_width as usize - filled);
    ctx.print_color(x + 1, y + 3, RGB::named(RED), RGB::named(BLACK), &bar);

    let (turn, turn_color) = match battle.turn_owner() {
        Some(TurnOwner::Player) => ("Your turn", RGB::named(LIGHT_GREEN)),
        Some(TurnOwner::Enemy) => ("Enemy turn", RGB::named(ORANGE)),
        None => match battle.phase() {
            BattlePhase::PlayerWon => ("Victory", RGB::named(YELLOW)),
            _ => ("", RGB::named(BLACK)),
        },
    };
    ctx.print_color(x + 1, y + 5, turn_color, RGB::named(BLACK), turn);
    if battle.is_defending() {
        ctx.print_color(x + 14, y + 5, RGB::named(CYAN), RGB::named(BLACK), "Defending");
    }

    for (row, skill) in Skill::ALL.iter().enumerate() {
        let cooldown = battle.cooldown(*skill);
        let (fg, suffix) = if cooldown > 0 {
            (RGB::named(DARK_GRAY), format!(" ({cooldown})"))
        } else {
            (RGB::named(WHITE), String::new())
        };
        ctx.print_color(
            x + 1,
            y + 7 + row as i32,
            fg,
            RGB::named(BLACK),
            format!(
                "[{}] {:<8}{}{suffix}",
                skill.hotkey(),
                skill.name(),
                skill.description()
            ),
        );
    }

    for (row, line) in battle.log().enumerate() {
        ctx.print_color(
            x + 1,
            y + 12 + row as i32,
            RGB::named(LIGHT_GRAY),
            RGB::named(BLACK),
            line,
        );
    }
}

pub fn draw_log(ctx: &mut BTerm, log: &[String], start_y: i32) {
    let (width, _) = ctx.get_char_size();
    let height = (log.len() as i32).min(8) + 2;
    let top = (start_y - 1).max(0);
    ctx.draw_box(
        0,
        top,
        width - 1,
        height,
        RGB::named(DARK_GRAY),
        RGB::named(BLACK),
    );
    ctx.print_color(2, top, RGB::named(WHITE), RGB::named(BLACK), "Messages");
    for (row, entry) in log.iter().take(8).enumerate() {
        ctx.print(2, top + 1 + row as i32, entry);
    }
}

fn draw_game_over(ctx: &mut BTerm, level: &Level) {
    ctx.draw_box(20, 15, 40, 6, RGB::named(RED), RGB::named(BLACK));
    ctx.print_color_centered(17, RGB::named(RED), RGB::named(BLACK), "GAME OVER");
    ctx.print_color_centered(
        18,
        RGB::named(WHITE),
        RGB::named(BLACK),
        format!("You reached level {}", level.number),
    );
    ctx.print_color_centered(
        19,
        RGB::named(GRAY),
        RGB::named(BLACK),
        "Enter: play again   Esc: quit",
    );
}
