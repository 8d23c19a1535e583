pub mod entity;

use crate::errors::{GameResult, MapDataError, MapDataResult};
use crate::geometry::Rect;
use crate::map::{MapObject, MapSource};
use crate::render::WorldLayer;
use crate::settings::{ANIMATION_SPEED, NOTICE_RADIUS, PLAYER_SPEED, TILE_SIZE};
use crate::trainer::TrainerData;
use entity::{Entity, EntityKind, Facing};
use glam::Vec2;
use std::collections::HashMap;

/// Visual-only world piece: a terrain tile or a looping animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenery {
    pub layer: WorldLayer,
    pub rect: Rect,
    /// Y coordinate used for main-layer ordering
    pub sort_key: f32,
    pub image: SceneryImage,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneryImage {
    /// Static tile from the map's tileset
    Tile { tile_id: u32 },
    /// Cyclic animation keyed for the frame provider
    Animated {
        key: String,
        frame_count: usize,
        frame_index: f32,
    },
}

/// A grass area that can start wild encounters.
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterPatch {
    pub area: Rect,
    pub biome: String,
    /// Species keys eligible to appear here
    pub species: Vec<String>,
    pub level: u8,
}

/// A map-edge zone that hands the player to another map.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionZone {
    pub area: Rect,
    pub target_map: String,
    pub target_spawn: String,
}

/// The simulated overworld for the currently loaded map. Entities live here
/// and are destroyed wholesale when the map is swapped.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub map_id: String,
    pub scenery: Vec<Scenery>,
    /// Obstacle hitboxes from borders and collidable objects
    pub collision_rects: Vec<Rect>,
    pub patches: Vec<MonsterPatch>,
    pub transitions: Vec<TransitionZone>,
    pub player: Entity,
    pub characters: Vec<Entity>,
}

fn parse_facing(object: &MapObject, layer: &str, property: &str) -> MapDataResult<Facing> {
    match object.property_str(layer, property)? {
        "up" => Ok(Facing::Up),
        "down" => Ok(Facing::Down),
        "left" => Ok(Facing::Left),
        "right" => Ok(Facing::Right),
        _ => Err(MapDataError::PropertyType {
            layer: layer.to_string(),
            object: object.name.clone().unwrap_or_default(),
            property: property.to_string(),
            expected: "facing direction",
        }),
    }
}

impl World {
    /// Build the world from a loaded map, mirroring the map's layer
    /// structure. Any missing layer or property aborts setup.
    pub fn from_map(
        map_id: &str,
        source: &MapSource,
        spawn: &str,
        trainers: &HashMap<String, TrainerData>,
    ) -> GameResult<World> {
        source.validate()?;

        let mut scenery = Vec::new();
        let mut collision_rects = Vec::new();

        // Terrain tile layers draw under everything that moves.
        for layer_name in ["Terrain", "Terrain Top"] {
            for tile in &source.tile_layer(layer_name)?.tiles {
                let rect = Rect::new(
                    tile.col as f32 * TILE_SIZE,
                    tile.row as f32 * TILE_SIZE,
                    TILE_SIZE,
                    TILE_SIZE,
                );
                scenery.push(Scenery {
                    layer: WorldLayer::Background,
                    sort_key: rect.bottom(),
                    rect,
                    image: SceneryImage::Tile { tile_id: tile.tile_id },
                });
            }
        }

        // Water areas are tiled with the looping water animation.
        for object in &source.object_layer("Water")?.objects {
            let cols = (object.width / TILE_SIZE) as u32;
            let rows = (object.height / TILE_SIZE) as u32;
            for col in 0..cols {
                for row in 0..rows {
                    let rect = Rect::new(
                        object.x + col as f32 * TILE_SIZE,
                        object.y + row as f32 * TILE_SIZE,
                        TILE_SIZE,
                        TILE_SIZE,
                    );
                    scenery.push(Scenery {
                        layer: WorldLayer::Water,
                        sort_key: rect.bottom(),
                        rect,
                        image: SceneryImage::Animated {
                            key: "water".to_string(),
                            frame_count: 4,
                            frame_index: 0.0,
                        },
                    });
                }
            }
        }

        // Coast pieces pick their animation by terrain and side.
        for object in &source.object_layer("Coast")?.objects {
            let terrain = object.property_str("Coast", "terrain")?;
            let side = object.property_str("Coast", "side")?;
            let rect = Rect::new(object.x, object.y, TILE_SIZE, TILE_SIZE);
            scenery.push(Scenery {
                layer: WorldLayer::Background,
                sort_key: rect.bottom(),
                rect,
                image: SceneryImage::Animated {
                    key: format!("coast:{}:{}", terrain, side),
                    frame_count: 4,
                    frame_index: 0.0,
                },
            });
        }

        // Freestanding objects: "top" ones overdraw entities, the rest are
        // solid and sort with the main layer.
        for object in &source.object_layer("Objects")?.objects {
            let rect = Rect::new(object.x, object.y, object.width, object.height);
            if object.name.as_deref() == Some("top") {
                scenery.push(Scenery {
                    layer: WorldLayer::Top,
                    sort_key: rect.bottom(),
                    rect,
                    image: SceneryImage::Tile {
                        tile_id: object.property_int("Objects", "tile_id")? as u32,
                    },
                });
            } else {
                let hitbox = rect.inflate(0.0, -rect.size.y * 0.6);
                collision_rects.push(hitbox);
                scenery.push(Scenery {
                    layer: WorldLayer::Main,
                    sort_key: hitbox.bottom(),
                    rect,
                    image: SceneryImage::Tile {
                        tile_id: object.property_int("Objects", "tile_id")? as u32,
                    },
                });
            }
        }

        // Invisible border rects.
        for object in &source.object_layer("Collisions")?.objects {
            collision_rects.push(Rect::new(object.x, object.y, object.width, object.height));
        }

        // Grass patches that can start encounters.
        let mut patches = Vec::new();
        for object in &source.object_layer("Monsters")?.objects {
            let biome = object.property_str("Monsters", "biome")?.to_string();
            let species = object
                .property_str("Monsters", "monsters")?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect();
            let level = object.property_int("Monsters", "level")? as u8;
            let area = Rect::new(object.x, object.y, object.width, object.height);
            scenery.push(Scenery {
                layer: WorldLayer::Main,
                sort_key: area.bottom(),
                rect: area,
                image: SceneryImage::Animated {
                    key: format!("patch:{}", biome),
                    frame_count: 1,
                    frame_index: 0.0,
                },
            });
            patches.push(MonsterPatch {
                area,
                biome,
                species,
                level,
            });
        }

        // Map-edge transition zones.
        let mut transitions = Vec::new();
        for object in &source.object_layer("Transition")?.objects {
            let target = object.property_str("Transition", "target")?;
            let (target_map, target_spawn) = target.split_once(',').ok_or_else(|| {
                MapDataError::MalformedData(format!(
                    "transition target '{}' should be 'map,spawn'",
                    target
                ))
            })?;
            transitions.push(TransitionZone {
                area: Rect::new(object.x, object.y, object.width, object.height),
                target_map: target_map.trim().to_string(),
                target_spawn: target_spawn.trim().to_string(),
            });
        }

        // Entities: the player spawn matching `spawn`, plus characters.
        let mut player = None;
        let mut characters = Vec::new();
        for object in &source.object_layer("Entities")?.objects {
            let center = Vec2::new(object.x, object.y);
            if object.name.as_deref() == Some("Player") {
                if object.property_str("Entities", "pos")? == spawn {
                    let facing = parse_facing(object, "Entities", "direction")?;
                    player = Some(Entity::new(
                        center,
                        "player",
                        facing,
                        PLAYER_SPEED,
                        EntityKind::Player,
                    ));
                }
            } else {
                let trainer_id = object.property_str("Entities", "character_id")?.to_string();
                let facing = parse_facing(object, "Entities", "direction")?;
                let radius = object.property_float_or("radius", NOTICE_RADIUS);
                let (directions, look_around) = trainers
                    .get(&trainer_id)
                    .map(|t| (t.directions.clone(), t.look_around))
                    .unwrap_or_else(|| (vec![facing], false));
                characters.push(Entity::new(
                    center,
                    &trainer_id,
                    facing,
                    0.0,
                    EntityKind::Character {
                        trainer_id: trainer_id.clone(),
                        directions,
                        look_around,
                        can_rotate: true,
                        rotate_timer: crate::settings::LOOK_AROUND_INTERVAL,
                        direction_index: 0,
                        notice_radius: radius,
                    },
                ));
            }
        }

        let player = player.ok_or(MapDataError::MissingSpawn {
            map: map_id.to_string(),
            spawn: spawn.to_string(),
        })?;

        Ok(World {
            map_id: map_id.to_string(),
            scenery,
            collision_rects,
            patches,
            transitions,
            player,
            characters,
        })
    }

    /// Obstacles the player collides with: static rects plus character
    /// hitboxes.
    fn player_obstacles(&self) -> Vec<Rect> {
        let mut obstacles = self.collision_rects.clone();
        obstacles.extend(self.characters.iter().map(|c| c.hitbox));
        obstacles
    }

    /// One world tick: move the player, run idle rotation, advance
    /// animations.
    pub fn update(&mut self, dt: f32) {
        let obstacles = self.player_obstacles();
        self.player.update_facing();
        move_entity(&mut self.player, dt, &obstacles);
        self.player.animate(dt);

        for character in &mut self.characters {
            character.update_idle_rotation(dt);
            character.animate(dt);
        }

        for scenery in &mut self.scenery {
            if let SceneryImage::Animated {
                frame_count,
                frame_index,
                ..
            } = &mut scenery.image
            {
                *frame_index += ANIMATION_SPEED * dt;
                if *frame_index >= *frame_count as f32 {
                    *frame_index %= *frame_count as f32;
                }
            }
        }
    }

    /// The patch the player is currently standing in, if any.
    pub fn patch_under_player(&self) -> Option<&MonsterPatch> {
        self.patches
            .iter()
            .find(|patch| patch.area.overlaps(&self.player.hitbox))
    }

    /// The transition zone the player is currently touching, if any.
    pub fn transition_under_player(&self) -> Option<&TransitionZone> {
        self.transitions
            .iter()
            .find(|zone| zone.area.overlaps(&self.player.hitbox))
    }

    /// Character the player could talk to right now, by index.
    pub fn reachable_character(&self) -> Option<usize> {
        self.characters.iter().position(|character| {
            let radius = match &character.kind {
                EntityKind::Character { notice_radius, .. } => *notice_radius,
                EntityKind::Player => return false,
            };
            entity::check_connection(
                radius,
                &self.player,
                character,
                crate::settings::FACING_TOLERANCE,
            )
        })
    }
}

/// Displace an entity by its input, resolving collisions one axis at a
/// time (x first, then y) so that a blocked axis still lets the other
/// slide. Combined-vector resolution would snag on corners.
pub fn move_entity(entity: &mut Entity, dt: f32, obstacles: &[Rect]) {
    if entity.blocked || entity.direction == Vec2::ZERO {
        return;
    }

    let displacement = entity.direction * entity.speed * dt;

    // Horizontal pass.
    if displacement.x != 0.0 {
        entity.rect.pos.x += displacement.x;
        entity.hitbox.set_center(entity.rect.center());
        for obstacle in obstacles {
            if entity.hitbox.overlaps(obstacle) {
                if displacement.x > 0.0 {
                    entity.hitbox.set_right(obstacle.left());
                } else {
                    entity.hitbox.set_left(obstacle.right());
                }
                entity.rect.set_center(entity.hitbox.center());
            }
        }
    }

    // Vertical pass.
    if displacement.y != 0.0 {
        entity.rect.pos.y += displacement.y;
        entity.hitbox.set_center(entity.rect.center());
        for obstacle in obstacles {
            if entity.hitbox.overlaps(obstacle) {
                if displacement.y > 0.0 {
                    entity.hitbox.set_bottom(obstacle.top());
                } else {
                    entity.hitbox.set_top(obstacle.bottom());
                }
                entity.rect.set_center(entity.hitbox.center());
            }
        }
    }
}
