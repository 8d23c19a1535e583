//! Frame assembly: turns the current world (or battle/overlay state) into an
//! ordered list of draw commands. Pure read path; nothing here mutates model
//! state. The host hands the commands to whatever actually blits pixels.

use crate::settings::{SHADOW_OFFSET, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::world::entity::Entity;
use crate::world::{SceneryImage, World};
use glam::Vec2;
use ordered_float::OrderedFloat;

/// Paint-order rank across draw buckets. Lower draws first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorldLayer {
    Water,
    Background,
    Shadow,
    Main,
    Top,
}

/// Centered follow camera. No easing, no clamping to map bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub focus: Vec2,
}

impl Camera {
    pub fn new(focus: Vec2) -> Self {
        Camera { focus }
    }

    /// World-to-screen offset for the current focus.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(WINDOW_WIDTH / 2.0, WINDOW_HEIGHT / 2.0) - self.focus
    }
}

/// One blit (or overlay primitive) the host should perform. Emitted in final
/// paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Static tile from the map tileset
    Tile { tile_id: u32, dst: Vec2 },
    /// Frame of a looping scenery animation
    Animation { key: String, frame: usize, dst: Vec2 },
    /// Entity shadow decal
    Shadow { dst: Vec2 },
    /// Entity sprite frame, keyed by sheet and animation state
    EntitySprite {
        sheet: String,
        state: &'static str,
        frame: usize,
        dst: Vec2,
    },
    /// Dialog overlay with the line currently shown
    DialogBox { line: String },
    /// Battle view summary; the battle presentation layer owns the details
    BattleView {
        player_species: String,
        player_health: f32,
        opponent_species: String,
        opponent_health: f32,
    },
    /// Evolution overlay flash, progress in [0, 1]
    EvolutionFlash { species: String, progress: f32 },
    /// Full-screen tint quad masking scene swaps
    Tint { alpha: u8 },
}

/// A fully ordered frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn push(&mut self, command: DrawCommand) {
        self.commands.push(command);
    }
}

// Internal unit of sorting: one drawable, expanded to its command(s).
struct DrawItem {
    layer: WorldLayer,
    sort_key: f32,
    commands: Vec<DrawCommand>,
}

fn scenery_commands(world: &World, offset: Vec2) -> Vec<DrawItem> {
    world
        .scenery
        .iter()
        .map(|scenery| {
            let dst = scenery.rect.pos + offset;
            let command = match &scenery.image {
                SceneryImage::Tile { tile_id } => DrawCommand::Tile {
                    tile_id: *tile_id,
                    dst,
                },
                SceneryImage::Animated {
                    key,
                    frame_count,
                    frame_index,
                } => DrawCommand::Animation {
                    key: key.clone(),
                    frame: (*frame_index as usize) % (*frame_count).max(1),
                    dst,
                },
            };
            DrawItem {
                layer: scenery.layer,
                sort_key: scenery.sort_key,
                commands: vec![command],
            }
        })
        .collect()
}

fn entity_commands(entity: &Entity, offset: Vec2) -> DrawItem {
    let dst = entity.rect.pos + offset;
    DrawItem {
        layer: WorldLayer::Main,
        sort_key: entity.sort_key(),
        commands: vec![
            // The shadow decal always lands just before the sprite itself.
            DrawCommand::Shadow {
                dst: dst + SHADOW_OFFSET,
            },
            DrawCommand::EntitySprite {
                sheet: entity.sheet.clone(),
                state: entity.facing.state_key(entity.is_moving()),
                frame: entity.current_frame(),
                dst,
            },
        ],
    }
}

/// Assemble the world into a frame: partition drawables around the main
/// layer, sort only the main bucket by its vertical key (stable, so equal
/// keys keep insertion order), then emit below -> main -> above.
pub fn compose_world_frame(world: &World, camera: &Camera) -> Frame {
    let offset = camera.offset();

    let mut items = scenery_commands(world, offset);
    items.push(entity_commands(&world.player, offset));
    for character in &world.characters {
        items.push(entity_commands(character, offset));
    }

    let mut below = Vec::new();
    let mut main = Vec::new();
    let mut above = Vec::new();
    for item in items {
        match item.layer.cmp(&WorldLayer::Main) {
            std::cmp::Ordering::Less => below.push(item),
            std::cmp::Ordering::Equal => main.push(item),
            std::cmp::Ordering::Greater => above.push(item),
        }
    }

    below.sort_by_key(|item| item.layer);
    main.sort_by_key(|item| OrderedFloat(item.sort_key));

    let mut frame = Frame::default();
    for bucket in [below, main, above] {
        for item in bucket {
            frame.commands.extend(item.commands);
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::world::entity::{EntityKind, Facing};
    use crate::world::Scenery;
    use pretty_assertions::assert_eq;

    fn empty_world() -> World {
        World {
            map_id: "test".to_string(),
            scenery: Vec::new(),
            collision_rects: Vec::new(),
            patches: Vec::new(),
            transitions: Vec::new(),
            player: Entity::new(
                Vec2::new(640.0, 360.0),
                "player",
                Facing::Down,
                250.0,
                EntityKind::Player,
            ),
            characters: Vec::new(),
        }
    }

    fn tile(layer: WorldLayer, y_bottom: f32, tile_id: u32) -> Scenery {
        let rect = Rect::new(0.0, y_bottom - 64.0, 64.0, 64.0);
        Scenery {
            layer,
            sort_key: rect.bottom(),
            rect,
            image: SceneryImage::Tile { tile_id },
        }
    }

    fn command_tile_ids(frame: &Frame) -> Vec<u32> {
        frame
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Tile { tile_id, .. } => Some(*tile_id),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_camera_centers_focus() {
        let camera = Camera::new(Vec2::new(640.0, 360.0));
        assert_eq!(camera.offset(), Vec2::ZERO);

        let camera = Camera::new(Vec2::new(1000.0, 500.0));
        assert_eq!(camera.offset(), Vec2::new(-360.0, -140.0));
    }

    #[test]
    fn test_layers_partition_around_main() {
        let mut world = empty_world();
        world.scenery.push(tile(WorldLayer::Top, 0.0, 4));
        world.scenery.push(tile(WorldLayer::Main, 9999.0, 3));
        world.scenery.push(tile(WorldLayer::Water, 9999.0, 0));
        world.scenery.push(tile(WorldLayer::Background, 9999.0, 1));

        let frame = compose_world_frame(&world, &Camera::new(Vec2::ZERO));
        // Water and background precede main regardless of sort keys; top
        // follows even with the smallest key.
        assert_eq!(command_tile_ids(&frame), vec![0, 1, 3, 4]);
    }

    #[test]
    fn test_main_bucket_sorts_by_vertical_key() {
        let mut world = empty_world();
        world.player.rect.set_center(Vec2::new(0.0, -4000.0));
        world.player.hitbox.set_center(Vec2::new(0.0, -4000.0));
        world.scenery.push(tile(WorldLayer::Main, 300.0, 30));
        world.scenery.push(tile(WorldLayer::Main, 100.0, 10));
        world.scenery.push(tile(WorldLayer::Main, 200.0, 20));

        let frame = compose_world_frame(&world, &Camera::new(Vec2::ZERO));
        assert_eq!(command_tile_ids(&frame), vec![10, 20, 30]);
    }

    #[test]
    fn test_sort_is_stable_and_idempotent() {
        let mut world = empty_world();
        world.player.rect.set_center(Vec2::new(0.0, -4000.0));
        world.player.hitbox.set_center(Vec2::new(0.0, -4000.0));
        // Two tiles share a key; insertion order must survive.
        world.scenery.push(tile(WorldLayer::Main, 100.0, 1));
        world.scenery.push(tile(WorldLayer::Main, 100.0, 2));

        let first = compose_world_frame(&world, &Camera::new(Vec2::ZERO));
        let second = compose_world_frame(&world, &Camera::new(Vec2::ZERO));
        assert_eq!(command_tile_ids(&first), vec![1, 2]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_entity_shadow_precedes_sprite() {
        let world = empty_world();
        let frame = compose_world_frame(&world, &Camera::new(Vec2::new(640.0, 360.0)));

        let shadow_at = frame
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Shadow { .. }))
            .expect("shadow emitted");
        let sprite_at = frame
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::EntitySprite { .. }))
            .expect("sprite emitted");
        assert!(shadow_at < sprite_at);

        // Shadow decal sits at the fixed offset from the sprite top-left.
        if let (DrawCommand::Shadow { dst: shadow }, DrawCommand::EntitySprite { dst, .. }) =
            (&frame.commands[shadow_at], &frame.commands[sprite_at])
        {
            assert_eq!(*shadow, *dst + SHADOW_OFFSET);
        }
    }
}
