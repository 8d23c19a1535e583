use glam::Vec2;

// Window / tile geometry. The viewport is fixed; the host window may scale it.
pub const WINDOW_WIDTH: f32 = 1280.0;
pub const WINDOW_HEIGHT: f32 = 720.0;
pub const TILE_SIZE: f32 = 64.0;

/// Animation frames advanced per second (applied to a float frame index).
pub const ANIMATION_SPEED: f32 = 6.0;

/// Screen tint ramp rate, alpha units per second (0..=255 range).
pub const FADE_SPEED: f32 = 600.0;

/// Player walking speed in pixels per second.
pub const PLAYER_SPEED: f32 = 250.0;

/// Shadow decal offset from an entity's sprite top-left, in pixels.
pub const SHADOW_OFFSET: Vec2 = Vec2::new(40.0, 110.0);

/// Full character sprite frame size in pixels.
pub const ENTITY_SIZE: Vec2 = Vec2::new(128.0, 128.0);

/// Vertical inset applied to an entity's hitbox relative to its sprite rect.
pub const ENTITY_HITBOX_SHRINK_Y: f32 = 60.0;

/// Default radius for the NPC proximity check.
pub const NOTICE_RADIUS: f32 = 100.0;

/// Perpendicular tolerance band for the facing part of the proximity check.
pub const FACING_TOLERANCE: f32 = 30.0;

/// Encounter timer duration range in seconds; re-rolled on every arm.
pub const ENCOUNTER_DELAY_MIN: f32 = 0.8;
pub const ENCOUNTER_DELAY_MAX: f32 = 2.5;

/// How long the evolution overlay animation plays before the swap lands.
pub const EVOLUTION_DURATION: f32 = 1.8;

/// How many seconds a looking-around character waits before rotating.
pub const LOOK_AROUND_INTERVAL: f32 = 2.0;

// Frame counts handed out by the default animation catalog. The asset
// pipeline slices character sheets into four-frame walk rows with a single
// idle frame.
pub const CHARACTER_WALK_FRAMES: usize = 4;
pub const CHARACTER_IDLE_FRAMES: usize = 1;
