use crate::geometry::Rect;
use crate::settings::{
    ANIMATION_SPEED, CHARACTER_IDLE_FRAMES, CHARACTER_WALK_FRAMES, ENTITY_HITBOX_SHRINK_Y,
    ENTITY_SIZE, LOOK_AROUND_INTERVAL,
};
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Up,
    Down,
    Left,
    Right,
}

impl Facing {
    /// Animation-sheet key for this facing, e.g. "left" / "left_idle".
    pub fn state_key(self, moving: bool) -> &'static str {
        match (self, moving) {
            (Facing::Up, true) => "up",
            (Facing::Down, true) => "down",
            (Facing::Left, true) => "left",
            (Facing::Right, true) => "right",
            (Facing::Up, false) => "up_idle",
            (Facing::Down, false) => "down_idle",
            (Facing::Left, false) => "left_idle",
            (Facing::Right, false) => "right_idle",
        }
    }
}

/// Behavior variant carried by an entity. Free functions in the world module
/// dispatch on this instead of a class hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    Player,
    Character {
        /// Key into the trainer table
        trainer_id: String,
        /// Facing cycle while idle; empty means hold still
        directions: Vec<Facing>,
        /// Whether the idle cycle is active at all
        look_around: bool,
        /// Cleared while the character is locked facing a dialog partner
        can_rotate: bool,
        /// Countdown to the next idle rotation
        rotate_timer: f32,
        /// Index into `directions`
        direction_index: usize,
        /// Radius of the player-notice proximity check
        notice_radius: f32,
    },
}

/// A positioned, animated actor. Both the player and NPC characters are
/// entities; the `kind` tag selects behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Current movement input. Deliberately unnormalized: diagonal motion
    /// is faster.
    pub direction: Vec2,
    pub facing: Facing,
    pub speed: f32,
    /// Full sprite rect; `pos` is its top-left
    pub rect: Rect,
    /// Shrunk collision box kept centered on the sprite rect
    pub hitbox: Rect,
    pub frame_index: f32,
    /// Set by overlays/transitions; a blocked entity ignores its input
    pub blocked: bool,
    /// Character-sheet key for the animation provider
    pub sheet: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(center: Vec2, sheet: &str, facing: Facing, speed: f32, kind: EntityKind) -> Self {
        let rect = Rect::from_center(center, ENTITY_SIZE);
        let hitbox = rect.inflate(0.0, -ENTITY_HITBOX_SHRINK_Y);
        Entity {
            direction: Vec2::ZERO,
            facing,
            speed,
            rect,
            hitbox,
            frame_index: 0.0,
            blocked: false,
            sheet: sheet.to_string(),
            kind,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    pub fn is_moving(&self) -> bool {
        !self.blocked && self.direction != Vec2::ZERO
    }

    /// Y coordinate used for painter's-algorithm ordering in the main layer.
    pub fn sort_key(&self) -> f32 {
        self.hitbox.bottom()
    }

    pub fn block(&mut self) {
        self.blocked = true;
        self.direction = Vec2::ZERO;
    }

    pub fn unblock(&mut self) {
        self.blocked = false;
    }

    /// Update facing from the current input vector. Horizontal input sets
    /// left/right, then vertical input sets up/down; both writes can land in
    /// the same tick, in that order.
    pub fn update_facing(&mut self) {
        if self.direction.x != 0.0 {
            self.facing = if self.direction.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
        }
        if self.direction.y != 0.0 {
            self.facing = if self.direction.y > 0.0 {
                Facing::Down
            } else {
                Facing::Up
            };
        }
    }

    /// Advance the animation clock. The frame count depends on whether the
    /// entity is walking or idling.
    pub fn animate(&mut self, dt: f32) {
        self.frame_index += ANIMATION_SPEED * dt;
        let frames = self.frame_count();
        if self.frame_index >= frames as f32 {
            self.frame_index %= frames as f32;
        }
    }

    pub fn frame_count(&self) -> usize {
        if self.is_moving() {
            CHARACTER_WALK_FRAMES
        } else {
            CHARACTER_IDLE_FRAMES
        }
    }

    /// Current animation frame, clamped to the active state's frame count.
    pub fn current_frame(&self) -> usize {
        (self.frame_index as usize) % self.frame_count()
    }

    /// Snap facing toward a world point, picking the dominant axis. Used
    /// when a character turns to its dialog partner.
    pub fn face_point(&mut self, target: Vec2) {
        let relation = target - self.center();
        if relation.x.abs() > relation.y.abs() {
            self.facing = if relation.x > 0.0 {
                Facing::Right
            } else {
                Facing::Left
            };
        } else {
            self.facing = if relation.y > 0.0 {
                Facing::Down
            } else {
                Facing::Up
            };
        }
    }

    /// Idle behavior for characters: rotate through the facing cycle on a
    /// fixed interval while allowed to.
    pub fn update_idle_rotation(&mut self, dt: f32) {
        if let EntityKind::Character {
            directions,
            look_around,
            can_rotate,
            rotate_timer,
            direction_index,
            ..
        } = &mut self.kind
        {
            if !*look_around || !*can_rotate || directions.len() < 2 {
                return;
            }
            *rotate_timer -= dt;
            if *rotate_timer <= 0.0 {
                *rotate_timer = LOOK_AROUND_INTERVAL;
                *direction_index = (*direction_index + 1) % directions.len();
                self.facing = directions[*direction_index];
            }
        }
    }
}

/// Proximity/facing query: can `speaker` interact with `target`? True iff
/// the centers are within `radius` and the speaker's facing points at the
/// target within a perpendicular `tolerance` band. Pure; no side effects.
pub fn check_connection(radius: f32, speaker: &Entity, target: &Entity, tolerance: f32) -> bool {
    let relation = target.center() - speaker.center();
    if relation.length() >= radius {
        return false;
    }

    match speaker.facing {
        Facing::Left => relation.x < 0.0 && relation.y.abs() < tolerance,
        Facing::Right => relation.x > 0.0 && relation.y.abs() < tolerance,
        Facing::Up => relation.y < 0.0 && relation.x.abs() < tolerance,
        Facing::Down => relation.y > 0.0 && relation.x.abs() < tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn entity_at(x: f32, y: f32, facing: Facing) -> Entity {
        Entity::new(Vec2::new(x, y), "player", facing, 250.0, EntityKind::Player)
    }

    #[test]
    fn test_facing_follows_both_axes_in_one_tick() {
        let mut entity = entity_at(0.0, 0.0, Facing::Left);
        entity.direction = Vec2::new(1.0, -1.0);
        entity.update_facing();
        // Horizontal write lands first, vertical last.
        assert_eq!(entity.facing, Facing::Up);

        entity.direction = Vec2::new(1.0, 0.0);
        entity.update_facing();
        assert_eq!(entity.facing, Facing::Right);

        // No input leaves facing untouched.
        entity.direction = Vec2::ZERO;
        entity.update_facing();
        assert_eq!(entity.facing, Facing::Right);
    }

    #[test]
    fn test_hitbox_is_inset_and_centered() {
        let entity = entity_at(100.0, 100.0, Facing::Down);
        assert_eq!(entity.hitbox.center(), entity.rect.center());
        assert!(entity.hitbox.size.y < entity.rect.size.y);
        assert_eq!(entity.hitbox.size.x, entity.rect.size.x);
    }

    #[rstest]
    // Target 50px above, small sideways offset: connected.
    #[case(Facing::Up, Vec2::new(5.0, -50.0), true)]
    // Same target but 40px sideways falls outside the tolerance band.
    #[case(Facing::Up, Vec2::new(40.0, -50.0), false)]
    // Facing away from the target never connects.
    #[case(Facing::Down, Vec2::new(5.0, -50.0), false)]
    #[case(Facing::Left, Vec2::new(-60.0, 10.0), true)]
    #[case(Facing::Right, Vec2::new(-60.0, 10.0), false)]
    fn test_check_connection_facing_band(
        #[case] facing: Facing,
        #[case] offset: Vec2,
        #[case] expected: bool,
    ) {
        let speaker = entity_at(500.0, 500.0, facing);
        let target = entity_at(500.0 + offset.x, 500.0 + offset.y, Facing::Down);
        assert_eq!(check_connection(100.0, &speaker, &target, 30.0), expected);
    }

    #[test]
    fn test_check_connection_radius_limit() {
        let speaker = entity_at(0.0, 0.0, Facing::Right);
        let near = entity_at(90.0, 0.0, Facing::Left);
        let far = entity_at(150.0, 0.0, Facing::Left);

        assert!(check_connection(100.0, &speaker, &near, 30.0));
        assert!(!check_connection(100.0, &speaker, &far, 30.0));
    }

    #[test]
    fn test_face_point_picks_dominant_axis() {
        let mut entity = entity_at(0.0, 0.0, Facing::Down);
        entity.face_point(Vec2::new(100.0, 20.0));
        assert_eq!(entity.facing, Facing::Right);

        entity.face_point(Vec2::new(10.0, -80.0));
        assert_eq!(entity.facing, Facing::Up);
    }

    #[test]
    fn test_blocked_entity_reports_not_moving() {
        let mut entity = entity_at(0.0, 0.0, Facing::Down);
        entity.direction = Vec2::new(1.0, 0.0);
        assert!(entity.is_moving());

        entity.block();
        assert!(!entity.is_moving());
        assert_eq!(entity.direction, Vec2::ZERO);
    }
}
