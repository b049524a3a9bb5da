use serde::{Deserialize, Serialize};

use crate::geometry::Aabb;

/// Simulation state shared by every actor: continuous center position, the
/// virtual bounding box, lifecycle flags, and the animation clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorCore {
    pub x: f32,
    pub y: f32,
    /// Half size of the virtual bounding box. Defaults to half a cell;
    /// subtypes override with a smaller, more forgiving hitbox.
    pub half_extent: f32,
    pub active: bool,
    pub marked_for_removal: bool,
    /// Accumulated animation time, advanced once per tick.
    pub anim_clock: f32,
}

impl ActorCore {
    pub fn new(x: f32, y: f32, half_extent: f32) -> Self {
        Self {
            x,
            y,
            half_extent,
            active: true,
            marked_for_removal: false,
            anim_clock: 0.0,
        }
    }

    /// Advance the animation clock.
    pub fn tick(&mut self, dt: f32) {
        self.anim_clock += dt;
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Current frame for a sprite cycle of `frame_count` frames at `fps`.
    pub fn frame(&self, frame_count: u32, fps: f32) -> u32 {
        if frame_count == 0 {
            return 0;
        }
        (self.anim_clock * fps) as u32 % frame_count
    }
}

/// Capability interface shared by every simulated object (player, enemy,
/// bomb, explosion, pickup). Concrete types embed an [`ActorCore`] and
/// expose it here, so the owning collections can store and update them
/// uniformly without an inheritance tree.
pub trait Actor {
    fn core(&self) -> &ActorCore;
    fn core_mut(&mut self) -> &mut ActorCore;

    /// Advance this actor's timers and animation by one tick.
    fn update(&mut self, dt: f32);

    /// Number of frames in this actor's sprite cycle.
    fn frame_count(&self) -> u32 {
        1
    }

    fn bounding_box(&self) -> Aabb {
        let c = self.core();
        Aabb::new(c.x, c.y, c.half_extent)
    }

    /// Inactive actors never participate in collision or damage checks.
    fn is_active(&self) -> bool {
        self.core().active
    }

    fn is_marked_for_removal(&self) -> bool {
        self.core().marked_for_removal
    }

    /// Deactivate and flag for the owning collection's removal sweep.
    fn mark_removed(&mut self) {
        let c = self.core_mut();
        c.active = false;
        c.marked_for_removal = true;
    }
}
