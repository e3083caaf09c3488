use crate::shared::*;
use crate::window::PressState;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn bit(self) -> u8 {
        1 << self as u8
    }

    fn velocity(self, speed: f32) -> (f32, f32) {
        match self {
            Direction::Up => (0., -speed),
            Direction::Down => (0., speed),
            Direction::Left => (-speed, 0.),
            Direction::Right => (speed, 0.),
        }
    }
}

/// What the tiled integrator does with an axis step that left the world or hit a wall.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum CollisionResponse {
    /// Undo the step.
    #[default]
    Revert,
    /// Apply the step a second time. Kept for parity with older builds.
    Reapply,
    /// Stop flush against the wall or world edge.
    Snap,
}

/// How an integration step is constrained.
#[derive(Copy, Clone, Debug)]
pub enum Movement<'a> {
    Tiled {
        grid: &'a TileGrid,
        response: CollisionResponse,
    },
    OpenRoom {
        bounds: Rect,
    },
}

#[derive(Clone, Debug)]
pub struct Actor {
    pub base: ActorBase,
    pub physics: ActorPhysics,
}

#[derive(Clone, Debug)]
pub struct ActorBase {
    pub x: f32,
    pub y: f32,
    pub w: i32,
    pub h: i32,
}

impl ActorBase {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x.floor() as i32, self.y.floor() as i32, self.w, self.h)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ActorPhysics {
    pub last_x: f32,
    pub last_y: f32,
    pub dx: f32,
    pub dy: f32,
    pub speed: f32,
    held: u8,
}

impl Actor {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            base: ActorBase {
                x,
                y,
                w: ACTOR_WIDTH,
                h: ACTOR_HEIGHT,
            },
            physics: ActorPhysics {
                last_x: x,
                last_y: y,
                speed: ACTOR_SPEED,
                ..Default::default()
            },
        }
    }

    pub fn bounds(&self) -> Rect {
        self.base.bounds()
    }

    pub fn velocity(&self) -> (f32, f32) {
        (self.physics.dx, self.physics.dy)
    }

    /// Key-down adds the direction's velocity, the matching key-up takes it away again.
    pub fn handle_input(&mut self, direction: Direction, press_state: PressState) {
        let physics = &mut self.physics;
        let bit = direction.bit();
        let (vx, vy) = direction.velocity(physics.speed);
        match press_state {
            PressState::Down if physics.held & bit == 0 => {
                physics.held |= bit;
                physics.dx += vx;
                physics.dy += vy;
            }
            PressState::Up if physics.held & bit != 0 => {
                physics.held &= !bit;
                physics.dx -= vx;
                physics.dy -= vy;
            }
            _ => {}
        }

        if physics.held == 0 {
            physics.dx = 0.;
            physics.dy = 0.;
        }
    }

    pub fn release_all(&mut self) {
        self.physics.held = 0;
        self.physics.dx = 0.;
        self.physics.dy = 0.;
    }

    pub fn integrate(&mut self, movement: Movement, ft: f32) {
        match movement {
            Movement::OpenRoom { bounds } => {
                update_actor_physics_x(&mut self.base, &mut self.physics, ft);
                clamp_actor_x(&mut self.base, &bounds);
                update_actor_physics_y(&mut self.base, &mut self.physics, ft);
                clamp_actor_y(&mut self.base, &bounds);
            }
            Movement::Tiled { grid, response } => {
                let steps = substeps(&self.base, &self.physics, grid.layout(), ft);
                let ft = ft / steps as f32;
                for _ in 0..steps {
                    update_actor_physics_x(&mut self.base, &mut self.physics, ft);
                    resolve_actor_tile_collision_x(&mut self.base, &mut self.physics, grid, response);
                    update_actor_physics_y(&mut self.base, &mut self.physics, ft);
                    resolve_actor_tile_collision_y(&mut self.base, &mut self.physics, grid, response);
                }
            }
        }
    }
}

/// Number of equal steps `ft` is split into so no single step moves further than the smallest
/// of the actor and tile sides. Keeps fast movement from skipping over a wall.
fn substeps(base: &ActorBase, physics: &ActorPhysics, layout: &GridLayout, ft: f32) -> u32 {
    let max_step = base
        .w
        .min(base.h)
        .min(layout.tile_width)
        .min(layout.tile_height)
        .max(1) as f32;
    let distance = (physics.dx * ft).abs().max((physics.dy * ft).abs());
    if !distance.is_finite() {
        return 1;
    }
    ((distance / max_step).ceil() as u32).clamp(1, 256)
}

pub fn update_actor_physics_x(base: &mut ActorBase, physics: &mut ActorPhysics, ft: f32) {
    physics.last_x = base.x;
    base.x += physics.dx * ft;
}

pub fn update_actor_physics_y(base: &mut ActorBase, physics: &mut ActorPhysics, ft: f32) {
    physics.last_y = base.y;
    base.y += physics.dy * ft;
}

fn clamp_actor_x(base: &mut ActorBase, bounds: &Rect) {
    let max = (bounds.right() - base.w) as f32;
    base.x = base.x.max(bounds.left() as f32).min(max);
}

fn clamp_actor_y(base: &mut ActorBase, bounds: &Rect) {
    let max = (bounds.bottom() - base.h) as f32;
    base.y = base.y.max(bounds.top() as f32).min(max);
}

fn blocked(base: &ActorBase, grid: &TileGrid) -> bool {
    let world = grid.world_bounds();
    base.x < world.left() as f32
        || base.y < world.top() as f32
        || base.x + base.w as f32 > world.right() as f32
        || base.y + base.h as f32 > world.bottom() as f32
        || grid.overlaps_blocking(&base.bounds())
}

pub fn resolve_actor_tile_collision_x(
    base: &mut ActorBase,
    physics: &mut ActorPhysics,
    grid: &TileGrid,
    response: CollisionResponse,
) {
    if !blocked(base, grid) {
        return;
    }

    match response {
        CollisionResponse::Revert => base.x = physics.last_x,
        CollisionResponse::Reapply => base.x += base.x - physics.last_x,
        CollisionResponse::Snap => {
            clamp_actor_x(base, &grid.world_bounds());
            let bounds = base.bounds();
            let walls = grid.blocking_overlaps(&bounds).map(|tile| tile.bounds);
            let flush = if base.x > physics.last_x {
                walls.map(|wall| wall.left()).min().map(|left| left - base.w)
            } else {
                walls.map(|wall| wall.right()).max()
            };
            if let Some(x) = flush {
                base.x = x as f32;
            }
            if blocked(base, grid) {
                base.x = physics.last_x;
            }
        }
    }
}

pub fn resolve_actor_tile_collision_y(
    base: &mut ActorBase,
    physics: &mut ActorPhysics,
    grid: &TileGrid,
    response: CollisionResponse,
) {
    if !blocked(base, grid) {
        return;
    }

    match response {
        CollisionResponse::Revert => base.y = physics.last_y,
        CollisionResponse::Reapply => base.y += base.y - physics.last_y,
        CollisionResponse::Snap => {
            clamp_actor_y(base, &grid.world_bounds());
            let bounds = base.bounds();
            let walls = grid.blocking_overlaps(&bounds).map(|tile| tile.bounds);
            let flush = if base.y > physics.last_y {
                walls.map(|wall| wall.top()).min().map(|top| top - base.h)
            } else {
                walls.map(|wall| wall.bottom()).max()
            };
            if let Some(y) = flush {
                base.y = y as f32;
            }
            if blocked(base, grid) {
                base.y = physics.last_y;
            }
        }
    }
}
