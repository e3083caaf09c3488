use crate::shared::*;

/// Viewport into the world, sized to the screen.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Camera {
    pub rect: Rect,
}

impl Camera {
    pub fn new(w: i32, h: i32) -> Self {
        Self {
            rect: Rect::new(0, 0, w, h),
        }
    }

    pub fn fixed(rect: Rect) -> Self {
        Self { rect }
    }

    /// Centers the viewport on `target`, then clamps it to the world.
    pub fn update(&mut self, target: &Rect, world_w: i32, world_h: i32) -> Rect {
        let (cx, cy) = target.center();
        let x = cx - self.rect.w / 2;
        let y = cy - self.rect.h / 2;

        // A world smaller than the viewport pins the camera to the origin.
        self.rect.x = x.min(world_w - self.rect.w).max(0);
        self.rect.y = y.min(world_h - self.rect.h).max(0);
        self.rect
    }

    /// World position to screen position.
    pub fn to_screen(&self, rect: &Rect) -> Rect {
        rect.offset(-self.rect.x, -self.rect.y)
    }
}
