/// Integer axis-aligned box. Used for tile bounds, the actor box and the camera viewport.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    pub fn left(&self) -> i32 {
        self.x
    }

    pub fn right(&self) -> i32 {
        self.x + self.w
    }

    pub fn top(&self) -> i32 {
        self.y
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.h
    }

    pub fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Half-open overlap test: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        overlaps(self, other)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.w, self.h)
    }
}

pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    if a.bottom() <= b.top() {
        return false;
    }
    if a.top() >= b.bottom() {
        return false;
    }
    if a.right() <= b.left() {
        return false;
    }
    if a.left() >= b.right() {
        return false;
    }
    true
}
