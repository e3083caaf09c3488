use crate::shared::*;
use lazy_static::lazy_static;

#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TileKind {
    // Floor.
    Red = 0,
    Green,
    Blue,
    // Walls.
    Center,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    TopLeft,

    // Last element
    SIZE,
}

pub const TILE_KIND_COUNT: usize = TileKind::SIZE as usize;

const ALL_TILE_KINDS: [TileKind; TILE_KIND_COUNT] = [
    TileKind::Red,
    TileKind::Green,
    TileKind::Blue,
    TileKind::Center,
    TileKind::Top,
    TileKind::TopRight,
    TileKind::Right,
    TileKind::BottomRight,
    TileKind::Bottom,
    TileKind::BottomLeft,
    TileKind::Left,
    TileKind::TopLeft,
];

impl TileKind {
    /// Map code as it appears in a map description.
    pub fn from_code(code: i64) -> Option<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|index| ALL_TILE_KINDS.get(index))
            .copied()
    }

    pub fn is_blocking(self) -> bool {
        TILE_PHYSICS_PROPERTIES[self as usize].solid
    }

    pub fn clip(self) -> Rect {
        let property = TILE_TEXTURE_PROPERTIES[self as usize];
        Rect::new(property.u, property.v, TILE_WIDTH, TILE_HEIGHT)
    }
}

lazy_static! {
    pub static ref TILE_TEXTURE_PROPERTIES: [TileTextureProperty; TILE_KIND_COUNT] =
        TileTextureProperty::gen();
    pub static ref TILE_PHYSICS_PROPERTIES: [TilePhysicsProperty; TILE_KIND_COUNT] =
        TilePhysicsProperty::gen();
}

/// Clip offset of a tile sprite inside the tile sheet.
#[derive(Copy, Clone, Debug)]
pub struct TileTextureProperty {
    pub u: i32,
    pub v: i32,
}

impl TileTextureProperty {
    fn gen() -> [Self; TILE_KIND_COUNT] {
        let mut map = [Self { u: 0, v: 0 }; TILE_KIND_COUNT];

        // Column 0: floor colours.
        map[TileKind::Red as usize] = Self { u: 0, v: 0 };
        map[TileKind::Green as usize] = Self { u: 0, v: 80 };
        map[TileKind::Blue as usize] = Self { u: 0, v: 160 };

        // Column 1: left edge.
        map[TileKind::TopLeft as usize] = Self { u: 80, v: 0 };
        map[TileKind::Left as usize] = Self { u: 80, v: 80 };
        map[TileKind::BottomLeft as usize] = Self { u: 80, v: 160 };

        // Column 2: middle.
        map[TileKind::Top as usize] = Self { u: 160, v: 0 };
        map[TileKind::Center as usize] = Self { u: 160, v: 80 };
        map[TileKind::Bottom as usize] = Self { u: 160, v: 160 };

        // Column 3: right edge.
        map[TileKind::TopRight as usize] = Self { u: 240, v: 0 };
        map[TileKind::Right as usize] = Self { u: 240, v: 80 };
        map[TileKind::BottomRight as usize] = Self { u: 240, v: 160 };

        return map;
    }
}

#[derive(Copy, Clone, Debug)]
pub struct TilePhysicsProperty {
    pub solid: bool,
}

impl TilePhysicsProperty {
    fn gen() -> [Self; TILE_KIND_COUNT] {
        // Generate default map.
        let mut map = [Self { solid: true }; TILE_KIND_COUNT];

        // Floor tiles are decoration only.
        map[TileKind::Red as usize] = Self { solid: false };
        map[TileKind::Green as usize] = Self { solid: false };
        map[TileKind::Blue as usize] = Self { solid: false };

        return map;
    }
}

/// One grid cell.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tile {
    pub bounds: Rect,
    pub kind: TileKind,
}

impl Tile {
    pub fn is_blocking(&self) -> bool {
        self.kind.is_blocking()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_round_trip_through_kinds() {
        for code in 0..TILE_KIND_COUNT as i64 {
            let kind = TileKind::from_code(code).unwrap();
            assert_eq!(kind as i64, code);
        }
        assert_eq!(TileKind::from_code(3), Some(TileKind::Center));
        assert_eq!(TileKind::from_code(11), Some(TileKind::TopLeft));
    }

    #[test]
    fn out_of_range_codes_are_rejected() {
        assert_eq!(TileKind::from_code(-1), None);
        assert_eq!(TileKind::from_code(12), None);
        assert_eq!(TileKind::from_code(i64::MAX), None);
    }

    #[test]
    fn only_floor_tiles_are_passable() {
        let passable: Vec<_> = ALL_TILE_KINDS
            .iter()
            .filter(|kind| !kind.is_blocking())
            .copied()
            .collect();
        assert_eq!(passable, vec![TileKind::Red, TileKind::Green, TileKind::Blue]);
    }

    #[test]
    fn clip_table() {
        let expect = [
            (TileKind::Red, 0, 0),
            (TileKind::Green, 0, 80),
            (TileKind::Blue, 0, 160),
            (TileKind::TopLeft, 80, 0),
            (TileKind::Left, 80, 80),
            (TileKind::BottomLeft, 80, 160),
            (TileKind::Top, 160, 0),
            (TileKind::Center, 160, 80),
            (TileKind::Bottom, 160, 160),
            (TileKind::TopRight, 240, 0),
            (TileKind::Right, 240, 80),
            (TileKind::BottomRight, 240, 160),
        ];
        for (kind, u, v) in expect {
            assert_eq!(kind.clip(), Rect::new(u, v, 80, 80), "{kind:?}");
        }
    }
}
