use crate::shared::*;
use std::io::BufRead;
use std::num::IntErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("map ended after {found} of {expected} tiles")]
    Truncated { expected: usize, found: usize },
    #[error("invalid tile code {code} at index {index}")]
    InvalidCode { index: usize, code: String },
    #[error("non-numeric token {token:?} at index {index}")]
    InvalidToken { index: usize, token: String },
    #[error("map has more than {expected} tiles")]
    TrailingData { expected: usize },
    #[error("failed to read map: {0}")]
    Io(#[from] std::io::Error),
}

/// World and cell dimensions of a grid.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct GridLayout {
    pub world_width: i32,
    pub world_height: i32,
    pub tile_width: i32,
    pub tile_height: i32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            world_width: LEVEL_WIDTH,
            world_height: LEVEL_HEIGHT,
            tile_width: TILE_WIDTH,
            tile_height: TILE_HEIGHT,
        }
    }
}

impl GridLayout {
    pub fn columns(&self) -> usize {
        (self.world_width / self.tile_width) as usize
    }

    pub fn rows(&self) -> usize {
        (self.world_height / self.tile_height) as usize
    }

    pub fn total_tiles(&self) -> usize {
        self.columns() * self.rows()
    }

    pub fn world_bounds(&self) -> Rect {
        Rect::new(0, 0, self.world_width, self.world_height)
    }

    /// Top-left corner of cell `index`.
    pub fn cell_origin(&self, index: usize) -> (i32, i32) {
        let offset = index as i64 * self.tile_width as i64;
        let x = offset % self.world_width as i64;
        let y = offset / self.world_width as i64 * self.tile_height as i64;
        (x as i32, y as i32)
    }
}

#[derive(Clone, Debug)]
pub struct TileGrid {
    layout: GridLayout,
    tiles: Box<[Tile]>,
}

impl TileGrid {
    /// Reads exactly `layout.total_tiles()` codes, one line at a time.
    pub fn load(reader: impl BufRead, layout: GridLayout) -> Result<Self, LoadError> {
        let expected = layout.total_tiles();
        let mut tiles = Vec::with_capacity(expected);

        for line in reader.lines() {
            let line = line?;
            for token in line.split_whitespace() {
                let index = tiles.len();
                if index == expected {
                    return Err(LoadError::TrailingData { expected });
                }

                let invalid_code = || LoadError::InvalidCode {
                    index,
                    code: token.to_owned(),
                };
                let code = match token.parse::<i64>() {
                    Ok(code) => code,
                    // A number too wide for i64 is still a number, just out of range.
                    Err(err)
                        if matches!(
                            err.kind(),
                            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow
                        ) =>
                    {
                        return Err(invalid_code())
                    }
                    Err(_) => {
                        return Err(LoadError::InvalidToken {
                            index,
                            token: token.to_owned(),
                        })
                    }
                };
                let kind = TileKind::from_code(code).ok_or_else(invalid_code)?;

                let (x, y) = layout.cell_origin(index);
                tiles.push(Tile {
                    bounds: Rect::new(x, y, layout.tile_width, layout.tile_height),
                    kind,
                });
            }
        }

        if tiles.len() < expected {
            return Err(LoadError::Truncated {
                expected,
                found: tiles.len(),
            });
        }

        Ok(Self {
            layout,
            tiles: tiles.into_boxed_slice(),
        })
    }

    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    pub fn world_bounds(&self) -> Rect {
        self.layout.world_bounds()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        if !(0..self.layout.world_width).contains(&x) || !(0..self.layout.world_height).contains(&y)
        {
            return None;
        }
        let column = (x / self.layout.tile_width) as usize;
        let row = (y / self.layout.tile_height) as usize;
        self.tiles.get(column + row * self.layout.columns())
    }

    pub fn overlaps_blocking(&self, rect: &Rect) -> bool {
        self.blocking_overlap(rect).is_some()
    }

    /// First blocking tile, in grid order, that overlaps `rect`.
    pub fn blocking_overlap(&self, rect: &Rect) -> Option<&Tile> {
        self.blocking_overlaps(rect).next()
    }

    pub fn blocking_overlaps<'a>(&'a self, rect: &Rect) -> impl Iterator<Item = &'a Tile> + 'a {
        let rect = *rect;
        self.tiles
            .iter()
            .filter(move |tile| tile.is_blocking() && tile.bounds.overlaps(&rect))
    }

    pub fn visible_tiles<'a>(&'a self, camera: &Rect) -> impl Iterator<Item = &'a Tile> + 'a {
        let camera = *camera;
        self.tiles
            .iter()
            .filter(move |tile| tile.bounds.overlaps(&camera))
    }
}
