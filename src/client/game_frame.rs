use crate::client::pixel_buffer::PixelBufferView;
use crate::shared::{Rect, TileKind};

/// Everything the renderer needs for one frame, already in screen space.
#[derive(Clone, Debug)]
pub struct GameFrame<'a> {
    // Viewport.
    pub viewport: Rect,

    // Tile data.
    pub tiles: Vec<TileSprite>,

    // Actor.
    pub actor: Option<Rect>,

    // Stream.
    pub stream: Option<StreamSprite<'a>>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct TileSprite {
    pub dst: Rect,
    pub kind: TileKind,
}

impl TileSprite {
    pub fn clip(&self) -> Rect {
        self.kind.clip()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct StreamSprite<'a> {
    pub dst: Rect,
    pub pixels: PixelBufferView<'a>,
}
