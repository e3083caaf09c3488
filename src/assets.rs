use crate::client::frame_source::{FrameSource, FrameSourceError, FRAME_COUNT};
use crate::client::pixel_buffer::PixelBuffer;
use crate::shared::*;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

pub const MAP_FILE: &str = "lazy.map";
pub const TILE_SHEET_FILE: &str = "tiles.png";
pub const ACTOR_SPRITE_FILE: &str = "dot.bmp";

#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to load tile map {path}: {source}")]
    Map {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
    #[error(transparent)]
    Frames(#[from] FrameSourceError),
}

pub fn frame_file(slot: usize) -> String {
    format!("foo_walk_{slot}.png")
}

pub fn load_tile_grid(assets: &Path) -> Result<TileGrid, AssetLoadError> {
    let path = assets.join(MAP_FILE);
    let file = File::open(&path).map_err(|source| AssetLoadError::Io {
        path: path.clone(),
        source,
    })?;
    let grid = TileGrid::load(BufReader::new(file), GridLayout::default())
        .map_err(|source| AssetLoadError::Map { path: path.clone(), source })?;
    debug!(path = %path.display(), tiles = grid.tiles().len(), "loaded tile map");
    Ok(grid)
}

pub fn load_image(path: &Path) -> Result<PixelBuffer, AssetLoadError> {
    let bytes = std::fs::read(path).map_err(|source| AssetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = PixelBuffer::decode(&bytes).map_err(|source| AssetLoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        width = image.width(),
        height = image.height(),
        "decoded image"
    );
    Ok(image)
}

/// All animation frames or nothing.
pub fn load_frames(assets: &Path) -> Result<FrameSource, AssetLoadError> {
    let mut frames = Vec::with_capacity(FRAME_COUNT);
    for slot in 0..FRAME_COUNT {
        let path = assets.join(frame_file(slot));
        if !path.is_file() {
            return Err(FrameSourceError::MissingFrame { slot }.into());
        }
        frames.push(load_image(&path)?);
    }
    Ok(FrameSource::new(frames)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::shared::tile_grid::test::TOTAL_TILES;

    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new() -> Self {
            static COUNTER: AtomicUsize = AtomicUsize::new(0);
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir()
                .join(format!("tileworld-assets-{}-{n}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        RgbaImage::from_pixel(w, h, Rgba([1, 2, 3, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn bundled_map_loads() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        let grid = load_tile_grid(&assets).unwrap();
        assert_eq!(grid.tiles().len(), TOTAL_TILES);
    }

    #[test]
    fn bundled_images_decode() {
        let assets = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");

        let sheet = load_image(&assets.join(TILE_SHEET_FILE)).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (320, 240));

        // The sprite's corners are colour-keyed.
        let dot = load_image(&assets.join(ACTOR_SPRITE_FILE)).unwrap();
        assert_eq!((dot.width(), dot.height()), (ACTOR_WIDTH as u32, ACTOR_HEIGHT as u32));
        assert_eq!(dot.bytes()[3], 0);

        assert!(load_frames(&assets).is_ok());
    }

    #[test]
    fn missing_map_is_io_error() {
        let dir = ScratchDir::new();
        assert!(matches!(load_tile_grid(&dir.0), Err(AssetLoadError::Io { .. })));
    }

    #[test]
    fn bad_map_is_map_error() {
        let dir = ScratchDir::new();
        std::fs::write(dir.0.join(MAP_FILE), "00 01 02").unwrap();
        assert!(matches!(
            load_tile_grid(&dir.0),
            Err(AssetLoadError::Map {
                source: LoadError::Truncated { .. },
                ..
            })
        ));
    }

    #[test]
    fn undecodable_image() {
        let dir = ScratchDir::new();
        let path = dir.0.join(TILE_SHEET_FILE);
        std::fs::write(&path, b"not a png").unwrap();
        assert!(matches!(load_image(&path), Err(AssetLoadError::Decode { .. })));
    }

    #[test]
    fn frames_load_all_or_nothing() {
        let dir = ScratchDir::new();
        for slot in 0..FRAME_COUNT - 1 {
            write_png(&dir.0.join(frame_file(slot)), 8, 6);
        }
        assert!(matches!(
            load_frames(&dir.0),
            Err(AssetLoadError::Frames(FrameSourceError::MissingFrame { slot: 3 }))
        ));

        write_png(&dir.0.join(frame_file(3)), 8, 7);
        assert!(matches!(
            load_frames(&dir.0),
            Err(AssetLoadError::Frames(FrameSourceError::SizeMismatch { slot: 3, .. }))
        ));

        write_png(&dir.0.join(frame_file(3)), 8, 6);
        let source = load_frames(&dir.0).unwrap();
        assert_eq!(source.frame_size(), (8, 6));
    }
}
