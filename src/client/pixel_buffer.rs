use image::ImageError;

pub const BYTES_PER_PIXEL: u32 = 4;

/// Cyan is treated as transparent in every sprite.
pub const COLOR_KEY: [u8; 3] = [0x00, 0xFF, 0xFF];

/// Decoded RGBA8 pixels, rows `pitch` bytes apart.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pitch: u32,
    data: Box<[u8]>,
}

/// Borrowed view of one buffer's bytes.
#[derive(Copy, Clone, Debug)]
pub struct PixelBufferView<'a> {
    pub width: u32,
    pub height: u32,
    pub pitch: u32,
    pub bytes: &'a [u8],
}

impl PixelBuffer {
    /// Decodes an encoded image (PNG or BMP) and keys out `COLOR_KEY`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ImageError> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = image.dimensions();
        let mut buffer = Self {
            width,
            height,
            pitch: width * BYTES_PER_PIXEL,
            data: image.into_raw().into_boxed_slice(),
        };
        buffer.apply_color_key(COLOR_KEY);
        Ok(buffer)
    }

    pub fn apply_color_key(&mut self, key: [u8; 3]) {
        for pixel in self.data.chunks_exact_mut(BYTES_PER_PIXEL as usize) {
            if pixel[..3] == key {
                pixel[3] = 0;
            }
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pitch(&self) -> u32 {
        self.pitch
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn view(&self) -> PixelBufferView<'_> {
        PixelBufferView {
            width: self.width,
            height: self.height,
            pitch: self.pitch,
            bytes: &self.data,
        }
    }
}

impl PixelBufferView<'_> {
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}
