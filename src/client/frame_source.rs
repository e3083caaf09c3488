use crate::client::pixel_buffer::{PixelBuffer, PixelBufferView};
use thiserror::Error;

pub const FRAME_COUNT: usize = 4;

const FIRST_COUNTDOWN: u32 = 4;
const FRAME_COUNTDOWN: u32 = 10;

#[derive(Debug, Error, Eq, PartialEq)]
pub enum FrameSourceError {
    #[error("animation frame {slot} is missing")]
    MissingFrame { slot: usize },
    #[error("expected {FRAME_COUNT} animation frames, got {count}")]
    TooManyFrames { count: usize },
    #[error("animation frame {slot} is {actual:?}, frame 0 is {expected:?}")]
    SizeMismatch {
        slot: usize,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}

/// Cycles through equally sized frames, advancing once per `FRAME_COUNTDOWN` calls.
#[derive(Debug)]
pub struct FrameSource {
    frames: Box<[PixelBuffer]>,
    current: usize,
    countdown: u32,
}

impl FrameSource {
    pub fn new(frames: Vec<PixelBuffer>) -> Result<Self, FrameSourceError> {
        if frames.len() < FRAME_COUNT {
            return Err(FrameSourceError::MissingFrame { slot: frames.len() });
        }
        if frames.len() > FRAME_COUNT {
            return Err(FrameSourceError::TooManyFrames {
                count: frames.len(),
            });
        }

        let expected = (frames[0].width(), frames[0].height());
        for (slot, frame) in frames.iter().enumerate().skip(1) {
            let actual = (frame.width(), frame.height());
            if actual != expected {
                return Err(FrameSourceError::SizeMismatch {
                    slot,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            frames: frames.into_boxed_slice(),
            current: 0,
            countdown: FIRST_COUNTDOWN,
        })
    }

    /// Ticks the countdown and returns the frame to show this tick.
    pub fn advance(&mut self) -> PixelBufferView<'_> {
        self.countdown -= 1;
        if self.countdown == 0 {
            self.current = (self.current + 1) % FRAME_COUNT;
            self.countdown = FRAME_COUNTDOWN;
        }
        self.frames[self.current].view()
    }

    pub fn frame_size(&self) -> (u32, u32) {
        (self.frames[0].width(), self.frames[0].height())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    // Each frame is filled with its own index so views can be told apart.
    fn frames(n: usize, w: u32, h: u32) -> Vec<PixelBuffer> {
        (0..n)
            .map(|i| PixelBuffer::filled(w, h, [i as u8; 4]))
            .collect()
    }

    #[test]
    fn first_switch_after_four_calls() {
        let mut source = FrameSource::new(frames(FRAME_COUNT, 2, 2)).unwrap();
        let shown: Vec<u8> = (0..4).map(|_| source.advance().bytes[0]).collect();
        assert_eq!(shown, vec![0, 0, 0, 1]);
    }

    #[test]
    fn later_switches_every_ten_calls() {
        let mut source = FrameSource::new(frames(FRAME_COUNT, 2, 2)).unwrap();
        for _ in 0..4 {
            source.advance();
        }
        assert_eq!(source.current, 1);

        for expected in [2, 3, 0, 1, 2] {
            for _ in 0..9 {
                assert_eq!(source.advance().bytes[0] as usize, (expected + 3) % 4);
            }
            assert_eq!(source.advance().bytes[0] as usize, expected);
        }
    }

    #[test]
    fn view_is_the_whole_frame() {
        let mut source = FrameSource::new(frames(FRAME_COUNT, 3, 2)).unwrap();
        let view = source.advance();
        assert_eq!((view.width, view.height, view.pitch), (3, 2, 12));
        assert_eq!(view.size_bytes(), 24);
        assert_eq!(source.frame_size(), (3, 2));
    }

    #[test]
    fn missing_frames_fail() {
        assert_eq!(
            FrameSource::new(frames(3, 2, 2)).unwrap_err(),
            FrameSourceError::MissingFrame { slot: 3 }
        );
        assert_eq!(
            FrameSource::new(Vec::new()).unwrap_err(),
            FrameSourceError::MissingFrame { slot: 0 }
        );
        assert_eq!(
            FrameSource::new(frames(5, 2, 2)).unwrap_err(),
            FrameSourceError::TooManyFrames { count: 5 }
        );
    }

    #[test]
    fn mismatched_sizes_fail() {
        let mut buffers = frames(FRAME_COUNT, 2, 2);
        buffers[2] = PixelBuffer::filled(4, 2, [0; 4]);
        assert_eq!(
            FrameSource::new(buffers).unwrap_err(),
            FrameSourceError::SizeMismatch {
                slot: 2,
                expected: (2, 2),
                actual: (4, 2)
            }
        );
    }
}
