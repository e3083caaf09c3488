use crate::client::pixel_buffer::{PixelBufferView, BYTES_PER_PIXEL};
use thiserror::Error;

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum LockStateError {
    #[error("streaming surface is already locked")]
    AlreadyLocked,
    #[error("streaming surface is not locked")]
    NotLocked,
}

#[derive(Debug, Error, Copy, Clone, Eq, PartialEq)]
pub enum StreamError {
    #[error(transparent)]
    Lock(#[from] LockStateError),
    #[error("frame is {actual} bytes, surface expects {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Whatever the staging bytes are committed to on unlock.
pub trait PixelTarget {
    fn write_pixels(&mut self, pixels: &[u8], pitch: u32, width: u32, height: u32);
}

/// CPU staging area in front of a drawable, written only between `lock` and `unlock`.
pub struct StreamingSurface<T: PixelTarget> {
    width: u32,
    height: u32,
    pitch: u32,
    locked: bool,
    staging: Box<[u8]>,
    target: T,
}

impl<T: PixelTarget> StreamingSurface<T> {
    pub fn new(width: u32, height: u32, target: T) -> Self {
        let pitch = width * BYTES_PER_PIXEL;
        Self {
            width,
            height,
            pitch,
            locked: false,
            staging: vec![0; (pitch * height) as usize].into_boxed_slice(),
            target,
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn lock(&mut self) -> Result<(), LockStateError> {
        if self.is_locked() {
            return Err(LockStateError::AlreadyLocked);
        }
        self.locked = true;
        Ok(())
    }

    pub fn staging_mut(&mut self) -> Result<&mut [u8], LockStateError> {
        if !self.is_locked() {
            return Err(LockStateError::NotLocked);
        }
        Ok(&mut self.staging)
    }

    /// Byte-exact copy of a whole frame into the staging area.
    pub fn copy_frame(&mut self, frame: PixelBufferView) -> Result<(), StreamError> {
        let expected = self.staging.len();
        let actual = frame.size_bytes();
        let staging = self.staging_mut()?;
        if actual != expected || (frame.pitch * frame.height) as usize != expected {
            return Err(StreamError::SizeMismatch { expected, actual });
        }
        staging.copy_from_slice(frame.bytes);
        Ok(())
    }

    /// Commits the staging bytes to the target.
    pub fn unlock(&mut self) -> Result<(), LockStateError> {
        if !self.is_locked() {
            return Err(LockStateError::NotLocked);
        }
        self.target
            .write_pixels(&self.staging, self.pitch, self.width, self.height);
        self.locked = false;
        Ok(())
    }

    /// Lock, copy, unlock. A failed copy still unlocks so the surface stays usable.
    pub fn stream_frame(&mut self, frame: PixelBufferView) -> Result<(), StreamError> {
        self.lock()?;
        let copied = self.copy_frame(frame);
        if copied.is_err() {
            self.locked = false;
            return copied;
        }
        self.unlock()?;
        Ok(())
    }

    /// The drawable, only while no CPU write is pending.
    pub fn texture(&self) -> Result<&T, LockStateError> {
        if self.is_locked() {
            return Err(LockStateError::AlreadyLocked);
        }
        Ok(&self.target)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::pixel_buffer::PixelBuffer;

    #[derive(Default)]
    struct RecordingTarget {
        writes: Vec<(Vec<u8>, u32, u32, u32)>,
    }

    impl PixelTarget for RecordingTarget {
        fn write_pixels(&mut self, pixels: &[u8], pitch: u32, width: u32, height: u32) {
            self.writes.push((pixels.to_vec(), pitch, width, height));
        }
    }

    fn surface(w: u32, h: u32) -> StreamingSurface<RecordingTarget> {
        StreamingSurface::new(w, h, RecordingTarget::default())
    }

    #[test]
    fn copy_commits_exact_bytes_on_unlock() {
        let mut surface = surface(2, 2);
        let frame = PixelBuffer::from_rgba(2, 2, (0..16).collect()).unwrap();

        surface.lock().unwrap();
        surface.copy_frame(frame.view()).unwrap();
        assert!(surface.texture().is_err());
        surface.unlock().unwrap();

        let target = surface.texture().unwrap();
        assert_eq!(target.writes.len(), 1);
        let (bytes, pitch, w, h) = &target.writes[0];
        assert_eq!(bytes.as_slice(), frame.bytes());
        assert_eq!((*pitch, *w, *h), (8, 2, 2));
    }

    #[test]
    fn write_without_lock_fails() {
        let mut surface = surface(2, 2);
        let frame = PixelBuffer::filled(2, 2, [9; 4]);
        assert_eq!(surface.staging_mut().unwrap_err(), LockStateError::NotLocked);
        assert_eq!(
            surface.copy_frame(frame.view()).unwrap_err(),
            StreamError::Lock(LockStateError::NotLocked)
        );
        assert_eq!(surface.unlock().unwrap_err(), LockStateError::NotLocked);
        assert!(surface.texture().unwrap().writes.is_empty());
    }

    #[test]
    fn double_lock_fails() {
        let mut surface = surface(1, 1);
        surface.lock().unwrap();
        assert_eq!(surface.lock().unwrap_err(), LockStateError::AlreadyLocked);
        assert!(surface.is_locked());
        surface.unlock().unwrap();
        assert!(!surface.is_locked());
    }

    #[test]
    fn staging_is_writable_while_locked() {
        let mut surface = surface(1, 1);
        surface.lock().unwrap();
        surface.staging_mut().unwrap().copy_from_slice(&[1, 2, 3, 4]);
        surface.unlock().unwrap();
        assert_eq!(surface.texture().unwrap().writes[0].0, vec![1, 2, 3, 4]);
    }

    #[test]
    fn size_mismatch_is_rejected() {
        let mut surface = surface(2, 2);
        let frame = PixelBuffer::filled(3, 2, [0; 4]);
        surface.lock().unwrap();
        assert_eq!(
            surface.copy_frame(frame.view()).unwrap_err(),
            StreamError::SizeMismatch {
                expected: 16,
                actual: 24
            }
        );
    }

    #[test]
    fn stream_frame_unlocks_after_failure() {
        let mut surface = surface(2, 2);
        let wrong = PixelBuffer::filled(1, 1, [0; 4]);
        assert!(surface.stream_frame(wrong.view()).is_err());
        assert!(!surface.is_locked());
        assert!(surface.texture().unwrap().writes.is_empty());

        let right = PixelBuffer::filled(2, 2, [5; 4]);
        surface.stream_frame(right.view()).unwrap();
        assert_eq!(surface.texture().unwrap().writes.len(), 1);
    }
}
