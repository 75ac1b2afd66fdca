//! Fake collaborators for engine tests.

use image::{Rgba, RgbaImage};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::decode::{DecodeQueue, DecodeRequest, DecodeResult};
use super::surface::ScrollSurface;
use crate::entities::{AnimationFrame, Canvas, Direction, LoadError, MediaBackend, Size};

/// In-memory media: sizes and behaviour registered per path.
#[derive(Debug, Default, Clone)]
pub struct FakeBackend {
    sizes: HashMap<PathBuf, Size>,
    broken: HashSet<PathBuf>,
    animations: HashMap<PathBuf, usize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// `count` readable images of `size` named `/strip/NNN.png`.
    pub fn strip(count: usize, size: Size) -> (Self, Vec<PathBuf>) {
        let mut backend = Self::new();
        let paths: Vec<PathBuf> = (0..count).map(|i| PathBuf::from(format!("/strip/{i:03}.png"))).collect();
        for path in &paths {
            backend = backend.with_image(path, size);
        }
        (backend, paths)
    }

    pub fn with_image(mut self, path: impl AsRef<Path>, size: Size) -> Self {
        self.sizes.insert(path.as_ref().to_path_buf(), size);
        self
    }

    /// Header cannot be read: excluded from placement.
    pub fn with_unreadable(mut self, path: impl AsRef<Path>) -> Self {
        self.sizes.remove(path.as_ref());
        self
    }

    /// Header reads fine, decode fails.
    pub fn with_broken(mut self, path: impl AsRef<Path>, size: Size) -> Self {
        let path = path.as_ref().to_path_buf();
        self.sizes.insert(path.clone(), size);
        self.broken.insert(path);
        self
    }

    /// Animated source with `frames` frames of 100ms.
    pub fn with_animation(mut self, path: impl AsRef<Path>, size: Size, frames: usize) -> Self {
        let path = path.as_ref().to_path_buf();
        self.sizes.insert(path.clone(), size);
        self.animations.insert(path, frames);
        self
    }
}

impl MediaBackend for FakeBackend {
    fn native_size(&self, path: &Path) -> Option<Size> {
        self.sizes.get(path).copied()
    }

    fn is_animated(&self, path: &Path) -> bool {
        self.animations.get(path).is_some_and(|&n| n > 1)
    }

    fn decode_scaled(&self, path: &Path, target: Size) -> Result<RgbaImage, LoadError> {
        if target.is_empty() {
            return Err(LoadError::EmptyTarget);
        }
        if self.broken.contains(path) || !self.sizes.contains_key(path) {
            return Err(LoadError::Image(format!("cannot decode {}", path.display())));
        }
        Ok(RgbaImage::from_pixel(target.width, target.height, Rgba([90, 90, 90, 255])))
    }

    fn open_animation(&self, path: &Path, target: Size) -> Result<Vec<AnimationFrame>, LoadError> {
        let frames = *self.animations.get(path).ok_or(LoadError::NotAnimated)?;
        Ok((0..frames)
            .map(|i| AnimationFrame {
                image: RgbaImage::from_pixel(target.width, target.height, Rgba([i as u8, 0, 0, 255])),
                delay: Duration::from_millis(100),
            })
            .collect())
    }
}

#[derive(Debug, Default)]
struct ManualState {
    epoch: u64,
    pending: Vec<(DecodeRequest, u64)>,
    submitted: Vec<usize>,
    ready: Vec<DecodeResult>,
}

/// Decode queue completed by hand; clones share state.
///
/// Without a backend every completion succeeds with a grey bitmap; with one,
/// completions run `decode_scaled` so broken sources come back as errors.
#[derive(Default, Clone)]
pub struct ManualDecoder {
    state: Arc<Mutex<ManualState>>,
    backend: Option<Arc<dyn MediaBackend>>,
}

impl std::fmt::Debug for ManualDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualDecoder")
            .field("state", &self.state)
            .field("backed", &self.backend.is_some())
            .finish()
    }
}

impl ManualDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completions decode through `backend`.
    pub fn backed_by(backend: Arc<dyn MediaBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::default()
        }
    }

    /// Every index ever submitted, in submission order.
    pub fn submitted(&self) -> Vec<usize> {
        self.state.lock().unwrap().submitted.clone()
    }

    /// Indices with a request not yet completed.
    pub fn pending(&self) -> Vec<usize> {
        self.state.lock().unwrap().pending.iter().map(|(r, _)| r.index).collect()
    }

    fn finish(&self, request: DecodeRequest, epoch: u64) -> DecodeResult {
        let bitmap = match &self.backend {
            Some(backend) => backend.decode_scaled(&request.path, request.target),
            None => Ok(RgbaImage::from_pixel(
                request.target.width,
                request.target.height,
                Rgba([90, 90, 90, 255]),
            )),
        };
        DecodeResult {
            index: request.index,
            epoch,
            bitmap,
        }
    }

    /// Complete the oldest pending request for `index` and return its result.
    pub fn complete(&self, index: usize) -> Option<DecodeResult> {
        let mut state = self.state.lock().unwrap();
        let pos = state.pending.iter().position(|(r, _)| r.index == index)?;
        let (request, epoch) = state.pending.remove(pos);
        drop(state);
        Some(self.finish(request, epoch))
    }

    pub fn complete_all(&self) -> Vec<DecodeResult> {
        let pending = std::mem::take(&mut self.state.lock().unwrap().pending);
        pending
            .into_iter()
            .map(|(request, epoch)| self.finish(request, epoch))
            .collect()
    }

    /// Queue a result for the next `drain`.
    pub fn deliver(&self, result: DecodeResult) {
        self.state.lock().unwrap().ready.push(result);
    }

    /// Complete `index` and queue its result for the next `drain`.
    pub fn deliver_index(&self, index: usize) -> bool {
        match self.complete(index) {
            Some(result) => {
                self.deliver(result);
                true
            }
            None => false,
        }
    }

    /// Complete everything pending and queue it for the next `drain`.
    pub fn deliver_all(&self) -> usize {
        let results = self.complete_all();
        let count = results.len();
        self.state.lock().unwrap().ready.extend(results);
        count
    }
}

impl DecodeQueue for ManualDecoder {
    fn submit(&self, request: DecodeRequest) {
        let mut state = self.state.lock().unwrap();
        let epoch = state.epoch;
        state.submitted.push(request.index);
        state.pending.push((request, epoch));
    }

    fn drain(&self) -> Vec<DecodeResult> {
        std::mem::take(&mut self.state.lock().unwrap().ready)
    }

    fn bump_epoch(&self) -> u64 {
        let mut state = self.state.lock().unwrap();
        state.epoch += 1;
        state.epoch
    }

    fn current_epoch(&self) -> u64 {
        self.state.lock().unwrap().epoch
    }
}

/// Scroll surface that stores whatever the engine sets, unclamped.
#[derive(Debug, Clone)]
pub struct TestSurface {
    pub viewport: Size,
    pub scale: f64,
    pub offsets: [f64; 2],
    pub canvas: Canvas,
}

impl TestSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            viewport: Size::new(width, height),
            scale: 1.0,
            offsets: [0.0; 2],
            canvas: Canvas::default(),
        }
    }
}

fn axis_slot(axis: Direction) -> usize {
    match axis {
        Direction::Horizontal => 0,
        Direction::Vertical => 1,
    }
}

impl ScrollSurface for TestSurface {
    fn viewport_size(&self) -> Size {
        self.viewport
    }

    fn scale(&self) -> f64 {
        self.scale
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn offset(&self, axis: Direction) -> f64 {
        self.offsets[axis_slot(axis)]
    }

    fn set_offset(&mut self, axis: Direction, offset: f64) {
        self.offsets[axis_slot(axis)] = offset;
    }

    fn set_canvas(&mut self, canvas: Canvas) {
        self.canvas = canvas;
    }
}
