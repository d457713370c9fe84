//! Square single-channel raster addressed in UV space

use glam::Vec2;

/// Square raster of `resolution × resolution` values, row 0 at `v ≈ 0`
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T: Copy + Default> {
    resolution: usize,
    data: Vec<T>,
}

impl<T: Copy + Default> Raster<T> {
    pub fn new(resolution: usize) -> Self {
        Self::filled(resolution, T::default())
    }

    pub fn filled(resolution: usize, value: T) -> Self {
        Self {
            resolution,
            data: vec![value; resolution * resolution],
        }
    }

    /// Wrap existing row-major data; `None` if the length is not `resolution²`
    pub fn from_vec(resolution: usize, data: Vec<T>) -> Option<Self> {
        if data.len() == resolution * resolution {
            Some(Self { resolution, data })
        } else {
            None
        }
    }

    #[inline]
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x < self.resolution && y < self.resolution {
            Some(self.data[y * self.resolution + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x < self.resolution && y < self.resolution {
            Some(&mut self.data[y * self.resolution + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        if x < self.resolution && y < self.resolution {
            self.data[y * self.resolution + x] = value;
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Convert a UV coordinate to the pixel containing it (clamped to the raster)
    #[inline]
    pub fn uv_to_pixel(&self, uv: Vec2) -> (usize, usize) {
        let max = self.resolution as i64 - 1;
        let x = (uv.x * self.resolution as f32).floor() as i64;
        let y = (uv.y * self.resolution as f32).floor() as i64;
        (x.clamp(0, max) as usize, y.clamp(0, max) as usize)
    }

    /// Nearest-pixel sample at a UV coordinate
    pub fn sample(&self, uv: Vec2) -> T {
        let (x, y) = self.uv_to_pixel(uv);
        self.get(x, y).unwrap_or_default()
    }
}
