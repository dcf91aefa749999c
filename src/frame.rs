//! Fixed-size RGB8 pixel buffers and the handful of operations the
//! compositor needs: centered square crop, nearest-neighbour resize,
//! quarter-turn rotation and clipped overlay.

pub type Rgb = [u8; 3];

const CHANNELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let len = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(len * CHANNELS);
        for _ in 0..len {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major RGB bytes, `width * height * 3` long.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * CHANNELS
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]])
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x < self.width && y < self.height {
            let i = self.offset(x, y);
            self.pixels[i..i + CHANNELS].copy_from_slice(&color);
        }
    }

    /// Copies the rectangle at `(x, y)`, clipped to the frame bounds.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Frame {
        let x = x.min(self.width);
        let y = y.min(self.height);
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);
        let mut out = Frame::new(width, height);
        let row_len = width as usize * CHANNELS;
        for row in 0..height {
            let src = self.offset(x, y + row);
            let dst = out.offset(0, row);
            out.pixels[dst..dst + row_len].copy_from_slice(&self.pixels[src..src + row_len]);
        }
        out
    }

    /// Largest square centered on the frame.
    pub fn crop_center_square(&self) -> Frame {
        let side = self.width.min(self.height);
        self.crop(
            (self.width - side) / 2,
            (self.height - side) / 2,
            side,
            side,
        )
    }

    pub fn resize(&self, width: u32, height: u32) -> Frame {
        if (width, height) == self.size() {
            return self.clone();
        }
        let mut out = Frame::new(width, height);
        if self.width == 0 || self.height == 0 {
            return out;
        }
        for y in 0..height {
            let sy = (u64::from(y) * u64::from(self.height) / u64::from(height)) as u32;
            for x in 0..width {
                let sx = (u64::from(x) * u64::from(self.width) / u64::from(width)) as u32;
                let src = self.offset(sx, sy);
                let dst = out.offset(x, y);
                out.pixels[dst..dst + CHANNELS]
                    .copy_from_slice(&self.pixels[src..src + CHANNELS]);
            }
        }
        out
    }

    /// Rotates counter-clockwise by `quarter_turns * 90` degrees.
    pub fn rotate_ccw(&self, quarter_turns: u8) -> Frame {
        match quarter_turns % 4 {
            0 => self.clone(),
            turns => {
                let (w, h) = (self.width, self.height);
                let (out_w, out_h) = if turns == 2 { (w, h) } else { (h, w) };
                let mut out = Frame::new(out_w, out_h);
                for y in 0..h {
                    for x in 0..w {
                        let (dx, dy) = match turns {
                            1 => (y, w - 1 - x),
                            2 => (w - 1 - x, h - 1 - y),
                            _ => (h - 1 - y, x),
                        };
                        let src = self.offset(x, y);
                        let dst = out.offset(dx, dy);
                        out.pixels[dst..dst + CHANNELS]
                            .copy_from_slice(&self.pixels[src..src + CHANNELS]);
                    }
                }
                out
            }
        }
    }

    /// Overlays `src` with its top-left corner at `(x, y)`; whatever falls
    /// outside this frame is dropped.
    pub fn blit(&mut self, src: &Frame, x: u32, y: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let width = src.width.min(self.width - x);
        let height = src.height.min(self.height - y);
        let row_len = width as usize * CHANNELS;
        for row in 0..height {
            let s = src.offset(0, row);
            let d = self.offset(x, y + row);
            self.pixels[d..d + row_len].copy_from_slice(&src.pixels[s..s + row_len]);
        }
    }
}
