//! Owned RGBA pixel buffers used for tile images and cached chunks.

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
    /// Alpha channel, 255 is opaque.
    pub alpha: u8,
}

impl Rgba {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    /// Opaque white used for edge highlights.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Creates a color from its four channels.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::new(red, green, blue, 255)
    }

    /// Creates an opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub const fn from_hex(rgb: u32) -> Self {
        Self::from_rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
    }

    /// Multiplies the color channels by `factor`, truncating toward zero.
    ///
    /// Alpha is preserved.
    #[must_use]
    pub fn scaled(self, factor: f32) -> Self {
        let scale = |channel: u8| (f32::from(channel) * factor).clamp(0.0, 255.0) as u8;
        Self::new(
            scale(self.red),
            scale(self.green),
            scale(self.blue),
            self.alpha,
        )
    }

    fn over(self, destination: Rgba) -> Rgba {
        match self.alpha {
            255 => self,
            0 => destination,
            alpha => {
                let source_alpha = u32::from(alpha);
                let inverse = 255 - source_alpha;
                let blend = |source: u8, destination: u8| {
                    ((u32::from(source) * source_alpha + u32::from(destination) * inverse) / 255)
                        as u8
                };
                let out_alpha = source_alpha + u32::from(destination.alpha) * inverse / 255;
                Rgba::new(
                    blend(self.red, destination.red),
                    blend(self.green, destination.green),
                    blend(self.blue, destination.blue),
                    out_alpha.min(255) as u8,
                )
            }
        }
    }
}

/// Rectangle in surface pixel space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PixelRect {
    /// Left edge.
    pub x: i32,
    /// Top edge.
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelRect {
    /// Creates a new pixel rectangle.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Owned row-major RGBA pixel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Surface {
    /// Creates a fully transparent surface.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Rgba::TRANSPARENT)
    }

    /// Creates a surface filled with `color`.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = (width as usize).saturating_mul(height as usize);
        Self {
            width,
            height,
            pixels: vec![color; count],
        }
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Color stored at the provided pixel, if it lies inside the surface.
    #[must_use]
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|index| self.pixels[index])
    }

    /// Row-major pixel storage.
    #[must_use]
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Replaces every pixel with `color`.
    pub fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    /// Paints `rect` with `color`, clipped to the surface.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgba) {
        let Some((left, top, right, bottom)) = self.clip(rect) else {
            return;
        };
        let width = self.width as usize;
        for y in top..bottom {
            let row = y * width;
            self.pixels[row + left..row + right].fill(color);
        }
    }

    /// Alpha-composites `source` onto this surface with its top-left at
    /// (`x`, `y`). Pixels falling outside the surface are dropped.
    pub fn blit(&mut self, source: &Surface, x: i32, y: i32) {
        let destination = PixelRect::new(x, y, source.width, source.height);
        let Some((left, top, right, bottom)) = self.clip(destination) else {
            return;
        };
        let width = self.width as usize;
        let source_width = source.width as usize;
        for dest_y in top..bottom {
            let source_y = (dest_y as i64 - i64::from(y)) as usize;
            for dest_x in left..right {
                let source_x = (dest_x as i64 - i64::from(x)) as usize;
                let incoming = source.pixels[source_y * source_width + source_x];
                let slot = &mut self.pixels[dest_y * width + dest_x];
                *slot = incoming.over(*slot);
            }
        }
    }

    /// Flattens the surface into tightly packed RGBA bytes.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|pixel| [pixel.red, pixel.green, pixel.blue, pixel.alpha])
            .collect()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok()?;
        let y = u32::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    fn clip(&self, rect: PixelRect) -> Option<(usize, usize, usize, usize)> {
        let left = i64::from(rect.x).max(0);
        let top = i64::from(rect.y).max(0);
        let right = (i64::from(rect.x) + i64::from(rect.width)).min(i64::from(self.width));
        let bottom = (i64::from(rect.y) + i64::from(rect.height)).min(i64::from(self.height));
        if left >= right || top >= bottom {
            return None;
        }
        Some((left as usize, top as usize, right as usize, bottom as usize))
    }
}
