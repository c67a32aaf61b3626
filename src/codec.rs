use std::io::Cursor;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageResult, Rgba, Rgba32FImage, RgbaImage};

/// Smallest axis-aligned rectangle around the visible content of an image.
/// `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl BoundingBox {
    pub fn full(image: &RgbaImage) -> Self {
        Self {
            left: 0,
            top: 0,
            right: image.width(),
            bottom: image.height(),
        }
    }

    /// Zero for a box whose edges are swapped.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// The imaging operations the icon pipeline needs. The pipeline only talks
/// to this trait, so the backing library can be swapped out.
pub trait ImageCodec {
    /// Decodes a file and converts it to RGBA.
    fn decode(&self, path: &Path) -> ImageResult<RgbaImage>;

    /// Encodes an image as PNG bytes.
    fn encode(&self, image: &RgbaImage) -> ImageResult<Vec<u8>>;

    /// Returns `None` when no pixel has a non-zero alpha.
    fn bounding_box(&self, image: &RgbaImage) -> Option<BoundingBox>;

    fn crop(&self, image: &RgbaImage, bbox: BoundingBox) -> RgbaImage;

    /// Scales to exactly `size` x `size`, ignoring aspect ratio. Color must not
    /// leak out from under fully transparent pixels.
    fn resize(&self, image: &RgbaImage, size: u32) -> RgbaImage;
}

/// [`ImageCodec`] backed by the `image` crate. Resizing runs Lanczos3 on
/// premultiplied alpha.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl ImageCodec for RasterCodec {
    fn decode(&self, path: &Path) -> ImageResult<RgbaImage> {
        let img = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        Ok(img.into_rgba8())
    }

    fn encode(&self, image: &RgbaImage) -> ImageResult<Vec<u8>> {
        let mut buf = Vec::new();
        image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
        Ok(buf)
    }

    fn bounding_box(&self, image: &RgbaImage) -> Option<BoundingBox> {
        let mut bbox: Option<BoundingBox> = None;

        for (x, y, pixel) in image.enumerate_pixels() {
            if pixel[3] == 0 {
                continue;
            }
            let b = bbox.get_or_insert(BoundingBox {
                left: x,
                top: y,
                right: x + 1,
                bottom: y + 1,
            });
            b.left = b.left.min(x);
            b.top = b.top.min(y);
            b.right = b.right.max(x + 1);
            b.bottom = b.bottom.max(y + 1);
        }

        bbox
    }

    fn crop(&self, image: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
        imageops::crop_imm(image, bbox.left, bbox.top, bbox.width(), bbox.height()).to_image()
    }

    fn resize(&self, image: &RgbaImage, size: u32) -> RgbaImage {
        let premultiplied = premultiply(image);
        let resized = imageops::resize(&premultiplied, size, size, FilterType::Lanczos3);
        unpremultiply(&resized)
    }
}

fn premultiply(image: &RgbaImage) -> Rgba32FImage {
    Rgba32FImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0.map(|c| f32::from(c) / 255.0);
        Rgba([r * a, g * a, b * a, a])
    })
}

fn unpremultiply(image: &Rgba32FImage) -> RgbaImage {
    let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;

    RgbaImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = to_u8(a);
        if alpha == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let a = a.clamp(0.0, 1.0);
        Rgba([to_u8(r / a), to_u8(g / a), to_u8(b / a), alpha])
    })
}
