use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::error::{EncodingError, ImageFormatHint};
use image::{ImageError, ImageFormat, ImageResult, RgbaImage};
use iconprep::codec::{BoundingBox, ImageCodec, RasterCodec};

/// Wraps [`RasterCodec`] and fails PNG encoding from the `fail_at`-th call on.
pub struct FlakyEncoder {
    calls: AtomicUsize,
    fail_at: usize,
}

impl FlakyEncoder {
    pub fn failing_at(fail_at: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_at,
        }
    }
}

impl ImageCodec for FlakyEncoder {
    fn decode(&self, path: &Path) -> ImageResult<RgbaImage> {
        RasterCodec.decode(path)
    }

    fn encode(&self, image: &RgbaImage) -> ImageResult<Vec<u8>> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call >= self.fail_at {
            return Err(ImageError::Encoding(EncodingError::new(
                ImageFormatHint::Exact(ImageFormat::Png),
                "encoder gave up",
            )));
        }
        RasterCodec.encode(image)
    }

    fn bounding_box(&self, image: &RgbaImage) -> Option<BoundingBox> {
        RasterCodec.bounding_box(image)
    }

    fn crop(&self, image: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
        RasterCodec.crop(image, bbox)
    }

    fn resize(&self, image: &RgbaImage, size: u32) -> RgbaImage {
        RasterCodec.resize(image, size)
    }
}
