use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::alpha_bleed;
use crate::codec::{BoundingBox, ImageCodec};
use crate::error::PrepareError;

/// Edge lengths of the icon family, in output order.
pub const ICON_SIZES: [u32; 4] = [16, 48, 96, 128];

/// What to do when the source has no visible pixel at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyPolicy {
    /// Fail with [`PrepareError::DegenerateBounds`].
    #[default]
    Error,
    /// Keep the full image extent.
    Full,
}

#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    pub bleed: bool,
    pub empty: EmptyPolicy,
}

pub fn icon_file_name(name: &str, size: u32) -> String {
    format!("{name}_icon_{size}.png")
}

/// Size -> written path, in the order the sizes were rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRecord {
    entries: Vec<(u32, PathBuf)>,
}

impl OutputRecord {
    /// Returns `false` and leaves the record untouched if `size` is already present.
    pub fn insert(&mut self, size: u32, path: PathBuf) -> bool {
        if self.get(size).is_some() {
            return false;
        }
        self.entries.push((size, path));
        true
    }

    pub fn get(&self, size: u32) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(s, _)| *s == size)
            .map(|(_, p)| p.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Path)> {
        self.entries.iter().map(|(s, p)| (*s, p.as_path()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A cropped source ready to be rendered at each icon size.
#[derive(Debug, Clone)]
pub struct PreparedSource {
    pub original_size: (u32, u32),
    pub bounds: BoundingBox,
    pub image: RgbaImage,
}

/// Turns one source image into the icon family described by [`ICON_SIZES`].
pub struct IconPreparer<C> {
    codec: C,
    options: PrepareOptions,
}

impl<C: ImageCodec> IconPreparer<C> {
    pub fn new(codec: C, options: PrepareOptions) -> Self {
        Self { codec, options }
    }

    pub fn load(&self, path: &Path) -> Result<RgbaImage, PrepareError> {
        self.codec.decode(path).map_err(|source| PrepareError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `path` is only used to label the error.
    pub fn compute_content_bounds(
        &self,
        image: &RgbaImage,
        path: &Path,
    ) -> Result<BoundingBox, PrepareError> {
        match self.codec.bounding_box(image) {
            Some(bbox) => Ok(bbox),
            None => match self.options.empty {
                EmptyPolicy::Full => Ok(BoundingBox::full(image)),
                EmptyPolicy::Error => Err(PrepareError::DegenerateBounds {
                    path: path.to_path_buf(),
                }),
            },
        }
    }

    pub fn crop(&self, image: &RgbaImage, bbox: BoundingBox) -> RgbaImage {
        self.codec.crop(image, bbox)
    }

    pub fn resize(&self, image: &RgbaImage, size: u32) -> RgbaImage {
        self.codec.resize(image, size)
    }

    /// Writes `image` as PNG. The bytes go to a temporary file next to `path`
    /// which is then renamed over it, so readers never see a partial file.
    pub fn save(&self, image: &RgbaImage, path: &Path) -> Result<(), PrepareError> {
        let bytes = self
            .codec
            .encode(image)
            .map_err(|source| PrepareError::Encode {
                path: path.to_path_buf(),
                source,
            })?;

        let io_err = |source: std::io::Error| PrepareError::Io {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut builder = tempfile::Builder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Same mode a plain create would give: keep an existing icon's
            // mode, otherwise 0666 minus the umask.
            let mode = std::fs::metadata(path)
                .map(|m| m.permissions().mode() & 0o777)
                .unwrap_or(0o666);
            builder.permissions(std::fs::Permissions::from_mode(mode));
        }
        let mut tmp = builder.tempfile_in(dir).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        Ok(())
    }

    /// Loads and crops the source.
    pub fn prepare_source(&self, path: &Path) -> Result<PreparedSource, PrepareError> {
        let image = self.load(path)?;
        let bounds = self.compute_content_bounds(&image, path)?;
        let cropped = self.crop(&image, bounds);

        Ok(PreparedSource {
            original_size: image.dimensions(),
            bounds,
            image: cropped,
        })
    }

    /// Resizes the prepared source to `size`, optionally bleeds it, and writes
    /// it into `out_dir`.
    pub fn render(
        &self,
        source: &RgbaImage,
        size: u32,
        out_dir: &Path,
        name: &str,
    ) -> Result<PathBuf, PrepareError> {
        let path = out_dir.join(icon_file_name(name, size));
        let mut resized = self.resize(source, size);
        if self.options.bleed {
            alpha_bleed::alpha_bleed(&mut resized);
        }
        self.save(&resized, &path)?;
        Ok(path)
    }

    /// Runs the whole pipeline, one size after another. On failure, icons
    /// written for earlier sizes stay on disk.
    pub fn prepare(
        &self,
        source_path: &Path,
        out_dir: &Path,
        name: &str,
    ) -> Result<(PreparedSource, OutputRecord), PrepareError> {
        let source = self.prepare_source(source_path)?;
        let mut record = OutputRecord::default();

        for size in ICON_SIZES {
            let path = self.render(&source.image, size, out_dir, name)?;
            record.insert(size, path);
        }

        Ok((source, record))
    }
}

/// Same as [`IconPreparer::prepare`] but renders every size on the blocking
/// pool at once. The record still follows [`ICON_SIZES`] order.
pub async fn prepare_concurrent<C>(
    preparer: Arc<IconPreparer<C>>,
    source_path: &Path,
    out_dir: &Path,
    name: &str,
) -> Result<(PreparedSource, OutputRecord), PrepareError>
where
    C: ImageCodec + Send + Sync + 'static,
{
    let source = {
        let preparer = Arc::clone(&preparer);
        let path = source_path.to_path_buf();
        tokio::task::spawn_blocking(move || preparer.prepare_source(&path))
            .await
            .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))?
    };

    let PreparedSource {
        original_size,
        bounds,
        image,
    } = source;
    let cropped = Arc::new(image);
    let mut jobs = JoinSet::new();

    for size in ICON_SIZES {
        let preparer = Arc::clone(&preparer);
        let cropped = Arc::clone(&cropped);
        let out_dir = out_dir.to_path_buf();
        let name = name.to_string();
        jobs.spawn_blocking(move || {
            preparer
                .render(&cropped, size, &out_dir, &name)
                .map(|path| (size, path))
        });
    }

    let mut written = Vec::with_capacity(ICON_SIZES.len());
    while let Some(joined) = jobs.join_next().await {
        written.push(joined.unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))?);
    }
    written.sort_by_key(|(size, _)| ICON_SIZES.iter().position(|s| s == size));

    let mut record = OutputRecord::default();
    for (size, path) in written {
        record.insert(size, path);
    }

    let image = Arc::try_unwrap(cropped).unwrap_or_else(|shared| (*shared).clone());
    let source = PreparedSource {
        original_size,
        bounds,
        image,
    };
    Ok((source, record))
}
