use std::path::PathBuf;

/// Errors raised by the icon pipeline. Each variant names the stage that
/// failed and the file it was working on.
#[derive(Debug, thiserror::Error)]
pub enum PrepareError {
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("No visible content in {}: every pixel is fully transparent", path.display())]
    DegenerateBounds { path: PathBuf },

    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
