//! Frame source: sorted directory listing and grayscale decoding.

use std::fs;
use std::path::{Path, PathBuf};

use skytrack_core::GrayImage;

#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("frame {0} has no pixels")]
    Empty(PathBuf),
}

/// Regular files of `dir`, sorted by path.
pub fn list_frames(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, FrameError> {
    let dir = dir.as_ref();
    let io_err = |source| FrameError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Decode an image file into an 8-bit grayscale frame.
pub fn load_gray(path: impl AsRef<Path>) -> Result<GrayImage, FrameError> {
    let path = path.as_ref();
    let img = image::open(path)
        .map_err(|source| FrameError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_luma8();
    let frame = GrayImage::from(img);
    if frame.is_empty() {
        return Err(FrameError::Empty(path.to_path_buf()));
    }
    Ok(frame)
}

/// Lazily load `paths`, yielding each file name with its decode result.
pub fn read_frames(
    paths: Vec<PathBuf>,
) -> impl Iterator<Item = (String, Result<GrayImage, FrameError>)> {
    paths.into_iter().map(|path| {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let frame = load_gray(&path);
        (name, frame)
    })
}
