//! Output sinks: annotated frames, time log, in-memory records.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skytrack_core::GrayImage;

use crate::{annotate, FrameRecord, RunSummary};

#[derive(thiserror::Error, Debug)]
pub enum SinkError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

/// Consumer of per-frame results.
pub trait FrameSink {
    /// Called once per processed (not skipped) frame.
    fn frame(&mut self, name: &str, frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError>;

    /// Called once after the last frame.
    fn finish(&mut self, _summary: &RunSummary) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: FrameSink + ?Sized> FrameSink for &mut S {
    fn frame(&mut self, name: &str, frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        (**self).frame(name, frame, record)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkError> {
        (**self).finish(summary)
    }
}

/// Absent sink: does nothing.
impl<S: FrameSink> FrameSink for Option<S> {
    fn frame(&mut self, name: &str, frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        match self {
            Some(s) => s.frame(name, frame, record),
            None => Ok(()),
        }
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkError> {
        match self {
            Some(s) => s.finish(summary),
            None => Ok(()),
        }
    }
}

/// Both sinks always run; the first error is reported.
impl<A: FrameSink, B: FrameSink> FrameSink for (A, B) {
    fn frame(&mut self, name: &str, frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        let a = self.0.frame(name, frame, record);
        let b = self.1.frame(name, frame, record);
        a.and(b)
    }

    fn finish(&mut self, summary: &RunSummary) -> Result<(), SinkError> {
        let a = self.0.finish(summary);
        let b = self.1.finish(summary);
        a.and(b)
    }
}

/// Writes `<stem>_track.png` annotated frames into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
    radius: u32,
}

impl DirectorySink {
    /// Create `dir` (and parents) if needed. `radius` sizes the prediction
    /// box.
    pub fn create(dir: impl AsRef<Path>, radius: u32) -> Result<Self, SinkError> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            radius,
        })
    }

    /// Output path for the frame called `name`.
    pub fn output_path(&self, name: &str) -> PathBuf {
        let stem = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());
        self.dir.join(format!("{stem}_track.png"))
    }
}

impl FrameSink for DirectorySink {
    fn frame(&mut self, name: &str, frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        annotate(frame, record, self.radius).save(self.output_path(name))?;
        Ok(())
    }
}

/// `name, elapsed_ms` lines, one per processed frame.
#[derive(Debug)]
pub struct TimeLog<W: Write = BufWriter<File>> {
    out: W,
}

impl TimeLog {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SinkError> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> TimeLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TimeLog<W> {
    fn frame(&mut self, name: &str, _frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        writeln!(self.out, "{name}, {:.2}", record.elapsed_ms)?;
        Ok(())
    }

    fn finish(&mut self, _summary: &RunSummary) -> Result<(), SinkError> {
        self.out.flush()?;
        Ok(())
    }
}

/// Per-frame entry of a run report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameEntry {
    pub name: String,
    #[serde(flatten)]
    pub record: FrameRecord,
}

/// Keeps every record in memory, in processing order.
#[derive(Clone, Debug, Default)]
pub struct RecordCollector {
    pub entries: Vec<FrameEntry>,
}

impl FrameSink for RecordCollector {
    fn frame(&mut self, name: &str, _frame: &GrayImage, record: &FrameRecord) -> Result<(), SinkError> {
        self.entries.push(FrameEntry {
            name: name.to_string(),
            record: record.clone(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Outcome;
    use nalgebra::Point2;
    use skytrack_core::PixelRect;

    fn predicted(index: usize, elapsed_ms: f64) -> FrameRecord {
        FrameRecord {
            index,
            window: PixelRect::new(0, 0, 16, 16),
            outcome: Outcome::Predicted {
                center: Point2::new(8.0, 8.0),
            },
            companion: None,
            elapsed_ms,
        }
    }

    #[test]
    fn time_log_lines() {
        let frame = GrayImage::new(16, 16);
        let mut log = TimeLog::new(Vec::new());
        log.frame("a.png", &frame, &predicted(0, 1.5)).unwrap();
        log.frame("b.png", &frame, &predicted(1, 12.346)).unwrap();
        log.finish(&RunSummary::default()).unwrap();
        let text = String::from_utf8(log.into_inner()).unwrap();
        assert_eq!(text, "a.png, 1.50\nb.png, 12.35\n");
    }

    #[test]
    fn directory_sink_writes_track_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::create(dir.path().join("out"), 4).unwrap();
        let frame = GrayImage::new(16, 16);
        sink.frame("seq/frame_007.jpg", &frame, &predicted(7, 0.0)).unwrap();
        let path = dir.path().join("out").join("frame_007_track.png");
        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (16, 16));
    }

    #[test]
    fn pair_and_option_sinks_fan_out() {
        let frame = GrayImage::new(4, 4);
        let mut sink = (RecordCollector::default(), None::<TimeLog<Vec<u8>>>);
        sink.frame("x", &frame, &predicted(0, 0.0)).unwrap();
        sink.frame("y", &frame, &predicted(1, 0.0)).unwrap();
        let names: Vec<_> = sink.0.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
    }
}
