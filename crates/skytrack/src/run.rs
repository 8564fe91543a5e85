use skytrack_core::GrayImage;
use skytrack_detect::Detector;
use skytrack_kalman::MotionModel;

use crate::{FrameError, FrameSink, RunSummary, Tracker};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Drive `tracker` over `frames` in order.
///
/// Each item is a frame name and its decode result. Undecodable frames are
/// skipped: no tracker step, no output, only the `skipped` counter moves.
/// Frame indices count every item, skipped ones included. Sink failures are
/// logged and do not stop the run.
#[cfg_attr(feature = "tracing", instrument(level = "info", skip_all))]
pub fn run_sequence<D, M, I, S>(tracker: &mut Tracker<D, M>, frames: I, sink: &mut S) -> RunSummary
where
    D: Detector,
    M: MotionModel,
    I: IntoIterator<Item = (String, Result<GrayImage, FrameError>)>,
    S: FrameSink + ?Sized,
{
    let mut summary = RunSummary::default();
    for (index, (name, frame)) in frames.into_iter().enumerate() {
        let frame = match frame {
            Ok(frame) if !frame.is_empty() => frame,
            Ok(_) => {
                log::warn!("frame {index} ({name}) is empty, skipped");
                summary.skip();
                continue;
            }
            Err(err) => {
                log::warn!("frame {index} skipped: {err}");
                summary.skip();
                continue;
            }
        };
        let record = tracker.process(index, &frame.view());
        summary.record(&record);
        log::info!("{}", record.status_line());
        if let Err(err) = sink.frame(&name, &frame, &record) {
            log::warn!("output for {name} failed: {err}");
        }
    }
    if let Err(err) = sink.finish(&summary) {
        log::warn!("finishing outputs failed: {err}");
    }
    log::info!("{summary}");
    summary
}
