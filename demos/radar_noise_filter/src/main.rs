use std::path::PathBuf;

use clap::Parser;
use nnfilter::{CoordinateSubset, MatchStrategy, NoiseFilterCfg};
use rnoise_core::Recording;
use rnoise_dataset_reader::CsvRecording;
use rnoise_sensor::{CollectingPublisher, PointCloudMsg};

/// Replays a recorded radar capture through the temporal noise filter.
#[derive(Debug, Parser)]
struct Args {
    /// CSV capture with `frame,x,y,z,intensity` rows
    #[arg(default_value = "datasets/radar_capture.csv")]
    recording: PathBuf,

    /// correspondence threshold in meters
    #[arg(long)]
    threshold: Option<f32>,

    /// number of frames in the window, current frame included
    #[arg(long)]
    window: Option<usize>,

    /// use euclidean distance over x, y and z instead of x only
    #[arg(long)]
    xyz: bool,

    /// pair points by minimum cost assignment instead of nearest neighbor
    #[arg(long)]
    assignment: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut cfg = NoiseFilterCfg::default();
    if let Some(threshold) = args.threshold {
        cfg.correspondence_threshold = threshold;
    }
    if let Some(window) = args.window {
        cfg.window_size = window;
    }
    if args.xyz {
        cfg.coordinate_subset = CoordinateSubset::Xyz;
    }
    if args.assignment {
        cfg.match_strategy = MatchStrategy::OptimalAssignment;
    }
    let pipeline = cfg.finalize()?;

    let recording = CsvRecording::open(&args.recording)?;
    let mut publisher = CollectingPublisher::new("/outputpoints");

    let mut number_of_points_in = 0;
    let mut number_of_noise_points = 0;
    for (index, frame) in recording.frames().enumerate() {
        number_of_points_in += frame.len();

        // the driver publishes in its own frame, the filter republishes in the radar link
        let msg = PointCloudMsg::from_frame(&frame, "radar_driver");
        let report = pipeline.handle_message(&msg, &mut publisher)?;
        number_of_noise_points += report.number_of_noise_points();

        log::debug!(
            "capture frame {:?}: kept {} of {}",
            recording.frame_id(index),
            report.output.len(),
            frame.len()
        );
    }

    log::info!(
        "{} frames, {} points in, {} published, {} removed as noise",
        pipeline.frames_processed(),
        number_of_points_in,
        publisher.number_of_points(),
        number_of_noise_points
    );
    Ok(())
}
