use std::process::ExitCode;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use clap::Parser;

use filter_collage::cli::Args;
use filter_collage::devices::{AppDevices, SourceKind};
use tilecv::pipeline::{FrameLoop, PipelineConfig};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = PipelineConfig::default();

    // the output path is validated before any device is opened
    let target = args.recording_request().resolve(config.encoder)?;

    // create a cancel token to stop the loop on Ctrl-C
    let cancel_token = Arc::new(AtomicBool::new(false));

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            log::info!("received Ctrl-C, stopping");
            cancel_token.store(true, Ordering::SeqCst);
        }
    })?;

    let source = match args.synthetic {
        Some(num_frames) => SourceKind::Synthetic(num_frames),
        None => SourceKind::Camera(args.camera_id),
    };
    let mut devices = AppDevices::new(source, config);

    let mut frame_loop = FrameLoop::new(config)?.with_cancel_token(cancel_token);
    let summary = frame_loop.run(&mut devices, target.as_ref())?;

    log::info!("processed {} frames", summary.frames);

    Ok(())
}
