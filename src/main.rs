use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use stormsea::prelude::*;
use stormsea::shader::water_shader;
use stormsea::thunder::ThunderEvent;

/// Run the storm headless and log what a renderer would draw.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Stop after this many frames (runs until killed when omitted).
    #[arg(short, long)]
    frames: Option<u64>,

    /// Target frame rate. 0 runs as fast as possible.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Water grid segments per side (overrides the config file).
    #[arg(short, long)]
    segments: Option<u32>,

    /// Seed for rain placement and thunder rolls.
    #[arg(long)]
    seed: Option<u64>,

    /// JSON config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Automatic thunder strikes per minute (overrides the config file).
    #[arg(short, long)]
    thunder_rate: Option<f32>,

    /// Print the generated WGSL water shader and exit.
    #[arg(long)]
    print_shader: bool,

    /// Write the effective config to this path and exit.
    #[arg(long)]
    save_config: Option<PathBuf>,
}

fn load_config(args: &Args) -> Result<StormConfig, stormsea::ConfigError> {
    let mut config = match &args.config {
        Some(path) => StormConfig::load(path)?,
        None => StormConfig::default(),
    };
    if let Some(segments) = args.segments {
        config.surface.segments = segments;
    }
    if let Some(rate) = args.thunder_rate {
        config.thunder.strikes_per_minute = rate;
    }
    config.validate()?;
    Ok(config)
}

/// Water extremes and strikes over one summary window.
#[derive(Default)]
struct Window {
    frames: u64,
    min_elevation: f32,
    max_elevation: f32,
    strikes: u32,
}

impl Window {
    fn record(&mut self, elevations: &[f32], events: &[ThunderEvent]) {
        let (lo, hi) = elevations
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &e| (lo.min(e), hi.max(e)));
        if self.frames == 0 {
            self.min_elevation = lo;
            self.max_elevation = hi;
        } else {
            self.min_elevation = self.min_elevation.min(lo);
            self.max_elevation = self.max_elevation.max(hi);
        }
        self.strikes += events.iter().filter(|e| e.state == ThunderState::FlashOn).count() as u32;
        self.frames += 1;
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.print_shader {
        println!("{}", water_shader());
        return;
    }

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    if let Some(path) = &args.save_config {
        if let Err(err) = config.save(path) {
            eprintln!("Error: {err}");
            process::exit(1);
        }
        log::info!("config written to {}", path.display());
        return;
    }

    let mut builder = Storm::builder().with_config(config);
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }
    let mut storm = match builder.build() {
        Ok(storm) => storm,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };

    let mut pacing = FramePacing::new(args.fps);
    pacing.max_frames = args.frames;

    let mut window = Window::default();
    let mut next_summary = Duration::from_secs(1);

    storm.run(pacing, |storm, report| {
        for event in &report.thunder_events {
            log::debug!("thunder {:?} -> {:?}", event.state, event.backdrop);
            if let Some(cue) = event.cue {
                log::info!("thunderclap at {:.2}s, volume {:.2}", event.at.as_secs_f32(), cue.volume);
            }
        }
        window.record(storm.surface().elevations(), &report.thunder_events);

        if report.elapsed >= next_summary {
            let lowest_drop = storm
                .rain()
                .particles()
                .iter()
                .map(|p| p.y)
                .fold(f32::INFINITY, f32::min);
            log::info!(
                "t={:>6.2}s frame {:>6} fps {:>5.1} | water [{:+.3}, {:+.3}] | lowest drop {:.2} | strikes {} | backdrop {:?}",
                report.elapsed.as_secs_f32(),
                report.frame,
                storm.clock().fps(),
                window.min_elevation,
                window.max_elevation,
                lowest_drop,
                window.strikes,
                report.backdrop,
            );
            window = Window::default();
            while next_summary <= report.elapsed {
                next_summary += Duration::from_secs(1);
            }
        }
    });
}
