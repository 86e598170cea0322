//! Metaball Clock entry point
//!
//! Headless host: reads the wall clock, drives the simulation at a fixed
//! timestep and packages a frame for the rasterizer every display tick.
//!
//! Usage: `metaball-clock [SETTINGS.json] [--frames N] [--demo] [--seed N]`

use std::process::ExitCode;
use std::time::{Duration, Instant};

use chrono::Timelike;

use metaball_clock::consts::*;
use metaball_clock::render::FrameData;
use metaball_clock::sim::{ClockDigits, ClockState, TickInput, tick};
use metaball_clock::{Result, Settings};

const VIEWPORT_WIDTH: f32 = 1280.0;
const VIEWPORT_HEIGHT: f32 = 720.0;
/// Seconds each value is shown in demo mode
const DEMO_HOLD: f32 = 2.0;
/// Frames between status lines
const REPORT_INTERVAL: u64 = 120;

#[derive(Debug, Default)]
struct Options {
    settings_path: Option<String>,
    frames: Option<u64>,
    demo: bool,
    seed: Option<u64>,
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> std::result::Result<Self, String> {
        let mut options = Options::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--demo" => options.demo = true,
                "--frames" => {
                    let value = args.next().ok_or("--frames needs a value")?;
                    options.frames = Some(value.parse().map_err(|_| format!("bad frame count: {value}"))?);
                }
                "--seed" => {
                    let value = args.next().ok_or("--seed needs a value")?;
                    options.seed = Some(value.parse().map_err(|_| format!("bad seed: {value}"))?);
                }
                flag if flag.starts_with("--") => return Err(format!("unknown option: {flag}")),
                path => options.settings_path = Some(path.to_string()),
            }
        }
        Ok(options)
    }
}

/// Digits for the current local time
fn wall_clock_digits() -> Result<ClockDigits> {
    let now = chrono::Local::now();
    ClockDigits::from_hm(now.hour(), now.minute())
}

/// Demo mode shows every digit value in turn on all four positions
fn demo_digits(elapsed: f32) -> Result<ClockDigits> {
    let value = ((elapsed / DEMO_HOLD) as u32 % 10) as u8;
    ClockDigits::new([value; DIGIT_COUNT])
}

fn run(options: Options) -> Result<()> {
    let settings = match &options.settings_path {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    settings.validate()?;

    let seed = options.seed.unwrap_or_else(|| chrono::Local::now().timestamp_millis() as u64);
    log::info!("Clock initialized with seed: {}", seed);

    let start_digits = if options.demo {
        demo_digits(0.0)?
    } else {
        wall_clock_digits()?
    };
    let mut state = ClockState::new(seed, settings.clone(), start_digits);
    let mut input = TickInput::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT).with_digits(start_digits);

    let frame_period = Duration::from_secs_f32(SIM_DT);
    let started = Instant::now();
    let mut last_time = started;
    let mut accumulator = 0.0f32;
    let mut sim_time = 0.0f32;
    let mut rendered = 0u64;

    loop {
        if options.frames.is_some_and(|limit| rendered >= limit) {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_time).as_secs_f32().min(0.1);
        last_time = now;
        accumulator += dt;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            input.digits = Some(if options.demo {
                demo_digits(sim_time)?
            } else {
                wall_clock_digits()?
            });
            tick(&mut state, &input, SIM_DT);
            accumulator -= SIM_DT;
            sim_time += SIM_DT;
            substeps += 1;
        }

        let frame = FrameData::capture(&state, &settings);
        rendered += 1;

        if rendered % REPORT_INTERVAL == 0 {
            log::info!(
                "{} | {} balls, {} chasing, {} merges | {}x{} blocks of {}px, fullest {}",
                state.digits(),
                state.ball_count(),
                state.chasers().len(),
                state.merges,
                frame.globals.num_x_blocks,
                frame.globals.num_y_blocks,
                frame.globals.block_size,
                frame.buckets.max_occupancy()
            );
        }

        if let Some(remaining) = frame_period.checked_sub(now.elapsed()) {
            std::thread::sleep(remaining);
        }
    }

    log::info!(
        "Stopped after {} frames ({} ticks, {:.1}s)",
        rendered,
        state.frames,
        started.elapsed().as_secs_f32()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Metaball Clock (native) starting...");

    let options = match Options::parse(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(message) => {
            log::error!("{message}");
            eprintln!("usage: metaball-clock [SETTINGS.json] [--frames N] [--demo] [--seed N]");
            return ExitCode::from(2);
        }
    };

    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
