// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line front end for the Mandelbrot zoom renderer.
//!
//! The same binary plays both roles of the process fan-out.  Invoked
//! plainly it is the parent: it resolves the configuration, walks the
//! zoom sequence, and schedules one child process per frame through
//! the pool.  Invoked with the hidden `--frame` flag it is a child: it
//! renders exactly one frame from the geometry given on its command
//! line, persists it, and exits.  Passing the frame geometry through
//! argv is the explicit stand-in for fork's copy-of-everything; a
//! frame job is the only state a child actually needs.

extern crate anyhow;
extern crate clap;
extern crate env_logger;
extern crate image;
extern crate log;
extern crate mandelzoom;
extern crate num;
extern crate num_cpus;

use anyhow::{anyhow, Context, Result};
use clap::{App, Arg, ArgMatches};
use image::ColorType;
use log::{debug, info};
use num::Complex;
use std::path::Path;
use std::process::{Child, Command};
use std::str::FromStr;

use mandelzoom::{FrameJob, FrameRenderer, ProcessPool, ZoomSequence, FRAME_COUNT};

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_finite(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn validate_positive(s: &str, err: &str) -> Result<(), String> {
    match f64::from_str(s) {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        _ => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const XCENTER: &str = "xcenter";
const YCENTER: &str = "ycenter";
const SCALE: &str = "scale";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const MAXITER: &str = "maxiter";
const PROCESSES: &str = "processes";
const THREADS: &str = "threads";
const FRAME: &str = "frame";
const OUTFILE: &str = "outfile";

fn args<'a>() -> ArgMatches<'a> {
    // Lets a big machine stripe wider than the default of four, but
    // never below it, so the default always passes validation.
    let max_threads = num_cpus::get().max(4);

    App::new("mandel")
        .version("0.1.0")
        .about("Renders a zooming Mandelbrot animation, one image file per frame")
        .after_help(
            "Some examples are:\n\
             mandel -x -0.5 -y -0.5 -s 0.2\n\
             mandel -x -.38 -y -.665 -s .05 -m 100\n\
             mandel -x 0.286932 -y 0.014287 -s .0005 -m 1000",
        )
        .arg(
            Arg::with_name(XCENTER)
                .long(XCENTER)
                .short("x")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| {
                    validate_finite(&s, "The center's x coordinate must be a finite number")
                })
                .help("X coordinate of image center point"),
        )
        .arg(
            Arg::with_name(YCENTER)
                .long(YCENTER)
                .short("y")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| {
                    validate_finite(&s, "The center's y coordinate must be a finite number")
                })
                .help("Y coordinate of image center point"),
        )
        .arg(
            Arg::with_name(SCALE)
                .long(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("4")
                .validator(|s| validate_positive(&s, "The scale must be a positive number"))
                .help("Scale of the image in Mandelbrot coordinates (X-axis)"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .long(WIDTH)
                .short("W")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse the image width",
                        "The image width must be between 1 and 100000 pixels",
                    )
                })
                .help("Width of the image in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .long(HEIGHT)
                .short("H")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse the image height",
                        "The image height must be between 1 and 100000 pixels",
                    )
                })
                .help("Height of the image in pixels"),
        )
        .arg(
            Arg::with_name(MAXITER)
                .long(MAXITER)
                .short("m")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        10_000_000,
                        "Could not parse the iteration budget",
                        "The iteration budget must be between 1 and 10000000",
                    )
                })
                .help("The maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(PROCESSES)
                .long(PROCESSES)
                .short("p")
                .takes_value(true)
                .default_value("12")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        1024,
                        "Could not parse the process count",
                        "The process count must be between 1 and 1024",
                    )
                })
                .help("Maximum number of frames rendering concurrently"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("4")
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse the thread count",
                        &format!("The thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Worker threads per frame"),
        )
        .arg(
            Arg::with_name(FRAME)
                .long(FRAME)
                .takes_value(true)
                .hidden(true)
                .validator(|s| validate_number::<usize>(&s, "Could not parse the frame index"))
                .help("Internal: render the single frame with this index and exit"),
        )
        .arg(
            Arg::with_name(OUTFILE)
                .long(OUTFILE)
                .takes_value(true)
                .hidden(true)
                .help("Internal: file the single rendered frame is written to"),
        )
        .get_matches()
}

/// The configuration, resolved exactly once from the command line
/// before any rendering starts.  Nothing mutates it afterwards.
#[derive(Copy, Clone, Debug)]
struct Config {
    center: Complex<f64>,
    xscale: f64,
    width: usize,
    height: usize,
    max: u32,
    processes: usize,
    threads: usize,
}

fn parsed<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| anyhow!("missing value for --{}", name))?;
    T::from_str(raw).map_err(|_| anyhow!("could not parse --{} value {:?}", name, raw))
}

impl Config {
    fn from_matches(matches: &ArgMatches) -> Result<Config> {
        Ok(Config {
            center: Complex::new(parsed(matches, XCENTER)?, parsed(matches, YCENTER)?),
            xscale: parsed(matches, SCALE)?,
            width: parsed(matches, WIDTH)?,
            height: parsed(matches, HEIGHT)?,
            max: parsed(matches, MAXITER)?,
            processes: parsed(matches, PROCESSES)?,
            threads: parsed(matches, THREADS)?,
        })
    }

    fn yscale(&self) -> f64 {
        self.xscale / (self.width as f64) * (self.height as f64)
    }
}

/// Pack the 0xRRGGBB buffer into RGB8 bytes and let the image crate
/// pick the encoder from the file extension.
fn write_image(outfile: &str, pixels: &[u32], bounds: (usize, usize)) -> Result<()> {
    let mut bytes = Vec::with_capacity(pixels.len() * 3);
    for color in pixels {
        bytes.push((color >> 16) as u8);
        bytes.push((color >> 8) as u8);
        bytes.push(*color as u8);
    }
    image::save_buffer(
        Path::new(outfile),
        &bytes,
        bounds.0 as u32,
        bounds.1 as u32,
        ColorType::RGB(8),
    )
    .with_context(|| format!("could not write {}", outfile))
}

/// Child mode: render the one frame described by this process's
/// arguments, persist it, exit.  The scale on a child's command line
/// is the frame's own, already-zoomed scale, not the animation's
/// initial one.
fn render_frame(config: &Config, index: usize, outfile: &str) -> Result<()> {
    debug!("frame {}: rendering into {}", index, outfile);
    let renderer = FrameRenderer::new(
        config.width,
        config.height,
        config.center,
        config.xscale,
        config.yscale(),
        config.max,
    )
    .map_err(|e| anyhow!(e))?;

    // The frame's private buffer; dropped only after persistence.
    let mut buffer = vec![0u32; renderer.len()];
    renderer.render(&mut buffer, config.threads).map_err(|e| anyhow!(e))?;
    write_image(outfile, &buffer, (config.width, config.height))
}

/// Parent mode: walk the zoom sequence and schedule every frame onto
/// a child process, at most `config.processes` at a time.
fn render_animation(config: &Config) -> Result<()> {
    let pool = ProcessPool::new(config.processes).map_err(|e| anyhow!(e))?;
    let exe = std::env::current_exe().context("could not locate our own executable")?;

    let launch = |job: &FrameJob| -> Result<Child, String> {
        info!(
            "mandel: x={} y={} xscale={} yscale={} max={} outfile={}",
            job.center.re,
            job.center.im,
            job.xscale,
            job.yscale,
            job.max,
            job.outfile()
        );
        Command::new(&exe)
            .arg("--frame")
            .arg(job.index.to_string())
            .arg("--outfile")
            .arg(job.outfile())
            .arg("-x")
            .arg(job.center.re.to_string())
            .arg("-y")
            .arg(job.center.im.to_string())
            .arg("-s")
            .arg(job.xscale.to_string())
            .arg("-W")
            .arg(job.width.to_string())
            .arg("-H")
            .arg(job.height.to_string())
            .arg("-m")
            .arg(job.max.to_string())
            .arg("-t")
            .arg(config.threads.to_string())
            .spawn()
            .map_err(|e| e.to_string())
    };

    let join = |job: &FrameJob, mut child: Child| -> Result<(), String> {
        match child.wait() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(format!("child for {} exited with {}", job.outfile(), status)),
            Err(e) => Err(format!("could not wait for {}: {}", job.outfile(), e)),
        }
    };

    let sequence = ZoomSequence::new(
        config.center,
        config.xscale,
        config.width,
        config.height,
        config.max,
        FRAME_COUNT,
    );
    let rendered = pool.run(sequence, launch, join).map_err(|e| anyhow!(e))?;
    info!("rendered {} frames", rendered);
    Ok(())
}

fn run() -> Result<()> {
    let matches = args();
    let config = Config::from_matches(&matches)?;

    if matches.is_present(FRAME) {
        let index: usize = parsed(&matches, FRAME)?;
        let default = format!("mandel{}.png", index);
        let outfile = matches.value_of(OUTFILE).unwrap_or(&default);
        render_frame(&config, index, outfile)
    } else {
        render_animation(&config)
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("mandel: {:#}", e);
        std::process::exit(1);
    }
}
