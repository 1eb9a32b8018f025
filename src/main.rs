// Copyright 2020 TwoCookingMice

use spectral_camera::core::camera::Camera;
use spectral_camera::io::camera_loader::{load_camera, CameraDescription};
use spectral_camera::io::preview::PngPreview;
use spectral_camera::scenes::sky::SkyWorld;
use spectral_camera::sensors::pinhole::PinholeCamera;

use console::style;
use std::env;
use std::sync::Arc;
use std::time::Duration;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} [camera.xml] <output.(png|exr)> [--passes N] [--workers N] [--spp N] [--rays N] [--seed N] [--preview path.png]",
              program);
    std::process::exit(1);
}

fn fail(message: String) -> ! {
    eprintln!("{} {}", style("error:").red().bold(), message);
    std::process::exit(1);
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).and_then(|v| v.parse::<T>().ok()) {
        Some(value) => value,
        None => fail(format!("{} expects a numeric value", flag)),
    }
}

fn main() {
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let positional: Vec<&String> = args.iter().skip(1).take_while(|a| !a.starts_with("--")).collect();
    let (camera_path, output_path) = match positional.as_slice() {
        [output] => (None, output.to_string()),
        [camera, output] => (Some(camera.to_string()), output.to_string()),
        _ => usage(&args[0]),
    };

    let mut passes: u32 = 1;
    let mut workers: Option<usize> = None;
    let mut spp: Option<u32> = None;
    let mut rays: Option<usize> = None;
    let mut seed: Option<u64> = None;
    let mut preview_path: Option<String> = None;

    let mut i = 1 + positional.len();
    while i < args.len() {
        match args[i].as_str() {
            "--passes" => {
                i += 1;
                passes = parse_value(&args, i, "--passes");
            }
            "--workers" => {
                i += 1;
                workers = Some(parse_value(&args, i, "--workers"));
            }
            "--spp" => {
                i += 1;
                spp = Some(parse_value(&args, i, "--spp"));
            }
            "--rays" => {
                i += 1;
                rays = Some(parse_value(&args, i, "--rays"));
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_value(&args, i, "--seed"));
            }
            "--preview" => {
                i += 1;
                preview_path = args.get(i).cloned();
            }
            other => log::warn!("Ignoring unknown argument {}", other),
        }
        i += 1;
    }

    let mut description = match &camera_path {
        Some(path) => load_camera(path).unwrap_or_else(|e| fail(format!("failed to load {}: {}", path, e))),
        None => CameraDescription::default(),
    };

    let config = &mut description.config;
    let overrides = workers.map_or(Ok(()), |w| config.set_worker_count(w))
        .and_then(|_| spp.map_or(Ok(()), |s| config.set_pixel_samples(s)))
        .and_then(|_| rays.map_or(Ok(()), |r| config.set_spectral_rays(r)));
    if let Err(e) = overrides {
        fail(e.to_string());
    }
    if seed.is_some() {
        config.set_seed(seed);
    }
    config.set_accumulate(true);
    config.set_display_progress(preview_path.is_some() || config.display_progress());

    let mut camera: Camera<PinholeCamera> = description.build().unwrap_or_else(|e| fail(e.to_string()));
    camera.attach(Arc::new(SkyWorld::default()));
    if let Some(path) = &preview_path {
        camera.set_preview(Some(Box::new(PngPreview::new(path))));
    }

    let mut elapsed = Duration::from_secs(0);
    let mut rays_traced = 0u64;
    for pass in 0..passes {
        log::info!("Pass {}/{}", pass + 1, passes);
        match camera.observe() {
            Ok(statistics) => {
                elapsed += statistics.elapsed;
                rays_traced += statistics.rays;
            }
            Err(e) => fail(format!("pass {} failed: {}", pass + 1, e)),
        }
    }

    if let Err(e) = camera.save(&output_path) {
        fail(format!("failed to save {}: {}", output_path, e));
    }

    let (width, height) = camera.pixels();
    println!("{} {}", style("Saved").green().bold(), style(&output_path).bold());
    println!("  {:<12} {}x{}", style("resolution").dim(), width, height);
    println!("  {:<12} {}", style("passes").dim(), passes);
    println!("  {:<12} {}", style("samples").dim(), camera.accumulated_samples());
    println!("  {:<12} {}", style("rays").dim(), rays_traced);
    println!("  {:<12} {:.3}s", style("time").dim(), elapsed.as_secs_f64());
}
