//! microtracker CLI: headless playback and WAV export.
//!
//! Usage:
//!   mt-cli path/to/song [--config mt.toml]
//!   mt-cli path/to/song --wav output.wav

use log::error;
use mt_master::{Config, Controller, OrderEntry};
use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use std::{env, io, thread};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let path = args.get(1).unwrap_or_else(|| {
        eprintln!("Usage: mt-cli <song> [--wav output.wav] [--config mt.toml]");
        std::process::exit(1);
    });

    let flag = |name: &str| {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1))
            .cloned()
    };

    let config = match flag("--config") {
        Some(cfg) => Config::load(&cfg).unwrap_or_else(|e| {
            error!("failed to read {}: {}", cfg, e);
            std::process::exit(1);
        }),
        None => Config::default(),
    };

    match flag("--wav") {
        Some(wav) => render_to_wav(path, config, &wav),
        None => play_audio(path, config),
    }
}

fn play_audio(path: &str, config: Config) {
    let ctrl = Controller::open_with_audio(path, config).unwrap_or_else(|e| {
        error!("failed to start playback: {}", e);
        std::process::exit(1);
    });

    ctrl.play();
    println!("Playing {}, press Enter to stop", path);

    let done = Arc::new(AtomicBool::new(false));
    let waiter = {
        let done = done.clone();
        thread::spawn(move || {
            let _ = io::stdin().lock().read_line(&mut String::new());
            done.store(true, Ordering::Relaxed);
        })
    };

    while !done.load(Ordering::Relaxed) {
        let pos = ctrl.position();
        let pattern = ctrl
            .player()
            .with_song(|song| match pos.pattern(song) {
                OrderEntry::Pattern(idx) => idx,
                OrderEntry::End => 0xff,
            });
        print!(
            "\rOrd: {:02X} | Pat: {:02X} | Line: {:02X}",
            pos.order_pos(),
            pattern,
            pos.line()
        );
        let _ = io::stdout().flush();
        thread::sleep(Duration::from_millis(20));
    }
    let _ = waiter.join();

    ctrl.stop();
    println!("\rStopped.                          ");
}

fn render_to_wav(path: &str, config: Config, wav: &str) {
    let sample_rate = config.sample_rate;
    let ctrl = Controller::open(path, config, sample_rate).unwrap_or_else(|e| {
        error!("failed to open {}: {}", path, e);
        std::process::exit(1);
    });

    println!("Rendering to {} at {} Hz...", wav, sample_rate);
    match ctrl.export_wav(wav) {
        Ok(frames) => println!("Rendered {} frames", frames),
        Err(e) => {
            error!("failed to write {}: {}", wav, e);
            std::process::exit(1);
        }
    }
}
