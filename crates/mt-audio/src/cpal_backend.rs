//! CPAL-based audio output backend.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use log::{error, info, warn};
use mt_engine::Player;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::traits::{AudioError, AudioOutput};

/// Frames rendered per `render_all` call inside the callback.
const SCRATCH_FRAMES: usize = 1024;

/// CPAL-based audio output.
pub struct CpalOutput {
    device: Device,
    config: StreamConfig,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl CpalOutput {
    /// Open the default output device.
    pub fn new() -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoDevice)?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::DeviceInit(e.to_string()))?;

        let mut config: StreamConfig = config.into();
        // The callback writes interleaved stereo
        config.channels = 2;

        info!(
            "audio device {}: {} Hz",
            device.name().unwrap_or_else(|_| "<unnamed>".into()),
            config.sample_rate.0
        );

        Ok(Self {
            device,
            config,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Build the stream; the callback pulls every block from `player`.
    pub fn build_stream(&mut self, player: Arc<Player>) -> Result<(), AudioError> {
        if player.sample_rate() != self.config.sample_rate.0 {
            warn!(
                "player renders at {} Hz but the device runs at {} Hz",
                player.sample_rate(),
                self.config.sample_rate.0
            );
        }

        let running = self.running.clone();
        let channels = self.config.channels as usize;
        let mut left = vec![0.0f32; SCRATCH_FRAMES];
        let mut right = vec![0.0f32; SCRATCH_FRAMES];

        let stream = self.device
            .build_output_stream(
                &self.config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    data.fill(0.0);
                    if !running.load(Ordering::Relaxed) {
                        return;
                    }

                    for chunk in data.chunks_mut(SCRATCH_FRAMES * channels) {
                        let frames = chunk.len() / channels;
                        player.render_all(&mut left[..frames], &mut right[..frames]);

                        let rendered = left[..frames].iter().zip(&right[..frames]);
                        for (out, (l, r)) in chunk.chunks_exact_mut(channels).zip(rendered) {
                            out[0] = *l;
                            out[1] = *r;
                        }
                    }
                },
                |err| error!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamCreate(e.to_string()))?;

        self.stream = Some(stream);
        Ok(())
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.play().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ref stream) = self.stream {
            stream.pause().map_err(|e| AudioError::Playback(e.to_string()))?;
        }
        Ok(())
    }
}
