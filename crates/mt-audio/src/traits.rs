//! Audio output trait and error types.

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to create audio stream
    StreamCreate(String),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "Device init error: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "Stream create error: {}", msg),
            AudioError::Playback(msg) => write!(f, "Playback error: {}", msg),
            AudioError::NoDevice => write!(f, "No audio device available"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Trait for pull-based audio output backends.
pub trait AudioOutput {
    /// Device sample rate. Players bound to this output must render at it.
    fn sample_rate(&self) -> u32;

    /// Start (or resume) pulling audio.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Pause the stream. The callback outputs silence while stopped.
    fn stop(&mut self) -> Result<(), AudioError>;
}
