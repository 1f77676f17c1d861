//! Headless controller for microtracker.
//!
//! Ties a song file, a [`Player`] and an optional audio device together and
//! offers the editing operations a front end needs. Every song mutation goes
//! through the player's edit lock.

mod config;
mod export;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};
use mt_audio::{AudioError, AudioOutput, CpalOutput};

pub use config::Config;
pub use export::{export_wav, render_loop, render_song};
pub use mt_engine::{Frame, Player, PluginError, PluginRole};
pub use mt_formats::FormatError;
pub use mt_ir::{Edit, Event, OrderEntry, Song, SongCursor, TuningMode, TRACKS};

/// Error type for controller operations.
#[derive(Debug)]
pub enum ControllerError {
    /// Song file could not be read or written
    Format(FormatError),
    /// Plugins could not be instantiated
    Plugin(PluginError),
    /// Audio device failure
    Audio(AudioError),
    /// Config file could not be parsed or encoded
    Config(String),
    /// I/O error outside the song file
    Io(std::io::Error),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::Format(e) => write!(f, "{}", e),
            ControllerError::Plugin(e) => write!(f, "{}", e),
            ControllerError::Audio(e) => write!(f, "{}", e),
            ControllerError::Config(msg) => write!(f, "Config error: {}", msg),
            ControllerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

impl From<FormatError> for ControllerError {
    fn from(e: FormatError) -> Self {
        ControllerError::Format(e)
    }
}

impl From<PluginError> for ControllerError {
    fn from(e: PluginError) -> Self {
        ControllerError::Plugin(e)
    }
}

impl From<AudioError> for ControllerError {
    fn from(e: AudioError) -> Self {
        ControllerError::Audio(e)
    }
}

impl From<std::io::Error> for ControllerError {
    fn from(e: std::io::Error) -> Self {
        ControllerError::Io(e)
    }
}

/// A song file open for playback and editing.
///
/// The audio stream holds its own handle to the player, so `output` is torn
/// down before `player` and plugins finalize on the thread dropping the
/// controller.
pub struct Controller {
    output: Option<CpalOutput>,
    path: PathBuf,
    config: Config,
    player: Arc<Player>,
    cursor: SongCursor,
    track: usize,
    tuning: TuningMode,
}

impl Controller {
    /// Open `path` and bind the configured plugins at `sample_rate`.
    ///
    /// A missing file starts an empty song that `save` will create.
    pub fn open(
        path: impl Into<PathBuf>,
        config: Config,
        sample_rate: u32,
    ) -> Result<Self, ControllerError> {
        let path = path.into();
        let chain = config.chain(sample_rate)?;

        let song = match mt_formats::load_song(&path) {
            Ok(song) => song,
            Err(FormatError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("{} does not exist, starting a new song", path.display());
                Song::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            output: None,
            path,
            config,
            player: Arc::new(Player::new(song, chain)),
            cursor: SongCursor::start(),
            track: 0,
            tuning: TuningMode::default(),
        })
    }

    /// Open `path` and start pulling audio from the default output device.
    pub fn open_with_audio(path: impl Into<PathBuf>, config: Config) -> Result<Self, ControllerError> {
        let mut output = CpalOutput::new()?;
        let mut ctrl = Self::open(path, config, output.sample_rate())?;
        output.build_stream(ctrl.player.clone())?;
        output.start()?;
        ctrl.output = Some(output);
        Ok(ctrl)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn player(&self) -> &Arc<Player> {
        &self.player
    }

    /// Playback position, read without locking.
    pub fn position(&self) -> SongCursor {
        self.player.position()
    }

    // --- Transport ---

    pub fn play(&self) {
        self.player.play();
    }

    pub fn stop(&self) {
        self.player.stop();
    }

    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Play from the edit cursor.
    pub fn play_from_cursor(&self) {
        self.player.play_from(self.cursor);
    }

    /// Play from line 0 of the pattern under the edit cursor.
    pub fn play_pattern_from_start(&self) {
        self.player.play_from(self.cursor.line_start());
    }

    // --- Edit cursor ---

    pub fn cursor(&self) -> SongCursor {
        self.cursor
    }

    pub fn track(&self) -> usize {
        self.track
    }

    pub fn tuning(&self) -> TuningMode {
        self.tuning
    }

    pub fn set_tuning(&mut self, tuning: TuningMode) {
        self.tuning = tuning;
    }

    pub fn move_line(&mut self, delta: i32) {
        let mut cursor = self.cursor;
        self.player.with_song(|song| cursor.move_pat_line(song, delta));
        self.cursor = cursor;
    }

    pub fn move_order(&mut self, delta: i32) {
        let mut cursor = self.cursor;
        self.player.with_song(|song| cursor.move_order_pos(song, delta));
        self.cursor = cursor;
    }

    /// Move across tracks, wrapping at the edges.
    pub fn move_track(&mut self, delta: i32) {
        self.track = (self.track as i32 + delta).rem_euclid(TRACKS as i32) as usize;
    }

    // --- Editing ---

    /// Apply `edit` under the edit lock and keep the edit cursor valid.
    pub fn apply(&mut self, edit: Edit) {
        let mut cursor = self.cursor;
        {
            let mut song = self.player.begin_edit();
            song.apply_edit(&edit);
            match edit {
                Edit::InsertOrder(_) => cursor.move_order_pos(&song, 1),
                _ if edit.changes_order() => cursor.normalize(&song),
                _ => {}
            }
        }
        debug!("applied {:?}", edit);
        self.cursor = cursor;
    }

    fn pattern_under_cursor(&self) -> Option<u8> {
        match self.player.with_song(|song| song.pattern_at(&self.cursor)) {
            OrderEntry::Pattern(idx) => Some(idx),
            OrderEntry::End => None,
        }
    }

    /// Write `event` under the cursor and step down one line.
    pub fn enter(&mut self, event: Event) {
        if let Some(pattern) = self.pattern_under_cursor() {
            self.apply(Edit::SetEvent {
                pattern,
                line: self.cursor.line(),
                track: self.track,
                event,
            });
        }
        self.move_line(1);
    }

    /// Enter diatonic step `diatonic` of `octave` in the current tuning.
    /// Does nothing in just intonation.
    pub fn enter_note_on(&mut self, octave: u8, diatonic: usize) {
        if let Some(event) = self.tuning.note_on(octave, diatonic) {
            self.enter(event);
        }
    }

    pub fn transpose(&mut self, delta: i32) {
        if let Some(pattern) = self.pattern_under_cursor() {
            self.apply(Edit::Transpose {
                pattern,
                line: self.cursor.line(),
                track: self.track,
                delta,
            });
        }
    }

    pub fn insert_order(&mut self) {
        self.apply(Edit::InsertOrder(self.cursor.order_pos()));
    }

    /// Delete the order entry under the cursor. The last remaining entry
    /// is kept, so the song always has a pattern to play.
    pub fn delete_order(&mut self) {
        if self.player.with_song(Song::order_length) <= 1 {
            debug!("not deleting the only order entry");
            return;
        }
        self.apply(Edit::DeleteOrder(self.cursor.order_pos()));
    }

    pub fn increment_order(&mut self, delta: i32) {
        self.apply(Edit::IncrementOrder {
            pos: self.cursor.order_pos(),
            delta,
        });
    }

    pub fn uniquify_pattern(&mut self) {
        self.apply(Edit::UniquifyPattern(self.cursor.order_pos()));
    }

    // --- Files ---

    /// Write the song to its file. The lock is held only to copy the song.
    pub fn save(&self) -> Result<(), ControllerError> {
        let song = self.player.with_song(Song::clone);
        mt_formats::save_song(&song, &self.path)?;
        Ok(())
    }

    /// Stop and reload the song from disk. On error the song in memory is
    /// kept. The file is read before the lock is taken.
    pub fn reload(&mut self) -> Result<(), ControllerError> {
        self.player.stop();
        let song = mt_formats::load_song(&self.path)?;

        let mut edit = self.player.begin_edit();
        let old = std::mem::replace(&mut *edit, song);
        self.cursor.normalize(&edit);
        edit.end();
        drop(old);
        Ok(())
    }

    /// Render one loop of the current song offline to `path`.
    pub fn export_wav(&self, path: impl AsRef<Path>) -> Result<usize, ControllerError> {
        let song = self.player.with_song(Song::clone);
        export::export_wav(song, &self.config, path)
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(mut output) = self.output.take() {
            let _ = output.stop();
            drop(output);
        }
    }
}
