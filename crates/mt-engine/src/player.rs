//! Tick scheduler and render entry point.
//!
//! A `Player` owns the song, the playback cursor and the plugin chain behind
//! one mutex. The audio thread pulls blocks through [`Player::render_some`];
//! the editing thread takes the same lock through [`Player::begin_edit`].
//! Blocks never straddle a tick while playing, so note events always land on
//! the first sample of a block.

use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, info};
use mt_ir::{event_frequency, Command, Song, SongCursor};

use crate::chain::{PluginChain, PluginRole};

/// Pattern lines played per second.
pub const TICKS_PER_SECOND: u32 = 12;

/// Velocity passed with every pattern note-on.
pub const NOTE_VELOCITY: f32 = 0.5;

struct PlayerState {
    song: Song,
    chain: PluginChain,
    cursor: SongCursor,
    playing: bool,
    /// Samples left before the next line fires. Signed so a fresh player
    /// (0) fires immediately.
    ticks_remaining: i64,
}

impl PlayerState {
    /// Fire every line that is due, in order, before any audio is rendered.
    fn handle_due_ticks(&mut self, samples_per_tick: u32) {
        while self.playing && self.ticks_remaining <= 0 {
            self.tick();
            self.ticks_remaining += samples_per_tick as i64;
        }
    }

    fn tick(&mut self) {
        if let Some(line) = self.song.line_events(&self.cursor) {
            for (track, event) in line.iter().enumerate() {
                match event.command {
                    Command::Nop | Command::Unknown(_) => {}
                    Command::NoteOff => self.chain.note_off(track),
                    Command::NoteOn | Command::JustNoteOn | Command::AltEdoNoteOn => {
                        self.chain.note_off(track);
                        let freq = event_frequency(event, self.song.divisions)
                            .map(|freq| freq as f32)
                            .filter(|freq| freq.is_finite());
                        if let Some(freq) = freq {
                            self.chain.note_on(track, freq, NOTE_VELOCITY);
                        }
                    }
                }
            }
        }
        self.cursor.advance(&self.song);
    }
}

/// Real-time song player.
pub struct Player {
    state: Mutex<PlayerState>,
    /// Playback cursor mirror for lock-free reads (see [`SongCursor::to_bits`]).
    position: AtomicU16,
    samples_per_tick: u32,
    sample_rate: u32,
}

impl Player {
    /// Bind a song to an initialized plugin chain. Starts stopped at the
    /// beginning of the song.
    pub fn new(song: Song, chain: PluginChain) -> Self {
        let sample_rate = chain.sample_rate();
        let samples_per_tick = (sample_rate / TICKS_PER_SECOND).max(1);
        info!(
            "player: {} Hz, {} samples per tick, order length {}",
            sample_rate,
            samples_per_tick,
            song.order_length()
        );

        let cursor = SongCursor::start();
        Self {
            state: Mutex::new(PlayerState {
                song,
                chain,
                cursor,
                playing: false,
                ticks_remaining: 0,
            }),
            position: AtomicU16::new(cursor.to_bits()),
            samples_per_tick,
            sample_rate,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PlayerState> {
        // A panic under the lock cannot leave the song torn in a way
        // rendering cares about, so keep going.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, cursor: SongCursor) {
        self.position.store(cursor.to_bits(), Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples_per_tick(&self) -> u32 {
        self.samples_per_tick
    }

    // --- Rendering ---

    /// Render up to `min(left.len(), right.len())` frames and return how many
    /// were produced.
    ///
    /// While playing the block stops at the next tick boundary, so the return
    /// value may be shorter than requested. Returns 0 only for empty buffers.
    pub fn render_some(&self, left: &mut [f32], right: &mut [f32]) -> usize {
        let max = left.len().min(right.len());
        if max == 0 {
            return 0;
        }

        let mut state = self.lock();
        state.handle_due_ticks(self.samples_per_tick);

        let block = if state.playing {
            max.min(state.ticks_remaining as usize)
        } else {
            max
        };

        state.chain.process(&mut left[..block], &mut right[..block]);

        if state.playing {
            state.ticks_remaining -= block as i64;
        }
        self.publish(state.cursor);
        block
    }

    /// Fill both buffers completely, calling [`Player::render_some`] as often
    /// as needed.
    pub fn render_all(&self, left: &mut [f32], right: &mut [f32]) {
        let len = left.len().min(right.len());
        let mut done = 0;
        while done < len {
            done += self.render_some(&mut left[done..len], &mut right[done..len]);
        }
    }

    // --- Transport ---

    /// Resume from the current cursor.
    pub fn play(&self) {
        let mut state = self.lock();
        state.playing = true;
        debug!("play at {:?}", state.cursor);
    }

    /// Stop and release the gate on every track.
    pub fn stop(&self) {
        let mut state = self.lock();
        state.playing = false;
        state.chain.all_notes_off();
        debug!("stop at {:?}", state.cursor);
    }

    /// Jump to `cursor` and play. A partly rendered tick is finished first,
    /// then the line at `cursor` fires; from a tick boundary it fires on the
    /// next render call.
    pub fn play_from(&self, cursor: SongCursor) {
        let mut state = self.lock();
        let state = &mut *state;
        state.cursor = cursor;
        state.cursor.normalize(&state.song);
        state.playing = true;
        self.publish(state.cursor);
        debug!("play from {:?}", state.cursor);
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// True at order slot 0, line 0 with no partial tick pending. After
    /// rendering has started this marks one completed pass of the song.
    pub fn is_at_beginning_of_song(&self) -> bool {
        let state = self.lock();
        state.cursor.is_at_beginning_of_song() && state.ticks_remaining == 0
    }

    /// Samples until the next line fires.
    pub fn ticks_remaining(&self) -> i64 {
        self.lock().ticks_remaining
    }

    /// Last published playback cursor. Does not lock and may lag the audio
    /// thread by one block.
    pub fn position(&self) -> SongCursor {
        SongCursor::from_bits(self.position.load(Ordering::Relaxed))
    }

    // --- Song access ---

    /// Lock the song for editing. Rendering blocks until the guard drops;
    /// on release the playback cursor is re-wrapped against the edited song.
    pub fn begin_edit(&self) -> SongEdit<'_> {
        SongEdit {
            guard: self.lock(),
            position: &self.position,
        }
    }

    /// Read the song under the lock.
    pub fn with_song<R>(&self, f: impl FnOnce(&Song) -> R) -> R {
        f(&self.lock().song)
    }

    /// Tear down the player and its plugins, returning the song.
    pub fn into_song(self) -> Song {
        let state = self.state.into_inner().unwrap_or_else(PoisonError::into_inner);
        state.song
    }

    // --- Performance controls ---

    /// Bend every instrument voice by `cents`.
    pub fn pitch_bend(&self, cents: f32) {
        self.lock().chain.pitch_bend(cents);
    }

    pub fn mod_wheel(&self, value: f32) {
        self.lock().chain.mod_wheel(value);
    }

    /// Instrument output level, 0 to 1.
    pub fn volume(&self, value: f32) {
        self.lock().chain.volume(value);
    }

    // --- Plugin parameters ---

    pub fn param(&self, role: PluginRole, id: u16) -> Option<f32> {
        self.lock().chain.param(role, id)
    }

    /// Set a plugin parameter. Returns false if no plugin fills `role`.
    pub fn set_param(&self, role: PluginRole, id: u16, value: f32) -> bool {
        self.lock().chain.set_param(role, id, value)
    }
}

/// Exclusive song access held between `begin_edit` and `end`.
pub struct SongEdit<'a> {
    guard: MutexGuard<'a, PlayerState>,
    position: &'a AtomicU16,
}

impl SongEdit<'_> {
    /// Release the lock. Same as dropping the guard.
    pub fn end(self) {}
}

impl Deref for SongEdit<'_> {
    type Target = Song;

    fn deref(&self) -> &Song {
        &self.guard.song
    }
}

impl DerefMut for SongEdit<'_> {
    fn deref_mut(&mut self) -> &mut Song {
        &mut self.guard.song
    }
}

impl Drop for SongEdit<'_> {
    fn drop(&mut self) {
        let state = &mut *self.guard;
        state.cursor.normalize(&state.song);
        self.position.store(state.cursor.to_bits(), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::{OnePole, SimpleSynth, Swap};
    use mt_ir::{Event, OrderEntry};

    fn song_with_length(len: usize) -> Song {
        let mut song = Song::new();
        for pos in 0..len {
            song.set_order_entry(pos, OrderEntry::Pattern(0));
        }
        song
    }

    fn player(song: Song, sample_rate: u32) -> Player {
        let chain = PluginChain::new(Box::new(SimpleSynth::new()), None, sample_rate).unwrap();
        Player::new(song, chain)
    }

    #[test]
    fn samples_per_tick_is_a_twelfth_of_a_second() {
        assert_eq!(player(Song::new(), 48000).samples_per_tick(), 4000);
        assert_eq!(player(Song::new(), 44100).samples_per_tick(), 3675);
        assert_eq!(player(Song::new(), 5).samples_per_tick(), 1);
    }

    #[test]
    fn stopped_player_renders_whole_request() {
        let p = player(Song::new(), 48000);
        let mut l = vec![1.0f32; 10_000];
        let mut r = vec![1.0f32; 10_000];
        assert_eq!(p.render_some(&mut l, &mut r), 10_000);
        assert!(l.iter().chain(&r).all(|s| *s == 0.0));
        assert_eq!(p.position(), SongCursor::start());
    }

    #[test]
    fn playing_blocks_stop_at_tick_boundaries() {
        let p = player(Song::new(), 48000);
        p.play();
        let mut l = vec![0.0f32; 10_000];
        let mut r = vec![0.0f32; 10_000];

        assert_eq!(p.render_some(&mut l, &mut r), 4000);
        assert_eq!(p.position(), SongCursor::new(0, 1));
        assert_eq!(p.render_some(&mut l[..1500], &mut r[..1500]), 1500);
        assert_eq!(p.ticks_remaining(), 2500);
        assert_eq!(p.render_some(&mut l, &mut r), 2500);
        assert_eq!(p.render_some(&mut l, &mut r), 4000);
        assert_eq!(p.position(), SongCursor::new(0, 3));
    }

    #[test]
    fn empty_buffers_render_nothing() {
        let p = player(Song::new(), 48000);
        p.play();
        assert_eq!(p.render_some(&mut [], &mut [0.0; 4]), 0);
        assert_eq!(p.position(), SongCursor::start());
    }

    #[test]
    fn render_all_fills_across_ticks() {
        let p = player(Song::new(), 1200);
        p.play();
        let mut l = vec![0.0f32; 350];
        let mut r = vec![0.0f32; 350];
        p.render_all(&mut l, &mut r);
        // 100 samples per tick: lines 0..=3 have fired
        assert_eq!(p.position(), SongCursor::new(0, 4));
        assert_eq!(p.ticks_remaining(), 50);
    }

    #[test]
    fn one_pass_returns_to_beginning() {
        let p = player(song_with_length(2), 1200);
        assert!(p.is_at_beginning_of_song());
        p.play();

        let mut l = vec![0.0f32; 100];
        let mut r = vec![0.0f32; 100];
        p.render_all(&mut l, &mut r);
        assert!(!p.is_at_beginning_of_song());

        for _ in 1..(64 * 2) {
            p.render_all(&mut l, &mut r);
        }
        assert!(p.is_at_beginning_of_song());
    }

    #[test]
    fn notes_reach_the_instrument() {
        let mut song = Song::new();
        if let Some(pattern) = song.pattern_mut(0) {
            *pattern.event_mut(0, 1) = Event::note_on(4, 31);
        }
        let p = player(song, 48000);
        p.play();

        let mut l = vec![0.0f32; 4000];
        let mut r = vec![0.0f32; 4000];
        p.render_all(&mut l, &mut r);
        assert!(l.iter().any(|s| s.abs() > 1.0e-4));

        p.stop();
        assert!(!p.is_playing());
    }

    #[test]
    fn play_from_normalizes_and_fires_immediately() {
        let p = player(song_with_length(3), 1200);
        p.play_from(SongCursor::new(7, 10));
        assert_eq!(p.position(), SongCursor::new(1, 10));
        assert_eq!(p.ticks_remaining(), 0);

        let mut l = [0.0f32; 100];
        let mut r = [0.0f32; 100];
        assert_eq!(p.render_some(&mut l, &mut r), 100);
        assert_eq!(p.position(), SongCursor::new(1, 11));
    }

    #[test]
    fn play_from_keeps_pending_tick() {
        let p = player(song_with_length(3), 1200);
        p.play();
        let mut l = [0.0f32; 100];
        let mut r = [0.0f32; 100];
        assert_eq!(p.render_some(&mut l[..30], &mut r[..30]), 30);
        assert_eq!(p.ticks_remaining(), 70);

        p.play_from(SongCursor::new(2, 5));
        assert_eq!(p.ticks_remaining(), 70);
        // the rest of the old tick plays out before line 5 fires
        assert_eq!(p.render_some(&mut l, &mut r), 70);
        assert_eq!(p.position(), SongCursor::new(2, 5));
        assert_eq!(p.render_some(&mut l, &mut r), 100);
        assert_eq!(p.position(), SongCursor::new(2, 6));
    }

    #[test]
    fn out_of_range_octave_stays_silent_and_finite() {
        let mut song = Song::new();
        if let Some(pattern) = song.pattern_mut(0) {
            *pattern.event_mut(0, 0) = Event::note_on(200, 0);
            *pattern.event_mut(1, 0) = Event::note_off();
            *pattern.event_mut(2, 1) = Event::note_on(4, 0);
        }
        let chain = PluginChain::new(
            Box::new(SimpleSynth::new()),
            Some(Box::new(OnePole::new())),
            1200,
        )
        .unwrap();
        let p = Player::new(song, chain);
        p.play();

        let mut l = vec![0.0f32; 100 * 40];
        let mut r = vec![0.0f32; 100 * 40];
        p.render_all(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|s| s.is_finite()));
        // line 0 stays silent, the valid note on track 1 sounds
        assert!(l[..200].iter().all(|s| *s == 0.0));
        assert!(l[3000..].iter().any(|s| s.abs() > 1.0e-4));
    }

    #[test]
    fn unknown_commands_play_as_nop() {
        let mut song = Song::new();
        if let Some(pattern) = song.pattern_mut(0) {
            *pattern.event_mut(0, 2) = Event {
                command: Command::Unknown(42),
                octave: 4,
                degree: 0,
            };
        }
        let p = player(song, 1200);
        p.play();
        let mut l = vec![0.0f32; 400];
        let mut r = vec![0.0f32; 400];
        p.render_all(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|s| *s == 0.0));
    }

    #[test]
    fn empty_order_list_loops_one_pattern() {
        let mut song = Song::new();
        song.set_order_entry(0, OrderEntry::End);
        assert_eq!(song.order_length(), 0);

        let p = player(song, 1200);
        p.play_from(SongCursor::new(3, 0));
        assert_eq!(p.position(), SongCursor::start());

        let mut l = vec![0.0f32; 100];
        let mut r = vec![0.0f32; 100];
        for line in 1..64 {
            p.render_all(&mut l, &mut r);
            assert_eq!(p.position(), SongCursor::new(0, line));
        }
        p.render_all(&mut l, &mut r);
        assert!(p.is_at_beginning_of_song());
        assert!(l.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn controls_reach_the_instrument() {
        let mut song = Song::new();
        if let Some(pattern) = song.pattern_mut(0) {
            *pattern.event_mut(0, 0) = Event::note_on(4, 0);
        }
        let p = player(song, 48000);
        p.volume(0.0);
        p.pitch_bend(700.0);
        p.mod_wheel(1.0);
        p.play();

        let mut l = vec![0.0f32; 4000];
        let mut r = vec![0.0f32; 4000];
        p.render_all(&mut l, &mut r);
        assert!(l.iter().chain(&r).all(|s| *s == 0.0));

        p.volume(1.0);
        p.render_all(&mut l, &mut r);
        assert!(l.iter().any(|s| s.abs() > 1.0e-4));
    }

    #[test]
    fn edit_guard_renormalizes_cursor() {
        let p = player(song_with_length(3), 1200);
        p.play_from(SongCursor::new(2, 5));

        let mut edit = p.begin_edit();
        edit.delete_order(2);
        edit.delete_order(1);
        assert_eq!(edit.order_length(), 1);
        edit.end();

        assert_eq!(p.position(), SongCursor::new(0, 5));
        p.with_song(|song| assert_eq!(song.order_length(), 1));
    }

    #[test]
    fn params_route_through_lock() {
        let chain = PluginChain::new(Box::new(SimpleSynth::new()), Some(Box::new(Swap)), 48000)
            .unwrap();
        let p = Player::new(Song::new(), chain);
        assert!(p.set_param(PluginRole::Instrument, 0, 0.5));
        assert_eq!(p.param(PluginRole::Instrument, 0), Some(0.5));
        assert_eq!(p.param(PluginRole::Effect, 0), None);
    }

    #[test]
    fn into_song_returns_edits() {
        let p = player(Song::new(), 48000);
        p.begin_edit().divisions = 31;
        assert_eq!(p.into_song().divisions, 31);
    }
}
