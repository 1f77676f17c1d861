//! Offline rendering of one pass through the song.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::{info, warn};
use mt_engine::{Frame, Player};
use mt_ir::{Song, SongCursor};

use crate::{Config, ControllerError};

/// Render `song` from the top until it loops back to the beginning.
pub fn render_song(song: Song, config: &Config) -> Result<Vec<Frame>, ControllerError> {
    let chain = config.chain(config.sample_rate)?;
    let player = Player::new(song, chain);
    Ok(render_loop(&player, config.export_block, config.max_export_frames()))
}

/// Play `player` from the start for exactly one song loop, or `max_frames`
/// if that comes first. Leaves the player stopped.
///
/// The player must sit on a tick boundary (a fresh player does); a partly
/// rendered tick is finished before the first line fires.
pub fn render_loop(player: &Player, block: usize, max_frames: usize) -> Vec<Frame> {
    let block = block.max(1);
    let mut left = vec![0.0f32; block];
    let mut right = vec![0.0f32; block];
    let mut frames = Vec::new();

    player.play_from(SongCursor::start());
    while frames.len() < max_frames {
        let n = player.render_some(&mut left, &mut right);
        let start = frames.len();
        frames.resize(start + n, Frame::silence());
        Frame::interleave(&left[..n], &right[..n], &mut frames[start..]);

        if player.is_at_beginning_of_song() {
            break;
        }
    }
    player.stop();

    if frames.len() >= max_frames {
        warn!("export stopped at the {} frame limit before the song looped", max_frames);
        frames.truncate(max_frames);
    }
    frames
}

/// Render `song` and write it as a WAV file.
pub fn export_wav(
    song: Song,
    config: &Config,
    path: impl AsRef<Path>,
) -> Result<usize, ControllerError> {
    let path = path.as_ref();
    let frames = render_song(song, config)?;

    let mut w = BufWriter::new(File::create(path)?);
    mt_formats::write_wav(&mut w, &frames, config.sample_rate)?;
    w.flush()?;

    info!(
        "exported {} frames ({:.1} s) to {}",
        frames.len(),
        frames.len() as f64 / config.sample_rate as f64,
        path.display()
    );
    Ok(frames.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_ir::{Event, OrderEntry};

    fn config(sample_rate: u32) -> Config {
        Config {
            sample_rate,
            export_block: 64,
            ..Config::default()
        }
    }

    #[test]
    fn one_pattern_song_renders_64_ticks() {
        let frames = render_song(Song::new(), &config(1200)).unwrap();
        assert_eq!(frames.len(), 64 * 100);
    }

    #[test]
    fn length_scales_with_order() {
        let mut song = Song::new();
        song.set_order_entry(1, OrderEntry::Pattern(3));
        song.set_order_entry(2, OrderEntry::Pattern(0));
        let frames = render_song(song, &config(1200)).unwrap();
        assert_eq!(frames.len(), 3 * 64 * 100);
    }

    #[test]
    fn cap_truncates_export() {
        let c = Config {
            max_export_seconds: 1,
            ..config(1200)
        };
        let frames = render_song(Song::new(), &c).unwrap();
        assert_eq!(frames.len(), 1200);
    }

    #[test]
    fn notes_are_audible_in_export() {
        let mut song = Song::new();
        if let Some(p) = song.pattern_mut(0) {
            *p.event_mut(0, 0) = Event::note_on(4, 0);
            *p.event_mut(8, 0) = Event::note_off();
        }
        let frames = render_song(song, &config(8000)).unwrap();
        assert!(frames[..4000].iter().any(|f| f.left != 0));
    }

    #[test]
    fn wav_file_has_rendered_length() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let n = export_wav(Song::new(), &config(1200), &path).unwrap();
        assert_eq!(n, 6400);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 44 + 6400 * 4);
    }
}
