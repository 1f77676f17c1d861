use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use mt_engine::{PluginChain, Player};
use mt_ir::{Event, Song, TRACKS};

/// One pattern with a chord on every fourth line.
fn busy_song() -> Song {
    let mut song = Song::new();
    if let Some(pattern) = song.pattern_mut(0) {
        for line in (0..64).step_by(4) {
            for track in 0..TRACKS {
                *pattern.event_mut(line, track) = Event::note_on(3, ((line + 9 * track) % 53) as u8);
            }
        }
    }
    song
}

fn render_block(c: &mut Criterion) {
    let chain = PluginChain::from_registry("simplesynth", Some("onepole"), 48000).unwrap();
    let player = Player::new(busy_song(), chain);
    player.play();

    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];
    c.bench_function("render_all 256", |b| {
        b.iter(|| {
            player.render_all(&mut left, &mut right);
            black_box(left[0])
        })
    });
}

fn render_stopped(c: &mut Criterion) {
    let chain = PluginChain::from_registry("simplesynth", None, 48000).unwrap();
    let player = Player::new(Song::new(), chain);

    let mut left = vec![0.0f32; 256];
    let mut right = vec![0.0f32; 256];
    c.bench_function("render_some stopped", |b| {
        b.iter(|| black_box(player.render_some(&mut left, &mut right)))
    });
}

criterion_group!(benches, render_block, render_stopped);
criterion_main!(benches);
