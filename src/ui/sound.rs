/// Sound effects: short synthesized chirps played through rodio.
///
/// Every effect is a list of `Tone` segments rendered once at start-up into
/// an in-memory WAV buffer. Playback is fire-and-forget on rodio's output
/// thread.
///
/// Without the `sound` feature `SoundEngine` is a stub whose methods do
/// nothing; the synthesizer still compiles so it stays tested.

use std::f32::consts::TAU;

const SAMPLE_RATE: u32 = 22050;

// ════════════════════════════════════════════════════════════
//  Synthesizer
// ════════════════════════════════════════════════════════════

/// One segment of an effect: a pitch sweep with a decaying envelope.
#[derive(Clone, Copy, Debug)]
struct Tone {
    from_hz: f32,
    to_hz: f32,
    secs: f32,
    volume: f32,
    /// 0.0 = pure tone, 1.0 = pure noise.
    noise: f32,
    /// Envelope exponent; below 1 decays fast, above 1 holds then drops.
    decay: f32,
}

impl Tone {
    const fn note(hz: f32, secs: f32, volume: f32) -> Tone {
        Tone { from_hz: hz, to_hz: hz, secs, volume, noise: 0.0, decay: 1.0 }
    }

    const fn sweep(from_hz: f32, to_hz: f32, secs: f32, volume: f32) -> Tone {
        Tone { from_hz, to_hz, secs, volume, noise: 0.0, decay: 0.7 }
    }
}

// Spawn: faint high tick, frequent so it stays quiet.
const SPAWN: &[Tone] = &[Tone::sweep(1400.0, 1800.0, 0.03, 0.08)];

// Hit: quick rising third.
const HIT: &[Tone] = &[
    Tone::note(880.0, 0.04, 0.22),
    Tone::note(1109.0, 0.07, 0.22),
];

// Miss: noisy thud sliding down.
const MISS: &[Tone] = &[Tone {
    from_hz: 320.0,
    to_hz: 90.0,
    secs: 0.18,
    volume: 0.3,
    noise: 0.45,
    decay: 0.8,
}];

// Level up: C5 E5 G5 C6.
const LEVEL_UP: &[Tone] = &[
    Tone::note(523.0, 0.08, 0.25),
    Tone::note(659.0, 0.08, 0.25),
    Tone::note(784.0, 0.08, 0.25),
    Tone { decay: 1.6, ..Tone::note(1047.0, 0.22, 0.25) },
];

// Game over: A4 F#4 Eb4 C4, last one long.
const GAME_OVER: &[Tone] = &[
    Tone::note(440.0, 0.14, 0.3),
    Tone::note(370.0, 0.14, 0.3),
    Tone::note(311.0, 0.14, 0.3),
    Tone { decay: 0.5, ..Tone::note(261.0, 0.45, 0.3) },
];

// Menu cursor.
const BLIP: &[Tone] = &[Tone::note(660.0, 0.03, 0.18)];

fn render(tones: &[Tone]) -> Vec<f32> {
    let mut out = Vec::new();
    let mut noise_state: u32 = 0x2545_f491;
    for tone in tones {
        let n = (SAMPLE_RATE as f32 * tone.secs) as usize;
        let mut phase = 0.0_f32;
        for i in 0..n {
            let t = i as f32 / n as f32;
            let hz = tone.from_hz + (tone.to_hz - tone.from_hz) * t;
            phase = (phase + hz / SAMPLE_RATE as f32) % 1.0;
            // Sine plus a little third harmonic for a chiptune edge.
            let wave = (phase * TAU).sin() * 0.8 + (phase * 3.0 * TAU).sin() * 0.2;

            noise_state ^= noise_state << 13;
            noise_state ^= noise_state >> 17;
            noise_state ^= noise_state << 5;
            let noise = noise_state as f32 / u32::MAX as f32 * 2.0 - 1.0;

            let env = (1.0 - t).powf(tone.decay);
            out.push((wave * (1.0 - tone.noise) + noise * tone.noise) * env * tone.volume);
        }
    }
    out
}

/// 16-bit mono PCM WAV.
fn encode_wav(samples: &[f32]) -> Vec<u8> {
    const CHANNELS: u16 = 1;
    const BITS: u16 = 16;
    let block_align = CHANNELS * BITS / 8;
    let byte_rate = SAMPLE_RATE * block_align as u32;
    let data_len = samples.len() as u32 * block_align as u32;

    let mut buf = Vec::with_capacity(44 + data_len as usize);
    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&(36 + data_len).to_le_bytes());
    buf.extend_from_slice(b"WAVEfmt ");
    buf.extend_from_slice(&16u32.to_le_bytes());
    buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
    buf.extend_from_slice(&CHANNELS.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&BITS.to_le_bytes());
    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_len.to_le_bytes());
    for &s in samples {
        buf.extend_from_slice(&((s.clamp(-1.0, 1.0) * 32767.0) as i16).to_le_bytes());
    }
    buf
}

// ════════════════════════════════════════════════════════════
//  rodio playback
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{encode_wav, render, Tone, BLIP, GAME_OVER, HIT, LEVEL_UP, MISS, SPAWN};

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        spawn: Arc<[u8]>,
        hit: Arc<[u8]>,
        miss: Arc<[u8]>,
        level_up: Arc<[u8]>,
        game_over: Arc<[u8]>,
        blip: Arc<[u8]>,
    }

    fn bake(tones: &[Tone]) -> Arc<[u8]> {
        encode_wav(&render(tones)).into()
    }

    impl SoundEngine {
        /// `None` when no audio device could be opened.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio disabled: {e}");
                    return None;
                }
            };
            Some(SoundEngine {
                _stream: stream,
                handle,
                spawn: bake(SPAWN),
                hit: bake(HIT),
                miss: bake(MISS),
                level_up: bake(LEVEL_UP),
                game_over: bake(GAME_OVER),
                blip: bake(BLIP),
            })
        }

        fn play(&self, wav: &Arc<[u8]>) {
            let Ok(sink) = Sink::try_new(&self.handle) else { return };
            match rodio::Decoder::new(Cursor::new(Arc::clone(wav))) {
                Ok(src) => {
                    sink.append(src);
                    sink.detach();
                }
                Err(e) => log::debug!("sound decode failed: {e}"),
            }
        }

        pub fn play_spawn(&self) { self.play(&self.spawn); }
        pub fn play_hit(&self) { self.play(&self.hit); }
        pub fn play_miss(&self) { self.play(&self.miss); }
        pub fn play_level_up(&self) { self.play(&self.level_up); }
        pub fn play_game_over(&self) { self.play(&self.game_over); }
        pub fn play_blip(&self) { self.play(&self.blip); }
    }
}

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
#[allow(dead_code)]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_spawn(&self) {}
    pub fn play_hit(&self) {}
    pub fn play_miss(&self) {}
    pub fn play_level_up(&self) {}
    pub fn play_game_over(&self) {}
    pub fn play_blip(&self) {}
}
