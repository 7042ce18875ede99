//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::sim::HitKind;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Perfect drop (pitch climbs with combo)
    Perfect { combo: u32 },
    /// Good drop
    Hit,
    /// Bad drop
    Bad,
    /// Block missed the tower
    GameOver,
}

impl SoundEffect {
    pub fn for_hit(kind: HitKind, combo: u32) -> Self {
        match kind {
            HitKind::Perfect => SoundEffect::Perfect { combo },
            HitKind::Good => SoundEffect::Hit,
            HitKind::Bad => SoundEffect::Bad,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        if let Some(ctx) = &self.ctx {
            let _ = ctx.resume();
        }
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match effect {
            SoundEffect::Perfect { combo } => self.play_perfect(ctx, vol, combo),
            SoundEffect::Hit => self.play_hit(ctx, vol),
            SoundEffect::Bad => self.play_bad(ctx, vol),
            SoundEffect::GameOver => self.play_game_over(ctx, vol),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Perfect - bright chime, a semitone higher per combo step (capped at an octave)
    fn play_perfect(&self, ctx: &AudioContext, vol: f32, combo: u32) {
        let t = ctx.current_time();
        let steps = combo.saturating_sub(1).min(12) as f32;
        let base = 660.0 * 2f32.powf(steps / 12.0);

        for (i, ratio) in [1.0_f32, 1.5].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, base * ratio, OscillatorType::Sine) else {
                continue;
            };
            let start = t + i as f64 * 0.05;
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().set_value_at_time(vol * 0.35, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.25)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.3).ok();
        }
    }

    /// Good - solid thump
    fn play_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.5, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.12)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 0.12)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.15).ok();
    }

    /// Bad - dull buzz
    fn play_bad(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 140.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(140.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.2)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.22).ok();
    }

    /// Game over - descending tones
    fn play_game_over(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        for (i, freq) in [392.0_f32, 311.0, 233.0].iter().enumerate() {
            let Some((osc, gain)) = self.create_osc(ctx, *freq, OscillatorType::Square) else {
                continue;
            };
            let start = t + i as f64 * 0.18;
            gain.gain().set_value_at_time(0.0, t).ok();
            gain.gain().set_value_at_time(vol * 0.15, start).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, start + 0.3)
                .ok();
            osc.start_with_when(start).ok();
            osc.stop_with_when(start + 0.32).ok();
        }
    }
}
