//! Audio system using Web Audio API
//!
//! Procedurally generated sound effects - no external files needed!
//! Outside the browser, or when the browser refuses an `AudioContext`,
//! every cue is a silent no-op.

#[cfg(target_arch = "wasm32")]
use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::settings::Settings;
use crate::sim::{GameEvent, Side};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ball hits a paddle
    PaddleHit,
    /// Ball bounces off the top or bottom wall
    WallBounce,
    /// Ball went past the AI
    PlayerScored,
    /// Ball went past the player
    AiScored,
    /// Player took the match
    MatchWon,
    /// AI took the match
    MatchLost,
    /// Replay menu opened
    MenuOpen,
    /// New match served
    MatchStart,
}

impl SoundEffect {
    /// Cue for a simulation event
    pub fn for_event(event: &GameEvent) -> SoundEffect {
        match event {
            GameEvent::PaddleHit { .. } => SoundEffect::PaddleHit,
            GameEvent::WallBounce => SoundEffect::WallBounce,
            GameEvent::PointScored { scorer: Side::Player } => SoundEffect::PlayerScored,
            GameEvent::PointScored { scorer: Side::Ai } => SoundEffect::AiScored,
            GameEvent::MatchOver { winner: Side::Player } => SoundEffect::MatchWon,
            GameEvent::MatchOver { winner: Side::Ai } => SoundEffect::MatchLost,
            GameEvent::ReplayMenuOpened => SoundEffect::MenuOpen,
            GameEvent::MatchStarted { .. } => SoundEffect::MatchStart,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    #[cfg(target_arch = "wasm32")]
    ctx: Option<AudioContext>,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    #[cfg(target_arch = "wasm32")]
    pub fn new() -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn new() -> Self {
        log::debug!("No audio backend on this platform - cues are silent");
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Resume audio context (required after user gesture)
    pub fn resume(&self) {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(ctx) = &self.ctx {
                let _ = ctx.resume();
            }
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Pick up volume and mute preferences
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_master_volume(settings.master_volume);
        self.set_sfx_volume(settings.sfx_volume);
        self.set_muted(settings.muted);
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Play the cue for each event
    pub fn play_events(&self, events: &[GameEvent]) {
        for effect in events.iter().map(SoundEffect::for_event) {
            self.play(effect);
        }
    }

    /// Play a sound effect
    pub fn play(&self, effect: SoundEffect) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }

        #[cfg(target_arch = "wasm32")]
        {
            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            match effect {
                SoundEffect::PaddleHit => self.play_paddle_hit(ctx, vol),
                SoundEffect::WallBounce => self.play_wall_bounce(ctx, vol),
                SoundEffect::PlayerScored => self.play_player_scored(ctx, vol),
                SoundEffect::AiScored => self.play_ai_scored(ctx, vol),
                SoundEffect::MatchWon => self.play_match_won(ctx, vol),
                SoundEffect::MatchLost => self.play_match_lost(ctx, vol),
                SoundEffect::MenuOpen => self.play_menu_open(ctx, vol),
                SoundEffect::MatchStart => self.play_match_start(ctx, vol),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        log::trace!("cue {:?} at volume {:.2}", effect, vol);
    }
}

// === Sound generators ===

#[cfg(target_arch = "wasm32")]
impl AudioManager {
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

    /// Short enveloped tone
    fn blip(&self, ctx: &AudioContext, freq: f32, osc_type: OscillatorType, vol: f32, at: f64, len: f64) {
        let Some((osc, gain)) = self.create_osc(ctx, freq, osc_type) else {
            return;
        };
        gain.gain().set_value_at_time(vol, at).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, at + len)
            .ok();
        osc.start_with_when(at).ok();
        osc.stop_with_when(at + len + 0.05).ok();
    }

    /// Paddle hit - solid thump
    fn play_paddle_hit(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Square) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.25, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.08)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(110.0, t + 0.08)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.1).ok();
    }

    /// Wall bounce - higher ping
    fn play_wall_bounce(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        self.blip(ctx, 440.0, OscillatorType::Sine, vol * 0.3, t, 0.08);
    }

    /// Player scored - rising pair
    fn play_player_scored(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        self.blip(ctx, 523.0, OscillatorType::Triangle, vol * 0.3, t, 0.12);
        self.blip(ctx, 784.0, OscillatorType::Triangle, vol * 0.3, t + 0.1, 0.18);
    }

    /// AI scored - falling buzz
    fn play_ai_scored(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 300.0, OscillatorType::Sawtooth) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.2, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.3)
            .ok();
        osc.frequency().set_value_at_time(300.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(90.0, t + 0.3)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.35).ok();
    }

    /// Match won - celebratory
    fn play_match_won(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [500.0, 600.0, 700.0, 800.0, 1000.0].iter().enumerate() {
            let t = ctx.current_time() + 0.3 + i as f64 * 0.08;
            self.blip(ctx, *freq, OscillatorType::Triangle, vol * 0.25, t, 0.25);
        }
    }

    /// Match lost - sad descending
    fn play_match_lost(&self, ctx: &AudioContext, vol: f32) {
        for (i, freq) in [400.0, 350.0, 300.0, 200.0].iter().enumerate() {
            let t = ctx.current_time() + 0.3 + i as f64 * 0.2;
            self.blip(ctx, *freq, OscillatorType::Sine, vol * 0.3, t, 0.3);
        }
    }

    /// Menu open - soft tap
    fn play_menu_open(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();
        self.blip(ctx, 300.0, OscillatorType::Triangle, vol * 0.25, t, 0.05);
    }

    /// Match start - whoosh up
    fn play_match_start(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 200.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.2)
            .ok();
        osc.frequency().set_value_at_time(200.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(600.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.25).ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::MatchLength;

    #[test]
    fn test_scoring_cues_are_distinct() {
        let player = SoundEffect::for_event(&GameEvent::PointScored { scorer: Side::Player });
        let ai = SoundEffect::for_event(&GameEvent::PointScored { scorer: Side::Ai });
        assert_eq!(player, SoundEffect::PlayerScored);
        assert_eq!(ai, SoundEffect::AiScored);
        assert_ne!(player, ai);
    }

    #[test]
    fn test_event_cues() {
        assert_eq!(
            SoundEffect::for_event(&GameEvent::PaddleHit { side: Side::Ai }),
            SoundEffect::PaddleHit
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::WallBounce),
            SoundEffect::WallBounce
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::MatchOver { winner: Side::Ai }),
            SoundEffect::MatchLost
        );
        assert_eq!(
            SoundEffect::for_event(&GameEvent::MatchStarted {
                length: MatchLength::BestOf7
            }),
            SoundEffect::MatchStart
        );
    }

    #[test]
    fn test_volume_and_mute() {
        let mut audio = AudioManager::new();
        audio.set_master_volume(2.0);
        audio.set_sfx_volume(0.5);
        assert_eq!(audio.effective_volume(), 0.5);
        audio.set_muted(true);
        assert_eq!(audio.effective_volume(), 0.0);
        // Silent manager accepts cues without a backend
        audio.play(SoundEffect::PaddleHit);
        audio.play_events(&[GameEvent::WallBounce]);
    }

    #[test]
    fn test_apply_settings() {
        let mut audio = AudioManager::new();
        let settings = Settings {
            master_volume: 0.5,
            sfx_volume: 0.5,
            muted: false,
            ..Settings::default()
        };
        audio.apply_settings(&settings);
        assert_eq!(audio.effective_volume(), 0.25);
    }
}
