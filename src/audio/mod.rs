pub mod brown_noise;
pub mod catalog;
#[cfg(feature = "sound")]
pub mod engine;
pub mod fireplace;
pub mod forest;
pub mod ocean;
pub mod rain;

use std::sync::Mutex;

use anyhow::{anyhow, Result};
use log::debug;
use serde::Serialize;

pub use catalog::{Sound, SoundKind, SOUNDS};

pub const DEFAULT_VOLUME: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MixerCommand {
    Play(SoundKind),
    Pause(SoundKind),
    SetVolume(SoundKind, f32),
    StopAll,
}

/// Where mixer commands end up.
pub trait AudioOutput: Send + Sync {
    fn send(&self, command: MixerCommand) -> Result<()>;
}

/// Output used when the crate is built without the `sound` feature.
pub struct SilentOutput;

impl AudioOutput for SilentOutput {
    fn send(&self, command: MixerCommand) -> Result<()> {
        debug!("audio output disabled, dropping {:?}", command);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackState {
    pub id: &'static str,
    pub name: &'static str,
    pub playing: bool,
    pub volume: f32,
}

impl TrackState {
    fn new(sound: &Sound) -> Self {
        Self {
            id: sound.id,
            name: sound.name,
            playing: false,
            volume: DEFAULT_VOLUME,
        }
    }
}

/// Independent looped ambient tracks with per-track play state and volume.
pub struct AudioMixer {
    tracks: Mutex<Vec<TrackState>>,
    output: Box<dyn AudioOutput>,
}

impl AudioMixer {
    /// Speakers when built with `sound`, otherwise silent.
    pub fn new() -> Self {
        #[cfg(feature = "sound")]
        let output: Box<dyn AudioOutput> = Box::new(engine::AudioEngineHandle::new());
        #[cfg(not(feature = "sound"))]
        let output: Box<dyn AudioOutput> = Box::new(SilentOutput);

        Self::with_output(output)
    }

    pub fn with_output(output: Box<dyn AudioOutput>) -> Self {
        Self {
            tracks: Mutex::new(SOUNDS.iter().map(TrackState::new).collect()),
            output,
        }
    }

    pub fn tracks(&self) -> Result<Vec<TrackState>> {
        Ok(self.lock()?.clone())
    }

    /// Play or pause a track. Returns whether it is now playing.
    pub fn toggle(&self, id: &str) -> Result<bool> {
        let kind = kind_of(id)?;
        let mut tracks = self.lock()?;
        let track = find_track(&mut tracks, id)?;

        let command = if track.playing {
            MixerCommand::Pause(kind)
        } else {
            MixerCommand::Play(kind)
        };
        self.output.send(command)?;
        track.playing = !track.playing;
        Ok(track.playing)
    }

    /// Set a track's volume, clamped to `[0, 1]`. Works while paused too.
    pub fn set_volume(&self, id: &str, volume: f32) -> Result<f32> {
        let kind = kind_of(id)?;
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let mut tracks = self.lock()?;
        let track = find_track(&mut tracks, id)?;

        self.output.send(MixerCommand::SetVolume(kind, volume))?;
        track.volume = volume;
        Ok(volume)
    }

    /// Stop everything and restore default levels, as when the sounds view closes.
    pub fn stop_all(&self) -> Result<()> {
        let mut tracks = self.lock()?;
        self.output.send(MixerCommand::StopAll)?;
        *tracks = SOUNDS.iter().map(TrackState::new).collect();
        Ok(())
    }

    pub fn any_playing(&self) -> Result<bool> {
        Ok(self.lock()?.iter().any(|t| t.playing))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<TrackState>>> {
        self.tracks
            .lock()
            .map_err(|e| anyhow!("mixer state poisoned: {e}"))
    }
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}

fn kind_of(id: &str) -> Result<SoundKind> {
    catalog::find(id)
        .map(|s| s.kind)
        .ok_or_else(|| anyhow!("unknown sound: {id}"))
}

fn find_track<'a>(tracks: &'a mut [TrackState], id: &str) -> Result<&'a mut TrackState> {
    tracks
        .iter_mut()
        .find(|t| t.id == id)
        .ok_or_else(|| anyhow!("unknown sound: {id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Recording {
        sent: Arc<Mutex<Vec<MixerCommand>>>,
    }

    impl AudioOutput for Recording {
        fn send(&self, command: MixerCommand) -> Result<()> {
            self.sent.lock().unwrap().push(command);
            Ok(())
        }
    }

    struct Broken;

    impl AudioOutput for Broken {
        fn send(&self, _command: MixerCommand) -> Result<()> {
            Err(anyhow!("no device"))
        }
    }

    fn mixer() -> (AudioMixer, Recording) {
        let output = Recording::default();
        (AudioMixer::with_output(Box::new(output.clone())), output)
    }

    #[test]
    fn catalog_has_four_idle_tracks() {
        let (mixer, _) = mixer();
        let tracks = mixer.tracks().unwrap();
        let ids: Vec<&str> = tracks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["ocean", "rain", "forest", "fireplace"]);
        assert!(tracks.iter().all(|t| !t.playing && t.volume == DEFAULT_VOLUME));
    }

    #[test]
    fn toggle_plays_then_pauses() {
        let (mixer, output) = mixer();
        assert!(mixer.toggle("rain").unwrap());
        assert!(mixer.toggle("ocean").unwrap());
        assert!(!mixer.toggle("rain").unwrap());

        assert_eq!(
            *output.sent.lock().unwrap(),
            vec![
                MixerCommand::Play(SoundKind::Rain),
                MixerCommand::Play(SoundKind::Ocean),
                MixerCommand::Pause(SoundKind::Rain),
            ]
        );
        assert!(mixer.any_playing().unwrap());
    }

    #[test]
    fn volume_is_clamped() {
        let (mixer, _) = mixer();
        assert_eq!(mixer.set_volume("forest", 1.7).unwrap(), 1.0);
        assert_eq!(mixer.set_volume("forest", -0.2).unwrap(), 0.0);
        assert_eq!(mixer.set_volume("forest", 0.25).unwrap(), 0.25);
        let forest = mixer
            .tracks()
            .unwrap()
            .into_iter()
            .find(|t| t.id == "forest")
            .unwrap();
        assert_eq!(forest.volume, 0.25);
    }

    #[test]
    fn unknown_track_is_an_error() {
        let (mixer, output) = mixer();
        assert!(mixer.toggle("thunder").is_err());
        assert!(mixer.set_volume("thunder", 0.3).is_err());
        assert!(output.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn stop_all_resets_tracks() {
        let (mixer, output) = mixer();
        mixer.toggle("fireplace").unwrap();
        mixer.set_volume("fireplace", 0.9).unwrap();

        mixer.stop_all().unwrap();

        assert!(!mixer.any_playing().unwrap());
        assert!(mixer
            .tracks()
            .unwrap()
            .iter()
            .all(|t| t.volume == DEFAULT_VOLUME));
        assert_eq!(
            output.sent.lock().unwrap().last(),
            Some(&MixerCommand::StopAll)
        );
    }

    #[test]
    fn failed_output_leaves_state_unchanged() {
        let mixer = AudioMixer::with_output(Box::new(Broken));
        assert!(mixer.toggle("ocean").is_err());
        assert!(!mixer.any_playing().unwrap());
    }

    #[test]
    fn synthesized_loops_are_bounded_and_audible() {
        let sources: Vec<(&str, Box<dyn Iterator<Item = f32>>)> = vec![
            ("ocean", Box::new(ocean::OceanWaves::with_seed(1))),
            ("rain", Box::new(rain::GentleRain::with_seed(2))),
            ("forest", Box::new(forest::ForestNight::with_seed(3))),
            ("fireplace", Box::new(fireplace::Fireplace::with_seed(4))),
        ];

        for (name, source) in sources {
            let samples: Vec<f32> = source.take(brown_noise::SAMPLE_RATE as usize * 3).collect();
            assert!(
                samples.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{name} out of range"
            );
            let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(peak > 0.001, "{name} is silent");
        }
    }
}
