use std::collections::HashMap;
use std::sync::{
    mpsc::{self, Sender},
    Mutex,
};
use std::thread;

use anyhow::{anyhow, Result};
use log::{error, info};
use rodio::{OutputStream, OutputStreamHandle, Sink};

use super::catalog::SoundKind;
use super::fireplace::Fireplace;
use super::forest::ForestNight;
use super::ocean::OceanWaves;
use super::rain::GentleRain;
use super::{AudioOutput, MixerCommand, DEFAULT_VOLUME};

/// Speaker output through rodio. One sink per track so each can be paused
/// and leveled on its own.
pub struct AudioEngineHandle {
    tx: Mutex<Option<Sender<MixerCommand>>>,
}

impl AudioEngineHandle {
    pub fn new() -> Self {
        Self {
            tx: Mutex::new(None),
        }
    }

    fn ensure_thread(&self) -> Result<Sender<MixerCommand>> {
        let mut guard = self
            .tx
            .lock()
            .map_err(|e| anyhow!("audio engine lock poisoned: {e}"))?;
        if let Some(tx) = guard.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<MixerCommand>();

        // Dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("audio-engine".to_string())
            .spawn(move || {
                let mut stream: Option<(OutputStream, OutputStreamHandle)> = None;
                let mut sinks: HashMap<SoundKind, Sink> = HashMap::new();
                let mut volumes: HashMap<SoundKind, f32> = HashMap::new();

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        MixerCommand::Play(kind) => {
                            if let Some(sink) = sinks.get(&kind) {
                                sink.play();
                                continue;
                            }
                            if stream.is_none() {
                                match OutputStream::try_default() {
                                    Ok(s) => stream = Some(s),
                                    Err(e) => {
                                        error!("Failed to create audio output stream: {}", e);
                                        continue;
                                    }
                                }
                            }
                            let Some((_, handle)) = stream.as_ref() else {
                                continue;
                            };
                            match Sink::try_new(handle) {
                                Ok(sink) => {
                                    sink.set_volume(
                                        volumes.get(&kind).copied().unwrap_or(DEFAULT_VOLUME),
                                    );
                                    append_loop(&sink, kind);
                                    sinks.insert(kind, sink);
                                }
                                Err(e) => error!("Failed to create audio sink: {}", e),
                            }
                        }
                        MixerCommand::Pause(kind) => {
                            if let Some(sink) = sinks.get(&kind) {
                                sink.pause();
                            }
                        }
                        MixerCommand::SetVolume(kind, volume) => {
                            let volume = volume.clamp(0.0, 1.0);
                            volumes.insert(kind, volume);
                            if let Some(sink) = sinks.get(&kind) {
                                sink.set_volume(volume);
                            }
                        }
                        MixerCommand::StopAll => {
                            for (_, sink) in sinks.drain() {
                                sink.stop();
                            }
                            volumes.clear();
                            stream = None;
                        }
                    }
                }
                info!("Audio engine thread exiting");
            })
            .map_err(|e| anyhow!("failed to spawn audio thread: {e}"))?;

        *guard = Some(tx.clone());
        Ok(tx)
    }
}

impl Default for AudioEngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioOutput for AudioEngineHandle {
    fn send(&self, command: MixerCommand) -> Result<()> {
        // Nothing to stop if the thread never started
        if matches!(command, MixerCommand::StopAll) {
            let guard = self
                .tx
                .lock()
                .map_err(|e| anyhow!("audio engine lock poisoned: {e}"))?;
            if let Some(tx) = guard.as_ref() {
                let _ = tx.send(command);
            }
            return Ok(());
        }

        let tx = self.ensure_thread()?;
        tx.send(command)
            .map_err(|e| anyhow!("audio engine stopped: {e}"))
    }
}

fn append_loop(sink: &Sink, kind: SoundKind) {
    match kind {
        SoundKind::Ocean => sink.append(OceanWaves::new()),
        SoundKind::Rain => sink.append(GentleRain::new()),
        SoundKind::Forest => sink.append(ForestNight::new()),
        SoundKind::Fireplace => sink.append(Fireplace::new()),
    }
}
