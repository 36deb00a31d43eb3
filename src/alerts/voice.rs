use std::io::Cursor;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;

use rodio::{Decoder, OutputStream, Sink};

/// Plays synthesized speech clips on a dedicated thread holding the
/// non-Send audio objects.
///
/// At most one clip is ever audible: `is_playing` stays true from the
/// moment a clip is accepted until playback finishes or fails. A clip
/// submitted while one is playing is rejected, never queued.
pub struct VoiceChannel {
    tx: Arc<Mutex<Option<Sender<Vec<u8>>>>>,
    playing: Arc<AtomicBool>,
}

impl VoiceChannel {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            playing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn play(&self, clip: Vec<u8>) -> Result<(), String> {
        if self.playing.swap(true, Ordering::SeqCst) {
            return Err("speech already playing".into());
        }

        let tx = match self.ensure_thread() {
            Ok(tx) => tx,
            Err(err) => {
                self.playing.store(false, Ordering::SeqCst);
                return Err(err);
            }
        };

        if let Err(err) = tx.send(clip) {
            self.playing.store(false, Ordering::SeqCst);
            return Err(err.to_string());
        }
        Ok(())
    }

    fn ensure_thread(&self) -> Result<Sender<Vec<u8>>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<Vec<u8>>();
        let playing = Arc::clone(&self.playing);

        thread::Builder::new()
            .name("voice-playback".to_string())
            .spawn(move || {
                while let Ok(clip) = rx.recv() {
                    let result = (|| -> Result<(), String> {
                        let (_stream, handle) = OutputStream::try_default()
                            .map_err(|e| format!("failed to open audio output: {e}"))?;
                        let sink = Sink::try_new(&handle)
                            .map_err(|e| format!("failed to create audio sink: {e}"))?;
                        let decoder = Decoder::new(Cursor::new(clip))
                            .map_err(|e| format!("failed to decode speech audio: {e}"))?;
                        sink.append(decoder);
                        sink.sleep_until_end();
                        Ok(())
                    })();

                    if let Err(err) = result {
                        log::warn!("speech playback failed: {err}");
                    }
                    // Completion and failure both release the channel, so a
                    // broken playback never blocks future alerts.
                    playing.store(false, Ordering::SeqCst);
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }
}

impl Default for VoiceChannel {
    fn default() -> Self {
        Self::new()
    }
}
