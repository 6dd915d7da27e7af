//! Dedicated audio output thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms. It is created and kept
//! alive on a single OS thread; the rest of the crate only ever sees the
//! `Send + Sync` [`OutputStreamHandle`], which is all a sink needs.

use std::sync::mpsc;
use std::thread;

use rodio::{OutputStream, OutputStreamHandle};

use crate::error::VoiceError;

/// Owner of the output stream's thread.
///
/// Dropping it shuts the thread down, which closes the output stream. Sinks
/// created from [`stream_handle`](Self::stream_handle) go silent afterwards.
pub struct OutputThread {
    stream_handle: OutputStreamHandle,
    shutdown_tx: Option<mpsc::Sender<()>>,
    thread: Option<thread::JoinHandle<()>>,
}

impl OutputThread {
    /// Spawn the thread and open the default output device on it.
    ///
    /// Device errors are propagated back through a one-shot init channel.
    pub fn spawn() -> Result<Self, VoiceError> {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let (init_tx, init_rx) = mpsc::channel::<Result<OutputStreamHandle, VoiceError>>();

        let thread = thread::Builder::new()
            .name("storyloom-audio".into())
            .spawn(move || Self::run(&init_tx, &shutdown_rx))
            .map_err(|e| {
                VoiceError::OutputStreamError(format!("failed to spawn audio thread: {e}"))
            })?;

        let stream_handle = init_rx.recv().map_err(|_| VoiceError::AudioThreadDied)??;

        Ok(Self {
            stream_handle,
            shutdown_tx: Some(shutdown_tx),
            thread: Some(thread),
        })
    }

    pub const fn stream_handle(&self) -> &OutputStreamHandle {
        &self.stream_handle
    }

    fn run(
        init_tx: &mpsc::Sender<Result<OutputStreamHandle, VoiceError>>,
        shutdown_rx: &mpsc::Receiver<()>,
    ) {
        let (stream, handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(VoiceError::NoOutputDevice(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(handle)).is_err() {
            return;
        }
        tracing::info!("Audio output initialized on default device");

        // Any message, or the sender going away, ends the thread.
        let _ = shutdown_rx.recv();

        drop(stream);
        tracing::debug!("Audio output thread shutting down");
    }
}

impl Drop for OutputThread {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}
