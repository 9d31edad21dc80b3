//! Station Runtime - Polling Loop Around the Base Station
//!
//! Wraps an [`olink_core::BaseStation`] with the file transport and the
//! noise channel. Each tick reads the station inbox, processes one
//! complete frame, writes the noisy reply into the destination
//! terminal's inbox and truncates the station inbox. Incomplete frames
//! stay in place and are retried on the next poll; frames the protocol
//! rejects are logged and discarded.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use olink_core::{AwgnChannel, BaseStation, FFT_SIZE};

use crate::config::SimConfig;
use crate::transport::{FileTransport, TransportError};

/// Station process state: protocol core, channel and mailbox paths.
#[derive(Debug)]
pub struct StationRuntime {
    station: BaseStation,
    channel: AwgnChannel,
    transport: FileTransport,
    poll: Duration,
}

impl StationRuntime {
    /// Build a runtime from config, creating the buffer directory when
    /// missing.
    pub fn new(config: &SimConfig) -> Result<Self, TransportError> {
        let channel = match config.noise_seed {
            Some(seed) => AwgnChannel::with_seed(config.noise_variance, seed),
            None => AwgnChannel::new(config.noise_variance),
        };
        Ok(Self {
            station: BaseStation::new(),
            channel,
            transport: FileTransport::new(&config.buffer_dir)?,
            poll: config.station_poll(),
        })
    }

    /// Protocol state, for inspection and tests.
    pub fn station(&self) -> &BaseStation {
        &self.station
    }

    pub fn transport(&self) -> &FileTransport {
        &self.transport
    }

    /// One poll of the station inbox. Returns `Ok(true)` when a
    /// complete frame was consumed, `Ok(false)` when there was nothing
    /// to do yet.
    pub fn tick(&mut self) -> Result<bool, TransportError> {
        let inbox = self.transport.station_inbox();
        let samples = match self.transport.read(&inbox)? {
            Some(samples) => samples,
            None => return Ok(false),
        };
        if samples.len() != FFT_SIZE {
            // Likely a frame caught mid-write; leave it for the next
            // poll.
            debug!(len = samples.len(), "incomplete frame in station inbox");
            return Ok(false);
        }

        match self.station.process_waveform(&samples) {
            Ok(Some(reply)) => {
                let noisy = self.channel.apply(&reply.waveform);
                self.transport
                    .write(&self.transport.terminal_inbox(reply.dest), &noisy)?;
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "dropping frame"),
        }
        self.transport.clear(&inbox)?;
        Ok(true)
    }

    /// Poll forever. Transport failures are logged and polling
    /// continues; nothing here is fatal.
    pub fn run(&mut self) {
        info!(
            dir = %self.transport.dir().display(),
            poll_ms = self.poll.as_millis() as u64,
            "station up"
        );
        loop {
            if let Err(e) = self.tick() {
                warn!(error = %e, "station tick failed");
            }
            thread::sleep(self.poll);
        }
    }
}
