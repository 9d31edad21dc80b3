//! Terminal Runtime - File-Backed User Endpoint
//!
//! Wraps an [`olink_core::Terminal`] with the transport and channel.
//! Outbound commands go straight into the station inbox with channel
//! noise applied; [`TerminalRuntime::poll_inbox`] drains this user's
//! own inbox into the terminal's notice queue. The interactive menu in
//! the `olink-terminal` binary is a thin shell over this type.

use std::time::Duration;

use tracing::{debug, warn};

use olink_core::{AwgnChannel, IQSample, Lease, LinkError, Terminal, FFT_SIZE};

use crate::config::SimConfig;
use crate::transport::{FileTransport, TransportError};
use crate::SimError;

/// Terminal process state for one user id.
#[derive(Debug)]
pub struct TerminalRuntime {
    terminal: Terminal,
    channel: AwgnChannel,
    transport: FileTransport,
    poll: Duration,
}

impl TerminalRuntime {
    /// Build a runtime from config, creating the buffer directory when
    /// missing.
    pub fn new(config: &SimConfig, user_id: u8) -> Result<Self, TransportError> {
        let channel = match config.noise_seed {
            // Offset the seed per user so terminals do not replay the
            // station's noise sequence.
            Some(seed) => AwgnChannel::with_seed(config.noise_variance, seed + 1 + user_id as u64),
            None => AwgnChannel::new(config.noise_variance),
        };
        Ok(Self {
            terminal: Terminal::new(user_id),
            channel,
            transport: FileTransport::new(&config.buffer_dir)?,
            poll: config.terminal_poll(),
        })
    }

    pub fn user_id(&self) -> u8 {
        self.terminal.user_id()
    }

    pub fn lease(&self) -> Option<Lease> {
        self.terminal.lease()
    }

    pub fn max_payload(&self) -> Option<u32> {
        self.terminal.max_payload()
    }

    pub fn pending_messages(&self) -> usize {
        self.terminal.pending_messages()
    }

    pub fn next_message(&mut self) -> Option<String> {
        self.terminal.next_message()
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll
    }

    /// One poll of this user's inbox. A complete frame is decoded and
    /// the inbox truncated; an incomplete one is left for the next
    /// poll.
    pub fn poll_inbox(&mut self) -> Result<bool, TransportError> {
        let inbox = self.transport.terminal_inbox(self.terminal.user_id());
        let samples = match self.transport.read(&inbox)? {
            Some(samples) => samples,
            None => return Ok(false),
        };
        if samples.len() != FFT_SIZE {
            debug!(len = samples.len(), "incomplete frame in terminal inbox");
            return Ok(false);
        }
        if let Err(e) = self.terminal.handle_waveform(&samples) {
            warn!(error = %e, "dropping frame");
        }
        self.transport.clear(&inbox)?;
        Ok(true)
    }

    /// Ask the station for a run of bins.
    pub fn request_bins(&mut self, bins: u8) -> Result<(), SimError> {
        let waveform = self.terminal.build_access_request(bins)?;
        self.transmit(&waveform)?;
        Ok(())
    }

    /// Send a payload to another user. Returns `Ok(false)` when this
    /// terminal holds no lease and nothing was sent.
    pub fn send_data(&mut self, dest: u8, payload: u32) -> Result<bool, SimError> {
        let waveform = match self.terminal.build_data(dest, payload) {
            Ok(waveform) => waveform,
            Err(LinkError::UnknownUser(_)) => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        self.transmit(&waveform)?;
        Ok(true)
    }

    /// Release this terminal's run at the station.
    pub fn send_deallocate(&mut self) -> Result<(), SimError> {
        let waveform = self.terminal.build_deallocate()?;
        self.transmit(&waveform)?;
        Ok(())
    }

    fn transmit(&mut self, waveform: &[IQSample]) -> Result<(), TransportError> {
        let noisy = self.channel.apply(waveform);
        self.transport
            .write(&self.transport.station_inbox(), &noisy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::station::StationRuntime;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    struct TestDir(PathBuf);

    impl TestDir {
        fn new(name: &str) -> Self {
            let dir =
                env::temp_dir().join(format!("olink_terminal_{}_{}", name, std::process::id()));
            fs::create_dir_all(&dir).unwrap();
            TestDir(dir)
        }

        fn config(&self) -> SimConfig {
            SimConfig {
                buffer_dir: self.0.clone(),
                noise_variance: 0.0,
                ..SimConfig::default()
            }
        }
    }

    impl Drop for TestDir {
        fn drop(&mut self) {
            fs::remove_dir_all(&self.0).ok();
        }
    }

    #[test]
    fn test_request_grant_cycle() {
        let tmp = TestDir::new("grant");
        let config = tmp.config();
        let mut station = StationRuntime::new(&config).unwrap();
        let mut user = TerminalRuntime::new(&config, 0).unwrap();

        user.request_bins(2).unwrap();
        assert!(station.tick().unwrap());
        assert!(user.poll_inbox().unwrap());

        assert_eq!(user.lease(), Some(Lease { start: 3, count: 2 }));
        assert!(user.next_message().unwrap().contains("granted 2"));
        // The inbox was truncated after the grant was read.
        assert_eq!(
            user.transport.read(&user.transport.terminal_inbox(0)).unwrap(),
            None
        );
    }

    #[test]
    fn test_send_without_lease_is_refused_locally() {
        let tmp = TestDir::new("no_lease");
        let config = tmp.config();
        let mut user = TerminalRuntime::new(&config, 1).unwrap();

        assert!(!user.send_data(0, 3).unwrap());
        // Nothing was written to the station inbox.
        assert_eq!(
            user.transport.read(&user.transport.station_inbox()).unwrap(),
            None
        );
    }

    #[test]
    fn test_poll_on_empty_inbox_is_idle() {
        let tmp = TestDir::new("idle");
        let mut user = TerminalRuntime::new(&tmp.config(), 2).unwrap();
        assert!(!user.poll_inbox().unwrap());
    }

    #[test]
    fn test_noise_is_applied_when_configured() {
        let tmp = TestDir::new("noise");
        let mut config = tmp.config();
        config.noise_variance = 0.01;
        config.noise_seed = Some(5);
        let mut user = TerminalRuntime::new(&config, 0).unwrap();

        user.request_bins(1).unwrap();
        let sent = user
            .transport
            .read(&user.transport.station_inbox())
            .unwrap()
            .unwrap();
        let clean = Terminal::new(0).build_access_request(1).unwrap();
        assert_eq!(sent.len(), clean.len());
        assert_ne!(sent, clean);
    }
}
