//! Session options
//!
//! Runtime-tunable settings of an open session, readable and writable
//! through the command client.

use std::time::Duration;

use crate::error::{TransportError, TransportResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FtpOption {
    /// Timeout of network operations on the control connection, in seconds
    TimeoutSec,
    /// Seek local files to the resume offset on `get`/`put`
    AutoSeek,
    /// Trust the address announced in the PASV reply
    UsePasvAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    Seconds(u64),
    Flag(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    timeout: Duration,
    autoseek: bool,
    use_pasv_address: bool,
}

impl SessionOptions {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            autoseek: true,
            use_pasv_address: true,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn autoseek(&self) -> bool {
        self.autoseek
    }

    pub fn use_pasv_address(&self) -> bool {
        self.use_pasv_address
    }

    pub fn get(&self, option: FtpOption) -> OptionValue {
        match option {
            FtpOption::TimeoutSec => OptionValue::Seconds(self.timeout.as_secs()),
            FtpOption::AutoSeek => OptionValue::Flag(self.autoseek),
            FtpOption::UsePasvAddress => OptionValue::Flag(self.use_pasv_address),
        }
    }

    /// Rejects values of the wrong kind and a zero timeout.
    pub fn set(&mut self, option: FtpOption, value: OptionValue) -> TransportResult<()> {
        match (option, value) {
            (FtpOption::TimeoutSec, OptionValue::Seconds(secs)) if secs > 0 => {
                self.timeout = Duration::from_secs(secs);
            }
            (FtpOption::AutoSeek, OptionValue::Flag(flag)) => self.autoseek = flag,
            (FtpOption::UsePasvAddress, OptionValue::Flag(flag)) => self.use_pasv_address = flag,
            _ => return Err(TransportError::InvalidOptionValue(option)),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_timeout() {
        let options = SessionOptions::new(Duration::from_secs(90));
        assert_eq!(options.get(FtpOption::TimeoutSec), OptionValue::Seconds(90));
        assert_eq!(options.get(FtpOption::AutoSeek), OptionValue::Flag(true));
        assert_eq!(options.get(FtpOption::UsePasvAddress), OptionValue::Flag(true));
    }

    #[test]
    fn test_set_and_reject() {
        let mut options = SessionOptions::new(Duration::from_secs(90));
        options
            .set(FtpOption::TimeoutSec, OptionValue::Seconds(10))
            .unwrap();
        assert_eq!(options.timeout(), Duration::from_secs(10));

        assert!(matches!(
            options.set(FtpOption::TimeoutSec, OptionValue::Flag(true)),
            Err(TransportError::InvalidOptionValue(FtpOption::TimeoutSec))
        ));
        assert!(options.set(FtpOption::TimeoutSec, OptionValue::Seconds(0)).is_err());
        assert!(options.set(FtpOption::AutoSeek, OptionValue::Seconds(1)).is_err());
    }
}
