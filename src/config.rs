//! Daemon configuration
//!
//! An optional TOML file gives the base values; command line flags are
//! applied on top by the binary. `validate` must pass before the profile is
//! built.
//!
//! ```toml
//! device = "/dev/ttyUSB0"
//! port = 6789
//!
//! [keyer]
//! sidetone = 700
//! contest_spacing = true
//! ptt_lead = 40
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::{HangTime, KeyerProfile, KeyingMode, UltimaticPriority};
use crate::{
    DEFAULT_LISTEN_ADDR, DEFAULT_PORT, DEFAULT_SPEED, DEFAULT_TONE, SPEED_MAX, SPEED_MIN, TONE_MAX,
    WINKEYER_BAUD,
};

/// Longest PTT lead/tail, first extension or key compensation, in ms
const TIMING_MAX_MS: u8 = 250;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Serial device of the keyer
    pub device: Option<String>,
    pub port: u16,
    pub listen_addr: String,
    pub accept_remote_hosts: bool,
    pub debug: bool,
    /// Debug events as JSON lines on stdout
    pub json: bool,
    pub baud: u32,
    pub keyer: KeyerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            port: DEFAULT_PORT,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            accept_remote_hosts: false,
            debug: false,
            json: false,
            baud: WINKEYER_BAUD,
            keyer: KeyerConfig::default(),
        }
    }
}

/// Hardware options, the `[keyer]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyerConfig {
    /// Sidetone frequency in Hz; implies sidetone on
    pub sidetone: Option<u16>,
    pub sidetone_on: bool,
    pub swap: bool,
    /// Key on KEY2 only
    pub key2: bool,
    /// Key on both KEY1 and KEY2
    pub key12: bool,
    pub contest_spacing: bool,
    pub autospace: bool,
    pub first_extension: Option<u8>,
    pub key_compensation: Option<u8>,
    pub ptt_enable: bool,
    pub ptt_lead: u8,
    pub ptt_tail: u8,
    /// PTT hang time in dits (1, 2, 4 or 8)
    pub hang: u8,
    pub keying_mode: KeyingMode,
    pub ultimatic_priority: UltimaticPriority,
    pub corrected_key_bits: bool,
    pub speed: u8,
}

impl Default for KeyerConfig {
    fn default() -> Self {
        Self {
            sidetone: None,
            sidetone_on: false,
            swap: false,
            key2: false,
            key12: false,
            contest_spacing: false,
            autospace: false,
            first_extension: None,
            key_compensation: None,
            ptt_enable: false,
            ptt_lead: 0,
            ptt_tail: 0,
            hang: 1,
            keying_mode: KeyingMode::default(),
            ultimatic_priority: UltimaticPriority::default(),
            corrected_key_bits: false,
            speed: DEFAULT_SPEED,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// File contents if a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.device {
            Some(device) if !device.trim().is_empty() => {}
            _ => return Err(ConfigError::MissingDevice),
        }
        if self.baud == 0 {
            return Err(ConfigError::invalid("baud", "must be non-zero"));
        }
        self.keyer.validate()
    }

    /// Device path; only meaningful after `validate`
    pub fn device(&self) -> Result<&str, ConfigError> {
        self.device.as_deref().ok_or(ConfigError::MissingDevice)
    }

    /// `listen_addr:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }

    pub fn to_profile(&self) -> Result<KeyerProfile, ConfigError> {
        self.keyer.to_profile()
    }
}

impl KeyerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(SPEED_MIN..=SPEED_MAX).contains(&self.speed) {
            return Err(ConfigError::invalid(
                "speed",
                format!("{} is outside {}..={} WPM", self.speed, SPEED_MIN, SPEED_MAX),
            ));
        }
        if let Some(hz) = self.sidetone {
            if hz == 0 || hz > TONE_MAX {
                return Err(ConfigError::invalid(
                    "sidetone",
                    format!("{} Hz is outside 1..={}", hz, TONE_MAX),
                ));
            }
        }
        if self.key2 && self.key12 {
            return Err(ConfigError::invalid("key2", "cannot be combined with key12"));
        }
        if HangTime::from_dits(self.hang).is_none() {
            return Err(ConfigError::invalid(
                "hang",
                format!("{} dits; use 1, 2, 4 or 8", self.hang),
            ));
        }
        for (field, ms) in [("ptt_lead", self.ptt_lead), ("ptt_tail", self.ptt_tail)] {
            if ms > TIMING_MAX_MS || ms % 10 != 0 {
                return Err(ConfigError::invalid(
                    field,
                    format!("{} ms; use a multiple of 10 up to {}", ms, TIMING_MAX_MS),
                ));
            }
        }
        for (field, ms) in [
            ("first_extension", self.first_extension),
            ("key_compensation", self.key_compensation),
        ] {
            if let Some(ms) = ms.filter(|ms| *ms > TIMING_MAX_MS) {
                return Err(ConfigError::invalid(
                    field,
                    format!("{} ms is above {}", ms, TIMING_MAX_MS),
                ));
            }
        }
        Ok(())
    }

    pub fn to_profile(&self) -> Result<KeyerProfile, ConfigError> {
        self.validate()?;
        let hang_time = HangTime::from_dits(self.hang)
            .ok_or_else(|| ConfigError::invalid("hang", "use 1, 2, 4 or 8"))?;

        let sidetone = match (self.sidetone, self.sidetone_on) {
            (Some(hz), _) => Some(hz),
            (None, true) => Some(DEFAULT_TONE),
            (None, false) => None,
        };

        Ok(KeyerProfile {
            sidetone,
            swap_paddles: self.swap,
            keying_mode: self.keying_mode,
            contest_spacing: self.contest_spacing,
            autospace: self.autospace,
            key1: !self.key2,
            key2: self.key2 || self.key12,
            ptt_enable: self.ptt_enable,
            hang_time,
            ultimatic_priority: self.ultimatic_priority,
            corrected_key_bits: self.corrected_key_bits,
            first_extension_ms: self.first_extension,
            key_compensation_ms: self.key_compensation,
            ptt_lead_ms: self.ptt_lead,
            ptt_tail_ms: self.ptt_tail,
            speed: self.speed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_device() -> Config {
        Config {
            device: Some("/dev/ttyUSB0".into()),
            ..Config::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.bind_addr(), "127.0.0.1:6789");
        assert_eq!(config.baud, 1200);
        assert!(matches!(config.validate(), Err(ConfigError::MissingDevice)));
        assert!(with_device().validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = Config::from_toml(
            r#"
            device = "/dev/ttyACM0"
            port = 7000
            accept_remote_hosts = true

            [keyer]
            sidetone = 600
            keying_mode = "ultimatic"
            ptt_lead = 40
            hang = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.device.as_deref(), Some("/dev/ttyACM0"));
        assert_eq!(config.port, 7000);
        assert!(config.accept_remote_hosts);
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert_eq!(config.keyer.keying_mode, KeyingMode::Ultimatic);

        let profile = config.to_profile().unwrap();
        assert_eq!(profile.sidetone, Some(600));
        assert_eq!(profile.ptt_lead_ms, 40);
        assert_eq!(profile.hang_time, HangTime::Four);
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(matches!(
            Config::from_toml("devcie = \"/dev/ttyS0\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("wkd-config-{}.toml", std::process::id()));
        std::fs::write(&path, "device = \"/dev/ttyUSB1\"\n[keyer]\nspeed = 30\n").unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.device().unwrap(), "/dev/ttyUSB1");
        assert_eq!(config.keyer.speed, 30);
    }

    #[test]
    fn test_missing_file() {
        let path = Path::new("/nonexistent/winkeyerdaemon.toml");
        assert!(matches!(Config::load(path), Err(ConfigError::Read { .. })));
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn test_sidetone_on_uses_default_tone() {
        let keyer = KeyerConfig {
            sidetone_on: true,
            ..KeyerConfig::default()
        };
        assert_eq!(keyer.to_profile().unwrap().sidetone, Some(DEFAULT_TONE));
        assert_eq!(KeyerConfig::default().to_profile().unwrap().sidetone, None);
    }

    #[test]
    fn test_key_selection() {
        let key2 = KeyerConfig {
            key2: true,
            ..KeyerConfig::default()
        }
        .to_profile()
        .unwrap();
        assert!(!key2.key1 && key2.key2);

        let both = KeyerConfig {
            key12: true,
            ..KeyerConfig::default()
        }
        .to_profile()
        .unwrap();
        assert!(both.key1 && both.key2);

        let conflict = KeyerConfig {
            key2: true,
            key12: true,
            ..KeyerConfig::default()
        };
        assert!(conflict.validate().is_err());
    }

    #[test]
    fn test_range_checks() {
        let cases = [
            KeyerConfig { speed: 4, ..KeyerConfig::default() },
            KeyerConfig { speed: 100, ..KeyerConfig::default() },
            KeyerConfig { sidetone: Some(0), ..KeyerConfig::default() },
            KeyerConfig { sidetone: Some(4001), ..KeyerConfig::default() },
            KeyerConfig { hang: 3, ..KeyerConfig::default() },
            KeyerConfig { ptt_lead: 15, ..KeyerConfig::default() },
            KeyerConfig { ptt_tail: 255, ..KeyerConfig::default() },
            KeyerConfig { first_extension: Some(251), ..KeyerConfig::default() },
        ];
        for keyer in cases {
            assert!(keyer.validate().is_err(), "{:?} should be rejected", keyer);
        }
    }
}
