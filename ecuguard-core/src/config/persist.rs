//! Stored configuration format
//!
//! Layout: postcard encoding of `(magic, version, MonitorConfig)` followed
//! by a little-endian CRC-32 of those bytes. A fixed-size slot prefixes that
//! with its length byte.

use super::types::MonitorConfig;

/// Magic number to identify a stored monitor configuration ("ECFG")
pub const CONFIG_MAGIC: u32 = 0x4543_4647;

/// Current stored configuration version
pub const CONFIG_VERSION: u8 = 1;

/// Buffer size that always fits an encoded configuration
pub const MAX_CONFIG_SIZE: usize = 64;

/// Size of a fixed slot holding one encoded configuration
pub const CONFIG_SLOT_SIZE: usize = MAX_CONFIG_SIZE + 1;

const CRC_LEN: usize = 4;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// CRC check failed
    CrcMismatch,
    /// Invalid magic or version
    InvalidFormat,
}

impl MonitorConfig {
    /// Encode into `buffer`, returning the number of bytes used
    pub fn to_bytes(&self, buffer: &mut [u8]) -> Result<usize, ConfigError> {
        if buffer.len() < CRC_LEN {
            return Err(ConfigError::Serialize);
        }
        let body_capacity = buffer.len() - CRC_LEN;

        let body_len = postcard::to_slice(
            &(CONFIG_MAGIC, CONFIG_VERSION, *self),
            &mut buffer[..body_capacity],
        )
        .map_err(|_| ConfigError::Serialize)?
        .len();

        let crc = crc32fast::hash(&buffer[..body_len]);
        buffer[body_len..body_len + CRC_LEN].copy_from_slice(&crc.to_le_bytes());

        Ok(body_len + CRC_LEN)
    }

    /// Decode a configuration written by [`MonitorConfig::to_bytes`]
    ///
    /// The result is not sanitized; the health monitor does that on
    /// construction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() < CRC_LEN {
            return Err(ConfigError::Deserialize);
        }
        let (body, crc_bytes) = bytes.split_at(bytes.len() - CRC_LEN);

        let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
        if crc32fast::hash(body) != stored_crc {
            return Err(ConfigError::CrcMismatch);
        }

        let (magic, version, config): (u32, u8, MonitorConfig) =
            postcard::from_bytes(body).map_err(|_| ConfigError::Deserialize)?;

        if magic != CONFIG_MAGIC || version != CONFIG_VERSION {
            return Err(ConfigError::InvalidFormat);
        }

        Ok(config)
    }

    /// Write into a fixed slot, length byte first
    pub fn store(&self, slot: &mut [u8; CONFIG_SLOT_SIZE]) -> Result<(), ConfigError> {
        let len = self.to_bytes(&mut slot[1..])?;
        slot[0] = len as u8;
        Ok(())
    }

    /// Read a slot written by [`MonitorConfig::store`]
    ///
    /// Uninitialised or stale slot contents fail with an error.
    pub fn load(slot: &[u8; CONFIG_SLOT_SIZE]) -> Result<Self, ConfigError> {
        let len = slot[0] as usize;
        if len > MAX_CONFIG_SIZE {
            return Err(ConfigError::InvalidFormat);
        }
        Self::from_bytes(&slot[1..1 + len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom() -> MonitorConfig {
        let mut config = MonitorConfig {
            check_interval_ms: 25,
            ram_test_pattern: 0x5A,
            enable_flash_check: true,
            ..Default::default()
        };
        config.voltage.undervolt_mv = 8500;
        config.temperature.warning_low_c = -35;
        config
    }

    #[test]
    fn test_stored_config_decodes() {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = custom().to_bytes(&mut buffer).unwrap();

        assert_eq!(MonitorConfig::from_bytes(&buffer[..len]), Ok(custom()));
    }

    #[test]
    fn test_corruption_detected() {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let len = custom().to_bytes(&mut buffer).unwrap();
        buffer[3] ^= 0x01;

        assert_eq!(
            MonitorConfig::from_bytes(&buffer[..len]),
            Err(ConfigError::CrcMismatch)
        );
    }

    #[test]
    fn test_foreign_data_rejected() {
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let body = postcard::to_slice(&(0xDEAD_BEEFu32, CONFIG_VERSION, custom()), &mut buffer)
            .unwrap()
            .len();
        let crc = crc32fast::hash(&buffer[..body]);
        buffer[body..body + 4].copy_from_slice(&crc.to_le_bytes());

        assert_eq!(
            MonitorConfig::from_bytes(&buffer[..body + 4]),
            Err(ConfigError::InvalidFormat)
        );
    }

    #[test]
    fn test_small_buffer() {
        let mut buffer = [0u8; 8];
        assert_eq!(custom().to_bytes(&mut buffer), Err(ConfigError::Serialize));
        assert_eq!(MonitorConfig::from_bytes(&[0, 1]), Err(ConfigError::Deserialize));
    }

    #[test]
    fn test_slot_store_and_load() {
        let mut slot = [0xFFu8; CONFIG_SLOT_SIZE];
        custom().store(&mut slot).unwrap();

        assert!(slot[0] as usize <= MAX_CONFIG_SIZE);
        assert_eq!(MonitorConfig::load(&slot), Ok(custom()));

        // Overwrite with the defaults
        MonitorConfig::default().store(&mut slot).unwrap();
        assert_eq!(MonitorConfig::load(&slot), Ok(MonitorConfig::default()));
    }

    #[test]
    fn test_slot_garbage_rejected() {
        let slot = [0xA5u8; CONFIG_SLOT_SIZE];
        assert_eq!(MonitorConfig::load(&slot), Err(ConfigError::InvalidFormat));

        let mut slot = [0u8; CONFIG_SLOT_SIZE];
        assert_eq!(MonitorConfig::load(&slot), Err(ConfigError::Deserialize));

        slot[0] = 20;
        assert_eq!(MonitorConfig::load(&slot), Err(ConfigError::CrcMismatch));
    }
}
