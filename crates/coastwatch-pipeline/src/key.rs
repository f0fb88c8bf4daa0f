//! Cache key derivation.
//!
//! Keys are `<kind>:<sha256 hex>` where the digest covers the parameters that
//! identify the upstream request. Credentials are not part of any key.

use coastwatch_core::DeviceId;
use coastwatch_providers::Coordinates;
use sha2::{Digest, Sha256};

fn digest_key(kind: &str, parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    for part in parts {
        // Length prefix keeps ("ab", "c") and ("a", "bc") apart.
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    format!("{}:{}", kind, hex::encode(hasher.finalize()))
}

/// Key for a station's realtime readings.
pub fn weather_key(device: &DeviceId) -> String {
    digest_key("weather", &[device.as_str().as_bytes()])
}

/// Key for a station's trailing history.
pub fn historical_key(device: &DeviceId, lookback_days: u32) -> String {
    digest_key(
        "historical",
        &[device.as_str().as_bytes(), &lookback_days.to_le_bytes()],
    )
}

/// Key for the tide extremes at a location.
pub fn tide_key(location: Coordinates) -> String {
    digest_key(
        "tide",
        &[
            &location.latitude.to_le_bytes(),
            &location.longitude.to_le_bytes(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(raw: &str) -> DeviceId {
        DeviceId::parse(raw).unwrap()
    }

    #[test]
    fn keys_are_tagged_hex_digests() {
        let key = weather_key(&device("AABBCCDDEEFF"));
        let (kind, digest) = key.split_once(':').unwrap();
        assert_eq!(kind, "weather");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn equivalent_device_spellings_share_a_key() {
        assert_eq!(
            weather_key(&device("aa:bb:cc:dd:ee:ff")),
            weather_key(&device("AABBCCDDEEFF"))
        );
    }

    #[test]
    fn parameters_change_the_key() {
        let a = device("AABBCCDDEEFF");
        let b = device("AABBCCDDEE00");
        assert_ne!(weather_key(&a), weather_key(&b));
        assert_ne!(historical_key(&a, 7), historical_key(&a, 3));
        assert_ne!(
            tide_key(Coordinates::new(50.1, -5.5)),
            tide_key(Coordinates::new(-5.5, 50.1))
        );
    }

    #[test]
    fn kinds_do_not_collide() {
        let a = device("AABBCCDDEEFF");
        let weather = weather_key(&a);
        let history = historical_key(&a, 7);
        assert_ne!(weather[weather.find(':').unwrap()..], history[history.find(':').unwrap()..]);
        assert!(history.starts_with("historical:"));
        assert!(tide_key(Coordinates::new(0.0, 0.0)).starts_with("tide:"));
    }
}
