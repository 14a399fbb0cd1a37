use glam::Vec3;

use crate::error::ConfigError;
use crate::model::Rgb;

/// Which demo scene to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoVariant {
    /// Falling boxes over a ground slab, highlighted on contact
    Boxes,
    /// Subdivided plane animated by the wave shader
    WavePlane,
}

impl DemoVariant {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "boxes" | "box" => Some(Self::Boxes),
            "wave" | "waveplane" | "wave_plane" | "shader" => Some(Self::WavePlane),
            _ => None,
        }
    }
}

/// Upper bound on dynamic bodies. The highlighter is quadratic in the body
/// count and the instance buffer must stay under the WebGL2 buffer limit.
pub const MAX_BODIES: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub variant: DemoVariant,
    /// World units per second
    pub move_speed: f32,
    /// Radians per second
    pub rotate_speed: f32,
    pub body_count: usize,
    pub seed: u64,
    pub width: u32,
    pub height: u32,
    pub alert_color: Rgb,
    pub neutral_color: Rgb,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            variant: DemoVariant::Boxes,
            move_speed: 5.0,
            rotate_speed: 1.5,
            body_count: 10,
            seed: 0x5EED,
            width: 800,
            height: 600,
            alert_color: Rgb::new(1.0, 0.0, 0.0),
            neutral_color: Rgb::new(0.5, 0.5, 0.5),
        }
    }
}

impl DemoConfig {
    /// Keys accepted by [`DemoConfig::apply`].
    pub const KEYS: [&'static str; 5] = ["variant", "bodies", "seed", "move_speed", "rotate_speed"];

    /// Initial camera position and look-at target for the configured variant.
    pub fn camera_start(&self) -> (Vec3, Vec3) {
        match self.variant {
            DemoVariant::Boxes => (Vec3::new(0.0, 5.0, -15.0), Vec3::ZERO),
            DemoVariant::WavePlane => (Vec3::new(0.25, -0.25, 1.0), Vec3::ZERO),
        }
    }

    /// Apply a single `key=value` override.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue { key: key.to_string(), value: value.to_string() };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "variant" => self.variant = DemoVariant::parse(value).ok_or_else(invalid)?,
            "bodies" | "body_count" => {
                self.body_count = value
                    .parse()
                    .ok()
                    .filter(|count| *count <= MAX_BODIES)
                    .ok_or_else(invalid)?
            }
            "seed" => self.seed = parse_seed(value).ok_or_else(invalid)?,
            "move_speed" => self.move_speed = parse_speed(value).ok_or_else(invalid)?,
            "rotate_speed" => self.rotate_speed = parse_speed(value).ok_or_else(invalid)?,
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }

    /// Apply every pair, collecting rejected ones instead of stopping at the first.
    pub fn apply_pairs<'a, I>(&mut self, pairs: I) -> Vec<ConfigError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .filter_map(|(k, v)| self.apply(k, v).err())
            .collect()
    }

    /// Split a raw URL query string such as `?variant=wave&bodies=20` into pairs.
    /// Keys and values come back still encoded; see [`DemoConfig::decode_query`].
    pub fn query_pairs(query: &str) -> impl Iterator<Item = (&str, &str)> {
        query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
    }

    /// Split `query` into pairs first, then decode each key and value, so an
    /// encoded `&` or `=` inside a value stays part of that value. Pairs the
    /// decoder rejects are kept raw.
    pub fn decode_query<F>(query: &str, decoder: F) -> Vec<(String, String)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let decode = |part: &str| decoder(part).unwrap_or_else(|| part.to_string());
        Self::query_pairs(query)
            .map(|(key, value)| (decode(key), decode(value)))
            .collect()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> (Self, Vec<ConfigError>) {
        let mut config = Self::default();
        let overrides: Vec<(&str, String)> = Self::KEYS
            .iter()
            .filter_map(|key| {
                std::env::var(format!("BOXFALL_{}", key.to_ascii_uppercase()))
                    .ok()
                    .map(|value| (*key, value))
            })
            .collect();
        let errors = config.apply_pairs(overrides.iter().map(|(k, v)| (*k, v.as_str())));
        (config, errors)
    }
}

fn parse_seed(value: &str) -> Option<u64> {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}

fn parse_speed(value: &str) -> Option<f32> {
    value.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}
