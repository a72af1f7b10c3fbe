//! Client configuration, read from the environment

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ClientError;

/// Largest accepted capture or canvas side, in pixels
const MAX_DIMENSION: u32 = 8192;

#[derive(Debug, Clone)]
pub struct Config {
    /// Relay WebSocket endpoint
    pub server_url: String,
    /// Recording the replay camera plays back
    pub replay_file: Option<PathBuf>,
    /// Logical capture resolution
    pub video_width: u32,
    pub video_height: u32,
    /// Size of each participant's drawing surface
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Poses scoring below this are not usable
    pub min_pose_confidence: f32,
    /// Keypoints scoring below this are not drawn
    pub min_part_confidence: f32,
    /// Upper bound on capture cycles per second
    pub refresh_hz: u32,
    /// Where to write each participant's surface on shutdown
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "ws://127.0.0.1:8080/ws".to_string(),
            replay_file: None,
            video_width: 256,
            video_height: 256,
            canvas_width: 200,
            canvas_height: 200,
            min_pose_confidence: 0.15,
            min_part_confidence: 0.1,
            refresh_hz: 60,
            snapshot_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ClientError> {
        let defaults = Self::default();

        let config = Config {
            server_url: std::env::var("SERVER_URL").unwrap_or(defaults.server_url),
            replay_file: std::env::var("REPLAY_FILE").ok().map(PathBuf::from),
            video_width: var_or("VIDEO_WIDTH", defaults.video_width)?,
            video_height: var_or("VIDEO_HEIGHT", defaults.video_height)?,
            canvas_width: var_or("CANVAS_WIDTH", defaults.canvas_width)?,
            canvas_height: var_or("CANVAS_HEIGHT", defaults.canvas_height)?,
            min_pose_confidence: var_or("MIN_POSE_CONFIDENCE", defaults.min_pose_confidence)?,
            min_part_confidence: var_or("MIN_PART_CONFIDENCE", defaults.min_part_confidence)?,
            refresh_hz: var_or("REFRESH_HZ", defaults.refresh_hz)?,
            snapshot_dir: std::env::var("SNAPSHOT_DIR").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        for (field, value) in [
            ("video_width", self.video_width),
            ("video_height", self.video_height),
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
            ("refresh_hz", self.refresh_hz),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
        }

        for (field, value) in [
            ("video_width", self.video_width),
            ("video_height", self.video_height),
            ("canvas_width", self.canvas_width),
            ("canvas_height", self.canvas_height),
        ] {
            if value > MAX_DIMENSION {
                return Err(invalid(field, &format!("must be at most {}", MAX_DIMENSION)));
            }
        }

        for (field, value) in [
            ("min_pose_confidence", self.min_pose_confidence),
            ("min_part_confidence", self.min_part_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be between 0.0 and 1.0"));
            }
        }

        if !self.server_url.starts_with("ws://") && !self.server_url.starts_with("wss://") {
            return Err(invalid("server_url", "must be a ws:// or wss:// URL"));
        }

        Ok(())
    }
}

fn var_or<T: FromStr>(name: &str, default: T) -> Result<T, ClientError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| invalid(name, &format!("cannot parse `{}`", raw))),
        Err(_) => Ok(default),
    }
}

fn invalid(field: &str, message: &str) -> ClientError {
    ClientError::Config {
        field: field.to_string(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_rejects_zero_canvas() {
        let config = Config {
            canvas_width: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ClientError::Config { field, .. }) if field == "canvas_width"
        ));
    }

    #[test]
    fn test_rejects_oversized_video() {
        let config = Config {
            video_width: 100_000,
            video_height: 100_000,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ClientError::Config { field, .. }) if field == "video_width"
        ));
    }

    #[test]
    fn test_rejects_out_of_range_confidence() {
        let config = Config {
            min_pose_confidence: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_http_url() {
        let config = Config {
            server_url: "http://localhost:8080".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
