use std::time::Duration;

/// Port the Unity editor dials when no base port is configured.
pub const DEFAULT_EDITOR_PORT: u16 = 5004;
/// How long to wait for the editor before giving up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Test action submitted by the connectivity probe: steer, throttle.
pub const DEFAULT_STEER: f32 = 0.5;
pub const DEFAULT_THROTTLE: f32 = 0.8;

pub struct Config {
    pub port: u16,
    pub timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("MLAGENTS_PORT")
            .ok()
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_EDITOR_PORT);
        let timeout_secs = std::env::var("MLAGENTS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        Self { port, timeout_secs }
    }
}

/// Everything one connectivity-probe run needs. Defaults reproduce the
/// original diagnostic literals; flags and env vars may override them.
#[derive(Debug, Clone)]
pub struct ProbeSettings {
    pub port: u16,
    pub timeout: Duration,
    pub seed: i32,
    pub steer: f32,
    pub throttle: f32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            port: DEFAULT_EDITOR_PORT,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            seed: 0,
            steer: DEFAULT_STEER,
            throttle: DEFAULT_THROTTLE,
        }
    }
}
