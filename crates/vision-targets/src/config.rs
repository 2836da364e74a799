//! Robot-side configuration file (`/boot/frc.json` layout).

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cargo::CargoParams;
use crate::hatch::HatchParams;

pub const DEFAULT_CONFIG_PATH: &str = "/boot/frc.json";
pub const DEFAULT_TEAM: u32 = 4509;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("config must list at least one camera")]
    MissingCameras,
    #[error("camera #{index} has an empty {field}")]
    EmptyCameraField { index: usize, field: &'static str },
    #[error("unrecognized ntmode '{0}' (expected 'client' or 'server')")]
    InvalidNtMode(String),
}

/// Bus connection role.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NtMode {
    #[default]
    Client,
    Server,
}

impl FromStr for NtMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("client") {
            Ok(Self::Client)
        } else if s.eq_ignore_ascii_case("server") {
            Ok(Self::Server)
        } else {
            Err(ConfigError::InvalidNtMode(s.to_owned()))
        }
    }
}

impl fmt::Display for NtMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Client => "client",
            Self::Server => "server",
        })
    }
}

/// One USB camera entry. Properties other than `name`, `path` and `stream`
/// are kept as-is for the capture backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VisionConfig {
    pub team: u32,
    pub ntmode: NtMode,
    pub cameras: Vec<CameraConfig>,
    pub hatch: HatchParams,
    pub cargo: CargoParams,
}

// On-disk shape; `ntmode` is free text until validated.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(default = "default_team")]
    team: u32,
    #[serde(default)]
    ntmode: Option<String>,
    #[serde(default)]
    cameras: Vec<CameraConfig>,
    #[serde(default)]
    hatch: HatchParams,
    #[serde(default)]
    cargo: CargoParams,
}

fn default_team() -> u32 {
    DEFAULT_TEAM
}

impl VisionConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_str(raw)?;
        Self::try_from(raw)
    }

    pub fn camera_names(&self) -> impl Iterator<Item = &str> {
        self.cameras.iter().map(|c| c.name.as_str())
    }
}

impl TryFrom<RawConfig> for VisionConfig {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let ntmode = match raw.ntmode.as_deref() {
            Some(s) => s.parse()?,
            None => NtMode::default(),
        };
        if raw.cameras.is_empty() {
            return Err(ConfigError::MissingCameras);
        }
        for (index, cam) in raw.cameras.iter().enumerate() {
            if cam.name.trim().is_empty() {
                return Err(ConfigError::EmptyCameraField { index, field: "name" });
            }
            if cam.path.trim().is_empty() {
                return Err(ConfigError::EmptyCameraField { index, field: "path" });
            }
        }
        Ok(Self {
            team: raw.team,
            ntmode,
            cameras: raw.cameras,
            hatch: raw.hatch,
            cargo: raw.cargo,
        })
    }
}
