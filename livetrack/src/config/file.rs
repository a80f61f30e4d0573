//! INI-backed configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::{config_file_path, ConfigError};
use crate::coord::{AxisScale, GeoOrigin};
use crate::orchestrator::{SourceConfig, DEFAULT_SENSOR_TYPE};
use crate::server::DEFAULT_BIND;
use crate::session::{StreamConfig, DEFAULT_REMOVAL_PERIOD, DEFAULT_SEND_PERIOD};
use crate::store::TableNames;

/// `[stream]`
#[derive(Debug, Clone, PartialEq)]
pub struct StreamSettings {
    pub is_live: bool,
    pub send_period_ms: u64,
    pub removal_period_ms: u64,
    pub sensor_type: String,
    pub ui_delay_seconds: f64,
    pub track_vehicles: bool,
    pub track_parking: bool,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            is_live: true,
            send_period_ms: DEFAULT_SEND_PERIOD.as_millis() as u64,
            removal_period_ms: DEFAULT_REMOVAL_PERIOD.as_millis() as u64,
            sensor_type: DEFAULT_SENSOR_TYPE.to_string(),
            ui_delay_seconds: 0.0,
            track_vehicles: false,
            track_parking: false,
        }
    }
}

/// `[coordinates]`
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateSettings {
    pub origin_lat: f64,
    pub origin_lon: f64,
    pub x_mult: f64,
    pub y_mult: f64,
}

impl Default for CoordinateSettings {
    fn default() -> Self {
        Self {
            origin_lat: 0.0,
            origin_lon: 0.0,
            x_mult: 1.0,
            y_mult: 1.0,
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StoreSettings {
    /// JSON-lines file replayed by the in-memory store.
    pub rows_file: Option<PathBuf>,
    pub parking_spots: Vec<String>,
    pub tables: TableNames,
}

/// `[server]`
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigFile {
    pub stream: StreamSettings,
    pub coordinates: CoordinateSettings,
    pub store: StoreSettings,
    pub server: ServerSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load from the default path; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(io) => ConfigError::Io(io),
            ini::Error::Parse(parse) => ConfigError::Parse(parse.to_string()),
        })?;
        Self::from_ini(&ini)
    }

    /// Save to the default path, creating `~/.livetrack` if needed.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.to_ini().write_to_file(path)?;
        Ok(())
    }

    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let reader = Reader { ini };

        let stream = StreamSettings {
            is_live: reader.parse("stream", "is_live", defaults.stream.is_live)?,
            send_period_ms: reader.parse(
                "stream",
                "send_period_ms",
                defaults.stream.send_period_ms,
            )?,
            removal_period_ms: reader.parse(
                "stream",
                "removal_period_ms",
                defaults.stream.removal_period_ms,
            )?,
            sensor_type: reader.text("stream", "sensor_type", &defaults.stream.sensor_type),
            ui_delay_seconds: reader.parse(
                "stream",
                "ui_delay_seconds",
                defaults.stream.ui_delay_seconds,
            )?,
            track_vehicles: reader.parse(
                "stream",
                "track_vehicles",
                defaults.stream.track_vehicles,
            )?,
            track_parking: reader.parse("stream", "track_parking", defaults.stream.track_parking)?,
        };
        if stream.send_period_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "stream.send_period_ms".to_string(),
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let coordinates = CoordinateSettings {
            origin_lat: reader.parse("coordinates", "origin_lat", defaults.coordinates.origin_lat)?,
            origin_lon: reader.parse("coordinates", "origin_lon", defaults.coordinates.origin_lon)?,
            x_mult: reader.parse("coordinates", "x_mult", defaults.coordinates.x_mult)?,
            y_mult: reader.parse("coordinates", "y_mult", defaults.coordinates.y_mult)?,
        };

        let tables = &defaults.store.tables;
        let store = StoreSettings {
            rows_file: reader.path("store", "rows_file"),
            parking_spots: reader
                .get("store", "parking_spots")
                .map(split_list)
                .unwrap_or_default(),
            tables: TableNames {
                detections: reader.text("store", "detection_table", &tables.detections),
                aisle: reader.text("store", "aisle_table", &tables.aisle),
                parking_delta: reader.text("store", "delta_table", &tables.parking_delta),
                parking_state: reader.text("store", "state_table", &tables.parking_state),
                parking_playback: reader.text("store", "playback_table", &tables.parking_playback),
            },
        };

        let server = ServerSettings {
            bind: reader.text("server", "bind", &defaults.server.bind),
        };

        let logging = LoggingSettings {
            level: reader.text("logging", "level", &defaults.logging.level),
            file: reader.path("logging", "file"),
        };

        Ok(Self {
            stream,
            coordinates,
            store,
            server,
            logging,
        })
    }

    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("stream"))
            .set("is_live", self.stream.is_live.to_string())
            .set("send_period_ms", self.stream.send_period_ms.to_string())
            .set("removal_period_ms", self.stream.removal_period_ms.to_string())
            .set("sensor_type", self.stream.sensor_type.as_str())
            .set("ui_delay_seconds", self.stream.ui_delay_seconds.to_string())
            .set("track_vehicles", self.stream.track_vehicles.to_string())
            .set("track_parking", self.stream.track_parking.to_string());

        ini.with_section(Some("coordinates"))
            .set("origin_lat", self.coordinates.origin_lat.to_string())
            .set("origin_lon", self.coordinates.origin_lon.to_string())
            .set("x_mult", self.coordinates.x_mult.to_string())
            .set("y_mult", self.coordinates.y_mult.to_string());

        let tables = &self.store.tables;
        ini.with_section(Some("store"))
            .set("rows_file", path_value(&self.store.rows_file))
            .set("parking_spots", self.store.parking_spots.join(","))
            .set("detection_table", tables.detections.as_str())
            .set("aisle_table", tables.aisle.as_str())
            .set("delta_table", tables.parking_delta.as_str())
            .set("state_table", tables.parking_state.as_str())
            .set("playback_table", tables.parking_playback.as_str());

        ini.with_section(Some("server"))
            .set("bind", self.server.bind.as_str());

        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("file", path_value(&self.logging.file));

        ini
    }

    /// Look up a `section.key` value as it would be written to the file.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let (section, name) = key
            .split_once('.')
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        self.to_ini()
            .get_from(Some(section), name)
            .map(str::to_string)
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))
    }

    /// All `section.key = value` pairs in file order.
    pub fn entries(&self) -> Vec<(String, String)> {
        let ini = self.to_ini();
        let mut entries = Vec::new();
        for (section, properties) in ini.iter() {
            let Some(section) = section else { continue };
            for (key, value) in properties.iter() {
                entries.push((format!("{}.{}", section, key), value.to_string()));
            }
        }
        entries
    }

    /// Stream configuration for sessions.
    pub fn stream_config(&self) -> StreamConfig {
        let stream = &self.stream;
        let mut sources = SourceConfig::default()
            .with_tables(self.store.tables.clone())
            .with_sensor_type(stream.sensor_type.as_str())
            .with_live(stream.is_live)
            .with_ui_delay_seconds(stream.ui_delay_seconds)
            .with_vehicles(stream.track_vehicles);
        if stream.track_parking {
            sources = sources.with_parking(self.store.parking_spots.clone());
        }

        StreamConfig::new()
            .with_send_period(Duration::from_millis(stream.send_period_ms))
            .with_removal_period(Duration::from_millis(stream.removal_period_ms))
            .with_origin(GeoOrigin::new(
                self.coordinates.origin_lat,
                self.coordinates.origin_lon,
            ))
            .with_axis_scale(AxisScale::new(
                self.coordinates.x_mult,
                self.coordinates.y_mult,
            ))
            .with_sources(sources)
    }
}

struct Reader<'a> {
    ini: &'a Ini,
}

impl Reader<'_> {
    /// Non-empty trimmed value.
    fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .get_from(Some(section), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn text(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or(default).to_string()
    }

    fn path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get(section, key).map(PathBuf::from)
    }

    fn parse<T>(&self, section: &str, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(section, key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                key: format!("{}.{}", section, key),
                value: value.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn path_value(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}
