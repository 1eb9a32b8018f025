// Copyright @yucwang 2026

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::core::camera::Camera;
use crate::core::config::CameraConfig;
use crate::core::error::{ObserveError, ObserveResult};
use crate::math::constants::{Float, Vector3f};
use crate::sensors::pinhole::PinholeCamera;

#[derive(Debug)]
pub enum ConfigLoadError {
    Io(std::io::Error),
    Parse(String),
    MissingField(&'static str),
    Invalid(ObserveError),
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::Io(err) => write!(f, "io error: {}", err),
            ConfigLoadError::Parse(msg) => write!(f, "parse error: {}", msg),
            ConfigLoadError::MissingField(field) => write!(f, "missing field: {}", field),
            ConfigLoadError::Invalid(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConfigLoadError {}

impl From<std::io::Error> for ConfigLoadError {
    fn from(err: std::io::Error) -> Self {
        ConfigLoadError::Io(err)
    }
}

impl From<ObserveError> for ConfigLoadError {
    fn from(err: ObserveError) -> Self {
        ConfigLoadError::Invalid(err)
    }
}

/// A pinhole camera as described by a camera file.
#[derive(Clone, Debug)]
pub struct CameraDescription {
    pub pixels: (usize, usize),
    pub config: CameraConfig,
    pub fov: Float,
    pub sub_sample: bool,
    pub origin: Vector3f,
    pub target: Vector3f,
    pub up: Vector3f,
}

impl Default for CameraDescription {
    fn default() -> Self {
        Self {
            pixels: (512, 512),
            config: CameraConfig::default(),
            fov: 45.0,
            sub_sample: false,
            origin: Vector3f::new(0.0, 0.0, 0.0),
            target: Vector3f::new(0.0, 0.0, -1.0),
            up: Vector3f::new(0.0, 1.0, 0.0),
        }
    }
}

impl CameraDescription {
    pub fn build(&self) -> ObserveResult<Camera<PinholeCamera>> {
        let mut sensor = PinholeCamera::new(self.origin, self.target, self.up, self.fov)?;
        sensor.set_sub_sample(self.sub_sample);
        Camera::new(self.pixels, self.config.clone(), sensor)
    }
}

pub fn load_camera<P: AsRef<Path>>(path: P) -> Result<CameraDescription, ConfigLoadError> {
    let xml = fs::read_to_string(path)?;
    parse_camera(&xml)
}

pub fn parse_camera(xml: &str) -> Result<CameraDescription, ConfigLoadError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);
    let mut buf = Vec::new();

    let mut description = CameraDescription::default();
    let mut in_camera = false;
    let mut seen_camera = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                match e.name().as_ref() {
                    b"camera" => {
                        let camera_type = attribute(&e, b"type")?.unwrap_or_else(|| String::from("pinhole"));
                        if camera_type != "pinhole" {
                            return Err(ConfigLoadError::Parse(format!("unsupported camera type: {}", camera_type)));
                        }
                        in_camera = true;
                        seen_camera = true;
                    }
                    b"integer" | b"float" | b"boolean" if in_camera => {
                        let name = attribute(&e, b"name")?.ok_or(ConfigLoadError::MissingField("name"))?;
                        let value = attribute(&e, b"value")?.ok_or(ConfigLoadError::MissingField("value"))?;
                        apply_property(&mut description, &name, &value)?;
                    }
                    b"lookat" if in_camera => {
                        if let Some(v) = attribute(&e, b"origin")? {
                            description.origin = parse_vec3(&v)?;
                        }
                        if let Some(v) = attribute(&e, b"target")? {
                            description.target = parse_vec3(&v)?;
                        }
                        if let Some(v) = attribute(&e, b"up")? {
                            description.up = parse_vec3(&v)?;
                        }
                    }
                    other => {
                        return Err(ConfigLoadError::Parse(format!("unexpected element: {}",
                                                                  String::from_utf8_lossy(other))));
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"camera" {
                    in_camera = false;
                }
            }
            Err(e) => {
                return Err(ConfigLoadError::Parse(e.to_string()));
            }
            _ => {}
        }
        buf.clear();
    }

    if !seen_camera {
        return Err(ConfigLoadError::MissingField("camera"));
    }
    Ok(description)
}

fn apply_property(description: &mut CameraDescription, name: &str, value: &str) -> Result<(), ConfigLoadError> {
    let config = &mut description.config;
    match name {
        "width" => description.pixels.0 = parse_usize(value)?,
        "height" => description.pixels.1 = parse_usize(value)?,
        "fov" => description.fov = parse_float(value)?,
        "sub_sample" => description.sub_sample = parse_bool(value)?,
        "sensitivity" => config.set_sensitivity(parse_float(value)?)?,
        "spectral_samples" => config.set_spectral_samples(parse_usize(value)?)?,
        "spectral_rays" => config.set_spectral_rays(parse_usize(value)?)?,
        "pixel_samples" => config.set_pixel_samples(parse_u32(value)?)?,
        "workers" => config.set_worker_count(parse_usize(value)?)?,
        "accumulate" => config.set_accumulate(parse_bool(value)?),
        "display_progress" => config.set_display_progress(parse_bool(value)?),
        "display_update_time" => config.set_display_update_time(parse_seconds(value)?)?,
        "progress_interval" => config.set_progress_interval(parse_seconds(value)?)?,
        "seed" => config.set_seed(Some(value.parse::<u64>()
            .map_err(|_| ConfigLoadError::Parse(format!("invalid seed: {}", value)))?)),
        "min_wavelength" => {
            let max = config.max_wavelength();
            config.set_wavelength_range(parse_float(value)?, max)?;
        }
        "max_wavelength" => {
            let min = config.min_wavelength();
            config.set_wavelength_range(min, parse_float(value)?)?;
        }
        _ => return Err(ConfigLoadError::Parse(format!("unknown camera property: {}", name))),
    }
    Ok(())
}

fn attribute(e: &BytesStart, key: &[u8]) -> Result<Option<String>, ConfigLoadError> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| ConfigLoadError::Parse(err.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(|err| ConfigLoadError::Parse(err.to_string()))?;
            return Ok(Some(value.to_string()));
        }
    }
    Ok(None)
}

fn parse_float(value: &str) -> Result<Float, ConfigLoadError> {
    value.trim().parse::<Float>().map_err(|_| ConfigLoadError::Parse(format!("invalid float: {}", value)))
}

fn parse_u32(value: &str) -> Result<u32, ConfigLoadError> {
    value.trim().parse::<u32>().map_err(|_| ConfigLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_usize(value: &str) -> Result<usize, ConfigLoadError> {
    value.trim().parse::<usize>().map_err(|_| ConfigLoadError::Parse(format!("invalid integer: {}", value)))
}

fn parse_bool(value: &str) -> Result<bool, ConfigLoadError> {
    match value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigLoadError::Parse(format!("invalid boolean: {}", value))),
    }
}

fn parse_seconds(value: &str) -> Result<Duration, ConfigLoadError> {
    let seconds = parse_float(value)?;
    Duration::try_from_secs_f32(seconds)
        .map_err(|_| ConfigLoadError::Parse(format!("invalid duration: {}", value)))
}

fn parse_vec3(value: &str) -> Result<Vector3f, ConfigLoadError> {
    let mut parts = value.split(',').map(|s| s.trim()).filter(|s| !s.is_empty());
    let x = parts.next().ok_or_else(|| ConfigLoadError::Parse("invalid vec3".to_string()))?;
    let y = parts.next().ok_or_else(|| ConfigLoadError::Parse("invalid vec3".to_string()))?;
    let z = parts.next().ok_or_else(|| ConfigLoadError::Parse("invalid vec3".to_string()))?;
    Ok(Vector3f::new(parse_float(x)?, parse_float(y)?, parse_float(z)?))
}
