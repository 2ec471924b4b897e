use serde::{Deserialize, Serialize};
use stagecraft_common::MaxCanvasSize;
use std::collections::BTreeMap;

/// A string attribute that failed to parse as its typed config value.
#[derive(Debug, thiserror::Error)]
#[error("invalid value {value:?} for `{key}`")]
pub struct ConfigValueError {
    pub key: &'static str,
    pub value: String,
}

/// Renderer configuration consumed by the frame loop and resize path.
///
/// Parsed from the scene's string-keyed attributes; malformed values fall
/// back to defaults rather than failing the frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RendererConfig {
    pub antialias: bool,
    pub logarithmic_depth_buffer: bool,
    /// Backbuffer width cap in physical pixels; -1 is uncapped.
    pub max_canvas_width: i32,
    /// Backbuffer height cap in physical pixels; -1 is uncapped.
    pub max_canvas_height: i32,
    /// Multiplier applied to the device pixel ratio each drawn frame.
    /// `None` leaves the backend's ratio alone.
    pub pixel_ratio: Option<f64>,
    /// Size the canvas to its container rather than the window.
    pub embedded: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            antialias: true,
            logarithmic_depth_buffer: false,
            max_canvas_width: 1920,
            max_canvas_height: 1920,
            pixel_ratio: None,
            embedded: false,
        }
    }
}

impl RendererConfig {
    /// Build a config from string-keyed attributes. Each malformed value
    /// is logged and replaced by its default; absent keys keep defaults.
    pub fn from_attributes(attrs: &BTreeMap<String, String>) -> Self {
        let defaults = Self::default();
        Self {
            antialias: parse_or(attrs, "antialias", defaults.antialias, parse_bool),
            logarithmic_depth_buffer: parse_or(
                attrs,
                "logarithmicDepthBuffer",
                defaults.logarithmic_depth_buffer,
                parse_bool,
            ),
            max_canvas_width: parse_or(
                attrs,
                "maxCanvasWidth",
                defaults.max_canvas_width,
                parse_cap,
            ),
            max_canvas_height: parse_or(
                attrs,
                "maxCanvasHeight",
                defaults.max_canvas_height,
                parse_cap,
            ),
            pixel_ratio: attrs
                .get("pixelRatio")
                .and_then(|raw| match parse_ratio("pixelRatio", raw) {
                    Ok(ratio) => Some(ratio),
                    Err(err) => {
                        tracing::warn!(%err, "renderer config fallback");
                        None
                    }
                }),
            embedded: parse_or(attrs, "embedded", defaults.embedded, parse_bool),
        }
    }

    pub fn max_canvas_size(&self) -> MaxCanvasSize {
        MaxCanvasSize {
            width: self.max_canvas_width,
            height: self.max_canvas_height,
        }
    }
}

fn parse_or<T>(
    attrs: &BTreeMap<String, String>,
    key: &'static str,
    default: T,
    parse: fn(&'static str, &str) -> Result<T, ConfigValueError>,
) -> T {
    match attrs.get(key) {
        None => default,
        Some(raw) => match parse(key, raw) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "renderer config fallback");
                default
            }
        },
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigValueError> {
    match raw.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigValueError {
            key,
            value: raw.to_owned(),
        }),
    }
}

/// Size caps accept any integer; values below -1 collapse to uncapped.
fn parse_cap(key: &'static str, raw: &str) -> Result<i32, ConfigValueError> {
    raw.trim()
        .parse::<i32>()
        .map(|v| v.max(-1))
        .map_err(|_| ConfigValueError {
            key,
            value: raw.to_owned(),
        })
}

fn parse_ratio(key: &'static str, raw: &str) -> Result<f64, ConfigValueError> {
    let ratio: f64 = raw.trim().parse().map_err(|_| ConfigValueError {
        key,
        value: raw.to_owned(),
    })?;
    if !ratio.is_finite() || ratio <= 0.0 {
        return Err(ConfigValueError {
            key,
            value: raw.to_owned(),
        });
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_match_contract() {
        let config = RendererConfig::default();
        assert!(config.antialias);
        assert!(!config.logarithmic_depth_buffer);
        assert_eq!(config.max_canvas_width, 1920);
        assert_eq!(config.max_canvas_height, 1920);
        assert_eq!(config.pixel_ratio, None);
        assert!(!config.embedded);
    }

    #[test]
    fn parses_well_formed_attributes() {
        let config = RendererConfig::from_attributes(&attrs(&[
            ("antialias", "false"),
            ("logarithmicDepthBuffer", "true"),
            ("maxCanvasWidth", "-1"),
            ("maxCanvasHeight", "1080"),
            ("pixelRatio", "0.5"),
            ("embedded", "true"),
        ]));
        assert!(!config.antialias);
        assert!(config.logarithmic_depth_buffer);
        assert_eq!(config.max_canvas_width, -1);
        assert_eq!(config.max_canvas_height, 1080);
        assert_eq!(config.pixel_ratio, Some(0.5));
        assert!(config.embedded);
    }

    #[test]
    fn malformed_values_fall_back_to_defaults() {
        let config = RendererConfig::from_attributes(&attrs(&[
            ("antialias", "yes"),
            ("maxCanvasWidth", "huge"),
            ("pixelRatio", "NaN"),
        ]));
        assert_eq!(config, RendererConfig::default());
    }

    #[test]
    fn caps_below_minus_one_collapse_to_uncapped() {
        let config =
            RendererConfig::from_attributes(&attrs(&[("maxCanvasWidth", "-12")]));
        assert_eq!(config.max_canvas_width, -1);
    }

    #[test]
    fn nonpositive_pixel_ratio_is_rejected() {
        let config = RendererConfig::from_attributes(&attrs(&[("pixelRatio", "0")]));
        assert_eq!(config.pixel_ratio, None);
    }

    #[test]
    fn max_canvas_size_projection() {
        let config = RendererConfig {
            max_canvas_width: -1,
            max_canvas_height: -1,
            ..RendererConfig::default()
        };
        assert!(config.max_canvas_size().is_uncapped());
    }
}
