use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.unsplash.com";
pub const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";
pub const ENDPOINT_ENV: &str = "UNSPLASH_ENDPOINT";

/// Canvas size, background and the default geometry of every object the
/// toolbar can create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub size: Vec2,
    pub background: Color32,

    /// Loaded images are scaled to this width, keeping their aspect ratio
    pub image_target_width: f32,
    pub image_offset: Pos2,

    pub text_content: String,
    pub text_position: Pos2,
    pub text_font_size: f32,
    pub text_fill: Color32,

    pub rectangle_position: Pos2,
    pub rectangle_size: Vec2,
    pub rectangle_fill: Color32,
    /// Top-left of the circle's bounding box
    pub circle_position: Pos2,
    pub circle_radius: f32,
    pub circle_fill: Color32,
    pub triangle_position: Pos2,
    pub triangle_size: Vec2,
    pub triangle_fill: Color32,

    pub export_file_name: String,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            size: Vec2::new(500.0, 500.0),
            // CSS lightgray
            background: Color32::from_rgb(0xd3, 0xd3, 0xd3),
            image_target_width: 400.0,
            image_offset: Pos2::new(50.0, 50.0),
            text_content: "Type Here".to_owned(),
            text_position: Pos2::new(100.0, 100.0),
            text_font_size: 24.0,
            text_fill: Color32::BLACK,
            rectangle_position: Pos2::new(100.0, 100.0),
            rectangle_size: Vec2::new(120.0, 80.0),
            rectangle_fill: Color32::from_rgb(0, 0, 255),
            circle_position: Pos2::new(150.0, 150.0),
            circle_radius: 50.0,
            circle_fill: Color32::from_rgb(255, 0, 0),
            triangle_position: Pos2::new(120.0, 120.0),
            triangle_size: Vec2::new(100.0, 100.0),
            triangle_fill: Color32::from_rgb(0, 128, 0),
            export_file_name: "edited-image.png".to_owned(),
        }
    }
}

/// Remote photo search settings. The access key is configured out of process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    #[serde(skip)]
    pub access_key: Option<String>,
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SEARCH_ENDPOINT.to_owned(),
            access_key: None,
            page_size: 8,
        }
    }
}

impl SearchConfig {
    /// Reads the credential and an optional endpoint override from the environment.
    ///
    /// On wasm there is no process environment, so the key has to be baked in at
    /// build time through the same variable name.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        #[cfg(not(target_arch = "wasm32"))]
        {
            config.access_key = std::env::var(ACCESS_KEY_ENV).ok().filter(|k| !k.is_empty());
            if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
                if !endpoint.is_empty() {
                    config.endpoint = endpoint;
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            config.access_key = option_env!("UNSPLASH_ACCESS_KEY").map(str::to_owned);
        }

        config
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub canvas: CanvasConfig,
    pub search: SearchConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            search: SearchConfig::from_env(),
        }
    }
}
