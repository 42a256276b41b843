//! The CSS++ property vocabulary and the declaration classifier.
//!
//! Classification looks only at the property name. Values never decide
//! whether a declaration is CSS++.

/// Every property name the classifier treats as CSS++.
pub const CSSPP_PROPERTIES: &[&str] = &[
    "shape",
    "pixel-grid",
    "depth",
    "curve",
    "light-intensity",
    "shadow-type",
    "reflectivity",
    "glow-color",
    "fog-density",
    "particle",
    "bloom-strength",
    "film-grain",
    "material",
    "texture",
    "roughness",
    "metallic",
    "hover-sfx",
    "click-sfx",
    "cursor-move-sfx",
    "ambient-sound",
];

pub fn is_csspp(property: &str) -> bool {
    let name = property.trim().to_ascii_lowercase();
    CSSPP_PROPERTIES.contains(&name.as_str())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CssppProperty {
    Shape,
    PixelGrid,
    Depth,
    Curve,
    LightIntensity,
    ShadowType,
    Reflectivity,
    GlowColor,
    FogDensity,
    Particle,
    BloomStrength,
    FilmGrain,
    Material,
    Texture,
    Roughness,
    Metallic,
    HoverSfx,
    ClickSfx,
    CursorMoveSfx,
    AmbientSound,
}

impl CssppProperty {
    pub fn from_name(name: &str) -> Option<Self> {
        let prop = match name.trim().to_ascii_lowercase().as_str() {
            "shape" => Self::Shape,
            "pixel-grid" => Self::PixelGrid,
            "depth" => Self::Depth,
            "curve" => Self::Curve,
            "light-intensity" => Self::LightIntensity,
            "shadow-type" => Self::ShadowType,
            "reflectivity" => Self::Reflectivity,
            "glow-color" => Self::GlowColor,
            "fog-density" => Self::FogDensity,
            "particle" => Self::Particle,
            "bloom-strength" => Self::BloomStrength,
            "film-grain" => Self::FilmGrain,
            "material" => Self::Material,
            "texture" => Self::Texture,
            "roughness" => Self::Roughness,
            "metallic" => Self::Metallic,
            "hover-sfx" => Self::HoverSfx,
            "click-sfx" => Self::ClickSfx,
            "cursor-move-sfx" => Self::CursorMoveSfx,
            "ambient-sound" => Self::AmbientSound,
            _ => return None,
        };
        Some(prop)
    }

    pub fn is_audio(self) -> bool {
        matches!(
            self,
            Self::HoverSfx | Self::ClickSfx | Self::CursorMoveSfx | Self::AmbientSound
        )
    }

    /// Properties whose value is a decimal expected in `[0,1]`.
    pub fn is_unit_interval(self) -> bool {
        matches!(
            self,
            Self::Reflectivity
                | Self::Roughness
                | Self::Metallic
                | Self::FogDensity
                | Self::BloomStrength
        )
    }
}
