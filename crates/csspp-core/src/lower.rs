//! Lowering of CSS++ declarations.
//!
//! Every CSS++ declaration becomes either a list of standard CSS
//! declarations or a single asset binding, never both. Passthrough CSS is
//! left untouched. The CLI and the build adapter both go through this table.

use std::f64::consts::PI;

use crate::assets::{AssetKind, AssetMap};
use crate::ast::{Declaration, Stylesheet};
use crate::diagnostic::Diagnostic;
use crate::error::{Error, Result};
use crate::properties::CssppProperty;
use crate::validator::{parse_decimal, parse_rem, parse_shape, unquote, Shape};

const SOFT_SHADOW: &str = "0 4px 12px rgba(0,0,0,.15)";
const HARD_SHADOW: &str = "0 2px 4px rgba(0,0,0,.3)";
const CONTACT_SHADOW: &str = "0 1px 2px rgba(0,0,0,.2)";
const BRUSHED_METAL: &str =
    "linear-gradient(135deg, #b8b8b8 0%, #e8e8e8 25%, #a0a0a0 50%, #e8e8e8 75%, #b8b8b8 100%)";

#[derive(Debug, PartialEq)]
pub enum Lowered {
    Css(Vec<Declaration>),
    Asset {
        kind: AssetKind,
        property: String,
        value: String,
    },
}

/// Lowers a single CSS++ declaration. `selector` only feeds error messages.
pub fn lower(selector: &str, decl: &Declaration) -> Result<Lowered> {
    let property = CssppProperty::from_name(&decl.property)
        .ok_or_else(|| Error::classifier_invariant(selector, &decl.property))?;
    let value = decl.value.trim();
    let css = |prop: &str, val: String| Declaration::new(prop, val, decl.span);
    let invalid = |what: &str| Error::Validation {
        diagnostics: vec![Diagnostic::error(format!("Invalid {} value '{}'", what, value))
            .with_location(selector, &decl.property)
            .at(decl.span)],
    };

    let lowered = match property {
        CssppProperty::Shape => match parse_shape(value).ok_or_else(|| invalid("shape"))? {
            Shape::Circle => Lowered::Css(vec![css("border-radius", "50%".into())]),
            Shape::RoundedRect(radius) => Lowered::Css(vec![css("border-radius", radius.into())]),
            Shape::Polygon(sides) => Lowered::Css(vec![css("clip-path", polygon(sides))]),
        },
        CssppProperty::ShadowType => {
            let shadow = match value {
                "soft" => SOFT_SHADOW,
                "hard" => HARD_SHADOW,
                "contact" => CONTACT_SHADOW,
                _ => return Err(invalid("shadow-type")),
            };
            Lowered::Css(vec![css("box-shadow", shadow.into())])
        }
        CssppProperty::GlowColor => Lowered::Css(vec![
            css("box-shadow", format!("0 0 20px {}", value)),
            css("filter", "brightness(1.2)".into()),
        ]),
        CssppProperty::Depth => {
            if value == "3d" {
                Lowered::Css(vec![css("transform-style", "preserve-3d".into())])
            } else {
                let rem = parse_rem(value).ok_or_else(|| invalid("depth"))?;
                Lowered::Css(vec![css(
                    "box-shadow",
                    format!("0 {} {}rem rgba(0,0,0,.15)", value, format_number(rem * 2.0)),
                )])
            }
        }
        CssppProperty::Material => {
            if value.starts_with("brushed-metal") {
                Lowered::Css(vec![css("background", BRUSHED_METAL.into())])
            } else if value == "glass" {
                Lowered::Css(vec![
                    css("backdrop-filter", "blur(12px)".into()),
                    css("background", "rgba(255,255,255,.1)".into()),
                ])
            } else {
                asset(AssetKind::Material, decl, value)
            }
        }
        CssppProperty::PixelGrid => match value {
            "off" | "none" => Lowered::Css(Vec::new()),
            v if v.starts_with(|c: char| c.is_ascii_digit() || c == '.') => Lowered::Css(vec![
                css("image-rendering", "pixelated".into()),
                css("background-size", format!("{} {}", v, v)),
            ]),
            _ => Lowered::Css(vec![css("image-rendering", "pixelated".into())]),
        },
        CssppProperty::Curve => Lowered::Css(vec![css("transition-timing-function", value.into())]),
        CssppProperty::LightIntensity => match value {
            "ambient" | "directional" => Lowered::Css(vec![css("--light-mode", value.into())]),
            _ => {
                let intensity = parse_decimal(value)
                    .map(|v| format_number(v.clamp(0.0, 1.0)))
                    .unwrap_or_else(|| value.to_string());
                Lowered::Css(vec![css("--light-intensity", intensity)])
            }
        },
        CssppProperty::FogDensity => Lowered::Css(
            scaled(value)
                .map(|px| vec![css("backdrop-filter", format!("blur({}px)", px))])
                .unwrap_or_default(),
        ),
        CssppProperty::BloomStrength => Lowered::Css(
            scaled(value)
                .map(|px| vec![css("filter", format!("drop-shadow(0 0 {}px currentColor)", px))])
                .unwrap_or_default(),
        ),
        CssppProperty::Particle => Lowered::Css(vec![css("--particle", value.into())]),
        CssppProperty::FilmGrain => Lowered::Css(vec![css("--film-grain", value.into())]),
        CssppProperty::Texture => asset(AssetKind::Texture, decl, value),
        CssppProperty::Reflectivity | CssppProperty::Roughness | CssppProperty::Metallic => {
            asset(AssetKind::Material, decl, value)
        }
        CssppProperty::HoverSfx
        | CssppProperty::ClickSfx
        | CssppProperty::CursorMoveSfx
        | CssppProperty::AmbientSound => asset(AssetKind::Audio, decl, unquote(value)),
    };
    Ok(lowered)
}

fn asset(kind: AssetKind, decl: &Declaration, value: &str) -> Lowered {
    Lowered::Asset {
        kind,
        property: decl.property.trim().to_ascii_lowercase(),
        value: value.to_string(),
    }
}

/// `clip-path` polygon with `sides` vertices on the unit circle, starting
/// at the top and going clockwise.
pub fn polygon(sides: usize) -> String {
    let points: Vec<String> = (0..sides)
        .map(|i| {
            let theta = i as f64 * 2.0 * PI / sides as f64 - PI / 2.0;
            let x = (50.0 + 50.0 * theta.cos()).clamp(0.0, 100.0);
            let y = (50.0 + 50.0 * theta.sin()).clamp(0.0, 100.0);
            format!("{:.2}% {:.2}%", x, y)
        })
        .collect();
    format!("polygon({})", points.join(", "))
}

/// Maps a `[0,1]` strength onto `0..=10` pixels.
fn scaled(value: &str) -> Option<String> {
    parse_decimal(value).map(|v| {
        // drop float noise from the multiplication (0.3 * 10 = 3.0000000000000004)
        let px = (v.clamp(0.0, 1.0) * 10.0 * 1e9).round() / 1e9;
        format_number(px)
    })
}

/// Shortest `Display` form: `1.0` prints as `1`, `0.666` stays `0.666`.
fn format_number(value: f64) -> String {
    // normalizes -0.0
    format!("{}", value + 0.0)
}

/// Rewrites a sheet in place, collecting asset bindings.
///
/// A fresh transformer is used per compilation; nothing here is shared.
#[derive(Debug, Default)]
pub struct Transformer {
    assets: AssetMap,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transform(mut self, stylesheet: &mut Stylesheet) -> Result<AssetMap> {
        for rule in stylesheet {
            let mut lowered = Vec::with_capacity(rule.declarations.len());
            for decl in rule.declarations.drain(..) {
                if !decl.is_csspp {
                    lowered.push(decl);
                    continue;
                }
                match lower(&rule.selector, &decl)? {
                    Lowered::Css(decls) => lowered.extend(decls),
                    Lowered::Asset {
                        kind,
                        property,
                        value,
                    } => self.assets.insert(kind, rule.selector.as_str(), property, value),
                }
            }
            rule.declarations = lowered;
        }
        Ok(self.assets)
    }
}
