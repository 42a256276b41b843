//! Per-property value checks for CSS++ declarations.
//!
//! Validation always walks the entire sheet. Errors are collected, never
//! raised one at a time; [`Diagnostics::into_result`] turns them into a single
//! aggregated failure.

use crate::ast::{Declaration, Rule, Stylesheet};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::properties::CssppProperty;

/// Upper bound on `polygon(N)`; the lowered `clip-path` grows with N.
pub const MAX_POLYGON_SIDES: usize = 1000;

#[derive(Debug, Default)]
pub struct Validator {
    diagnostics: Diagnostics,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, stylesheet: &Stylesheet) -> Diagnostics {
        for rule in stylesheet {
            for decl in rule.declarations.iter().filter(|d| d.is_csspp) {
                self.check(rule, decl);
            }
        }
        self.diagnostics
    }

    fn check(&mut self, rule: &Rule, decl: &Declaration) {
        let value = decl.value.trim();
        let Some(property) = CssppProperty::from_name(&decl.property) else {
            self.error(
                rule,
                decl,
                format!("Unrecognized CSS++ property '{}'", decl.property),
            );
            return;
        };

        match property {
            CssppProperty::Depth => {
                if !is_depth(value) {
                    self.error(rule, decl, format!("Invalid depth value '{}'", value));
                }
            }
            CssppProperty::LightIntensity => {
                let ok = matches!(value, "ambient" | "directional")
                    || parse_unit_interval(value).is_some();
                if !ok {
                    self.warning(
                        rule,
                        decl,
                        format!(
                            "light-intensity '{}' should be a number in [0,1], \
                             'ambient' or 'directional'",
                            value
                        ),
                    );
                }
            }
            CssppProperty::Shape => {
                if parse_shape(value).is_some() {
                    return;
                }
                let message = match polygon_sides(value) {
                    Some(sides) if sides > MAX_POLYGON_SIDES => format!(
                        "polygon side count {} exceeds {}",
                        sides, MAX_POLYGON_SIDES
                    ),
                    _ => format!("Invalid shape value '{}'", value),
                };
                self.error(rule, decl, message);
            }
            CssppProperty::ShadowType => {
                if !matches!(value, "soft" | "hard" | "contact") {
                    self.error(rule, decl, format!("Invalid shadow-type value '{}'", value));
                }
            }
            p if p.is_audio() => {
                if unquote(value).is_empty() {
                    self.error(rule, decl, format!("{} requires a sound file", decl.property));
                }
            }
            p if p.is_unit_interval() => {
                if parse_unit_interval(value).is_none() {
                    self.warning(
                        rule,
                        decl,
                        format!("{} '{}' should be a number in [0,1]", decl.property, value),
                    );
                }
            }
            _ => {}
        }
    }

    fn error(&mut self, rule: &Rule, decl: &Declaration, message: String) {
        self.diagnostics.push(
            Diagnostic::error(message)
                .with_location(&rule.selector, &decl.property)
                .at(decl.span),
        );
    }

    fn warning(&mut self, rule: &Rule, decl: &Declaration, message: String) {
        self.diagnostics.push(
            Diagnostic::warning(message)
                .with_location(&rule.selector, &decl.property)
                .at(decl.span),
        );
    }
}

/// `<number>rem` or the literal `3d`.
pub(crate) fn is_depth(value: &str) -> bool {
    value == "3d" || parse_rem(value).is_some()
}

pub(crate) fn parse_rem(value: &str) -> Option<f64> {
    let number = value.strip_suffix("rem")?;
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    number.parse::<f64>().ok()
}

pub(crate) fn parse_decimal(value: &str) -> Option<f64> {
    let valid = !value.is_empty()
        && value
            .chars()
            .enumerate()
            .all(|(i, c)| c.is_ascii_digit() || c == '.' || (i == 0 && c == '-'));
    if !valid {
        return None;
    }
    value.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_unit_interval(value: &str) -> Option<f64> {
    parse_decimal(value).filter(|v| (0.0..=1.0).contains(v))
}

#[derive(Debug, PartialEq)]
pub(crate) enum Shape<'a> {
    Circle,
    RoundedRect(&'a str),
    Polygon(usize),
}

pub(crate) fn parse_shape(value: &str) -> Option<Shape<'_>> {
    if value == "circle" {
        return Some(Shape::Circle);
    }
    if let Some(radius) = function_arg(value, "rounded-rect") {
        return (!radius.is_empty()).then_some(Shape::RoundedRect(radius));
    }
    let sides = polygon_sides(value)?;
    (3..=MAX_POLYGON_SIDES)
        .contains(&sides)
        .then_some(Shape::Polygon(sides))
}

fn polygon_sides(value: &str) -> Option<usize> {
    function_arg(value, "polygon")?.parse().ok()
}

/// The trimmed argument of `name(...)`, if `value` is that call.
pub(crate) fn function_arg<'a>(value: &'a str, name: &str) -> Option<&'a str> {
    value
        .strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

/// Strips one layer of matching surrounding quotes.
pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    for q in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(q) && value.ends_with(q) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Span;

    fn sheet(decls: &[(&str, &str, &str)]) -> Stylesheet {
        Stylesheet {
            rules: decls
                .iter()
                .map(|(sel, prop, val)| Rule {
                    selector: sel.to_string(),
                    declarations: vec![Declaration::new(*prop, *val, Span::dummy())],
                    span: Span::dummy(),
                })
                .collect(),
            imports: Vec::new(),
        }
    }

    #[test]
    fn depth_accepts_rem_and_3d() {
        let diags = Validator::new().validate(&sheet(&[
            (".a", "depth", "0.5rem"),
            (".b", "depth", "3d"),
            (".c", "depth", "2rem"),
        ]));
        assert_eq!(diags.error_count(), 0);
    }

    #[test]
    fn two_invalid_depths_report_two_errors() {
        let diags = Validator::new().validate(&sheet(&[
            (".a", "depth", "10px"),
            (".b", "depth", "deep"),
        ]));
        assert_eq!(diags.error_count(), 2);
        let messages: Vec<_> = diags.errors().map(|d| d.message.clone()).collect();
        assert!(messages[0].starts_with("Invalid depth value"));
        assert_eq!(diags.errors().nth(1).unwrap().selector.as_deref(), Some(".b"));
    }

    #[test]
    fn light_intensity_out_of_range_only_warns() {
        let diags = Validator::new().validate(&sheet(&[
            (".a", "light-intensity", "1.5"),
            (".b", "light-intensity", "ambient"),
            (".c", "light-intensity", "0.3"),
        ]));
        assert_eq!(diags.error_count(), 0);
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn shape_grammar() {
        assert_eq!(parse_shape("circle"), Some(Shape::Circle));
        assert_eq!(parse_shape("rounded-rect(8px)"), Some(Shape::RoundedRect("8px")));
        assert_eq!(parse_shape("polygon( 6 )"), Some(Shape::Polygon(6)));
        assert_eq!(parse_shape("polygon(2)"), None);
        assert_eq!(parse_shape("polygon(1000)"), Some(Shape::Polygon(1000)));
        assert_eq!(parse_shape("polygon(1001)"), None);
        assert_eq!(parse_shape("blob"), None);

        let diags = Validator::new().validate(&sheet(&[(".a", "shape", "hexagon")]));
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn oversized_polygon_is_rejected() {
        let diags = Validator::new().validate(&sheet(&[
            (".a", "shape", "polygon(100000000)"),
            (".b", "shape", "polygon(1000)"),
        ]));
        assert_eq!(diags.error_count(), 1);
        let error = diags.errors().next().unwrap();
        assert_eq!(error.selector.as_deref(), Some(".a"));
        assert_eq!(error.message, "polygon side count 100000000 exceeds 1000");
    }

    #[test]
    fn empty_sound_is_an_error() {
        let diags = Validator::new().validate(&sheet(&[
            (".a", "hover-sfx", "\"\""),
            (".b", "click-sfx", "\"click.mp3\""),
        ]));
        assert_eq!(diags.error_count(), 1);
    }

    #[test]
    fn passthrough_declarations_are_ignored() {
        let diags = Validator::new().validate(&sheet(&[(".a", "width", "lots")]));
        assert_eq!(diags.iter().count(), 0);
    }

    #[test]
    fn misclassified_property_is_fatal() {
        let mut stylesheet = sheet(&[(".a", "sparkle", "yes")]);
        stylesheet.rules[0].declarations[0].is_csspp = true;
        let diags = Validator::new().validate(&stylesheet);
        assert_eq!(diags.error_count(), 1);
        assert!(diags.errors().next().unwrap().message.contains("sparkle"));
    }
}
