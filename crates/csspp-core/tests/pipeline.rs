use std::fs;
use std::path::PathBuf;

use csspp_core::parser;
use csspp_core::properties::CSSPP_PROPERTIES;
use csspp_core::{compile, Error};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    fs::read_to_string(&path).expect("read fixture")
}

fn squash(css: &str) -> String {
    css.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[test]
fn card_end_to_end() {
    let out = compile(&fixture("card.csspp")).expect("compile");

    assert!(squash(&out.css)
        .contains(".card { border-radius: 50%; box-shadow: 0 0.5rem 1rem rgba(0,0,0,.15); }"));
    assert!(!out.css.contains("hover-sfx"));

    let ir: serde_json::Value = serde_json::from_str(&out.ir_json().unwrap()).unwrap();
    assert_eq!(ir["assets"]["audio"][".card"]["hover-sfx"], "click.mp3");
    assert_eq!(ir["metadata"]["rules"], 1);
    assert_eq!(ir["metadata"]["errors"], 0);
}

#[test]
fn audio_only_sheet_is_fully_extracted() {
    let out = compile(&fixture("audio.csspp")).expect("compile");

    for prop in ["hover-sfx", "click-sfx", "cursor-move-sfx", "ambient-sound"] {
        assert_eq!(out.css.matches(prop).count(), 0, "{} leaked into CSS", prop);
    }

    let audio = &out.assets.audio;
    assert_eq!(audio.len(), 4);
    assert_eq!(audio[".button"].len(), 2);
    assert_eq!(audio[".canvas"]["cursor-move-sfx"], "whoosh.ogg");
    assert_eq!(audio["body"]["ambient-sound"], "rain-loop.ogg");
    assert_eq!(audio[".button:active"]["click-sfx"], "press.mp3");
    assert!(out.css.contains("margin: 0;"));
}

#[test]
fn theme_is_scoped_to_its_root_rule() {
    let out = compile("@theme dark { bg: #000; }\n.a { color: red; }").expect("compile");
    assert!(squash(&out.css).contains(":root[data-theme=\"dark\"] { --theme-bg: #000; }"));

    let reparsed = parser::parse(&out.css).unwrap().stylesheet;
    for rule in &reparsed {
        let defines_bg = rule.declarations.iter().any(|d| d.property == "--theme-bg");
        assert_eq!(defines_bg, rule.selector == ":root[data-theme=\"dark\"]");
    }
}

#[test]
fn theme_fixture_keeps_rule_order() {
    let out = compile(&fixture("theme.csspp")).expect("compile");
    let root = out.css.find(":root[data-theme=\"dark\"]").unwrap();
    let panel = out.css.find(".panel").unwrap();
    assert!(root < panel);
    assert!(out.css.contains("--theme-fg: #eee;"));
    assert!(out.css.contains("background: var(--theme-bg);"));
}

#[test]
fn invalid_depths_abort_with_every_error() {
    let err = compile(&fixture("invalid_depth.csspp")).unwrap_err();
    match err {
        Error::Validation { diagnostics } => {
            assert_eq!(diagnostics.len(), 2);
            assert_eq!(diagnostics[0].selector.as_deref(), Some(".a"));
            assert_eq!(diagnostics[1].selector.as_deref(), Some(".b"));
            assert_eq!(diagnostics[1].span.map(|s| s.line), Some(7));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn huge_polygon_fails_fast() {
    match compile(".a { shape: polygon(100000000); }").unwrap_err() {
        Error::Validation { diagnostics } => {
            assert_eq!(diagnostics.len(), 1);
            assert!(diagnostics[0].message.contains("exceeds 1000"));
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[test]
fn long_decimals_keep_their_precision() {
    let out = compile(".a { depth: 0.333rem; light-intensity: 0.333; }").expect("compile");
    let css = squash(&out.css);
    assert!(css.contains("box-shadow: 0 0.333rem 0.666rem rgba(0,0,0,.15);"));
    assert!(css.contains("--light-intensity: 0.333;"));
}

#[test]
fn lowering_is_idempotent() {
    let first = compile(&fixture("showcase.csspp")).expect("first compile");
    let second = compile(&first.css).expect("second compile");

    assert_eq!(first.css, second.css);
    assert!(second.assets.is_empty());
    assert!(second.warnings.is_empty());

    let reparsed = parser::parse(&first.css).unwrap().stylesheet;
    for rule in &reparsed {
        for decl in &rule.declarations {
            assert!(
                !CSSPP_PROPERTIES.contains(&decl.property.as_str()),
                "{} survived lowering",
                decl.property
            );
        }
    }
}

#[test]
fn showcase_lowers_every_family() {
    let out = compile(&fixture("showcase.csspp")).expect("compile");
    let css = squash(&out.css);

    assert!(css.contains(
        "clip-path: polygon(50.00% 0.00%, 93.30% 25.00%, 93.30% 75.00%, \
         50.00% 100.00%, 6.70% 75.00%, 6.70% 25.00%);"
    ));
    assert!(css.contains("box-shadow: 0 0.75rem 1.5rem rgba(0,0,0,.15);"));
    assert!(css.contains("box-shadow: 0 0 20px var(--theme-accent); filter: brightness(1.2);"));
    assert!(css.contains("background: url(data:image/png;base64,iVBORw0KGgo=);"));
    assert!(css.contains("background: linear-gradient(135deg"));
    assert!(css.contains("transform-style: preserve-3d;"));
    assert!(css.contains("backdrop-filter: blur(2px);"));
    assert!(css.contains(
        "a:hover, a:focus-visible { border-radius: 50%; box-shadow: 0 1px 2px rgba(0,0,0,.2); }"
    ));
    assert!(css.contains(
        ":root[data-theme=\"neon\"] { --theme-accent: #0ff; --theme-glow: 0 0 8px #0ff; }"
    ));

    assert_eq!(out.assets.audio[".tile"]["hover-sfx"], "tile-hover.wav");
    assert_eq!(out.assets.audio["a:hover, a:focus-visible"]["click-sfx"], "tap.wav");
    assert_eq!(out.assets.materials[".plate"]["reflectivity"], "0.8");
    assert_eq!(out.assets.textures[".plate"]["texture"], "url(\"steel.png\")");
    assert_eq!(out.metadata.rules, 5);
}

#[test]
fn syntax_errors_are_reported_not_truncated() {
    let err = compile(".a { color: red;\n.b { depth: 1rem; }").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
}
