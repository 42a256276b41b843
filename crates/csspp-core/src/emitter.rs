use crate::ast::{Declaration, Rule, Stylesheet};

pub const BANNER: &str = "/* Generated by csspp - do not edit */";

pub fn emit_css(stylesheet: &Stylesheet, banner: bool) -> String {
    let mut out = String::new();

    if banner {
        out.push_str(BANNER);
        out.push_str("\n\n");
    }
    for rule in stylesheet {
        emit_rule(rule, &mut out);
        out.push('\n');
    }
    out
}

fn emit_rule(rule: &Rule, out: &mut String) {
    out.push_str(&rule.selector);
    out.push_str(" {\n");

    for decl in &rule.declarations {
        emit_declaration(decl, out);
    }
    out.push_str("}\n");
}

fn emit_declaration(decl: &Declaration, out: &mut String) {
    out.push_str("  ");
    out.push_str(&decl.property);
    out.push_str(": ");
    out.push_str(&decl.value);
    out.push_str(";\n");
}
