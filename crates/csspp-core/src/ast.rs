use crate::error::Span;
use crate::properties;

#[derive(Debug, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
    /// `@import` targets seen during preprocessing. Recorded, not inlined.
    pub imports: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub selector: String,
    pub declarations: Vec<Declaration>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
    pub is_csspp: bool,
    pub span: Span,
}

impl Declaration {
    /// Builds a declaration, classifying it from the property name alone.
    pub fn new(property: impl Into<String>, value: impl Into<String>, span: Span) -> Self {
        let property = property.into();
        let is_csspp = properties::is_csspp(&property);
        Self {
            property,
            value: value.into(),
            is_csspp,
            span,
        }
    }
}

/// A parsed `@theme` block. Only lives for the duration of expansion.
#[derive(Debug)]
pub struct ThemeDefinition {
    pub name: String,
    pub variables: Vec<(String, String)>,
}

impl<'a> IntoIterator for &'a Stylesheet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a mut Stylesheet {
    type Item = &'a mut Rule;
    type IntoIter = std::slice::IterMut<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter_mut()
    }
}
