//! Logical UI targets and the conditions placed on them

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capability::StrategyKind;

/// What a resolved element must satisfy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// Attached to the DOM.
    Present,
    /// Attached and displayed.
    #[default]
    Visible,
    /// Displayed and enabled.
    Clickable,
}

/// Whether a failed interaction fails the step or is logged and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    Required,
    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub kind: StrategyKind,
    pub selector: String,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind.as_str(), self.selector)
    }
}

/// Ordered fallback list of ways to find one logical control.
///
/// ```
/// use pmcheck_e2e::LocatorSpec;
///
/// let trigger = LocatorSpec::xpath("//label[contains(text(), 'Project Manager')]")
///     .or_id("project-manager-select");
/// assert_eq!(trigger.strategies().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorSpec {
    strategies: Vec<Strategy>,
}

impl LocatorSpec {
    pub fn new(kind: StrategyKind, selector: impl Into<String>) -> Self {
        Self {
            strategies: vec![Strategy {
                kind,
                selector: selector.into(),
            }],
        }
    }

    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(StrategyKind::Id, selector)
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(StrategyKind::Css, selector)
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(StrategyKind::XPath, selector)
    }

    pub fn link_text(text: impl Into<String>) -> Self {
        Self::new(StrategyKind::LinkText, text)
    }

    pub fn script_click(selector: impl Into<String>) -> Self {
        Self::new(StrategyKind::ScriptClick, selector)
    }

    /// Append a fallback strategy, tried after every existing one.
    pub fn or(mut self, kind: StrategyKind, selector: impl Into<String>) -> Self {
        self.strategies.push(Strategy {
            kind,
            selector: selector.into(),
        });
        self
    }

    pub fn or_id(self, selector: impl Into<String>) -> Self {
        self.or(StrategyKind::Id, selector)
    }

    pub fn or_css(self, selector: impl Into<String>) -> Self {
        self.or(StrategyKind::Css, selector)
    }

    pub fn or_xpath(self, selector: impl Into<String>) -> Self {
        self.or(StrategyKind::XPath, selector)
    }

    pub fn or_link_text(self, text: impl Into<String>) -> Self {
        self.or(StrategyKind::LinkText, text)
    }

    pub fn or_script_click(self, selector: impl Into<String>) -> Self {
        self.or(StrategyKind::ScriptClick, selector)
    }

    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, strategy) in self.strategies.iter().enumerate() {
            if i > 0 {
                f.write_str(" | ")?;
            }
            write!(f, "{}", strategy)?;
        }
        Ok(())
    }
}

/// Quote arbitrary text as an XPath string literal.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// XPath matching any element whose own text contains `text`.
pub fn text_xpath(text: &str) -> String {
    format!("//*[contains(text(), {})]", xpath_literal(text))
}
