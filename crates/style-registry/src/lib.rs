//! Content-hashed style registration.
//!
//! [`StyleSheet::css`] and [`StyleSheet::keyframes`] turn a style template
//! into a generated name and append the matching rule to a shared sheet.
//! Registering the same content twice returns the same name and leaves the
//! sheet unchanged.
//!
//! # Example
//!
//! ```
//! use style_registry::StyleSheet;
//!
//! let sheet = StyleSheet::new();
//! let color = "red";
//! let class = sheet.css(&["color: ", ";"], &[color]);
//! assert_eq!(sheet.css(&["color: ", ";"], &[color]), class);
//! assert_eq!(sheet.rule_count(), 1);
//! ```

mod hash;

pub use hash::{class_name, content_hash, to_base36};

use rustc_hash::FxHashSet;
use std::fmt::Display;
use std::sync::{Mutex, OnceLock, PoisonError};

#[derive(Debug, Default)]
struct SheetState {
    text: String,
    names: FxHashSet<String>,
}

/// A style sheet shared by every registration made through it.
#[derive(Debug, Default)]
pub struct StyleSheet {
    state: Mutex<SheetState>,
}

/// Joins template parts with the interpolated values between them.
///
/// Missing values are treated as empty.
pub fn interpolate<V: Display>(parts: &[&str], values: &[V]) -> String {
    let mut text = String::new();
    for (i, part) in parts.iter().enumerate() {
        text.push_str(part);
        if let Some(value) = values.get(i) {
            text.push_str(&value.to_string());
        }
    }
    text
}

impl StyleSheet {
    /// Creates an empty sheet.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide sheet.
    pub fn global() -> &'static StyleSheet {
        static GLOBAL: OnceLock<StyleSheet> = OnceLock::new();
        GLOBAL.get_or_init(StyleSheet::new)
    }

    /// Registers a class and returns its generated name.
    ///
    /// Every `&` in the template is replaced by the class selector.
    pub fn css<V: Display>(&self, parts: &[&str], values: &[V]) -> String {
        let text = interpolate(parts, values);
        let name = class_name(&text);
        let body = text.replace('&', &format!(".{}", name));
        self.insert(&name, || format!(".{}{{{}}}\n", name, body));
        name
    }

    /// Registers a keyframes animation and returns its generated name.
    pub fn keyframes<V: Display>(&self, parts: &[&str], values: &[V]) -> String {
        let text = interpolate(parts, values);
        let name = format!("k{}", class_name(&text));
        self.insert(&name, || format!("@keyframes {}{{{}}}\n", name, text));
        name
    }

    fn insert(&self, name: &str, rule: impl FnOnce() -> String) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.names.contains(name) {
            return;
        }
        let rule = rule();
        log::debug!("registered style rule `{}`", name);
        state.text.push_str(&rule);
        state.names.insert(name.to_string());
    }

    /// The sheet's current text.
    pub fn text(&self) -> String {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .text
            .clone()
    }

    /// Number of rules in the sheet.
    pub fn rule_count(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::thread;

    const NO_VALUES: &[&str] = &[];

    #[test]
    fn test_css_rule() {
        let sheet = StyleSheet::new();
        let name = sheet.css(&["color: red;"], NO_VALUES);
        assert_eq!(name, "c34gjkj");
        assert_eq!(sheet.text(), ".c34gjkj{color: red;}\n");
    }

    #[test]
    fn test_ampersand_is_replaced() {
        let sheet = StyleSheet::new();
        let name = sheet.css(&["& { color: red; }"], NO_VALUES);
        assert_eq!(name, "cbby6gf");
        assert_eq!(sheet.text(), ".cbby6gf{.cbby6gf { color: red; }}\n");
    }

    #[test]
    fn test_interpolation() {
        assert_eq!(interpolate(&["a", "b", "c"], &[1, 2]), "a1b2c");
        assert_eq!(interpolate(&["a", "b"], &[1, 2, 3]), "a1b2");
        let sheet = StyleSheet::new();
        assert_eq!(
            sheet.css(&["color: ", ";"], &["red"]),
            sheet.css(&["color: red;"], NO_VALUES)
        );
    }

    #[test]
    fn test_keyframes() {
        let sheet = StyleSheet::new();
        let name = sheet.keyframes(&["from{opacity:0}to{opacity:", "}"], &[1]);
        assert_eq!(name, "kc6851am");
        assert_eq!(
            sheet.text(),
            "@keyframes kc6851am{from{opacity:0}to{opacity:1}}\n"
        );
    }

    #[test]
    fn test_registration_is_idempotent() {
        let sheet = StyleSheet::new();
        let a = sheet.css(&["margin: 0;"], NO_VALUES);
        let b = sheet.css(&["margin: 0;"], NO_VALUES);
        let k1 = sheet.keyframes(&["margin: 0;"], NO_VALUES);
        let k2 = sheet.keyframes(&["margin: 0;"], NO_VALUES);
        assert_eq!(a, b);
        assert_eq!(k1, k2);
        assert_eq!(k1, format!("k{}", a));
        assert_eq!(sheet.rule_count(), 2);
    }

    #[test]
    fn test_concurrent_registration() {
        let sheet = Arc::new(StyleSheet::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sheet = sheet.clone();
                thread::spawn(move || sheet.css(&["padding: ", "px;"], &[4]))
            })
            .collect();
        let names: FxHashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(names.len(), 1);
        assert_eq!(sheet.rule_count(), 1);
    }

    #[test]
    fn test_global_sheet_is_shared() {
        let first = StyleSheet::global().css(&["display: grid;"], NO_VALUES);
        let second = StyleSheet::global().css(&["display: grid;"], NO_VALUES);
        assert_eq!(first, second);
        assert!(StyleSheet::global().text().contains(&first));
    }
}
