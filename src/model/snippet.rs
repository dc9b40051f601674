//! Pre-approved correction snippets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a rendered snippet is inserted into the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertionPoint {
    /// Insert at the very start of the document.
    Prepend,
    /// Insert at the very end of the document.
    Append,
    /// Insert under a named section header, replacing its body.
    Section,
}

/// A pre-approved correction template for a specific `(module_id, gate_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// Stable identifier, unique across the catalogue.
    pub snippet_id: String,
    /// Module this snippet corrects.
    pub module_id: String,
    /// Gate this snippet corrects.
    pub gate_id: String,
    /// Application order; lower values apply first.
    pub priority: i32,
    /// Where the rendered snippet is inserted.
    pub insertion_point: InsertionPoint,
    /// Header text to match/insert under. Required when
    /// `insertion_point == Section`.
    pub section_header: Option<String>,
    /// Template text with `{variable}` placeholders.
    pub template: String,
    /// Default values for placeholders not supplied by the finding.
    pub defaults: BTreeMap<String, String>,
    /// Citation backing this correction's legal basis.
    pub legal_source: String,
}

impl Snippet {
    /// Renders the template, filling `{name}` placeholders first from
    /// `vars`, then from `defaults`.
    ///
    /// # Errors
    ///
    /// Returns the name of the first placeholder with neither a supplied
    /// value nor a default.
    pub fn render(&self, vars: &BTreeMap<String, String>) -> Result<String, String> {
        let mut out = String::with_capacity(self.template.len());
        let bytes = self.template.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'{' {
                if let Some(close) = self.template[i..].find('}') {
                    let name = &self.template[i + 1..i + close];
                    let value = vars
                        .get(name)
                        .or_else(|| self.defaults.get(name))
                        .ok_or_else(|| name.to_string())?;
                    out.push_str(value);
                    i += close + 1;
                    continue;
                }
            }
            // Advance by one full char, not one byte, to stay UTF-8 safe.
            let ch = self.template[i..].chars().next().unwrap_or('\u{0}');
            out.push(ch);
            i += ch.len_utf8();
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet() -> Snippet {
        Snippet {
            snippet_id: "fca_risk_warning".to_string(),
            module_id: "fca_uk".to_string(),
            gate_id: "risk_warning".to_string(),
            priority: 10,
            insertion_point: InsertionPoint::Append,
            section_header: None,
            template: "Capital at risk. {provider_name} is not guaranteeing returns.".to_string(),
            defaults: BTreeMap::from([("provider_name".to_string(), "The provider".to_string())]),
            legal_source: "FCA COBS 4.2.1".to_string(),
        }
    }

    #[test]
    fn test_render_uses_supplied_variable() {
        let snippet = snippet();
        let vars = BTreeMap::from([("provider_name".to_string(), "Acme Capital".to_string())]);
        let rendered = snippet.render(&vars).unwrap();
        assert_eq!(
            rendered,
            "Capital at risk. Acme Capital is not guaranteeing returns."
        );
    }

    #[test]
    fn test_render_falls_back_to_default() {
        let snippet = snippet();
        let rendered = snippet.render(&BTreeMap::new()).unwrap();
        assert!(rendered.contains("The provider"));
    }

    #[test]
    fn test_render_unresolved_variable_errors() {
        let mut snippet = snippet();
        snippet.defaults.clear();
        let err = snippet.render(&BTreeMap::new()).unwrap_err();
        assert_eq!(err, "provider_name");
    }

    #[test]
    fn test_render_identical_inputs_byte_identical() {
        let snippet = snippet();
        let vars = BTreeMap::from([("provider_name".to_string(), "Acme".to_string())]);
        let a = snippet.render(&vars).unwrap();
        let b = snippet.render(&vars).unwrap();
        assert_eq!(a, b);
    }
}
