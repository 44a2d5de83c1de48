//! Header cleaning and number-column classification.

use std::collections::HashMap;

use regex::Regex;

/// Header-name prefixes whose numbered columns hold drawn numbers
pub const DEFAULT_NUMBER_FAMILIES: [&str; 3] = ["Bola", "Trevo", "Coluna"];

/// Cleaned header row
///
/// Blank headers are `None` (their column is skipped everywhere) and
/// repeated names get `_2`, `_3`, ... from the second occurrence on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    names: Vec<Option<String>>,
}

impl HeaderSet {
    /// Clean a raw header row
    pub fn clean<S: AsRef<str>>(raw: &[Option<S>]) -> Self {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut names = Vec::with_capacity(raw.len());

        for header in raw {
            let trimmed = header.as_ref().map(|h| h.as_ref().trim());
            let name = match trimmed {
                Some(h) if !h.is_empty() => h,
                _ => {
                    names.push(None);
                    continue;
                }
            };

            let count = seen.entry(name.to_string()).or_insert(0);
            *count += 1;
            if *count == 1 {
                names.push(Some(name.to_string()));
            } else {
                names.push(Some(format!("{}_{}", name, count)));
            }
        }

        Self { names }
    }

    /// Header names by column position
    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    /// Number of columns covered by the header row
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether there are no columns
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate the present header names in column order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().filter_map(|h| h.as_deref())
    }
}

/// Cut trailing columns after the last non-blank header
///
/// At least the first column is kept, even when every header is blank.
pub fn trim_trailing_blank<S: AsRef<str>>(raw: &[Option<S>]) -> &[Option<S>] {
    let last = raw
        .iter()
        .rposition(|h| matches!(h, Some(s) if !s.as_ref().trim().is_empty()))
        .unwrap_or(0);
    &raw[..(last + 1).min(raw.len())]
}

/// Matches number-column headers such as `Bola 1`, `bola01` or `Trevo2`
#[derive(Debug, Clone)]
pub struct NumberColumnMatcher {
    pattern: Option<Regex>,
}

impl Default for NumberColumnMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_NUMBER_FAMILIES)
    }
}

impl NumberColumnMatcher {
    /// Build a matcher for the given family prefixes (case-insensitive)
    pub fn new<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let alternatives: Vec<String> = families
            .into_iter()
            .map(|f| f.as_ref().trim().to_string())
            .filter(|f| !f.is_empty())
            .map(|f| regex::escape(&f))
            .collect();

        if alternatives.is_empty() {
            return Self { pattern: None };
        }

        let source = format!(r"(?i)^(?:{})\s*\d+$", alternatives.join("|"));
        // Every alternative is escaped, so the pattern always compiles
        let pattern = Regex::new(&source).ok();
        Self { pattern }
    }

    /// Whether a header name is a number column
    pub fn is_match(&self, header: &str) -> bool {
        self.pattern
            .as_ref()
            .is_some_and(|p| p.is_match(header.trim()))
    }

    /// Number columns among the headers, in header order
    pub fn classify(&self, headers: &HeaderSet) -> Vec<String> {
        headers
            .iter()
            .filter(|h| self.is_match(h))
            .map(|h| h.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(values: &[Option<&str>]) -> Vec<Option<String>> {
        values.iter().map(|v| v.map(|s| s.to_string())).collect()
    }

    #[test]
    fn test_duplicates_are_numbered() {
        let headers = HeaderSet::clean(&raw(&[Some("Bola 1"), Some("Bola 1"), Some("Bola 1")]));
        assert_eq!(
            headers.names(),
            &[
                Some("Bola 1".to_string()),
                Some("Bola 1_2".to_string()),
                Some("Bola 1_3".to_string())
            ]
        );
    }

    #[test]
    fn test_blank_headers_become_none() {
        let headers = HeaderSet::clean(&raw(&[Some(" Concurso "), None, Some("   "), Some("Bola1")]));
        assert_eq!(
            headers.names(),
            &[
                Some("Concurso".to_string()),
                None,
                None,
                Some("Bola1".to_string())
            ]
        );
        assert_eq!(headers.len(), 4);
        assert_eq!(headers.iter().collect::<Vec<_>>(), vec!["Concurso", "Bola1"]);
    }

    #[test]
    fn test_duplicates_compare_trimmed_names() {
        let headers = HeaderSet::clean(&raw(&[Some("Data"), Some(" Data")]));
        assert_eq!(headers.names()[1].as_deref(), Some("Data_2"));
    }

    #[test]
    fn test_trim_trailing_blank() {
        let headers = raw(&[Some("A"), None, Some("B"), Some(" "), None]);
        assert_eq!(trim_trailing_blank(&headers).len(), 3);

        let all_blank = raw(&[None, Some(""), None]);
        assert_eq!(trim_trailing_blank(&all_blank).len(), 1);

        let empty: Vec<Option<String>> = Vec::new();
        assert!(trim_trailing_blank(&empty).is_empty());
    }

    #[test]
    fn test_number_column_patterns() {
        let matcher = NumberColumnMatcher::default();

        assert!(matcher.is_match("Bola1"));
        assert!(matcher.is_match("Bola 1"));
        assert!(matcher.is_match("bola  15"));
        assert!(matcher.is_match("BOLA06"));
        assert!(matcher.is_match("Trevo 2"));
        assert!(matcher.is_match("Coluna 7"));

        assert!(!matcher.is_match("Bola"));
        assert!(!matcher.is_match("Bolas 1"));
        assert!(!matcher.is_match("Bola 1_2"));
        assert!(!matcher.is_match("Concurso"));
        assert!(!matcher.is_match("1 Bola"));
        assert!(!matcher.is_match("Rateio Bola 1"));
    }

    #[test]
    fn test_classify_keeps_header_order() {
        let headers = HeaderSet::clean(&raw(&[
            Some("Concurso"),
            Some("Trevo 1"),
            Some("Bola1"),
            Some("Coluna 3"),
            Some("Bola2"),
            Some("Ganhadores"),
        ]));
        let columns = NumberColumnMatcher::default().classify(&headers);
        assert_eq!(columns, vec!["Trevo 1", "Bola1", "Coluna 3", "Bola2"]);
    }

    #[test]
    fn test_custom_families() {
        let matcher = NumberColumnMatcher::new(["Dezena", "Mês+"]);
        assert!(matcher.is_match("Dezena 3"));
        assert!(matcher.is_match("mês+1"));
        assert!(!matcher.is_match("Bola 1"));

        let none = NumberColumnMatcher::new(Vec::<String>::new());
        assert!(!none.is_match("Bola 1"));
    }
}
