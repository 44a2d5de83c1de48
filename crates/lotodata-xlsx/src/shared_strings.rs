//! Shared-string pool parsing (xl/sharedStrings.xml)
//!
//! Cells with `t="s"` store a zero-based index into this pool instead of
//! their text. Each `<si>` item is one entry; rich-text items split their
//! text across several `<r><t>` runs which are concatenated here.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Result, XlsxError};

/// Ordered shared-string pool, indexed exactly like the source `<si>` items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedStrings {
    items: Vec<String>,
}

impl SharedStrings {
    /// Parse the pool; an absent part yields an empty pool
    pub fn parse(xml: Option<&[u8]>) -> Result<Self> {
        match xml {
            Some(xml) => Self::parse_xml(xml),
            None => Ok(Self::default()),
        }
    }

    fn parse_xml(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        // Leading/trailing spaces inside <t> are significant
        reader.config_mut().trim_text(false);

        let mut items = Vec::new();
        let mut buf = Vec::new();
        let mut current: Option<String> = None;
        let mut in_text = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"si" => current = Some(String::new()),
                    b"t" => in_text = true,
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => {
                    if e.local_name().as_ref() == b"si" {
                        items.push(String::new());
                    }
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"si" => {
                        if let Some(text) = current.take() {
                            items.push(text);
                        }
                        in_text = false;
                    }
                    b"t" => in_text = false,
                    _ => {}
                },
                Ok(Event::Text(ref e)) => {
                    if in_text {
                        if let Some(ref mut text) = current {
                            let unescaped = e.unescape().map_err(|e| XlsxError::Xml(e.into()))?;
                            text.push_str(&unescaped);
                        }
                    }
                }
                Ok(Event::CData(ref e)) => {
                    if in_text {
                        if let Some(ref mut text) = current {
                            text.push_str(&String::from_utf8_lossy(e));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { items })
    }

    /// Get the entry at a zero-based index
    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(|s| s.as_str())
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool has no entries
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate entries in pool order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|s| s.as_str())
    }
}

impl From<Vec<String>> for SharedStrings {
    fn from(items: Vec<String>) -> Self {
        Self { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_part_is_empty() {
        let strings = SharedStrings::parse(None).unwrap();
        assert!(strings.is_empty());
        assert_eq!(strings.len(), 0);
    }

    #[test]
    fn test_simple_items() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="3" uniqueCount="3">
  <si><t>Concurso</t></si>
  <si><t>Data do Sorteio</t></si>
  <si><t>Bola1</t></si>
</sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.len(), 3);
        assert_eq!(strings.get(0), Some("Concurso"));
        assert_eq!(strings.get(1), Some("Data do Sorteio"));
        assert_eq!(strings.get(2), Some("Bola1"));
        assert_eq!(strings.get(3), None);
    }

    #[test]
    fn test_rich_text_runs_are_concatenated() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <si><r><rPr><b/></rPr><t>Data </t></r><r><t>do</t></r><r><t xml:space="preserve"> Sorteio</t></r></si>
  <si><t>depois</t></si>
</sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.get(0), Some("Data do Sorteio"));
        assert_eq!(strings.get(1), Some("depois"));
    }

    #[test]
    fn test_empty_items_keep_their_index() {
        let xml = r#"<sst><si><t/></si><si/><si><r><t></t></r></si><si><t>x</t></si></sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        let items: Vec<&str> = strings.iter().collect();
        assert_eq!(items, vec!["", "", "", "x"]);
    }

    #[test]
    fn test_entities_and_unicode() {
        let xml = r#"<sst><si><t>Data de apuração &amp; R$ &lt;total&gt;</t></si></sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.get(0), Some("Data de apuração & R$ <total>"));
    }

    #[test]
    fn test_whitespace_preserved() {
        let xml = r#"<sst><si><t xml:space="preserve">  Bola 1 </t></si></sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.get(0), Some("  Bola 1 "));
    }

    #[test]
    fn test_cdata_text() {
        let xml = r#"<sst><si><t><![CDATA[a < b]]></t></si></sst>"#;
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.get(0), Some("a < b"));
    }

    #[test]
    fn test_text_outside_t_is_ignored() {
        let xml = "<sst>\n  <si>\n    <t>Bola</t>\n  </si>\n</sst>";
        let strings = SharedStrings::parse(Some(xml.as_bytes())).unwrap();

        assert_eq!(strings.get(0), Some("Bola"));
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let xml = r#"<sst><si><t>Bola&nbsp;1</t></si><si><t>ok</t></si></sst>"#;
        let result = SharedStrings::parse(Some(xml.as_bytes()));
        assert!(matches!(result, Err(XlsxError::Xml(_))));
    }

    #[test]
    fn test_malformed_pool_is_an_error() {
        let result = SharedStrings::parse(Some(b"<sst><si><t>a</si></sst>"));
        assert!(matches!(result, Err(XlsxError::Xml(_))));
    }
}
