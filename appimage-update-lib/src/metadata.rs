use crate::error::MetadataError;
use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;

/// Parsed OCS content data, reduced to what a tag-name search needs:
/// every element in document order with its leading text.
#[derive(Debug, Default)]
pub(crate) struct MetadataDocument {
    elements: Vec<Element>,
}

#[derive(Debug)]
struct Element {
    name: String,
    text: String,
    has_children: bool,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            text: String::new(),
            has_children: false,
        }
    }
}

impl MetadataDocument {
    pub(crate) fn parse(data: &[u8]) -> Result<Self, MetadataError> {
        let mut reader = Reader::from_reader(data);
        let mut document = MetadataDocument::default();
        let mut open: Vec<usize> = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(start) => {
                    let name = std::str::from_utf8(start.local_name().as_ref())?.to_string();
                    document.open_child(&open);
                    open.push(document.elements.len());
                    document.elements.push(Element::new(name));
                }
                Event::Empty(empty) => {
                    let name = std::str::from_utf8(empty.local_name().as_ref())?.to_string();
                    document.open_child(&open);
                    document.elements.push(Element::new(name));
                }
                Event::End(_) => {
                    open.pop();
                }
                Event::Text(text) => {
                    document.append_text(&open, std::str::from_utf8(&text)?);
                }
                Event::CData(cdata) => {
                    document.append_text(&open, std::str::from_utf8(&cdata)?);
                }
                Event::GeneralRef(reference) => {
                    match reference.resolve_char_ref().map_err(quick_xml::Error::from)? {
                        Some(ch) => document.append_text(&open, ch.encode_utf8(&mut [0; 4])),
                        None => {
                            let entity = predefined_entity(std::str::from_utf8(&reference)?)?;
                            document.append_text(&open, entity);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if let Some(&index) = open.last() {
            return Err(MetadataError::UnclosedElement(
                document.elements[index].name.clone(),
            ));
        }
        if document.elements.is_empty() {
            return Err(MetadataError::NoRootElement);
        }
        Ok(document)
    }

    /// Text of the first element named `name` anywhere in the document, untrimmed.
    pub(crate) fn find_text(&self, name: &str) -> Option<&str> {
        self.elements
            .iter()
            .find(|element| element.name == name)
            .map(|element| element.text.as_str())
    }

    fn open_child(&mut self, open: &[usize]) {
        if let Some(&parent) = open.last() {
            self.elements[parent].has_children = true;
        }
    }

    // Only text ahead of the first child element belongs to an element.
    fn append_text(&mut self, open: &[usize], text: &str) {
        if let Some(&index) = open.last() {
            let element = &mut self.elements[index];
            if !element.has_children {
                element.text.push_str(text);
            }
        }
    }
}

fn predefined_entity(name: &str) -> Result<&'static str, MetadataError> {
    resolve_predefined_entity(name).ok_or_else(|| MetadataError::UnknownEntity(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_text_searches_whole_document() {
        let document = MetadataDocument::parse(
            br#"<?xml version="1.0"?>
            <ocs>
              <meta><status>ok</status></meta>
              <data>
                <content details="full">
                  <downloadname1>App-x86_64.AppImage</downloadname1>
                  <downloadlink1>https://files.example.com/App-x86_64.AppImage</downloadlink1>
                </content>
              </data>
            </ocs>"#,
        )
        .unwrap();

        assert_eq!(document.find_text("status"), Some("ok"));
        assert_eq!(document.find_text("downloadname1"), Some("App-x86_64.AppImage"));
        assert_eq!(
            document.find_text("downloadlink1"),
            Some("https://files.example.com/App-x86_64.AppImage")
        );
        assert_eq!(document.find_text("downloadname2"), None);
    }

    #[test]
    fn test_find_text_returns_first_match_in_document_order() {
        let document =
            MetadataDocument::parse(b"<a><b><name>first</name></b><name>second</name></a>").unwrap();
        assert_eq!(document.find_text("name"), Some("first"));
    }

    #[test]
    fn test_entities_and_cdata_are_resolved() {
        let document = MetadataDocument::parse(
            b"<ocs><downloadlink1>https://x/get?id=1&amp;file=App&#46;AppImage</downloadlink1>\
              <downloadname1><![CDATA[App <beta>.AppImage]]></downloadname1></ocs>",
        )
        .unwrap();

        assert_eq!(
            document.find_text("downloadlink1"),
            Some("https://x/get?id=1&file=App.AppImage")
        );
        assert_eq!(document.find_text("downloadname1"), Some("App <beta>.AppImage"));
    }

    #[test]
    fn test_hexadecimal_character_reference() {
        let document =
            MetadataDocument::parse(b"<ocs><downloadname1>App&#x2D;x86_64&#X2e;AppImage</downloadname1></ocs>")
                .unwrap();
        assert_eq!(document.find_text("downloadname1"), Some("App-x86_64.AppImage"));
    }

    #[test]
    fn test_invalid_character_references_are_errors() {
        for data in [
            &b"<ocs>&#xD800;</ocs>"[..],
            &b"<ocs>&#x110000;</ocs>"[..],
            &b"<ocs>&#xZZ;</ocs>"[..],
        ] {
            assert!(matches!(
                MetadataDocument::parse(data),
                Err(MetadataError::Xml(_))
            ));
        }
    }

    #[test]
    fn test_text_is_returned_untrimmed() {
        let document =
            MetadataDocument::parse(b"<ocs><downloadname1>  App.AppImage\n</downloadname1></ocs>").unwrap();
        assert_eq!(document.find_text("downloadname1"), Some("  App.AppImage\n"));
    }

    #[test]
    fn test_empty_element_is_present_with_empty_text() {
        let document = MetadataDocument::parse(b"<ocs><downloadname1/></ocs>").unwrap();
        assert_eq!(document.find_text("downloadname1"), Some(""));
    }

    #[test]
    fn test_mismatched_end_tag_is_an_error() {
        let result = MetadataDocument::parse(b"<ocs><downloadname1>foo</ocs>");
        assert!(matches!(result, Err(MetadataError::Xml(_))));
    }

    #[test]
    fn test_unclosed_document_is_an_error() {
        let result = MetadataDocument::parse(b"<ocs><data><downloadname1>foo</downloadname1>");
        assert!(matches!(
            result,
            Err(MetadataError::UnclosedElement(name)) if name == "data"
        ));
    }

    #[test]
    fn test_document_without_elements_is_an_error() {
        assert!(matches!(
            MetadataDocument::parse(b"not xml at all"),
            Err(MetadataError::NoRootElement)
        ));
        assert!(matches!(
            MetadataDocument::parse(b""),
            Err(MetadataError::NoRootElement)
        ));
    }

    #[test]
    fn test_unknown_entity_is_an_error() {
        let result = MetadataDocument::parse(b"<ocs>&bogus;</ocs>");
        assert!(matches!(result, Err(MetadataError::UnknownEntity(name)) if name == "bogus"));
    }
}
