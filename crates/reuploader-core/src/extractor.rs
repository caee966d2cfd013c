//! Asset reference scanning for XML scene documents.
//!
//! Properties live under `<Item><Properties>`; a property is a reference when
//! its tag or `name` attribute contains the scanner's marker. Its value is the
//! text of its first `<url>` child, or its own direct text when it has none;
//! other children are ignored. The value is stripped of a known URI prefix and
//! kept when what remains is a positive integer.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use crate::asset::AssetId;
use crate::error::{ExtractError, ExtractResult};

/// Marker used when none is given: animation references.
pub const DEFAULT_REFERENCE_MARKER: &str = "AnimationId";

/// URI prefixes stripped from property values before numeric validation.
pub const ASSET_URI_PREFIXES: [&str; 3] = [
    "rbxassetid://",
    "http://www.roblox.com/asset/?id=",
    "https://www.roblox.com/asset/?id=",
];

const ITEM_TAG: &str = "Item";
const PROPERTIES_TAG: &str = "Properties";
const URL_TAG: &str = "url";

/// Scans scene documents for properties whose tag or name contains a marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceScanner {
    marker: String,
}

impl Default for ReferenceScanner {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_MARKER)
    }
}

struct PropertyCapture {
    depth: usize,
    matches: bool,
    own_text: String,
    url_text: Option<String>,
    url_closed: bool,
}

impl PropertyCapture {
    const fn new(depth: usize, matches: bool) -> Self {
        Self {
            depth,
            matches,
            own_text: String::new(),
            url_text: None,
            url_closed: false,
        }
    }

    fn push_text(&mut self, stack: &[String], text: &str) {
        if !self.matches {
            return;
        }
        match stack.get(self.depth..) {
            Some([_]) => self.own_text.push_str(text),
            Some([_, child]) if child == URL_TAG && !self.url_closed => {
                self.url_text.get_or_insert_with(String::new).push_str(text);
            }
            _ => {}
        }
    }

    /// Called before `stack` pops the element being closed.
    fn close_element(&mut self, stack: &[String]) {
        if matches!(stack.get(self.depth..), Some([_, child]) if child == URL_TAG) {
            self.url_closed = true;
        }
    }

    fn value(self) -> String {
        self.url_text.unwrap_or(self.own_text)
    }
}

impl ReferenceScanner {
    /// Scanner matching properties that contain `marker`.
    #[must_use]
    pub fn new(marker: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
        }
    }

    /// Marker substring this scanner looks for.
    #[must_use]
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Read `path` and scan it.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Io`] if the file cannot be read, otherwise see
    /// [`Self::scan`].
    pub fn scan_path(&self, path: &Path) -> ExtractResult<BTreeSet<AssetId>> {
        let document = fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.scan(&String::from_utf8_lossy(&document))
    }

    /// Collect the unique asset ids referenced by `document`, sorted ascending.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractError::Parse`] if the document is not well-formed XML
    /// or has no root element.
    pub fn scan(&self, document: &str) -> ExtractResult<BTreeSet<AssetId>> {
        let mut reader = Reader::from_str(document);
        let mut stack: Vec<String> = Vec::new();
        let mut capture: Option<PropertyCapture> = None;
        let mut saw_root = false;
        let mut found = BTreeSet::new();

        loop {
            let event = reader
                .read_event()
                .map_err(|err| parse_error(&reader, err.to_string()))?;
            match event {
                Event::Start(start) => {
                    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                    if capture.is_none() && is_property_slot(&stack) {
                        let matches = self
                            .is_reference(&tag, &start)
                            .map_err(|detail| parse_error(&reader, detail))?;
                        capture = Some(PropertyCapture::new(stack.len(), matches));
                    }
                    stack.push(tag);
                    saw_root = true;
                }
                Event::Empty(_) => saw_root = true,
                Event::Text(text) => {
                    if let Some(active) = capture.as_mut().filter(|active| active.matches) {
                        let unescaped = text
                            .unescape()
                            .map_err(|err| parse_error(&reader, err.to_string()))?;
                        active.push_text(&stack, &unescaped);
                    }
                }
                Event::CData(data) => {
                    if let Some(active) = capture.as_mut() {
                        active.push_text(&stack, &String::from_utf8_lossy(&data.into_inner()));
                    }
                }
                Event::End(_) => {
                    if let Some(active) = capture.as_mut() {
                        active.close_element(&stack);
                    }
                    stack.pop();
                    if capture.as_ref().is_some_and(|active| active.depth == stack.len())
                        && let Some(done) = capture.take()
                        && done.matches
                        && let Some(asset_id) = parse_reference(&done.value())
                    {
                        found.insert(asset_id);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(parse_error(&reader, format!("document ended inside <{open}>")));
        }
        if !saw_root {
            return Err(parse_error(&reader, "document has no root element".to_string()));
        }

        debug!(marker = %self.marker, references = found.len(), "scene document scanned");
        Ok(found)
    }

    fn is_reference(&self, tag: &str, start: &BytesStart<'_>) -> Result<bool, String> {
        if tag.contains(&self.marker) {
            return Ok(true);
        }
        let Some(attribute) = start
            .try_get_attribute("name")
            .map_err(|err| err.to_string())?
        else {
            return Ok(false);
        };
        let name = attribute.unescape_value().map_err(|err| err.to_string())?;
        Ok(name.contains(&self.marker))
    }
}

/// Scan `document` with the default [`DEFAULT_REFERENCE_MARKER`].
///
/// # Errors
///
/// See [`ReferenceScanner::scan`].
pub fn extract_references(document: &str) -> ExtractResult<BTreeSet<AssetId>> {
    ReferenceScanner::default().scan(document)
}

/// Interpret a property value as an asset id, stripping a known URI prefix.
#[must_use]
pub fn parse_reference(value: &str) -> Option<AssetId> {
    let trimmed = value.trim();
    let bare = ASSET_URI_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed);
    bare.parse().ok()
}

fn is_property_slot(stack: &[String]) -> bool {
    matches!(stack, [.., item, properties] if item == ITEM_TAG && properties == PROPERTIES_TAG)
}

fn parse_error(reader: &Reader<&[u8]>, detail: String) -> ExtractError {
    ExtractError::Parse {
        position: u64::try_from(reader.buffer_position()).unwrap_or(u64::MAX),
        detail,
    }
}
