//! Build manifest XML parsing.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::Error;
use crate::model::Manifest;

fn malformed(reason: impl ToString) -> Error {
    Error::Malformed {
        what: "manifest".to_string(),
        reason: reason.to_string(),
    }
}

/// Parse a snapshot manifest document into the pinned-revision mapping.
///
/// Only `<project>` elements matter here; `<remote>` and `<default>` carry
/// host-routing detail this tool does not consume. A project without a
/// `revision` makes the whole document invalid, so a manifest is never
/// half-populated.
pub fn parse_manifest(xml: &str) -> Result<Manifest, Error> {
    let mut reader = Reader::from_str(xml);
    let mut manifest = Manifest::new();
    let mut saw_root = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(el)) | Ok(Event::Empty(el)) => match el.name().as_ref() {
                b"manifest" => saw_root = true,
                b"project" => {
                    let (name, revision) = project_attrs(&el)?;
                    manifest.insert(name, revision);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(err) => return Err(malformed(err)),
            Ok(_) => {}
        }
    }
    if !saw_root {
        return Err(malformed("missing <manifest> root element"));
    }
    Ok(manifest)
}

fn project_attrs(el: &BytesStart<'_>) -> Result<(String, String), Error> {
    let mut name = None;
    let mut revision = None;
    for attr in el.attributes() {
        let attr = attr.map_err(malformed)?;
        let value = attr.unescape_value().map_err(malformed)?;
        match attr.key.as_ref() {
            b"name" => name = Some(value.into_owned()),
            b"revision" => revision = Some(value.into_owned()),
            _ => {}
        }
    }
    match (name, revision) {
        (Some(name), Some(revision)) => Ok((name, revision)),
        (Some(name), None) => Err(malformed(format!("project {name} has no revision"))),
        (None, _) => Err(malformed("project element without name")),
    }
}
