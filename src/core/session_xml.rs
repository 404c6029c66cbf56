use crate::core::models::{ImageRef, Session};
use crate::core::session_store::{Result, SessionStoreError};

use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::path::{Path, PathBuf};

/*
 * The XML wire format for session files. Parsing and schema validation run
 * as a single streaming pass: well-formedness failures surface as
 * `SessionStoreError::Parse` straight from the reader, while structural
 * violations (wrong root, missing attributes, elements out of order) become
 * `SessionStoreError::Schema` with a human-readable detail.
 *
 * Document shape:
 *
 *   <creative_writing read_subdirectory="yes|no" use_default_library="yes|no">
 *       <image_source_directory src="..."/>   (zero or more)
 *       <images>
 *           <img src="..."/>                  (zero or more)
 *       </images>
 *       <text>
 *           <title>...</title>
 *           <p>...</p>                        (zero or more)
 *       </text>
 *   </creative_writing>
 */

const ROOT_TAG: &str = "creative_writing";
const ATTR_READ_SUBDIRECTORY: &str = "read_subdirectory";
const ATTR_USE_DEFAULT_LIBRARY: &str = "use_default_library";

fn xml_err<E: Into<quick_xml::Error>>(err: E) -> SessionStoreError {
    SessionStoreError::Parse(err.into())
}

fn schema_err(file: &Path, detail: impl Into<String>) -> SessionStoreError {
    SessionStoreError::Schema {
        file: file.to_path_buf(),
        detail: detail.into(),
    }
}

// Where the parser currently is inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsePosition {
    BeforeRoot,
    InRoot,
    InDirectory,
    InImages,
    InImage,
    InText,
    InTitle,
    InParagraph,
    AfterRoot,
}

// Enforces the child order inside the root element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RootPhase {
    Directories,
    AfterImages,
    AfterText,
}

pub(crate) fn parse_session(content: &str, file: &Path) -> Result<Session> {
    let mut reader = Reader::from_str(content);

    let mut position = ParsePosition::BeforeRoot;
    let mut stack: Vec<ParsePosition> = Vec::new();
    let mut open_tags: Vec<String> = Vec::new();
    let mut phase = RootPhase::Directories;
    let mut saw_title = false;

    let mut include_subdirectories = false;
    let mut use_default_library = false;
    let mut source_directories: Vec<PathBuf> = Vec::new();
    let mut shown_images: Vec<ImageRef> = Vec::new();
    let mut title = String::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut text_buf = String::new();

    loop {
        match reader.read_event().map_err(xml_err)? {
            Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Start(e) => {
                let name = e.name();
                let name = String::from_utf8_lossy(name.as_ref()).into_owned();
                let opened = open_element(
                    position, &mut phase, &mut saw_title, &name, &e, file,
                    &mut include_subdirectories, &mut use_default_library,
                    &mut source_directories, &mut shown_images,
                )?;
                stack.push(position);
                open_tags.push(name);
                position = opened;
                if matches!(position, ParsePosition::InTitle | ParsePosition::InParagraph) {
                    text_buf.clear();
                }
            }
            Event::Empty(e) => {
                let name = e.name();
                let name = String::from_utf8_lossy(name.as_ref()).into_owned();
                let opened = open_element(
                    position, &mut phase, &mut saw_title, &name, &e, file,
                    &mut include_subdirectories, &mut use_default_library,
                    &mut source_directories, &mut shown_images,
                )?;
                // A self-closing element opens and closes in one step.
                match opened {
                    ParsePosition::InTitle => {
                        title = String::new();
                    }
                    ParsePosition::InParagraph => {
                        paragraphs.push(String::new());
                    }
                    ParsePosition::InImages => {
                        phase = RootPhase::AfterImages;
                    }
                    ParsePosition::InText => {
                        return Err(schema_err(file, "<text> must contain a <title> element"));
                    }
                    _ => {}
                }
            }
            Event::End(_) => {
                // The reader itself rejects mismatched end tags, so the
                // name needs no re-checking here.
                open_tags.pop();
                match position {
                    ParsePosition::InTitle => {
                        title = std::mem::take(&mut text_buf);
                    }
                    ParsePosition::InParagraph => {
                        paragraphs.push(std::mem::take(&mut text_buf));
                    }
                    ParsePosition::InImages => {
                        phase = RootPhase::AfterImages;
                    }
                    ParsePosition::InText => {
                        if !saw_title {
                            return Err(schema_err(
                                file,
                                "<text> must contain a <title> element",
                            ));
                        }
                        phase = RootPhase::AfterText;
                    }
                    ParsePosition::InRoot => {
                        if phase < RootPhase::AfterText {
                            return Err(schema_err(
                                file,
                                "root element must contain <images> followed by <text>",
                            ));
                        }
                        stack.pop();
                        position = ParsePosition::AfterRoot;
                        continue;
                    }
                    ParsePosition::InDirectory | ParsePosition::InImage => {}
                    ParsePosition::BeforeRoot | ParsePosition::AfterRoot => {}
                }
                position = stack.pop().unwrap_or(ParsePosition::AfterRoot);
            }
            Event::Text(e) => {
                let raw = String::from_utf8_lossy(e.as_ref()).into_owned();
                match position {
                    ParsePosition::InTitle | ParsePosition::InParagraph => {
                        text_buf.push_str(&decode_entities(&raw, file)?);
                    }
                    _ => {
                        if !raw.trim().is_empty() {
                            return Err(schema_err(
                                file,
                                format!("unexpected text content: {:?}", raw.trim()),
                            ));
                        }
                    }
                }
            }
            Event::CData(e) => match position {
                ParsePosition::InTitle | ParsePosition::InParagraph => {
                    text_buf.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
                _ => {
                    return Err(schema_err(file, "unexpected CDATA section"));
                }
            },
            Event::GeneralRef(e) => {
                let name = String::from_utf8_lossy(e.as_ref()).into_owned();
                match position {
                    ParsePosition::InTitle | ParsePosition::InParagraph => {
                        match resolve_reference(&name) {
                            Some(s) => text_buf.push_str(&s),
                            None => {
                                return Err(schema_err(
                                    file,
                                    format!("unknown entity reference: &{};", name),
                                ));
                            }
                        }
                    }
                    _ => {
                        return Err(schema_err(file, "unexpected entity reference"));
                    }
                }
            }
            Event::Eof => {
                // Elements still open at end of input make the document
                // malformed rather than schema-invalid.
                if let Some(tag) = open_tags.pop() {
                    return Err(xml_err(quick_xml::Error::IllFormed(
                        IllFormedError::MissingEndTag(tag),
                    )));
                }
                if position != ParsePosition::AfterRoot {
                    return Err(schema_err(file, "document contains no complete root element"));
                }
                break;
            }
        }
    }

    // A session always carries at least one paragraph slot.
    if paragraphs.is_empty() {
        paragraphs.push(String::new());
    }

    Ok(Session {
        source_directories,
        include_subdirectories,
        use_default_library,
        shown_images,
        title,
        paragraphs,
        backing_file: file.to_path_buf(),
    })
}

/*
 * Handles an opening tag (either `Start` or `Empty`) and returns the
 * position the parser enters. Structural bookkeeping that depends on how
 * the element closes stays with the caller.
 */
#[allow(clippy::too_many_arguments)]
fn open_element(
    position: ParsePosition,
    phase: &mut RootPhase,
    saw_title: &mut bool,
    name: &str,
    element: &BytesStart,
    file: &Path,
    include_subdirectories: &mut bool,
    use_default_library: &mut bool,
    source_directories: &mut Vec<PathBuf>,
    shown_images: &mut Vec<ImageRef>,
) -> Result<ParsePosition> {
    match position {
        ParsePosition::BeforeRoot => {
            if name != ROOT_TAG {
                return Err(schema_err(
                    file,
                    format!("expected root element <{}>, found <{}>", ROOT_TAG, name),
                ));
            }
            *include_subdirectories =
                required_yes_no_attr(element, ATTR_READ_SUBDIRECTORY, file)?;
            *use_default_library =
                required_yes_no_attr(element, ATTR_USE_DEFAULT_LIBRARY, file)?;
            Ok(ParsePosition::InRoot)
        }
        ParsePosition::InRoot => match name {
            "image_source_directory" if *phase == RootPhase::Directories => {
                let src = required_attr(element, "src", file)?;
                source_directories.push(PathBuf::from(src));
                Ok(ParsePosition::InDirectory)
            }
            "images" if *phase == RootPhase::Directories => Ok(ParsePosition::InImages),
            "text" if *phase == RootPhase::AfterImages => {
                *saw_title = false;
                Ok(ParsePosition::InText)
            }
            _ => Err(schema_err(
                file,
                format!("unexpected element <{}> inside <{}>", name, ROOT_TAG),
            )),
        },
        ParsePosition::InImages => {
            if name != "img" {
                return Err(schema_err(
                    file,
                    format!("unexpected element <{}> inside <images>", name),
                ));
            }
            let src = required_attr(element, "src", file)?;
            shown_images.push(ImageRef::from_src(&src));
            Ok(ParsePosition::InImage)
        }
        ParsePosition::InText => match name {
            "title" if !*saw_title => {
                *saw_title = true;
                Ok(ParsePosition::InTitle)
            }
            "title" => Err(schema_err(file, "<text> contains more than one <title>")),
            "p" if *saw_title => Ok(ParsePosition::InParagraph),
            "p" => Err(schema_err(file, "<title> must precede all <p> elements")),
            _ => Err(schema_err(
                file,
                format!("unexpected element <{}> inside <text>", name),
            )),
        },
        ParsePosition::InTitle | ParsePosition::InParagraph => Err(schema_err(
            file,
            format!("unexpected element <{}> inside text content", name),
        )),
        ParsePosition::InDirectory | ParsePosition::InImage => Err(schema_err(
            file,
            format!("unexpected element <{}> inside an image reference", name),
        )),
        ParsePosition::AfterRoot => Err(schema_err(
            file,
            format!("unexpected element <{}> after the root element", name),
        )),
    }
}

fn attr_value(element: &BytesStart, name: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(xml_err)?;
        if attr.key.as_ref() == name.as_bytes() {
            let value = attr.unescape_value().map_err(xml_err)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn required_attr(element: &BytesStart, name: &str, file: &Path) -> Result<String> {
    attr_value(element, name)?.ok_or_else(|| {
        let tag = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        schema_err(file, format!("<{}> is missing the {:?} attribute", tag, name))
    })
}

fn required_yes_no_attr(element: &BytesStart, name: &str, file: &Path) -> Result<bool> {
    match required_attr(element, name, file)?.as_str() {
        "yes" => Ok(true),
        "no" => Ok(false),
        other => Err(schema_err(
            file,
            format!("attribute {:?} must be \"yes\" or \"no\", found {:?}", name, other),
        )),
    }
}

fn resolve_reference(name: &str) -> Option<String> {
    match name {
        "amp" => Some("&".to_string()),
        "lt" => Some("<".to_string()),
        "gt" => Some(">".to_string()),
        "quot" => Some("\"".to_string()),
        "apos" => Some("'".to_string()),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code).map(String::from)
        }
    }
}

// Resolves any entity references that arrive embedded in a text chunk.
fn decode_entities(raw: &str, file: &Path) -> Result<String> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];
        let end = rest
            .find(';')
            .ok_or_else(|| schema_err(file, "unterminated entity reference"))?;
        let name = &rest[..end];
        match resolve_reference(name) {
            Some(s) => out.push_str(&s),
            None => {
                return Err(schema_err(
                    file,
                    format!("unknown entity reference: &{};", name),
                ));
            }
        }
        rest = &rest[end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub(crate) fn serialize_session(session: &Session) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new(ROOT_TAG);
    root.push_attribute((ATTR_READ_SUBDIRECTORY, yes_no(session.include_subdirectories)));
    root.push_attribute((ATTR_USE_DEFAULT_LIBRARY, yes_no(session.use_default_library)));
    writer.write_event(Event::Start(root))?;

    for dir in &session.source_directories {
        let mut el = BytesStart::new("image_source_directory");
        el.push_attribute(("src", dir.to_string_lossy().as_ref()));
        writer.write_event(Event::Empty(el))?;
    }

    if session.shown_images.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("images")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("images")))?;
        for image in &session.shown_images {
            let mut el = BytesStart::new("img");
            el.push_attribute(("src", image.src().as_str()));
            writer.write_event(Event::Empty(el))?;
        }
        writer.write_event(Event::End(BytesEnd::new("images")))?;
    }

    writer.write_event(Event::Start(BytesStart::new("text")))?;
    write_text_element(&mut writer, "title", &session.title)?;
    for p in &session.paragraphs {
        write_text_element(&mut writer, "p", p)?;
    }
    writer.write_event(Event::End(BytesEnd::new("text")))?;

    writer.write_event(Event::End(BytesEnd::new(ROOT_TAG)))?;

    let mut xml = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    xml.push('\n');
    Ok(xml)
}

/*
 * Empty text elements are written self-closing. Writing them as an open and
 * close pair would let the indenting writer place whitespace between the
 * tags, which would round-trip as spurious content.
 */
fn write_text_element(writer: &mut Writer<Vec<u8>>, tag: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new(tag)))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new(tag)))?;
        writer.write_event(Event::Text(BytesText::new(value)))?;
        writer.write_event(Event::End(BytesEnd::new(tag)))?;
    }
    Ok(())
}
