// src/core/html.rs
// Markup collaborator: element lookup by id, <option> listing, and the
// JSF partial-response envelope (`<partial-response><changes><update id=..>`).

use quick_xml::Reader;
use quick_xml::events::Event;
use scraper::{ElementRef, Html, Selector};

use super::sanitize::normalize_ws;

/// First element whose `id` attribute equals `id` exactly.
/// JSF ids carry dots and colons, so this goes through an attribute selector.
pub fn find_by_id<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(&format!(r#"[id="{id}"]"#)).ok()?;
    doc.select(&sel).next()
}

/// `(value, label)` of every `<option>` under `node`, in document order.
/// Placeholders (empty or missing value) are skipped.
pub fn list_options(node: ElementRef<'_>) -> Vec<(String, String)> {
    let Ok(sel) = Selector::parse("option") else {
        return Vec::new();
    };
    node.select(&sel)
        .filter_map(|o| {
            let label = normalize_ws(&o.text().collect::<String>());
            let value = o.value().attr("value")?;
            (!value.is_empty()).then(|| (s!(value), label))
        })
        .collect()
}

/// One `<update id="...">` of a partial response; `markup` is its text/CDATA content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    pub id: String,
    pub markup: String,
}

pub fn is_partial_response(body: &str) -> bool {
    body.contains("<partial-response")
}

/// Every `<update>` of a partial-response document, in order.
pub fn read_partial(body: &str) -> Result<Vec<Fragment>, quick_xml::Error> {
    let mut reader = Reader::from_str(body);
    let mut out = Vec::new();
    let mut current: Option<Fragment> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"update" => {
                let id = match e.try_get_attribute("id")? {
                    Some(a) => a.unescape_value()?.into_owned(),
                    None => s!(),
                };
                current = Some(Fragment { id, markup: s!() });
            }
            Event::Empty(e) if e.name().as_ref() == b"update" => {
                if let Some(a) = e.try_get_attribute("id")? {
                    out.push(Fragment { id: a.unescape_value()?.into_owned(), markup: s!() });
                }
            }
            Event::Text(t) => {
                if let Some(f) = current.as_mut() {
                    f.markup.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(f) = current.as_mut() {
                    f.markup.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(e) if e.name().as_ref() == b"update" => {
                if let Some(f) = current.take() {
                    out.push(f);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(out)
}
