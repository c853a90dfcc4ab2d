//! Opening `<details>` elements targeted by the location fragment.

use folio_dom::Document;
use percent_encoding::percent_decode_str;

/// Open the `details` element whose id is `hash`. No-op when already open
/// or when nothing matches.
pub(crate) fn open_targeted_details(doc: &mut Document, hash: &str) {
    let raw = hash.strip_prefix('#').unwrap_or(hash);
    if raw.is_empty() {
        return;
    }
    let id = percent_decode_str(raw).decode_utf8_lossy();

    let Some(details) = doc.select_first(doc.root(), |el| el.is("details") && el.attr("id") == Some(&*id)) else {
        return;
    };
    if doc.attr(details, "open").is_none() {
        doc.set_attr(details, "open", "");
        tracing::debug!(id = %id, "Opened details targeted by fragment");
    }
}
