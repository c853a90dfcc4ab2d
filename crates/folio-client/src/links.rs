use folio_dom::Document;

/// Make every link open in the current tab.
pub(crate) fn force_same_tab(doc: &mut Document) {
    for link in doc.elements_by_tag("a") {
        doc.set_attr(link, "target", "_self");
    }
}
