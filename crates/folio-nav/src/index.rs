//! Section index: pages grouped by `section` then `subsection`.
//!
//! Grouping preserves encounter order at every level. An entry with a
//! section but no subsection is the section's landing entry; entries
//! without a section are not indexed.

use serde::Serialize;

/// Something that can be placed in a [`SectionIndex`].
pub trait Sectioned {
    /// Section identifier, if any.
    fn section(&self) -> Option<&str>;
    /// Subsection identifier within the section, if any.
    fn subsection(&self) -> Option<&str>;
}

/// Entries of one subsection.
#[derive(Debug, PartialEq, Serialize)]
pub struct SubsectionGroup<'a, T> {
    /// Subsection identifier.
    pub name: String,
    /// Entries in encounter order.
    pub entries: Vec<&'a T>,
}

/// Entries of one section.
#[derive(Debug, PartialEq, Serialize)]
pub struct SectionGroup<'a, T> {
    /// Section identifier.
    pub name: String,
    /// Entry without a subsection (first encountered).
    pub landing: Option<&'a T>,
    /// Subsections in encounter order.
    pub subsections: Vec<SubsectionGroup<'a, T>>,
}

impl<'a, T> SectionGroup<'a, T> {
    /// Find a subsection by name.
    #[must_use]
    pub fn subsection(&self, name: &str) -> Option<&SubsectionGroup<'a, T>> {
        self.subsections.iter().find(|s| s.name == name)
    }
}

/// Entries grouped by section and subsection.
#[derive(Debug, PartialEq, Serialize)]
pub struct SectionIndex<'a, T> {
    sections: Vec<SectionGroup<'a, T>>,
}

impl<'a, T: Sectioned> SectionIndex<'a, T> {
    /// Group entries by section, then by subsection.
    pub fn group(entries: impl IntoIterator<Item = &'a T>) -> Self {
        let mut sections: Vec<SectionGroup<'a, T>> = Vec::new();

        for entry in entries {
            let Some(section) = entry.section() else {
                continue;
            };

            let idx = match sections.iter().position(|s| s.name == section) {
                Some(idx) => idx,
                None => {
                    sections.push(SectionGroup {
                        name: section.to_owned(),
                        landing: None,
                        subsections: Vec::new(),
                    });
                    sections.len() - 1
                }
            };
            let group = &mut sections[idx];

            match entry.subsection() {
                Some(subsection) => {
                    if let Some(existing) =
                        group.subsections.iter_mut().find(|s| s.name == subsection)
                    {
                        existing.entries.push(entry);
                    } else {
                        group.subsections.push(SubsectionGroup {
                            name: subsection.to_owned(),
                            entries: vec![entry],
                        });
                    }
                }
                None if group.landing.is_none() => group.landing = Some(entry),
                None => {
                    tracing::debug!(section, "Section already has a landing entry, ignoring");
                }
            }
        }

        Self { sections }
    }
}

impl<'a, T> SectionIndex<'a, T> {
    /// Sections in encounter order.
    #[must_use]
    pub fn sections(&self) -> &[SectionGroup<'a, T>] {
        &self.sections
    }

    /// Find a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&SectionGroup<'a, T>> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// True if no entry had a section.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
