//! Two-level "On this page" table of contents.
//!
//! A [`TableOfContents`] is a list of sections, each with a flat list of
//! subsections. It is built either from the renderer's flat heading list
//! ([`TableOfContents::from_entries`]) or deserialized directly from the nested
//! JSON/YAML shape:
//!
//! ```json
//! [{"id": "intro", "title": "Intro", "children": [{"id": "setup", "title": "Setup"}]}]
//! ```
//!
//! Heading ids are page-unique; they are the contract with the content
//! renderer and the keys the scroll spy reports.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::TocError;

/// Heading as produced by the markdown renderer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// Second-level heading inside a section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocSubsection {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Top-level heading and the subsections below it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocSection {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub children: Vec<TocSubsection>,
}

impl TocSection {
    /// Whether `active_id` is this section or one of its subsections.
    ///
    /// A section stays highlighted while the reader is anywhere inside it.
    #[must_use]
    pub fn is_active(&self, active_id: Option<&str>) -> bool {
        active_id.is_some_and(|active| {
            self.id == active || self.children.iter().any(|child| child.id == active)
        })
    }
}

/// Display row of the rendered table of contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TocRow {
    pub id: String,
    pub title: String,
    /// In-page link, `#<id>`.
    pub href: String,
    /// 0 for sections, 1 for subsections.
    pub depth: u8,
    pub is_active: bool,
}

/// Validated table of contents for one page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TocSection>", into = "Vec<TocSection>")]
pub struct TableOfContents {
    sections: Vec<TocSection>,
}

impl TableOfContents {
    /// Build from nested sections, rejecting duplicate ids.
    pub fn new(sections: Vec<TocSection>) -> Result<Self, TocError> {
        let mut seen = HashSet::new();
        let ids = sections
            .iter()
            .flat_map(|s| std::iter::once(&s.id).chain(s.children.iter().map(|c| &c.id)));
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(TocError::DuplicateId(id.clone()));
            }
        }
        Ok(Self { sections })
    }

    /// Group a flat heading list into sections.
    ///
    /// Level-2 headings open sections, level-3 headings become subsections of
    /// the preceding section. The page title (level 1) and headings deeper
    /// than level 3 are not listed.
    pub fn from_entries(entries: &[TocEntry]) -> Result<Self, TocError> {
        let mut sections: Vec<TocSection> = Vec::new();
        for entry in entries {
            match entry.level {
                2 => sections.push(TocSection {
                    id: entry.id.clone(),
                    title: entry.title.clone(),
                    children: Vec::new(),
                }),
                3 => {
                    let Some(section) = sections.last_mut() else {
                        return Err(TocError::OrphanSubsection {
                            id: entry.id.clone(),
                            level: entry.level,
                        });
                    };
                    section.children.push(TocSubsection {
                        id: entry.id.clone(),
                        title: entry.title.clone(),
                    });
                }
                _ => {}
            }
        }
        Self::new(sections)
    }

    #[must_use]
    pub fn sections(&self) -> &[TocSection] {
        &self.sections
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Every heading id in document order.
    #[must_use]
    pub fn heading_ids(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|s| std::iter::once(s.id.clone()).chain(s.children.iter().map(|c| c.id.clone())))
            .collect()
    }

    /// Id to start with before any scroll measurement.
    #[must_use]
    pub fn initial_active(&self) -> Option<&str> {
        self.sections.first().map(|s| s.id.as_str())
    }

    /// Flatten into display rows, marking the rows for `active_id`.
    ///
    /// A section row is active when it or one of its subsections is; a
    /// subsection row only when it is the active id itself.
    #[must_use]
    pub fn rows(&self, active_id: Option<&str>) -> Vec<TocRow> {
        let mut rows = Vec::new();
        for section in &self.sections {
            rows.push(TocRow {
                id: section.id.clone(),
                title: section.title.clone(),
                href: format!("#{}", section.id),
                depth: 0,
                is_active: section.is_active(active_id),
            });
            for child in &section.children {
                rows.push(TocRow {
                    id: child.id.clone(),
                    title: child.title.clone(),
                    href: format!("#{}", child.id),
                    depth: 1,
                    is_active: active_id == Some(child.id.as_str()),
                });
            }
        }
        rows
    }
}

impl TryFrom<Vec<TocSection>> for TableOfContents {
    type Error = TocError;

    fn try_from(sections: Vec<TocSection>) -> Result<Self, Self::Error> {
        Self::new(sections)
    }
}

impl From<TableOfContents> for Vec<TocSection> {
    fn from(toc: TableOfContents) -> Self {
        toc.sections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(level: u8, title: &str, id: &str) -> TocEntry {
        TocEntry {
            level,
            title: title.to_owned(),
            id: id.to_owned(),
        }
    }

    fn sample() -> TableOfContents {
        TableOfContents::from_entries(&[
            entry(1, "Guide", "guide"),
            entry(2, "Intro", "intro"),
            entry(3, "Setup", "setup"),
            entry(4, "Details", "details"),
            entry(3, "Config", "config"),
            entry(2, "Usage", "usage"),
        ])
        .unwrap()
    }

    #[test]
    fn test_from_entries_groups_levels() {
        let toc = sample();

        assert_eq!(
            toc.sections(),
            &[
                TocSection {
                    id: "intro".to_owned(),
                    title: "Intro".to_owned(),
                    children: vec![
                        TocSubsection {
                            id: "setup".to_owned(),
                            title: "Setup".to_owned(),
                        },
                        TocSubsection {
                            id: "config".to_owned(),
                            title: "Config".to_owned(),
                        },
                    ],
                },
                TocSection {
                    id: "usage".to_owned(),
                    title: "Usage".to_owned(),
                    children: vec![],
                },
            ]
        );
    }

    #[test]
    fn test_orphan_subsection_is_rejected() {
        let result = TableOfContents::from_entries(&[entry(3, "Setup", "setup")]);

        assert_eq!(
            result,
            Err(TocError::OrphanSubsection {
                id: "setup".to_owned(),
                level: 3
            })
        );
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let result = TableOfContents::from_entries(&[
            entry(2, "Intro", "intro"),
            entry(3, "Intro again", "intro"),
        ]);

        assert_eq!(result, Err(TocError::DuplicateId("intro".to_owned())));
    }

    #[test]
    fn test_heading_ids_in_document_order() {
        assert_eq!(sample().heading_ids(), vec!["intro", "setup", "config", "usage"]);
    }

    #[test]
    fn test_initial_active_is_first_section() {
        assert_eq!(sample().initial_active(), Some("intro"));
        assert_eq!(TableOfContents::default().initial_active(), None);
    }

    #[test]
    fn test_section_active_for_own_id_and_children() {
        let toc = sample();
        let intro = &toc.sections()[0];
        let usage = &toc.sections()[1];

        assert!(intro.is_active(Some("intro")));
        assert!(intro.is_active(Some("config")));
        assert!(!intro.is_active(Some("usage")));
        assert!(!intro.is_active(None));
        assert!(!usage.is_active(Some("setup")));
    }

    #[test]
    fn test_rows_mark_active_section_and_subsection() {
        let rows = sample().rows(Some("setup"));

        let active: Vec<_> = rows.iter().filter(|r| r.is_active).map(|r| r.id.as_str()).collect();
        assert_eq!(active, vec!["intro", "setup"]);
        assert_eq!(rows[1].href, "#setup");
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_deserialize_nested_without_titles() {
        let toc: TableOfContents = serde_json::from_str(
            r#"[{"id":"intro","children":[{"id":"setup"}]},{"id":"usage","children":[]}]"#,
        )
        .unwrap();

        assert_eq!(toc.heading_ids(), vec!["intro", "setup", "usage"]);
        assert_eq!(toc.sections()[0].title, "");
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let result: Result<TableOfContents, _> =
            serde_json::from_str(r#"[{"id":"a"},{"id":"a"}]"#);

        assert!(result.is_err());
    }
}
