//! Section extractor.
//!
//! Turns the full-text documents of a joined table into one row per
//! (paper, section heading), keeping only sections longer than a token
//! threshold.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cordprep_common::{CordPrepError, Result};
use tracing::{debug, info, instrument};

use crate::models::{BodyEntry, JoinedTable, PaperDocument, SectionRecord, SectionTable};

/// Sections must have strictly more tokens than this to be kept.
pub const DEFAULT_MIN_TOKENS: usize = 200;

/// Extract the sections of every full-text paper in `joined`.
#[instrument(skip(joined), fields(root = %source_root.display(), rows = joined.len()))]
pub fn extract_sections(
    joined: &JoinedTable,
    source_root: &Path,
    min_tokens: usize,
) -> Result<SectionTable> {
    let mut records = Vec::new();
    let mut papers = 0usize;

    for row in joined.records().iter().filter(|r| joined.has_full_text(r)) {
        let rel_path = row.path().ok_or_else(|| {
            CordPrepError::MissingPath(joined.paper_id(row).unwrap_or_default().to_string())
        })?;
        let doc = PaperDocument::from_path(&resolve(source_root, rel_path))?;
        let sections = document_sections(&doc);
        debug!("{}: {} sections", doc.paper_id, sections.len());

        records.extend(sections);
        papers += 1;
    }

    let total = records.len();
    records.retain(|r| r.token_counts > min_tokens);
    info!(
        "Extracted {} sections from {} papers, kept {} above {} tokens",
        total,
        papers,
        records.len(),
        min_tokens
    );

    Ok(SectionTable::new(records))
}

/// One unfiltered record per distinct heading of `doc`.
pub fn document_sections(doc: &PaperDocument) -> Vec<SectionRecord> {
    group_by_section(&doc.body_text)
        .into_iter()
        .map(|(section, text)| SectionRecord {
            paper_id: doc.paper_id.clone(),
            title: doc.title().to_string(),
            abstract_text: doc.first_abstract().to_string(),
            section: section.to_string(),
            token_counts: token_count(&text),
            text,
        })
        .collect()
}

/// Group fragments by heading in first-seen order, joining each group's
/// texts with a single space.
pub fn group_by_section(body: &[BodyEntry]) -> Vec<(&str, String)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, String)> = Vec::new();

    for entry in body {
        match index.get(entry.section.as_str()) {
            Some(&idx) => {
                let text = &mut groups[idx].1;
                text.push(' ');
                text.push_str(&entry.text);
            }
            None => {
                index.insert(entry.section.as_str(), groups.len());
                groups.push((entry.section.as_str(), entry.text.clone()));
            }
        }
    }

    groups
}

/// Number of whitespace-delimited tokens.
pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

fn resolve(source_root: &Path, rel_path: &str) -> PathBuf {
    rel_path
        .split('/')
        .fold(source_root.to_path_buf(), |path, part| path.join(part))
}
