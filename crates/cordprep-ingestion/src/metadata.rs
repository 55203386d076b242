//! Metadata joiner.
//!
//! Scans the category subdirectories of a data root for per-paper JSON
//! documents, derives a relative path for every paper id and outer-joins the
//! result against the metadata table:
//!   1. Resolve the selector to one or more subdirectories
//!   2. Read every document's declared `paper_id`
//!   3. Outer join on `sha`
//!   4. Narrow to the selected categories

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use cordprep_common::{CordPrepError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::models::{
    CategorySelector, FileRecord, JoinedRecord, JoinedTable, LicenseCategory, MetadataTable,
};

/// Metadata file shipped with the 2020-03-13 release.
pub const DEFAULT_METADATA_FILE: &str = "all_sources_metadata_2020-03-13.csv";

/// Free-form metadata handed back to the caller untouched.
pub type ExtraMetadata = serde_json::Map<String, serde_json::Value>;

/// Where the base metadata rows come from.
#[derive(Debug, Clone, Default)]
pub enum MetadataSource {
    /// [`DEFAULT_METADATA_FILE`] under the data root.
    #[default]
    Default,
    Path(PathBuf),
    Table(MetadataTable),
}

impl MetadataSource {
    fn load(self, source_root: &Path) -> Result<MetadataTable> {
        match self {
            MetadataSource::Default => {
                MetadataTable::from_path(&source_root.join(DEFAULT_METADATA_FILE))
            }
            MetadataSource::Path(path) => MetadataTable::from_path(&path),
            MetadataSource::Table(table) => Ok(table),
        }
    }
}

impl From<MetadataTable> for MetadataSource {
    fn from(table: MetadataTable) -> Self {
        MetadataSource::Table(table)
    }
}

impl From<PathBuf> for MetadataSource {
    fn from(path: PathBuf) -> Self {
        MetadataSource::Path(path)
    }
}

/// A document whose declared id disagrees with its file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdMismatch {
    pub file_name: String,
    pub paper_id: String,
    pub path: String,
}

/// Output of [`join_metadata`], in `(data, target, metadata)` shape.
#[derive(Debug, Clone)]
pub struct JoinedDataset {
    pub data: JoinedTable,
    /// The corpus has no label column; always `None`.
    pub target: Option<()>,
    pub metadata: ExtraMetadata,
    pub mismatches: Vec<IdMismatch>,
}

/// Only the field the joiner needs from each document.
#[derive(Deserialize)]
struct DeclaredId {
    paper_id: String,
}

/// Join the metadata table with the files found under `source_root`.
#[instrument(skip(metadata, extra), fields(root = %source_root.display(), kind = %selector))]
pub fn join_metadata(
    selector: CategorySelector,
    source_root: &Path,
    metadata: MetadataSource,
    extra: Option<ExtraMetadata>,
) -> Result<JoinedDataset> {
    let table = metadata.load(source_root)?;
    debug!("Loaded {} metadata rows", table.len());

    let (files, mismatches) = scan_file_records(source_root, &selector.categories())?;
    info!(
        "Found {} documents ({} id mismatches)",
        files.len(),
        mismatches.len()
    );

    let mut data = outer_join(table, files);
    if selector.narrows() {
        data.retain(|r| r.category().is_some_and(|c| selector.admits(c)));
    }
    info!("Joined table has {} rows", data.len());

    Ok(JoinedDataset {
        data,
        target: None,
        metadata: extra.unwrap_or_default(),
        mismatches,
    })
}

/// Read the declared id of every entry in each category subdirectory.
///
/// Listing is non-recursive and sorted by file name. Any entry that is not a
/// readable JSON document fails the scan.
pub fn scan_file_records(
    source_root: &Path,
    categories: &[LicenseCategory],
) -> Result<(Vec<FileRecord>, Vec<IdMismatch>)> {
    let mut files = Vec::new();
    let mut mismatches = Vec::new();

    for category in categories {
        let dir = source_root.join(category.dir_name());
        let entries = list_dir_sorted(&dir)?;
        debug!("Scanning {} entries in {:?}", entries.len(), dir);

        for path in entries {
            let declared: DeclaredId = crate::models::read_json(&path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let rel_path = format!("{}/{}", category.dir_name(), file_name);

            if format!("{}.json", declared.paper_id) != file_name {
                warn!(
                    file = %file_name,
                    paper_id = %declared.paper_id,
                    "Declared paper id does not match file name"
                );
                mismatches.push(IdMismatch {
                    file_name,
                    paper_id: declared.paper_id.clone(),
                    path: rel_path.clone(),
                });
            }

            files.push(FileRecord {
                sha: declared.paper_id,
                category: *category,
                path: rel_path,
            });
        }
    }

    Ok((files, mismatches))
}

fn list_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CordPrepError::io(dir, e))? {
        let entry = entry.map_err(|e| CordPrepError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

/// Full outer join on `sha`.
///
/// Metadata rows come first in source order, each repeated once per matching
/// file. Files no metadata row claimed follow in discovery order. Blank ids
/// never match.
pub fn outer_join(table: MetadataTable, files: Vec<FileRecord>) -> JoinedTable {
    let mut by_sha: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, file) in files.iter().enumerate() {
        by_sha.entry(file.sha.clone()).or_default().push(idx);
    }

    let (columns, metadata_records) = table.into_parts();
    let mut matched = vec![false; files.len()];
    let mut records = Vec::with_capacity(metadata_records.len() + files.len());

    for meta in metadata_records {
        let hits = columns.paper_id(&meta).and_then(|id| by_sha.get(id));
        match hits {
            Some(idxs) => {
                for &idx in idxs {
                    matched[idx] = true;
                    records.push(JoinedRecord {
                        metadata: Some(meta.clone()),
                        file: Some(files[idx].clone()),
                    });
                }
            }
            None => records.push(JoinedRecord { metadata: Some(meta), file: None }),
        }
    }

    records.extend(
        files
            .into_iter()
            .zip(matched)
            .filter(|(_, was_matched)| !was_matched)
            .map(|(file, _)| JoinedRecord { metadata: None, file: Some(file) }),
    );

    JoinedTable::new(columns, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MetadataRecord;
    use pretty_assertions::assert_eq;

    fn meta(rows: &[&[&str]]) -> MetadataTable {
        let columns = ["sha", "title", "has_full_text"].map(str::to_string).to_vec();
        let records = rows
            .iter()
            .map(|r| MetadataRecord::new(r.iter().map(|v| v.to_string()).collect()))
            .collect();
        MetadataTable::new(columns, records).unwrap()
    }

    fn file(sha: &str, category: LicenseCategory) -> FileRecord {
        FileRecord {
            sha: sha.to_string(),
            category,
            path: format!("{}/{}.json", category.dir_name(), sha),
        }
    }

    #[test]
    fn test_outer_join_keeps_both_sides() {
        let table = meta(&[&["a", "A", "True"], &["b", "B", "False"]]);
        let files = vec![
            file("a", LicenseCategory::Biorxiv),
            file("z", LicenseCategory::CustomLicense),
        ];
        let joined = outer_join(table, files);

        let ids: Vec<_> = joined.records().iter().map(|r| joined.paper_id(r)).collect();
        assert_eq!(ids, vec![Some("a"), Some("b"), Some("z")]);
        assert_eq!(joined.records()[0].category(), Some(LicenseCategory::Biorxiv));
        assert_eq!(joined.records()[1].file, None);
        assert_eq!(joined.records()[2].metadata, None);
    }

    #[test]
    fn test_duplicate_ids_fan_out() {
        let table = meta(&[&["a", "first", "True"], &["a", "second", "True"]]);
        let files = vec![
            file("a", LicenseCategory::CommercialUse),
            file("a", LicenseCategory::NonCommercialUse),
        ];
        let joined = outer_join(table, files);
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.file_count(), 4);
    }

    #[test]
    fn test_blank_ids_never_match() {
        let table = meta(&[&["", "no sha", "False"]]);
        let files = vec![file("", LicenseCategory::Biorxiv)];
        let joined = outer_join(table, files);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn test_orphan_file_fills_id_column_in_csv() {
        let joined = outer_join(meta(&[]), vec![file("z", LicenseCategory::Biorxiv)]);
        let mut out = Vec::new();
        joined.write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "sha,title,has_full_text,file_type,path\n\
             z,,,biorxiv_medrxiv,biorxiv_medrxiv/z.json\n"
        );
    }
}
