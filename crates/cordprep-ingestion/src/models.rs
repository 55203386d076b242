//! Data models for corpus preparation.

use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;

use cordprep_common::{CordPrepError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifier column shared by the metadata table and the file records.
pub const ID_COLUMN: &str = "sha";
pub const HAS_FULL_TEXT_COLUMN: &str = "has_full_text";

/// Columns appended to the metadata columns in a joined table.
pub const FILE_TYPE_COLUMN: &str = "file_type";
pub const PATH_COLUMN: &str = "path";

// ── Categories ────────────────────────────────────────────────────────────────

/// License / usage category of a paper. Each category is backed by exactly
/// one subdirectory of the data root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseCategory {
    CommercialUse,
    NonCommercialUse,
    CustomLicense,
    Biorxiv,
}

impl LicenseCategory {
    pub const ALL: [LicenseCategory; 4] = [
        LicenseCategory::CommercialUse,
        LicenseCategory::NonCommercialUse,
        LicenseCategory::CustomLicense,
        LicenseCategory::Biorxiv,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseCategory::CommercialUse    => "commercial_use",
            LicenseCategory::NonCommercialUse => "non_commercial_use",
            LicenseCategory::CustomLicense    => "custom_license",
            LicenseCategory::Biorxiv          => "biorxiv",
        }
    }

    /// Subdirectory of the data root holding this category's JSON documents.
    pub fn dir_name(&self) -> &'static str {
        match self {
            LicenseCategory::CommercialUse    => "comm_use_subset",
            LicenseCategory::NonCommercialUse => "noncomm_use_subset",
            LicenseCategory::CustomLicense    => "pmc_custom_license",
            LicenseCategory::Biorxiv          => "biorxiv_medrxiv",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == token)
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which categories a join should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategorySelector {
    #[default]
    All,
    /// The two Creative Commons "use" subsets.
    CcByLicense,
    Only(LicenseCategory),
}

impl CategorySelector {
    pub const ALL_TOKEN: &'static str = "all";
    pub const CC_BY_TOKEN: &'static str = "cc-by-license";

    /// Every token accepted by [`CategorySelector::from_str`].
    pub fn legal_values() -> Vec<&'static str> {
        let mut values = vec![Self::ALL_TOKEN, Self::CC_BY_TOKEN];
        values.extend(LicenseCategory::ALL.iter().map(LicenseCategory::as_str));
        values
    }

    pub fn categories(&self) -> Vec<LicenseCategory> {
        match self {
            CategorySelector::All         => LicenseCategory::ALL.to_vec(),
            CategorySelector::CcByLicense => vec![
                LicenseCategory::CommercialUse,
                LicenseCategory::NonCommercialUse,
            ],
            CategorySelector::Only(c)     => vec![*c],
        }
    }

    /// `all` keeps rows without a file; every other selector drops them.
    pub fn narrows(&self) -> bool {
        !matches!(self, CategorySelector::All)
    }

    pub fn admits(&self, category: LicenseCategory) -> bool {
        match self {
            CategorySelector::All         => true,
            CategorySelector::CcByLicense => matches!(
                category,
                LicenseCategory::CommercialUse | LicenseCategory::NonCommercialUse
            ),
            CategorySelector::Only(c)     => *c == category,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategorySelector::All         => Self::ALL_TOKEN,
            CategorySelector::CcByLicense => Self::CC_BY_TOKEN,
            CategorySelector::Only(c)     => c.as_str(),
        }
    }
}

impl FromStr for CategorySelector {
    type Err = CordPrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            Self::ALL_TOKEN   => Ok(CategorySelector::All),
            Self::CC_BY_TOKEN => Ok(CategorySelector::CcByLicense),
            other => LicenseCategory::from_token(other)
                .map(CategorySelector::Only)
                .ok_or_else(|| CordPrepError::InvalidSelector {
                    got: other.to_string(),
                    legal: Self::legal_values(),
                }),
        }
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Metadata table ────────────────────────────────────────────────────────────

/// Header of a metadata table with the positions of the columns the
/// pipeline reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: Vec<String>,
    id: usize,
    full_text: Option<usize>,
}

impl Columns {
    pub fn new(names: Vec<String>) -> Result<Self> {
        let id = names
            .iter()
            .position(|n| n == ID_COLUMN)
            .ok_or_else(|| CordPrepError::MissingColumn(ID_COLUMN.to_string()))?;
        let full_text = names.iter().position(|n| n == HAS_FULL_TEXT_COLUMN);
        Ok(Self { names, id, full_text })
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Blank identifiers are treated as absent.
    pub fn paper_id<'a>(&self, record: &'a MetadataRecord) -> Option<&'a str> {
        record.get(self.id)
    }

    pub fn has_full_text(&self, record: &MetadataRecord) -> bool {
        self.full_text
            .and_then(|idx| record.get(idx))
            .is_some_and(parse_flag)
    }

    pub(crate) fn id_index(&self) -> usize {
        self.id
    }
}

/// One row of the metadata table, values in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRecord {
    values: Vec<String>,
}

impl MetadataRecord {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at a column position; empty cells are `None`.
    pub fn get(&self, idx: usize) -> Option<&str> {
        self.values
            .get(idx)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

/// The base metadata table. Every cell is kept as a string so identifier
/// columns such as `pubmed_id` are never coerced to numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTable {
    columns: Columns,
    records: Vec<MetadataRecord>,
}

impl MetadataTable {
    /// Build a table, padding short records with empty cells. A record wider
    /// than the header is an error.
    pub fn new(columns: Vec<String>, records: Vec<MetadataRecord>) -> Result<Self> {
        let columns = Columns::new(columns)?;
        let width = columns.len();
        let records = records
            .into_iter()
            .enumerate()
            .map(|(row, mut r)| {
                if r.values.len() > width {
                    return Err(CordPrepError::RecordTooWide {
                        row: row + 1,
                        width: r.values.len(),
                        expected: width,
                    });
                }
                r.values.resize(width, String::new());
                Ok(r)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, records })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|e| CordPrepError::io(path, e))?;
        Self::from_reader(io::BufReader::new(file))
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        // Short rows are padded by `new`, like missing cells in pandas.
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns = reader.headers()?.iter().map(str::to_string).collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            records.push(MetadataRecord::new(record.iter().map(str::to_string).collect()));
        }

        Self::new(columns, records)
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn records(&self) -> &[MetadataRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn value<'a>(&self, record: &'a MetadataRecord, column: &str) -> Option<&'a str> {
        self.columns.index(column).and_then(|idx| record.get(idx))
    }

    pub fn into_parts(self) -> (Columns, Vec<MetadataRecord>) {
        (self.columns, self.records)
    }
}

/// Truthiness of a CSV flag cell as written by pandas and by hand.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim(), "true" | "True" | "TRUE" | "1")
}

// ── Files and joined rows ─────────────────────────────────────────────────────

/// A JSON document discovered under one of the category subdirectories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Identifier declared inside the document.
    pub sha: String,
    pub category: LicenseCategory,
    /// `<subdir>/<file name>`, relative to the data root.
    pub path: String,
}

impl FileRecord {
    pub fn file_type(&self) -> &'static str {
        self.category.dir_name()
    }
}

/// One row of the outer join. At least one side is always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRecord {
    pub metadata: Option<MetadataRecord>,
    pub file: Option<FileRecord>,
}

impl JoinedRecord {
    pub fn category(&self) -> Option<LicenseCategory> {
        self.file.as_ref().map(|f| f.category)
    }

    pub fn path(&self) -> Option<&str> {
        self.file.as_ref().map(|f| f.path.as_str())
    }
}

/// Metadata joined with file locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedTable {
    columns: Columns,
    records: Vec<JoinedRecord>,
}

impl JoinedTable {
    pub fn new(columns: Columns, records: Vec<JoinedRecord>) -> Self {
        Self { columns, records }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn records(&self) -> &[JoinedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn retain(&mut self, f: impl FnMut(&JoinedRecord) -> bool) {
        self.records.retain(f);
    }

    /// Identifier from the metadata side, else from the file side.
    pub fn paper_id<'a>(&self, record: &'a JoinedRecord) -> Option<&'a str> {
        record
            .metadata
            .as_ref()
            .and_then(|m| self.columns.paper_id(m))
            .or_else(|| record.file.as_ref().map(|f| f.sha.as_str()))
    }

    /// Rows without metadata never count as full text.
    pub fn has_full_text(&self, record: &JoinedRecord) -> bool {
        record
            .metadata
            .as_ref()
            .is_some_and(|m| self.columns.has_full_text(m))
    }

    pub fn value<'a>(&self, record: &'a JoinedRecord, column: &str) -> Option<&'a str> {
        match column {
            FILE_TYPE_COLUMN => record.file.as_ref().map(FileRecord::file_type),
            PATH_COLUMN => record.path(),
            _ => {
                let idx = self.columns.index(column)?;
                if idx == self.columns.id_index() {
                    return self.paper_id(record);
                }
                record.metadata.as_ref().and_then(|m| m.get(idx))
            }
        }
    }

    /// Rows that carry a file record.
    pub fn file_count(&self) -> usize {
        self.records.iter().filter(|r| r.file.is_some()).count()
    }

    /// Number of rows per category, in [`LicenseCategory::ALL`] order.
    pub fn category_counts(&self) -> Vec<(LicenseCategory, usize)> {
        LicenseCategory::ALL
            .iter()
            .map(|c| {
                let n = self.records.iter().filter(|r| r.category() == Some(*c)).count();
                (*c, n)
            })
            .collect()
    }

    /// Write the table as CSV: metadata columns, then `file_type` and `path`.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header: Vec<&str> = self.columns.names().iter().map(String::as_str).collect();
        header.extend([FILE_TYPE_COLUMN, PATH_COLUMN]);
        wtr.write_record(&header)?;

        let width = self.columns.len();
        for record in &self.records {
            let mut row: Vec<&str> = match &record.metadata {
                Some(m) => m.values().iter().map(String::as_str).collect(),
                None => vec![""; width],
            };
            if record.metadata.is_none() {
                if let (Some(slot), Some(file)) = (row.get_mut(self.columns.id_index()), &record.file) {
                    *slot = file.sha.as_str();
                }
            }
            row.push(record.file.as_ref().map_or("", FileRecord::file_type));
            row.push(record.path().unwrap_or(""));
            wtr.write_record(&row)?;
        }

        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

// ── Paper documents ───────────────────────────────────────────────────────────

/// A per-paper full-text JSON document. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct PaperDocument {
    pub paper_id: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
    #[serde(default, rename = "abstract")]
    pub abstract_entries: Vec<TextEntry>,
    #[serde(default)]
    pub body_text: Vec<BodyEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextEntry {
    #[serde(default)]
    pub text: String,
}

/// One body fragment and the heading it sits under.
#[derive(Debug, Clone, Deserialize)]
pub struct BodyEntry {
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub text: String,
}

impl PaperDocument {
    pub fn from_path(path: &Path) -> Result<Self> {
        read_json(path)
    }

    pub fn title(&self) -> &str {
        self.metadata.title.as_deref().unwrap_or("")
    }

    /// Text of the first abstract entry, or `""` when there is none.
    pub fn first_abstract(&self) -> &str {
        self.abstract_entries.first().map_or("", |e| e.text.as_str())
    }
}

/// Blocking read and parse of a JSON file.
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).map_err(|e| CordPrepError::io(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| CordPrepError::json(path, e))
}

// ── Sections ──────────────────────────────────────────────────────────────────

/// One (paper, section heading) row of the section table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub paper_id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub section: String,
    pub text: String,
    pub token_counts: usize,
}

impl SectionRecord {
    pub const COLUMNS: [&'static str; 6] =
        ["paper_id", "title", "abstract", "section", "text", "token_counts"];
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionTable {
    records: Vec<SectionRecord>,
}

impl SectionTable {
    pub fn new(records: Vec<SectionRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[SectionRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<SectionRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the table as CSV. The header is written even when empty.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        wtr.write_record(SectionRecord::COLUMNS)?;
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
