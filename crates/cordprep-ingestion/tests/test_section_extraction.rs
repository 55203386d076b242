//! Section extraction against an on-disk corpus.

mod common;

use cordprep_common::CordPrepError;
use cordprep_ingestion::{
    extract_sections, join_metadata, CategorySelector, MetadataSource, SectionRecord,
};
use pretty_assertions::assert_eq;

fn joined(root: &std::path::Path, selector: CategorySelector) -> cordprep_ingestion::JoinedTable {
    join_metadata(selector, root, MetadataSource::Default, None)
        .unwrap()
        .data
}

#[test]
fn test_groups_fragments_by_heading() {
    let tmp = common::corpus();
    let table = joined(tmp.path(), CategorySelector::CcByLicense);
    let sections = extract_sections(&table, tmp.path(), 0).unwrap();

    assert_eq!(
        sections.records(),
        &[
            SectionRecord {
                paper_id: "aaa".to_string(),
                title: "Paper A".to_string(),
                abstract_text: "Abstract A".to_string(),
                section: "Intro".to_string(),
                text: "A B".to_string(),
                token_counts: 2,
            },
            SectionRecord {
                paper_id: "aaa".to_string(),
                title: "Paper A".to_string(),
                abstract_text: "Abstract A".to_string(),
                section: "Results".to_string(),
                text: "C".to_string(),
                token_counts: 1,
            },
        ]
    );
}

#[test]
fn test_min_tokens_is_strict() {
    let tmp = common::corpus();
    common::write_doc(
        tmp.path(),
        "pmc_custom_license",
        "ddd.json",
        common::doc(
            "ddd",
            "Paper D",
            &[],
            &[("Exact", common::words(5).as_str()), ("Over", common::words(6).as_str())],
        ),
    );

    let table = joined(tmp.path(), CategorySelector::All);
    let sections = extract_sections(&table, tmp.path(), 5).unwrap();

    let kept: Vec<_> = sections.records().iter().map(|r| r.section.as_str()).collect();
    assert_eq!(kept, vec!["Over"]);
    assert_eq!(sections.records()[0].token_counts, 6);
    // Empty abstract list becomes an empty string.
    assert_eq!(sections.records()[0].abstract_text, "");
}

#[test]
fn test_metadata_only_full_text_row_needs_a_path() {
    let tmp = common::corpus();
    std::fs::remove_file(tmp.path().join("comm_use_subset").join("aaa.json")).unwrap();

    let table = joined(tmp.path(), CategorySelector::All);
    let err = extract_sections(&table, tmp.path(), 0).unwrap_err();
    assert!(matches!(err, CordPrepError::MissingPath(id) if id == "aaa"));
}

#[test]
fn test_vanished_document_propagates_io_error() {
    let tmp = common::corpus();
    let table = joined(tmp.path(), CategorySelector::CcByLicense);
    std::fs::remove_file(tmp.path().join("comm_use_subset").join("bbb.json")).unwrap();

    let err = extract_sections(&table, tmp.path(), 0).unwrap_err();
    assert!(matches!(err, CordPrepError::Io { .. }));
}

#[test]
fn test_section_csv_is_idempotent() {
    let tmp = common::corpus();
    let render = || {
        let table = joined(tmp.path(), CategorySelector::All);
        let sections = extract_sections(&table, tmp.path(), 0).unwrap();
        let mut buf = Vec::new();
        sections.write_csv(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    };

    let first = render();
    assert_eq!(first, render());
    assert_eq!(
        first,
        "paper_id,title,abstract,section,text,token_counts\n\
         aaa,Paper A,Abstract A,Intro,A B,2\n\
         aaa,Paper A,Abstract A,Results,C,1\n"
    );
}
