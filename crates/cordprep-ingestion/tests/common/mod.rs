//! On-disk corpus fixture shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;

pub const METADATA_CSV: &str = "\
sha,title,abstract,has_full_text,pubmed_id
aaa,Paper A,Abstract A,True,0001
bbb,Paper B,,True,0002
ccc,Paper C,Abstract C,False,0003
ddd,Paper D,Abstract D,True,0004
eee,Paper E,Abstract E,True,0005
hhh,Paper H,,False,0006
,No Sha,,False,0007
";

pub fn write_doc(root: &Path, dir: &str, file_name: &str, doc: serde_json::Value) {
    let dir = root.join(dir);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(file_name), serde_json::to_vec_pretty(&doc).unwrap()).unwrap();
}

pub fn doc(paper_id: &str, title: &str, abstracts: &[&str], body: &[(&str, &str)]) -> serde_json::Value {
    json!({
        "paper_id": paper_id,
        "metadata": { "title": title, "authors": [] },
        "abstract": abstracts.iter().map(|t| json!({ "text": t, "cite_spans": [] })).collect::<Vec<_>>(),
        "body_text": body
            .iter()
            .map(|(s, t)| json!({ "section": s, "text": t, "cite_spans": [] }))
            .collect::<Vec<_>>(),
        "bib_entries": {}
    })
}

/// `n` distinct words.
pub fn words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

/// Seven metadata rows (one without a sha), six documents across the four
/// categories, one of them declaring an id that differs from its file name.
pub fn corpus() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path();
    fs::write(root.join("all_sources_metadata_2020-03-13.csv"), METADATA_CSV).unwrap();

    write_doc(root, "comm_use_subset", "aaa.json", doc(
        "aaa",
        "Paper A",
        &["Abstract A"],
        &[("Intro", "A"), ("Intro", "B"), ("Results", "C")],
    ));
    write_doc(root, "comm_use_subset", "bbb.json", doc("bbb", "Paper B", &[], &[]));
    write_doc(root, "noncomm_use_subset", "ccc.json", doc("ccc", "Paper C", &["Abstract C"], &[]));
    write_doc(root, "pmc_custom_license", "ddd.json", doc("ddd", "Paper D", &["Abstract D"], &[]));
    write_doc(root, "biorxiv_medrxiv", "eee.json", doc("eee", "Paper E", &[], &[]));
    write_doc(root, "biorxiv_medrxiv", "fff.json", doc("ggg", "Paper G", &[], &[]));
    tmp
}
