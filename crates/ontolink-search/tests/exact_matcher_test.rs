//! Surface-form CSV to exact-match annotations.

use std::io::Write;

use ontolink_search::{ExactMatcher, SurfaceFormIndex};
use tempfile::NamedTempFile;

fn forms_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_csv_to_annotations() {
    let csv = forms_file(
        "form,uri\n\
         Chianti Classico,http://ex.org/wine/ChiantiClassico\n\
         Chianti,http://ex.org/wine/Chianti\n\
         chianti,http://ex.org/region/ChiantiRegion\n",
    );
    let index = SurfaceFormIndex::load(csv.path()).unwrap();
    let matcher = ExactMatcher::new(&index).unwrap();

    let found = matcher.find("review.txt", "A Chianti Classico from the chianti hills.");
    let tuples: Vec<(usize, usize, &str)> = found
        .iter()
        .map(|a| (a.start, a.end, a.uri.as_str()))
        .collect();

    assert_eq!(
        tuples,
        vec![
            (2, 18, "http://ex.org/wine/ChiantiClassico"),
            (2, 9, "http://ex.org/wine/Chianti"),
            (2, 9, "http://ex.org/region/ChiantiRegion"),
            (28, 35, "http://ex.org/wine/Chianti"),
            (28, 35, "http://ex.org/region/ChiantiRegion"),
        ]
    );
}

#[test]
fn test_matcher_reused_across_documents() {
    let csv = forms_file("uri,form\nhttp://ex.org/wine/Soave,Soave\n");
    let matcher = ExactMatcher::new(&SurfaceFormIndex::load(csv.path()).unwrap()).unwrap();

    assert_eq!(matcher.find("a", "Soave.").len(), 1);
    assert_eq!(matcher.find("b", "soave and SOAVE").len(), 2);
    assert!(matcher.find("c", "Soaves").is_empty());
}

#[test]
fn test_missing_column_fails_to_load() {
    let csv = forms_file("uri,label\nhttp://ex.org/wine/Soave,Soave\n");
    assert!(SurfaceFormIndex::load(csv.path()).is_err());
}
