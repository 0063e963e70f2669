//! Web Annotation (OA) export as Turtle, with optional triple store upload.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, warn};

use ontolink_core::{defaults, AnnotationSet, Error, Result};

const PREFIXES: &str = "\
@prefix oa: <http://www.w3.org/ns/oa#> .
@prefix dcterms: <http://purl.org/dc/terms/> .
@prefix xsd: <http://www.w3.org/2001/XMLSchema#> .
";

/// Whether `uri` can be written between `<` and `>` in Turtle.
pub fn is_valid_iri(uri: &str) -> bool {
    !uri.is_empty()
        && !uri.chars().any(|c| {
            c <= ' ' || matches!(c, '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\')
        })
}

/// Escape a value for a double-quoted Turtle string literal.
pub fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out
}

/// Render annotations as OA Turtle, one `<ann_N>` node per record in sorted
/// record order. Records whose URI is not a valid IRI are skipped.
pub fn to_turtle(records: &AnnotationSet, created: DateTime<Utc>) -> String {
    let created = created.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut ttl = String::from(PREFIXES);
    let mut emitted = 0usize;

    for record in records.sorted() {
        if !is_valid_iri(&record.uri) {
            warn!(doc = %record.doc, uri = %record.uri, "Skipping annotation with invalid IRI");
            continue;
        }
        ttl.push_str(&format!(
            "\n<ann_{}> a oa:Annotation ;\n    \
             oa:hasBody <{}> ;\n    \
             oa:hasTarget [\n        \
             a oa:SpecificResource ;\n        \
             oa:hasSource \"{}\" ;\n        \
             oa:hasSelector [\n            \
             a oa:TextPositionSelector ;\n            \
             oa:start {} ;\n            \
             oa:end {}\n        \
             ]\n    \
             ] ;\n    \
             dcterms:created \"{}\"^^xsd:dateTime .\n",
            emitted,
            record.uri,
            escape_literal(&record.doc),
            record.start,
            record.end,
            created
        ));
        emitted += 1;
    }

    info!(result_count = emitted, skipped = records.len() - emitted, "Rendered Turtle");
    ttl
}

/// POST Turtle to `{repo_url}/statements` (RDF4J / GraphDB protocol).
///
/// Returns the response status on success.
pub async fn upload_turtle(repo_url: &str, body: String) -> Result<u16> {
    let url = format!("{}/statements", repo_url.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(defaults::UPLOAD_TIMEOUT_SECS))
        .build()?;

    let response = client
        .post(&url)
        .header("Content-Type", "text/turtle")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let snippet: String = text.chars().take(200).collect();
        return Err(Error::Request(format!(
            "Triple store returned {}: {}",
            status, snippet
        )));
    }

    info!(url = %url, status = status.as_u16(), "Uploaded Turtle");
    Ok(status.as_u16())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ontolink_core::NormalizedRecord;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_single_annotation_structure() {
        let records: AnnotationSet =
            [NormalizedRecord::new("d1.txt", 8, 14, "http://ex.org/wine/Barolo")]
                .into_iter()
                .collect();
        let ttl = to_turtle(&records, created());

        assert!(ttl.starts_with("@prefix oa: <http://www.w3.org/ns/oa#> ."));
        assert!(ttl.contains("<ann_0> a oa:Annotation ;"));
        assert!(ttl.contains("oa:hasBody <http://ex.org/wine/Barolo> ;"));
        assert!(ttl.contains("oa:hasSource \"d1.txt\" ;"));
        assert!(ttl.contains("oa:start 8 ;"));
        assert!(ttl.contains("oa:end 14\n"));
        assert!(ttl.contains("dcterms:created \"2026-03-01T12:30:00Z\"^^xsd:dateTime ."));
        assert!(!ttl.contains("<ann_1>"));
    }

    #[test]
    fn test_sorted_order_and_numbering() {
        let records: AnnotationSet = [
            NormalizedRecord::new("b", 0, 1, "http://ex.org/B"),
            NormalizedRecord::new("a", 5, 6, "http://ex.org/A"),
        ]
        .into_iter()
        .collect();
        let ttl = to_turtle(&records, created());

        let first = ttl.find("<ann_0>").unwrap();
        let second = ttl.find("<ann_1>").unwrap();
        let a = ttl.find("http://ex.org/A").unwrap();
        let b = ttl.find("http://ex.org/B").unwrap();
        assert!(first < a && a < second && second < b);
    }

    #[test]
    fn test_doc_is_escaped() {
        let records: AnnotationSet = [NormalizedRecord::new(
            "say \"hi\"\\\n.txt",
            0,
            1,
            "http://ex.org/A",
        )]
        .into_iter()
        .collect();
        let ttl = to_turtle(&records, created());
        assert!(ttl.contains(r#"oa:hasSource "say \"hi\"\\\n.txt" ;"#));
    }

    #[test]
    fn test_invalid_iri_skipped() {
        let records: AnnotationSet = [
            NormalizedRecord::new("a", 0, 1, "http://ex.org/has space"),
            NormalizedRecord::new("a", 0, 1, "http://ex.org/ok"),
        ]
        .into_iter()
        .collect();
        let ttl = to_turtle(&records, created());
        assert!(ttl.contains("<ann_0>"));
        assert!(!ttl.contains("<ann_1>"));
        assert!(!ttl.contains("has space"));
    }

    #[test]
    fn test_iri_validation() {
        assert!(is_valid_iri("http://ex.org/wine#Barolo"));
        assert!(is_valid_iri("http://ex.org/vin/Rosé"));
        assert!(!is_valid_iri(""));
        assert!(!is_valid_iri("http://ex.org/<x>"));
        assert!(!is_valid_iri("http://ex.org/a|b"));
    }

    #[test]
    fn test_empty_set_is_prefixes_only() {
        assert_eq!(to_turtle(&AnnotationSet::new(), created()), PREFIXES);
    }
}
