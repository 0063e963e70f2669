//! Exact inner-product vector index over surface-form embeddings.
//!
//! Rows are L2-normalized on insertion and queries on search, so the inner
//! product is the cosine similarity. The index is persisted as a `bincode`
//! blob next to a JSON labels file holding the parallel `forms` / `uris`
//! arrays; the two are always written and read together.

use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use ontolink_core::{EmbeddingBackend, Error, Result, Vector};

use crate::surface_forms::SurfaceFormTable;

/// Scale `vector` to unit length in place. Zero vectors are left unchanged.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

/// Order by descending score, then ascending row. NaN ranks last.
fn rank(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
    match (a.0.is_nan(), b.0.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => b
            .0
            .partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then(a.1.cmp(&b.1)),
    }
}

/// Flat index of unit vectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndex {
    dimension: usize,
    rows: Vec<Vector>,
}

impl VectorIndex {
    /// Empty index of the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            rows: Vec::new(),
        }
    }

    /// Build from raw vectors. All vectors must share one dimension.
    pub fn from_vectors(dimension: usize, vectors: Vec<Vector>) -> Result<Self> {
        let mut index = Self::new(dimension);
        for vector in vectors {
            index.add(vector)?;
        }
        Ok(index)
    }

    /// Embed `texts` in one batched call and index the results in order.
    pub async fn build(texts: &[String], backend: &dyn EmbeddingBackend) -> Result<Self> {
        let start = Instant::now();
        let vectors = backend.embed_texts(texts).await?;
        if vectors.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }

        let dimension = vectors
            .first()
            .map(Vec::len)
            .unwrap_or_else(|| backend.dimension());
        let index = Self::from_vectors(dimension, vectors)?;

        info!(
            model = backend.model_name(),
            result_count = index.len(),
            dimension,
            duration_ms = start.elapsed().as_millis() as u64,
            "Built vector index"
        );
        Ok(index)
    }

    /// Append one vector after normalizing it.
    pub fn add(&mut self, mut vector: Vector) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(Error::Index(format!(
                "Vector has dimension {}, index expects {}",
                vector.len(),
                self.dimension
            )));
        }
        l2_normalize(&mut vector);
        self.rows.push(vector);
        Ok(())
    }

    /// Top-`k` rows per query as `(score, row)`, best first.
    ///
    /// Ties keep insertion order. `k` beyond the row count returns every row.
    pub fn search(&self, queries: &[Vector], k: usize) -> Result<Vec<Vec<(f32, usize)>>> {
        queries
            .iter()
            .map(|query| self.search_one(query, k))
            .collect()
    }

    fn search_one(&self, query: &[f32], k: usize) -> Result<Vec<(f32, usize)>> {
        // An empty index has no real dimension to check against.
        if self.rows.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        if query.len() != self.dimension {
            return Err(Error::Index(format!(
                "Query has dimension {}, index expects {}",
                query.len(),
                self.dimension
            )));
        }

        let mut query = query.to_vec();
        l2_normalize(&mut query);

        let mut scored: Vec<(f32, usize)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(row, v)| (v.iter().zip(&query).map(|(a, b)| a * b).sum(), row))
            .collect();
        scored.sort_by(rank);
        scored.truncate(k);
        Ok(scored)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write the index blob, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        let writer = BufWriter::new(File::create(path)?);
        bincode::serialize_into(writer, self)?;
        Ok(())
    }

    /// Read an index blob written by [`Self::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(open(path, "Index file")?);
        let index: Self = bincode::deserialize_from(reader)?;
        if index.rows.iter().any(|r| r.len() != index.dimension) {
            return Err(Error::Index(format!(
                "{} contains rows that do not match dimension {}",
                path.display(),
                index.dimension
            )));
        }
        Ok(index)
    }
}

/// Parallel form / URI arrays stored next to the index blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub forms: Vec<String>,
    pub uris: Vec<String>,
}

impl Labels {
    pub fn from_table(table: &SurfaceFormTable) -> Self {
        Self {
            forms: table.forms(),
            uris: table.uris(),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        create_parent(path)?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(open(path.as_ref(), "Labels file")?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// One nearest-neighbour hit resolved to its surface form.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub form: String,
    pub uri: String,
    pub score: f32,
}

/// Vector index plus the labels that give its rows meaning.
#[derive(Debug, Clone)]
pub struct OntologyIndex {
    index: VectorIndex,
    labels: Labels,
}

impl OntologyIndex {
    /// Pair an index with its labels. Row counts must agree.
    pub fn new(index: VectorIndex, labels: Labels) -> Result<Self> {
        if labels.forms.len() != labels.uris.len() || labels.forms.len() != index.len() {
            return Err(Error::Index(format!(
                "Index/labels mismatch: {} rows, {} forms, {} uris",
                index.len(),
                labels.forms.len(),
                labels.uris.len()
            )));
        }
        Ok(Self { index, labels })
    }

    /// Embed every form of `table` and index them in file order.
    pub async fn build(table: &SurfaceFormTable, backend: &dyn EmbeddingBackend) -> Result<Self> {
        let labels = Labels::from_table(table);
        let index = VectorIndex::build(&labels.forms, backend).await?;
        Self::new(index, labels)
    }

    /// Write the index blob and the labels file.
    pub fn save(&self, index_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> Result<()> {
        self.index.save(index_path.as_ref())?;
        self.labels.save(labels_path.as_ref())?;
        info!(
            index = %index_path.as_ref().display(),
            labels = %labels_path.as_ref().display(),
            result_count = self.len(),
            "Saved ontology index"
        );
        Ok(())
    }

    /// Read both artifacts; a row count mismatch is fatal.
    pub fn load(index_path: impl AsRef<Path>, labels_path: impl AsRef<Path>) -> Result<Self> {
        let index = VectorIndex::load(index_path.as_ref())?;
        let labels = Labels::load(labels_path.as_ref())?;
        let loaded = Self::new(index, labels)?;
        debug!(
            result_count = loaded.len(),
            dimension = loaded.index.dimension(),
            "Loaded ontology index"
        );
        Ok(loaded)
    }

    /// Top-`k` candidates per query vector.
    pub fn search(&self, queries: &[Vector], k: usize) -> Result<Vec<Vec<Candidate>>> {
        let hits = self.index.search(queries, k)?;
        Ok(hits
            .into_iter()
            .map(|row_hits| {
                row_hits
                    .into_iter()
                    .map(|(score, row)| Candidate {
                        row,
                        form: self.labels.forms[row].clone(),
                        uri: self.labels.uris[row].clone(),
                        score,
                    })
                    .collect()
            })
            .collect())
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn open(path: &Path, what: &str) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::NotFound(format!("{} {}", what, path.display())),
        _ => Error::Io(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontolink_inference::mock::MockEmbeddingBackend;
    use tempfile::TempDir;

    fn axis_index() -> VectorIndex {
        VectorIndex::from_vectors(
            2,
            vec![vec![3.0, 0.0], vec![0.0, 2.0], vec![1.0, 1.0], vec![5.0, 0.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_l2_normalize() {
        let mut v = vec![3.0, 4.0];
        l2_normalize(&mut v);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        let mut zero = vec![0.0, 0.0];
        l2_normalize(&mut zero);
        assert_eq!(zero, vec![0.0, 0.0]);
    }

    #[test]
    fn test_search_ranks_and_breaks_ties_by_row() {
        let hits = axis_index().search(&[vec![10.0, 0.0]], 3).unwrap();
        let rows: Vec<usize> = hits[0].iter().map(|(_, r)| *r).collect();
        // rows 0 and 3 both score 1.0 after normalization
        assert_eq!(rows, vec![0, 3, 2]);
        assert!((hits[0][0].0 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_k_larger_than_rows() {
        let hits = axis_index().search(&[vec![0.0, 1.0]], 50).unwrap();
        assert_eq!(hits[0].len(), 4);
    }

    #[test]
    fn test_search_k_zero() {
        let hits = axis_index().search(&[vec![0.0, 1.0]], 0).unwrap();
        assert!(hits[0].is_empty());
    }

    #[test]
    fn test_zero_query_scores_zero() {
        let hits = axis_index().search(&[vec![0.0, 0.0]], 2).unwrap();
        assert!(hits[0].iter().all(|(s, _)| *s == 0.0));
        assert_eq!(hits[0][0].1, 0);
    }

    #[test]
    fn test_query_dimension_mismatch() {
        let err = axis_index().search(&[vec![1.0, 0.0, 0.0]], 1).unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[test]
    fn test_empty_index_ignores_query_dimension() {
        let hits = VectorIndex::new(768).search(&[vec![1.0, 0.0]], 5).unwrap();
        assert_eq!(hits, vec![Vec::new()]);
    }

    #[test]
    fn test_ragged_vectors_rejected() {
        let result = VectorIndex::from_vectors(2, vec![vec![1.0, 0.0], vec![1.0]]);
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_build_uses_one_batch() {
        let backend = MockEmbeddingBackend::new().with_dimension(4);
        let texts = vec!["Barolo".to_string(), "Chianti".to_string()];
        let index = VectorIndex::build(&texts, &backend).await.unwrap();

        assert_eq!(index.len(), 2);
        assert_eq!(index.dimension(), 4);
        assert_eq!(backend.calls(), vec![texts]);
    }

    #[tokio::test]
    async fn test_build_failure_is_fatal() {
        let backend = MockEmbeddingBackend::new().failing();
        let result = VectorIndex::build(&["Barolo".to_string()], &backend).await;
        assert!(matches!(result, Err(Error::Embedding(_))));
    }

    #[test]
    fn test_save_load_roundtrip_with_labels() {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("nested/ont_index.bin");
        let labels_path = dir.path().join("nested/labels.json");

        let labels = Labels {
            forms: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            uris: vec!["u:a".into(), "u:b".into(), "u:c".into(), "u:d".into()],
        };
        let original = OntologyIndex::new(axis_index(), labels.clone()).unwrap();
        original.save(&index_path, &labels_path).unwrap();

        let loaded = OntologyIndex::load(&index_path, &labels_path).unwrap();
        assert_eq!(loaded.labels(), &labels);
        let hits = loaded.search(&[vec![0.0, 1.0]], 1).unwrap();
        assert_eq!(hits[0][0].uri, "u:b");
    }

    #[test]
    fn test_load_detects_label_mismatch() {
        let dir = TempDir::new().unwrap();
        let index_path = dir.path().join("ont_index.bin");
        let labels_path = dir.path().join("labels.json");

        axis_index().save(&index_path).unwrap();
        Labels {
            forms: vec!["a".into()],
            uris: vec!["u:a".into()],
        }
        .save(&labels_path)
        .unwrap();

        let err = OntologyIndex::load(&index_path, &labels_path).unwrap_err();
        assert!(matches!(err, Error::Index(_)));
    }

    #[test]
    fn test_load_missing_index() {
        let dir = TempDir::new().unwrap();
        let err = OntologyIndex::load(dir.path().join("x.bin"), dir.path().join("y.json"))
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
