//! Document framework seam.
//!
//! The viewer core only needs four things from a PDF backend: open a file,
//! count pages, measure a page, and write the document back out. Those are
//! expressed as the object-safe [`PdfEngine`] / [`PdfDocument`] traits so
//! the rest of the workspace can be driven by fakes in tests. The default
//! backend parses with `lopdf`; each opened document is exclusively owned
//! by its caller.

use lopdf::{Document, Object, ObjectId};
use std::fs;
use std::path::{Path, PathBuf};

/// Page dimensions in points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(#[from] lopdf::Error),
    #[error("encrypted PDFs are not supported in the default backend")]
    EncryptedUnsupported,
    #[error("backend error: {0}")]
    Backend(String),
}

/// One open document, exclusively owned by its session.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Size of a page, or `None` when the index is out of range.
    fn page_size(&self, page_index: usize) -> Option<PageSize>;

    /// Write the full document state to `path`.
    ///
    /// The write is all-or-nothing: on failure the file previously at
    /// `path` (if any) is left intact.
    fn write_to(&mut self, path: &Path) -> Result<(), PdfEngineError>;
}

/// Opens documents. Stateless and shareable; sessions own what it returns.
pub trait PdfEngine {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfEngineError>;
}

/// Default `lopdf`-backed engine.
#[derive(Debug, Default)]
pub struct LopdfEngine;

impl LopdfEngine {
    pub fn new() -> Self {
        Self
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&self, path: &Path) -> Result<Box<dyn PdfDocument>, PdfEngineError> {
        let doc = Document::load(path)?;

        if doc.is_encrypted() {
            return Err(PdfEngineError::EncryptedUnsupported);
        }

        let page_sizes = page_sizes(&doc);
        if page_sizes.is_empty() {
            return Err(PdfEngineError::Backend("document has no pages".to_owned()));
        }

        Ok(Box::new(LopdfDocument { doc, page_sizes }))
    }
}

/// US Letter, used when a page carries no usable MediaBox.
const FALLBACK_PAGE: PageSize = PageSize { width_pt: 612.0, height_pt: 792.0 };

fn page_sizes(doc: &Document) -> Vec<PageSize> {
    doc.get_pages()
        .into_values()
        .map(|page_id| inherited_media_box(doc, page_id).unwrap_or(FALLBACK_PAGE))
        .collect()
}

/// MediaBox is inheritable: a page without its own entry uses the nearest
/// ancestor's in the Pages tree.
fn inherited_media_box(doc: &Document, page_id: ObjectId) -> Option<PageSize> {
    let mut current = Some(page_id);
    // Parent chains are short in well-formed files; the cap breaks cycles.
    for _ in 0..32 {
        let dict = doc.get_dictionary(current?).ok()?;
        if let Some(size) = dict.get(b"MediaBox").ok().and_then(|obj| box_size(doc, obj)) {
            return Some(size);
        }
        current = dict.get(b"Parent").ok().and_then(|parent| parent.as_reference().ok());
    }
    None
}

fn box_size(doc: &Document, obj: &Object) -> Option<PageSize> {
    let array = match obj {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_array().ok()?,
        other => other.as_array().ok()?,
    };

    if array.len() != 4 {
        return None;
    }
    let x0 = array[0].as_float().ok()?;
    let y0 = array[1].as_float().ok()?;
    let x1 = array[2].as_float().ok()?;
    let y1 = array[3].as_float().ok()?;
    Some(PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() })
}

struct LopdfDocument {
    doc: Document,
    page_sizes: Vec<PageSize>,
}

impl PdfDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_sizes.len()
    }

    fn page_size(&self, page_index: usize) -> Option<PageSize> {
        self.page_sizes.get(page_index).copied()
    }

    fn write_to(&mut self, path: &Path) -> Result<(), PdfEngineError> {
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;

        // Stage next to the target so the rename stays on one filesystem.
        let staging = staging_path(path);
        if let Err(err) = fs::write(&staging, &bytes) {
            // Drop whatever partial bytes made it to disk.
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        if let Err(err) = fs::rename(&staging, path) {
            let _ = fs::remove_file(&staging);
            return Err(err.into());
        }

        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn sample_document(page_count: usize) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        for _ in 0..page_count {
            let content = Content { operations: vec![Operation::new("BT", vec![])] };
            let content_id = doc.add_object(Stream::new(
                dictionary! {},
                content.encode().expect("content should encode"),
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    fn write_sample(dir: &Path, name: &str, page_count: usize) -> PathBuf {
        let path = dir.join(name);
        let mut doc = sample_document(page_count);
        doc.save(&path).expect("fixture should save");
        path
    }

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_sample(temp.path(), "three.pdf", 3);

        let doc = LopdfEngine::new().open(&path).expect("open should succeed");
        assert_eq!(doc.page_count(), 3);
    }

    #[test]
    fn page_size_comes_from_media_box() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_sample(temp.path(), "one.pdf", 1);

        let doc = LopdfEngine::new().open(&path).expect("open should succeed");
        let size = doc.page_size(0).expect("page 0 should exist");
        assert_eq!(size.width_pt, 595.0);
        assert_eq!(size.height_pt, 842.0);
        assert!(doc.page_size(1).is_none());
    }

    #[test]
    fn page_media_box_overrides_inherited_one() {
        let temp = tempfile::tempdir().expect("temp dir should be created");

        // Page 1 carries its own MediaBox; page 2 inherits the A4 box
        // from the Pages node.
        let mut doc = sample_document(2);
        let first = *doc.get_pages().values().next().expect("fixture should have pages");
        doc.get_object_mut(first)
            .expect("page object should exist")
            .as_dict_mut()
            .expect("page should be a dictionary")
            .set("MediaBox", vec![0.into(), 0.into(), 300.into(), 400.into()]);
        let path = temp.path().join("mixed.pdf");
        doc.save(&path).expect("fixture should save");

        let opened = LopdfEngine::new().open(&path).expect("open should succeed");
        let own = opened.page_size(0).expect("page 0 should exist");
        assert_eq!(own.width_pt, 300.0);
        assert_eq!(own.height_pt, 400.0);
        let inherited = opened.page_size(1).expect("page 1 should exist");
        assert_eq!(inherited.width_pt, 595.0);
        assert_eq!(inherited.height_pt, 842.0);
    }

    #[test]
    fn missing_file_fails_to_open() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let result = LopdfEngine::new().open(&temp.path().join("absent.pdf"));
        assert!(result.is_err());
    }

    #[test]
    fn write_to_round_trips() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_sample(temp.path(), "source.pdf", 2);

        let mut doc = LopdfEngine::new().open(&path).expect("open should succeed");
        let copy = temp.path().join("copy.pdf");
        doc.write_to(&copy).expect("write should succeed");

        let reopened = LopdfEngine::new().open(&copy).expect("reopen should succeed");
        assert_eq!(reopened.page_count(), 2);
    }

    #[test]
    fn failed_write_leaves_no_staging_file() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let path = write_sample(temp.path(), "source.pdf", 1);

        let mut doc = LopdfEngine::new().open(&path).expect("open should succeed");
        let target = temp.path().join("no-such-dir").join("out.pdf");
        assert!(doc.write_to(&target).is_err());
        assert!(!temp.path().join("no-such-dir").exists());
    }

    #[test]
    fn failed_staging_write_leaves_target_intact() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let source = write_sample(temp.path(), "source.pdf", 2);
        let target = write_sample(temp.path(), "target.pdf", 1);

        // A directory squatting on the staging path makes the staged
        // write fail.
        fs::create_dir(temp.path().join("target.pdf.partial")).expect("dir should be created");

        let mut doc = LopdfEngine::new().open(&source).expect("open should succeed");
        assert!(doc.write_to(&target).is_err());

        let reopened = LopdfEngine::new().open(&target).expect("target should still open");
        assert_eq!(reopened.page_count(), 1);
    }
}
