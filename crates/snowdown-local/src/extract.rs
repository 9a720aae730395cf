use crate::textprep;
use snowdown_core::{DocumentSource, Error, Result};
use std::path::PathBuf;

/// Page separator in flattened text.
pub const PAGE_BREAK: &str = "\n\n";

/// Best-effort sniff for PDF bytes (magic header).
pub fn bytes_look_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Join page texts in document order: runs inside a page are separated by
/// single spaces, pages by [`PAGE_BREAK`]. Pages with no text are dropped.
pub fn flatten_pages<I, S>(pages: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    pages
        .into_iter()
        .map(|p| textprep::norm_ws(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PAGE_BREAK)
}

/// Extract flattened text from an in-memory PDF.
pub fn pdf_to_flattened_text(bytes: &[u8]) -> Result<String> {
    if !bytes_look_like_pdf(bytes) {
        return Err(Error::Document("not a pdf (missing %PDF- header)".to_string()));
    }
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| Error::Document(e.to_string()))?;
    let text = flatten_pages(&pages);
    if text.is_empty() {
        return Err(Error::Document("pdf has no text layer".to_string()));
    }
    Ok(text)
}

#[derive(Debug, Clone)]
enum PdfInput {
    Path(PathBuf),
    Bytes(std::sync::Arc<Vec<u8>>),
}

/// The bundled schedule PDF.
#[derive(Debug, Clone)]
pub struct PdfSource {
    input: PdfInput,
}

impl PdfSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: PdfInput::Path(path.into()),
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            input: PdfInput::Bytes(std::sync::Arc::new(bytes)),
        }
    }
}

#[async_trait::async_trait]
impl DocumentSource for PdfSource {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    async fn flattened_text(&self) -> Result<String> {
        let input = self.input.clone();
        // Parsing is CPU-bound; a panic inside the parser surfaces as a join error.
        tokio::task::spawn_blocking(move || match input {
            PdfInput::Path(p) => {
                let bytes = std::fs::read(&p)
                    .map_err(|e| Error::Document(format!("{}: {e}", p.display())))?;
                pdf_to_flattened_text(&bytes)
            }
            PdfInput::Bytes(b) => pdf_to_flattened_text(&b),
        })
        .await
        .map_err(|e| Error::Document(format!("pdf extraction join failed: {e}")))?
    }
}

/// Already-flattened text, e.g. produced by an external tool or a test fixture.
#[derive(Debug, Clone)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait::async_trait]
impl DocumentSource for StaticText {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn flattened_text(&self) -> Result<String> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_look_like_pdf_sniffs_magic_header() {
        assert!(bytes_look_like_pdf(b"%PDF-1.7\n%..."));
        assert!(!bytes_look_like_pdf(b"<!doctype html><html>"));
        assert!(!bytes_look_like_pdf(b""));
    }

    /// Minimal uncompressed PDF with one Courier text line per page.
    fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for line in lines {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![72.into(), 700.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*line)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    #[test]
    fn flatten_pages_joins_runs_with_spaces_and_pages_with_breaks() {
        let pages = ["SNOWDOWN\n2026\n", "\n\n", "POLAR   PLUNGE\nTake a dip"];
        assert_eq!(flatten_pages(pages), "SNOWDOWN 2026\n\nPOLAR PLUNGE Take a dip");
    }

    #[test]
    fn pdf_pages_are_flattened_in_order_with_page_breaks() {
        let bytes = pdf_with_pages(&["PAGEONE", "PAGETWO"]);
        let text = pdf_to_flattened_text(&bytes).unwrap();
        assert_eq!(text, format!("PAGEONE{PAGE_BREAK}PAGETWO"));
    }

    #[tokio::test]
    async fn pdf_source_extracts_real_document() {
        let src = PdfSource::from_bytes(pdf_with_pages(&["POLAR PLUNGE", "SNOWSHOE RACE"]));
        let text = src.flattened_text().await.unwrap();
        assert_eq!(text.split(PAGE_BREAK).collect::<Vec<_>>(), vec!["POLAR PLUNGE", "SNOWSHOE RACE"]);
    }

    #[test]
    fn non_pdf_bytes_are_a_document_error() {
        let err = pdf_to_flattened_text(b"hello").unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[tokio::test]
    async fn missing_pdf_file_is_a_document_error() {
        let src = PdfSource::from_path("/definitely/not/here/schedule.pdf");
        let err = src.flattened_text().await.unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }

    #[tokio::test]
    async fn garbage_pdf_bytes_fail_without_panicking_the_caller() {
        let src = PdfSource::from_bytes(b"%PDF-1.7\nthis is not really a pdf".to_vec());
        assert!(src.flattened_text().await.is_err());
    }
}
