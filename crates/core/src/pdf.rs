//! PDF page concatenation.
//!
//! A rendered document and a client-supplied PDF are combined by grafting the second file's
//! pages onto the first file's page tree.

use crate::{CoreError, CoreResult};
use lopdf::{Document, Object, ObjectId};
use std::path::Path;

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against malformed page trees whose `Parent` links loop.
const MAX_PAGE_TREE_DEPTH: usize = 64;

/// Returns a PDF with every page of `first` followed by every page of `second`.
///
/// Page order within each input is preserved. Attributes the appended pages inherited from
/// their old page tree are copied onto the pages before they are re-parented.
///
/// # Errors
///
/// Returns `CoreError::Pdf` if either buffer is not a readable PDF or `first` has no page tree,
/// and `CoreError::PdfWrite` if the merged document cannot be serialised.
pub fn merge_pdfs(first: &[u8], second: &[u8]) -> CoreResult<Vec<u8>> {
    let mut base = Document::load_mem(first)?;
    let mut appended = Document::load_mem(second)?;

    appended.renumber_objects_with(base.max_id + 1);
    base.max_id = appended
        .objects
        .keys()
        .map(|(id, _)| *id)
        .max()
        .unwrap_or(0)
        .max(base.max_id);

    let base_pages_id = base.catalog()?.get(b"Pages")?.as_reference()?;
    let appended_pages: Vec<ObjectId> = appended.get_pages().into_values().collect();

    for page_id in &appended_pages {
        let inherited = inherited_page_attributes(&appended, *page_id)?;
        let page = appended.get_object_mut(*page_id)?.as_dict_mut()?;
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", base_pages_id);
    }

    for (id, object) in appended.objects {
        if !is_page_tree_scaffolding(&object) {
            base.objects.insert(id, object);
        }
    }

    let pages = base.get_object_mut(base_pages_id)?.as_dict_mut()?;
    let count = pages.get(b"Count")?.as_i64()?;
    pages
        .get_mut(b"Kids")?
        .as_array_mut()?
        .extend(appended_pages.iter().map(|id| Object::Reference(*id)));
    pages.set("Count", Object::Integer(count + appended_pages.len() as i64));

    let mut out = Vec::new();
    base.save_to(&mut out).map_err(|e| CoreError::PdfWrite(e.to_string()))?;
    Ok(out)
}

/// Number of pages in a PDF buffer.
pub fn page_count(bytes: &[u8]) -> CoreResult<usize> {
    Ok(Document::load_mem(bytes)?.get_pages().len())
}

/// Name for the PDF rendition of a document: `Report.docx` becomes `Report.pdf`.
pub fn pdf_file_name_for(document_name: &str) -> String {
    let stem = Path::new(document_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .unwrap_or("document");
    format!("{stem}.pdf")
}

/// Attributes missing on the page itself that an ancestor page-tree node provides.
fn inherited_page_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> CoreResult<Vec<(&'static [u8], Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut missing: Vec<&'static [u8]> = INHERITABLE_PAGE_KEYS
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();

    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(parent_id) = parent {
        if missing.is_empty() || depth >= MAX_PAGE_TREE_DEPTH {
            break;
        }
        let node = doc.get_dictionary(parent_id)?;
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }

    Ok(found)
}

fn is_page_tree_scaffolding(object: &Object) -> bool {
    let Object::Dictionary(dict) = object else {
        return false;
    };
    dict.get(b"Type")
        .and_then(Object::as_name)
        .map(|name| name == b"Catalog".as_slice() || name == b"Pages".as_slice())
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod test_support {
    use lopdf::{dictionary, Document, Object};

    /// Builds a PDF whose pages have the given MediaBox widths so tests can tell them apart.
    pub(crate) fn pdf_with_page_widths(widths: &[i64]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let kids: Vec<Object> = widths
            .iter()
            .map(|width| {
                let page_id = doc.add_object(dictionary! {
                    "Type" => Object::Name(b"Page".to_vec()),
                    "Parent" => Object::Reference(pages_id),
                    "MediaBox" => Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(*width),
                        Object::Integer(842),
                    ])
                });
                Object::Reference(page_id)
            })
            .collect();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => Object::Name(b"Pages".to_vec()),
                "Kids" => Object::Array(kids),
                "Count" => Object::Integer(widths.len() as i64)
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => Object::Name(b"Catalog".to_vec()),
            "Pages" => Object::Reference(pages_id)
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut out = Vec::new();
        doc.save_to(&mut out).expect("in-memory save");
        out
    }
}
