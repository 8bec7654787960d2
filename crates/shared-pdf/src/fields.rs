//! Signature field enumeration
//!
//! Walks `/AcroForm /Fields` and collects every terminal field whose
//! (possibly inherited) `/FT` is `/Sig`, together with the values of its
//! signature dictionary.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use lopdf::{Dictionary, Document, Object, ObjectId};

use crate::object::{dict_entry, dict_entry_dict, name, number, resolve, text};

/// Field tree levels walked before giving up
const MAX_FIELD_DEPTH: usize = 32;

/// Widget rectangle in PDF points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// One signature field as found in the document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignatureFieldRecord {
    /// Fully qualified field name
    pub name: Option<String>,
    /// One-based page number of the widget
    pub page: Option<u32>,
    pub rect: Option<FieldRect>,
    /// Raw `/Contents` bytes, usually a DER CMS blob padded with zeros
    pub contents: Option<Vec<u8>>,
    pub byte_range: Option<Vec<i64>>,
    /// Raw `/M` date string
    pub signing_time: Option<String>,
    pub sub_filter: Option<String>,
    /// `/Name` entry of the signature dictionary
    pub signer_name: Option<String>,
}

struct Walker<'a> {
    doc: &'a Document,
    page_numbers: BTreeMap<ObjectId, u32>,
    records: Vec<SignatureFieldRecord>,
    /// Field objects already walked; a form may reference a field twice
    visited: BTreeSet<ObjectId>,
}

/// List every signature field in the interactive form.
///
/// Documents without an AcroForm have no signature fields.
pub fn enumerate_signature_fields(doc: &Document) -> Vec<SignatureFieldRecord> {
    let Some(fields) = acro_form_fields(doc) else {
        return Vec::new();
    };

    let page_numbers = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number))
        .collect();

    let mut walker = Walker {
        doc,
        page_numbers,
        records: Vec::new(),
        visited: BTreeSet::new(),
    };
    for field in fields {
        walker.visit(field, None, None, 0);
    }

    tracing::debug!(count = walker.records.len(), "Enumerated signature fields");
    walker.records
}

fn acro_form_fields(doc: &Document) -> Option<&Vec<Object>> {
    let root = doc.trailer.get(b"Root").ok()?;
    let catalog = resolve(doc, root)?.as_dict().ok()?;
    let acro_form = dict_entry_dict(doc, catalog, b"AcroForm")?;
    dict_entry(doc, acro_form, b"Fields")?.as_array().ok()
}

impl<'a> Walker<'a> {
    fn visit(
        &mut self,
        object: &'a Object,
        parent_name: Option<&str>,
        inherited_type: Option<&str>,
        depth: usize,
    ) {
        if depth > MAX_FIELD_DEPTH {
            tracing::warn!(depth, "Field tree too deep, stopping");
            return;
        }
        let doc = self.doc;
        let object_id = match object {
            Object::Reference(id) => Some(*id),
            _ => None,
        };
        if let Some(id) = object_id {
            if !self.visited.insert(id) {
                tracing::warn!(?id, "Field already visited, skipping");
                return;
            }
        }
        let Some(dict) = resolve(doc, object).and_then(|o| o.as_dict().ok()) else {
            return;
        };

        let qualified = match (parent_name, text(doc, dict, b"T")) {
            (Some(parent), Some(partial)) => Some(format!("{}.{}", parent, partial)),
            (None, Some(partial)) => Some(partial),
            (parent, None) => parent.map(str::to_string),
        };
        let field_type = name(doc, dict, b"FT");
        let field_type = field_type.as_deref().or(inherited_type);

        let kids = dict_entry(doc, dict, b"Kids").and_then(|k| k.as_array().ok());
        let field_kids: Vec<&'a Object> = kids
            .map(|kids| {
                kids.iter()
                    .filter(|kid| {
                        resolve(doc, kid)
                            .and_then(|o| o.as_dict().ok())
                            .is_some_and(|d| d.has(b"T"))
                    })
                    .collect()
            })
            .unwrap_or_default();

        if !field_kids.is_empty() {
            for kid in field_kids {
                self.visit(kid, qualified.as_deref(), field_type, depth + 1);
            }
            return;
        }

        if field_type != Some("Sig") {
            return;
        }

        // Merged field/widget, or the first widget kid
        let widget = if dict.has(b"Rect") {
            Some((object_id, dict))
        } else {
            kids.and_then(|kids| kids.first()).and_then(|kid| {
                let id = match kid {
                    Object::Reference(id) => Some(*id),
                    _ => None,
                };
                resolve(doc, kid)
                    .and_then(|o| o.as_dict().ok())
                    .map(|d| (id, d))
            })
        };

        let record = self.build_record(qualified, dict, widget);
        self.records.push(record);
    }

    fn build_record(
        &self,
        qualified_name: Option<String>,
        field: &Dictionary,
        widget: Option<(Option<ObjectId>, &Dictionary)>,
    ) -> SignatureFieldRecord {
        let doc = self.doc;
        let mut record = SignatureFieldRecord {
            name: qualified_name,
            ..Default::default()
        };

        if let Some((widget_id, widget)) = widget {
            record.rect = widget_rect(doc, widget);
            record.page = self.widget_page(widget_id, widget);
        }

        if let Some(value) = dict_entry_dict(doc, field, b"V") {
            record.contents = match dict_entry(doc, value, b"Contents") {
                Some(Object::String(bytes, _)) => Some(bytes.clone()),
                _ => None,
            };
            record.byte_range = dict_entry(doc, value, b"ByteRange")
                .and_then(|o| o.as_array().ok())
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| match resolve(doc, v) {
                            Some(Object::Integer(i)) => Some(*i),
                            _ => None,
                        })
                        .collect()
                });
            record.signing_time = text(doc, value, b"M");
            record.sub_filter = name(doc, value, b"SubFilter");
            record.signer_name = text(doc, value, b"Name");
        }

        record
    }

    fn widget_page(&self, widget_id: Option<ObjectId>, widget: &Dictionary) -> Option<u32> {
        if let Ok(Object::Reference(page_id)) = widget.get(b"P") {
            if let Some(page) = self.page_numbers.get(page_id) {
                return Some(*page);
            }
        }

        // No usable /P, look for the widget in each page's /Annots
        let widget_id = widget_id?;
        self.page_numbers.iter().find_map(|(page_id, page)| {
            let page_dict = self.doc.get_dictionary(*page_id).ok()?;
            let annots = dict_entry(self.doc, page_dict, b"Annots")?.as_array().ok()?;
            annots
                .iter()
                .any(|a| matches!(a, Object::Reference(id) if *id == widget_id))
                .then_some(*page)
        })
    }
}

fn widget_rect(doc: &Document, widget: &Dictionary) -> Option<FieldRect> {
    let values = dict_entry(doc, widget, b"Rect")?.as_array().ok()?;
    if values.len() != 4 {
        return None;
    }
    let c: Vec<f64> = values
        .iter()
        .map(|v| number(doc, v))
        .collect::<Option<_>>()?;
    Some(FieldRect {
        x: c[0].min(c[2]),
        y: c[1].min(c[3]),
        width: (c[2] - c[0]).abs(),
        height: (c[3] - c[1]).abs(),
    })
}

/// Next free `SigN` field name.
///
/// N is one more than the number of signature fields already named
/// `Sig...`, bumped further if that name is taken.
pub fn next_signature_field_name(doc: &Document) -> String {
    let names: Vec<String> = enumerate_signature_fields(doc)
        .into_iter()
        .filter_map(|f| f.name)
        .collect();

    let mut n = names.iter().filter(|n| n.starts_with("Sig")).count() + 1;
    while names.iter().any(|existing| *existing == format!("Sig{}", n)) {
        n += 1;
    }
    format!("Sig{}", n)
}

/// [`next_signature_field_name`] for a file, `Sig1` when it cannot be read
pub fn signature_field_name_for_path(path: &Path) -> String {
    match crate::open_document(path) {
        Ok(doc) => next_signature_field_name(&doc),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read existing fields, defaulting to Sig1");
            "Sig1".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_pdf, FieldSpec};
    use lopdf::{dictionary, StringFormat};
    use pretty_assertions::assert_eq;

    fn load(bytes: &[u8]) -> Document {
        crate::load_document(bytes).unwrap()
    }

    #[test]
    fn test_no_acro_form_means_no_fields() {
        let doc = load(&create_test_pdf(1, &[]));
        assert!(enumerate_signature_fields(&doc).is_empty());
    }

    #[test]
    fn test_enumerates_fields_with_values() {
        let mut first = FieldSpec::new("Sig1", 0);
        first.signer = Some("Ana Pérez");
        first.signing_time = Some("D:20240315103000+01'00'");
        let mut second = FieldSpec::new("Firma", 1);
        second.rect = [300, 50, 200, 90];

        let doc = load(&create_test_pdf(2, &[first, second]));
        let fields = enumerate_signature_fields(&doc);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name.as_deref(), Some("Sig1"));
        assert_eq!(fields[0].page, Some(1));
        assert_eq!(
            fields[0].rect,
            Some(FieldRect {
                x: 100.0,
                y: 100.0,
                width: 150.0,
                height: 60.0
            })
        );
        assert_eq!(fields[0].byte_range, Some(vec![0, 10, 20, 30]));
        assert_eq!(fields[0].contents, Some(vec![0x30, 0x03, 0x02, 0x01, 0x00]));
        assert_eq!(fields[0].signer_name.as_deref(), Some("Ana Pérez"));
        assert_eq!(
            fields[0].signing_time.as_deref(),
            Some("D:20240315103000+01'00'")
        );
        assert_eq!(fields[0].sub_filter.as_deref(), Some("adbe.pkcs7.detached"));

        assert_eq!(fields[1].name.as_deref(), Some("Firma"));
        assert_eq!(fields[1].page, Some(2));
        assert_eq!(
            fields[1].rect,
            Some(FieldRect {
                x: 200.0,
                y: 50.0,
                width: 100.0,
                height: 40.0
            })
        );
    }

    #[test]
    fn test_nested_fields_inherit_type_and_find_page_through_annots() {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        let parent_id = doc.new_object_id();

        let sig_id = doc.add_object(dictionary! {
            "Type" => "Sig",
            "Contents" => Object::String(vec![1, 2, 3], StringFormat::Hexadecimal),
        });
        // Terminal field with a separate widget kid, no /P anywhere
        let widget_id = doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "Rect" => vec![10.into(), 20.into(), 60.into(), 45.into()],
        });
        let child_id = doc.add_object(dictionary! {
            "T" => Object::string_literal("approval"),
            "Parent" => Object::Reference(parent_id),
            "V" => Object::Reference(sig_id),
            "Kids" => vec![Object::Reference(widget_id)],
        });
        doc.objects.insert(
            parent_id,
            Object::Dictionary(dictionary! {
                "FT" => "Sig",
                "T" => Object::string_literal("signatures"),
                "Kids" => vec![Object::Reference(child_id)],
            }),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => Object::Reference(pages_id),
                "Annots" => vec![Object::Reference(widget_id)],
            }),
        );
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => dictionary! {
                "Fields" => vec![Object::Reference(parent_id)],
            },
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let fields = enumerate_signature_fields(&doc);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name.as_deref(), Some("signatures.approval"));
        assert_eq!(fields[0].page, Some(1));
        assert_eq!(fields[0].contents, Some(vec![1, 2, 3]));
        assert_eq!(fields[0].byte_range, None);
        assert_eq!(
            fields[0].rect,
            Some(FieldRect {
                x: 10.0,
                y: 20.0,
                width: 50.0,
                height: 25.0
            })
        );
    }

    /// One-page document whose AcroForm lists `fields`
    fn form_document(doc: &mut Document, fields: Vec<Object>) {
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
            "AcroForm" => dictionary! { "Fields" => fields },
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));
    }

    #[test]
    fn test_field_listing_itself_as_kid_terminates() {
        let mut doc = Document::with_version("1.7");
        let field_id = doc.new_object_id();
        doc.objects.insert(
            field_id,
            Object::Dictionary(dictionary! {
                "FT" => "Sig",
                "T" => Object::string_literal("loop"),
                "Kids" => vec![Object::Reference(field_id), Object::Reference(field_id)],
            }),
        );
        form_document(&mut doc, vec![Object::Reference(field_id)]);

        assert!(enumerate_signature_fields(&doc).is_empty());
        assert_eq!(next_signature_field_name(&doc), "Sig1");
    }

    #[test]
    fn test_field_listed_twice_is_reported_once() {
        let mut doc = Document::with_version("1.7");
        let field_id = doc.add_object(dictionary! {
            "FT" => "Sig",
            "T" => Object::string_literal("Sig1"),
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        });
        form_document(
            &mut doc,
            vec![Object::Reference(field_id), Object::Reference(field_id)],
        );

        let fields = enumerate_signature_fields(&doc);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].name.as_deref(), Some("Sig1"));
        assert_eq!(next_signature_field_name(&doc), "Sig2");
    }

    #[test]
    fn test_next_name_without_fields() {
        let doc = load(&create_test_pdf(1, &[]));
        assert_eq!(next_signature_field_name(&doc), "Sig1");
    }

    #[test]
    fn test_next_name_counts_existing() {
        let doc = load(&create_test_pdf(
            1,
            &[FieldSpec::new("Sig1", 0), FieldSpec::new("Other", 0)],
        ));
        assert_eq!(next_signature_field_name(&doc), "Sig2");
    }

    #[test]
    fn test_next_name_skips_taken_names() {
        let doc = load(&create_test_pdf(
            1,
            &[FieldSpec::new("Sig1", 0), FieldSpec::new("Sig3", 0)],
        ));
        assert_eq!(next_signature_field_name(&doc), "Sig4");
    }

    #[test]
    fn test_name_for_unreadable_path_defaults() {
        assert_eq!(
            signature_field_name_for_path(Path::new("/nonexistent/in.pdf")),
            "Sig1"
        );
    }
}
