// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Submitted-record types returned by the listing endpoint, plus the small
// presentation helpers the records list relies on.

use serde::{Deserialize, Deserializer, Serialize};

/// A previously submitted civil-registry record.
///
/// The backend sends `null` for fields it has not filled in yet; those
/// decode as empty or `None` so one incomplete row never rejects a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub document_type: String,
    /// Processed TIFF; absent until the backend has produced it.
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub pdf_url: Option<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RecordSummary {
    /// The image reference, if one is present and not blank.
    pub fn image_reference(&self) -> Option<&str> {
        self.image_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// "First Middle Last Suffix" with absent parts skipped.
    pub fn full_name(&self) -> String {
        [
            Some(self.first_name.as_str()),
            self.middle_name.as_deref(),
            Some(self.last_name.as_str()),
            self.suffix.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Human label for the document type, e.g. `fetus_death` -> `Fetus Death`.
    pub fn document_type_label(&self) -> String {
        format_label(&self.document_type)
    }

    /// Case-insensitive search over full name and document type. A blank
    /// query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        needle.is_empty()
            || self.full_name().to_lowercase().contains(&needle)
            || self.document_type.to_lowercase().contains(&needle)
    }
}

/// Replace underscores with spaces and capitalise the first letter of each word.
pub fn format_label(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if at_word_start && ch.is_alphanumeric() {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric());
    }
    out
}

/// Records whose full name or document type contains `query`, ignoring case.
pub fn filter_records<'a>(records: &'a [RecordSummary], query: &str) -> Vec<&'a RecordSummary> {
    records.iter().filter(|record| record.matches(query)).collect()
}

/// One page of the paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    #[serde(default)]
    pub data: Vec<RecordSummary>,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub current_page: Option<u32>,
}

fn first_page() -> u32 {
    1
}

/// Listing body as served: either the page itself or wrapped in `{ "data": ... }`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListingBody {
    Flat(DocumentPage),
    Wrapped { data: DocumentPage },
}

impl ListingBody {
    pub fn into_page(self) -> DocumentPage {
        match self {
            Self::Wrapped { data } => data,
            Self::Flat(page) => page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(first: &str, middle: Option<&str>, last: &str, doc_type: &str) -> RecordSummary {
        RecordSummary {
            id: Some(1),
            first_name: first.into(),
            middle_name: middle.map(Into::into),
            last_name: last.into(),
            suffix: None,
            document_type: doc_type.into(),
            image_url: Some("http://host/storage/a.tiff".into()),
            pdf_url: None,
        }
    }

    #[test]
    fn full_name_skips_missing_parts() {
        assert_eq!(record("Ana", None, "Cruz", "death").full_name(), "Ana Cruz");
        assert_eq!(
            record("Ana", Some("Lim"), "Cruz", "death").full_name(),
            "Ana Lim Cruz"
        );
    }

    #[test]
    fn format_label_capitalises_words() {
        assert_eq!(format_label("live_birth"), "Live Birth");
        assert_eq!(format_label("fetus_death"), "Fetus Death");
        assert_eq!(format_label(""), "");
    }

    #[test]
    fn filter_matches_name_or_type() {
        let records = vec![
            record("Ana", None, "Cruz", "death"),
            record("Ben", None, "Reyes", "marriage"),
        ];
        assert_eq!(filter_records(&records, "cruz").len(), 1);
        assert_eq!(filter_records(&records, "MARR").len(), 1);
        assert_eq!(filter_records(&records, "").len(), 2);
        assert!(filter_records(&records, "nobody").is_empty());
    }

    #[test]
    fn listing_body_accepts_both_shapes() {
        let record = r#"{"first_name":"A","last_name":"B","document_type":"death","image_url":"x.tiff"}"#;
        let flat = format!(r#"{{"data":[{record}],"last_page":3}}"#);
        let wrapped = format!(r#"{{"data":{{"data":[{record}],"last_page":3}}}}"#);

        for body in [flat, wrapped] {
            let page = serde_json::from_str::<ListingBody>(&body)
                .expect("parse")
                .into_page();
            assert_eq!(page.data.len(), 1);
            assert_eq!(page.last_page, 3);
        }
    }

    #[test]
    fn incomplete_rows_do_not_reject_the_page() {
        let body = r#"{"data":[
            {"first_name":"Ana","last_name":"Cruz","document_type":"death","image_url":"a.tiff"},
            {"first_name":"Ben","last_name":null,"document_type":"birth","image_url":null},
            {"first_name":"Cy","last_name":"Lee","document_type":"birth","image_url":"  "},
            {"first_name":"Di","last_name":"Yu","document_type":"birth"}
        ],"last_page":2}"#;
        let page = serde_json::from_str::<ListingBody>(body)
            .expect("parse")
            .into_page();

        assert_eq!(page.data.len(), 4);
        assert_eq!(page.data[0].image_reference(), Some("a.tiff"));
        assert_eq!(page.data[1].full_name(), "Ben");
        assert_eq!(page.data[1].image_reference(), None);
        assert_eq!(page.data[2].image_reference(), None);
        assert_eq!(page.data[3].image_reference(), None);
    }

    #[test]
    fn empty_flat_listing_keeps_last_page() {
        let page = serde_json::from_str::<ListingBody>(r#"{"data":[],"last_page":4}"#)
            .expect("parse")
            .into_page();
        assert!(page.data.is_empty());
        assert_eq!(page.last_page, 4);
    }
}
