//! Provenance marker vocabulary

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    /// Left by our own signing system
    OwnSystem,
    /// Left by a third-party signing product
    ForeignSystem,
    /// Signature dictionary structure, any producer
    GenericSignature,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvidenceMarker {
    pub pattern: Vec<u8>,
    pub category: MarkerCategory,
}

impl EvidenceMarker {
    pub fn new(pattern: impl Into<Vec<u8>>, category: MarkerCategory) -> Self {
        Self {
            pattern: pattern.into(),
            category,
        }
    }

    /// Pattern as text, for logs
    pub fn label(&self) -> String {
        String::from_utf8_lossy(&self.pattern).into_owned()
    }
}

const OWN_SYSTEM_MARKERS: &[&str] = &[
    "Digital Sign",
    "QR Code",
    "Digital Sign CA",
    "CiberSegur",
    "DigitalSign",
    "Firmado por CiberSegur",
    "pyHanko",
    "Digital Sign System",
    "Firmado electrónicamente por Digital Sign",
];

const FOREIGN_SYSTEM_MARKERS: &[&str] = &[
    "Adobe Systems",
    "Adobe Acrobat",
    "Adobe Reader",
    "Microsoft",
    "Foxit",
    "PDF-XChange",
    "Bluebeam",
];

const GENERIC_SIGNATURE_MARKERS: &[&str] = &[
    "/Sig",
    "/Signature",
    "/Type /Sig",
    "/SubFilter",
    "/Contents",
    "/ByteRange",
    "/Filter /Adobe.PPKLite",
    "/Filter /Adobe.PPKMS",
];

/// Fixed set of markers, built once and handed to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerVocabulary {
    markers: Vec<EvidenceMarker>,
}

impl Default for MarkerVocabulary {
    fn default() -> Self {
        let tagged = |patterns: &[&str], category| {
            patterns
                .iter()
                .map(move |p| EvidenceMarker::new(p.as_bytes(), category))
                .collect::<Vec<_>>()
        };

        let mut markers = tagged(OWN_SYSTEM_MARKERS, MarkerCategory::OwnSystem);
        markers.extend(tagged(FOREIGN_SYSTEM_MARKERS, MarkerCategory::ForeignSystem));
        markers.extend(tagged(
            GENERIC_SIGNATURE_MARKERS,
            MarkerCategory::GenericSignature,
        ));
        Self { markers }
    }
}

impl MarkerVocabulary {
    pub fn new(markers: Vec<EvidenceMarker>) -> Self {
        Self { markers }
    }

    pub fn markers(&self) -> &[EvidenceMarker] {
        &self.markers
    }

    /// Substring membership test of every marker against `haystack`
    pub fn scan(&self, haystack: &[u8]) -> MarkerScan {
        let mut scan = MarkerScan::default();
        for marker in &self.markers {
            if !contains(haystack, &marker.pattern) {
                continue;
            }
            let bucket = match marker.category {
                MarkerCategory::OwnSystem => &mut scan.own,
                MarkerCategory::ForeignSystem => &mut scan.foreign,
                MarkerCategory::GenericSignature => &mut scan.generic,
            };
            let label = marker.label();
            if !bucket.contains(&label) {
                bucket.push(label);
            }
        }
        scan
    }
}

/// Markers found in one document, by category, in vocabulary order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerScan {
    pub own: Vec<String>,
    pub foreign: Vec<String>,
    pub generic: Vec<String>,
}

impl MarkerScan {
    /// Distinct generic signature markers present
    pub fn generic_count(&self) -> usize {
        self.generic.len()
    }

    /// Add the markers of `other` not already present
    pub fn merge(&mut self, other: MarkerScan) {
        let pairs = [
            (&mut self.own, other.own),
            (&mut self.foreign, other.foreign),
            (&mut self.generic, other.generic),
        ];
        for (bucket, labels) in pairs {
            for label in labels {
                if !bucket.contains(&label) {
                    bucket.push(label);
                }
            }
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.windows(needle.len()).any(|window| window == needle)
}
