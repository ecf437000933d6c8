//! Declarative field extraction: locate, pick, read text, transform, parse

use std::fmt;

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize, Serializer};

use super::locator::{element_text, Locator};
use super::transform::{apply_all, Transform};
use crate::error::ParseError;

/// Which candidate to read when a locator yields several.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pick {
    #[default]
    First,
    /// Zero-based position in document order.
    Nth(usize),
    Last,
}

impl Pick {
    pub fn select<'a>(&self, candidates: &[ElementRef<'a>]) -> Option<ElementRef<'a>> {
        match self {
            Self::First => candidates.first().copied(),
            Self::Nth(i) => candidates.get(*i).copied(),
            Self::Last => candidates.last().copied(),
        }
    }
}

/// Target type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Integer,
    Double,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Integer => "integer",
            Self::Double => "double",
            Self::Text => "text",
        })
    }
}

/// A typed field value, or its absence from the page.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractedValue {
    Integer(i64),
    Double(f64),
    Text(String),
    Absent,
}

impl Serialize for ExtractedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Integer(n) => serializer.serialize_i64(*n),
            Self::Double(n) => serializer.serialize_f64(*n),
            Self::Text(s) => serializer.serialize_str(s),
            Self::Absent => serializer.serialize_none(),
        }
    }
}

/// How to read one named attribute from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub locator: Locator,
    #[serde(default)]
    pub pick: Pick,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Transform>,
    pub kind: ValueKind,
}

impl FieldSpec {
    pub fn new(name: &str, locator: Locator, kind: ValueKind) -> Self {
        Self {
            name: name.to_string(),
            locator,
            pick: Pick::First,
            transform: Vec::new(),
            kind,
        }
    }

    pub fn pick(mut self, pick: Pick) -> Self {
        self.pick = pick;
        self
    }

    pub fn transform(mut self, steps: impl IntoIterator<Item = Transform>) -> Self {
        self.transform.extend(steps);
        self
    }
}

/// Extract one field from a document.
///
/// A missing node, empty text or a transform that leaves nothing is
/// `Ok(Absent)`. Text that survives the transforms but does not parse as the
/// field's kind is an error.
pub fn extract(document: &Html, spec: &FieldSpec) -> Result<ExtractedValue, ParseError> {
    let candidates = spec.locator.locate(document);
    let Some(element) = spec.pick.select(&candidates) else {
        return Ok(ExtractedValue::Absent);
    };

    let text = element_text(&element);
    match apply_all(&text, &spec.transform) {
        Some(value) => parse_value(&spec.name, &value, spec.kind),
        None => Ok(ExtractedValue::Absent),
    }
}

/// Parse transformed text. Numbers may carry whitespace thousands separators.
pub fn parse_value(field: &str, text: &str, kind: ValueKind) -> Result<ExtractedValue, ParseError> {
    let error = |reason: String| ParseError {
        field: field.to_string(),
        text: text.to_string(),
        kind,
        reason,
    };

    match kind {
        ValueKind::Text => Ok(ExtractedValue::Text(text.trim().to_string())),
        ValueKind::Integer => strip_whitespace(text)
            .parse::<i64>()
            .map(ExtractedValue::Integer)
            .map_err(|e| error(e.to_string())),
        ValueKind::Double => {
            let value = strip_whitespace(text)
                .parse::<f64>()
                .map_err(|e| error(e.to_string()))?;
            if value.is_finite() {
                Ok(ExtractedValue::Double(value))
            } else {
                Err(error("not a finite number".to_string()))
            }
        }
    }
}

fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::TextMatch;

    fn value_cell(label: &str) -> Locator {
        Locator::labelled(
            "div",
            TextMatch::Is(label.into()),
            "div",
            "span.dt-param-value",
        )
        .unwrap()
    }

    fn page(rows: &[(&str, &str)]) -> Html {
        let body: String = rows
            .iter()
            .map(|(label, value)| {
                format!(r#"<div>{label}</div><div><span class="dt-param-value">{value}</span></div>"#)
            })
            .collect();
        Html::parse_document(&format!("<html><body>{body}</body></html>"))
    }

    #[test]
    fn test_missing_node_is_absent() {
        let document = page(&[("Szerokość", "1 842 mm")]);
        let spec = FieldSpec::new("length", value_cell("Długość"), ValueKind::Integer);
        assert_eq!(extract(&document, &spec), Ok(ExtractedValue::Absent));
    }

    #[test]
    fn test_table_of_transforms() {
        let cases: Vec<(&str, Vec<Transform>, ValueKind, ExtractedValue)> = vec![
            (
                "1 234 mm",
                vec![Transform::remove("mm")],
                ValueKind::Integer,
                ExtractedValue::Integer(1234),
            ),
            (
                "9,8 s",
                vec![Transform::replace(",", "."), Transform::remove("s")],
                ValueKind::Double,
                ExtractedValue::Double(9.8),
            ),
            (
                "190 KM (140 kW)",
                vec![Transform::token(0)],
                ValueKind::Integer,
                ExtractedValue::Integer(190),
            ),
            (
                "6,4 l/100km -",
                vec![
                    Transform::remove("l/100km"),
                    Transform::replace(",", "."),
                    Transform::remove("-"),
                ],
                ValueKind::Double,
                ExtractedValue::Double(6.4),
            ),
            (
                "  benzyna  ",
                vec![],
                ValueKind::Text,
                ExtractedValue::Text("benzyna".into()),
            ),
        ];

        for (text, transform, kind, expected) in cases {
            let document = page(&[("Pole", text)]);
            let spec = FieldSpec::new("pole", value_cell("Pole"), kind).transform(transform);
            assert_eq!(extract(&document, &spec), Ok(expected), "text {text:?}");
        }
    }

    #[test]
    fn test_empty_after_transform_is_absent() {
        let document = page(&[("Średnia", "-")]);
        let spec = FieldSpec::new("fuel-avg", value_cell("Średnia"), ValueKind::Double)
            .transform([Transform::remove("-")]);
        assert_eq!(extract(&document, &spec), Ok(ExtractedValue::Absent));

        let document = page(&[("Średnia", "   ")]);
        let spec = FieldSpec::new("fuel-avg", value_cell("Średnia"), ValueKind::Double);
        assert_eq!(extract(&document, &spec), Ok(ExtractedValue::Absent));
    }

    #[test]
    fn test_malformed_number_is_error() {
        let document = page(&[("Moc", "dużo KM")]);
        let spec = FieldSpec::new("hp", value_cell("Moc"), ValueKind::Integer)
            .transform([Transform::token(0)]);

        let err = extract(&document, &spec).unwrap_err();
        assert_eq!(err.field, "hp");
        assert_eq!(err.text, "dużo");
        assert_eq!(err.kind, ValueKind::Integer);
    }

    #[test]
    fn test_positional_pick() {
        let document = page(&[("Średnia", "6,1"), ("Średnia", "8,9")]);
        let base = FieldSpec::new("avg", value_cell("Średnia"), ValueKind::Double)
            .transform([Transform::replace(",", ".")]);

        assert_eq!(extract(&document, &base), Ok(ExtractedValue::Double(6.1)));
        let second = base.clone().pick(Pick::Nth(1));
        assert_eq!(extract(&document, &second), Ok(ExtractedValue::Double(8.9)));
        let last = base.clone().pick(Pick::Last);
        assert_eq!(extract(&document, &last), Ok(ExtractedValue::Double(8.9)));
        let third = base.pick(Pick::Nth(2));
        assert_eq!(extract(&document, &third), Ok(ExtractedValue::Absent));
    }

    #[test]
    fn test_value_serialization() {
        let values = vec![
            ExtractedValue::Integer(5),
            ExtractedValue::Double(9.8),
            ExtractedValue::Text("LPG".into()),
            ExtractedValue::Absent,
        ];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[5,9.8,"LPG",null]"#);
    }

    #[test]
    fn test_field_spec_from_json() {
        let spec: FieldSpec = serde_json::from_str(
            r#"{
                "name": "lpg-fuel-avg",
                "locator": {"kind": "css", "selector": "div.satehr-small"},
                "pick": {"nth": 1},
                "transform": [{"replace": {"from": ",", "to": "."}}],
                "kind": "double"
            }"#,
        )
        .unwrap();
        assert_eq!(spec.pick, Pick::Nth(1));
        assert_eq!(spec.kind, ValueKind::Double);

        let defaults: FieldSpec = serde_json::from_str(
            r#"{"name": "doors", "locator": {"kind": "css", "selector": "b"}, "kind": "integer"}"#,
        )
        .unwrap();
        assert_eq!(defaults.pick, Pick::First);
        assert!(defaults.transform.is_empty());
    }
}
