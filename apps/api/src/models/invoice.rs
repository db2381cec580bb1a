use serde::{Deserialize, Serialize};

/// A single billable line on an invoice, as sent by the dashboard.
///
/// Monetary fields are carried through untouched; the layout engine only reads
/// `title` and `notes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub fee_type: String,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub quantity_unit: Option<String>,
    #[serde(default)]
    pub sub_quantity: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount: Option<f64>,
}

impl LineItem {
    /// Notes with surrounding whitespace removed, or `None` when there is nothing to print.
    pub fn printable_notes(&self) -> Option<&str> {
        self.notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_camel_case_with_missing_fields() {
        let item: LineItem = serde_json::from_str(
            r#"{"title":"Audit","feeType":"Professional Fee","unitPrice":1200.5,"quantity":2}"#,
        )
        .unwrap();
        assert_eq!(item.title, "Audit");
        assert_eq!(item.fee_type, "Professional Fee");
        assert_eq!(item.quantity, 2.0);
        assert!(item.notes.is_none());
        assert!(item.discount.is_none());
    }

    #[test]
    fn test_empty_object_defaults() {
        let item: LineItem = serde_json::from_str("{}").unwrap();
        assert_eq!(item, LineItem::default());
    }

    #[test]
    fn test_printable_notes_ignores_whitespace_only() {
        let item = LineItem {
            notes: Some("  \n\t ".to_string()),
            ..Default::default()
        };
        assert_eq!(item.printable_notes(), None);

        let item = LineItem {
            notes: Some("\n Filing fee \n".to_string()),
            ..Default::default()
        };
        assert_eq!(item.printable_notes(), Some("Filing fee"));
    }
}
