//! Invoice records and the attribute dictionaries seeded onto documents

use crate::attributes::{AttributeSet, AttributeValue};
use chrono::{NaiveDate, Utc};
use thiserror::Error;

/// Expected number of columns in an invoice row.
const ROW_COLUMNS: usize = 16;

/// Failure mapping a CSV row into an [`InvoiceRecord`].
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("invoice row needs {ROW_COLUMNS} columns, got {0}")]
    Columns(usize),

    #[error("column {column} ({label}) is not an integer: {value}")]
    Integer {
        column: usize,
        label: &'static str,
        value: String,
    },

    #[error("column {column} ({label}) is not a M/D/YYYY date: {value}")]
    Date {
        column: usize,
        label: &'static str,
        value: String,
    },
}

/// One trade-finance invoice, as read from an operator-supplied row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceRecord {
    pub reference_id: String,
    pub asset_identifier: String,
    pub invoice_number: String,
    pub transaction_type: String,
    pub entity_number: i64,
    pub entity_name: String,
    pub payee: String,
    pub payor: String,
    pub invoice_currency: String,
    pub invoice_amount: String,
    pub payment_terms: i64,
    pub invoice_date: NaiveDate,
    pub due_date: NaiveDate,
    pub risk_score: String,
    pub collateral_value: String,
    pub schema_name: String,
}

fn parse_int(row: &[&str], column: usize, label: &'static str) -> Result<i64, RecordError> {
    row[column].trim().parse().map_err(|_| RecordError::Integer {
        column,
        label,
        value: row[column].to_string(),
    })
}

fn parse_date(row: &[&str], column: usize, label: &'static str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(row[column].trim(), "%m/%d/%Y").map_err(|_| RecordError::Date {
        column,
        label,
        value: row[column].to_string(),
    })
}

impl InvoiceRecord {
    /// Map one CSV row into a record.
    ///
    /// Monetary columns may carry thousands separators; those are stripped.
    pub fn from_row(row: &[&str]) -> Result<Self, RecordError> {
        if row.len() != ROW_COLUMNS {
            return Err(RecordError::Columns(row.len()));
        }

        Ok(Self {
            reference_id: row[0].to_string(),
            asset_identifier: row[1].to_string(),
            invoice_number: row[2].to_string(),
            transaction_type: row[3].to_string(),
            entity_number: parse_int(row, 4, "entity_number")?,
            entity_name: row[5].to_string(),
            payee: row[6].to_string(),
            payor: row[7].to_string(),
            invoice_currency: row[8].to_string(),
            invoice_amount: row[9].replace(',', ""),
            payment_terms: parse_int(row, 10, "payment_terms")?,
            invoice_date: parse_date(row, 11, "invoice_date")?,
            due_date: parse_date(row, 12, "due_date")?,
            risk_score: row[13].to_string(),
            collateral_value: row[14].replace(',', ""),
            schema_name: row[15].to_string(),
        })
    }

    /// A fixed demo invoice used when no rows file is supplied.
    pub fn demo() -> Self {
        Self {
            reference_id: "CF-001".to_string(),
            asset_identifier: String::new(),
            invoice_number: "9500667307".to_string(),
            transaction_type: "invoice".to_string(),
            entity_number: 1,
            entity_name: "TechCargo".to_string(),
            payee: "Seeboard".to_string(),
            payor: "Daimler".to_string(),
            invoice_currency: "USD".to_string(),
            invoice_amount: "1000".to_string(),
            payment_terms: 30,
            invoice_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or_default(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap_or_default(),
            risk_score: "1".to_string(),
            collateral_value: "1100".to_string(),
            schema_name: "generic".to_string(),
        }
    }

    /// Attributes the document owner seeds before the first anchor.
    ///
    /// `originator` and `document_id` are the node's 0x-hex identifiers and
    /// land as byte attributes; either is skipped when empty (a freshly
    /// created document has no id to reference yet).
    pub fn initial_attributes(&self, originator: &str, document_id: &str) -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.insert(
            "reference_id".to_string(),
            AttributeValue::string(&self.reference_id),
        );
        attrs.insert(
            "invoice_nr".to_string(),
            AttributeValue::string(&self.invoice_number),
        );
        attrs.insert(
            "entity_name".to_string(),
            AttributeValue::string(&self.entity_name),
        );
        attrs.insert("payee".to_string(), AttributeValue::string(&self.payee));
        attrs.insert("payor".to_string(), AttributeValue::string(&self.payor));
        attrs.insert(
            "currency".to_string(),
            AttributeValue::string(&self.invoice_currency),
        );
        attrs.insert(
            "MaturityDate".to_string(),
            AttributeValue::timestamp(Utc::now()),
        );
        if !originator.is_empty() {
            attrs.insert("Originator".to_string(), AttributeValue::bytes(originator));
        }
        if !document_id.is_empty() {
            attrs.insert(
                "AssetIdentifier".to_string(),
                AttributeValue::bytes(document_id),
            );
        }
        attrs
    }

    /// Attributes the collaborator supplies for the compute rule's inputs.
    pub fn compute_attributes(&self) -> AttributeSet {
        let mut attrs = AttributeSet::new();
        attrs.insert(
            "AssetValue".to_string(),
            AttributeValue::integer(&self.collateral_value),
        );
        attrs.insert(
            "RiskScore".to_string(),
            AttributeValue::integer(&self.risk_score),
        );
        attrs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeKind;

    fn demo_row() -> Vec<&'static str> {
        vec![
            "CF-001",
            "ASSET-9",
            "9500667307",
            "invoice",
            "4",
            "TechCargo",
            "Seeboard",
            "Daimler",
            "USD",
            "1,000",
            "30",
            "3/1/2024",
            "3/31/2024",
            "1",
            "1,100",
            "generic",
        ]
    }

    #[test]
    fn maps_a_row() {
        let record = InvoiceRecord::from_row(&demo_row()).unwrap();
        assert_eq!(record.entity_number, 4);
        assert_eq!(record.invoice_amount, "1000");
        assert_eq!(record.collateral_value, "1100");
        assert_eq!(
            record.invoice_date,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert_eq!(record.schema_name, "generic");
    }

    #[test]
    fn rejects_short_rows() {
        let err = InvoiceRecord::from_row(&["CF-001"]).unwrap_err();
        assert!(matches!(err, RecordError::Columns(1)));
    }

    #[test]
    fn rejects_bad_dates() {
        let mut row = demo_row();
        row[11] = "2024-03-01";
        assert!(matches!(
            InvoiceRecord::from_row(&row),
            Err(RecordError::Date { column: 11, .. })
        ));
    }

    #[test]
    fn initial_attributes_cover_the_dictionary() {
        let record = InvoiceRecord::demo();
        let attrs = record.initial_attributes("0xab", "0xcd");
        for label in [
            "reference_id",
            "invoice_nr",
            "entity_name",
            "payee",
            "payor",
            "currency",
            "MaturityDate",
            "Originator",
            "AssetIdentifier",
        ] {
            assert!(attrs.contains_key(label), "missing {label}");
        }
        assert_eq!(attrs["Originator"].kind, AttributeKind::Bytes);
        assert_eq!(attrs["MaturityDate"].kind, AttributeKind::Timestamp);
    }

    #[test]
    fn compute_attributes_are_integers() {
        let attrs = InvoiceRecord::demo().compute_attributes();
        assert_eq!(attrs["AssetValue"], AttributeValue::integer("1100"));
        assert_eq!(attrs["RiskScore"], AttributeValue::integer("1"));
    }
}
