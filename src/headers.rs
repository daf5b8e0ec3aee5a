use std::collections::HashSet;
use std::io::Read;

use crate::error::{Result, SplitError};

pub const TRANSACTION_DATE: &str = "Transaction_Date";
pub const DESCRIPTION: &str = "Description";
pub const AMOUNT: &str = "Amount";

/// Canonical columns every translated table must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[TRANSACTION_DATE, DESCRIPTION, AMOUNT];

/// A decoded delimited file: a header row plus rows of raw cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// One known bank export layout.
#[derive(Debug, PartialEq)]
pub struct BankFormat {
    pub name: &'static str,
    /// (source column, canonical column)
    pub columns: &'static [(&'static str, &'static str)],
    /// Statement stores debits as positive numbers.
    pub negate_amounts: bool,
}

impl BankFormat {
    fn matches(&self, present: &HashSet<&str>) -> bool {
        self.columns.iter().all(|(source, _)| present.contains(source))
    }

    fn canonical_name(&self, source: &str) -> Option<&'static str> {
        self.columns
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, canonical)| *canonical)
    }
}

// Declaration order is the tie-break: the first format whose columns are all
// present wins.
pub const BANK_FORMATS: &[BankFormat] = &[
    BankFormat {
        name: "Chase",
        columns: &[
            ("Transaction Date", TRANSACTION_DATE),
            ("Post Date", "Post_Date"),
            ("Description", DESCRIPTION),
            ("Category", "Category"),
            ("Type", "Budget"),
            ("Amount", AMOUNT),
            ("Memo", "Memo"),
        ],
        negate_amounts: false,
    },
    BankFormat {
        name: "US Bank",
        columns: &[
            ("Date", TRANSACTION_DATE),
            ("Transaction", "Type"),
            ("Name", DESCRIPTION),
            ("Memo", "Memo"),
            ("Amount", AMOUNT),
        ],
        negate_amounts: false,
    },
    BankFormat {
        name: "AMEX",
        columns: &[
            ("Date", TRANSACTION_DATE),
            ("Description", DESCRIPTION),
            ("Amount", AMOUNT),
        ],
        negate_amounts: true,
    },
    BankFormat {
        name: "Wells Fargo",
        columns: &[
            ("Date", TRANSACTION_DATE),
            ("Description", DESCRIPTION),
            ("Empty1", "Empty1"),
            ("Empty2", "Empty2"),
            ("Amount", AMOUNT),
        ],
        negate_amounts: false,
    },
];

/// Output of [`translate`]: the detected format and the renamed table.
#[derive(Debug)]
pub struct Translated {
    pub bank: &'static BankFormat,
    pub table: Table,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a statement amount. Accepts thousands separators, a currency
/// symbol, surrounding quotes and accounting-style parentheses.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace([',', '"', '$'], "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(|v| -v);
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Decode CSV bytes into a [`Table`]. Blank lines are skipped and short rows
/// are kept short; the mapper reports missing cells.
pub fn read_table<R: Read>(reader: R) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                h.trim_start_matches('\u{feff}').to_string()
            } else {
                h.to_string()
            }
        })
        .collect();
    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(Table { headers, rows })
}

// ---------------------------------------------------------------------------
// Detection and translation
// ---------------------------------------------------------------------------

/// Find the first bank format whose required columns are all present.
pub fn detect<S: AsRef<str>>(headers: &[S]) -> Option<&'static BankFormat> {
    let present: HashSet<&str> = headers.iter().map(|h| h.as_ref()).collect();
    BANK_FORMATS.iter().find(|bank| bank.matches(&present))
}

/// Rename a table's columns to the canonical schema.
///
/// Returns `Ok(None)` when no known format matches. Columns the detected
/// format does not mention pass through untouched. For formats that store
/// debits as positive numbers every amount is negated, so a negative
/// canonical amount always means money spent.
pub fn translate(table: Table) -> Result<Option<Translated>> {
    let Some(bank) = detect(table.headers.as_slice()) else {
        return Ok(None);
    };

    let headers: Vec<String> = table
        .headers
        .iter()
        .map(|h| bank.canonical_name(h).map_or_else(|| h.clone(), str::to_string))
        .collect();
    let mut translated = Table {
        headers,
        rows: table.rows,
    };

    if bank.negate_amounts {
        if let Some(idx) = translated.column(AMOUNT) {
            for (i, row) in translated.rows.iter_mut().enumerate() {
                let Some(cell) = row.get_mut(idx) else {
                    continue;
                };
                let amount = parse_amount(cell).ok_or_else(|| SplitError::MalformedRow {
                    line: i + 2,
                    reason: format!("unparseable amount '{cell}'"),
                })?;
                *cell = (-amount).to_string();
            }
        }
    }

    Ok(Some(Translated {
        bank,
        table: translated,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> Table {
        Table {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
        }
    }

    fn amounts(t: &Table) -> Vec<f64> {
        let idx = t.column(AMOUNT).unwrap();
        t.rows.iter().map(|r| parse_amount(&r[idx]).unwrap()).collect()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("\"500.00\""), Some(500.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("$12.00"), Some(12.0));
        assert_eq!(parse_amount("(50.00)"), Some(-50.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("(NaN)"), None);
        assert_eq!(parse_amount("(inf)"), None);
    }

    #[test]
    fn test_detect_chase() {
        let headers = [
            "Transaction Date", "Post Date", "Description", "Category", "Type", "Amount", "Memo",
        ];
        assert_eq!(detect(&headers).map(|b| b.name), Some("Chase"));
    }

    #[test]
    fn test_detect_us_bank() {
        let headers = ["Date", "Transaction", "Name", "Memo", "Amount"];
        assert_eq!(detect(&headers).map(|b| b.name), Some("US Bank"));
    }

    #[test]
    fn test_detect_no_match() {
        assert!(detect(&["Date", "Payee", "Value"]).is_none());
        assert!(detect::<&str>(&[]).is_none());
    }

    #[test]
    fn test_first_declared_format_wins() {
        // Satisfies both AMEX and Wells Fargo; AMEX is declared first.
        let headers = ["Date", "Description", "Empty1", "Empty2", "Amount"];
        assert_eq!(detect(&headers).map(|b| b.name), Some("AMEX"));
    }

    #[test]
    fn test_translate_renames_and_keeps_extra_columns() {
        let t = table(
            &["Date", "Transaction", "Name", "Memo", "Amount", "Reference"],
            &[&["2025-01-15", "DEBIT", "GROCER", "card 1234", "-20.00", "abc"]],
        );
        let out = translate(t).unwrap().unwrap();
        assert_eq!(out.bank.name, "US Bank");
        assert_eq!(
            out.table.headers,
            vec!["Transaction_Date", "Type", "Description", "Memo", "Amount", "Reference"]
        );
        assert_eq!(amounts(&out.table), vec![-20.0]);
        assert_eq!(out.table.rows[0][5], "abc");
    }

    #[test]
    fn test_translate_no_match_is_none() {
        let t = table(&["When", "What", "HowMuch"], &[&["x", "y", "1"]]);
        assert!(translate(t).unwrap().is_none());
    }

    #[test]
    fn test_translate_negates_amex_amounts() {
        let t = table(
            &["Date", "Description", "Amount"],
            &[&["01/15/2025", "RESTAURANT", "10.00"], &["01/16/2025", "PAYMENT", "-5.00"]],
        );
        let out = translate(t).unwrap().unwrap();
        assert_eq!(out.bank.name, "AMEX");
        assert_eq!(amounts(&out.table), vec![-10.0, 5.0]);
    }

    #[test]
    fn test_translate_chase_amounts_pass_through() {
        let t = table(
            &["Transaction Date", "Post Date", "Description", "Category", "Type", "Amount", "Memo"],
            &[&["01/15/2025", "01/16/2025", "COFFEE", "Food", "Sale", "-4.50", ""]],
        );
        let out = translate(t).unwrap().unwrap();
        assert_eq!(out.table.headers[4], "Budget");
        assert_eq!(out.table.rows[0][5], "-4.50");
    }

    #[test]
    fn test_translate_rejects_unparseable_amex_amount() {
        let t = table(&["Date", "Description", "Amount"], &[&["01/15/2025", "X", "ten"]]);
        let err = translate(t).unwrap_err();
        assert!(matches!(err, SplitError::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_read_table() {
        let data = "\u{feff}Date,Description,Amount\n01/15/2025,\"COFFEE, LARGE\",4.50\n\n01/16/2025,TEA\n";
        let t = read_table(data.as_bytes()).unwrap();
        assert_eq!(t.headers, vec!["Date", "Description", "Amount"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0][1], "COFFEE, LARGE");
        assert_eq!(t.rows[1].len(), 2);
    }
}
