//! Text reports for growth metrics.

use vahan_growth::{GrowthRecord, Kpi};

const ABSENT: &str = "—";

/// Format a percentage to one decimal place, or `—` when absent.
pub fn format_pct(value: Option<f64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), |v| format!("{v:.1}%"))
}

/// Format a count with thousands separators (`1234567` → `1,234,567`).
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn format_opt_count(value: Option<u64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), format_count)
}

/// Render the headline KPI block.
///
/// An absent KPI renders the empty-selection notice.
pub fn kpi_block(kpi: Option<&Kpi>) -> String {
    let Some(kpi) = kpi else {
        return "No data for selected filters/date range.\n".to_string();
    };

    let mut output = String::new();
    output.push_str(&format!(
        "\nOverview (latest selected month: {})\n",
        kpi.date.format("%Y-%m")
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output.push_str(&format!(
        "{:<32} {:>26}\n",
        "Total registrations (latest)",
        format_count(kpi.total)
    ));
    output.push_str(&format!(
        "{:<32} {:>26}\n",
        "Same month last year",
        format_opt_count(kpi.prev_year_total)
    ));
    output.push_str(&format!(
        "{:<32} {:>26}\n",
        "Three months earlier",
        format_opt_count(kpi.prev_quarter_total)
    ));
    output.push_str(&format!(
        "{:<32} {:>26}\n",
        "YoY change",
        format_pct(kpi.yoy_pct)
    ));
    output.push_str(&format!(
        "{:<32} {:>26}\n",
        "QoQ change",
        format_pct(kpi.qoq_pct)
    ));
    output.push_str(&"=".repeat(60));
    output.push('\n');
    output
}

/// A titled table of growth records.
#[derive(Debug, Clone)]
pub struct GrowthTable<'a> {
    /// Table title
    pub title: String,
    /// Rows, rendered in order
    pub records: &'a [GrowthRecord],
}

impl<'a> GrowthTable<'a> {
    /// Create a table over `records`.
    pub fn new(title: impl Into<String>, records: &'a [GrowthRecord]) -> Self {
        Self {
            title: title.into(),
            records,
        }
    }

    /// Render as a fixed-width text table.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("\n{}\n", self.title));
        output.push_str(&"=".repeat(96));
        output.push('\n');

        if self.records.is_empty() {
            output.push_str("No data in selection.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<28} {:>8} {:>13} {:>13} {:>13} {:>8} {:>8}\n",
            "Series", "Month", "Registrations", "Prev Y", "Prev Q", "YoY %", "QoQ %"
        ));
        output.push_str(&"-".repeat(96));
        output.push('\n');

        for record in self.records {
            output.push_str(&format!(
                "{:<28} {:>8} {:>13} {:>13} {:>13} {:>8} {:>8}\n",
                record.key.to_string(),
                record.date.format("%Y-%m").to_string(),
                format_count(record.registrations),
                format_opt_count(record.registrations_prev_y),
                format_opt_count(record.registrations_prev_q),
                format_pct(record.yoy_pct),
                format_pct(record.qoq_pct)
            ));
        }

        output.push_str(&"=".repeat(96));
        output.push('\n');
        output
    }

    /// Render as a Markdown table.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("## {}\n\n", self.title));
        if self.records.is_empty() {
            output.push_str("_No data in selection._\n");
            return output;
        }

        output.push_str("| Series | Month | Registrations | YoY % | QoQ % |\n");
        output.push_str("|--------|-------|--------------:|------:|------:|\n");
        for record in self.records {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                record.key,
                record.date.format("%Y-%m"),
                format_count(record.registrations),
                format_pct(record.yoy_pct),
                format_pct(record.qoq_pct)
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vahan_data::TidyRecord;
    use vahan_growth::{GroupBy, compute_growth, league_table};

    #[test]
    fn test_format_pct() {
        assert_eq!(format_pct(Some(50.0)), "50.0%");
        assert_eq!(format_pct(Some(-12.345)), "-12.3%");
        assert_eq!(format_pct(None), "—");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(0), "0");
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1,000");
        assert_eq!(format_count(1_234_567), "1,234,567");
    }

    #[test]
    fn test_kpi_block() {
        let kpi = Kpi {
            date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            total: 1_500_000,
            prev_year_total: Some(1_000_000),
            prev_quarter_total: None,
            yoy_pct: Some(50.0),
            qoq_pct: None,
        };

        let text = kpi_block(Some(&kpi));
        assert!(text.contains("2024-03"));
        assert!(text.contains("1,500,000"));
        assert!(text.contains("50.0%"));
        assert!(text.contains("—"));

        assert!(kpi_block(None).contains("No data"));
    }

    #[test]
    fn test_league_table_rendering() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let records = vec![
            TidyRecord::manufacturer_level(date, "India", "4W", "Maruti", 150_000),
            TidyRecord::manufacturer_level(date, "India", "4W", "Tata", 50_000),
        ];
        let growth = compute_growth(&records, &GroupBy::manufacturer());
        let table = league_table(&growth, None);

        let ascii = GrowthTable::new("Manufacturers, latest month", &table).to_ascii_table();
        assert!(ascii.contains("Manufacturers, latest month"));
        let maruti = ascii.find("Maruti").unwrap();
        let tata = ascii.find("Tata").unwrap();
        assert!(maruti < tata);

        let markdown = GrowthTable::new("League", &table).to_markdown();
        assert!(markdown.contains("## League"));
        assert!(markdown.contains("| Maruti | 2024-01 | 150,000 | — | — |"));
    }

    #[test]
    fn test_empty_table() {
        let ascii = GrowthTable::new("Empty", &[]).to_ascii_table();
        assert!(ascii.contains("No data in selection."));
    }
}
