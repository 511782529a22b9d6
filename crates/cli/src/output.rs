//! Printing rows and reports

use console::style;
use serde::Serialize;
use serde_json::Value;
use service::BatchReport;
use shared::Row;

/// Pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// One line per row: `  1. key: value, key: value`
pub fn format_row(index: usize, row: &Row) -> String {
    let fields: Vec<String> = row
        .iter()
        .map(|(key, value)| format!("{}: {}", key, format_value(value)))
        .collect();
    format!("  {}. {}", index + 1, fields.join(", "))
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "N/A".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Print rows in the selected format
pub fn print_rows(rows: &[Row], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(rows);
    }

    if rows.is_empty() {
        println!("No rows found");
        return Ok(());
    }

    for (i, row) in rows.iter().enumerate() {
        println!("{}", format_row(i, row));
    }
    println!("{} {} row(s)", style("✓").green(), rows.len());
    Ok(())
}

/// Print a batch summary, listing failed batches
pub fn print_report(action: &str, report: &BatchReport, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(report);
    }

    let mark = if report.is_complete() {
        style("✓").green()
    } else {
        style("✗").red()
    };
    println!(
        "{} {} {} of {} row(s) in {} batch(es)",
        mark, action, report.written_rows, report.total_rows, report.batches
    );

    for failure in &report.failures {
        println!(
            "  {} batch {} ({} rows): {}",
            style("✗").red(),
            failure.index + 1,
            failure.rows,
            failure.error
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_row() {
        let row = json!({"titolo": "Il divo", "anno_produzione": 2008, "regista": null})
            .as_object()
            .cloned()
            .unwrap();

        let line = format_row(0, &row);
        assert!(line.starts_with("  1. "));
        assert!(line.contains("titolo: Il divo"));
        assert!(line.contains("anno_produzione: 2008"));
        assert!(line.contains("regista: N/A"));
    }
}
