use crate::domain::dataset::{DatasetProfile, Row};

pub(crate) fn build_narrative_system_prompt() -> String {
    "You are a data analyst. Write a clear natural-language analysis of the dataset described below. Cover notable trends, anomalies and key findings, referring to columns by name. Respond in plain prose without JSON or code blocks.".to_string()
}

pub(crate) fn build_narrative_user_prompt(rows: &[Row], profile: &DatasetProfile) -> String {
    let mut body = String::new();
    body.push_str(&format!("Row count: {}\n", profile.row_count));

    if let Some(first_row) = rows.first() {
        let columns: Vec<&str> = first_row.keys().map(String::as_str).collect();
        body.push_str(&format!("Columns: {}\n", columns.join(", ")));
    }

    if profile.numeric_cols.is_empty() {
        body.push_str("\nNo column contains numeric values.\n");
    } else {
        let stats = serde_json::to_string_pretty(&profile.numeric_cols)
            .unwrap_or_else(|_| "{}".to_string());
        body.push_str("\nNumeric column statistics (count, sum, avg, min, max):\n");
        body.push_str(&stats);
        body.push('\n');
    }

    body
}

pub(crate) fn build_insight_system_prompt() -> String {
    "You are a data analyst. Return only a JSON object with keys: insights, trends, anomalies, recommendations. Each key holds an array of short strings. Do not include any text outside the JSON object.".to_string()
}

pub(crate) fn build_insight_user_prompt(profile: &DatasetProfile) -> String {
    format!("Dataset profile:\n{}\n", profile.to_json())
}
