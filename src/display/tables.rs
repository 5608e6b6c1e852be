//! Table formatting utilities for structured output.

use crate::evaluate::EvaluationSummary;
use crate::retrieve::Recommendation;
use comfy_table::{
    Attribute, Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
};

/// Builder for creating formatted tables.
pub struct TableBuilder {
    table: Table,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TableBuilder {
    /// Create a new table builder.
    pub fn new() -> Self {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL);
        // Apply rounded corners
        table.apply_modifier(UTF8_ROUND_CORNERS);
        Self { table }
    }

    /// Set the table headers.
    pub fn set_headers(mut self, headers: Vec<&str>) -> Self {
        let header_cells: Vec<Cell> = headers
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
            .collect();
        self.table.set_header(header_cells);
        self
    }

    /// Add a row to the table.
    pub fn add_row(mut self, row: Vec<String>) -> Self {
        self.table.add_row(row);
        self
    }

    /// Build and return the formatted table.
    pub fn build(self) -> String {
        self.table.to_string()
    }
}

/// Create a table of recommendations in rank order.
pub fn create_recommendation_table(recommendations: &[Recommendation]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    // Apply rounded corners for a modern look
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Rank").add_attribute(Attribute::Bold),
        Cell::new("Assessment").add_attribute(Attribute::Bold),
        Cell::new("Type").add_attribute(Attribute::Bold),
        Cell::new("Score").add_attribute(Attribute::Bold),
        Cell::new("URL").add_attribute(Attribute::Bold),
    ]);

    for recommendation in recommendations {
        table.add_row(vec![
            recommendation.rank.to_string(),
            recommendation.name.clone(),
            recommendation.category.label().to_string(),
            format!("{:.4}", recommendation.score),
            recommendation.url.clone(),
        ]);
    }

    table.to_string()
}

/// Create a per-query recall table with a bold mean row at the bottom.
pub fn create_recall_table(summary: &EvaluationSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    // Apply rounded corners for consistency
    table.apply_modifier(UTF8_ROUND_CORNERS);

    table.set_header(vec![
        Cell::new("Query").add_attribute(Attribute::Bold),
        Cell::new(format!("Recall@{}", summary.k)).add_attribute(Attribute::Bold),
        Cell::new("Relevant").add_attribute(Attribute::Bold),
        Cell::new("Retrieved").add_attribute(Attribute::Bold),
    ]);

    for entry in &summary.per_query {
        table.add_row(vec![
            entry.query.clone(),
            format!("{:.4}", entry.recall),
            entry.relevant_count.to_string(),
            entry.retrieved_count.to_string(),
        ]);
    }

    let mean_color = if summary.mean_recall >= 0.5 {
        Color::Green
    } else {
        Color::Yellow
    };
    table.add_row(vec![
        Cell::new("MEAN").add_attribute(Attribute::Bold),
        Cell::new(format!("{:.4}", summary.mean_recall))
            .fg(mean_color)
            .add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(""),
    ]);

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssessmentCategory;
    use crate::evaluate::QueryRecall;

    #[test]
    fn test_table_builder() {
        let table = TableBuilder::new()
            .set_headers(vec!["Column 1", "Column 2"])
            .add_row(vec!["Value 1".to_string(), "Value 2".to_string()])
            .build();

        assert!(table.contains("Column 1"));
        assert!(table.contains("Value 1"));
    }

    #[test]
    fn test_recommendation_table_lists_ranks() {
        let recommendations = vec![Recommendation {
            rank: 1,
            name: "Verify Coding".to_string(),
            url: "https://example.com/coding".to_string(),
            description: "Programming assessment".to_string(),
            category: AssessmentCategory::Knowledge,
            score: 0.9132,
        }];

        let table = create_recommendation_table(&recommendations);
        assert!(table.contains("Verify Coding"));
        assert!(table.contains("0.9132"));
        assert!(table.contains("https://example.com/coding"));
    }

    #[test]
    fn test_recall_table_has_mean_row() {
        let summary = EvaluationSummary {
            mean_recall: 0.75,
            k: 10,
            per_query: vec![QueryRecall {
                query: "Hiring a coding developer".to_string(),
                recall: 0.75,
                relevant_count: 4,
                retrieved_count: 3,
            }],
        };

        let table = create_recall_table(&summary);
        assert!(table.contains("Recall@10"));
        assert!(table.contains("MEAN"));
        assert!(table.contains("0.7500"));
    }
}
