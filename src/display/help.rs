//! Custom help formatting for consistent CLI display.
//! This module provides functions to format help text and command descriptions

use crate::display::theme::Theme;
use console::style;

/// Format help text with consistent styling
pub fn format_help_section(title: &str, content: &str, indent: bool) -> String {
    let mut output = String::new();

    // Section header
    if Theme::should_disable_colors() {
        output.push_str(&format!("{title}\n"));
    } else {
        output.push_str(&format!("{}\n", style(title).cyan().bold()));
    }

    // Content with optional indentation
    for line in content.lines() {
        if line.trim().is_empty() {
            output.push('\n');
        } else if indent && !line.starts_with("    ") {
            output.push_str(&format!("    {line}\n"));
        } else {
            output.push_str(&format!("{line}\n"));
        }
    }

    output
}

/// Create styled help text for the CLI
pub fn create_help_text() -> String {
    let mut help = String::new();

    // Quick Start section
    let quick_start = r#"$ aptrank init                      # Set up in current directory
$ aptrank build                     # Encode the catalog into an index
$ aptrank recommend "Hiring a Java developer""#;

    help.push_str(&format_help_section("QUICK START", quick_start, true));
    help.push('\n');

    // Examples section
    let examples = r#"# First time setup
$ aptrank init
$ aptrank build

# Recommend assessments for a hiring query
$ aptrank recommend "Need a data analyst who can work with SQL"

# Machine-readable output
$ aptrank recommend "Hiring a project manager" --json

# Score retrieval quality against labeled queries
$ aptrank evaluate

# Generate the submission file for unlabeled queries
$ aptrank submit

# Show detailed loading information
$ aptrank --info status"#;

    help.push_str(&format_help_section("EXAMPLES", examples, true));
    help.push('\n');

    // Learn More section
    let learn_more = r#"GitHub: https://github.com/sergitorres-codere/aptrank
Commands: aptrank help <COMMAND>"#;

    help.push_str(&format_help_section("LEARN MORE", learn_more, true));

    help
}
