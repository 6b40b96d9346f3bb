use colored::Colorize;

use crate::rules::{RuleDefinition, rule_definitions};

fn render_table(definitions: &[RuleDefinition]) -> String {
    let code_width = definitions.iter().map(|d| d.code.len()).max().unwrap_or(4);
    let name_width = definitions.iter().map(|d| d.name.len()).max().unwrap_or(4);

    let mut output = String::new();
    for def in definitions {
        output.push_str(&format!(
            "{}  {:<name_width$}  {:<7}  {:<13}  {}\n",
            format!("{:<code_width$}", def.code).bold(),
            def.name,
            def.severity,
            def.category,
            def.description,
        ));
    }
    output
}

/// Print the rule catalog.
pub fn handle_rules(json: bool) -> crate::Result<()> {
    let definitions = rule_definitions();

    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
    } else {
        print!("{}", render_table(&definitions));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table() {
        colored::control::set_override(false);
        let table = render_table(&rule_definitions());
        assert_eq!(table.lines().count(), 6);
        assert!(table.contains("E9009"));
        assert!(table.contains("nested-stack-parameter-not-in-child"));
        assert!(table.contains("best-practice"));
    }
}
