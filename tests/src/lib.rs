//! Shared helpers for the cross-crate scenarios.

use actseq_dom::{ControlStatement, ExecutableStatement};

/// Indented outline of the statements below `statement`, one line per
/// statement, e.g. `["action 'Lookup'", "conditional", "  action 'Report'"]`.
pub fn outline(statement: &ControlStatement) -> Vec<String> {
    let mut lines = Vec::new();
    collect_outline(statement, 0, &mut lines);
    lines
}

fn collect_outline(statement: &ControlStatement, depth: usize, lines: &mut Vec<String>) {
    for child in statement.children() {
        lines.push(format!("{}{}", "  ".repeat(depth), child.describe()));
        if let ExecutableStatement::Control(nested) = &child {
            collect_outline(nested, depth + 1, lines);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actseq_dom::ActionSequenceDocument;

    #[test]
    fn test_outline_indents_nested_statements() {
        let document = ActionSequenceDocument::new();
        let root = document.root();
        root.add_action("Lookup", None).unwrap();
        let rows = root.add_loop("rows", None).unwrap();
        rows.add_action("Print", None).unwrap();

        assert_eq!(
            outline(&root),
            vec!["action 'Lookup'", "loop 'rows'", "  action 'Print'"]
        );
    }
}
