use std::io::Write;

use owo_colors::OwoColorize as _;
use pmv_render::DisplayHint;

use crate::inspect::Node;

const INDENT: &str = "  ";

/// Write `node` and its children, one value per line.
pub fn write_tree(out: &mut dyn Write, node: &Node) -> std::io::Result<()> {
    write_node(out, node, 0)
}

fn write_node(out: &mut dyn Write, node: &Node, depth: usize) -> std::io::Result<()> {
    for _ in 0..depth {
        out.write_all(INDENT.as_bytes())?;
    }

    write!(out, "{} = ", node.label.bright_cyan())?;
    if node.failed {
        writeln!(out, "{}", node.text.bright_red())?;
    } else if node.hint == Some(DisplayHint::String) {
        writeln!(out, "{}", node.text.bold())?;
    } else {
        writeln!(out, "{}", node.text)?;
    }

    for child in &node.children {
        write_node(out, child, depth + 1)?;
    }

    if node.truncated {
        for _ in 0..=depth {
            out.write_all(INDENT.as_bytes())?;
        }
        writeln!(out, "{}", "...".dimmed())?;
    }

    Ok(())
}
