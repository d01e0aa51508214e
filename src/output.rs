//! Distinguishing tree output rendering

use std::fmt::Display;
use std::fs;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

use crate::tree::{TreeNode, TreeSummary};

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Render a tree outline and write it to file
pub fn render_tree<C, E>(tree: &TreeNode<C, E>, output_path: &Path) -> Result<(), OutputError>
where
    C: Display,
    E: Display,
{
    let content = render_to_string(tree);

    // Create parent directories if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::File::create(output_path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}

/// Render a tree to an outline string.
///
/// Splits show their element, leaves the configurations they hold. Below the
/// root every line starts with `+` (element present) or `-` (element absent);
/// the present child always comes first.
pub fn render_to_string<C, E>(tree: &TreeNode<C, E>) -> String
where
    C: Display,
    E: Display,
{
    let mut output = String::new();
    output.push_str(&node_text(tree));
    output.push('\n');
    render_children(tree, &mut output, "");
    output
}

fn render_children<C, E>(node: &TreeNode<C, E>, output: &mut String, prefix: &str)
where
    C: Display,
    E: Display,
{
    let children = node.children();
    for (i, child) in children.iter().enumerate() {
        let is_last_child = i == children.len() - 1;
        render_node(child, output, prefix, is_last_child);
    }
}

fn render_node<C, E>(node: &TreeNode<C, E>, output: &mut String, prefix: &str, is_last: bool)
where
    C: Display,
    E: Display,
{
    let connector = if is_last { "└── " } else { "├── " };
    output.push_str(prefix);
    output.push_str(connector);
    output.push_str(&node_text(node));
    output.push('\n');

    let child_prefix = format!("{}{}", prefix, if is_last { "    " } else { "│   " });
    render_children(node, output, &child_prefix);
}

fn node_text<C, E>(node: &TreeNode<C, E>) -> String
where
    C: Display,
    E: Display,
{
    let edge = match node.oracle_response() {
        Some(true) => "+ ",
        Some(false) => "- ",
        None => "",
    };

    let body = match node.label() {
        Some(label) => label.to_string(),
        None => node
            .cfgs()
            .iter()
            .map(|cfg| cfg.to_string())
            .collect::<Vec<_>>()
            .join(", "),
    };

    format!("{}{}", edge, body)
}

/// Render tree statistics, one per line
pub fn render_summary(summary: &TreeSummary) -> String {
    let sizes = summary
        .leaf_sizes
        .iter()
        .map(|size| size.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Total cfgs: {}\nDepth: {}\nLeaf sizes: [{}]\nAverage leaf size: {:.2}\nMean result size: {:.2}\n",
        summary.total_cfgs,
        summary.depth,
        sizes,
        summary.average_leaf_size,
        summary.mean_result_size
    )
}
