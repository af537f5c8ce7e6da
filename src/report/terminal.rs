use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::Dependency;

/// Render a colored terminal report.
pub fn render(deps: &[Dependency], path: &Path, verbose: bool, quiet: bool) -> Result<()> {
    let total = deps.len();
    let described = deps
        .iter()
        .filter(|d| d.metadata.summary.is_some() || d.metadata.homepage.is_some())
        .count();
    let conflicts = deps.iter().filter(|d| d.name != d.metadata.name).count();

    if quiet {
        println!(
            "Total: {}  With metadata: {}  Version conflicts: {}",
            total,
            described.to_string().green(),
            conflicts.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "yarn-licensed".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", path.display());

    if total == 0 {
        println!(" {} No dependencies found.\n", "✓".green());
        return Ok(());
    }

    render_table(deps, path, verbose);

    println!(
        "\n {} dependencies, {} with metadata, {} from version conflicts\n",
        total.to_string().bold(),
        described.to_string().green(),
        conflicts.to_string().yellow(),
    );

    if described < total {
        println!(
            " {} {} dependencies have no description or homepage\n",
            "⚠".yellow(),
            total - described
        );
    }

    Ok(())
}

fn render_table(deps: &[Dependency], root: &Path, verbose: bool) {
    let mut header = vec![
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Version").add_attribute(Attribute::Bold),
        Cell::new("Summary").add_attribute(Attribute::Bold),
        Cell::new("Homepage").add_attribute(Attribute::Bold),
    ];
    if verbose {
        header.push(Cell::new("Path").add_attribute(Attribute::Bold));
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for dep in deps {
        // Keys that differ from the package name come from version conflicts.
        let name_color = if dep.name != dep.metadata.name {
            Color::Yellow
        } else {
            Color::Reset
        };

        let mut row = vec![
            Cell::new(&dep.name).fg(name_color),
            Cell::new(dep.version.as_deref().unwrap_or("-")),
            optional_cell(dep.metadata.summary.as_deref()),
            optional_cell(dep.metadata.homepage.as_deref()),
        ];
        if verbose {
            let path = dep.path.strip_prefix(root).unwrap_or(&dep.path);
            row.push(Cell::new(path.display()));
        }
        table.add_row(row);
    }

    println!("{}", table);
}

fn optional_cell(value: Option<&str>) -> Cell {
    match value {
        Some(v) => Cell::new(v),
        None => Cell::new("unknown").fg(Color::DarkGrey),
    }
}
