use crate::legend::ColorLegend;
use crate::models::region::{LayerIndex, Region};
use crate::utils::style::ansi_colourbar;
use comfy_table::{Attribute, Cell, CellAlignment, Table};
use std::collections::HashMap;

fn index_label(index: LayerIndex) -> String {
    match index {
        LayerIndex::At(i) => i.to_string(),
        LayerIndex::Last => "last".to_string(),
    }
}

/// Warnings for a region given how many layers its manifest currently has.
pub fn region_warnings(region: &Region, layer_count: usize) -> Vec<String> {
    let mut warnings = Vec::new();
    if layer_count == 0 {
        warnings.push(format!(
            "  ⚠️{}: no layers published, the viewer will stay on its loading screen",
            region.label
        ));
        return warnings;
    }
    for (side, index) in [
        ("left", region.map_selections.left_map_index),
        ("right", region.map_selections.right_map_index),
    ] {
        if index.is_out_of_range(layer_count) {
            warnings.push(format!(
                "  ⚠️{}: default {} layer {} is past the {} published layers, using the last one",
                region.label,
                side,
                index_label(index),
                layer_count
            ));
        }
    }
    warnings
}

pub fn print_region_summary(
    regions: &[Region],
    layer_counts: &HashMap<u32, usize>,
    default_region: u32,
    legend: &ColorLegend,
) {
    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Id")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Region").add_attribute(Attribute::Bold),
            Cell::new("Zoom")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Centre")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Layers")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
            Cell::new("Left / Right")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Center),
        ])
        .load_preset(comfy_table::presets::ASCII_BORDERS_ONLY_CONDENSED);

    let mut warnings = Vec::new();
    for region in regions {
        let count = layer_counts.get(&region.id).copied().unwrap_or(0);
        let region_warnings = region_warnings(region, count);
        let status = if region_warnings.is_empty() { "✅" } else { "⚠️" };
        warnings.extend(region_warnings);

        let label = if region.id == default_region {
            format!("{} (default)", region.label)
        } else {
            region.label.clone()
        };

        table.add_row(vec![
            Cell::new(status).set_alignment(CellAlignment::Center),
            Cell::new(region.id).set_alignment(CellAlignment::Center),
            Cell::new(label),
            Cell::new(format!(
                "{}–{} ({})",
                region.zoom.min, region.zoom.max, region.zoom.default
            ))
            .set_alignment(CellAlignment::Center),
            Cell::new(format!(
                "{:.2}, {:.2}",
                region.starting_location.latitude, region.starting_location.longitude
            ))
            .set_alignment(CellAlignment::Center),
            Cell::new(count).set_alignment(CellAlignment::Center),
            Cell::new(format!(
                "{} / {}",
                index_label(region.map_selections.left_map_index),
                index_label(region.map_selections.right_map_index)
            ))
            .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("\nRegion summary:\n{}", table);

    let config = legend.config();
    println!(
        "\nLegend: {} [{}…{} {}] {}",
        config.title,
        config.min,
        config.max,
        config.unit,
        ansi_colourbar(&legend.swatches(10))
    );

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for warning in warnings {
            println!("{}", warning);
        }
    }

    println!();
}
