use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use sickadd_config::Config;
use sickadd_core::Catalog;
use sickadd_models::{CatalogRecord, KindPartition};
use tracing::info;

pub fn show_db(config: &Config, output: &Output) -> Result<()> {
    let catalog = Catalog::open(config.database_path())?;
    let partition = KindPartition::from_records(catalog.all_records()?);

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }
            println!("{} {}", "Database:".bold(), catalog.location().display());
            if partition.is_empty() {
                output.info("The database is empty.");
                return Ok(());
            }
            print_section("Not TV shows", &partition.not_series);
            print_section("TV shows and mini-series", &partition.series);
            if !partition.incomplete.is_empty() {
                print_section("Incomplete records (try --delete <IMDB_ID>)", &partition.incomplete);
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "database": catalog.location().display().to_string(),
                "records": partition,
            }));
        }
    }
    Ok(())
}

fn print_section(heading: &str, records: &[CatalogRecord]) {
    println!();
    println!("{} ({})", heading.bright_cyan().bold(), records.len());
    if records.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("IMDb ID").add_attribute(Attribute::Bold),
        Cell::new("Title").add_attribute(Attribute::Bold),
        Cell::new("Imported").add_attribute(Attribute::Bold),
        Cell::new("TheTVDB ID").add_attribute(Attribute::Bold),
        Cell::new("In SickChill").add_attribute(Attribute::Bold),
        Cell::new("Watchlist").add_attribute(Attribute::Bold),
    ]);
    for record in records {
        let registered = match record.registered_at {
            Some(date) => Cell::new(format!("yes ({})", date)).fg(Color::Green),
            None if record.registered => Cell::new("yes").fg(Color::Green),
            None => Cell::new("no"),
        };
        table.add_row(vec![
            Cell::new(record.id.as_str()),
            Cell::new(&record.title),
            Cell::new(record.discovered_at.to_string()),
            Cell::new(record.tvdb_id.map(|id| id.to_string()).unwrap_or_default()),
            registered,
            Cell::new(&record.source_list),
        ]);
    }
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
}

pub fn delete_record(config: &Config, id: &str, output: &Output) -> Result<()> {
    let id = id.trim();
    let catalog = Catalog::open(config.database_path())?;
    if catalog.delete_by_id(id)? {
        info!(imdb_id = %id, "Deleted record");
        output.success(format!("Deleted {} from the database", id));
    } else {
        output.warn(format!("No record with IMDb id {} in the database", id));
    }
    Ok(())
}
