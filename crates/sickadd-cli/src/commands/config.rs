use crate::output::{Output, OutputFormat};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;
use sickadd_config::Config;
use std::path::Path;

pub fn show_config(config: &Config, config_file: &Path, full: bool, output: &Output) -> Result<()> {
    let api_key = if full {
        config.sickchill.api_key.clone()
    } else {
        mask_string(&config.sickchill.api_key)
    };
    let validation = config.validate().err().map(|e| e.to_string());

    match output.format() {
        OutputFormat::Human => {
            if output.is_quiet() {
                return Ok(());
            }

            println!("\n{}", "Configuration".bright_cyan().bold());
            let file_note = if config_file.exists() { "" } else { " (not found, using defaults)" };

            let mut table = Table::new();
            table.set_header(vec![
                Cell::new("Setting").add_attribute(Attribute::Bold),
                Cell::new("Value").add_attribute(Attribute::Bold),
            ]);
            table.add_row(vec![
                Cell::new("Config file"),
                Cell::new(format!("{}{}", config_file.display(), file_note)),
            ]);
            for (i, url) in config.imdb.watchlist_urls.iter().enumerate() {
                let label = if i == 0 { "Watchlists" } else { "" };
                table.add_row(vec![Cell::new(label), Cell::new(url)]);
            }
            if config.imdb.watchlist_urls.is_empty() {
                table.add_row(vec![Cell::new("Watchlists"), Cell::new("<not set>").fg(Color::Yellow)]);
            }
            table.add_row(vec![Cell::new("IMDb base URL"), Cell::new(&config.imdb.base_url)]);
            table.add_row(vec![Cell::new("SickChill URL"), Cell::new(&config.sickchill.url)]);
            table.add_row(vec![Cell::new("SickChill API key"), Cell::new(&api_key)]);
            table.add_row(vec![Cell::new("TheTVDB base URL"), Cell::new(&config.thetvdb.base_url)]);
            table.add_row(vec![
                Cell::new("Database"),
                Cell::new(config.database_path().display().to_string()),
            ]);
            table.add_row(vec![
                Cell::new("Log file"),
                Cell::new(format!(
                    "{} (rotates at {} MB)",
                    config.logging.file.display(),
                    config.logging.max_size_mb
                )),
            ]);
            table.add_row(vec![Cell::new("Debug"), Cell::new(config.logging.debug.to_string())]);
            table.add_row(vec![
                Cell::new("Interval"),
                Cell::new(format!("{} minutes", config.scheduler.interval_minutes)),
            ]);
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
            println!("{}", table);

            match validation {
                Some(problem) => output.warn(format!("Configuration is incomplete: {}", problem)),
                None => output.success("Configuration is valid"),
            }
        }
        OutputFormat::Json | OutputFormat::JsonPretty => {
            output.json(&json!({
                "config_file": config_file.display().to_string(),
                "config_file_exists": config_file.exists(),
                "imdb": {
                    "watchlist_urls": config.imdb.watchlist_urls,
                    "base_url": config.imdb.base_url,
                },
                "sickchill": {
                    "url": config.sickchill.url,
                    "api_key": api_key,
                },
                "thetvdb": { "base_url": config.thetvdb.base_url },
                "storage": { "database_path": config.database_path().display().to_string() },
                "logging": {
                    "file": config.logging.file.display().to_string(),
                    "debug": config.logging.debug,
                    "max_size_mb": config.logging.max_size_mb,
                },
                "scheduler": {
                    "interval_minutes": config.scheduler.interval_minutes,
                    "run_on_startup": config.scheduler.run_on_startup,
                },
                "valid": validation.is_none(),
                "validation_error": validation,
            }));
        }
    }
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == "your_sickchill_api_key" {
        return "<not set>".to_string();
    }
    if s.len() <= 4 {
        return "*".repeat(s.len());
    }
    let chars: Vec<char> = s.chars().collect();
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("your_sickchill_api_key"), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("1a2b3c4d5e6f"), "1a***6f");
    }
}
