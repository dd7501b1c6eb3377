//! Configuration command handlers

use crate::cli::commands::ConfigAction;
use crate::config::CliConfig;
use crate::error::Result;
use crate::output::{compress_path, json_output};
use console::style;
use std::path::Path;

/// Handle config commands
pub fn handle_config(
    config: &CliConfig,
    path: Option<&Path>,
    action: ConfigAction,
    json: bool,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let map = config.to_map();
            if json {
                return json_output(&map);
            }
            for (key, value) in &map {
                println!("{} = {}", style(key).cyan(), value);
            }
            Ok(())
        }
        ConfigAction::Path => {
            let path = match path {
                Some(p) => p.to_path_buf(),
                None => CliConfig::default_path()?,
            };
            println!("{}", compress_path(&path));
            Ok(())
        }
    }
}
