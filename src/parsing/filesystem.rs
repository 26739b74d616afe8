/* Copyright © 2025 taxlot contributors
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::config::config_file::Config;
use anyhow::{anyhow, Error};
use dirs::home_dir;
use std::fs;
use std::fs::File;
use std::path::PathBuf;

/// Fetches the config from the given path, or the default path if
/// none. An absent default config is created empty so the user has a
/// file to edit.
pub fn get_config(
	custom_config_path: Option<&String>,
) -> Result<Config, Error> {
	let config_path = match &custom_config_path {
		None => {
			let home_dir = home_dir().ok_or_else(|| {
				anyhow!("Unable to determine home directory")
			})?;
			home_dir.join(".config/taxlot/config.toml")
		},
		Some(p) => PathBuf::from(p),
	};

	// create empty config file if it doesn't exist
	if !config_path.exists() && custom_config_path.is_none() {
		if let Some(parent) = config_path.parent() {
			fs::create_dir_all(parent)?;
		}
		File::create(config_path.clone())?;
	}

	let content = fs::read_to_string(&config_path).map_err(|e| {
		anyhow!("Cannot read {}: {}", config_path.display(), e)
	})?;
	let config: Config = toml::from_str(&content)
		.map_err(|e| anyhow!("failed to parse config: {}", e))?;

	Ok(config)
}
