// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Display, Formatter, Result},
          path::PathBuf};

use dirs::config_dir;

pub enum ConfigPaths {
    R3BLTopLevelFolderName,
    ConfigFile,
}

impl Display for ConfigPaths {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let path = match self {
            ConfigPaths::R3BLTopLevelFolderName => "r3bl-repl-bridge",
            ConfigPaths::ConfigFile => "config.json",
        };
        write!(f, "{path}")
    }
}

/// This is where the config folder is, eg: `~/.config/r3bl-repl-bridge` on Linux.
#[must_use]
pub fn try_get_config_folder_path() -> Option<PathBuf> {
    let home_config_folder_path = config_dir()?;
    Some(home_config_folder_path.join(ConfigPaths::R3BLTopLevelFolderName.to_string()))
}

/// This is where the config file is, if there is a config folder.
#[must_use]
pub fn try_get_config_file_path() -> Option<PathBuf> {
    try_get_config_folder_path()
        .map(|folder| folder.join(ConfigPaths::ConfigFile.to_string()))
}
