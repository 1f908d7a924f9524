use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{errors::Error, Result};

const TOKEN_PLACEHOLDER: &str = "your_bot_token_here";

/// Typed configuration for the bot.
#[derive(Clone, Debug)]
pub struct Config {
    pub bot_token: String,
    pub data_dir: PathBuf,
    pub categories_dir: PathBuf,
    pub expenses_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));

        let bot_token = env_str("BOT_TOKEN").unwrap_or_default().trim().to_string();
        validate_token(&bot_token)?;

        let data_dir = env_path("DATA_DIR").unwrap_or_else(|| PathBuf::from("data"));
        Self::with_data_dir(bot_token, data_dir)
    }

    /// Build a config rooted at `data_dir`, creating the per-kind subdirectories.
    pub fn with_data_dir(bot_token: String, data_dir: PathBuf) -> Result<Self> {
        let categories_dir = data_dir.join("categories");
        let expenses_dir = data_dir.join("expenses");

        fs::create_dir_all(&categories_dir)?;
        fs::create_dir_all(&expenses_dir)?;

        Ok(Self {
            bot_token,
            data_dir,
            categories_dir,
            expenses_dir,
        })
    }
}

/// Reject missing, placeholder and obviously malformed tokens (`<bot id>:<secret>`).
fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(Error::Config(
            "BOT_TOKEN environment variable is required".to_string(),
        ));
    }
    if token == TOKEN_PLACEHOLDER {
        return Err(Error::Config(
            "BOT_TOKEN still holds the placeholder value; set a real token from @BotFather"
                .to_string(),
        ));
    }

    let well_formed = token.split_once(':').is_some_and(|(id, secret)| {
        !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) && !secret.is_empty()
    });
    if !well_formed {
        return Err(Error::Config(
            "BOT_TOKEN is malformed (expected `<bot id>:<secret>`)".to_string(),
        ));
    }
    Ok(())
}

fn env_str(key: &str) -> Option<String> {
    env::var(key).ok()
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}
