//! Console commands
//!
//! Parses operator input and runs it against a [`GameDataManager`].

use latte_data::domain::normalize_name;
use latte_data::{
    CharacterAsset, CharacterInfo, CharacterType, DamageType, GameDataManager, HitStop, Knockback,
};
use serde::Serialize;

/// Command error
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty input")]
    EmptyInput,

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Failed to format row: {0}")]
    Format(String),
}

/// Domains reachable from the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainName {
    HitStop,
    Knockback,
    CharacterInfo,
    CharacterAsset,
}

impl std::str::FromStr for DomainName {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_name(s).as_str() {
            "hitstop" => Ok(Self::HitStop),
            "knockback" => Ok(Self::Knockback),
            "characterinfo" | "info" => Ok(Self::CharacterInfo),
            "characterasset" | "asset" => Ok(Self::CharacterAsset),
            _ => Err(CommandError::UnknownDomain(s.to_string())),
        }
    }
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `get <domain> <key>`
    Get { domain: DomainName, key: String },
    /// `delay <damage-type>`
    Delay(DamageType),
    /// `reload [domain]`; any registered domain name is accepted
    Reload(Option<String>),
    /// `stat`
    Stat,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
}

/// Parse a command line
pub fn parse(input: &str) -> Result<Command, CommandError> {
    let mut words = input.split_whitespace();
    let name = words.next().ok_or(CommandError::EmptyInput)?;

    match name.to_lowercase().as_str() {
        "get" => {
            let domain = words.next().ok_or(CommandError::MissingArgument("domain"))?.parse()?;
            let key = words.next().ok_or(CommandError::MissingArgument("key"))?.to_string();
            Ok(Command::Get { domain, key })
        }
        "delay" => {
            let key = words.next().ok_or(CommandError::MissingArgument("damage type"))?;
            key.parse().map(Command::Delay).map_err(CommandError::InvalidKey)
        }
        "reload" | "reloadmasterdata" => match words.next() {
            Some(domain) => Ok(Command::Reload(Some(domain.to_string()))),
            None => Ok(Command::Reload(None)),
        },
        "stat" | "stats" => Ok(Command::Stat),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

/// Help text
pub const HELP: &str = "\
Commands:
  get <domain> <key>     show a row (domains: hitstop, knockback, characterinfo, characterasset)
  delay <damage-type>    show the hit-stop delay time
  reload [domain]        drop cached tables; they reload on next access
  stat                   show per-domain cache state
  help                   show this help
  quit                   leave the console";

/// Run a command; returns the text to print
pub fn execute(command: &Command, data: &GameDataManager) -> Result<String, CommandError> {
    match command {
        Command::Get { domain, key } => match domain {
            DomainName::HitStop => show_row(data.try_get::<HitStop>(damage_key(key)?)),
            DomainName::Knockback => show_row(data.try_get::<Knockback>(damage_key(key)?)),
            DomainName::CharacterInfo => {
                show_row(data.try_get::<CharacterInfo>(character_key(key)?))
            }
            DomainName::CharacterAsset => {
                show_row(data.try_get::<CharacterAsset>(character_key(key)?))
            }
        },
        Command::Delay(damage_type) => Ok(format!(
            "{}: {:.3}s",
            damage_type,
            data.hit_stop_delay_time(*damage_type)
        )),
        Command::Reload(None) => {
            data.reload_all();
            Ok("All master data will reload on next access".to_string())
        }
        Command::Reload(Some(domain)) => {
            if !data.reload_domain_by_name(domain) {
                return Err(CommandError::UnknownDomain(domain.clone()));
            }
            Ok(format!("{} will reload on next access", domain))
        }
        Command::Stat => Ok(format_stats(data)),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok(String::new()),
    }
}

fn damage_key(key: &str) -> Result<DamageType, CommandError> {
    key.parse().map_err(CommandError::InvalidKey)
}

fn character_key(key: &str) -> Result<CharacterType, CommandError> {
    key.parse().map_err(CommandError::InvalidKey)
}

fn show_row<R: Serialize>(row: Option<R>) -> Result<String, CommandError> {
    match row {
        Some(row) => {
            serde_json::to_string_pretty(&row).map_err(|e| CommandError::Format(e.to_string()))
        }
        None => Ok("not found".to_string()),
    }
}

fn format_stats(data: &GameDataManager) -> String {
    let mut out = format!(
        "{:<16} {:<9} {:>5} {:>6}  {}",
        "DOMAIN", "STATUS", "ROWS", "LOADS", "SOURCE"
    );
    for stats in data.stats() {
        out.push('\n');
        out.push_str(&format!(
            "{:<16} {:<9} {:>5} {:>6}  {}",
            stats.name,
            stats.status.to_string(),
            stats.rows,
            stats.load_count,
            stats.source.as_deref().unwrap_or("<unset>"),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use latte_data::{MemorySource, SourceHandle};

    fn data() -> GameDataManager {
        let source = MemorySource::new().with_file(
            "DT_HitStop.json",
            r#"[{ "damage_type": "Slash", "delay_time": 0.2 }]"#,
        );
        let data = GameDataManager::new(source);
        data.set_source::<HitStop>(SourceHandle::from_path("DT_HitStop.json"));
        data
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse("get hit_stop slash").unwrap(),
            Command::Get { domain: DomainName::HitStop, key: "slash".into() }
        );
        assert_eq!(parse("  RELOAD  ").unwrap(), Command::Reload(None));
        assert_eq!(
            parse("reload Character-Info").unwrap(),
            Command::Reload(Some("Character-Info".into()))
        );
        assert_eq!(parse("delay pierce").unwrap(), Command::Delay(DamageType::Pierce));
        assert_eq!(parse("exit").unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse("   "), Err(CommandError::EmptyInput));
        assert_eq!(parse("get"), Err(CommandError::MissingArgument("domain")));
        assert_eq!(parse("get knockback"), Err(CommandError::MissingArgument("key")));
        assert_eq!(parse("get weather rain"), Err(CommandError::UnknownDomain("weather".into())));
        assert!(matches!(parse("delay fire"), Err(CommandError::InvalidKey(_))));
        assert_eq!(parse("jump"), Err(CommandError::UnknownCommand("jump".into())));
    }

    #[test]
    fn test_execute_get_and_delay() {
        let data = data();

        let out = execute(&parse("get hitstop slash").unwrap(), &data).unwrap();
        assert!(out.contains("\"delay_time\": 0.2"));

        let out = execute(&parse("get hitstop blunt").unwrap(), &data).unwrap();
        assert_eq!(out, "not found");

        let out = execute(&parse("delay slash").unwrap(), &data).unwrap();
        assert_eq!(out, "Slash: 0.200s");

        let err = execute(&parse("get characterinfo slash").unwrap(), &data).unwrap_err();
        assert!(matches!(err, CommandError::InvalidKey(_)));
    }

    #[test]
    fn test_execute_reload_and_stat() {
        let data = data();
        data.ensure_loaded::<HitStop>();

        execute(&parse("reload hit_stop").unwrap(), &data).unwrap();
        assert_eq!(data.status::<HitStop>(), latte_data::TableStatus::Unloaded);

        let err = execute(&parse("reload weather").unwrap(), &data).unwrap_err();
        assert_eq!(err, CommandError::UnknownDomain("weather".into()));

        let out = execute(&Command::Stat, &data).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("HitStop"));
        assert!(lines[1].contains("DT_HitStop.json"));
        assert!(lines[2].contains("<unset>"));
    }
}
