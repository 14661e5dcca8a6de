//! Master-data operator console
//!
//! Loads the master-data configuration, starts a session cache and reads
//! commands from stdin. Tables are loaded lazily by the first command that
//! needs them; `reload` drops them again.
//!
//! Run with: cargo run -p latte_console
//!       or: cargo run --bin latte

mod command;

use std::io::{self, BufRead, Write};

use latte_data::{DataConfig, GameDataManager};

use crate::command::Command;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DataConfig::load();
    log::info!(
        "Master data directory: {} (hot reload: {})",
        config.data_dir.display(),
        config.hot_reload
    );

    let data = GameDataManager::from_config(&config);
    data.initialize();

    #[cfg(feature = "hot-reload")]
    let mut watcher = if config.hot_reload {
        match latte_data::SourceWatcher::new(&config.data_dir) {
            Ok(watcher) => Some(watcher),
            Err(e) => {
                log::warn!("Hot reload disabled: {}", e);
                None
            }
        }
    } else {
        None
    };

    println!("Type 'help' for commands.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("latte> ");
        let _ = io::stdout().flush();

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(e)) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
            None => break,
        };

        #[cfg(feature = "hot-reload")]
        {
            if let Some(watcher) = watcher.as_mut() {
                let changed = watcher.poll_changes();
                if !changed.is_empty() {
                    data.reload_changed(&changed);
                }
            }
        }

        if line.trim().is_empty() {
            continue;
        }

        let parsed = match command::parse(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        if parsed == Command::Quit {
            break;
        }

        match command::execute(&parsed, &data) {
            Ok(output) => println!("{}", output),
            Err(e) => println!("{}", e),
        }
    }

    data.deinitialize();
}
