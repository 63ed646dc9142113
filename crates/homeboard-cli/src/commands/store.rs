use clap::Subcommand;
use homeboard_core::store::StoreValue;
use homeboard_core::{keys, Config, CoreError, StoreKey, StoreRegistry};

use super::{open_session, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StoreAction {
    /// Print a store's current value
    Get {
        /// Store name (timer, reminders, work, fitness, routine, planning)
        name: String,
    },
    /// Replace a store's whole value with the given JSON
    Set {
        /// Store name
        name: String,
        /// New value as JSON
        json: String,
    },
    /// List store names
    List,
}

fn show<T: StoreValue>(registry: &StoreRegistry, key: &StoreKey<T>) -> CmdResult {
    print_json(&*registry.get(key))
}

fn replace<T: StoreValue>(registry: &StoreRegistry, key: &StoreKey<T>, json: &str) -> CmdResult {
    let value: T = serde_json::from_str(json)?;
    registry.save(key, value);
    show(registry, key)
}

fn unknown(name: &str) -> CoreError {
    CoreError::Custom(format!(
        "unknown store: {name} (expected one of {})",
        keys::ALL.join(", ")
    ))
}

fn session() -> homeboard_core::Result<StoreRegistry> {
    open_session(&Config::load()?)
}

pub fn run(action: StoreAction) -> CmdResult {
    match action {
        StoreAction::List => {
            for name in keys::ALL {
                println!("{name}");
            }
            Ok(())
        }
        StoreAction::Get { name } => {
            let registry = session()?;
            match name.as_str() {
                "timer" => show(&registry, &keys::TIMER),
                "reminders" => show(&registry, &keys::REMINDERS),
                "work" => show(&registry, &keys::WORK),
                "fitness" => show(&registry, &keys::FITNESS),
                "routine" => show(&registry, &keys::ROUTINE),
                "planning" => show(&registry, &keys::PLANNING),
                other => Err(unknown(other)),
            }
        }
        StoreAction::Set { name, json } => {
            let registry = session()?;
            match name.as_str() {
                "timer" => replace(&registry, &keys::TIMER, &json),
                "reminders" => replace(&registry, &keys::REMINDERS, &json),
                "work" => replace(&registry, &keys::WORK, &json),
                "fitness" => replace(&registry, &keys::FITNESS, &json),
                "routine" => replace(&registry, &keys::ROUTINE, &json),
                "planning" => replace(&registry, &keys::PLANNING, &json),
                other => Err(unknown(other)),
            }
        }
    }
}
