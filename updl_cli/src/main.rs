use log::{debug, info};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use updl_compiler::HandlerManager;
use updl_project::{GameConfig, GameMode};
use updl_scene::extract_nodes;

fn main() {
    let args: Vec<String> = env::args().collect();

    let filter = if has_flag(&args, "--verbose") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let Some(command) = args.get(1).map(String::as_str) else {
        print_usage();
        std::process::exit(2);
    };

    let result = match command {
        "build" => build_command(&args),
        "check" => check_command(&args),
        "-h" | "--help" | "help" => {
            print_usage();
            Ok(())
        }
        _ => {
            print_usage();
            eprintln!("unknown command `{command}`");
            std::process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  updl_cli build --flow <file.json> [--config <file>] [--mode sp|mp] [--out <file>] [--verbose]");
    eprintln!("  updl_cli check --flow <file.json> [--verbose]   # extracted node counts");
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn parse_flag_value(args: &[String], flag: &str) -> Option<String> {
    let idx = args.iter().position(|a| a == flag)?;
    args.get(idx + 1).filter(|v| !v.starts_with("--")).cloned()
}

fn parse_mode(value: &str) -> Result<GameMode, String> {
    match value.to_ascii_lowercase().as_str() {
        "sp" | "singleplayer" => Ok(GameMode::Singleplayer),
        "mp" | "multiplayer" => Ok(GameMode::Multiplayer),
        other => Err(format!("unknown mode `{other}`, expected sp or mp")),
    }
}

fn flow_path(args: &[String]) -> Result<PathBuf, String> {
    parse_flag_value(args, "--flow")
        .map(PathBuf::from)
        .ok_or_else(|| "missing --flow <file.json>".to_string())
}

fn read_flow(path: &Path) -> Result<Value, String> {
    let src = fs::read_to_string(path)
        .map_err(|err| format!("failed to read flow {}: {err}", path.display()))?;
    serde_json::from_str(&src).map_err(|err| format!("flow {} is not JSON: {err}", path.display()))
}

fn load_config(args: &[String]) -> Result<GameConfig, String> {
    let mut config = match parse_flag_value(args, "--config") {
        Some(path) => {
            let path = PathBuf::from(path);
            GameConfig::load(&path)
                .map_err(|err| format!("failed to load config {}: {err}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(mode) = parse_flag_value(args, "--mode") {
        config.game_mode = parse_mode(&mode)?;
    }
    debug!("config: {config:?}");
    Ok(config)
}

fn build_command(args: &[String]) -> Result<(), String> {
    let flow_path = flow_path(args)?;
    let flow = read_flow(&flow_path)?;
    let config = load_config(args)?;

    let output = HandlerManager::new(config)
        .process(&flow)
        .map_err(|err| format!("build failed for {}: {err}", flow_path.display()))?;
    let json = serde_json::to_string_pretty(&output)
        .map_err(|err| format!("failed to serialize build output: {err}"))?;

    match parse_flag_value(args, "--out") {
        Some(out) => {
            fs::write(&out, json).map_err(|err| format!("failed to write {out}: {err}"))?;
            info!("wrote {out}");
            println!("built {} -> {out}", flow_path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn check_command(args: &[String]) -> Result<(), String> {
    let flow_path = flow_path(args)?;
    let nodes = extract_nodes(&read_flow(&flow_path)?);
    println!("spaces:     {}", nodes.spaces.len());
    println!("entities:   {}", nodes.entities.len());
    println!("components: {}", nodes.components.len());
    println!("events:     {}", nodes.events.len());
    println!("actions:    {}", nodes.actions.len());
    println!("datas:      {}", nodes.datas.len());
    println!("universo:   {}", nodes.universo.len());
    println!("lights:     {}", nodes.lights.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flag_values() {
        let a = args(&["updl_cli", "build", "--flow", "f.json", "--out", "--verbose"]);
        assert_eq!(parse_flag_value(&a, "--flow").as_deref(), Some("f.json"));
        assert_eq!(parse_flag_value(&a, "--out"), None);
        assert_eq!(parse_flag_value(&a, "--mode"), None);
        assert!(has_flag(&a, "--verbose"));
    }

    #[test]
    fn modes() {
        assert_eq!(parse_mode("sp"), Ok(GameMode::Singleplayer));
        assert_eq!(parse_mode("MP"), Ok(GameMode::Multiplayer));
        assert!(parse_mode("coop").is_err());
    }

    #[test]
    fn mode_flag_overrides_config() {
        let config = load_config(&args(&["updl_cli", "build", "--mode", "mp"])).unwrap();
        assert_eq!(config.game_mode, GameMode::Multiplayer);
        assert!(load_config(&args(&["updl_cli", "build", "--mode", "x"])).is_err());
    }

    #[test]
    fn flow_is_required() {
        assert!(flow_path(&args(&["updl_cli", "build"])).is_err());
    }
}
