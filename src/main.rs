use abyss::{repl, runner};
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::fs;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("abyss")
        .about("Interpreter for the AbyssLang programming language")
        .arg(
            Arg::new("file")
                .help("The .aby script to execute")
                .value_name("FILE")
                .index(1),
        )
        .arg(
            Arg::new("file-flag")
                .short('f')
                .long("file")
                .help("The .aby script to execute")
                .value_name("FILE")
                .conflicts_with("file"),
        )
        .arg(
            Arg::new("interactive")
                .short('i')
                .long("interactive")
                .help("Start in interactive REPL mode")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if let Err(error) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Could not start logger: {}", error);
    }

    let file = matches
        .get_one::<String>("file")
        .or_else(|| matches.get_one::<String>("file-flag"));

    match file {
        Some(path) if !matches.get_flag("interactive") => run_file(path),
        _ => repl::start(),
    }
}

fn run_file(path: &str) {
    let path = Path::new(path);

    if !path.exists() {
        eprintln!("Error: File '{}' not found", path.display());
        process::exit(1);
    }

    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            process::exit(1);
        }
    };

    // Imports resolve relative to the script's own directory.
    let filename = path.display().to_string();
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        if let Err(e) = std::env::set_current_dir(dir) {
            log::warn!("could not enter '{}': {}", dir.display(), e);
        }
    }

    if runner::run(&source, Some(&filename)).is_err() {
        process::exit(1);
    }
}
