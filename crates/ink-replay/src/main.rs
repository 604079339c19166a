//! Ink replay — runs a recorded input script through the drawing engine and
//! writes the final frame as SVG.
//!
//! ```text
//! ink-replay <script.json> [out.svg]
//! ```
//!
//! `-` (or no argument) reads the script from stdin. Without an output path
//! the SVG goes to stdout. Host requests are logged at `info`; set
//! `RUST_LOG=debug` to follow gestures and history.

use ink_replay::{ReplayError, Script, replay};
use std::io::Read;

fn read_script(path: Option<&str>) -> Result<String, ReplayError> {
    match path {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| ReplayError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Ok(text)
        }
        Some(path) => std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
            path: path.to_string(),
            source,
        }),
    }
}

fn run(args: &[String]) -> Result<(), ReplayError> {
    let text = read_script(args.get(1).map(String::as_str))?;
    let script = Script::from_json(&text)?;
    log::info!(
        "replaying {} steps over {} ms",
        script.steps.len(),
        script.end_time()
    );

    let result = replay(&script);
    log::info!(
        "{} figures, {} undo entries, {} host requests",
        result.figures,
        result.undo_depth,
        result.requests.len()
    );

    match args.get(2) {
        Some(out) => std::fs::write(out, &result.svg).map_err(|source| ReplayError::Io {
            path: out.clone(),
            source,
        }),
        None => {
            print!("{}", result.svg);
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("ink-replay error: {e}");
        std::process::exit(1);
    }
}
