/// Native replay tool.
///
/// Usage: `annotrace-native <image> <script.json> [config.json]`
///
/// Loads the image, replays the scripted input events against a fresh
/// annotator and prints the resulting annotations as JSON on stdout.
#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use annotrace::AppConfig;

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let (image, script, config) = match args.as_slice() {
        [image, script] => (image, script, None),
        [image, script, config] => (image, script, Some(config.as_path())),
        _ => {
            eprintln!("Usage: annotrace-native <image> <script.json> [config.json]");
            return ExitCode::from(2);
        }
    };

    let config = AppConfig::load_or_default(config);
    let level = config.preferences.log_level.to_level_filter().to_string();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match native::run(&config, image, script) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Replay error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use annotrace::{Annotator, AnnotatorError, AppConfig, BackgroundRefiner, ReplayScript};

    pub fn run(config: &AppConfig, image: &Path, script: &Path) -> annotrace::Result<String> {
        let script = ReplayScript::load(script)?;

        let mut annotator = if config.refinement.background {
            Annotator::with_runner(config, Box::new(BackgroundRefiner::spawn()?))
        } else {
            Annotator::new(config)
        };

        if !image.exists() {
            return Err(AnnotatorError::FileNotFound {
                path: image.to_path_buf(),
            });
        }
        annotator.load_image_bytes(&std::fs::read(image)?)?;

        let report = script.run(&mut annotator);
        if report.timed_out > 0 {
            log::warn!("{} refinements timed out", report.timed_out);
        }
        annotator.to_json()
    }
}

// WASM doesn't use main(), it uses wasm_bindgen's start function
#[cfg(target_arch = "wasm32")]
fn main() {}
