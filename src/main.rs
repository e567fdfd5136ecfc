use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use v3_mod_translator::{Config, Language, ModTranslator};

/// Translate Victoria 3 mod localization files with an LLM
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Mod directory containing the English localization files
    #[arg(long)]
    src: PathBuf,

    /// Output directory; files land under `<dst>/localization/<language>/`
    #[arg(long)]
    dst: PathBuf,

    /// Target language code
    #[arg(long, default_value = "simp_chinese")]
    language: Language,

    /// Model identifier sent with every translation request
    #[arg(long, default_value = "gpt-3.5-turbo")]
    model: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = match Config::from_env(&args.model) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let translator = match ModTranslator::new(&config) {
        Ok(translator) => translator,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    match translator.translate_mod_files(&args.src, &args.dst, args.language) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
