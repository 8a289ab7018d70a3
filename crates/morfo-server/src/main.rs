use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use morfo_affix::{SuffixAnalyzer, accents};
use morfo_lexicon::{LoadMode, Lexicon};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use morfo_server::{AppState, router};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_LEXICON: &str = "dicc.src";
const DEFAULT_RULES: &str = "afixos.dat";
const DEFAULT_LANGUAGE: &str = "es";
const DEFAULT_MAX_FORMS: usize = 100;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = load_config();
    info!("binding to {}:{}", config.host, config.port);
    info!(
        "using lexicon at {} (mode: {:?})",
        config.lexicon_path.display(),
        config.lexicon_mode
    );
    info!(
        "using affix rules at {} (language: {})",
        config.rules_path.display(),
        config.language
    );
    if config.disable_cache {
        info!("cache headers disabled");
    }

    let start = Instant::now();
    let lexicon = Arc::new(Lexicon::load_with_mode(
        &config.lexicon_path,
        config.lexicon_mode,
    )?);
    info!("lexicon loaded in {} ms", start.elapsed().as_millis());

    let rules_start = Instant::now();
    let analyzer = SuffixAnalyzer::from_file(
        &config.rules_path,
        accents::for_language(&config.language),
    )
    .with_context(|| format!("loading affix rules from {}", config.rules_path.display()))?;
    info!("affix rules loaded in {} ms", rules_start.elapsed().as_millis());

    let state = AppState {
        analyzer: Arc::new(analyzer),
        lexicon,
        max_forms: config.max_forms,
        disable_cache: config.disable_cache,
    };

    let app = router(state).layer(TraceLayer::new_for_http());
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;
    let listener = TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;
    Ok(())
}

#[derive(Debug, Clone)]
struct Config {
    host: String,
    port: u16,
    lexicon_path: PathBuf,
    lexicon_mode: LoadMode,
    rules_path: PathBuf,
    language: String,
    max_forms: usize,
    disable_cache: bool,
}

fn load_config() -> Config {
    let mut disable_cache = false;
    let mut cli_lexicon: Option<PathBuf> = None;
    let mut cli_lexicon_mode: Option<LoadMode> = None;
    let mut cli_rules: Option<PathBuf> = None;
    let mut cli_language: Option<String> = None;
    for arg in env::args().skip(1) {
        if arg == "--no-cache" {
            disable_cache = true;
        } else if let Some(path) = arg.strip_prefix("--lexicon=") {
            cli_lexicon = Some(PathBuf::from(path));
        } else if let Some(mode) = arg.strip_prefix("--lexicon-mode=") {
            cli_lexicon_mode = parse_load_mode(mode);
        } else if let Some(path) = arg.strip_prefix("--rules=") {
            cli_rules = Some(PathBuf::from(path));
        } else if let Some(lang) = arg.strip_prefix("--lang=") {
            cli_language = Some(lang.to_string());
        }
    }

    let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    let lexicon_path = cli_lexicon
        .or_else(|| env::var("LEXICON_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEXICON));
    let lexicon_mode = cli_lexicon_mode
        .or_else(|| {
            env::var("LEXICON_LOAD_MODE")
                .ok()
                .as_deref()
                .and_then(parse_load_mode)
        })
        .unwrap_or(LoadMode::Mmap);
    let rules_path = cli_rules
        .or_else(|| env::var("AFFIX_RULES_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES));
    let language = cli_language
        .or_else(|| env::var("LANGUAGE").ok())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let max_forms = env::var("MAX_FORMS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(DEFAULT_MAX_FORMS);

    Config {
        host,
        port,
        lexicon_path,
        lexicon_mode,
        rules_path,
        language,
        max_forms,
        disable_cache,
    }
}

fn parse_load_mode(raw: &str) -> Option<LoadMode> {
    match raw.to_ascii_lowercase().as_str() {
        "mmap" => Some(LoadMode::Mmap),
        "owned" => Some(LoadMode::Owned),
        _ => None,
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
