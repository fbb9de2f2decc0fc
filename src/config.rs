use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::theme::Theme;

/// Pokedex - terminal table over the PokeAPI
///
/// Paged Pokemon list with name search, type filtering and a stats overlay.
/// Configuration priority: CLI args > Environment variables > Defaults
#[derive(Parser, Debug)]
#[command(name = "pokedex")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Terminal Pokedex table", long_about = None)]
pub struct CliArgs {
    /// PokeAPI base URL
    #[arg(long, env = "POKEAPI_URL")]
    pub api_url: Option<String>,

    /// Page to open on startup (1-based)
    #[arg(long, env = "START_PAGE")]
    pub page: Option<u32>,

    /// Rows per page (1-100)
    #[arg(long, env = "ITEMS_PER_PAGE")]
    pub per_page: Option<u32>,

    /// Rows-per-page options for cycling (comma-separated, e.g. "10,15,20,25,30")
    #[arg(long, env = "PER_PAGE_CHOICES")]
    pub per_page_choices: Option<String>,

    /// HTTP request timeout in milliseconds (1000-60000)
    #[arg(long, env = "HTTP_TIMEOUT_MS")]
    pub http_timeout_ms: Option<u64>,

    /// Retry attempts on transport errors and HTTP 429 (0-10)
    #[arg(long, env = "HTTP_RETRIES")]
    pub http_retries: Option<u8>,

    /// Concurrent detail requests per page (1-50)
    #[arg(long, env = "DETAIL_CONCURRENCY")]
    pub detail_concurrency: Option<usize>,

    /// Target UI rendering FPS (1-120)
    #[arg(long, env = "RENDER_FPS")]
    pub render_fps: Option<u32>,

    /// Initial name search
    #[arg(long, env = "DEFAULT_SEARCH")]
    pub search: Option<String>,

    /// Initial type filter (comma-separated, e.g. "fire,water")
    #[arg(long, env = "DEFAULT_TYPES")]
    pub types: Option<String>,

    /// Color theme: nord, dos-blue, amber-crt, green-phosphor
    #[arg(long, env = "POKEDEX_THEME")]
    pub theme: Option<String>,

    /// Log file (the terminal is owned by the UI)
    #[arg(long, env = "POKEDEX_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub start_page: u32,
    pub per_page: u32,
    pub per_page_choices: Vec<u32>,
    pub http_timeout_ms: u64,
    pub http_retries: u8,
    pub detail_concurrency: usize,
    pub render_fps: u32,
    pub default_search: String,
    pub default_types: Vec<String>,
    pub theme: Theme,
    pub log_file: PathBuf,
}

/// Validate that a value is within a given range (inclusive)
fn validate_in_range<T>(val: T, min: T, max: T, name: &str) -> Result<T>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if val < min || val > max {
        Err(anyhow!("{name} must be in range [{min}, {max}], got {val}"))
    } else {
        Ok(val)
    }
}

/// Parse comma-separated page sizes, dropping anything out of range
fn parse_per_page_list(s: &str) -> Vec<u32> {
    let mut v: Vec<u32> = s
        .split(',')
        .filter_map(|v| v.trim().parse::<u32>().ok())
        .filter(|n| (1..=100).contains(n))
        .collect();
    v.sort_unstable();
    v.dedup();
    v
}

/// Parse comma-separated type names (lowercased, deduplicated, order kept)
fn parse_type_list(s: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for t in s.split(',').map(|t| t.trim().to_lowercase()) {
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

/// Load configuration from CLI args and environment variables
/// Priority: CLI args > Environment variables > Defaults
pub fn load() -> Result<Config> {
    Config::from_args(CliArgs::parse())
}

impl Config {
    pub fn from_args(args: CliArgs) -> Result<Config> {
        let api_url = args
            .api_url
            .unwrap_or_else(|| "https://pokeapi.co/api/v2".to_string());
        validate_url(&api_url, "POKEAPI_URL")?;
        let api_url = api_url.trim_end_matches('/').to_string();

        let start_page = args.page.unwrap_or(1);
        if start_page == 0 {
            return Err(anyhow!("START_PAGE must be at least 1"));
        }

        let mut per_page_choices = args
            .per_page_choices
            .map(|s| parse_per_page_list(&s))
            .unwrap_or_else(|| vec![10, 15, 20, 25, 30]);
        if per_page_choices.is_empty() {
            return Err(anyhow!(
                "PER_PAGE_CHOICES must contain at least one valid value (1-100)"
            ));
        }

        let per_page = args.per_page.unwrap_or(per_page_choices[0]);
        let per_page = validate_in_range(per_page, 1, 100, "ITEMS_PER_PAGE")?;
        if !per_page_choices.contains(&per_page) {
            per_page_choices.push(per_page);
            per_page_choices.sort_unstable();
        }

        let http_timeout_ms = args.http_timeout_ms.unwrap_or(8000);
        let http_timeout_ms = validate_in_range(http_timeout_ms, 1000, 60000, "HTTP_TIMEOUT_MS")?;

        let http_retries = args.http_retries.unwrap_or(2);
        let http_retries = validate_in_range(http_retries, 0, 10, "HTTP_RETRIES")?;

        let detail_concurrency = args.detail_concurrency.unwrap_or(10);
        let detail_concurrency =
            validate_in_range(detail_concurrency, 1, 50, "DETAIL_CONCURRENCY")?;

        let render_fps = args.render_fps.unwrap_or(30);
        let render_fps = validate_in_range(render_fps, 1, 120, "RENDER_FPS")?;

        let theme = match args.theme {
            Some(name) => name.parse::<Theme>().map_err(|e| anyhow!(e))?,
            None => Theme::default(),
        };

        Ok(Config {
            api_url,
            start_page,
            per_page,
            per_page_choices,
            http_timeout_ms,
            http_retries,
            detail_concurrency,
            render_fps,
            default_search: args.search.unwrap_or_default(),
            default_types: args.types.map(|s| parse_type_list(&s)).unwrap_or_default(),
            theme,
            log_file: args.log_file.unwrap_or_else(|| PathBuf::from("./pokedex.log")),
        })
    }

    /// Log current configuration (the terminal belongs to the UI)
    pub fn log_summary(&self) {
        log::info!("Pokedex Configuration:");
        log::info!("  API URL: {}", self.api_url);
        log::info!("  Start Page: {}", self.start_page);
        log::info!("  Rows Per Page: {} (choices {:?})", self.per_page, self.per_page_choices);
        log::info!("  HTTP Timeout: {}ms", self.http_timeout_ms);
        log::info!("  HTTP Retries: {}", self.http_retries);
        log::info!("  Detail Concurrency: {}", self.detail_concurrency);
        log::info!("  Render FPS: {}", self.render_fps);
        log::info!("  Theme: {}", self.theme);
        if !self.default_search.is_empty() {
            log::info!("  Search: {}", self.default_search);
        }
        if !self.default_types.is_empty() {
            log::info!("  Types: {}", self.default_types.join(","));
        }
        log::info!("  Log File: {}", self.log_file.display());
    }
}

/// Validate URL format (basic check)
fn validate_url(url: &str, name: &str) -> Result<()> {
    if url.is_empty() {
        return Err(anyhow!("{name} cannot be empty"));
    }

    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(anyhow!("{name} must start with http:// or https://"))
    }
}
