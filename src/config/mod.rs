pub mod browse_mode;

use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use dotenv::dotenv;
use url::Url;

pub use browse_mode::BrowseMode;

const DEFAULT_API_BASE: &str = "https://admin-jimei-stg.itdog.tw/admin-api/v1/";

#[derive(Debug, Clone, Parser)]
#[command(name = "video-review-console")]
pub struct Config {
    /// Base URL of the admin API
    #[arg(long, env = "API_BASE", default_value = DEFAULT_API_BASE)]
    api_base: Url,
    /// How pages are browsed
    #[arg(long, value_enum, default_value_t = BrowseMode::Sequential)]
    mode: BrowseMode,
    /// Page to start on
    #[arg(long, default_value = "1")]
    page: u32,
    #[command(flatten)]
    pub verbose: Verbosity<InfoLevel>,
}

impl Config {
    /// Parse the configuration from the environment and command line arguments
    pub fn parse() -> Self {
        dotenv().ok();
        <Self as Parser>::parse()
    }

    /// Create a logger with the configured verbosity level
    pub fn init_logger(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbose.log_level_filter())
            .format_target(false)
            .init();
    }

    /// Base endpoint, normalized with a trailing slash so joins append
    /// instead of replacing the last path segment.
    pub fn api_base(&self) -> Url {
        let mut base = self.api_base.clone();
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        base
    }

    pub const fn mode(&self) -> BrowseMode {
        self.mode
    }

    pub const fn page(&self) -> u32 {
        self.page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_base(base: &str) -> Config {
        Config::try_parse_from(["video-review-console", "--api-base", base]).unwrap()
    }

    #[test]
    fn the_api_base_gains_a_trailing_slash() {
        let config = config_with_base("https://example.com/admin-api/v1");
        assert_eq!(
            config.api_base().as_str(),
            "https://example.com/admin-api/v1/"
        );
        assert_eq!(
            config.api_base().join("user/login").unwrap().as_str(),
            "https://example.com/admin-api/v1/user/login"
        );
    }

    #[test]
    fn an_already_normalized_base_is_left_alone() {
        let config = config_with_base("https://example.com/admin-api/v1/");
        assert_eq!(
            config.api_base().as_str(),
            "https://example.com/admin-api/v1/"
        );
    }

    #[test]
    fn defaults_are_sequential_from_page_one() {
        let config = Config::try_parse_from(["video-review-console"]).unwrap();
        assert_eq!(config.mode(), BrowseMode::Sequential);
        assert_eq!(config.page(), 1);
    }

    #[test]
    fn the_browse_mode_is_selectable() {
        let config =
            Config::try_parse_from(["video-review-console", "--mode", "random-sample"]).unwrap();
        assert_eq!(config.mode(), BrowseMode::RandomSample);
    }
}
