use crate::config::WatchConfig;
use crate::domain::model::FirstRunPolicy;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "slot-watch")]
#[command(about = "Watches a ticket calendar page and notifies when a date opens up")]
pub struct CliArgs {
    /// Path to the TOML (or .json) configuration file
    #[arg(short, long, default_value = "slot-watch.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Parse and diff only; the snapshot is not written and nothing is sent
    #[arg(long)]
    pub dry_run: bool,

    /// Read the page from a saved HTML file instead of downloading it
    #[arg(long)]
    pub html: Option<String>,

    /// Override check_all_dates from the config file
    #[arg(long)]
    pub check_all_dates: bool,

    /// Override the first-run policy from the config file
    #[arg(long, value_enum)]
    pub first_run: Option<FirstRunPolicy>,
}

impl CliArgs {
    /// 把命令列覆蓋套用到設定上
    pub fn apply_overrides(&self, config: &mut WatchConfig) {
        if self.check_all_dates {
            config.targets.check_all_dates = true;
            tracing::info!("🔧 check_all_dates overridden to: true");
        }
        if let Some(policy) = self.first_run {
            config.first_run = policy;
            tracing::info!("🔧 first_run overridden to: {:?}", policy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = CliArgs::parse_from(["slot-watch", "--check-all-dates", "--first-run", "seed"]);
        let mut config = WatchConfig::from_toml_str(r#"url = "https://example.com/cal""#).unwrap();

        args.apply_overrides(&mut config);

        assert!(config.targets.check_all_dates);
        assert_eq!(config.first_run, FirstRunPolicy::Seed);
        assert_eq!(args.config, "slot-watch.toml");
    }
}
