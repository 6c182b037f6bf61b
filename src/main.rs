use clap::Parser;
use slot_watch::core::{Fetcher, Notifier};
use slot_watch::utils::error::ErrorSeverity;
use slot_watch::utils::{logger, validation::Validate};
use slot_watch::{
    build_notifier, CliArgs, FileFetcher, HttpFetcher, JsonFileStore, LogNotifier, RunReport, WatchConfig,
    WatchEngine, WatchError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // 初始化日誌
    if args.log_json {
        logger::init_json_logger(args.verbose);
    } else {
        logger::init_cli_logger(args.verbose);
    }

    tracing::info!("🚀 Starting slot-watch");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = match WatchConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML (or JSON) format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    args.apply_overrides(&mut config);

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    let fetcher: Box<dyn Fetcher> = match &args.html {
        Some(path) => {
            tracing::info!("📄 Reading page from local file: {}", path);
            Box::new(FileFetcher::new(path))
        }
        None => Box::new(HttpFetcher::new(config.timeout_seconds).unwrap_or_else(|e| exit_with(&e))),
    };
    let store = JsonFileStore::new(&config.snapshot_path);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - snapshot is not written and nothing is sent");
        let engine = WatchEngine::new(&config, fetcher, store, LogNotifier);
        match engine.preview().await {
            Ok(preview) => print_preview(&preview),
            Err(e) => exit_with(&e),
        }
        return Ok(());
    }

    let notifier: Box<dyn Notifier> =
        build_notifier(&config.notify, config.timeout_seconds).unwrap_or_else(|e| exit_with(&e));
    let engine = WatchEngine::new(&config, fetcher, store, notifier);

    match engine.run().await {
        Ok(report) => {
            print_report(&report);
            if let Some(e) = report.failure() {
                exit_with(e);
            }
            tracing::info!("✅ Check completed successfully!");
        }
        Err(e) => exit_with(&e),
    }

    Ok(())
}

/// 記錄錯誤並依嚴重程度決定退出碼
fn exit_with(e: &WatchError) -> ! {
    tracing::error!(
        "❌ Check failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 建議: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    };
    std::process::exit(exit_code);
}

fn display_config_summary(config: &WatchConfig, args: &CliArgs) {
    println!("📋 Configuration Summary:");
    println!("  🌐 URL: {}", config.url);
    if config.targets.check_all_dates {
        println!("  🎯 Dates: all");
    } else {
        let dates: Vec<String> = config.targets.target_dates.iter().map(|d| d.to_string()).collect();
        println!("  🎯 Dates: {}", if dates.is_empty() { "(none)".to_string() } else { dates.join(", ") });
    }
    println!("  💾 Snapshot: {}", config.snapshot_path);
    println!("  🆕 First run: {:?}", config.first_run);
    println!("  📧 Notifier: {:?}", config.notify.kind);
    if args.verbose {
        println!("  ⏱️ Timeout: {}s", config.timeout_seconds);
        println!("  📨 Headers: {}", config.headers.len());
    }
    println!();
}

fn print_preview(preview: &slot_watch::Preview) {
    println!("🗓️ {} cell(s) in {} calendar block(s)", preview.parse.cells.len(), preview.parse.candidates);
    if preview.parse.fallback {
        println!("⚠️ No calendar container found, scanned the whole page");
    }
    for cell in &preview.parse.cells {
        let label = if cell.month_label.is_empty() { "?" } else { cell.month_label.as_str() };
        println!(
            "  {} {:>2}  {:<28} mark {:?}",
            label,
            cell.day,
            cell.status.describe(),
            cell.raw_mark
        );
    }

    println!();
    println!("🎯 {} cell(s) match the configured dates", preview.kept.len());
    if preview.diff.events.is_empty() {
        println!("😴 No notification would be sent");
    } else {
        println!("📣 Would notify for {} date(s):", preview.diff.events.len());
        for event in &preview.diff.events {
            println!(
                "  {} {}: {} -> {}",
                event.month_label,
                event.day,
                event.previous_label(),
                event.new_status
            );
        }
    }
}

fn print_report(report: &RunReport) {
    if report.structural_mismatch {
        println!("⚠️ No calendar cells found; the page layout may have changed");
        return;
    }
    println!(
        "🗓️ {} cell(s) found, {} watched, {} without a resolvable date",
        report.cells_found, report.cells_kept, report.unresolved
    );
    if !report.collisions.is_empty() {
        println!("⚠️ {} duplicate cell identity(ies) ignored", report.collisions.len());
    }
    if report.events.is_empty() {
        println!("😴 No newly available dates");
    } else {
        println!(
            "📣 {} date(s) became available (notified: {})",
            report.events.len(),
            report.notified
        );
    }
}
