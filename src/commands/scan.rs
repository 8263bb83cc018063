use crate::error::{Error, Result};
use crate::services::llm::GeminiSummarizer;
use crate::services::mailer::{self, MailConfig};
use crate::services::scan::{run_scan, ScanOptions};
use crate::services::{load_universe, ScanReport};
use crate::utils;
use std::path::PathBuf;
use tracing::warn;

pub struct ScanArgs {
    pub universe: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    pub report_dir: Option<PathBuf>,
    pub limit: Option<usize>,
    pub no_ai: bool,
    pub no_mail: bool,
    pub sleep_ms: u64,
    pub fresh_secs: i64,
}

pub fn run(args: ScanArgs) {
    match execute(args) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Scan failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn execute(args: ScanArgs) -> Result<()> {
    let options = ScanOptions {
        universe_path: args.universe.unwrap_or_else(utils::get_universe_path),
        cache_path: args.cache.unwrap_or_else(utils::get_cache_path),
        limit: args.limit,
        sleep_ms: args.sleep_ms,
        fresh_secs: args.fresh_secs,
    };
    let report_dir = args.report_dir.unwrap_or_else(utils::get_report_dir);

    // A missing universe is the one fatal condition: no tickers, no work
    let tickers = load_universe(&options.universe_path)?;

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Other(format!("Failed to create runtime: {}", e)))?;

    let (report, ai_text) = runtime.block_on(async {
        let report = run_scan(&options, &tickers).await?;

        // The cache is already saved; the AI step may fail freely
        let ai_text = if args.no_ai || !report.has_candidates() {
            None
        } else {
            match GeminiSummarizer::from_env() {
                Some(summarizer) => Some(summarizer.summarize(&report.stage1).await),
                None => None,
            }
        };

        Ok::<(ScanReport, Option<String>), Error>((report, ai_text))
    })?;

    let mut body = report.render_text();
    if let Some(ai_text) = ai_text {
        body.push_str("\n## AI analysis\n");
        body.push_str(&ai_text);
        body.push('\n');
    }

    let (txt_path, csv_path) = report.write_files(&report_dir)?;

    if !args.no_mail {
        if let Some(mail) = MailConfig::from_env() {
            let subject = format!(
                "[kabuscan] {} — {} candidates",
                report.run_at.format("%Y/%m/%d"),
                report.stage1.len()
            );
            if let Err(e) = mailer::send_report(&mail, &subject, &body) {
                warn!(error = %e, "Mail delivery failed, report files are still on disk");
            } else {
                println!("📧 Report mailed to {}", mail.to);
            }
        }
    }

    println!("{}", body);
    println!("✅ Scan complete");
    println!("   Report: {}", txt_path.display());
    if let Some(csv) = csv_path {
        println!("   CSV:    {}", csv.display());
    }

    Ok(())
}
