use crate::error::{AppError, Result};
use crate::models::{Candidate, SkipCounts, Stage};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::info;

/// Aggregated outcome of one scan. Stage lists preserve universe iteration
/// order; stage 2 entries also appear in the stage 1 list (stage 2 is a
/// refinement label, not a partition).
#[derive(Debug)]
pub struct ScanReport {
    pub run_at: DateTime<Local>,
    pub scanned: usize,
    pub stage1: Vec<Candidate>,
    pub skips: SkipCounts,
}

impl ScanReport {
    pub fn new(run_at: DateTime<Local>, scanned: usize) -> Self {
        Self {
            run_at,
            scanned,
            stage1: Vec::new(),
            skips: SkipCounts::default(),
        }
    }

    pub fn add(&mut self, candidate: Candidate) {
        self.stage1.push(candidate);
    }

    pub fn stage2(&self) -> impl Iterator<Item = &Candidate> {
        self.stage1.iter().filter(|c| c.stage == Stage::Stage2)
    }

    pub fn has_candidates(&self) -> bool {
        !self.stage1.is_empty()
    }

    /// Human-readable text report, also used as the mail body
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let line = "-".repeat(50);

        out.push_str(&format!(
            "Daily screening report  {}\n",
            self.run_at.format("%Y/%m/%d %H:%M")
        ));
        out.push_str(&format!("{}\n", "=".repeat(60)));

        out.push_str("\n## Stage 1: bottoming range + rebound + volume spike\n");
        out.push_str("   range: closes within +15% of the 25-day low\n");
        out.push_str("   rebound: close at least +10% off the low\n");
        out.push_str("   volume: today 2.0x and yesterday 1.5x the average\n");
        out.push_str(&format!("{}\n", line));

        if self.stage1.is_empty() {
            out.push_str("No candidates found today.\n");
        } else {
            for c in &self.stage1 {
                out.push_str(&format!("* {} ({})\n", c.name, c.code));
                out.push_str(&format!(
                    "    close: {:.1} yen  (+{:.1}% off the low, volume {:.1}x)\n",
                    c.close, c.rally_pct, c.volume_ratio
                ));
                out.push_str(&format!(
                    "    limit buys: {:.1} / {:.1}   stop: below {:.1}\n",
                    c.target1, c.target2, c.stop_loss
                ));
                out.push_str(&format!(
                    "    https://finance.yahoo.co.jp/quote/{}\n",
                    c.code
                ));
                out.push_str(&format!("{}\n", line));
            }
        }

        out.push_str("\n## Stage 2: strict tier (range +10%, both days 2.0x volume)\n");
        out.push_str(&format!("{}\n", line));
        let mut any_stage2 = false;
        for c in self.stage2() {
            any_stage2 = true;
            out.push_str(&format!(
                "** {} ({})  close {:.1}  limits {:.1} / {:.1}\n",
                c.name, c.code, c.close, c.target1, c.target2
            ));
        }
        if !any_stage2 {
            out.push_str("No stage 2 candidates.\n");
        }

        out.push_str(&format!(
            "\nScanned {} tickers, {} matched, {} skipped\n",
            self.scanned,
            self.stage1.len(),
            self.skips.total()
        ));
        out.push_str(&format!(
            "  skipped: {} unavailable, {} short history, {} malformed\n",
            self.skips.unavailable, self.skips.insufficient_history, self.skips.malformed_data
        ));

        out
    }

    /// Write the text report and the verification CSV next to each other:
    /// Report_YYYYMMDD.txt and Report_YYYYMMDD.csv
    pub fn write_files(&self, dir: &Path) -> Result<(PathBuf, Option<PathBuf>)> {
        let stamp = self.run_at.format("%Y%m%d");

        let txt_path = dir.join(format!("Report_{}.txt", stamp));
        std::fs::write(&txt_path, self.render_text())
            .map_err(|e| AppError::Io(format!("Failed to write text report: {}", e)))?;

        // The CSV exists for verification; skip it when there is nothing to verify
        let csv_path = if self.stage1.is_empty() {
            None
        } else {
            let path = dir.join(format!("Report_{}.csv", stamp));
            self.write_csv(&path)?;
            Some(path)
        };

        info!(report = %txt_path.display(), candidates = self.stage1.len(), "Wrote report files");
        Ok((txt_path, csv_path))
    }

    fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| AppError::Io(format!("Failed to create CSV report: {}", e)))?;

        writer.write_record([
            "code",
            "name",
            "close",
            "rally_pct",
            "target1",
            "target2",
            "stop_loss",
            "volume_ratio",
            "stage",
        ])?;

        for c in &self.stage1 {
            let row = [
                c.code.clone(),
                c.name.clone(),
                format!("{:.1}", c.close),
                format!("{:.1}", c.rally_pct),
                format!("{:.1}", c.target1),
                format!("{:.1}", c.target2),
                format!("{:.1}", c.stop_loss),
                format!("{:.1}", c.volume_ratio),
                c.stage.to_string(),
            ];
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(code: &str, stage: Stage) -> Candidate {
        Candidate {
            code: code.to_string(),
            name: "Test Co".to_string(),
            close: 124.0,
            rally_pct: 37.78,
            target1: 120.28,
            target2: 107.0,
            stop_loss: 103.8,
            volume_ratio: 3.0,
            stage,
        }
    }

    #[test]
    fn test_empty_report_says_no_candidates() {
        let report = ScanReport::new(Local::now(), 100);
        let text = report.render_text();
        assert!(text.contains("No candidates found today."));
        assert!(text.contains("Scanned 100 tickers, 0 matched"));
    }

    #[test]
    fn test_stage2_appears_in_both_sections() {
        let mut report = ScanReport::new(Local::now(), 2);
        report.add(candidate("7203.T", Stage::Stage1));
        report.add(candidate("6758.T", Stage::Stage2));

        assert_eq!(report.stage1.len(), 2);
        assert_eq!(report.stage2().count(), 1);

        let text = report.render_text();
        // Stage 2 candidate shows up in the stage 1 listing and again below
        assert_eq!(text.matches("6758.T").count(), 3); // listing + link + stage 2 section
        assert!(text.contains("** Test Co (6758.T)"));
    }

    #[test]
    fn test_write_files_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut report = ScanReport::new(Local::now(), 1);
        report.add(candidate("7203.T", Stage::Stage1));

        let (txt, csv) = report.write_files(dir.path()).unwrap();
        assert!(txt.exists());
        let csv = csv.expect("CSV written when candidates exist");
        let content = std::fs::read_to_string(csv).unwrap();
        assert!(content.starts_with("code,name,close"));
        assert!(content.contains("7203.T"));
        assert!(content.contains("stage1"));
    }

    #[test]
    fn test_empty_report_skips_csv() {
        let dir = tempfile::tempdir().unwrap();
        let report = ScanReport::new(Local::now(), 0);
        let (_txt, csv) = report.write_files(dir.path()).unwrap();
        assert!(csv.is_none());
    }
}
