//! Output generation.
//!
//! Turns a ranked list (or the error that replaced it) into a title and a
//! body, and hands both to a [`DisplaySink`].

use crate::analysis::Ranking;
use crate::cli::DisplayMode;
use crate::error::TrendingError;
use crate::models::{BackendKind, Filters, Repository};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;

/// Receives a title and a body and presents them.
pub trait DisplaySink {
    fn show(&mut self, title: &str, body: &str) -> Result<()>;
}

/// Writes to stdout.
pub struct StdoutSink;

impl DisplaySink for StdoutSink {
    fn show(&mut self, title: &str, body: &str) -> Result<()> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(compose(title, body).as_bytes())
            .context("Failed to write to stdout")?;
        Ok(())
    }
}

/// Writes to a file, replacing its contents.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DisplaySink for FileSink {
    fn show(&mut self, title: &str, body: &str) -> Result<()> {
        std::fs::write(&self.path, compose(title, body))
            .with_context(|| format!("Failed to write output to {}", self.path.display()))
    }
}

fn compose(title: &str, body: &str) -> String {
    if title.is_empty() {
        format!("{}\n", body)
    } else {
        format!("{}\n\n{}\n", title, body)
    }
}

/// Title line, e.g. `GitHub Trending - [rust go]`.
pub fn generate_title(filters: &Filters) -> String {
    format!("GitHub Trending - [{}]", filters.languages.join(" "))
}

/// Text body, one line per repository.
pub fn generate_text_body(repos: &[Repository], mode: DisplayMode) -> String {
    if repos.is_empty() {
        return "No results to display".to_string();
    }

    repos
        .iter()
        .map(|repo| generate_row(repo, mode))
        .collect::<Vec<_>>()
        .join("\n")
}

fn generate_row(repo: &Repository, mode: DisplayMode) -> String {
    let mut row: Vec<String> = Vec::new();

    let with_language = matches!(mode, DisplayMode::NameDescLang | DisplayMode::Full);
    if with_language && !repo.language.is_empty() {
        row.push(format!("[{}]", repo.language));
    }

    row.push(repo.name.clone());

    if mode == DisplayMode::Full {
        match repo.stars_today {
            Some(today) => row.push(format!(
                "({} stars, +{})",
                format_thousands(repo.stars),
                format_thousands(today)
            )),
            None => row.push(format!("({} stars)", format_thousands(repo.stars))),
        }
    }

    if mode != DisplayMode::Name && !repo.description.is_empty() {
        row.push(format!("- {}", repo.description));
    }

    row.join(" ")
}

/// `999` stays `999`; `1234` becomes `1.2k`.
pub fn format_thousands(value: u64) -> String {
    if value < 1000 {
        return value.to_string();
    }
    let thousands = (value as f64 / 1000.0 * 10.0).round() / 10.0;
    format!("{:.1}k", thousands)
}

/// JSON document for a successful run.
#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    title: String,
    generated_at: DateTime<Utc>,
    backend: BackendKind,
    ranking: Ranking,
    period: &'a str,
    languages: &'a [String],
    spoken_languages: &'a [String],
    repositories: &'a [Repository],
}

/// JSON document for a failed run.
#[derive(Debug, Serialize)]
struct JsonError {
    title: String,
    error: String,
}

/// Generate a JSON report.
pub fn generate_json_report(repos: &[Repository], filters: &Filters) -> Result<String> {
    let report = JsonReport {
        title: generate_title(filters),
        generated_at: Utc::now(),
        backend: filters.backend,
        ranking: Ranking::for_backend(filters.backend),
        period: &filters.period,
        languages: &filters.languages,
        spoken_languages: &filters.spoken_languages,
        repositories: repos,
    };
    serde_json::to_string_pretty(&report).context("Failed to serialize report to JSON")
}

/// Generate a JSON document carrying only the error.
pub fn generate_json_error(error: &TrendingError, filters: &Filters) -> Result<String> {
    let doc = JsonError {
        title: generate_title(filters),
        error: error.to_string(),
    };
    serde_json::to_string_pretty(&doc).context("Failed to serialize error to JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo(full_name: &str, language: &str, stars: u64, stars_today: Option<u64>) -> Repository {
        Repository {
            name: full_name.split_once('/').map(|(_, n)| n).unwrap_or("").to_string(),
            full_name: full_name.to_string(),
            url: format!("https://github.com/{}", full_name),
            description: "A description".to_string(),
            language: language.to_string(),
            stars,
            stars_today,
        }
    }

    fn filters(languages: &[&str]) -> Filters {
        Filters {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            spoken_languages: Vec::new(),
            period: "day".to_string(),
            min_stars: 0,
            limit: 10,
            backend: BackendKind::Scrape,
            dedupe: false,
        }
    }

    struct MemorySink(Vec<(String, String)>);

    impl DisplaySink for MemorySink {
        fn show(&mut self, title: &str, body: &str) -> Result<()> {
            self.0.push((title.to_string(), body.to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_title() {
        assert_eq!(
            generate_title(&filters(&["rust", "go"])),
            "GitHub Trending - [rust go]"
        );
        assert_eq!(generate_title(&filters(&[])), "GitHub Trending - []");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1.0k");
        assert_eq!(format_thousands(1234), "1.2k");
        assert_eq!(format_thousands(27_451), "27.5k");
    }

    #[test]
    fn test_display_modes() {
        let r = repo("tokio-rs/tokio", "Rust", 27_431, Some(1234));
        assert_eq!(generate_row(&r, DisplayMode::Name), "tokio");
        assert_eq!(
            generate_row(&r, DisplayMode::NameDesc),
            "tokio - A description"
        );
        assert_eq!(
            generate_row(&r, DisplayMode::NameDescLang),
            "[Rust] tokio - A description"
        );
        assert_eq!(
            generate_row(&r, DisplayMode::Full),
            "[Rust] tokio (27.4k stars, +1.2k) - A description"
        );
    }

    #[test]
    fn test_full_mode_without_daily_stars() {
        let r = repo("golang/go", "", 500, None);
        assert_eq!(
            generate_row(&r, DisplayMode::Full),
            "go (500 stars) - A description"
        );
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(
            generate_text_body(&[], DisplayMode::Full),
            "No results to display"
        );
    }

    #[test]
    fn test_sink_receives_title_and_body() {
        let repos = vec![repo("a/b", "Go", 1, None), repo("c/d", "Go", 2, None)];
        let mut sink = MemorySink(Vec::new());
        sink.show(
            &generate_title(&filters(&["go"])),
            &generate_text_body(&repos, DisplayMode::Name),
        )
        .unwrap();

        assert_eq!(
            sink.0,
            vec![(
                "GitHub Trending - [go]".to_string(),
                "b\nd".to_string()
            )]
        );
    }

    #[test]
    fn test_json_report() {
        let repos = vec![repo("golang/go", "Go", 10, None)];
        let json = generate_json_report(&repos, &filters(&["go"])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["backend"], "scrape");
        assert_eq!(value["ranking"], "momentum");
        assert_eq!(value["repositories"][0]["fullName"], "golang/go");
        assert_eq!(value["repositories"][0]["name"], "go");
        assert!(value["repositories"][0]["starsToday"].is_null());
    }

    #[test]
    fn test_json_error() {
        let err = TrendingError::InvalidPeriod("century".to_string());
        let json = generate_json_error(&err, &filters(&[])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["error"], "unknown period value: century");
    }

    #[test]
    fn test_file_sink() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out.txt");
        let mut sink = FileSink::new(path.clone());
        sink.show("Title", "body").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Title\n\nbody\n");
    }
}
