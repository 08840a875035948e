//! Command-line front end for the chapter reader.
//!
//! Opens a book, renders one chapter through the reader view, optionally
//! applies highlights and a selection, and prints the resulting frame.

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use ebup_reader::book::load_book;
use ebup_reader::config::{AppConfig, load_config};
use ebup_reader::dom::TextAnchor;
use ebup_reader::reader::{ChapterPhase, Message, ReaderFrame, ReaderRuntime, ReaderView};
use ebup_reader::services::{AppStateSnapshot, BookState, HistoryNavigator};
use regex::Regex;
use std::env;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

/// A char range to highlight, with an optional action id.
#[derive(Debug, Clone, PartialEq)]
struct HighlightArg {
    anchor: TextAnchor,
    action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
struct PatternArg {
    regex: String,
    action: Option<String>,
}

/// Render one chapter of an EPUB through the reader view.
#[derive(Debug, Parser)]
#[command(name = "ebup-reader", version, about)]
struct Cli {
    /// EPUB file to open.
    book: PathBuf,

    /// Spine index of the chapter to render.
    #[arg(long, default_value_t = 0)]
    chapter: usize,

    /// Highlight a char range; repeatable.
    #[arg(long = "highlight", value_name = "START..END[:ACTION]", value_parser = parse_highlight)]
    highlights: Vec<HighlightArg>,

    /// Highlight every match of a regex.
    #[arg(long = "highlight-pattern", value_name = "REGEX[:ACTION]", value_parser = parse_pattern)]
    pattern: Option<PatternArg>,

    /// Leave this char range selected so the popover shows.
    #[arg(long, value_name = "START..END", value_parser = parse_anchor)]
    select: Option<TextAnchor>,

    /// Config file.
    #[arg(long, default_value = "conf/config.toml")]
    config: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value = "html")]
    format: OutputFormat,
}

fn main() {
    let cli = Cli::parse();
    let reload_handle = init_tracing();
    if let Err(err) = run(&cli, &reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(args: &Cli, reload_handle: &ReloadHandle) -> Result<()> {
    let config = load_config(&args.config);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.book.display(),
        chapter = args.chapter,
        level = %config.log_level,
        "Starting chapter reader"
    );

    if !args.book.exists() {
        bail!("File not found: {}", args.book.display());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the async runtime")?;
    let frame = runtime.block_on(render(args, &config))?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&frame).context("Failed to encode frame")?;
            println!("{json}");
        }
        OutputFormat::Html => match &frame {
            ReaderFrame::Failed { message, .. } => bail!("Chapter failed to load: {message}"),
            other => {
                let html = other
                    .html()
                    .ok_or_else(|| anyhow!("Reader did not reach a rendered chapter"))?;
                println!("{html}");
            }
        },
    }
    Ok(())
}

async fn render(args: &Cli, config: &AppConfig) -> Result<ReaderFrame> {
    let book = load_book(&args.book)?;
    let mut reader = ReaderRuntime::new(ReaderView::new(config), HistoryNavigator::new());
    reader.dispatch(Message::StoreUpdated(AppStateSnapshot {
        book: BookState {
            data: Some(book),
            current_chapter: args.chapter,
        },
        settings: config.settings(),
    }));
    reader.settle().await;
    if *reader.view().phase() != ChapterPhase::Ready {
        return Ok(reader.view().frame());
    }

    let default_action = config
        .highlight_actions
        .first()
        .map(|action| action.id.clone())
        .ok_or_else(|| anyhow!("No highlight actions configured"))?;
    let mut requested = args
        .highlights
        .iter()
        .map(|highlight| (highlight.anchor, highlight.action.clone()))
        .collect::<Vec<_>>();
    if let Some(PatternArg {
        regex: pattern,
        action,
    }) = &args.pattern
    {
        let regex =
            Regex::new(pattern).with_context(|| format!("Invalid highlight pattern {pattern:?}"))?;
        let matches = reader
            .view()
            .document()
            .map(|document| TextAnchor::find_all(document, &regex))
            .unwrap_or_default();
        info!(pattern = %pattern, matches = matches.len(), "Highlighting pattern matches");
        requested.extend(matches.into_iter().map(|anchor| (anchor, action.clone())));
    }

    for (anchor, action) in requested {
        if anchor.is_empty() {
            warn!(%anchor, "Skipping empty highlight");
            continue;
        }
        reader.dispatch(Message::SelectAnchor(anchor));
        reader.dispatch(Message::HighlightAction {
            action_id: action.unwrap_or_else(|| default_action.clone()),
        });
    }

    match args.select {
        Some(anchor) => reader.dispatch(Message::SelectAnchor(anchor)),
        None => reader.dispatch(Message::SelectionChanged(None)),
    }
    reader.dispatch(Message::ViewportResized {
        width: config.viewport_width,
        height: config.viewport_height,
    });
    Ok(reader.view().frame())
}

fn parse_anchor(raw: &str) -> Result<TextAnchor, String> {
    raw.parse::<TextAnchor>().map_err(|err| err.to_string())
}

fn parse_highlight(raw: &str) -> Result<HighlightArg, String> {
    let (anchor, action) = split_action(raw);
    Ok(HighlightArg {
        anchor: parse_anchor(anchor)?,
        action,
    })
}

fn parse_pattern(raw: &str) -> Result<PatternArg, String> {
    let (regex, action) = split_action(raw);
    Ok(PatternArg {
        regex: regex.to_string(),
        action,
    })
}

/// Split a trailing `:ACTION` off a flag value.
fn split_action(raw: &str) -> (&str, Option<String>) {
    match raw.rsplit_once(':') {
        Some((head, action))
            if !action.is_empty()
                && action
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') =>
        {
            (head, Some(action.to_string()))
        }
        _ => (raw, None),
    }
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    if env::var_os("RUST_LOG").is_some() {
        return;
    }
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn parse(list: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("ebup-reader").chain(list.iter().copied()))
    }

    #[test]
    fn parses_flags_in_any_order() {
        let parsed = parse(&[
            "--chapter",
            "2",
            "book.epub",
            "--highlight",
            "3..9:color_2",
            "--highlight",
            "10..12",
            "--highlight-pattern",
            "whale:color_1",
            "--select",
            "0..4",
            "--format",
            "json",
        ])
        .expect("args");
        assert_eq!(parsed.book, PathBuf::from("book.epub"));
        assert_eq!(parsed.chapter, 2);
        assert_eq!(
            parsed.highlights,
            vec![
                HighlightArg {
                    anchor: TextAnchor::new(3, 9),
                    action: Some("color_2".to_string()),
                },
                HighlightArg {
                    anchor: TextAnchor::new(10, 12),
                    action: None,
                },
            ]
        );
        assert_eq!(
            parsed.pattern,
            Some(PatternArg {
                regex: "whale".to_string(),
                action: Some("color_1".to_string()),
            })
        );
        assert_eq!(parsed.select, Some(TextAnchor::new(0, 4)));
        assert_eq!(parsed.format, OutputFormat::Json);
        assert_eq!(parsed.config, Path::new("conf/config.toml"));
    }

    #[test]
    fn defaults_apply_when_only_the_book_is_given() {
        let parsed = parse(&["book.epub"]).expect("args");
        assert_eq!(parsed.chapter, 0);
        assert!(parsed.highlights.is_empty());
        assert_eq!(parsed.pattern, None);
        assert_eq!(parsed.select, None);
        assert_eq!(parsed.format, OutputFormat::Html);
    }

    #[test]
    fn rejects_missing_book_and_unknown_flags() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["book.epub", "--bogus"]).is_err());
        assert!(parse(&["book.epub", "--chapter"]).is_err());
        assert!(parse(&["book.epub", "--format", "pdf"]).is_err());
        assert!(parse(&["book.epub", "--highlight", "3-9"]).is_err());
        assert!(parse(&["book.epub", "--select", "a..b"]).is_err());
    }

    #[test]
    fn pattern_colons_stay_in_the_regex() {
        assert_eq!(split_action(r"\d+:\d+"), (r"\d+:\d+", None));
        assert_eq!(split_action("a|b:color_2"), ("a|b", Some("color_2".to_string())));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
