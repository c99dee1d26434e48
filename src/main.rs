//! streamfeed - Entry Point

use clap::Parser;
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use streamfeed::config::{FeedPreferences, ResolvedConfig};
use streamfeed::integration::{FeedPipeline, HeadlessSurface};
use streamfeed::layout::{ColumnCount, Frame, PlacementRule};
use streamfeed::logging::LogTarget;
use streamfeed::model::DomainObject;
use streamfeed::stream::{FeedContext, FeedKind, PlaceholderType};
use tracing::info;

/// streamfeed - lay out a feed payload and print item placements
#[derive(Parser, Debug)]
#[command(name = "streamfeed")]
#[command(version)]
#[command(about = "Run a JSON feed payload through the stream pipeline and print waterfall placements")]
pub struct Args {
    /// Path to a JSON array of domain objects (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Feed the payload is rendered as
    #[arg(short, long, default_value = "following")]
    pub kind: FeedKind,

    /// Content width in points
    #[arg(short, long, default_value_t = 375.0)]
    pub width: f64,

    /// Grid column count (must be positive)
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..))]
    pub columns: Option<u16>,

    /// Render as a single-column list regardless of preferences
    #[arg(long)]
    pub list: bool,

    /// Column choice for grid items
    #[arg(long)]
    pub placement_rule: Option<PlacementRule>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

/// One output line per placed item.
#[derive(Debug, Serialize)]
struct PlacementLine<'a> {
    index: usize,
    item: u64,
    visual_type: &'a str,
    column: usize,
    full_width: bool,
    frame: Frame,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = streamfeed::config::load_config_with_precedence(args.config.clone())?;
        let merged = streamfeed::config::merge_config(config_file)?;
        let with_env = streamfeed::config::apply_env_overrides(merged)?;

        // Only flags the user actually passed override lower layers.
        let columns_override = args
            .columns
            .map(|n| ColumnCount::new(usize::from(n)))
            .transpose()?;
        let grid_override = if args.list { Some(false) } else { None };

        streamfeed::config::apply_cli_overrides(
            with_env,
            columns_override,
            args.placement_rule,
            grid_override,
        )
    };

    let log_target = if args.log_stderr {
        LogTarget::Stderr
    } else {
        LogTarget::File(config.log_file_path.clone())
    };
    streamfeed::logging::init(&log_target)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let objects = streamfeed::source::read_payload(args.file.clone())?;

    let mut preferences = FeedPreferences::default();
    preferences.set_all(config.grid_view);
    let context = FeedContext::new(args.kind, &preferences, None);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(context, &config, args.width, &objects))?;

    Ok(())
}

async fn run(
    context: FeedContext,
    config: &ResolvedConfig,
    width: f64,
    objects: &[DomainObject],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut pipeline = FeedPipeline::new(context, HeadlessSurface::default(), config, width);
    pipeline.show_loading().await?;
    pipeline
        .fill_placeholder(PlaceholderType::StreamItems, objects)
        .await
        .await?;

    let layout = pipeline.layout();
    info!(
        items = layout.placements.len(),
        content_height = layout.content_height,
        "Layout complete"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for (placement, item) in layout.placements.iter().zip(pipeline.store().visible_items()) {
        let line = PlacementLine {
            index: placement.index,
            item: item.id().get(),
            visual_type: item.visual_type().name(),
            column: placement.column,
            full_width: placement.full_width,
            frame: placement.frame,
        };
        serde_json::to_writer(&mut out, &line)?;
        writeln!(out)?;
    }
    writeln!(out, "{{\"content_height\":{}}}", layout.content_height)?;

    pipeline.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["streamfeed", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["streamfeed", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["streamfeed"]);
        assert_eq!(args.file, None);
        assert_eq!(args.kind, FeedKind::Following);
        assert_eq!(args.width, 375.0);
        assert_eq!(args.columns, None);
        assert!(!args.list);
        assert_eq!(args.placement_rule, None);
        assert_eq!(args.config, None);
        assert!(!args.log_stderr);
    }

    #[test]
    fn test_file_path_populates_file_field() {
        let args = Args::parse_from(["streamfeed", "feed.json"]);
        assert_eq!(args.file, Some(PathBuf::from("feed.json")));
    }

    #[test]
    fn test_kind_parses_kebab_case() {
        let args = Args::parse_from(["streamfeed", "--kind", "post-detail"]);
        assert_eq!(args.kind, FeedKind::PostDetail);
    }

    #[test]
    fn test_kind_invalid_rejects() {
        let result = Args::try_parse_from(["streamfeed", "--kind", "timeline"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_columns_rejects_zero() {
        let result = Args::try_parse_from(["streamfeed", "-c", "0"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn test_placement_rule_flag() {
        let args = Args::parse_from(["streamfeed", "--placement-rule", "right-to-left"]);
        assert_eq!(args.placement_rule, Some(PlacementRule::RightToLeft));
    }

    #[test]
    fn test_combined_flags() {
        let args = Args::parse_from([
            "streamfeed",
            "discover.json",
            "-k",
            "discover",
            "-w",
            "414",
            "-c",
            "3",
            "--log-stderr",
        ]);
        assert_eq!(args.file, Some(PathBuf::from("discover.json")));
        assert_eq!(args.kind, FeedKind::Discover);
        assert_eq!(args.width, 414.0);
        assert_eq!(args.columns, Some(3));
        assert!(args.log_stderr);
    }

    #[test]
    fn test_cli_flags_flow_through_config_precedence_chain() {
        use streamfeed::config::{apply_cli_overrides, merge_config, ConfigFile};

        let file = ConfigFile {
            column_count: Some(4),
            grid_view: Some(true),
            ..ConfigFile::default()
        };
        let merged = merge_config(Some(file)).expect("valid config");

        let args = Args::parse_from(["streamfeed", "--list", "-c", "2"]);
        let columns = args
            .columns
            .map(|n| ColumnCount::new(usize::from(n)).expect("range-checked"));
        let resolved = apply_cli_overrides(merged, columns, args.placement_rule, Some(!args.list));

        assert_eq!(resolved.column_count.get(), 2);
        assert!(!resolved.grid_view);
        assert_eq!(resolved.placement_rule, PlacementRule::ShortestFirst);
    }
}
