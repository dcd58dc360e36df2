use std::io::{IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::debug;

use tfprofile_logs::{ParsedLog, ResourceEvent, SortSpec, aggregate, read_log, statistics};
use tfprofile_render::{Theme, render_stats, render_table};

mod config;

use config::Config;

/// tf-profile - Profile Terraform plan/apply logs
#[derive(Parser, Debug)]
#[command(name = "tf-profile")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: ~/.config/tf-profile/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print high-level statistics about a run
    Stats(InputArgs),

    /// Print per-resource metrics as a table
    Table {
        #[command(flatten)]
        input: InputArgs,

        /// Comma-separated `column=asc|desc` pairs, e.g. "tot_time=desc,n=asc"
        #[arg(short, long, value_name = "SPEC")]
        sort: Option<String>,

        /// Maximum module depth to show (accepted for compatibility, not applied)
        #[arg(short = 'd', long, value_name = "N")]
        max_depth: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Log file to read (standard input when omitted)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Echo the log to stdout while parsing it
    #[arg(short, long)]
    tee: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    init_tracing(&config.logging.level);

    let theme = Theme::new(use_color(cli.no_color, &config));

    let output = match cli.command {
        Command::Stats(input) => {
            let log = load_log(&input, &config).await?;
            render_stats(&statistics(&log), &theme)
        }
        Command::Table {
            input,
            sort,
            max_depth,
        } => {
            // Validate the sort spec before consuming any input
            let spec = table_sort(sort.as_deref(), &config)?;
            if let Some(depth) = max_depth {
                debug!(depth, "--max-depth is accepted but not applied");
            }

            let log = load_log(&input, &config).await?;
            let order = spec.sort(&log);
            render_table(&log, &order, &theme)
        }
    };

    let mut stdout = std::io::stdout().lock();
    writeln!(stdout)?;
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn init_tracing(level: &str) {
    // Diagnostics go to stderr so stdout only carries the log echo and tables
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn use_color(no_color_flag: bool, config: &Config) -> bool {
    color_enabled(
        no_color_flag,
        config,
        std::env::var_os("NO_COLOR").is_some(),
        std::io::stdout().is_terminal(),
    )
}

fn color_enabled(no_color_flag: bool, config: &Config, no_color_env: bool, terminal: bool) -> bool {
    !no_color_flag && config.output.color && !no_color_env && terminal
}

/// `--sort` wins over `[table] sort`
fn table_sort(sort: Option<&str>, config: &Config) -> tfprofile_logs::Result<SortSpec> {
    SortSpec::parse(sort.unwrap_or(&config.table.sort))
}

/// Read, parse and aggregate the log named by `input`
async fn load_log(input: &InputArgs, config: &Config) -> Result<ParsedLog> {
    let tee = input.tee || config.output.tee;

    let events = match &input.file {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            parse_source(BufReader::new(file), tee).await?
        }
        None => parse_source(BufReader::new(tokio::io::stdin()), tee).await?,
    };

    Ok(aggregate(&events))
}

async fn parse_source<R>(reader: R, tee: bool) -> tfprofile_logs::Result<Vec<ResourceEvent>>
where
    R: AsyncBufRead + Unpin,
{
    read_log(reader, tee.then(tokio::io::stdout)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tfprofile_logs::Status;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_table_arguments() {
        let cli = Cli::try_parse_from([
            "tf-profile",
            "--no-color",
            "table",
            "apply.log",
            "--tee",
            "--sort",
            "n=desc",
            "--max-depth",
            "2",
        ])
        .unwrap();
        assert!(cli.no_color);
        match cli.command {
            Command::Table {
                input,
                sort,
                max_depth,
            } => {
                assert_eq!(input.file, Some(PathBuf::from("apply.log")));
                assert!(input.tee);
                assert_eq!(sort.as_deref(), Some("n=desc"));
                assert_eq!(max_depth, Some(2));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_stats_reads_stdin_by_default() {
        let cli = Cli::try_parse_from(["tf-profile", "stats"]).unwrap();
        match cli.command {
            Command::Stats(input) => {
                assert_eq!(input.file, None);
                assert!(!input.tee);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_color_flag_wins_over_config() {
        assert!(!use_color(true, &Config::default()));
    }

    #[test]
    fn test_color_needs_terminal_and_no_opt_out() {
        let config = Config::default();
        assert!(color_enabled(false, &config, false, true));
        assert!(!color_enabled(false, &config, true, true));
        assert!(!color_enabled(false, &config, false, false));

        let config = Config::from_toml("[output]\ncolor = false").unwrap();
        assert!(!color_enabled(false, &config, false, true));
    }

    #[test]
    fn test_sort_flag_overrides_config() {
        let config = Config::from_toml("[table]\nsort = \"n=desc\"").unwrap();
        assert_eq!(table_sort(None, &config).unwrap().to_string(), "n=desc");

        let spec = table_sort(Some("resource=asc"), &config).unwrap();
        assert_eq!(spec.to_string(), "resource=asc");
    }

    #[test]
    fn test_sort_flag_replaces_broken_config_sort() {
        let config = Config::from_toml("[table]\nsort = \"bogus=asc\"").unwrap();
        assert!(table_sort(None, &config).is_err());
        assert!(table_sort(Some("n=desc"), &config).is_ok());
    }

    fn empty_config_file(dir: &tempfile::TempDir) -> String {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();
        path.display().to_string()
    }

    #[tokio::test]
    async fn test_bad_sort_fails_before_reading_input() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config_file(&dir);
        let cli = Cli::try_parse_from([
            "tf-profile",
            "--config",
            config.as_str(),
            "table",
            "/nonexistent/tf-profile/apply.log",
            "--sort",
            "bogus=asc",
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(
            matches!(
                err.downcast_ref::<tfprofile_logs::Error>(),
                Some(tfprofile_logs::Error::SortConfig(_))
            ),
            "unexpected error: {err:#}"
        );
    }

    #[tokio::test]
    async fn test_run_can_be_repeated() {
        let dir = tempfile::tempdir().unwrap();
        let config = empty_config_file(&dir);
        let log = dir.path().join("apply.log");
        std::fs::write(&log, "aws_instance.a: Creating...\n").unwrap();
        let log = log.display().to_string();
        let (config, log) = (config.as_str(), log.as_str());

        for command in ["stats", "table"] {
            let args = ["tf-profile", "--config", config, "--no-color", command, log];
            let cli = Cli::try_parse_from(args).unwrap();
            run(cli).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_load_log_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("apply.log");
        std::fs::write(
            &path,
            "aws_instance.a: Creating...\n\
             aws_instance.a: Creation complete after 2s [id=a]\n",
        )
        .unwrap();

        let input = InputArgs {
            file: Some(path),
            tee: false,
        };
        let log = load_log(&input, &Config::default()).await.unwrap();
        let a = log.get("aws_instance.a").unwrap();
        assert_eq!(a.total_time_ms, 2_000);
        assert_eq!(a.after_status, Status::Created);
    }

    #[tokio::test]
    async fn test_missing_file_is_a_source_error() {
        let input = InputArgs {
            file: Some(PathBuf::from("/nonexistent/tf-profile/apply.log")),
            tee: false,
        };
        let err = load_log(&input, &Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("failed to open"));
    }
}
