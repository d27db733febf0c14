//! Logchef CLI
//!
//! Command-line front end for the LogchefQL translator.
//!
//! # Usage
//!
//! ```bash
//! logchef --help
//! logchef translate 'level="error" and status>=500'
//! logchef translate --dialect victorialogs 'service="api" | body'
//! logchef validate 'a="1" b="2"'
//! logchef build 'level="error"' --table logs.app --start '2025-01-01 00:00:00' --end '2025-01-02 00:00:00'
//! echo 'SELECT * FROM logs' | logchef detect -
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use logchefql::builder::{
    build_full_logsql_query, build_full_query, parse_time_bound, LogsqlQueryParams,
    SqlQueryParams,
};
use logchefql::detect::detect_query_type;
use logchefql::query::parse_query;
use logchefql::schema::Schema;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Logchef CLI - translate LogchefQL into backend queries
#[derive(Parser)]
#[command(name = "logchef")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a query into filter conditions
    Translate {
        /// LogchefQL query, or `-` to read from stdin
        query: String,

        #[command(flatten)]
        target: Target,
    },
    /// Check a query's syntax
    Validate {
        /// LogchefQL query, or `-` to read from stdin
        query: String,
    },
    /// Tell SQL input from LogchefQL input
    Detect {
        /// Query text, or `-` to read from stdin
        query: String,
    },
    /// Print a query in canonical form
    Fmt {
        /// LogchefQL query, or `-` to read from stdin
        query: String,
    },
    /// Build a complete backend query for a time range
    Build(BuildArgs),
}

#[derive(Args)]
struct Target {
    /// Backend language to generate
    #[arg(short, long, value_enum, default_value_t = Dialect::Clickhouse)]
    dialect: Dialect,

    /// JSON schema file: {"columns":[{"name":..,"type":..}]}
    #[arg(short, long, env = "LOGCHEF_SCHEMA")]
    schema: Option<PathBuf>,
}

#[derive(Args)]
struct BuildArgs {
    /// LogchefQL query, or `-` to read from stdin
    query: String,

    #[command(flatten)]
    target: Target,

    /// Table to query, `table` or `database.table`
    #[arg(long)]
    table: Option<String>,

    /// Timestamp column
    #[arg(long, default_value = "timestamp")]
    timestamp_field: String,

    /// Start of the time range
    #[arg(long)]
    start: String,

    /// End of the time range
    #[arg(long)]
    end: String,

    /// Timezone of the time range (ClickHouse only)
    #[arg(long, env = "LOGCHEF_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Row limit; 0 disables the limit
    #[arg(short, long, default_value_t = 100)]
    limit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Dialect {
    /// ClickHouse SQL
    Clickhouse,
    /// VictoriaLogs LogsQL
    Victorialogs,
}

fn read_query(query: String) -> Result<String> {
    if query != "-" {
        return Ok(query);
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read query from stdin")?;
    Ok(buf.trim_end_matches(['\n', '\r']).to_string())
}

fn load_schema(path: Option<&Path>) -> Result<Option<Schema>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read schema file {}", path.display()))?;
    let schema: Schema = serde_json::from_str(&text)
        .with_context(|| format!("invalid schema file {}", path.display()))?;
    tracing::debug!(path = %path.display(), columns = schema.columns.len(), "Loaded schema");
    Ok(Some(schema))
}

fn write_json<T: serde::Serialize>(out: &mut impl Write, value: &T, pretty: bool) -> Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *out, value)?;
    } else {
        serde_json::to_writer(&mut *out, value)?;
    }
    writeln!(out)?;
    Ok(())
}

/// Executes a parsed command line. Returns whether the query was accepted.
fn run(cli: Cli, out: &mut impl Write) -> Result<bool> {
    let pretty = cli.pretty;
    let Some(command) = cli.command else {
        writeln!(out, "Logchef CLI v{}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "Use --help for usage information")?;
        return Ok(true);
    };

    match command {
        Commands::Translate { query, target } => {
            let query = read_query(query)?;
            match target.dialect {
                Dialect::Clickhouse => {
                    let schema = load_schema(target.schema.as_deref())?;
                    let result = logchefql::translate(&query, schema.as_ref());
                    write_json(out, &result, pretty)?;
                    Ok(result.valid)
                }
                Dialect::Victorialogs => {
                    let result = logchefql::translate_logsql(&query);
                    write_json(out, &result, pretty)?;
                    Ok(result.valid)
                }
            }
        }
        Commands::Validate { query } => {
            let result = logchefql::validate(&read_query(query)?);
            write_json(out, &result, pretty)?;
            Ok(result.valid)
        }
        Commands::Detect { query } => {
            writeln!(out, "{}", detect_query_type(&read_query(query)?))?;
            Ok(true)
        }
        Commands::Fmt { query } => {
            let query = parse_query(&read_query(query)?)?;
            writeln!(out, "{query}")?;
            Ok(true)
        }
        Commands::Build(args) => {
            let built = build(args)?;
            writeln!(out, "{built}")?;
            Ok(true)
        }
    }
}

fn build(args: BuildArgs) -> Result<String> {
    let query = read_query(args.query)?;
    let built = match args.target.dialect {
        Dialect::Clickhouse => {
            let schema = load_schema(args.target.schema.as_deref())?;
            let table = args.table.context("--table is required for clickhouse")?;
            build_full_query(&SqlQueryParams {
                query: &query,
                schema: schema.as_ref(),
                table: &table,
                timestamp_field: &args.timestamp_field,
                start_time: &args.start,
                end_time: &args.end,
                timezone: &args.timezone,
                limit: args.limit,
                columns: None,
            })?
        }
        Dialect::Victorialogs => build_full_logsql_query(&LogsqlQueryParams {
            query: &query,
            start: parse_time_bound(&args.start)?,
            end: parse_time_bound(&args.end)?,
            limit: args.limit,
        })?,
    };
    Ok(built)
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays machine readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let mut stdout = std::io::stdout().lock();
    if run(cli, &mut stdout)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn run_args(args: &[&str]) -> (bool, String) {
        let cli = Cli::try_parse_from(args).unwrap();
        let mut out = Vec::new();
        let ok = run(cli, &mut out).unwrap();
        (ok, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_parse() {
        // Verify CLI can parse without arguments
        let cli = Cli::try_parse_from(["logchef"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_cli_translate_command() {
        let cli = Cli::try_parse_from(["logchef", "translate", "-d", "victorialogs", "a=1"]).unwrap();
        match cli.command {
            Some(Commands::Translate { query, target }) => {
                assert_eq!(query, "a=1");
                assert_eq!(target.dialect, Dialect::Victorialogs);
            }
            _ => panic!("expected translate"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_dialect() {
        assert!(Cli::try_parse_from(["logchef", "translate", "-d", "loki", "a=1"]).is_err());
    }

    #[test]
    fn test_build_clickhouse_requires_table() {
        let cli = Cli::try_parse_from([
            "logchef",
            "build",
            "a=1",
            "--start",
            "2025-01-01 00:00:00",
            "--end",
            "2025-01-01 01:00:00",
        ])
        .unwrap();
        let err = run(cli, &mut Vec::new()).unwrap_err();
        assert!(err.to_string().contains("--table"));
    }

    #[test]
    fn test_build_clickhouse() {
        let (ok, out) = run_args(&[
            "logchef",
            "build",
            "a=1",
            "--table",
            "logs",
            "--start",
            "2025-01-01 00:00:00",
            "--end",
            "2025-01-01 01:00:00",
            "--limit",
            "0",
        ]);
        assert!(ok);
        assert!(out.starts_with("SELECT *\nFROM logs\n"));
        assert!(out.contains("  AND (`a` = 1)\n"));
        assert!(out.ends_with("ORDER BY `timestamp` DESC\n"));
    }

    #[test]
    fn test_translate_outputs_json() {
        let (ok, out) = run_args(&["logchef", "translate", r#"level="error""#]);
        assert!(ok);
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["sql"], "`level` = 'error'");
    }

    #[test]
    fn test_validate_invalid_query_fails() {
        let (ok, out) = run_args(&["logchef", "validate", r#"a="1" b="2""#]);
        assert!(!ok);
        let json: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["error"]["code"], "MISSING_BOOLEAN_OPERATOR");
    }

    #[test]
    fn test_detect() {
        let (_, out) = run_args(&["logchef", "detect", "SELECT 1"]);
        assert_eq!(out, "sql\n");
    }

    #[test]
    fn test_fmt() {
        let (_, out) = run_args(&["logchef", "fmt", r#"(a = "1"  OR b=2)  and c~"x""#]);
        assert_eq!(out, "(a=\"1\" or b=2) and c~\"x\"\n");
    }

    #[test]
    fn test_build_victorialogs() {
        let (ok, out) = run_args(&[
            "logchef",
            "build",
            "-d",
            "victorialogs",
            "level=\"error\"",
            "--start",
            "2025-01-01 00:00:00",
            "--end",
            "2025-01-01T01:00:00Z",
            "--limit",
            "5",
        ]);
        assert!(ok);
        assert_eq!(
            out,
            "level:=error _time:[2025-01-01T00:00:00Z, 2025-01-01T01:00:00Z] \
             | sort by (_time desc) | limit 5\n"
        );
    }

    #[test]
    fn test_build_clickhouse_rejects_bad_table() {
        let cli = Cli::try_parse_from([
            "logchef",
            "build",
            "a=1",
            "--table",
            "logs;drop",
            "--start",
            "2025-01-01 00:00:00",
            "--end",
            "2025-01-01 01:00:00",
        ])
        .unwrap();
        assert!(run(cli, &mut Vec::new()).is_err());
    }
}
