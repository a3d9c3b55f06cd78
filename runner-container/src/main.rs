use anyhow::{Context, Result};
use greeter_core::config::{CONFIG_PATH_ENV_VAR, GreeterConfig, load_config};
use greeter_core::errors::GreeterError;
use greeter_core::greet;
use greeter_core::record::{NameField, decode_record, encode_record};
use greeter_core::suite::Suite;
use greeter_core::telemetry::{InvocationMetrics, init_tracing};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{error, info, warn};

/// Entry point for running the greeter on container hosting services like
/// AWS EKS, ECS, etc.
///
/// What it does at a high-level:
///     Load config from `GREETER_CONFIG_PATH` or `GREETER_CONFIG`.
///     If a suite is configured, evaluate it and exit non-zero on any miss.
///     Otherwise read one JSON record per line from stdin until EOF and
///     write one compact greeting record per line to stdout. `output.pretty`
///     only applies to the suite report.
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::var(CONFIG_PATH_ENV_VAR).ok();
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    init_tracing(config.log_filter.as_deref());

    if let Some(suite_path) = &config.suite_path {
        return run_suite(suite_path, &config).await;
    }

    let mut metrics = InvocationMetrics::default();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    process_records(stdin, &mut stdout, &mut metrics)
        .await
        .context("Record stream failed")?;

    info!(
        invocations = metrics.invocations,
        defaulted_names = metrics.defaulted_names,
        skipped_records = metrics.skipped_records,
        "input exhausted, shutting down"
    );
    Ok(())
}

async fn run_suite(suite_path: &str, config: &GreeterConfig) -> Result<()> {
    let suite = Suite::from_file(suite_path)
        .with_context(|| format!("Failed to load suite {suite_path}"))?;
    info!(cases = suite.len(), path = suite_path, "running suite");

    let report = suite.run(greet);
    let rendered = if config.output.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    let mut stdout = tokio::io::stdout();
    stdout.write_all(rendered.as_bytes()).await?;
    stdout.write_all(b"\n").await?;
    stdout.flush().await?;

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} cases did not pass",
            report.failed() + report.errored(),
            report.cases.len()
        );
    }
    Ok(())
}

/// Greets every line of `reader` and writes the results to `writer`.
///
/// Blank lines are ignored. Lines that are not UTF-8 JSON objects are
/// skipped; IO failures end the stream.
pub async fn process_records<R, W>(
    mut reader: R,
    writer: &mut W,
    metrics: &mut InvocationMetrics,
) -> Result<(), GreeterError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;
        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match handle_line(&buf) {
            Ok((output, defaulted)) => {
                metrics.record_invocation(defaulted);
                writer.write_all(output.as_bytes()).await?;
                writer.write_all(b"\n").await?;
            }
            Err(e) if e.should_skip_record() => {
                warn!(line = line_no, error = %e, "skipping record");
                metrics.record_skip();
            }
            Err(e) => {
                error!(line = line_no, error = %e, "record failed");
                return Err(e);
            }
        }
    }

    writer.flush().await?;
    Ok(())
}

fn handle_line(line: &[u8]) -> Result<(String, bool), GreeterError> {
    let input = decode_record(line)?;
    let defaulted = NameField::from_record(&input).is_absent();
    let output = encode_record(&greet(&input), false)?;
    Ok((output, defaulted))
}
