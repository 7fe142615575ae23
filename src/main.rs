mod cli;
mod error;

use crate::cli::{Args, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use exn::ResultExt;
use folio_cache::DocumentCache;
use folio_config::Config;
use folio_source::source::HttpSource;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let filter = EnvFilter::builder().with_default_directive(args.log_level().into()).from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let source = HttpSource::new(&config.name, &config.index_url)
        .and_then(|source| source.with_user_agent(&config.user_agent))
        .and_then(|source| source.with_timeout(config.timeout()))
        .or_raise(|| ErrorKind::Source)?;
    let cache = DocumentCache::new(&config.name, Arc::new(source));
    cache.load_index().await.or_raise(|| ErrorKind::Index)?;

    let mut stdout = std::io::stdout();
    let written = match args.command {
        Command::List => cache
            .entries()
            .iter()
            .try_for_each(|entry| writeln!(stdout, "{}\t{}", entry.key, entry.title)),
        Command::Show { key } => {
            let content = cache.fetch_content(&key).await.or_raise(|| ErrorKind::Document(key.clone()))?;
            stdout.write_all(content.as_bytes())
        },
        Command::Prefetch => {
            let summary = cache.fetch_all_contents().await;
            writeln!(stdout, "attempted {}, fetched {}, failed {}", summary.attempted, summary.fetched, summary.failed)
        },
    };
    finish_output(written.and_then(|()| stdout.flush()))
}

/// A closed pipe (e.g. `folio list | head`) ends output early without an error.
fn finish_output(written: std::io::Result<()>) -> Result<()> {
    match written {
        Err(err) if err.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
        other => other.or_raise(|| ErrorKind::Output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Error as IoError;
    use std::io::ErrorKind as IoErrorKind;

    #[test]
    fn test_closed_pipe_is_not_an_error() {
        assert!(finish_output(Ok(())).is_ok());
        assert!(finish_output(Err(IoError::from(IoErrorKind::BrokenPipe))).is_ok());
    }

    #[test]
    fn test_other_write_failures_are_reported() {
        let err = finish_output(Err(IoError::other("disk full"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Output));
    }
}
