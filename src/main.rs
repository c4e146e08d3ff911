//! Command line entry point injecting resource hints into a generated HTML file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use preload_hints::{
  Compilation, DocumentPayload, HtmlHost, PreloadConfig, PreloadError, PreloadPlugin,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inject preload/prefetch hints for build outputs into an HTML document.
#[derive(Debug, Parser)]
#[command(name = "preload-hints", version, about)]
struct Cli {
  /// Compilation description (chunks, chunk groups, assets, publicPath) as JSON.
  #[arg(long)]
  compilation: PathBuf,

  /// HTML document to augment.
  #[arg(long)]
  html: PathBuf,

  /// Plugin configuration file (JSON or YAML). Discovered next to the HTML file when omitted.
  #[arg(long)]
  config: Option<PathBuf>,

  /// Chunk names the document was generated for. Repeat for several chunks.
  #[arg(long = "chunk")]
  chunks: Vec<String>,

  /// Output name used for `excludeHtmlNames`. Defaults to the HTML file name.
  #[arg(long)]
  name: Option<String>,

  /// Where to write the result. Prints to stdout when omitted.
  #[arg(long)]
  output: Option<PathBuf>,
}

/// Host for command line runs: markup processing only, errors collected for the exit status.
#[derive(Default)]
struct CliHost {
  errors: Vec<PreloadError>,
}

impl HtmlHost for CliHost {
  fn has_tag_groups_hook(&self) -> bool {
    false
  }

  fn has_html_processing_hook(&self) -> bool {
    true
  }

  fn report_error(&mut self, error: PreloadError) {
    self.errors.push(error);
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
  let config = match &cli.config {
    Some(path) => PreloadConfig::from_path(path)?,
    None => PreloadConfig::discover(cli.html.parent().unwrap_or_else(|| Path::new("."))),
  };
  let plugin = PreloadPlugin::from_config(&config).context("invalid preload configuration")?;

  let compilation_text = fs::read_to_string(&cli.compilation)
    .with_context(|| format!("failed to read {}", cli.compilation.display()))?;
  let compilation: Compilation = serde_json::from_str(&compilation_text)
    .with_context(|| format!("failed to parse {}", cli.compilation.display()))?;

  let html = fs::read_to_string(&cli.html)
    .with_context(|| format!("failed to read {}", cli.html.display()))?;
  let output_name = match cli.name {
    Some(name) => name,
    None => cli
      .html
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .ok_or_else(|| anyhow!("{} has no file name", cli.html.display()))?,
  };

  let mut host = CliHost::default();
  let Some(style) = plugin.bind(&mut host) else {
    return Err(collect_errors(host.errors));
  };

  let payload = DocumentPayload {
    output_name,
    html,
    chunk_names: cli.chunks,
    head_tags: Vec::new(),
  };
  let result = plugin.handle(style, &compilation, payload, &mut host);
  if !host.errors.is_empty() {
    return Err(collect_errors(host.errors));
  }

  match &cli.output {
    Some(path) => {
      fs::write(path, &result.html).with_context(|| format!("failed to write {}", path.display()))?;
      info!("wrote {}", path.display());
    }
    None => print!("{}", result.html),
  }

  Ok(())
}

fn collect_errors(errors: Vec<PreloadError>) -> anyhow::Error {
  let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
  anyhow!("preload hints failed: {}", messages.join("; "))
}
