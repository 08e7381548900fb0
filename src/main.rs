//! Command line entry point: translates an HTML document and prints it.

use std::cell::RefCell;
use std::error::Error;
use std::io::Write;
use std::path::{
    Path,
    PathBuf,
};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use dom_l10n::Localization;
use dom_l10n::config::ConfigManager;
use dom_l10n::dom::Document;
use dom_l10n::fetch::FsFetcher;
use tracing_subscriber::EnvFilter;

/// Translate an HTML document with its declared Fluent resources
#[derive(Parser, Debug)]
#[command(name = "dom-l10n", version)]
struct Args {
    /// HTML document to translate
    document: PathBuf,

    /// Requested languages, most preferred first
    languages: Vec<String>,

    /// Directory holding `.dom-l10n.json` (defaults to the document's directory)
    #[arg(long, env = "DOM_L10N_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

impl Args {
    /// Directory the document lives in.
    fn document_dir(&self) -> PathBuf {
        self.document.parent().map_or_else(PathBuf::new, Path::to_path_buf)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(writer)
        .init();

    let args = Args::parse();
    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(document = ?args.document, "{err}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the settings, translates the document and writes it to stdout.
async fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(args.config_dir.clone().unwrap_or_else(|| args.document_dir())))?;
    let settings = config_manager.get_settings();

    let source = tokio::fs::read_to_string(&args.document).await?;
    let doc = Rc::new(RefCell::new(Document::parse_html(&source)?));

    let root = config_manager.resource_root().unwrap_or_else(|| args.document_dir());
    let fetcher = FsFetcher::new(root, settings.fetch_timeout());

    let requested =
        if args.languages.is_empty() { settings.requested_languages.clone() } else { args.languages.clone() };

    let localization: Localization<FsFetcher> = Localization::new(Rc::clone(&doc), fetcher, settings);
    localization.start(&requested).await?;
    tracing::info!(
        languages = ?localization.languages().iter().map(ToString::to_string).collect::<Vec<_>>(),
        "Document translated"
    );

    let html = doc.borrow().to_html();
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{html}")?;
    stdout.flush()?;
    Ok(())
}
