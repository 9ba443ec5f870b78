use clap::{Parser, Subcommand};
use filterkit::batch::{self, BatchJob};
use filterkit::catalog::FilterCatalog;
use filterkit::config::{self, EditorConfig};
use filterkit::imaging::{self, RustBackend};
use filterkit::output;
use filterkit::session::EditSession;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "filterkit")]
#[command(about = "Apply photo filters to images")]
#[command(long_about = "\
Apply photo filters to images

Every filter has a display name and a backend key. Commands take the key:

  filterkit filters                          # list filters and their keys
  filterkit apply cat.jpg --filter sepia     # one filter, one image
  filterkit edit cat.jpg --filter sepia --filter blur --undo 1 --export out/
  filterkit batch photos/ --filter grayscale --out bw/

Session outputs are written to the work directory ([output] work_dir,
default .filterkit/) as output_<millis>_<key>.<ext>. Exports are copied
as edited_<millis>.<ext>. Batch outputs mirror the input tree as
<stem>-<key>.<ext>.

Run 'filterkit gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List available filters
    Filters {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply one filter to one image
    Apply {
        image: PathBuf,
        /// Backend key of the filter (see `filterkit filters`)
        #[arg(short, long)]
        filter: String,
        /// Output directory (default: [output] work_dir)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply a chain of filters, optionally undo some, and export the result
    Edit {
        image: PathBuf,
        /// Backend keys, applied in order
        #[arg(short, long = "filter", required = true)]
        filters: Vec<String>,
        /// Number of filters to undo after applying
        #[arg(long, default_value_t = 0)]
        undo: usize,
        /// Copy the final image into this directory
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Apply one filter to every image under a directory
    Batch {
        input: PathBuf,
        /// Backend key of the filter (see `filterkit filters`)
        #[arg(short, long)]
        filter: String,
        /// Output directory; the input tree is mirrored here
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let load_config = || config::load_config(&cli.config);
    let catalog = FilterCatalog::standard();
    let backend = RustBackend::new();

    match cli.command {
        Command::Filters { json } => {
            if json {
                println!("{}", output::format_filter_json(&catalog)?);
            } else {
                output::print_filter_list(&catalog);
            }
        }
        Command::Apply { image, filter, out } => {
            let editor_config = load_config()?;
            let mut session = new_session(&catalog, &editor_config, out.as_deref());
            session.select(image)?;
            let record = session.apply(&backend, &filter)?;
            if let Some(descriptor) = record.applied_filter() {
                let dims = imaging::get_dimensions(&backend, record.local_path())?;
                println!("{}", output::format_applied(descriptor, record.local_path(), dims));
            }
        }
        Command::Edit {
            image,
            filters,
            undo,
            export,
        } => {
            let editor_config = load_config()?;
            let mut session = new_session(&catalog, &editor_config, None);
            session.select(image)?;
            for key in &filters {
                session.apply(&backend, key)?;
            }
            for _ in 0..undo {
                if !session.undo() {
                    log::warn!("nothing left to undo");
                    break;
                }
            }
            output::print_history(session.history(), editor_config.display.label);
            if let Some(dest) = export {
                let exported = session.export(&dest)?;
                println!("Exported \u{2192} {}", exported.display());
            }
        }
        Command::Batch { input, filter, out } => {
            let editor_config = load_config()?;
            let descriptor = catalog.find_by_key(&filter)?;
            init_thread_pool(&editor_config.processing);

            let job = BatchJob {
                input_dir: &input,
                output_dir: &out,
                params: editor_config.filter_params(),
                format: editor_config.output.format,
            };
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let summary = batch::run_batch(&backend, &catalog, &filter, &job, Some(tx))?;
            printer
                .join()
                .map_err(|_| "batch output thread panicked")?;

            println!();
            println!("{}", output::format_batch_summary(descriptor, &summary));
            if summary.failed > 0 {
                let total = summary.total();
                return Err(format!("{} of {} images failed", summary.failed, total).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn new_session<'c>(
    catalog: &'c FilterCatalog,
    editor_config: &EditorConfig,
    work_dir: Option<&Path>,
) -> EditSession<'c> {
    let work_dir = work_dir.unwrap_or(&editor_config.output.work_dir);
    EditSession::new(catalog, work_dir)
        .with_format(editor_config.output.format)
        .with_params(editor_config.filter_params())
}

/// Log to stderr as `[time LEVEL file line] message`.
///
/// `RUST_LOG` takes precedence; otherwise `info`, or `debug` with `-v`.
fn init_logger(verbose: bool) {
    use std::io::Write;

    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = chrono::Local::now().format("%H:%M:%S");

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("None")
                    .split('/')
                    .next_back()
                    .unwrap_or("None"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
