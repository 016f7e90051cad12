use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, LevelFilter};
use paper_builder::fonts::FontConfig;
use paper_builder::pdf::{self, PdfOptions};
use paper_builder::samples::{self, PaperVariant};
use paper_builder::Document;

const DEFAULT_OUTPUT: &str = "paper.docx";
const DEFAULT_PREVIEW: &str = "paper_preview.pdf";

/// Builds the sample papers as `.docx` files.
///
/// Without a subcommand the complete paper is written to `paper.docx`.
#[derive(Parser, Debug)]
#[command(author, version, about = "Assemble academic papers as Word documents")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Headings, paragraphs and references only.
    Draft {
        /// Destination file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// The draft plus equations and a results table.
    Enhanced {
        /// Destination file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Every block kind, including diagrams and page breaks.
    Complete {
        /// Destination file.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write all three variants into one directory.
    #[command(name = "run-all", aliases = ["run_all", "all"])]
    RunAll {
        /// Directory receiving the files; created when missing.
        #[arg(long, default_value = "target/papers")]
        out_dir: PathBuf,
    },

    /// Render a PDF preview of a sample paper.
    Preview {
        /// Which sample paper to render.
        #[arg(long, value_enum, default_value_t = Variant::Complete)]
        variant: Variant,

        /// Destination file.
        #[arg(short, long, default_value = DEFAULT_PREVIEW)]
        output: PathBuf,

        /// Directory searched first for the TrueType fonts.
        #[arg(long)]
        fonts_dir: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Variant {
    Draft,
    Enhanced,
    Complete,
}

impl From<Variant> for PaperVariant {
    fn from(variant: Variant) -> Self {
        match variant {
            Variant::Draft => PaperVariant::Draft,
            Variant::Enhanced => PaperVariant::Enhanced,
            Variant::Complete => PaperVariant::Complete,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = LevelFilter::from_str(&cli.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using 'warn' instead.", cli.log_level);
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();
    debug!("parsed arguments: {:?}", cli);

    if let Err(err) = run(cli.command) {
        eprintln!("Error: {}", err);
        print_error_sources(&err);
        process::exit(1);
    }
}

fn run(command: Option<Commands>) -> paper_builder::Result<()> {
    match command {
        None => write_variant(PaperVariant::Complete, Path::new(DEFAULT_OUTPUT)),
        Some(Commands::Draft { output }) => write_default(PaperVariant::Draft, output),
        Some(Commands::Enhanced { output }) => write_default(PaperVariant::Enhanced, output),
        Some(Commands::Complete { output }) => write_default(PaperVariant::Complete, output),
        Some(Commands::RunAll { out_dir }) => {
            fs::create_dir_all(&out_dir)
                .map_err(|source| paper_builder::Error::io(&out_dir, source))?;
            for variant in PaperVariant::ALL {
                write_variant(variant, &out_dir.join(variant.file_name()))?;
            }
            Ok(())
        }
        Some(Commands::Preview {
            variant,
            output,
            fonts_dir,
        }) => {
            let document = samples::build(variant.into())?;
            let mut fonts = FontConfig::new();
            if let Some(directory) = fonts_dir {
                fonts = fonts.with_directory(directory);
            }
            let bytes = pdf::save(&document, PdfOptions::new().with_fonts(fonts), &output)?;
            print_manifest(&output, bytes, &document);
            Ok(())
        }
    }
}

fn write_default(variant: PaperVariant, output: Option<PathBuf>) -> paper_builder::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(variant.file_name()));
    write_variant(variant, &path)
}

fn write_variant(variant: PaperVariant, path: &Path) -> paper_builder::Result<()> {
    info!("building {} paper", variant);
    let document = samples::build(variant)?;
    let bytes = document.save(path)?;
    print_manifest(path, bytes, &document);
    Ok(())
}

fn print_manifest(path: &Path, bytes: u64, document: &Document) {
    println!("Generated {} ({} bytes)", path.display(), bytes);
    println!("{}", document.summary());
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
