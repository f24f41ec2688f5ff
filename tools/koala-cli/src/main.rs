mod report;

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use koala_analyzer::{Analyze, Pipeline, TaggedTextAnalyzer};
use koala_model::Sentence;
use koala_protocol::NativeDocument;
use rkyv::ser::{serializers::AllocSerializer, Serializer};
use rkyv::AlignedVec;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about = "Inspects and compiles Korean annotation documents")]
struct Cli {
    /// Log reconstruction details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuilds every sentence of a document and prints its layers
    Inspect {
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Read an rkyv archive instead of JSON
        #[arg(long)]
        archive: bool,
    },

    /// Validates a JSON document and writes it as an rkyv archive
    Compile {
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },

    /// Converts pre-tagged text (`surface/TAG+...`, one sentence per line) to JSON
    Tag {
        /// Input file, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_json(path: &Path) -> anyhow::Result<NativeDocument> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn read_archive(path: &Path) -> anyhow::Result<NativeDocument> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(&bytes);

    rkyv::from_bytes::<NativeDocument>(&aligned).map_err(|e| anyhow!("invalid archive {}: {}", path.display(), e))
}

fn reconstruct(document: &NativeDocument) -> anyhow::Result<Vec<Sentence>> {
    document
        .sentences
        .iter()
        .enumerate()
        .map(|(i, native)| Sentence::from_native(native).with_context(|| format!("sentence #{}", i + 1)))
        .collect()
}

fn archive(document: &NativeDocument) -> anyhow::Result<AlignedVec> {
    let mut serializer = AllocSerializer::<256>::default();
    serializer
        .serialize_value(document)
        .map_err(|e| anyhow!("archive serialization failed: {:?}", e))?;
    Ok(serializer.into_serializer().into_inner())
}

fn read_text(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(input).with_context(|| format!("reading {}", input))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Inspect { input, archive } => {
            // 1. Load the wire form
            let document = if archive {
                read_archive(&input)?
            } else {
                read_json(&input)?
            };
            debug!(sentences = document.sentences.len(), "document loaded");

            // 2. Rebuild and print
            for (i, sentence) in reconstruct(&document)?.iter().enumerate() {
                println!("{}", report::render_sentence(i, sentence));
            }
        }
        Command::Compile { input, output } => {
            let document = read_json(&input)?;

            // Reject documents the model would refuse before archiving them
            let sentences = reconstruct(&document)?;
            info!(sentences = sentences.len(), "document validated");

            let bytes = archive(&document)?;
            fs::write(&output, &bytes).with_context(|| format!("writing {}", output.display()))?;
            info!(bytes = bytes.len(), output = %output.display(), "archive written");
        }
        Command::Tag { input } => {
            let text = read_text(&input)?;

            // Round-trip through the model so bad tags fail here, not downstream
            let sentences = Pipeline::new(TaggedTextAnalyzer).analyze(&text)?;
            let document = NativeDocument {
                sentences: sentences.iter().map(Sentence::to_native).collect::<Result<_, _>>()?,
            };
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(())
}
