use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use export_core::analyzer::Analyzer;
use export_core::raw::{load_docid_filter, RawDumper};
use export_core::reader::IndexReader;
use export_core::tfidf::DropThreshold;
use export_core::topics::{write_tokenized_topics, TopicFormat};
use export_core::vectors::VectorDumper;
use export_core::{FIELD_BODY, FIELD_ID};
use tracing_subscriber::{fmt, EnvFilter};

use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dumper")]
#[command(about = "Export raw documents, TF-IDF vectors and tokenized topics from an index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump stored raw documents as <doc> blocks
    RawDocs {
        /// Index directory
        #[arg(long)]
        index: PathBuf,
        /// Output file
        #[arg(long)]
        output: PathBuf,
        /// Stored field holding the document id
        #[arg(long, default_value = FIELD_ID)]
        docid_field: String,
        /// Keep only docids listed in the third column of this file
        #[arg(long)]
        filter: Option<PathBuf>,
        /// Replace HTML with its plain-text rendering
        #[arg(long, default_value_t = false)]
        strip_markup: bool,
    },
    /// Dump per-document TF-IDF vectors of the body field
    Tfidf {
        /// Index directory
        #[arg(long)]
        index: PathBuf,
        /// Output file
        #[arg(long)]
        output: PathBuf,
        /// Stored field holding the document id
        #[arg(long, default_value = FIELD_ID)]
        docid_field: String,
        /// Drop terms whose df is below this count
        #[arg(long, default_value_t = 0)]
        drop_df_by_num: u32,
        /// Drop terms whose df is below this ratio of non-empty documents (ignored when --drop-df-by-num is set)
        #[arg(long, default_value_t = 0.0)]
        drop_df_by_ratio: f32,
    },
    /// Analyze one field of each query topic
    Topics {
        /// Topic file
        #[arg(long)]
        input: PathBuf,
        /// Topic file format: trec, webxml or tsv
        #[arg(long)]
        topic_reader: TopicFormat,
        /// Output file
        #[arg(long)]
        output: PathBuf,
        /// Keep stopwords in the analyzed topics
        #[arg(long, default_value_t = false)]
        keep_stopwords: bool,
        /// Topic field to analyze (title, description, narrative)
        #[arg(long, default_value = "title")]
        topic_field: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::RawDocs { index, output, docid_field, filter, strip_markup } => {
            dump_raw(&index, &output, &docid_field, filter.as_deref(), strip_markup)
        }
        Commands::Tfidf { index, output, docid_field, drop_df_by_num, drop_df_by_ratio } => {
            dump_tfidf(&index, &output, &docid_field, drop_df_by_num, drop_df_by_ratio)
        }
        Commands::Topics { input, topic_reader, output, keep_stopwords, topic_field } => {
            tokenize_topics(&input, topic_reader, &output, keep_stopwords, &topic_field)
        }
    }
}

fn open_index(index: &Path) -> Result<IndexReader> {
    IndexReader::open(index).with_context(|| format!("opening index {}", index.display()))
}

fn create_output(output: &Path) -> Result<File> {
    File::create(output).with_context(|| format!("creating output {}", output.display()))
}

fn dump_raw(index: &Path, output: &Path, docid_field: &str, filter: Option<&Path>, strip: bool) -> Result<()> {
    let reader = open_index(index)?;
    let filter = filter
        .map(|p| load_docid_filter(p).with_context(|| format!("reading docid filter {}", p.display())))
        .transpose()?;
    let out = create_output(output)?;
    let stats = RawDumper::new(&reader).run(docid_field, out, filter.as_ref(), strip)?;
    tracing::info!(?stats, output = %output.display(), "raw documents written");
    Ok(())
}

fn dump_tfidf(index: &Path, output: &Path, docid_field: &str, by_num: u32, by_ratio: f32) -> Result<()> {
    let reader = open_index(index)?;
    let threshold = DropThreshold::resolve(by_num, by_ratio, reader.doc_count(FIELD_BODY))?;
    let out = create_output(output)?;
    let stats = VectorDumper::new(&reader).run(docid_field, out, threshold)?;
    tracing::info!(?stats, output = %output.display(), "tf-idf vectors written");
    Ok(())
}

fn tokenize_topics(input: &Path, format: TopicFormat, output: &Path, keep_stopwords: bool, field: &str) -> Result<()> {
    let topics = format.read(input).with_context(|| format!("reading topics {}", input.display()))?;
    let analyzer = Analyzer::new(keep_stopwords);
    let out = create_output(output)?;
    let written = write_tokenized_topics(&topics, &analyzer, out, field)?;
    tracing::info!(topics = written, output = %output.display(), "tokenized topics written");
    Ok(())
}
