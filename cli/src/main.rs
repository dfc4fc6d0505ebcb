//! docsplit CLI - document sectioning and chunking tool

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

use docsplit::{
    chunk_result, render_pages, sniff_path, Chunk, Config, PageSelection, Pipeline, ProcessResult,
    Settings,
};

#[derive(Parser)]
#[command(name = "docsplit")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Split DOCX and PDF documents into sections and chunks", long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE", env = "DOCSPLIT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the file type from its leading bytes
    Sniff {
        /// Input files
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Print the sections of a document as JSON
    Sections {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Document id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print the chunks of a document as JSON
    Chunks {
        /// Input document
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Document id (defaults to the file stem)
        #[arg(long)]
        id: Option<String>,

        /// Maximum characters per chunk (0 = one chunk per section)
        #[arg(long)]
        max_chars: Option<usize>,

        /// Characters shared between consecutive chunks
        #[arg(long)]
        overlap: Option<usize>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Render PDF pages to PNG images
    Render {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Resolution in dots per inch
        #[arg(long)]
        dpi: Option<u32>,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,
    },

    /// Process many documents in parallel, one JSON file per document
    Batch {
        /// Input documents
        #[arg(value_name = "FILE", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "docsplit_output")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = load_settings(cli.config.as_deref()).and_then(|settings| match cli.command {
        Commands::Sniff { inputs } => cmd_sniff(&inputs),
        Commands::Sections {
            input,
            id,
            output,
            compact,
        } => cmd_sections(&input, id, output.as_deref(), compact),
        Commands::Chunks {
            input,
            id,
            max_chars,
            overlap,
            output,
            compact,
        } => {
            let mut options = settings.chunk;
            if let Some(max) = max_chars {
                options = options.with_max_chars(max);
            }
            if let Some(overlap) = overlap {
                options = options.with_overlap(overlap);
            }
            cmd_chunks(&input, id, &Settings { chunk: options, ..settings }, output.as_deref(), compact)
        }
        Commands::Render {
            input,
            output,
            dpi,
            pages,
        } => cmd_render(&input, output.as_deref(), dpi, pages.as_deref(), settings),
        Commands::Batch { inputs, output } => cmd_batch(&inputs, &output, &settings),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    });

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn load_settings(path: Option<&Path>) -> CliResult<Settings> {
    let config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::empty(),
    };
    Ok(config.settings())
}

fn document_id(input: &Path, id: Option<String>) -> String {
    id.unwrap_or_else(|| {
        input
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned()
    })
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>, compact: bool) -> CliResult<()> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", json);
    }
    Ok(())
}

fn cmd_sniff(inputs: &[PathBuf]) -> CliResult<()> {
    for input in inputs {
        let info = sniff_path(input);
        let mime = if info.is_unknown() {
            info.mime.dimmed()
        } else {
            info.mime.green()
        };
        let ext = if info.ext.is_empty() { "-" } else { info.ext.as_str() };
        println!("{}  {}  {}", input.display(), ext.bold(), mime);
    }
    Ok(())
}

fn cmd_sections(
    input: &Path,
    id: Option<String>,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let result = Pipeline::new().process_file(&document_id(input, id), input)?;
    if let Some(note) = result.note() {
        eprintln!("{} {}", "Note:".yellow(), note);
    }
    write_json(&result, output, compact)
}

fn cmd_chunks(
    input: &Path,
    id: Option<String>,
    settings: &Settings,
    output: Option<&Path>,
    compact: bool,
) -> CliResult<()> {
    let result = Pipeline::new().process_file(&document_id(input, id), input)?;
    if let Some(note) = result.note() {
        eprintln!("{} {}", "Note:".yellow(), note);
    }
    let chunks = chunk_result(&result, &settings.chunk);
    write_json(&chunks, output, compact)
}

fn cmd_render(
    input: &Path,
    output: Option<&Path>,
    dpi: Option<u32>,
    pages: Option<&str>,
    settings: Settings,
) -> CliResult<()> {
    let page_selection = if let Some(p) = pages {
        PageSelection::parse(p).map_err(|e| format!("Invalid page range: {}", e))?
    } else {
        PageSelection::All
    };

    let mut options = settings.render.with_pages(page_selection);
    if let Some(dpi) = dpi {
        options = options.with_dpi(dpi);
    }

    let output_dir = output
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    fs::create_dir_all(&output_dir)?;

    let stem = document_id(input, None);
    let rendered = render_pages(input, &options)?;
    for page in &rendered {
        let filename = page.file_name(&stem);
        fs::write(output_dir.join(&filename), &page.image_bytes)?;
        println!(
            "{} {} ({}x{})",
            "Rendered".green(),
            filename,
            page.width,
            page.height
        );
    }

    println!(
        "\n{} {} pages rendered at {} dpi",
        "Done!".green().bold(),
        rendered.len(),
        options.dpi
    );
    Ok(())
}

/// Per-document batch output.
#[derive(Serialize)]
struct DocumentOutput<'a> {
    #[serde(flatten)]
    result: &'a ProcessResult,
    chunks: Vec<Chunk>,
}

fn cmd_batch(inputs: &[PathBuf], output_dir: &Path, settings: &Settings) -> CliResult<()> {
    fs::create_dir_all(output_dir)?;

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let pipeline = Pipeline::new();
    let keys = batch_keys(inputs);
    let outcomes: Vec<(PathBuf, Result<usize, String>)> = inputs
        .par_iter()
        .zip(keys.par_iter())
        .map(|(input, id)| {
            let outcome = pipeline
                .process_file(id, input)
                .map_err(|e| e.to_string())
                .and_then(|result| {
                    let chunks = chunk_result(&result, &settings.chunk);
                    let count = chunks.len();
                    let doc = DocumentOutput {
                        result: &result,
                        chunks,
                    };
                    let json = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
                    fs::write(output_dir.join(format!("{}.json", id)), json)
                        .map_err(|e| e.to_string())?;
                    Ok(count)
                });
            pb.inc(1);
            (input.clone(), outcome)
        })
        .collect();

    pb.finish_with_message("Done!");

    let mut failed = 0;
    println!("\n{}", "Results:".green().bold());
    for (input, outcome) in &outcomes {
        match outcome {
            Ok(count) => println!("  {} {} ({} chunks)", "ok".green(), input.display(), count),
            Err(e) => {
                failed += 1;
                println!("  {} {}: {}", "failed".red(), input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} documents failed", failed, outcomes.len()).into());
    }
    Ok(())
}

/// One document id per batch input, also naming its output file.
///
/// Ids are full file names; a repeated name gets a `-2`, `-3`, ... suffix
/// so no two inputs write the same output.
fn batch_keys(inputs: &[PathBuf]) -> Vec<String> {
    let mut taken: HashSet<String> = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let name = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "document".to_string());
            let mut key = name.clone();
            let mut n = 1;
            while !taken.insert(key.clone()) {
                n += 1;
                key = format!("{}-{}", name, n);
            }
            key
        })
        .collect()
}

fn cmd_version() {
    println!("{} {}", "docsplit".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document sectioning and chunking tool");
    println!();
    println!("Repository: {}", "https://github.com/iyulab/docsplit".dimmed());
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_keys_are_unique() {
        let inputs = vec![
            PathBuf::from("a/report.pdf"),
            PathBuf::from("a/report.docx"),
            PathBuf::from("b/report.pdf"),
            PathBuf::from("report.pdf-2"),
            PathBuf::from("c/report.pdf"),
        ];
        assert_eq!(
            batch_keys(&inputs),
            vec!["report.pdf", "report.docx", "report.pdf-2", "report.pdf-2-2", "report.pdf-3"]
        );
    }

    #[test]
    fn test_batch_inputs_sharing_a_stem_keep_their_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let (a, b) = (dir.path().join("a"), dir.path().join("b"));
        fs::create_dir_all(&a).unwrap();
        fs::create_dir_all(&b).unwrap();

        let inputs = vec![a.join("notes.txt"), a.join("notes.md"), b.join("notes.txt")];
        for input in &inputs {
            fs::write(input, "plain text").unwrap();
        }

        let out = dir.path().join("out");
        cmd_batch(&inputs, &out, &Settings::default()).unwrap();

        let mut written: Vec<String> = fs::read_dir(&out)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        written.sort();
        assert_eq!(written, vec!["notes.md.json", "notes.txt-2.json", "notes.txt.json"]);

        let second: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("notes.txt-2.json")).unwrap()).unwrap();
        assert_eq!(second["document_id"], "notes.txt-2");
        assert!(second["meta"]["path"].as_str().unwrap().ends_with("b/notes.txt"));
    }
}
