use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use png_text::{PngFile, cli};

#[derive(Parser)]
#[command(name = "png-text")]
#[command(about = "Read and rewrite tEXt metadata in PNG files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the text metadata of a PNG file as key=value lines
    Read {
        /// Path to input PNG file
        input: PathBuf,
    },

    /// Replace the text metadata of a PNG file
    Write {
        /// Path to input PNG file
        input: PathBuf,

        /// Entry to store, may be repeated
        #[arg(
            short = 's',
            long = "set",
            value_name = "KEY=VALUE",
            value_parser = cli::parse_key_value,
            required = true
        )]
        entries: Vec<(String, String)>,

        /// Keep existing entries not named by --set
        #[arg(short, long)]
        merge: bool,

        /// Path for output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove all text metadata from a PNG file
    Clear {
        /// Path to input PNG file
        input: PathBuf,

        /// Path for output file (defaults to rewriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the chunks of a PNG file
    Chunks {
        /// Path to input PNG file
        input: PathBuf,
    },
}

fn load(path: &Path) -> anyhow::Result<PngFile> {
    PngFile::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
}

fn save(file: &PngFile, input: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let target = output.unwrap_or(input);
    file.write_to_file(target)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    println!("Wrote {} bytes to {}", file.as_bytes().len(), target.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    match args.command {
        Commands::Read { input } => {
            let file = load(&input)?;
            let extraction = file.extraction();

            for line in cli::format_skipped(&extraction) {
                eprintln!("{}", line);
            }
            for line in cli::format_metadata(&extraction.metadata) {
                println!("{}", line);
            }
        }

        Commands::Write { input, entries, merge, output } => {
            let mut file = load(&input)?;
            let metadata = cli::pairs_to_metadata(entries);

            if merge {
                file.merge_metadata(&metadata)?;
            } else {
                file.set_metadata(&metadata)?;
            }
            save(&file, &input, output.as_deref())?;
        }

        Commands::Clear { input, output } => {
            let mut file = load(&input)?;
            file.set_metadata(&Default::default())?;
            save(&file, &input, output.as_deref())?;
        }

        Commands::Chunks { input } => {
            let file = load(&input)?;
            for line in cli::describe_chunks(&file) {
                println!("{}", line);
            }
        }
    }

    Ok(())
}
