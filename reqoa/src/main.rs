use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use reqoa::{Direction, EncodeOptions};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "reqoa")]
#[command(version)]
#[command(about = "QOA audio format converter", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode audio file to QOA (lossy)
    Encode {
        /// Input audio file (wav, flac, mp3, ogg, etc.)
        input: PathBuf,
        /// Output QOA file
        output: PathBuf,
        /// Overwrite the output file
        #[arg(short, long)]
        force: bool,
    },
    /// Decode QOA file to WAV
    Decode {
        /// Input QOA file
        input: PathBuf,
        /// Output WAV file
        output: PathBuf,
        /// Overwrite the output file
        #[arg(short, long)]
        force: bool,
    },
    /// Show information about a QOA file and try decoding it
    Info {
        /// Input QOA file
        input: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a QOA file
    Validate {
        /// Input QOA file
        input: PathBuf,
    },
    /// Convert either way, QOA input decodes to WAV, anything else encodes
    Convert {
        input: PathBuf,
        output: PathBuf,
        /// Overwrite the output file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Encode {
            input,
            output,
            force,
        } => {
            encode(&input, &output, &EncodeOptions::new().with_force(force))?;
        }
        Commands::Decode {
            input,
            output,
            force,
        } => {
            decode(&input, &output, &EncodeOptions::new().with_force(force))?;
        }
        Commands::Info { input, json } => {
            info(&input, json)?;
        }
        Commands::Validate { input } => {
            validate(&input)?;
        }
        Commands::Convert {
            input,
            output,
            force,
        } => {
            convert(&input, &output, &EncodeOptions::new().with_force(force))?;
        }
    }

    Ok(())
}

fn encode(input: &Path, output: &Path, options: &EncodeOptions) -> Result<()> {
    println!(
        "Encoding {} to {} (lossy)...",
        input.display(),
        output.display()
    );

    let size = reqoa::encode_file(input, output, options).context("Failed to encode audio")?;

    println!("Done!");
    println!("  Output: {}", output.display());
    println!("  Size: {} bytes", size);

    Ok(())
}

fn decode(input: &Path, output: &Path, options: &EncodeOptions) -> Result<()> {
    println!("Decoding {} to {}...", input.display(), output.display());

    reqoa::decode_file(input, output, options).context("Failed to decode QOA file")?;

    println!("Done!");
    println!("  Output: {}", output.display());

    Ok(())
}

fn convert(input: &Path, output: &Path, options: &EncodeOptions) -> Result<()> {
    let direction = reqoa::convert_file(input, output, options)?;

    match direction {
        Direction::Decode => println!("Decoded QOA to WAV"),
        Direction::Encode => println!("Encoded to QOA (lossy)"),
    }
    println!("Wrote {}", output.display());

    Ok(())
}

fn read_input(input: &Path) -> Result<Vec<u8>> {
    if !input.is_file() {
        bail!("Input file {} does not exist", input.display());
    }
    fs::read(input).context("Failed to read QOA file")
}

fn info(input: &Path, json: bool) -> Result<()> {
    let qoa_data = read_input(input)?;

    let file_info = reqoa::get_qoa_info(&qoa_data)?;

    if json {
        let json_str =
            serde_json::to_string_pretty(&file_info).context("Failed to serialize info")?;
        println!("{}", json_str);
    } else {
        println!("QOA Audio File");
        println!("───────────────────────────────");
        println!("  {}", reqoa::describe(&file_info));
        println!("  Duration:    {:.2}s", file_info.duration_secs);
        println!("  Frames:      {}", file_info.frames);
        println!("  File size:   {} bytes", file_info.file_size);
        println!("  Compression: {:.1}x", file_info.compression_ratio);
        println!("  Bitrate:     {:.1} kbps", file_info.bitrate_kbps);
        println!();
        println!("Trying to decode the file...");
    }

    reqoa::decode_to_samples(&qoa_data).context("Decoding failed")?;

    if !json {
        println!("Decoding successful");
    }

    Ok(())
}

fn validate(input: &Path) -> Result<()> {
    let qoa_data = read_input(input)?;

    let is_valid =
        reqoa::validate_qoa(&qoa_data).map_err(|_| anyhow::anyhow!("Validation failed"))?;

    if is_valid {
        println!("✓ {} is a valid QOA file", input.display());
        Ok(())
    } else {
        bail!("✗ {} is not a valid QOA file", input.display())
    }
}
