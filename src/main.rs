use bidimark::cli::{decode_file, encode_file, extract_to_file, show_info, DecodeOptions, EncodeOptions};
use bidimark::{BidimarkError, CorrectionPolicy, EncoderConfig};
use clap::{ArgAction, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("BIDIMARK_VERSION");
const BUILD: &str = env!("BIDIMARK_BUILD");
const PROFILE: &str = env!("BIDIMARK_PROFILE");
const GIT_HASH: &str = env!("BIDIMARK_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "bidimark")]
#[command(author, about = "Hide bytes in text with invisible bidirectional marks", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Hide a payload in a text or HTML file
    #[command(alias = "e")]
    Encode {
        /// Carrier text file
        carrier: PathBuf,

        /// Output file
        output: PathBuf,

        /// Payload given as text
        #[arg(short, long, conflicts_with = "payload")]
        message: Option<String>,

        /// Payload read from a file
        #[arg(short, long)]
        payload: Option<PathBuf>,

        /// Direction correction policy (restore, single, none)
        #[arg(long, value_parser = parse_policy)]
        correction: Option<CorrectionPolicy>,

        /// Encoder configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Accepted for compatibility; files are always processed whole
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Recover a hidden payload
    #[command(alias = "d")]
    Decode {
        /// Text file holding a frame
        input: PathBuf,

        /// Write the payload here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Accepted for compatibility; files are always processed whole
        #[arg(long)]
        chunk_size: Option<usize>,
    },

    /// Show direction, structure and frame details of a file
    #[command(alias = "i")]
    Info {
        /// File to inspect
        file: PathBuf,

        /// Emit JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_policy(s: &str) -> Result<CorrectionPolicy, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> Result<(), BidimarkError> {
    match command {
        Commands::Encode {
            carrier,
            output,
            message,
            payload,
            correction,
            config,
            chunk_size,
        } => {
            let payload = match (message, payload) {
                (Some(message), _) => message.into_bytes(),
                (None, Some(path)) => std::fs::read(path)?,
                (None, None) => return Err(BidimarkError::MissingPayload),
            };

            let mut config = match config {
                Some(path) => EncoderConfig::load(&path)?,
                None => EncoderConfig::default(),
            };
            if let Some(correction) = correction {
                config.correction = correction;
            }

            let options = EncodeOptions { config, chunk_size };
            let encoded = encode_file(&carrier, &output, &payload, &options)?;
            println!(
                "Embedded {} bytes into {} ({} -> {}, {} correction marks)",
                payload.len(),
                output.display(),
                encoded.original,
                encoded.direction,
                encoded.correction_marks
            );
            Ok(())
        }

        Commands::Decode {
            input,
            output,
            chunk_size,
        } => {
            let options = DecodeOptions { chunk_size };
            match output {
                Some(output) => {
                    let size = extract_to_file(&input, &output, &options)?;
                    println!("Extracted {} bytes to {}", size, output.display());
                }
                None => {
                    let decoded = decode_file(&input, &options)?;
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(&decoded.payload)?;
                    stdout.flush()?;
                }
            }
            Ok(())
        }

        Commands::Info { file, json } => {
            print!("{}", show_info(&file, json)?);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.version {
        println!("bidimark {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            let _ = Cli::command().print_help();
            println!();
            return ExitCode::SUCCESS;
        }
    };

    match run(command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
