/// hufpix – lossless image compression tool.
///
///   hufpix encode image.raw              → compress to image.raw.hpx
///   hufpix encode image.raw -o out.hpx   → compress to a chosen path
///   hufpix decode image.raw.hpx          → restore image.raw
///   hufpix decode out.hpx -o image.raw   → restore to a chosen path
///
/// Inputs are treated as flat byte buffers (one row, one channel);
/// pixel-format decoding belongs to the tools that feed this one.
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{self, ExitCode};

use hufpix::container::{self, Geometry};
use hufpix::frequency::get_frequency;

fn usage() {
    eprintln!("hufpix - lossless image compression tool");
    eprintln!();
    eprintln!("Usage: hufpix <encode|decode> [OPTIONS] FILE");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output PATH  Write to PATH instead of the derived name");
    eprintln!("  -f, --force        Overwrite an existing output file");
    eprintln!("  -q, --quiet        Suppress warnings");
    eprintln!("  -v, --verbose      Report sizes, ratio, and entropy");
    eprintln!("  -h, --help         Show this help");
    eprintln!();
    eprintln!("Compressed files use the .hpx extension.");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
struct Opts {
    mode: Option<Mode>,
    input: Option<String>,
    output: Option<String>,
    force: bool,
    verbose: bool,
    quiet: bool,
}

fn parse_args() -> Opts {
    let args: Vec<String> = env::args().skip(1).collect();
    let mut opts = Opts {
        mode: None,
        input: None,
        output: None,
        force: false,
        verbose: false,
        quiet: false,
    };

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-f" | "--force" => opts.force = true,
            "-v" | "--verbose" => opts.verbose = true,
            "-q" | "--quiet" => opts.quiet = true,
            "-h" | "--help" => {
                usage();
                process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("hufpix: missing argument for -o");
                    process::exit(1);
                }
                opts.output = Some(args[i].clone());
            }
            // Handle combined short flags like -vf.
            s if s.starts_with('-') && !s.starts_with("--") && s.len() > 2 => {
                for ch in s[1..].chars() {
                    match ch {
                        'f' => opts.force = true,
                        'v' => opts.verbose = true,
                        'q' => opts.quiet = true,
                        _ => {
                            eprintln!("hufpix: unknown flag '-{ch}'");
                            process::exit(1);
                        }
                    }
                }
            }
            s if s.starts_with('-') && s.len() > 1 => {
                eprintln!("hufpix: unknown option '{s}'");
                process::exit(1);
            }
            _ => {
                if opts.mode.is_none() {
                    opts.mode = match arg.as_str() {
                        "encode" => Some(Mode::Encode),
                        "decode" => Some(Mode::Decode),
                        other => {
                            eprintln!("hufpix: unknown command '{other}'");
                            eprintln!("hufpix: expected 'encode' or 'decode'");
                            process::exit(1);
                        }
                    };
                } else if opts.input.is_none() {
                    opts.input = Some(arg.clone());
                } else {
                    eprintln!("hufpix: unexpected argument '{arg}'");
                    process::exit(1);
                }
            }
        }
        i += 1;
    }

    opts
}

/// Determine the output filename for encoding.
fn encode_output_path(input: &str) -> PathBuf {
    PathBuf::from(format!("{input}.hpx"))
}

/// Determine the output filename for decoding.
fn decode_output_path(input: &str) -> Option<PathBuf> {
    let path = Path::new(input);
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("hpx") => Some(path.with_extension("")),
        _ => None,
    }
}

fn check_overwrite(out_path: &Path, force: bool) -> Result<(), String> {
    if out_path.exists() && !force {
        return Err(format!(
            "{} already exists; use -f to overwrite",
            out_path.display()
        ));
    }
    Ok(())
}

fn process_encode(opts: &Opts, path: &str) -> Result<(), String> {
    if !opts.quiet && path.ends_with(".hpx") {
        eprintln!("hufpix: warning: {path} already has the .hpx suffix");
    }

    let data = fs::read(path).map_err(|e| format!("{path}: {e}"))?;
    if data.len() > u32::MAX as usize {
        return Err(format!("{path}: file too large for the container geometry"));
    }

    let stream = container::compress(&data, Geometry::flat(data.len() as u32))
        .map_err(|e| format!("{path}: {e}"))?;

    let out_path = match &opts.output {
        Some(out) => PathBuf::from(out),
        None => encode_output_path(path),
    };
    check_overwrite(&out_path, opts.force)?;
    fs::write(&out_path, &stream).map_err(|e| format!("{}: {e}", out_path.display()))?;

    if opts.verbose {
        let ratio = (stream.len() as f64 / data.len() as f64) * 100.0;
        let entropy = get_frequency(&data).entropy();
        eprintln!(
            "{path}: {ratio:.1}% ({} → {} bytes, entropy {entropy:.3} bits/symbol)",
            data.len(),
            stream.len(),
        );
    }

    Ok(())
}

fn process_decode(opts: &Opts, path: &str) -> Result<(), String> {
    let data = fs::read(path).map_err(|e| format!("{path}: {e}"))?;
    let (pixels, geometry) = container::decompress(&data).map_err(|e| format!("{path}: {e}"))?;

    let out_path = match &opts.output {
        Some(out) => PathBuf::from(out),
        None => decode_output_path(path)
            .ok_or_else(|| format!("{path}: unknown suffix; use -o to name the output"))?,
    };
    check_overwrite(&out_path, opts.force)?;
    fs::write(&out_path, &pixels).map_err(|e| format!("{}: {e}", out_path.display()))?;

    if opts.verbose {
        eprintln!(
            "{path}: {} → {} bytes ({}x{}x{})",
            data.len(),
            pixels.len(),
            geometry.width,
            geometry.height,
            geometry.channels,
        );
    }

    Ok(())
}

fn run() -> Result<(), ()> {
    let opts = parse_args();

    let mode = match opts.mode {
        Some(mode) => mode,
        None => {
            usage();
            return Err(());
        }
    };
    let input = match &opts.input {
        Some(input) => input.clone(),
        None => {
            eprintln!("hufpix: missing input file");
            return Err(());
        }
    };

    let result = match mode {
        Mode::Encode => process_encode(&opts, &input),
        Mode::Decode => process_decode(&opts, &input),
    };

    if let Err(e) = result {
        eprintln!("hufpix: {e}");
        return Err(());
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}
