//! This is the main entry point for the FAT32 extraction tool.
//!
//! The program provides an interactive command-line interface over a FAT32 volume image.
//! Users can open an image, inspect its layout, extract files and quit the program.

use fat_extract::FATVol;
use fat_extract::commands::Command;
use fat_extract::filesystem::cluster_chain::ChainResolver;
use fat_extract::traits::LayoutDisplay;
use log::{error, warn};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Represents the runtime state of the program.
///
/// This struct keeps track of the currently opened image and its decoded volume.
struct RunState {
    /// The currently opened volume image and its decoded metadata.
    volume: Option<(File, FATVol)>,
    /// Enable the strict validation of the boot sector
    validation: bool,
    /// Directory extracted files are written to
    out_dir: PathBuf,
    /// Maximum length of a followed cluster chain
    chain_limit: Option<usize>,
}

fn main() {
    stderrlog::new()
        .module(module_path!())
        .module("fat_extract")
        .init()
        .unwrap();

    let mut run_state = RunState {
        volume: None,
        validation: true,
        out_dir: PathBuf::from("."),
        chain_limit: None,
    };

    loop {
        print!("> ");
        io::stdout().flush().unwrap();

        let mut s = String::new();
        match io::stdin().read_line(&mut s) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                error!("Failed to read command: {err}");
                break;
            }
        }

        match Command::from_string(&s) {
            Command::Open(path) => open_volume(&mut run_state, Path::new(&path)),
            Command::Quit => break,
            Command::Info => match &run_state.volume {
                Some((_, vol)) => print!("{}", vol.header()),
                None => warn!("Open a volume image first"),
            },
            Command::Print => match &run_state.volume {
                Some((_, vol)) => match vol.display_layout(3) {
                    Ok(layout) => print!("{layout}"),
                    Err(e) => error!("Print layout error: {e}"),
                },
                None => warn!("Open a volume image first"),
            },
            Command::Extract(path, dest) => extract_file(&mut run_state, &path, dest),
            Command::Out(dir) => run_state.out_dir = PathBuf::from(dir),
            Command::Limit(n) => {
                run_state.chain_limit = Some(n);
                if let Some((file, vol)) = run_state.volume.take() {
                    run_state.volume =
                        Some((file, vol.with_resolver(ChainResolver::with_max_len(n))));
                }
            }
            Command::Skip => run_state.validation = false,
            Command::Unknown(s) => error!("Unknown command: {s:?}"),
            Command::Invalid(s) => error!("{s}"),
            Command::Empty => {}
        }
    }
}

fn open_volume(run_state: &mut RunState, path: &Path) {
    let mut file = match File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("Can't open {}: {}", path.display(), e);
            return;
        }
    };

    match FATVol::open(&mut file, run_state.validation) {
        Ok(vol) => {
            let vol = match run_state.chain_limit {
                Some(n) => vol.with_resolver(ChainResolver::with_max_len(n)),
                None => vol,
            };
            run_state.volume = Some((file, vol));
        }
        Err(err) => error!("{err}"),
    }
}

fn extract_file(run_state: &mut RunState, path: &str, dest: Option<String>) {
    let (file, vol) = match &mut run_state.volume {
        Some((file, vol)) => (file, vol),
        None => {
            warn!("Open a volume image first");
            return;
        }
    };

    let record = match vol.find_file(file, path) {
        Ok(record) => record,
        Err(err) => {
            error!("{err}");
            return;
        }
    };

    let dest = match dest {
        Some(dest) => PathBuf::from(dest),
        None => run_state.out_dir.join(record.file_name()),
    };
    let out = match File::create(&dest) {
        Ok(out) => out,
        Err(e) => {
            error!("Can't create {}: {}", dest.display(), e);
            return;
        }
    };

    let mut sink = BufWriter::new(out);
    match vol
        .extract_record(file, &record, &mut sink)
        .and_then(|written| sink.flush().map(|_| written).map_err(Into::into))
    {
        Ok(written) => println!("Extracted {record} ({written} bytes) to {}", dest.display()),
        Err(err) => error!("Extraction failed: {err}"),
    }
}
