use serde::Serialize;

use crate::cmd::DownloadArgs;
use crate::exit::{device_error, io_error, CliResult, SUCCESS};
use crate::output::{print_raw, OutputFormat};

#[derive(Serialize)]
struct DownloadOutput {
    words_read: usize,
    saved_to: String,
}

pub fn run(args: DownloadArgs, format: OutputFormat) -> CliResult<i32> {
    let mut dev = args.link.open()?;
    let words = dev
        .sdram_read(args.count)
        .map_err(|err| device_error("sdram read", err))?;

    let mut bytes = Vec::with_capacity(words.len() * 2);
    for word in &words {
        bytes.extend_from_slice(&word.to_be_bytes());
    }

    match &args.out {
        Some(path) => {
            std::fs::write(path, &bytes).map_err(|err| io_error("write output file", err))?;
            let out = DownloadOutput {
                words_read: words.len(),
                saved_to: path.display().to_string(),
            };
            print_download(&out, format);
        }
        None => {
            // Without a destination file the samples themselves are the
            // output, regardless of the requested format.
            print_raw(&bytes);
        }
    }
    Ok(SUCCESS)
}

fn print_download(out: &DownloadOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Downloaded {} words to {}", out.words_read, out.saved_to);
        }
        OutputFormat::Raw => {
            println!("{}", out.words_read);
        }
    }
}
