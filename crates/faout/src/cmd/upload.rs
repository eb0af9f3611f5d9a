use faout_proto::decode_words;
use serde::Serialize;

use crate::cmd::UploadArgs;
use crate::exit::{device_error, io_error, proto_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct UploadOutput {
    words_written: usize,
    read_ptr: u32,
    write_ptr: u32,
    free_space: u32,
}

pub fn run(args: UploadArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes =
        std::fs::read(&args.file).map_err(|err| io_error("read sample file", err))?;
    let words = decode_words(&bytes).map_err(|err| proto_error("decode sample file", err))?;

    let mut dev = args.link.open()?;
    dev.sdram_write(&words)
        .map_err(|err| device_error("sdram write", err))?;

    let ptrs = dev
        .sdram_pointers()
        .map_err(|err| device_error("query pointers", err))?;

    let out = UploadOutput {
        words_written: words.len(),
        read_ptr: ptrs.read_ptr,
        write_ptr: ptrs.write_ptr,
        free_space: ptrs.free_space(),
    };
    print_upload(&out, format);
    Ok(SUCCESS)
}

fn print_upload(out: &UploadOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("Uploaded {} words", out.words_written);
            println!(
                "  Pointers:   read={} write={}",
                out.read_ptr, out.write_ptr
            );
            println!("  Free space: {} words", out.free_space);
        }
        OutputFormat::Raw => {
            println!("{}", out.words_written);
        }
    }
}
