use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use clap::Parser;
use fixed_width::{
    CompiledLayout, DecodeOptions, EmptyCollection, EncodeOptions, Layout, LineEnding,
};
use serde::Serialize;
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "fwf", version, about = "Fixed-width file <-> JSON converter")]
struct Args {
    /// Layout file (JSON) describing the records.
    #[arg(short, long, value_name = "file")]
    layout: String,

    /// Input file path (.json to encode, anything else to decode). Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,

    /// Force encode mode (overrides auto-detection).
    #[arg(short = 'e', long, conflicts_with = "decode")]
    encode: bool,

    /// Force decode mode (overrides auto-detection).
    #[arg(short = 'd', long)]
    decode: bool,

    /// Separate encoded lines with CRLF instead of LF.
    #[arg(long)]
    crlf: bool,

    /// Treat a collection that matches no lines as absent instead of failing.
    #[arg(long)]
    allow_empty_collections: bool,

    /// Fail when lines remain after the root record.
    #[arg(long)]
    deny_trailing_lines: bool,

    /// JSON indentation when decoding; 0 prints compact JSON (default: 2).
    #[arg(long, value_name = "number", default_value_t = 2)]
    indent: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Encode,
    Decode,
}

#[derive(Debug)]
enum InputSource {
    Stdin,
    File(String),
}

fn main() {
    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let layout = Layout::from_reader(fs::File::open(&args.layout)?)?.compile()?;
    let (input_text, input_source) = read_input(args.input.as_deref())?;

    match resolve_mode(&args, &input_source) {
        Mode::Encode => run_encode(&args, &layout, &input_text, &input_source),
        Mode::Decode => run_decode(&args, &layout, &input_text, &input_source),
    }
}

fn run_encode(
    args: &Args,
    layout: &CompiledLayout,
    input: &str,
    input_source: &InputSource,
) -> Result<(), Box<dyn Error>> {
    let value: Value = serde_json::from_str(input)?;
    let line_ending = if args.crlf {
        LineEnding::CrLf
    } else {
        LineEnding::Lf
    };
    let options = EncodeOptions::new().with_line_ending(line_ending);
    let text = layout.encode(&value, &options)?;

    let output_target = OutputTarget::from_arg(args.output.as_deref());
    with_output_writer(output_target.path(), |writer| {
        writer.write_all(text.as_bytes())?;
        Ok(())
    })?;
    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Encode, input_source, path);
    }
    Ok(())
}

fn run_decode(
    args: &Args,
    layout: &CompiledLayout,
    input: &str,
    input_source: &InputSource,
) -> Result<(), Box<dyn Error>> {
    let empty_collection = if args.allow_empty_collections {
        EmptyCollection::Allow
    } else {
        EmptyCollection::Reject
    };
    let options = DecodeOptions::new()
        .with_empty_collection(empty_collection)
        .with_deny_trailing_lines(args.deny_trailing_lines);

    let value = layout.decode_str(input, &options)?;
    let output_target = OutputTarget::from_arg(args.output.as_deref());

    with_output_writer(output_target.path(), |writer| {
        write_json(writer, &value, args.indent)
    })?;
    if let OutputTarget::File(path) = &output_target {
        report_status(Mode::Decode, input_source, path);
    }
    Ok(())
}

fn resolve_mode(args: &Args, input_source: &InputSource) -> Mode {
    if args.encode {
        return Mode::Encode;
    }
    if args.decode {
        return Mode::Decode;
    }

    match input_source {
        InputSource::Stdin => Mode::Decode,
        InputSource::File(path) => {
            let is_json = Path::new(path)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
            if is_json {
                Mode::Encode
            } else {
                Mode::Decode
            }
        }
    }
}

fn read_input(input: Option<&str>) -> Result<(String, InputSource), Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok((buf, InputSource::Stdin))
        }
        Some(path) => {
            let buf = fs::read_to_string(path)?;
            Ok((buf, InputSource::File(path.to_string())))
        }
    }
}

#[derive(Clone, Debug)]
enum OutputTarget {
    Stdout,
    File(String),
}

impl OutputTarget {
    fn from_arg(output: Option<&str>) -> Self {
        match output {
            Some(path) if path != "-" => OutputTarget::File(path.to_string()),
            _ => OutputTarget::Stdout,
        }
    }

    fn path(&self) -> Option<&str> {
        match self {
            OutputTarget::Stdout => None,
            OutputTarget::File(path) => Some(path.as_str()),
        }
    }
}

fn with_output_writer<F>(path: Option<&str>, f: F) -> Result<(), Box<dyn Error>>
where
    F: FnOnce(&mut dyn Write) -> Result<(), Box<dyn Error>>,
{
    match path {
        Some(path) => {
            let mut file = fs::File::create(path)?;
            f(&mut file)
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            f(&mut handle)
        }
    }
}

fn write_json(writer: &mut dyn Write, value: &Value, indent: usize) -> Result<(), Box<dyn Error>> {
    if indent == 0 {
        serde_json::to_writer(writer, value)?;
        return Ok(());
    }

    let indent_bytes = vec![b' '; indent];
    let formatter = serde_json::ser::PrettyFormatter::with_indent(&indent_bytes);
    let mut serializer = serde_json::Serializer::with_formatter(writer, formatter);
    value.serialize(&mut serializer)?;
    Ok(())
}

fn report_status(mode: Mode, input_source: &InputSource, output_path: &str) {
    let input_label = match input_source {
        InputSource::Stdin => "stdin",
        InputSource::File(path) => path.as_str(),
    };
    let verb = match mode {
        Mode::Encode => "Encoded",
        Mode::Decode => "Decoded",
    };
    println!("✔ {verb} {input_label} → {output_path}");
}
