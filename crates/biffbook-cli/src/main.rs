//! biffbook CLI - inspect legacy .xls workbooks

use std::io::{self, BufWriter, Cursor, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use biffbook::{ReadOptions, Visibility, Workbook};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "biffbook")]
#[command(author, version, about = "Read BIFF5/BIFF8 (.xls) workbooks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Input .xls file
    input: PathBuf,

    /// Treat the input as a bare record stream instead of an OLE2 container
    #[arg(long)]
    raw: bool,

    /// Charset for text when the file has no usable codepage (e.g. koi8-r)
    #[arg(long)]
    charset: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        #[command(flatten)]
        source: Source,
    },

    /// Show information about a workbook
    Info {
        #[command(flatten)]
        source: Source,
    },

    /// Print every sheet's cells as delimited text
    Cells {
        #[command(flatten)]
        source: Source,

        /// Stop after this many rows in total
        #[arg(short = 'n', long, default_value = "10000")]
        max_rows: usize,

        /// Field delimiter
        #[arg(short, long, default_value = ",")]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { source } => list_sheets(&source),
        Commands::Info { source } => show_info(&source),
        Commands::Cells {
            source,
            max_rows,
            delimiter,
        } => print_cells(&source, max_rows, delimiter),
    }
}

fn open(source: &Source) -> Result<Workbook<Cursor<Vec<u8>>>> {
    let options = ReadOptions {
        charset: source.charset.clone(),
    };
    let input = &source.input;

    if source.raw {
        let data = std::fs::read(input)
            .with_context(|| format!("Failed to read '{}'", input.display()))?;
        return Ok(Workbook::from_stream(Cursor::new(data), &options));
    }
    Workbook::open(input, &options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn visibility_label(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Visible => "visible",
        Visibility::Hidden => "hidden",
        Visibility::VeryHidden => "very hidden",
    }
}

fn list_sheets(source: &Source) -> Result<()> {
    let workbook = open(source)?;

    for i in 0..workbook.sheet_count() {
        if let Some(info) = workbook.sheet_info(i) {
            println!("{}\t{}\t{}", i, info.name, visibility_label(info.visibility));
        }
    }

    Ok(())
}

fn show_info(source: &Source) -> Result<()> {
    let mut workbook = open(source)?;

    println!("File: {}", source.input.display());
    println!("Format: {:?}", workbook.revision());
    match workbook.codepage() {
        0 => println!("Codepage: none"),
        cp => println!("Codepage: {cp}"),
    }
    println!("Date mode: {:?}", workbook.date_mode());
    println!("Shared strings: {}", workbook.shared_strings().len());
    println!(
        "Fonts: {}, formats: {}, XFs: {}",
        workbook.fonts().len(),
        workbook.formats().len(),
        workbook.styles().len()
    );
    println!("Sheets: {}", workbook.sheet_count());

    for i in 0..workbook.sheet_count() {
        if let Some(sheet) = workbook.get_sheet(i) {
            println!();
            println!("  Sheet {}: \"{}\"", i, sheet.name());
            match (sheet.max_row(), sheet.max_col()) {
                (Some(row), Some(col)) => println!(
                    "    Used range: {} rows x {} columns, {} cells",
                    row + 1,
                    col + 1,
                    sheet.cell_count()
                ),
                _ => println!("    Used range: empty"),
            }
            if let Some(dims) = sheet.dimensions() {
                println!(
                    "    Declared: rows {}..{}, columns {}..{}",
                    dims.first_row, dims.last_row_plus1, dims.first_col, dims.last_col_plus1
                );
            }
        }
    }

    Ok(())
}

fn print_cells(source: &Source, max_rows: usize, delimiter: char) -> Result<()> {
    let mut workbook = open(source)?;
    let rows = workbook.read_all_cells(max_rows);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for row in &rows {
        let line: Vec<String> = row.iter().map(|text| quote(text, delimiter)).collect();
        writeln!(out, "{}", line.join(&delimiter.to_string()))
            .context("Failed to write to stdout")?;
    }
    out.flush().context("Failed to write to stdout")?;

    if rows.len() == max_rows {
        eprintln!("Stopped after {max_rows} rows");
    }
    Ok(())
}

/// Quote a field if it contains the delimiter, a quote or a line break
fn quote(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') || text.contains('\r')
    {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
