use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
    sync::mpsc,
};

use threadpool::ThreadPool;

pub use cli::CLIParser;
use error::Error;
pub use huffman::{build_tree, generate_codes, CodeTable, FrequencyTable, HuffmanTree};

mod cli;
pub mod error;
pub mod huffman;
mod logger;

pub type Result<T> = std::result::Result<T, error::Error>;

pub struct Arguments {
    input_file: PathBuf,
    output_file: Option<PathBuf>,
    block_size: usize,
    number_of_threads: usize,
    print_tree: bool,
}

/// Outcome of coding one independent block of the input.
#[derive(Debug)]
pub struct BlockReport {
    pub index: usize,
    pub length: usize,
    pub frequencies: FrequencyTable,
    pub codes: CodeTable,
    pub encoded_bits: usize,
    pub drawing: Option<String>,
}

fn read_input_file(file_path: &Path) -> Result<Vec<u8>> {
    fs::read(file_path).map_err(|e| {
        Error::UnableToOpenInputFileForReading(file_path.display().to_string(), e)
    })
}

fn open_output_file(file_path: &Path) -> Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .map_err(|e| {
            Error::UnableToOpenOutputFileForWriting(file_path.display().to_string(), e)
        })
}

fn split_into_blocks(data: Vec<u8>, block_size: usize) -> Vec<Vec<u8>> {
    if block_size == 0 || data.len() <= block_size {
        return vec![data];
    }
    data.chunks(block_size).map(<[u8]>::to_vec).collect()
}

pub fn code_block(index: usize, bytes: &[u8], draw_tree: bool) -> Result<BlockReport> {
    let frequencies = FrequencyTable::count(bytes);
    let tree = build_tree(&frequencies)?;
    let codes = generate_codes(&tree)?;
    let encoded_bits = codes.encoded_length(&frequencies)?;
    logger::log_code_table(index, &codes);
    Ok(BlockReport {
        index,
        length: bytes.len(),
        drawing: draw_tree.then(|| tree.to_string()),
        frequencies,
        codes,
        encoded_bits,
    })
}

fn code_blocks(blocks: Vec<Vec<u8>>, arguments: &Arguments) -> Result<Vec<BlockReport>> {
    let block_count = blocks.len();
    let threadpool = ThreadPool::new(arguments.number_of_threads.max(1));
    let (sender, receiver) = mpsc::channel();
    for (index, block) in blocks.into_iter().enumerate() {
        let sender = sender.clone();
        let draw_tree = arguments.print_tree;
        threadpool.execute(move || {
            // receiver is gone once another block failed
            let _ = sender.send((index, code_block(index, &block, draw_tree)));
        });
    }
    drop(sender);

    let mut reports: Vec<Option<BlockReport>> = (0..block_count).map(|_| None).collect();
    for (index, report) in receiver.iter().take(block_count) {
        match report {
            Ok(report) => reports[index] = Some(report),
            Err(error) => {
                log::warn!("block {} failed, waiting for remaining blocks", index);
                threadpool.join();
                return Err(error);
            }
        }
    }
    reports
        .into_iter()
        .map(|report| report.ok_or(Error::WorkerDisconnected))
        .collect()
}

pub fn write_report<W: Write>(reports: &[BlockReport], writer: &mut W) -> io::Result<()> {
    for report in reports {
        writeln!(
            writer,
            "block {}: {} bytes, {} symbols, {} bits encoded",
            report.index,
            report.length,
            report.codes.len(),
            report.encoded_bits
        )?;
        if let Some(drawing) = &report.drawing {
            write!(writer, "{}", drawing)?;
        }
        for entry in report.frequencies.iter() {
            let code = report.codes.get(entry.symbol).unwrap_or_default();
            writeln!(writer, "{}\t{}\t{}", entry.symbol, entry.frequency, code)?;
        }
    }
    writer.flush()
}

pub fn generate_code_tables(arguments: &Arguments) -> Result<()> {
    let data = read_input_file(&arguments.input_file)?;
    log::info!(
        "read {} bytes from {}",
        data.len(),
        arguments.input_file.display()
    );
    let blocks = split_into_blocks(data, arguments.block_size);
    log::info!(
        "coding {} blocks on {} threads",
        blocks.len(),
        arguments.number_of_threads
    );
    let reports = code_blocks(blocks, arguments)?;
    let written = match &arguments.output_file {
        Some(path) => {
            let mut writer = BufWriter::new(open_output_file(path)?);
            write_report(&reports, &mut writer)
        }
        None => write_report(&reports, &mut io::stdout().lock()),
    };
    written.map_err(Error::FailedToWriteReport)
}
