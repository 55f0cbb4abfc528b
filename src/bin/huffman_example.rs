use dmmt_huffman::error::Error;
use dmmt_huffman::{build_tree, generate_codes, FrequencyTable};

fn main() -> Result<(), Error> {
    // symbol-frequency pairs
    let syms_and_freqs: [(u8, usize); 4] = [(b'A', 5), (b'B', 1), (b'C', 6), (b'D', 3)];
    let frequencies = FrequencyTable::try_from(&syms_and_freqs[..])?;

    let tree = build_tree(&frequencies)?;
    println!("huffman tree\n{}", tree);

    let codes = generate_codes(&tree)?;
    for (symbol, code) in codes.iter() {
        println!("{} -> {}", symbol as char, code);
    }

    let sequence_to_encode = b"CAD BAD CAB".iter().copied().filter(|&s| s != b' ');
    let sequence_to_encode: Vec<u8> = sequence_to_encode.collect();
    let encoded = codes.encode(&sequence_to_encode)?;
    println!("encoded sequence\n{}", encoded);

    let decoded = tree.decode(&encoded)?;
    println!("decoded sequence\n{}", String::from_utf8_lossy(&decoded));
    Ok(())
}
