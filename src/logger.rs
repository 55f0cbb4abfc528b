const LOG_CONFIG_FILE: &str = "log4rs.yaml";

#[ctor::ctor]
fn init() {
    if let Err(error) = log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
        eprintln!("Logging disabled, unable to load {}: {}", LOG_CONFIG_FILE, error);
    }
}

pub fn log_code_table(block_index: usize, codes: &crate::huffman::CodeTable) {
    let lengths: Vec<String> = codes
        .iter()
        .map(|(symbol, code)| format!("{:02X}:{}", symbol, code.len()))
        .collect();
    log::debug!("block {} code lengths {:?}", block_index, lengths);
}
