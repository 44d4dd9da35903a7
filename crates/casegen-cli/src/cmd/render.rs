use crate::output::print_json;
use anyhow::Context;
use casegen_core::render::extract_code_blocks;
use std::io::Read;
use std::path::Path;

pub fn run(file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let blocks = extract_code_blocks(&text);
    if json {
        return print_json(&blocks);
    }
    if blocks.is_empty() {
        println!("No code blocks found.");
        return Ok(());
    }
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("--- {} ---", block.language);
        println!("{}", block.code);
    }
    Ok(())
}
