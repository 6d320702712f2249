use anyhow::Result;

use quarry_reader::StorageKey;

pub fn run(index: String, ordinal: u32) -> Result<()> {
    if index.is_empty() {
        anyhow::bail!("Index name must not be empty");
    }
    println!("{}", StorageKey::for_document(&index, ordinal));
    Ok(())
}
