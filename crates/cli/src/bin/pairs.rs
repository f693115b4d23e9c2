use anyhow::Result;

fn main() -> Result<()> {
    pairs_cli::main_entry()
}
