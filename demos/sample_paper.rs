use std::error::Error;

use paper_builder::samples::{self, PaperVariant};

fn main() -> Result<(), Box<dyn Error>> {
    let document = samples::build(PaperVariant::Complete)?;
    let bytes = document.save("sample_paper.docx")?;
    println!("Generated sample_paper.docx ({} bytes)", bytes);
    println!("{}", document.summary());
    Ok(())
}
