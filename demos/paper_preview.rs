use std::error::Error;

use paper_builder::pdf::{self, PdfOptions};
use paper_builder::samples::{self, PaperVariant};

fn main() -> Result<(), Box<dyn Error>> {
    let document = samples::build(PaperVariant::Complete)?;
    let output = pdf::render(&document, PdfOptions::new())?;
    std::fs::write("paper_preview.pdf", &output.bytes)?;
    println!(
        "Generated paper_preview.pdf ({} bytes, {} pages)",
        output.bytes.len(),
        output.pages
    );
    for heading in output.headings.iter().filter(|heading| heading.level <= 1) {
        match heading.page {
            Some(page) => println!("  p.{:<3} {}", page, heading.text),
            None => println!("  p.?   {}", heading.text),
        }
    }
    Ok(())
}
