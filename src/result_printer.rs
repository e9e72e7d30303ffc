use crate::cli::Format;
use crate::job::ResultMap;

pub struct ResultPrinter {
    format: Format,
}

impl ResultPrinter {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    pub fn print(&self, results: &ResultMap) -> anyhow::Result<()> {
        println!("{}", self.render(results)?);
        Ok(())
    }

    pub fn render(&self, results: &ResultMap) -> serde_json::Result<String> {
        match self.format {
            Format::Pretty => serde_json::to_string_pretty(results),
            Format::Compact => serde_json::to_string(results),
        }
    }
}
