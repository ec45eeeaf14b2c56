use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one JSON document per line.
pub struct JsonLinesWriter<W: Write> {
    out: W,
    lines: usize,
}

impl JsonLinesWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> JsonLinesWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, lines: 0 }
    }

    pub fn write<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value).context("Failed to serialize frame")?;
        self.out.write_all(b"\n").context("Failed to write frame")?;
        self.lines += 1;
        Ok(())
    }

    /// Frames without data are written as `null`.
    pub fn write_optional<T: Serialize>(&mut self, value: Option<&T>) -> Result<()> {
        self.write(&value)
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn finish(mut self) -> Result<W> {
        self.out.flush().context("Failed to flush output")?;
        log::info!("Wrote {} JSON lines", self.lines);
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::{Bar, FeatureRecord};
    use crate::pipeline::color::Rgb;

    #[test]
    fn writes_one_record_per_line() {
        let mut writer = JsonLinesWriter::new(Vec::new());
        let record = FeatureRecord {
            volume: 0.25,
            volume_ratio: 1.0,
            frequency_data: None,
            bars: Some(vec![Bar {
                amplitude: 12.5,
                color: Rgb::new(0x56, 0x30, 0xff),
            }]),
        };
        writer.write(&record).unwrap();
        writer.write_optional::<FeatureRecord>(None).unwrap();
        assert_eq!(writer.lines(), 2);

        let bytes = writer.finish().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            r##"{"volume":0.25,"volume_ratio":1.0,"bars":[{"amplitude":12.5,"color":"#5630ff"}]}"##
        );
        assert_eq!(lines[1], "null");
    }
}
