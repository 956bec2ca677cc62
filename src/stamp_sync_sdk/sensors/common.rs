use camino::Utf8Path;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::marker::PhantomData;

pub(crate) trait CsvSaveable {
    /// Header line, or `None` for headerless files.
    fn get_csv_headers() -> Option<&'static str>;
    fn to_csv_row(&self) -> String;
}

/// Streams rows of `T` into a freshly created CSV file. Every row handed to
/// [`CsvWriter::add`] reaches the disk, even if the caller bails out early.
pub(crate) struct CsvWriter<T> {
    writer: BufWriter<fs::File>,
    rows: usize,
    _phantom: PhantomData<T>,
}

impl<T> CsvWriter<T>
where
    T: CsvSaveable,
{
    pub fn create<P: AsRef<Utf8Path>>(path: P) -> io::Result<Self> {
        let file = fs::File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        if let Some(first_line) = T::get_csv_headers() {
            writeln!(writer, "{}", first_line)?;
        }
        Ok(Self {
            writer,
            rows: 0,
            _phantom: PhantomData,
        })
    }

    pub fn add(&mut self, entry: &T) -> io::Result<()> {
        writeln!(self.writer, "{}", entry.to_csv_row())?;
        self.rows += 1;
        Ok(())
    }

    /// Flushes the file and returns the number of rows written.
    pub fn finish(mut self) -> io::Result<usize> {
        self.writer.flush()?;
        Ok(self.rows)
    }
}

impl<T> Drop for CsvWriter<T> {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
