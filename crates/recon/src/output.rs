use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ReconError, Result};
use crate::model::Table;

/// Where a reconciled table is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    /// `None` and `-` mean standard output.
    pub fn from_option(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p.as_os_str() != "-" => Self::File(p.to_path_buf()),
            _ => Self::Stdout,
        }
    }

    fn label(&self) -> PathBuf {
        match self {
            Self::Stdout => PathBuf::from("<stdout>"),
            Self::File(path) => path.clone(),
        }
    }
}

/// Write `table` as CSV and flush. Rows may be ragged.
pub fn write_table<W: Write>(table: &Table, writer: W) -> std::result::Result<(), csv::Error> {
    let mut out = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    out.write_record(&table.header)?;
    for row in &table.rows {
        out.write_record(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Write a fully built table to its destination. Nothing is written until the
/// table is complete, so a failed reconciliation never leaves a partial file.
pub fn write_to(table: &Table, destination: &Destination) -> Result<()> {
    info!(destination = %destination.label().display(), rows = table.len(), "saving results");

    let to_io = |e: csv::Error| match e.into_kind() {
        csv::ErrorKind::Io(io_err) => ReconError::io(destination.label(), io_err),
        other => ReconError::io(destination.label(), io::Error::other(format!("{other:?}"))),
    };

    match destination {
        Destination::Stdout => match write_table(table, io::stdout().lock()) {
            Err(e) if is_broken_pipe(&e) => {
                debug!("stdout closed by reader");
                Ok(())
            }
            result => result.map_err(to_io),
        },
        Destination::File(path) => {
            let file = File::create(path).map_err(|e| ReconError::io(path, e))?;
            write_table(table, BufWriter::new(file)).map_err(to_io)
        }
    }
}

/// A reader that stops early (`| head`) is not a failure.
fn is_broken_pipe(err: &csv::Error) -> bool {
    matches!(err.kind(), csv::ErrorKind::Io(e) if e.kind() == io::ErrorKind::BrokenPipe)
}

/// Render a table to a CSV string.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut buf = Vec::new();
    write_table(table, &mut buf)?;
    String::from_utf8(buf).map_err(|e| ReconError::malformed("output", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table {
            header: vec!["Cluster ID".into(), "name".into()],
            rows: vec![
                vec!["0".into(), "Acme, Inc".into()],
                vec!["1".into(), "Beta".into()],
            ],
        }
    }

    #[test]
    fn quotes_cells_with_delimiters() {
        let csv = to_csv_string(&sample()).unwrap();
        assert_eq!(csv, "Cluster ID,name\n0,\"Acme, Inc\"\n1,Beta\n");
    }

    #[test]
    fn writes_file_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_to(&sample(), &Destination::File(path.clone())).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, to_csv_string(&sample()).unwrap());
    }

    #[test]
    fn unwritable_destination_is_io_error() {
        let dest = Destination::File(PathBuf::from("/nonexistent-dir/out.csv"));
        assert!(matches!(write_to(&sample(), &dest), Err(ReconError::Io { .. })));
    }

    struct FailingWriter(io::ErrorKind);

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(self.0))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn closed_reader_is_a_broken_pipe() {
        let err = write_table(&sample(), FailingWriter(io::ErrorKind::BrokenPipe)).unwrap_err();
        assert!(is_broken_pipe(&err));
    }

    #[test]
    fn other_write_failures_are_not_broken_pipes() {
        let err = write_table(&sample(), FailingWriter(io::ErrorKind::PermissionDenied)).unwrap_err();
        assert!(!is_broken_pipe(&err));
    }

    #[test]
    fn dash_means_stdout() {
        assert_eq!(Destination::from_option(Some(Path::new("-"))), Destination::Stdout);
        assert_eq!(Destination::from_option(None), Destination::Stdout);
        assert_eq!(
            Destination::from_option(Some(Path::new("out.csv"))),
            Destination::File(PathBuf::from("out.csv"))
        );
    }
}
