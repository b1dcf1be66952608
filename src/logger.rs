use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Sends diagnostics to stderr; stdout is left to the data a tool prints.
/// `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second initialisation (tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Side file collecting logs no result could be scraped from.
pub struct NonMatchLog {
    out: BufWriter<File>,
    count: usize,
}

impl NonMatchLog {
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(NonMatchLog {
            out: BufWriter::new(file),
            count: 0,
        })
    }

    /// Writes the file name followed by the whole log.
    pub fn record(&mut self, file_name: &str, contents: &str) -> io::Result<()> {
        self.count += 1;
        writeln!(self.out, "{}", file_name)?;
        writeln!(self.out, "{}", contents)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn finish(mut self) -> io::Result<usize> {
        self.out.flush()?;
        Ok(self.count)
    }
}

#[test]
fn non_match_log_dumps_name_and_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("non-match");
    let mut log = NonMatchLog::create(&path).unwrap();
    log.record("a.LTLCardinality", "crash").unwrap();
    log.record("b.LTLFireability", "oom").unwrap();
    assert_eq!(log.count(), 2);
    assert_eq!(log.finish().unwrap(), 2);
    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "a.LTLCardinality\ncrash\nb.LTLFireability\noom\n");
}
