use std::io::BufRead;

/// Streams non-blank request lines from a JSON Lines source. Parsing is left
/// to the dispatcher so that a malformed line yields an error response
/// instead of ending the run.
pub struct RequestReader<R: BufRead> {
    source: R,
}

impl<R: BufRead> RequestReader<R> {
    pub fn new(source: R) -> Self {
        Self { source }
    }

    pub fn lines(self) -> impl Iterator<Item = std::io::Result<String>> {
        self.source.lines().filter(|line| {
            line.as_ref()
                .map(|l| !l.trim().is_empty())
                .unwrap_or(true)
        })
    }
}
