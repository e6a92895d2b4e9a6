
//! Rewriting into `io::Write` implementations.
//!
//! # Example
//!
//! ```
//! use std::io::Write;
//! use html5_rewriter::{ Writer, Settings, Handlers, ElementContentHandlers, Directive };
//!
//! let handlers = Handlers::new()
//!     .on("img", ElementContentHandlers::default()
//!         .element(|element| {
//!             element.set_attribute("loading", "lazy").unwrap();
//!             Directive::Continue
//!         })
//!     );
//! let mut writer = Writer::new(Vec::new(), handlers, Settings::default()).unwrap();
//! writer.write_all(b"<p><img src=a.png></p>").unwrap();
//! writer.close().unwrap();
//! assert_eq!(writer.into_inner(), b"<p><img src=a.png loading=\"lazy\"></p>".to_vec());
//! ```

use std::io;
use std::fmt;
use std::error;

use encoding;
use rewriter;
use transform;

struct IoSink<W> {
    inner: W,
    error: Option<io::Error>,
}

impl<W> rewriter::OutputSink for IoSink<W> where W: io::Write {

    fn handle_chunk(&mut self, chunk: &[u8]) {
        if self.error.is_none() {
            if let Err(error) = self.inner.write_all(chunk) {
                self.error = Some(error);
            }
        }
    }
}

/// Errors of a `Writer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The rewriter failed.
    Rewriting {
        /// The rewriting error.
        error: rewriter::RewritingError,
    },
    /// Writing to the underlying writer failed.
    Io {
        /// Kind of the original I/O error.
        kind: io::ErrorKind,
        /// Message of the original I/O error.
        message: String,
    },
}

impl fmt::Display for Error {

    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Rewriting { ref error } => fmt::Display::fmt(error, fmt),
            Error::Io { ref message, .. } => write!(fmt, "Output error: {}", message),
        }
    }
}

impl error::Error for Error {

    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Rewriting { ref error } => Some(error),
            Error::Io { .. } => None,
        }
    }
}

impl From<Error> for io::Error {

    fn from(error: Error) -> io::Error {
        match error {
            Error::Io { kind, message } => io::Error::new(kind, message),
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

/// An `io::Write` adapter rewriting everything written into it.
pub struct Writer<'h, W> where W: io::Write {
    rewriter: rewriter::Rewriter<'h, IoSink<W>>,
    failed: Option<Error>,
    closed: bool,
}

impl<'h, W> Writer<'h, W> where W: io::Write {

    /// Wrap `inner`.
    pub fn new(inner: W, handlers: transform::Handlers<'h>, settings: rewriter::Settings)
    -> Result<Writer<'h, W>, rewriter::RewritingError> {
        let sink = IoSink { inner, error: None };
        Ok(Writer {
            rewriter: rewriter::Rewriter::new(handlers, settings, sink)?,
            failed: None,
            closed: false,
        })
    }

    fn settle(&mut self, result: Result<(), rewriter::RewritingError>) -> Result<(), Error> {
        if let Some(ref error) = self.failed {
            return Err(error.clone());
        }
        let error = match self.rewriter.output_mut().error.take() {
            Some(error) => Error::Io { kind: error.kind(), message: error.to_string() },
            None => match result {
                Ok(()) => return Ok(()),
                Err(error) => Error::Rewriting { error },
            },
        };
        debug!("writer failed: {}", error);
        self.failed = Some(error.clone());
        Err(error)
    }

    /// End the rewriter and flush the underlying writer. Calls after the first are no-ops.
    pub fn close(&mut self) -> Result<(), Error> {
        if let Some(ref error) = self.failed {
            return Err(error.clone());
        }
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let result = self.rewriter.end();
        self.settle(result)?;
        let flushed = self.rewriter.output_mut().inner.flush();
        if let Err(error) = flushed {
            self.rewriter.output_mut().error = Some(error);
            return self.settle(Ok(()));
        }
        Ok(())
    }

    /// The underlying writer.
    pub fn get_mut(&mut self) -> &mut W { &mut self.rewriter.output_mut().inner }

    /// Unwrap the underlying writer. Does not close the rewriter.
    pub fn into_inner(self) -> W { self.rewriter.into_output().inner }
}

impl<'h, W> io::Write for Writer<'h, W> where W: io::Write {

    fn write(&mut self, chunk: &[u8]) -> io::Result<usize> {
        if let Some(ref error) = self.failed {
            return Err(error.clone().into());
        }
        let result = self.rewriter.write(chunk);
        let written = match result {
            Ok(written) => written,
            Err(_) => 0,
        };
        self.settle(result.map(|_| ()))?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(ref error) = self.failed {
            return Err(error.clone().into());
        }
        self.rewriter.output_mut().inner.flush()
    }
}

/// Rewrite a complete document held in memory.
///
/// The input is encoded and the output decoded with the configured encoding.
pub fn rewrite_str(input: &str, handlers: transform::Handlers, settings: rewriter::Settings)
-> Result<String, rewriter::RewritingError> {
    let encoding = encoding::AsciiCompatibleEncoding::for_label(&settings.encoding)?;
    let mut output = Vec::with_capacity(input.len());
    {
        let sink = |chunk: &[u8]| output.extend_from_slice(chunk);
        let mut rewriter = rewriter::Rewriter::new(handlers, settings, sink)?;
        rewriter.write(&encoding.encode(input))?;
        rewriter.end()?;
    }
    Ok(encoding.decode(&output))
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::io::Write;

    use builder::Directive;
    use modifier::ContentType;
    use rewriter::{ Settings, RewritingError };
    use transform::{ Handlers, ElementContentHandlers };

    struct Failing;

    impl io::Write for Failing {

        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    fn bold<'h>() -> Handlers<'h> {
        Handlers::new().on("b", ElementContentHandlers::default()
            .element(|element| {
                element.set_tag_name("strong").unwrap();
                Directive::Continue
            })
        )
    }

    #[test]
    fn writes_rewritten_output() {
        let mut writer = super::Writer::new(Vec::new(), bold(), Settings::default()).unwrap();
        writer.write_all(b"a <b>b").unwrap();
        writer.write_all(b"</b> c").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert_eq!(writer.into_inner(), b"a <strong>b</strong> c".to_vec());
    }

    #[test]
    fn errors_are_repeated() {
        let mut writer = super::Writer::new(Vec::new(), bold(), Settings::default()).unwrap();
        writer.close().unwrap();
        let error = writer.write(b"x").unwrap_err();
        assert_eq!(error.to_string(), "Data was written into the stream after it has ended.");
        let error = writer.write(b"y").unwrap_err();
        assert_eq!(error.to_string(), "Data was written into the stream after it has ended.");
        match writer.close() {
            Err(super::Error::Rewriting { error: RewritingError::WriteAfterEnd }) => (),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn io_errors() {
        let mut writer = super::Writer::new(Failing, bold(), Settings::default()).unwrap();
        let error = writer.write(b"<p>").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
        let error = writer.write(b"</p>").unwrap_err();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn rewrite_str() {
        let output = super::rewrite_str("<b>x</b>", bold(), Settings::default());
        assert_eq!(output, Ok("<strong>x</strong>".into()));
        let output = super::rewrite_str("<p>caf\u{e9}</p>", Handlers::new()
            .on("p", ElementContentHandlers::default()
                .element(|element| {
                    element.append(" \u{e0}", ContentType::Text);
                    Directive::Continue
                })
            ),
            Settings::default().encoding("latin1"),
        );
        assert_eq!(output, Ok("<p>caf\u{e9} \u{e0}</p>".into()));
    }
}
