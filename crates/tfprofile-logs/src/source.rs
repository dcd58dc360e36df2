use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use tfprofile_types::ResourceEvent;

use crate::error::{Error, Result};
use crate::parser::LogParser;

/// Read a whole log, parsing each line as it arrives
///
/// With a `tee` sink every line is written to it verbatim (line ending
/// included) before the next line is read. A fatal parse error stops
/// parsing; when teeing, the rest of the input is still drained and echoed
/// so the copy matches the input, and the error is returned at the end.
pub async fn read_log<R, W>(mut reader: R, mut tee: Option<W>) -> Result<Vec<ResourceEvent>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut parser = LogParser::new();
    let mut events = Vec::new();
    let mut failure: Option<Error> = None;
    let mut buf = Vec::new();
    let mut index = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        if let Some(out) = tee.as_mut() {
            out.write_all(&buf).await?;
            out.flush().await?;
        }

        if failure.is_none() {
            let line = String::from_utf8_lossy(&buf);
            let line = line.trim_end_matches(['\n', '\r']);
            match parser.parse_line(index, line) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => {}
                Err(err) if tee.is_some() => {
                    debug!(error = %err, "parse failed, draining passthrough input");
                    failure = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        index += 1;
    }

    if let Some(err) = failure {
        return Err(err);
    }

    info!(lines = index, events = events.len(), "parsed log");
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tfprofile_types::EventKind;

    const LOG: &str = "aws_instance.a: Creating...\r\n\
                       some noise\n\
                       aws_instance.a: Creation complete after 2s [id=i-1]\n\
                       no trailing newline";

    #[tokio::test]
    async fn test_reads_events_with_line_indices() {
        let events = read_log(LOG.as_bytes(), None::<Vec<u8>>).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::StartAction);
        assert_eq!(events[0].line_index, 0);
        assert_eq!(events[1].kind, EventKind::Complete);
        assert_eq!(events[1].line_index, 2);
        assert_eq!(events[1].elapsed_ms, Some(2_000));
    }

    #[tokio::test]
    async fn test_tee_output_is_byte_identical() {
        let mut out = Vec::new();
        let events = read_log(LOG.as_bytes(), Some(&mut out)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(out, LOG.as_bytes());
    }

    #[tokio::test]
    async fn test_tee_drains_input_after_parse_error() {
        let input = "aws_instance.a: Creating...\n\
                     aws_instance.a: Creation complete after soon\n\
                     aws_instance.b: Creating...\n";
        let mut out = Vec::new();
        let err = read_log(input.as_bytes(), Some(&mut out)).await.unwrap_err();
        assert!(matches!(err, Error::Parse { line: 2, .. }));
        assert_eq!(out, input.as_bytes());
    }

    #[tokio::test]
    async fn test_parse_error_without_tee_aborts() {
        let input = "aws_instance.a: Creation complete after 1q\n";
        let err = read_log(input.as_bytes(), None::<Vec<u8>>).await.unwrap_err();
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_echoed_untouched() {
        let input: &[u8] = b"\xff\xfe binary noise\naws_instance.a: Creating...\n";
        let mut out = Vec::new();
        let events = read_log(input, Some(&mut out)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].line_index, 1);
        assert_eq!(out, input);
    }
}
