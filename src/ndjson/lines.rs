use super::Framer;
use crate::lichess::StreamError;
use bytes::Bytes;
use futures::Stream;
use futures::StreamExt;
use std::collections::VecDeque;
use std::pin::Pin;

/// Ordered lines of one streaming body. Ends after the body ends or after the
/// first transport error, which is yielded as the last item.
pub type Lines = Pin<Box<dyn Stream<Item = Result<String, StreamError>> + Send>>;

struct Cursor<S> {
    body: Pin<Box<S>>,
    framer: Framer,
    ready: VecDeque<String>,
    done: bool,
}

/// Frame a chunked body into lines.
pub fn lines<S, E>(body: S) -> Lines
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + 'static,
{
    let cursor = Cursor {
        body: Box::pin(body),
        framer: Framer::default(),
        ready: VecDeque::new(),
        done: false,
    };
    futures::stream::unfold(cursor, |mut cursor| async move {
        loop {
            if let Some(line) = cursor.ready.pop_front() {
                return Some((Ok(line), cursor));
            }
            if cursor.done {
                return None;
            }
            match cursor.body.next().await {
                Some(Ok(chunk)) => cursor.ready.extend(cursor.framer.feed(&chunk)),
                Some(Err(e)) => {
                    cursor.done = true;
                    return Some((Err(StreamError::Transport(e.to_string())), cursor));
                }
                None => {
                    cursor.done = true;
                    cursor.ready.extend(cursor.framer.finish());
                }
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(chunks: Vec<Result<&'static str, &'static str>>) -> Lines {
        lines(futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| c.map(|s| Bytes::from_static(s.as_bytes())))
                .collect::<Vec<_>>(),
        ))
    }

    #[tokio::test]
    async fn yields_lines_in_arrival_order() {
        let got = body(vec![Ok("{\"n\":1}\n{\"n\""), Ok(":2}\n\n{\"n\":3}")])
            .collect::<Vec<_>>()
            .await;
        assert_eq!(
            got,
            vec![
                Ok("{\"n\":1}".to_string()),
                Ok("{\"n\":2}".to_string()),
                Ok("{\"n\":3}".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn transport_error_terminates() {
        let got = body(vec![Ok("{}\n"), Err("reset by peer"), Ok("{}\n")])
            .collect::<Vec<_>>()
            .await;
        assert_eq!(
            got,
            vec![
                Ok("{}".to_string()),
                Err(StreamError::Transport("reset by peer".to_string())),
            ]
        );
    }
}
