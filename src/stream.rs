//! Pull-based streaming bodies.
//!
//! A [`ChunkSource`] is the portable stand-in for a generator: `pull()`
//! yields items one at a time and finishes with an optional "return" value;
//! `cancel()` releases whatever the source holds when the consumer stops
//! early. Production is driven entirely by consumer pulls, which is what
//! gives streams their backpressure: nothing is produced until the
//! transport asks for the next chunk.
//!
//! A [`BodyStream`] pairs an erased source with a serializer closure
//! (`item -> Option<Vec<u8>>`). A `None` from the serializer skips that
//! item without emitting anything, which is how non-content control values
//! yielded by a source are swallowed. If the source's final return value
//! serializes, it is appended as one last chunk.
//!
//! Cleanup discipline: the source's `cancel()` runs exactly once for a
//! stream abandoned before exhaustion, whether through an explicit
//! [`BodyStream::cancel`] or through `Drop`, and never for a stream that
//! ran to completion.

use std::fmt;

/// One step of a pull-based source.
pub enum Step<T> {
    /// An item was produced; pull again for more.
    Next(T),
    /// The source is exhausted, optionally producing one final value.
    Done(Option<T>),
}

/// A pull-based chunk producer with explicit cancellation.
pub trait ChunkSource: Send {
    type Item;

    /// Produce the next step. Not called again after returning
    /// [`Step::Done`] or after [`ChunkSource::cancel`].
    fn pull(&mut self) -> Step<Self::Item>;

    /// Release held resources after early consumer cancellation. Called at
    /// most once, and never after natural exhaustion.
    fn cancel(&mut self) {}
}

/// Adapts an iterator into a [`ChunkSource`], optionally with a final
/// "return" value produced after the iterator is exhausted.
pub struct IterSource<I: Iterator> {
    iter: I,
    finale: Option<I::Item>,
}

impl<I: Iterator> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter, finale: None }
    }

    pub fn with_return(iter: I, finale: I::Item) -> Self {
        Self {
            iter,
            finale: Some(finale),
        }
    }
}

impl<I> ChunkSource for IterSource<I>
where
    I: Iterator + Send,
    I::Item: Send,
{
    type Item = I::Item;

    fn pull(&mut self) -> Step<I::Item> {
        match self.iter.next() {
            Some(item) => Step::Next(item),
            None => Step::Done(self.finale.take()),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
enum StreamState {
    Active,
    Finished,
    Cancelled,
}

/// An erased, serialized pull stream usable as a response body.
pub struct BodyStream {
    source: Box<dyn ErasedSource>,
    state: StreamState,
}

impl BodyStream {
    /// Pair a source with a serializer. The serializer returns the wire
    /// bytes for an item, or `None` to produce nothing for it.
    pub fn new<S, F>(source: S, serialize: F) -> Self
    where
        S: ChunkSource + 'static,
        F: FnMut(S::Item) -> Option<Vec<u8>> + Send + 'static,
    {
        Self {
            source: Box::new(Serialized {
                source,
                serialize,
                exhausted: false,
            }),
            state: StreamState::Active,
        }
    }

    /// Identity-serialized stream over anything byte-like.
    pub fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: Send + 'static,
        I::Item: Into<Vec<u8>> + Send + 'static,
    {
        Self::new(IterSource::new(iter.into_iter()), |item| Some(item.into()))
    }

    /// Pull the next wire chunk. `None` means the stream completed; the
    /// consumer calls this only when ready to accept more.
    pub fn next_chunk(&mut self) -> Option<Vec<u8>> {
        if self.state != StreamState::Active {
            return None;
        }
        match self.source.next_chunk() {
            Some(chunk) => Some(chunk),
            None => {
                self.state = StreamState::Finished;
                None
            }
        }
    }

    /// Stop consuming early. Invokes the source's cleanup exactly once; a
    /// no-op on a finished or already-cancelled stream.
    pub fn cancel(&mut self) {
        if self.state == StreamState::Active {
            self.state = StreamState::Cancelled;
            self.source.cancel_source();
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Active
    }
}

impl Drop for BodyStream {
    fn drop(&mut self) {
        // A dropped in-flight stream counts as consumer cancellation.
        self.cancel();
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("state", &self.state)
            .finish()
    }
}

trait ErasedSource: Send {
    fn next_chunk(&mut self) -> Option<Vec<u8>>;
    fn cancel_source(&mut self);
}

struct Serialized<S, F> {
    source: S,
    serialize: F,
    exhausted: bool,
}

impl<S, F> ErasedSource for Serialized<S, F>
where
    S: ChunkSource,
    F: FnMut(S::Item) -> Option<Vec<u8>> + Send,
{
    fn next_chunk(&mut self) -> Option<Vec<u8>> {
        if self.exhausted {
            return None;
        }
        loop {
            match self.source.pull() {
                Step::Next(item) => {
                    if let Some(chunk) = (self.serialize)(item) {
                        return Some(chunk);
                    }
                    // Serializer skipped this item; pull again.
                }
                Step::Done(finale) => {
                    self.exhausted = true;
                    return finale.and_then(&mut self.serialize);
                }
            }
        }
    }

    fn cancel_source(&mut self) {
        self.source.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        items: Vec<&'static str>,
        cursor: usize,
        finale: Option<&'static str>,
        cancels: Arc<AtomicUsize>,
    }

    impl ChunkSource for CountingSource {
        type Item = &'static str;

        fn pull(&mut self) -> Step<&'static str> {
            if self.cursor < self.items.len() {
                self.cursor += 1;
                Step::Next(self.items[self.cursor - 1])
            } else {
                Step::Done(self.finale.take())
            }
        }

        fn cancel(&mut self) {
            self.cancels.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn counting(
        items: Vec<&'static str>,
        finale: Option<&'static str>,
    ) -> (CountingSource, Arc<AtomicUsize>) {
        let cancels = Arc::new(AtomicUsize::new(0));
        (
            CountingSource {
                items,
                cursor: 0,
                finale,
                cancels: Arc::clone(&cancels),
            },
            cancels,
        )
    }

    #[test]
    fn test_yields_items_then_return_value() {
        let (source, _) = counting(vec!["<p>", "1", "</p>"], Some("done"));
        let mut stream = BodyStream::new(source, |s: &str| Some(s.as_bytes().to_vec()));
        let mut chunks = Vec::new();
        while let Some(chunk) = stream.next_chunk() {
            chunks.push(String::from_utf8(chunk).unwrap());
        }
        assert_eq!(chunks, vec!["<p>", "1", "</p>", "done"]);
        assert!(stream.is_finished());
    }

    #[test]
    fn test_serializer_skips_items() {
        let (source, _) = counting(vec!["keep", "skip", "keep"], None);
        let mut stream = BodyStream::new(source, |s: &str| {
            (s != "skip").then(|| s.as_bytes().to_vec())
        });
        let mut count = 0;
        while stream.next_chunk().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[test]
    fn test_cancel_invokes_cleanup_exactly_once() {
        let (source, cancels) = counting(vec!["a", "b", "c", "d"], None);
        let mut stream = BodyStream::new(source, |s: &str| Some(s.as_bytes().to_vec()));
        stream.next_chunk();
        stream.next_chunk();
        stream.cancel();
        stream.cancel();
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
        assert_eq!(stream.next_chunk(), None);
    }

    #[test]
    fn test_drop_mid_flight_cancels_once() {
        let (source, cancels) = counting(vec!["a", "b"], None);
        {
            let mut stream = BodyStream::new(source, |s: &str| Some(s.as_bytes().to_vec()));
            stream.next_chunk();
        }
        assert_eq!(cancels.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_exhausted_stream_is_not_cancelled() {
        let (source, cancels) = counting(vec!["a"], None);
        {
            let mut stream = BodyStream::new(source, |s: &str| Some(s.as_bytes().to_vec()));
            while stream.next_chunk().is_some() {}
        }
        assert_eq!(cancels.load(Ordering::SeqCst), 0);
    }
}
