//! Combining cache observation streams.

use futures::future::Either;
use futures::stream::{self, BoxStream, StreamExt};

/// Emits `(a, b)` with the latest value of each input.
///
/// Nothing is emitted until both inputs have produced a value; after that,
/// every emission of either input produces one output. Ends when both inputs
/// end.
pub fn combine_latest2<A, B>(
    a: BoxStream<'static, A>,
    b: BoxStream<'static, B>,
) -> BoxStream<'static, (A, B)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
{
    let mut tagged = stream::select(a.map(Either::Left), b.map(Either::Right));

    Box::pin(async_stream::stream! {
        let mut left = None;
        let mut right = None;
        while let Some(value) = tagged.next().await {
            match value {
                Either::Left(a) => left = Some(a),
                Either::Right(b) => right = Some(b),
            }
            let latest = match (&left, &right) {
                (Some(a), Some(b)) => Some((a.clone(), b.clone())),
                _ => None,
            };
            if let Some(pair) = latest {
                yield pair;
            }
        }
    })
}

/// Three-input form of [`combine_latest2`].
pub fn combine_latest3<A, B, C>(
    a: BoxStream<'static, A>,
    b: BoxStream<'static, B>,
    c: BoxStream<'static, C>,
) -> BoxStream<'static, (A, B, C)>
where
    A: Clone + Send + 'static,
    B: Clone + Send + 'static,
    C: Clone + Send + 'static,
{
    combine_latest2(combine_latest2(a, b), c)
        .map(|((a, b), c)| (a, b, c))
        .boxed()
}
