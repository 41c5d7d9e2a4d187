use crate::codec::Frame;

/// Consumes completed frames and produces the response body.
///
/// Handlers run synchronously inside the game's cell write and must not
/// block. A returned body is written back as `[size, body..]`; `None`
/// writes an empty response (size 0).
pub trait FrameHandler {
    fn handle(&mut self, frame: &Frame) -> Option<Vec<u8>>;
}

impl<F> FrameHandler for F
where
    F: FnMut(&Frame) -> Option<Vec<u8>>,
{
    fn handle(&mut self, frame: &Frame) -> Option<Vec<u8>> {
        self(frame)
    }
}
