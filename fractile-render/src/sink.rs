/// Destination for accepted work results.
///
/// The scheduler calls `accept` only for results whose generation
/// matched at the moment of acceptance — a sink draws or stores
/// unconditionally, with no further filtering of its own. Results for
/// edge blocks may overhang the canvas; the sink clips (or tolerates)
/// the excess.
///
/// Implementations are external collaborators: a canvas painter, a test
/// recorder, or the in-memory [`CountBuffer`](crate::CountBuffer).
pub trait ResultSink {
    /// `counts` holds `width × height` escape counts in row-major
    /// order for the block whose top-left canvas pixel is `(x, y)`.
    fn accept(&mut self, x: u32, y: u32, width: u32, height: u32, counts: &[u32]);
}
