//! Byte channels connecting the prover and the verifier.
//!
//! Orchestrators ([`SigmaProver`](crate::interactive::SigmaProver) and
//! [`SigmaVerifier`](crate::interactive::SigmaVerifier)) exchange `bincode`-encoded
//! [`SigmaMessage`](crate::SigmaMessage)s and raw challenges over a [`Channel`].
//! A channel only moves byte frames; it does not interpret them.

use std::{
    io::{self, Read, Write},
    sync::mpsc,
};

/// Maximum frame size accepted by [`StreamChannel`] (16 MiB).
pub const MAX_FRAME_LEN: usize = 16 << 20;

/// Bidirectional, blocking channel transferring byte frames.
pub trait Channel {
    /// Sends a single frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be sent.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Blocks until a frame is received.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame cannot be received, e.g., if the other side
    /// has hung up.
    fn receive(&mut self) -> io::Result<Vec<u8>>;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        (**self).send(frame)
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        (**self).receive()
    }
}

/// In-memory channel end. Ends are created in pairs and may be moved to different threads.
#[derive(Debug)]
pub struct MemoryChannel {
    sender: mpsc::Sender<Vec<u8>>,
    receiver: mpsc::Receiver<Vec<u8>>,
}

impl MemoryChannel {
    /// Creates a pair of connected channel ends.
    pub fn pair() -> (Self, Self) {
        let (first_sender, first_receiver) = mpsc::channel();
        let (second_sender, second_receiver) = mpsc::channel();
        let first = Self {
            sender: first_sender,
            receiver: second_receiver,
        };
        let second = Self {
            sender: second_sender,
            receiver: first_receiver,
        };
        (first, second)
    }
}

impl Channel for MemoryChannel {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.sender
            .send(frame.to_vec())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "channel peer hung up"))
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        self.receiver.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "channel peer hung up")
        })
    }
}

/// Channel over a byte stream (e.g., a `TcpStream`). Each frame is prefixed by its length
/// as a big-endian `u32`.
#[derive(Debug)]
pub struct StreamChannel<S> {
    stream: S,
}

impl<S: Read + Write> StreamChannel<S> {
    /// Wraps the provided stream.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Returns the wrapped stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl<S: Read + Write> Channel for StreamChannel<S> {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        if frame.len() > MAX_FRAME_LEN {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "frame is too large"));
        }
        let len = u32::try_from(frame.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "frame is too large"))?;
        self.stream.write_all(&len.to_be_bytes())?;
        self.stream.write_all(frame)?;
        self.stream.flush()
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        let mut len_bytes = [0_u8; 4];
        self.stream.read_exact(&mut len_bytes)?;
        let len = usize::try_from(u32::from_be_bytes(len_bytes)).unwrap_or(usize::MAX);
        if len > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "incoming frame is too large",
            ));
        }
        let mut frame = vec![0_u8; len];
        self.stream.read_exact(&mut frame)?;
        Ok(frame)
    }
}
