//! `tokio_util::codec` adapter for async serial streams.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_frame, encode_frame, Frame};
use crate::error::FrameError;

/// Decoder/encoder pair for use with `FramedRead`, `FramedWrite`, or `Framed`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActuatorCodec;

impl Decoder for ActuatorCodec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        Ok(decode_frame(src))
    }
}

impl Encoder<Frame> for ActuatorCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        encode_frame(&item, dst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use tokio_util::codec::FramedRead;

    use super::*;

    #[tokio::test]
    async fn framed_read_yields_whole_frames() {
        let bytes: Vec<u8> = [Frame::new(1, 60, 7), Frame::new(2, 60, -7)]
            .iter()
            .flat_map(|f| f.to_bytes())
            .collect();

        let mut reader = FramedRead::new(bytes.as_slice(), ActuatorCodec);
        let first = reader.next().await.unwrap().unwrap();
        let second = reader.next().await.unwrap().unwrap();
        assert_eq!(first, Frame::new(1, 60, 7));
        assert_eq!(second, Frame::new(2, 60, -7));
        assert!(reader.next().await.is_none());
    }

    #[test]
    fn encoder_appends_to_destination() {
        let mut codec = ActuatorCodec;
        let mut dst = BytesMut::new();
        codec.encode(Frame::new(0, 2, 0), &mut dst).unwrap();
        codec.encode(Frame::new(1, 1, 0), &mut dst).unwrap();
        assert_eq!(dst.len(), 12);
        assert_eq!(codec.decode(&mut dst).unwrap(), Some(Frame::new(0, 2, 0)));
    }
}
