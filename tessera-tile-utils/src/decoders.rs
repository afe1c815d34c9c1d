use std::io::{Read as _, Write as _};

use flate2::read::{GzDecoder, ZlibDecoder};
use flate2::write::GzEncoder;

use crate::Encoding;

pub fn decode_gzip(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

pub fn encode_gzip(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

pub fn decode_zlib(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = ZlibDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

pub fn decode_brotli(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = brotli::Decompressor::new(data, 4096);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

pub fn encode_brotli(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    let mut encoder = brotli::CompressorWriter::new(Vec::new(), 4096, 11, 22);
    encoder.write_all(data)?;
    Ok(encoder.into_inner())
}

pub fn decode_zstd(data: &[u8]) -> Result<Vec<u8>, std::io::Error> {
    zstd::decode_all(data)
}

/// Undo the transport compression described by `encoding`.
///
/// Payloads without transport compression are returned as-is.
pub fn decode(data: Vec<u8>, encoding: Encoding) -> Result<Vec<u8>, std::io::Error> {
    match encoding {
        Encoding::Uncompressed | Encoding::Internal => Ok(data),
        Encoding::Gzip => decode_gzip(&data),
        Encoding::Zlib => decode_zlib(&data),
        Encoding::Brotli => decode_brotli(&data),
        Encoding::Zstd => decode_zstd(&data),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    const PAYLOAD: &[u8] = b"\x1a\x05roads\x28\x80\x20\x78\x02";

    #[test]
    fn gzip_round_trip() {
        let encoded = encode_gzip(PAYLOAD).unwrap();
        assert!(encoded.starts_with(b"\x1f\x8b"));
        assert_eq!(decode_gzip(&encoded).unwrap(), PAYLOAD);
    }

    #[rstest]
    #[case(Encoding::Gzip, encode_gzip(PAYLOAD).unwrap())]
    #[case(Encoding::Brotli, encode_brotli(PAYLOAD).unwrap())]
    #[case(Encoding::Zstd, zstd::encode_all(PAYLOAD, 0).unwrap())]
    #[case(Encoding::Uncompressed, PAYLOAD.to_vec())]
    fn decode_by_encoding(#[case] encoding: Encoding, #[case] data: Vec<u8>) {
        assert_eq!(decode(data, encoding).unwrap(), PAYLOAD);
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode(b"\x1f\x8bnot really gzip".to_vec(), Encoding::Gzip).is_err());
    }
}
