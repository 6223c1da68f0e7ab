use chardetng::EncodingDetector;
use encoding_rs::Encoding;
use explorer_core::SpoolEncoding;

/// Spool content ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSpool {
    pub text: String,
    pub encoding_label: String,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("failed to decode spool bytes with {encoding}: {message}")]
    DecodeFailure { encoding: String, message: String },
}

/// Decodes downloaded spool bytes.
///
/// Binary downloads are shown lossily. Text is decoded by BOM, then the
/// response charset, then chardetng detection.
pub fn decode_spool(
    bytes: &[u8],
    content_type: Option<&str>,
    encoding: Option<&SpoolEncoding>,
) -> Result<DecodedSpool, DecodeError> {
    if let Some(SpoolEncoding::Binary) = encoding {
        return Ok(DecodedSpool {
            text: String::from_utf8_lossy(bytes).into_owned(),
            encoding_label: "binary".to_string(),
        });
    }

    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    if let Some(label) = content_type.and_then(extract_charset) {
        if let Some(enc) = Encoding::for_label(label.as_bytes()) {
            return decode_with(bytes, enc);
        }
    }

    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    let enc = detector.guess(None, true);
    decode_with(bytes, enc)
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type
        .split(';')
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            key.eq_ignore_ascii_case("charset")
                .then(|| value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> Result<DecodedSpool, DecodeError> {
    let (text, _, had_errors) = enc.decode(bytes);
    if had_errors {
        return Err(DecodeError::DecodeFailure {
            encoding: enc.name().to_string(),
            message: "malformed byte sequence".into(),
        });
    }
    Ok(DecodedSpool {
        text: text.into_owned(),
        encoding_label: enc.name().to_string(),
    })
}
