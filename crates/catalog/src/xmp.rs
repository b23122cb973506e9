//! Embedded metadata decode.
//!
//! The catalog stores per-photo metadata as a binary blob: a 4-byte
//! big-endian payload length followed by a zlib stream containing an XMP
//! packet. Real catalogs contain truncated and corrupt blobs, so every
//! step here degrades to `None` instead of failing the scan.

use std::io::Read;

use flate2::read::ZlibDecoder;
use regex::Regex;

/// Fields pulled out of one decoded XMP packet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmpFields {
    /// Stable identifier assigned at creation, shared by derived copies.
    pub document_id: Option<String>,
    /// Identifier of this particular rendition.
    pub instance_id: Option<String>,
    /// Capture time as written by the camera, highest-confidence field first.
    pub capture_time: Option<String>,
}

/// Decode a metadata blob to its XMP packet bytes.
///
/// The length prefix is advisory: blobs whose inflated size disagrees with
/// it are still returned, since the packet is usually intact anyway.
pub fn decompress(blob: &[u8]) -> Option<Vec<u8>> {
    if blob.len() < 4 {
        return None;
    }
    let mut out = Vec::new();
    let mut decoder = ZlibDecoder::new(&blob[4..]);
    match decoder.read_to_end(&mut out) {
        Ok(_) => Some(out),
        // A truncated stream still yields whatever inflated before the cut.
        Err(_) if !out.is_empty() => Some(out),
        Err(_) => None,
    }
}

/// Extract identifier and capture-time fields from a metadata blob.
/// Returns empty fields for blobs that cannot be decoded.
pub fn extract(blob: &[u8]) -> XmpFields {
    let Some(packet) = decompress(blob) else {
        return XmpFields::default();
    };
    let text = String::from_utf8_lossy(&packet).to_string();
    parse_packet(&text)
}

const DATE_KEYS: [&[u8]; 3] = [
    b"exif:DateTimeOriginal",
    b"xmp:CreateDate",
    b"exif:DateTimeDigitized",
];

fn parse_packet(xml: &str) -> XmpFields {
    use quick_xml::events::Event;
    use quick_xml::Reader;

    let mut fields = XmpFields::default();
    // Index into DATE_KEYS of the best date seen so far; lower wins.
    let mut date_rank = DATE_KEYS.len();
    // Set while inside a date element whose text content we want.
    let mut pending_date: Option<usize> = None;

    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"xmpMM:DocumentID" => {
                            fields.document_id =
                                Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        b"xmpMM:InstanceID" => {
                            fields.instance_id =
                                Some(String::from_utf8_lossy(&attr.value).to_string());
                        }
                        key => {
                            if let Some(rank) = DATE_KEYS.iter().position(|k| *k == key) {
                                if rank < date_rank {
                                    fields.capture_time =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                    date_rank = rank;
                                }
                            }
                        }
                    }
                }
                // Dates also appear as element content in expanded packets.
                pending_date = DATE_KEYS
                    .iter()
                    .position(|k| *k == e.name().as_ref())
                    .filter(|rank| *rank < date_rank);
            }
            Ok(Event::Text(ref e)) => {
                if let Some(rank) = pending_date.take() {
                    let value = String::from_utf8_lossy(e.as_ref()).to_string();
                    if !value.is_empty() {
                        fields.capture_time = Some(value);
                        date_rank = rank;
                    }
                }
            }
            Ok(Event::End(_)) => pending_date = None,
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    // Corrupt packets sometimes lose their structure but keep the date text.
    if fields.capture_time.is_none() {
        let re = Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}").unwrap();
        if let Some(m) = re.find(xml) {
            fields.capture_time = Some(m.as_str().to_string());
        }
    }

    fields
}
