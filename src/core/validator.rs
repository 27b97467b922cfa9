//! sfnt `name` table reader.
//!
//! Walks the table directory of a TrueType / OpenType font (or the first face
//! of a TrueType Collection) and extracts the full name (name ID 4). Only the
//! directory, the name records and the chosen string are read, so the cost does
//! not depend on the size of the font.

use crate::domain::model::{FontBytes, FontIdentity};
use crate::utils::error::{FontError, Result};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

const SFNT_TRUETYPE: u32 = 0x0001_0000;
const SFNT_OPENTYPE: u32 = u32::from_be_bytes(*b"OTTO");
const SFNT_APPLE: u32 = u32::from_be_bytes(*b"true");
const SFNT_COLLECTION: u32 = u32::from_be_bytes(*b"ttcf");

const NAME_TAG: [u8; 4] = *b"name";
const NAME_ID_FULL_NAME: u16 = 4;

const PLATFORM_UNICODE: u16 = 0;
const PLATFORM_MACINTOSH: u16 = 1;
const PLATFORM_WINDOWS: u16 = 3;

const WINDOWS_EN_US: u16 = 0x0409;

// Bytes 0x80..=0xFF of the Mac OS Roman encoding.
const MAC_ROMAN_HIGH: &str = "ÄÅÇÉÑÖÜáàâäãåçéèêëíìîïñóòôöõúùûü†°¢£§•¶ß®©™´¨≠ÆØ\
∞±≤≥¥µ∂∑∏π∫ªºΩæø¿¡¬√ƒ≈∆«»…\u{a0}ÀÃÕŒœ–—“”‘’÷◊ÿŸ⁄€‹›ﬁﬂ\
‡·‚„‰ÂÊÁËÈÍÎÏÌÓÔ\u{f8ff}ÒÚÛÙıˆ˜¯˘˙˚¸˝˛ˇ";

#[derive(Debug, Clone, Copy)]
struct TableRecord {
    offset: u32,
    length: u32,
}

#[derive(Debug, Clone, Copy)]
struct NameRecord {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    length: u16,
    offset: u16,
}

impl NameRecord {
    /// Lower is better; `None` means the encoding is not decoded.
    fn rank(&self) -> Option<u8> {
        match (self.platform_id, self.encoding_id, self.language_id) {
            (PLATFORM_WINDOWS, 1 | 10, WINDOWS_EN_US) => Some(0),
            (PLATFORM_WINDOWS, 1 | 10, lang) if lang & 0x00FF == 0x09 => Some(1),
            (PLATFORM_UNICODE, _, _) => Some(2),
            (PLATFORM_MACINTOSH, 0, 0) => Some(3),
            (PLATFORM_WINDOWS, 1 | 10, _) => Some(4),
            (PLATFORM_WINDOWS, 0, _) => Some(5),
            _ => None,
        }
    }

    fn decode(&self, raw: &[u8]) -> Result<String> {
        match self.platform_id {
            PLATFORM_UNICODE | PLATFORM_WINDOWS => decode_utf16_be(raw),
            PLATFORM_MACINTOSH => Ok(decode_mac_roman(raw)),
            other => Err(FontError::malformed(format!(
                "unsupported name platform {}",
                other
            ))),
        }
    }
}

struct SfntReader<R> {
    inner: R,
}

impl<R: Read + Seek> SfntReader<R> {
    fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf).map_err(map_io)
    }

    fn u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    fn tag(&mut self) -> Result<[u8; 4]> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn seek_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset)).map_err(map_io)?;
        Ok(())
    }

    fn skip(&mut self, count: i64) -> Result<()> {
        self.inner.seek(SeekFrom::Current(count)).map_err(map_io)?;
        Ok(())
    }

    fn stream_len(&mut self) -> Result<u64> {
        let len = self.inner.seek(SeekFrom::End(0)).map_err(map_io)?;
        self.seek_to(0)?;
        Ok(len)
    }

    fn bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }
}

fn map_io(err: std::io::Error) -> FontError {
    if err.kind() == ErrorKind::UnexpectedEof {
        FontError::malformed("truncated font data")
    } else {
        FontError::malformed(format!("failed to read font data: {}", err))
    }
}

/// Extracts the full name from a font container.
///
/// Any structural problem, including a name that decodes to an empty string,
/// is reported as `MalformedFont`.
pub fn read_full_name<R: Read + Seek>(reader: R) -> Result<FontIdentity> {
    let mut r = SfntReader::new(reader);
    let file_len = r.stream_len()?;

    let face_offset = face_offset(&mut r)?;
    let name_table = find_name_table(&mut r, face_offset)?;

    let table_end = u64::from(name_table.offset) + u64::from(name_table.length);
    if table_end > file_len {
        return Err(FontError::malformed("name table extends past end of file"));
    }

    r.seek_to(u64::from(name_table.offset))?;
    let format = r.u16()?;
    if format > 1 {
        return Err(FontError::malformed(format!(
            "unsupported name table format {}",
            format
        )));
    }
    let count = r.u16()?;
    let string_offset = r.u16()?;

    if 6 + u32::from(count) * 12 > name_table.length {
        return Err(FontError::malformed("name records exceed name table"));
    }

    let mut candidates = Vec::new();
    for _ in 0..count {
        let platform_id = r.u16()?;
        let encoding_id = r.u16()?;
        let language_id = r.u16()?;
        let name_id = r.u16()?;
        let length = r.u16()?;
        let offset = r.u16()?;

        if name_id != NAME_ID_FULL_NAME {
            continue;
        }
        let record = NameRecord {
            platform_id,
            encoding_id,
            language_id,
            length,
            offset,
        };
        if let Some(rank) = record.rank() {
            candidates.push((rank, record));
        }
    }

    if candidates.is_empty() {
        return Err(FontError::malformed("font has no full name entry"));
    }
    candidates.sort_by_key(|(rank, _)| *rank);

    let mut last_error = None;
    for (_, record) in candidates {
        let end = u32::from(string_offset) + u32::from(record.offset) + u32::from(record.length);
        if end > name_table.length {
            tracing::debug!(
                "Skipping name record (platform {}, language {:#06x}): outside name table",
                record.platform_id,
                record.language_id
            );
            last_error = Some(FontError::malformed("name record points outside name table"));
            continue;
        }

        let start = u64::from(name_table.offset)
            + u64::from(string_offset)
            + u64::from(record.offset);
        r.seek_to(start)?;
        let raw = r.bytes(usize::from(record.length))?;

        match record.decode(&raw).and_then(FontIdentity::new) {
            Ok(identity) => return Ok(identity),
            Err(err) => {
                tracing::debug!(
                    "Skipping name record (platform {}, language {:#06x}): {}",
                    record.platform_id,
                    record.language_id,
                    err
                );
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| FontError::malformed("font has no usable full name")))
}

/// Offset of the table directory to read, following the first entry of a
/// collection header.
fn face_offset<R: Read + Seek>(r: &mut SfntReader<R>) -> Result<u64> {
    match r.u32()? {
        SFNT_TRUETYPE | SFNT_OPENTYPE | SFNT_APPLE => Ok(0),
        SFNT_COLLECTION => {
            let _version = r.u32()?;
            let num_fonts = r.u32()?;
            if num_fonts == 0 {
                return Err(FontError::malformed("font collection is empty"));
            }
            let offset = u64::from(r.u32()?);
            r.seek_to(offset)?;
            match r.u32()? {
                SFNT_TRUETYPE | SFNT_OPENTYPE | SFNT_APPLE => Ok(offset),
                other => Err(FontError::malformed(format!(
                    "unsupported collection face version {:#010x}",
                    other
                ))),
            }
        }
        other => Err(FontError::malformed(format!(
            "unsupported container version {:#010x}",
            other
        ))),
    }
}

fn find_name_table<R: Read + Seek>(r: &mut SfntReader<R>, face_offset: u64) -> Result<TableRecord> {
    // sfntVersion already consumed
    r.seek_to(face_offset + 4)?;
    let num_tables = r.u16()?;
    r.skip(6)?; // searchRange, entrySelector, rangeShift

    for _ in 0..num_tables {
        let tag = r.tag()?;
        let _checksum = r.u32()?;
        let offset = r.u32()?;
        let length = r.u32()?;
        if tag == NAME_TAG {
            return Ok(TableRecord { offset, length });
        }
    }

    Err(FontError::malformed("font has no name table"))
}

fn decode_utf16_be(raw: &[u8]) -> Result<String> {
    if raw.len() % 2 != 0 {
        return Err(FontError::malformed("odd-length UTF-16 name string"));
    }
    let units: Vec<u16> = raw
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units).map_err(|_| FontError::malformed("invalid UTF-16 name string"))
}

fn decode_mac_roman(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| {
            if b < 0x80 {
                char::from(b)
            } else {
                MAC_ROMAN_HIGH
                    .chars()
                    .nth(usize::from(b - 0x80))
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            }
        })
        .collect()
}

/// Reads the identity of materialized font bytes off the async runtime.
///
/// Bytes that cannot be opened or read are reported as `MalformedFont`.
pub async fn identify(bytes: &FontBytes) -> Result<FontIdentity> {
    let file = bytes
        .open()
        .map_err(|e| FontError::malformed(format!("cannot read font data: {}", e)))?;
    tokio::task::spawn_blocking(move || read_full_name(std::io::BufReader::new(file)))
        .await
        .map_err(|e| FontError::malformed(format!("font parsing aborted: {}", e)))?
}
