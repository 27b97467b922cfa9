//! Minimal sfnt builders for tests.

pub struct NameEntry {
    platform_id: u16,
    encoding_id: u16,
    language_id: u16,
    name_id: u16,
    bytes: Vec<u8>,
}

impl NameEntry {
    pub fn windows(name_id: u16, language_id: u16, text: &str) -> Self {
        Self {
            platform_id: 3,
            encoding_id: 1,
            language_id,
            name_id,
            bytes: text.encode_utf16().flat_map(|u| u.to_be_bytes()).collect(),
        }
    }

    pub fn mac(name_id: u16, text: &str) -> Self {
        Self {
            platform_id: 1,
            encoding_id: 0,
            language_id: 0,
            name_id,
            bytes: text.bytes().collect(),
        }
    }
}

/// Builds a TrueType font holding a zeroed `head` table and a `name` table.
pub fn build_font(entries: &[NameEntry]) -> Vec<u8> {
    let mut name = Vec::new();
    let string_offset = 6 + 12 * entries.len() as u16;
    name.extend_from_slice(&0u16.to_be_bytes());
    name.extend_from_slice(&(entries.len() as u16).to_be_bytes());
    name.extend_from_slice(&string_offset.to_be_bytes());

    let mut strings = Vec::new();
    for entry in entries {
        name.extend_from_slice(&entry.platform_id.to_be_bytes());
        name.extend_from_slice(&entry.encoding_id.to_be_bytes());
        name.extend_from_slice(&entry.language_id.to_be_bytes());
        name.extend_from_slice(&entry.name_id.to_be_bytes());
        name.extend_from_slice(&(entry.bytes.len() as u16).to_be_bytes());
        name.extend_from_slice(&(strings.len() as u16).to_be_bytes());
        strings.extend_from_slice(&entry.bytes);
    }
    name.extend_from_slice(&strings);

    let head = vec![0u8; 56];
    let head_offset = 12 + 16 * 2;
    let name_offset = head_offset + head.len();

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&2u16.to_be_bytes());
    font.extend_from_slice(&[0u8; 6]);

    for (tag, offset, len) in [
        (*b"head", head_offset, head.len()),
        (*b"name", name_offset, name.len()),
    ] {
        font.extend_from_slice(&tag);
        font.extend_from_slice(&0u32.to_be_bytes());
        font.extend_from_slice(&(offset as u32).to_be_bytes());
        font.extend_from_slice(&(len as u32).to_be_bytes());
    }

    font.extend_from_slice(&head);
    font.extend_from_slice(&name);
    font
}

pub fn font_with_full_name(name: &str) -> Vec<u8> {
    build_font(&[
        NameEntry::windows(1, 0x0409, name),
        NameEntry::windows(4, 0x0409, name),
    ])
}

/// Shifts every table offset of a standalone font by `shift` bytes.
pub fn relocate(font: &[u8], shift: u32) -> Vec<u8> {
    let mut out = font.to_vec();
    let num_tables = u16::from_be_bytes([font[4], font[5]]) as usize;
    for i in 0..num_tables {
        let at = 12 + 16 * i + 8;
        let offset = u32::from_be_bytes([out[at], out[at + 1], out[at + 2], out[at + 3]]);
        out[at..at + 4].copy_from_slice(&(offset + shift).to_be_bytes());
    }
    out
}
