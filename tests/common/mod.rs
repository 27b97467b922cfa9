#![allow(dead_code)]

use font_registrar::domain::ports::TypefaceFactory;
use font_registrar::{FontBytes, FontError, FontIdentity, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Builds a TrueType font whose `name` table holds `full_name` as the
/// Windows US-English full name, padded with filler bytes.
pub fn font_bytes(full_name: &str, padding: usize) -> Vec<u8> {
    let encoded: Vec<u8> = full_name
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();

    let mut name = Vec::new();
    name.extend_from_slice(&0u16.to_be_bytes()); // format
    name.extend_from_slice(&1u16.to_be_bytes()); // count
    name.extend_from_slice(&18u16.to_be_bytes()); // stringOffset
    for field in [3u16, 1, 0x0409, 4, encoded.len() as u16, 0] {
        name.extend_from_slice(&field.to_be_bytes());
    }
    name.extend_from_slice(&encoded);

    let name_offset = 12 + 16 * 2;
    let glyf_offset = name_offset + name.len();

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&2u16.to_be_bytes());
    font.extend_from_slice(&[0u8; 6]);
    for (tag, offset, len) in [
        (*b"name", name_offset, name.len()),
        (*b"glyf", glyf_offset, padding),
    ] {
        font.extend_from_slice(&tag);
        font.extend_from_slice(&0u32.to_be_bytes());
        font.extend_from_slice(&(offset as u32).to_be_bytes());
        font.extend_from_slice(&(len as u32).to_be_bytes());
    }
    font.extend_from_slice(&name);
    font.extend(std::iter::repeat(0xAB).take(padding));
    font
}

pub fn dir_is_empty(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

/// Typeface factory that counts invocations and can be told to fail.
#[derive(Clone, Default)]
pub struct CountingFactory {
    pub calls: Arc<AtomicUsize>,
    pub failures_left: Arc<AtomicUsize>,
    pub delay: Duration,
}

impl CountingFactory {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn failing_once() -> Self {
        let factory = Self::default();
        factory.failures_left.store(1, Ordering::SeqCst);
        factory
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct FakeTypeface {
    pub family: String,
    pub size: u64,
}

impl TypefaceFactory for CountingFactory {
    type Handle = FakeTypeface;

    async fn construct(&self, identity: &FontIdentity, bytes: &FontBytes) -> Result<FakeTypeface> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(FontError::install(identity.as_str(), "platform refused typeface"));
        }

        Ok(FakeTypeface {
            family: identity.to_string(),
            size: bytes.len(),
        })
    }
}
