//! MessagePack encoding for [`Value`] using `rmp-serde`.

use std::io;

use rmp::Marker;
use rmp_serde::decode::Error as DecodeError;

use crate::error::{PayloadError, Result};
use crate::value::Value;

/// Encode a value to MessagePack bytes.
#[inline]
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    Ok(rmp_serde::to_vec_named(value)?)
}

/// Decode exactly one MessagePack value.
///
/// An empty buffer is a decode error, as are bytes left over after the value
/// and `str` data that is not UTF-8.
pub fn decode(bytes: &[u8]) -> Result<Value> {
    let mut rest = bytes;
    let value: Value = rmp_serde::from_read(&mut rest)?;
    if !rest.is_empty() {
        return Err(PayloadError::TrailingBytes {
            remaining: rest.len(),
        });
    }
    check_strings(bytes)?;
    Ok(value)
}

/// Walk an already decoded document and validate every `str` body.
///
/// `rmp-serde` hands a `str` with invalid UTF-8 to the visitor as raw bytes,
/// where it is indistinguishable from `bin`.
fn check_strings(doc: &[u8]) -> Result<()> {
    let mut pos = 0usize;
    let mut pending: u64 = 1;

    while pending > 0 {
        pending -= 1;
        let marker = Marker::from_u8(take(doc, &mut pos, 1)?[0]);
        match marker {
            Marker::FixStr(len) => utf8(take(doc, &mut pos, usize::from(len))?)?,
            Marker::Str8 | Marker::Str16 | Marker::Str32 => {
                let len = length(doc, &mut pos, marker)?;
                utf8(take(doc, &mut pos, len)?)?;
            }
            Marker::Bin8 | Marker::Bin16 | Marker::Bin32 => {
                let len = length(doc, &mut pos, marker)?;
                take(doc, &mut pos, len)?;
            }
            Marker::Ext8 | Marker::Ext16 | Marker::Ext32 => {
                let len = length(doc, &mut pos, marker)?;
                take(doc, &mut pos, len + 1)?;
            }
            Marker::FixArray(n) => pending += u64::from(n),
            Marker::FixMap(n) => pending += 2 * u64::from(n),
            Marker::Array16 | Marker::Array32 => pending += length(doc, &mut pos, marker)? as u64,
            Marker::Map16 | Marker::Map32 => pending += 2 * length(doc, &mut pos, marker)? as u64,
            Marker::U8 | Marker::I8 => skip(doc, &mut pos, 1)?,
            Marker::U16 | Marker::I16 | Marker::FixExt1 => skip(doc, &mut pos, 2)?,
            Marker::FixExt2 => skip(doc, &mut pos, 3)?,
            Marker::U32 | Marker::I32 | Marker::F32 => skip(doc, &mut pos, 4)?,
            Marker::FixExt4 => skip(doc, &mut pos, 5)?,
            Marker::U64 | Marker::I64 | Marker::F64 => skip(doc, &mut pos, 8)?,
            Marker::FixExt8 => skip(doc, &mut pos, 9)?,
            Marker::FixExt16 => skip(doc, &mut pos, 17)?,
            Marker::FixPos(_) | Marker::FixNeg(_) | Marker::Null | Marker::True | Marker::False => {}
            Marker::Reserved => return Err(DecodeError::TypeMismatch(marker).into()),
        }
    }
    Ok(())
}

/// Big-endian length field following a sized marker.
fn length(doc: &[u8], pos: &mut usize, marker: Marker) -> Result<usize> {
    let width = match marker {
        Marker::Str8 | Marker::Bin8 | Marker::Ext8 => 1,
        Marker::Str16 | Marker::Bin16 | Marker::Ext16 | Marker::Array16 | Marker::Map16 => 2,
        _ => 4,
    };
    let len = take(doc, pos, width)?
        .iter()
        .fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
    Ok(len)
}

fn take<'a>(doc: &'a [u8], pos: &mut usize, len: usize) -> Result<&'a [u8]> {
    let end = pos
        .checked_add(len)
        .filter(|end| *end <= doc.len())
        .ok_or_else(|| DecodeError::InvalidDataRead(io::ErrorKind::UnexpectedEof.into()))?;
    let bytes = &doc[*pos..end];
    *pos = end;
    Ok(bytes)
}

fn skip(doc: &[u8], pos: &mut usize, len: usize) -> Result<()> {
    take(doc, pos, len).map(|_| ())
}

fn utf8(bytes: &[u8]) -> Result<()> {
    std::str::from_utf8(bytes).map_err(DecodeError::Utf8Error)?;
    Ok(())
}
