//! big-endian 64-bit word i/o
//!
//! Every field of the format is packed into 64-bit big-endian words, so this
//! is the only granularity the codec reads or writes.

use std::io::{Read, Seek, SeekFrom, Write};

use super::error::QoaResult;
use super::types::MAGIC;

/// read one word, failing on a short read
pub fn read_u64<R: Read + ?Sized>(reader: &mut R) -> QoaResult<u64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(u64::from_be_bytes(bytes))
}

/// write one word
pub fn write_u64<W: Write + ?Sized>(v: u64, writer: &mut W) -> QoaResult<()> {
    writer.write_all(&v.to_be_bytes())?;
    Ok(())
}

/// read one word and rewind so the next read sees it again
pub fn peek_u64<R: Read + Seek + ?Sized>(reader: &mut R) -> QoaResult<u64> {
    let v = read_u64(reader)?;
    reader.seek(SeekFrom::Current(-8))?;
    Ok(v)
}

/// word at `offset` in an in-memory buffer
#[inline]
pub fn u64_at(data: &[u8], offset: usize) -> Option<u64> {
    let bytes = data.get(offset..offset.checked_add(8)?)?;
    let mut word = [0u8; 8];
    word.copy_from_slice(bytes);
    Some(u64::from_be_bytes(word))
}

/// does this buffer start with the 'qoaf' magic?
pub fn check_fourcc(data: &[u8]) -> bool {
    match data.get(..4) {
        Some(fourcc) => fourcc == &MAGIC.to_be_bytes()[..],
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_word_roundtrip_is_big_endian() {
        let mut buf = Vec::new();
        write_u64(0x0102_0304_0506_0708, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6, 7, 8]);

        let mut cursor = Cursor::new(buf);
        assert_eq!(read_u64(&mut cursor).unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn test_short_read_is_error() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3]);
        assert!(read_u64(&mut cursor).is_err());
    }

    #[test]
    fn test_peek_rewinds() {
        let mut cursor = Cursor::new((1u64..=2).flat_map(|v| v.to_be_bytes()).collect::<Vec<_>>());
        assert_eq!(peek_u64(&mut cursor).unwrap(), 1);
        assert_eq!(read_u64(&mut cursor).unwrap(), 1);
        assert_eq!(read_u64(&mut cursor).unwrap(), 2);
    }

    #[test]
    fn test_u64_at_bounds() {
        let data = [0u8, 0, 0, 0, 0, 0, 0, 9, 1];
        assert_eq!(u64_at(&data, 0), Some(9));
        assert_eq!(u64_at(&data, 2), None);
        assert_eq!(u64_at(&data, usize::MAX), None);
    }

    #[test]
    fn test_check_fourcc() {
        assert!(check_fourcc(&[0x71, 0x6f, 0x61, 0x66]));
        assert!(check_fourcc(b"qoaf\x00\x00"));
        assert!(!check_fourcc(&[]));
        assert!(!check_fourcc(&[0x71, 0x6f, 0x61]));
        assert!(!check_fourcc(&[1, 2, 3, 4]));
    }
}
