use std::io::{self, Read, Seek, SeekFrom};

use crate::filesystem::fat_error::FATError;

/// Reads `len` bytes at a given offset of a seekable reader.
///
/// # Arguments
///
/// - `reader`: The reader to read from, usually the disk image file.
/// - `offset`: The offset in bytes where the read starts.
/// - `len`: The number of bytes to read.
///
/// # Errors
///
/// Returns `FATError::ShortRead` if the reader ends before `len` bytes are read,
/// and `FATError::IOError` if seeking or reading fails.
pub fn read_at<T: Read + Seek>(
    reader: &mut T,
    offset: u64,
    len: usize,
) -> Result<Vec<u8>, FATError> {
    reader.seek(SeekFrom::Start(offset))?;

    // `len` may come from untrusted metadata: grow only with the bytes actually read.
    let mut buffer = Vec::new();
    reader
        .by_ref()
        .take(len as u64)
        .read_to_end(&mut buffer)
        .map_err(|err| {
            io::Error::new(
                err.kind(),
                format!("Failed to read {len} bytes at offset {offset}: {err}"),
            )
        })?;

    if buffer.len() < len {
        return Err(FATError::ShortRead {
            offset,
            requested: len,
            available: buffer.len(),
        });
    }

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_at_offset() {
        let mut image = Cursor::new((0u8..16).collect::<Vec<u8>>());
        assert_eq!(read_at(&mut image, 4, 3).unwrap(), vec![4, 5, 6]);
        assert_eq!(read_at(&mut image, 0, 2).unwrap(), vec![0, 1]);
    }

    #[test]
    fn truncated_source_is_a_short_read() {
        let mut image = Cursor::new(vec![0u8; 10]);
        match read_at(&mut image, 8, 4) {
            Err(FATError::ShortRead {
                offset,
                requested,
                available,
            }) => assert_eq!((offset, requested, available), (8, 4, 2)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn huge_request_on_small_source_is_a_short_read() {
        let mut image = Cursor::new(vec![0u8; 64]);
        assert!(matches!(
            read_at(&mut image, 0, usize::MAX),
            Err(FATError::ShortRead { available: 64, .. })
        ));
    }

    #[test]
    fn read_past_end_is_a_short_read() {
        let mut image = Cursor::new(vec![0u8; 10]);
        assert!(matches!(
            read_at(&mut image, 100, 1),
            Err(FATError::ShortRead { available: 0, .. })
        ));
    }
}
