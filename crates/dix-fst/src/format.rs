// VFST file header.

use crate::FstError;

/// The two little-endian magic cookies `0x00013A6E` and `0x000351FA`.
const MAGIC: [u8; 8] = [0x6E, 0x3A, 0x01, 0x00, 0xFA, 0x51, 0x03, 0x00];

/// Size of the VFST binary header in bytes.
pub const HEADER_SIZE: usize = 16;

/// Offset of the weighted flag; the bytes after it are reserved and zero.
const WEIGHTED_FLAG: usize = 8;

/// The 16-byte header in front of the symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfstHeader {
    pub weighted: bool,
}

impl VfstHeader {
    /// Append the on-disk form of the header to `out`.
    pub fn write(self, out: &mut Vec<u8>) {
        let start = out.len();
        out.extend_from_slice(&MAGIC);
        out.resize(start + HEADER_SIZE, 0);
        out[start + WEIGHTED_FLAG] = u8::from(self.weighted);
    }

    /// Read the header at the start of `data`.
    ///
    /// Only little-endian files are recognized; byte-swapped cookies are an
    /// [`FstError::InvalidMagic`].
    pub fn parse(data: &[u8]) -> Result<Self, FstError> {
        let Some(header) = data.get(..HEADER_SIZE) else {
            return Err(FstError::TooShort {
                expected: HEADER_SIZE,
                actual: data.len(),
            });
        };
        if header[..MAGIC.len()] != MAGIC {
            return Err(FstError::InvalidMagic);
        }
        Ok(Self {
            weighted: header[WEIGHTED_FLAG] == 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(weighted: bool) -> Vec<u8> {
        let mut out = Vec::new();
        VfstHeader { weighted }.write(&mut out);
        out
    }

    #[test]
    fn magic_matches_cookies() {
        let bytes = header(false);
        assert_eq!(u32::from_le_bytes(bytes[0..4].try_into().unwrap()), 0x0001_3A6E);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 0x0003_51FA);
    }

    #[test]
    fn weighted_flag_and_reserved_bytes() {
        let bytes = header(true);
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(bytes[WEIGHTED_FLAG], 1);
        assert!(bytes[WEIGHTED_FLAG + 1..].iter().all(|&b| b == 0));
        assert_eq!(VfstHeader::parse(&bytes).unwrap(), VfstHeader { weighted: true });
        assert_eq!(VfstHeader::parse(&header(false)).unwrap(), VfstHeader { weighted: false });
    }

    #[test]
    fn appends_after_existing_bytes() {
        let mut out = vec![0xAA];
        VfstHeader { weighted: true }.write(&mut out);
        assert_eq!(out.len(), 1 + HEADER_SIZE);
        assert!(VfstHeader::parse(&out[1..]).unwrap().weighted);
    }

    #[test]
    fn short_input() {
        assert!(matches!(
            VfstHeader::parse(&MAGIC),
            Err(FstError::TooShort { expected: 16, actual: 8 })
        ));
    }

    #[test]
    fn byte_swapped_magic_is_rejected() {
        let mut bytes = header(true);
        bytes[..4].reverse();
        bytes[4..8].reverse();
        assert!(matches!(VfstHeader::parse(&bytes), Err(FstError::InvalidMagic)));
    }
}
