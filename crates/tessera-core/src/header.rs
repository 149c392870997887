//! Chunk header layout and its byte-level codec.
//!
//! Every chunk in the arena starts with an 8-byte header:
//!
//! ```text
//! ┌────────────────────┬────────────────────┬──────────────────────────┐
//! │ status: u32 (LE)   │ size: u32 (LE)     │ payload (size - 8 bytes) │
//! └────────────────────┴────────────────────┴──────────────────────────┘
//!   bytes 0..4           bytes 4..8           bytes 8..size
//! ```
//!
//! `size` counts the header itself. Headers are never reinterpreted in
//! place; they are decoded from and encoded into the arena's byte buffer.

use std::fmt;

use crate::error::Corruption;

/// Size of an encoded [`ChunkHeader`] in bytes.
pub const HEADER_SIZE: usize = 8;

/// Allocation state of a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkStatus {
    /// Available for placement and tracked by the free-chunk index.
    Free,
    /// Handed out to a caller.
    Allocated,
}

impl ChunkStatus {
    /// Status word written for allocated chunks.
    pub const ALLOCATED_WORD: u32 = 0x5555_5555;

    /// Status word written for free chunks.
    pub const FREE_WORD: u32 = 0xAAAA_AAAA;

    /// The status word stored in the header for this status.
    pub fn to_word(self) -> u32 {
        match self {
            Self::Free => Self::FREE_WORD,
            Self::Allocated => Self::ALLOCATED_WORD,
        }
    }

    /// Decode a stored status word. Any other bit pattern is `None`.
    pub fn from_word(word: u32) -> Option<Self> {
        match word {
            Self::FREE_WORD => Some(Self::Free),
            Self::ALLOCATED_WORD => Some(Self::Allocated),
            _ => None,
        }
    }

    /// One-character tag used in heap dumps (`F` or `A`).
    pub fn tag(self) -> char {
        match self {
            Self::Free => 'F',
            Self::Allocated => 'A',
        }
    }

    /// Whether this is [`ChunkStatus::Free`].
    pub fn is_free(self) -> bool {
        self == Self::Free
    }
}

impl fmt::Display for ChunkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Allocated => write!(f, "allocated"),
        }
    }
}

/// Decoded chunk header: status plus total chunk size (header included).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkHeader {
    /// Whether the chunk is free or allocated.
    pub status: ChunkStatus,
    /// Total size of the chunk in bytes, including the header.
    pub size: u32,
}

impl ChunkHeader {
    /// Header for a free chunk of `size` bytes.
    pub fn free(size: u32) -> Self {
        Self {
            status: ChunkStatus::Free,
            size,
        }
    }

    /// Header for an allocated chunk of `size` bytes.
    pub fn allocated(size: u32) -> Self {
        Self {
            status: ChunkStatus::Allocated,
            size,
        }
    }

    /// Encode into the on-buffer representation.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[..4].copy_from_slice(&self.status.to_word().to_le_bytes());
        out[4..].copy_from_slice(&self.size.to_le_bytes());
        out
    }

    /// Decode from the on-buffer representation.
    ///
    /// Only the status word is validated here. Whether `size` is plausible
    /// depends on where the chunk sits, which the arena checks.
    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Result<Self, Corruption> {
        let word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let size = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let status = ChunkStatus::from_word(word).ok_or(Corruption::BadStatus { raw: word })?;
        Ok(Self { status, size })
    }

    /// Number of payload bytes that follow the header.
    pub fn payload_len(&self) -> u32 {
        self.size.saturating_sub(HEADER_SIZE as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_words_match_dump_format() {
        assert_eq!(ChunkStatus::Free.to_word(), 0xAAAA_AAAA);
        assert_eq!(ChunkStatus::Allocated.to_word(), 0x5555_5555);
        assert_eq!(ChunkStatus::Free.tag(), 'F');
        assert_eq!(ChunkStatus::Allocated.tag(), 'A');
    }

    #[test]
    fn encode_is_little_endian_status_then_size() {
        let bytes = ChunkHeader::free(4096).encode();
        assert_eq!(bytes, [0xAA, 0xAA, 0xAA, 0xAA, 0x00, 0x10, 0x00, 0x00]);
    }

    #[test]
    fn decode_rejects_unknown_status() {
        let mut bytes = ChunkHeader::allocated(64).encode();
        bytes[0] = 0x12;
        let err = ChunkHeader::decode(bytes).unwrap_err();
        assert_eq!(err, Corruption::BadStatus { raw: 0x5555_5512 });
    }

    #[test]
    fn zeroed_bytes_are_not_a_header() {
        assert!(ChunkHeader::decode([0u8; HEADER_SIZE]).is_err());
    }

    #[test]
    fn payload_len_excludes_header() {
        assert_eq!(ChunkHeader::allocated(112).payload_len(), 104);
        assert_eq!(ChunkHeader::free(4).payload_len(), 0);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn decode_inverts_encode(size in any::<u32>(), free in any::<bool>()) {
                let header = if free {
                    ChunkHeader::free(size)
                } else {
                    ChunkHeader::allocated(size)
                };
                prop_assert_eq!(ChunkHeader::decode(header.encode()), Ok(header));
            }

            #[test]
            fn only_two_status_words_decode(word in any::<u32>()) {
                let known = word == ChunkStatus::FREE_WORD || word == ChunkStatus::ALLOCATED_WORD;
                prop_assert_eq!(ChunkStatus::from_word(word).is_some(), known);
            }
        }
    }
}
