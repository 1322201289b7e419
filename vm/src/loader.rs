//! Image loader (§6, C6).
//!
//! Code and heap images are sequences of little-endian `u16` words, read
//! page by page into possibly non-contiguous physical frames: the reader
//! fills at most `PAGE_SIZE_WORDS` into the first frame offset, then at
//! most that many into the next, and so on. Shorter files are permitted;
//! unfilled memory stays zero.

use std::io::Read;

use crate::constants::PAGE_SIZE_WORDS;
use crate::memory::PhysicalMemory;

/// Loads up to `max_words` little-endian words from `reader` into `mem`,
/// distributing them across `frame_offsets` one page at a time.
pub fn load_image<R: Read>(
    mem: &mut PhysicalMemory,
    mut reader: R,
    frame_offsets: &[u16],
) -> std::io::Result<()> {
    let max_words = frame_offsets.len() * PAGE_SIZE_WORDS;
    let mut buf = [0u8; 2];
    let mut word_index = 0usize;

    while word_index < max_words {
        let frame = word_index / PAGE_SIZE_WORDS;
        let offset_in_frame = (word_index % PAGE_SIZE_WORDS) as u16;
        let read = reader.read(&mut buf)?;
        if read == 0 {
            break;
        }
        if read == 1 {
            // Trailing odd byte: treat the missing high byte as zero.
            buf[1] = 0;
        }
        let word = u16::from_le_bytes(buf);
        mem.write(frame_offsets[frame] + offset_in_frame, word);
        word_index += 1;
    }

    Ok(())
}
