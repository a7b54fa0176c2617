//! This module contains the reader for binary puzzle bundles in the `KSF1`
//! format, which packs a collection of Killer Sudoku puzzles into one file.
//!
//! A bundle starts with a 12-byte header: the magic bytes `KSF1`, a one-byte
//! format version (currently 1), three padding bytes, and a little-endian
//! `u32` puzzle count. The header is followed by one little-endian `u64`
//! absolute byte offset per puzzle. Each puzzle payload consists of a
//! little-endian `u32` payload length and `length` bytes of data: the
//! 81-byte reference solution (row-major, values 1 to 9), a one-byte cage
//! count, and the cages. Each cage is a one-byte sum, a one-byte cell
//! count, and one packed byte per cell with the row in the high nibble and
//! the column in the low nibble.

use crate::{Board, Position};
use crate::cage::Cage;
use crate::error::{BundleError, BundleResult, SudokuResult};

use log::debug;

use std::io::{Read, Seek, SeekFrom};

/// The `KSF1` magic bytes as a little-endian word.
const MAGIC: u32 = 0x3146_534b;

/// The only supported format version.
const VERSION: u8 = 1;

/// Magic, version, padding, and puzzle count.
const HEADER_SIZE: u64 = 12;

/// The row-major reference solution, one byte per cell.
const SOLUTION_SIZE: usize = 81;

fn read_u8<R: Read>(source: &mut R) -> BundleResult<u8> {
    let mut bytes = [0u8; 1];
    source.read_exact(&mut bytes)?;
    Ok(bytes[0])
}

fn read_u32_le<R: Read>(source: &mut R) -> BundleResult<u32> {
    let mut bytes = [0u8; 4];
    source.read_exact(&mut bytes)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_u64_le<R: Read>(source: &mut R) -> BundleResult<u64> {
    let mut bytes = [0u8; 8];
    source.read_exact(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}

/// One puzzle loaded from a bundle: the cage layout that defines it and the
/// reference solution it was packed with. The solution is carried for
/// comparison against solver output; it is never written to a board.
pub struct Puzzle {
    cages: Vec<Cage>,
    solution: Vec<u8>
}

impl Puzzle {

    /// Gets the cages defining this puzzle.
    pub fn cages(&self) -> &[Cage] {
        &self.cages
    }

    /// Gets the 81-byte reference solution in row-major order, i.e. the
    /// byte for a position is found at index [Position::offset].
    pub fn solution(&self) -> &[u8] {
        &self.solution
    }

    /// Creates a new, empty [Board] with this puzzle's cages attached.
    ///
    /// # Errors
    ///
    /// If the cages overlap. In that case,
    /// [SudokuError](crate::error::SudokuError)`::OverlappingCages` is
    /// returned.
    pub fn board(&self) -> SudokuResult<Board> {
        let mut board = Board::new();
        board.set_cages(self.cages.clone())?;
        Ok(board)
    }
}

/// A reader for `KSF1` puzzle bundles over any seekable byte source. The
/// header and the offset index are read eagerly at construction; individual
/// puzzles are decoded on demand by [BundleReader::load].
pub struct BundleReader<R: Read + Seek> {
    source: R,
    offsets: Vec<u64>
}

impl<R: Read + Seek> BundleReader<R> {

    /// Creates a new bundle reader over the given source, reading and
    /// validating the header and the puzzle index.
    ///
    /// # Errors
    ///
    /// * `BundleError::BadMagic` if the source does not start with `KSF1`.
    /// * `BundleError::UnsupportedVersion` if the format version is not 1.
    /// * `BundleError::Truncated` if the source ends within the header or
    /// the index.
    /// * `BundleError::Io` for any other I/O failure.
    pub fn new(mut source: R) -> BundleResult<BundleReader<R>> {
        let magic = read_u32_le(&mut source)?;

        if magic != MAGIC {
            return Err(BundleError::BadMagic(magic));
        }

        let version = read_u8(&mut source)?;

        if version != VERSION {
            return Err(BundleError::UnsupportedVersion(version));
        }

        source.seek(SeekFrom::Start(HEADER_SIZE - 4))?;
        let puzzle_count = read_u32_le(&mut source)?;

        let mut offsets = Vec::with_capacity(puzzle_count as usize);

        for _ in 0..puzzle_count {
            offsets.push(read_u64_le(&mut source)?);
        }

        debug!("read bundle index with {} puzzles", offsets.len());

        Ok(BundleReader {
            source,
            offsets
        })
    }

    /// Gets the number of puzzles in this bundle.
    pub fn puzzle_count(&self) -> usize {
        self.offsets.len()
    }

    /// Loads the puzzle with the given index from the bundle.
    ///
    /// # Errors
    ///
    /// * `BundleError::IndexOutOfRange` if `index` is not less than
    /// [BundleReader::puzzle_count].
    /// * `BundleError::PayloadTooShort` if the payload cannot hold a
    /// solution and a cage count.
    /// * `BundleError::Truncated` if the source or the payload ends within
    /// the puzzle data.
    /// * `BundleError::MalformedCage` if a cage is empty, repeats a cell,
    /// or addresses a cell outside the grid.
    /// * `BundleError::Io` for any other I/O failure.
    pub fn load(&mut self, index: usize) -> BundleResult<Puzzle> {
        let offset = *self.offsets.get(index)
            .ok_or(BundleError::IndexOutOfRange(index))?;

        self.source.seek(SeekFrom::Start(offset))?;

        let payload_len = read_u32_le(&mut self.source)?;

        if (payload_len as usize) < SOLUTION_SIZE + 1 {
            return Err(BundleError::PayloadTooShort(payload_len));
        }

        let mut payload = vec![0u8; payload_len as usize];
        self.source.read_exact(&mut payload)?;

        let solution = payload[..SOLUTION_SIZE].to_vec();
        let mut cursor = SOLUTION_SIZE;
        let cage_count = payload[cursor];
        cursor += 1;

        let mut cages = Vec::with_capacity(cage_count as usize);

        for _ in 0..cage_count {
            if cursor + 2 > payload.len() {
                return Err(BundleError::Truncated);
            }

            let sum = payload[cursor];
            let cell_count = payload[cursor + 1] as usize;
            cursor += 2;

            if cursor + cell_count > payload.len() {
                return Err(BundleError::Truncated);
            }

            let cells = payload[cursor..cursor + cell_count].iter()
                .map(|&packed| {
                    let row = usize::from(packed >> 4);
                    let col = usize::from(packed & 0x0f);
                    Position::new(row, col)
                })
                .collect();
            cursor += cell_count;

            cages.push(Cage::new(u32::from(sum), cells)?);
        }

        debug!("loaded puzzle {} with {} cages", index, cages.len());

        Ok(Puzzle {
            cages,
            solution
        })
    }
}
