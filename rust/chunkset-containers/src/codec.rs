//! Little-endian byte layouts of the three container representations.
//!
//! - run: `u16 nbrruns`, then `nbrruns` run starts, then `nbrruns` run lengths,
//!   each a `u16`;
//! - array: `u32 cardinality`, then `cardinality` ascending `u16` values;
//! - bitmap: 1024 `u64` words, value `v` in bit `v % 64` of word `v / 64`.
//!
//! The layouts carry no representation tag; the caller keeps track of the
//! [`ContainerKind`] alongside the bytes.

use std::io::{Read, Write};

use byteorder::{LE, ReadBytesExt, WriteBytesExt};
use chunkset_common::{Result, error::Error, verify_data};

use crate::{
    array::ArrayContainer,
    bitmap::{BITMAP_WORDS, BitmapContainer},
    container::{Container, ContainerKind},
    run::Run,
    run_container::RunContainer,
    run_store::RunStore,
};

/// Largest number of runs a chunk can hold: every other value set.
const MAX_RUNS: usize = 32768;

impl RunContainer {
    /// Exact number of bytes [`RunContainer::serialize`] writes.
    pub fn serialized_size_in_bytes(&self) -> usize {
        2 + 4 * self.num_runs()
    }

    /// Writes the container to `w` and returns the number of bytes written.
    pub fn serialize<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write + ?Sized,
    {
        let store = self.store();
        write_run_store(store, w).map_err(|e| Error::io("run container", e))?;
        Ok(self.serialized_size_in_bytes())
    }

    pub fn serialize_to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.serialized_size_in_bytes());
        self.serialize(&mut v)
            .expect("Serializing to a vec should not fail");
        v
    }

    /// Reads a container written by [`RunContainer::serialize`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stream ends early or the runs are out of
    /// order, overlapping, adjacent or past the `u16` domain, and `Io` for any other
    /// stream failure.
    pub fn deserialize<R>(r: &mut R) -> Result<RunContainer>
    where
        R: Read + ?Sized,
    {
        read_run_store(r)
            .inspect_err(|e| log_rejection("run container", e))
            .map(RunContainer::from_store)
    }

    pub fn deserialize_from_slice(mut s: &[u8]) -> Result<RunContainer> {
        Self::deserialize(&mut s)
    }
}

impl ArrayContainer {
    /// Exact number of bytes [`ArrayContainer::serialize`] writes.
    pub fn serialized_size_in_bytes(&self) -> usize {
        4 + 2 * self.cardinality()
    }

    pub fn serialize<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write + ?Sized,
    {
        let write = |w: &mut W| -> std::io::Result<()> {
            w.write_u32::<LE>(self.cardinality() as u32)?;
            for &value in self.values() {
                w.write_u16::<LE>(value)?;
            }
            Ok(())
        };
        write(w).map_err(|e| Error::io("array container", e))?;
        Ok(self.serialized_size_in_bytes())
    }

    /// Reads a container written by [`ArrayContainer::serialize`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidFormat` if the stream ends early, declares more than 65536
    /// values, or the values are not strictly ascending.
    pub fn deserialize<R>(r: &mut R) -> Result<ArrayContainer>
    where
        R: Read + ?Sized,
    {
        let values = read_array_values(r).inspect_err(|e| log_rejection("array container", e))?;
        Ok(ArrayContainer::from_sorted_vec(values))
    }
}

impl BitmapContainer {
    /// Exact number of bytes [`BitmapContainer::serialize`] writes.
    pub fn serialized_size_in_bytes(&self) -> usize {
        Self::SIZE_IN_BYTES
    }

    pub fn serialize<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write + ?Sized,
    {
        let write = |w: &mut W| -> std::io::Result<()> {
            for &word in self.words().iter() {
                w.write_u64::<LE>(word)?;
            }
            Ok(())
        };
        write(w).map_err(|e| Error::io("bitmap container", e))?;
        Ok(Self::SIZE_IN_BYTES)
    }

    /// Reads a container written by [`BitmapContainer::serialize`].
    pub fn deserialize<R>(r: &mut R) -> Result<BitmapContainer>
    where
        R: Read + ?Sized,
    {
        let mut words = Box::new([0u64; BITMAP_WORDS]);
        r.read_u64_into::<LE>(words.as_mut_slice())
            .map_err(|e| Error::io("bitmap words", e))?;
        Ok(BitmapContainer::from_words(words))
    }
}

impl Container {
    /// Exact number of bytes [`Container::serialize`] writes.
    pub fn serialized_size_in_bytes(&self) -> usize {
        match self {
            Container::Array(c) => c.serialized_size_in_bytes(),
            Container::Bitmap(c) => c.serialized_size_in_bytes(),
            Container::Run(c) => c.serialized_size_in_bytes(),
        }
    }

    /// Writes the container in the layout of its representation.
    pub fn serialize<W>(&self, w: &mut W) -> Result<usize>
    where
        W: Write + ?Sized,
    {
        match self {
            Container::Array(c) => c.serialize(w),
            Container::Bitmap(c) => c.serialize(w),
            Container::Run(c) => c.serialize(w),
        }
    }

    pub fn serialize_to_vec(&self) -> Vec<u8> {
        let mut v = Vec::with_capacity(self.serialized_size_in_bytes());
        self.serialize(&mut v)
            .expect("Serializing to a vec should not fail");
        v
    }

    /// Reads a container of representation `kind`.
    pub fn deserialize<R>(kind: ContainerKind, r: &mut R) -> Result<Container>
    where
        R: Read + ?Sized,
    {
        Ok(match kind {
            ContainerKind::Array => Container::Array(ArrayContainer::deserialize(r)?),
            ContainerKind::Bitmap => Container::Bitmap(BitmapContainer::deserialize(r)?),
            ContainerKind::Run => Container::Run(RunContainer::deserialize(r)?),
        })
    }

    pub fn deserialize_from_slice(kind: ContainerKind, mut s: &[u8]) -> Result<Container> {
        Self::deserialize(kind, &mut s)
    }
}

fn write_run_store<W>(store: &RunStore, w: &mut W) -> std::io::Result<()>
where
    W: Write + ?Sized,
{
    w.write_u16::<LE>(store.len() as u16)?;
    for &start in store.starts() {
        w.write_u16::<LE>(start)?;
    }
    for &length in store.lengths() {
        w.write_u16::<LE>(length)?;
    }
    Ok(())
}

fn read_run_store<R>(r: &mut R) -> Result<RunStore>
where
    R: Read + ?Sized,
{
    let nbrruns = r
        .read_u16::<LE>()
        .map_err(|e| Error::io("run container header", e))? as usize;
    verify_data!(
        nbrruns,
        nbrruns <= MAX_RUNS,
        "{nbrruns} runs exceed the maximum of {MAX_RUNS}"
    );
    let mut buf = vec![0u16; 2 * nbrruns].into_boxed_slice();
    let (starts, lengths) = buf.split_at_mut(nbrruns);
    r.read_u16_into::<LE>(starts)
        .map_err(|e| Error::io("run starts", e))?;
    r.read_u16_into::<LE>(lengths)
        .map_err(|e| Error::io("run lengths", e))?;

    let store = RunStore::from_buffer(buf);
    let mut prev: Option<Run> = None;
    for (index, run) in store.iter().enumerate() {
        verify_data!(
            runs,
            run.start as u32 + run.length as u32 <= u16::MAX as u32,
            "run {index} ({}, {}) exceeds u16 domain",
            run.start,
            run.length
        );
        if let Some(prev) = prev {
            verify_data!(
                runs,
                prev.end() < run.start && !prev.is_adjacent(run),
                "run {index} starting at {} overlaps or touches its predecessor",
                run.start
            );
        }
        prev = Some(run);
    }
    Ok(store)
}

fn read_array_values<R>(r: &mut R) -> Result<Vec<u16>>
where
    R: Read + ?Sized,
{
    let cardinality = r
        .read_u32::<LE>()
        .map_err(|e| Error::io("array container header", e))? as usize;
    verify_data!(
        cardinality,
        cardinality <= u16::MAX as usize + 1,
        "{cardinality} values exceed the chunk domain"
    );
    let mut values = vec![0u16; cardinality];
    r.read_u16_into::<LE>(&mut values)
        .map_err(|e| Error::io("array values", e))?;
    let unsorted = values.windows(2).position(|w| w[0] >= w[1]);
    verify_data!(
        values,
        unsorted.is_none(),
        "values not strictly ascending at position {}",
        unsorted.unwrap_or_default()
    );
    Ok(values)
}

fn log_rejection(what: &str, e: &Error) {
    if e.is_format_error() {
        log::debug!("rejecting {what}: {e}");
    }
}
